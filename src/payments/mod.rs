//! Payment-instruction seam for the sample-request flow.
//!
//! The provider shipped here generates mock bank-transfer instructions; there
//! is no real gateway behind it. Keeping it behind a trait keeps the rest of
//! the flow honest about that — swapping in a real provider touches nothing
//! but `AppState` construction.

use serde::Serialize;

/// Transfer ids carrying this prefix are treated as test payments: the
/// sample request settles to `pending` instead of `paid`.
pub const TEST_TRANSFER_PREFIX: &str = "TEST-";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInstructions {
    pub transfer_id: String,
    pub beneficiary: String,
    pub iban: String,
    pub reference: String,
    pub amount: f64,
    pub currency: String,
}

pub trait PaymentProvider: Send + Sync {
    fn instructions(&self, amount: f64, currency: &str, reference: &str) -> TransferInstructions;

    fn is_test_transfer(&self, transfer_id: &str) -> bool {
        transfer_id.starts_with(TEST_TRANSFER_PREFIX)
    }
}

/// Mock provider: issues instructions against a fixed house account.
pub struct MockTransferProvider {
    pub beneficiary: String,
    pub iban: String,
}

impl Default for MockTransferProvider {
    fn default() -> Self {
        Self {
            beneficiary: "Leatherworks Trading B.V.".to_string(),
            iban: "NL00MOCK0000000000".to_string(),
        }
    }
}

impl PaymentProvider for MockTransferProvider {
    fn instructions(&self, amount: f64, currency: &str, reference: &str) -> TransferInstructions {
        TransferInstructions {
            transfer_id: format!("TRX-{}", uuid::Uuid::new_v4().simple()),
            beneficiary: self.beneficiary.clone(),
            iban: self.iban.clone(),
            reference: reference.to_string(),
            amount,
            currency: currency.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_carry_amount_and_reference() {
        let provider = MockTransferProvider::default();
        let ins = provider.instructions(35.0, "EUR", "SMP-42");
        assert_eq!(ins.amount, 35.0);
        assert_eq!(ins.currency, "EUR");
        assert_eq!(ins.reference, "SMP-42");
        assert!(ins.transfer_id.starts_with("TRX-"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let provider = MockTransferProvider::default();
        let a = provider.instructions(1.0, "EUR", "r").transfer_id;
        let b = provider.instructions(1.0, "EUR", "r").transfer_id;
        assert_ne!(a, b);
    }

    #[test]
    fn test_marker_is_recognized() {
        let provider = MockTransferProvider::default();
        assert!(provider.is_test_transfer("TEST-12345"));
        assert!(!provider.is_test_transfer("TRX-12345"));
    }
}
