//! Flow-level tests over the pure parts of the request pipeline: list
//! parameter handling, the sample-payment routing decision and shipping
//! fees, without a live database.

use leatherserver::listing::{ListParams, SortOrder};
use leatherserver::payments::{MockTransferProvider, PaymentProvider, TEST_TRANSFER_PREFIX};
use leatherserver::shipping;

#[test]
fn admin_list_query_string_normalization() {
    // Exactly what an admin table sends on first load.
    let p = ListParams::from_raw(Some("1"), Some("10"), None, None, None);
    assert_eq!(p.offset(), 0);
    assert_eq!(p.limit, 10);

    // Page 7 of a 25-row table sorted by a column header.
    let p = ListParams::from_raw(Some("7"), Some("25"), Some("name"), Some("asc"), Some("tote"));
    assert_eq!(p.offset(), 150);
    assert_eq!(p.sort(&["name", "createdAt"]), ("name", SortOrder::Asc));
    assert_eq!(p.search.as_deref(), Some("tote"));

    // A tampered sort key silently degrades instead of erroring the view.
    let p = ListParams::from_raw(None, None, Some("'; DROP TABLE--"), Some("asc"), None);
    assert_eq!(p.sort(&["name", "createdAt"]), ("createdAt", SortOrder::Desc));
}

#[test]
fn pagination_window_covers_the_tail_page() {
    // 23 matching rows, page size 10: page 3 starts at offset 20, so the
    // database returns the trailing 3 rows; the count query is what reports
    // the full 23 regardless of page.
    let p = ListParams::from_raw(Some("3"), Some("10"), None, None, None);
    assert_eq!(p.offset(), 20);
    assert_eq!(p.limit, 10);
}

#[test]
fn sample_payment_settlement_routing() {
    let provider = MockTransferProvider::default();

    let instructions = provider.instructions(shipping::fee_for("DE"), "EUR", "SMP-1");
    assert_eq!(instructions.amount, 15.0);

    // A real transfer id settles to paid; the rehearsal marker must not.
    assert!(!provider.is_test_transfer(&instructions.transfer_id));
    assert!(provider.is_test_transfer(&format!("{TEST_TRANSFER_PREFIX}9876")));
}

#[test]
fn shipping_fee_feeds_the_payment_amount() {
    let provider = MockTransferProvider::default();
    for country in ["NL", "FR", "PL", "US", "AU"] {
        let fee = shipping::fee_for(country);
        let ins = provider.instructions(fee, shipping::DEFAULT_CURRENCY, "SMP-x");
        assert_eq!(ins.amount, fee);
        assert_eq!(ins.currency, "EUR");
    }
}
