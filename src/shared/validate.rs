use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::error::{ApiError, FieldError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Collects field-level failures so a submission reports every problem at
/// once instead of failing on the first field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, path: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(path, "is required"));
        }
        self
    }

    pub fn require_some<T>(&mut self, path: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.errors.push(FieldError::new(path, "is required"));
        }
        self
    }

    pub fn email(&mut self, path: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !EMAIL_RE.is_match(value.trim()) {
            self.errors
                .push(FieldError::new(path, "is not a valid email address"));
        }
        self
    }

    pub fn positive(&mut self, path: &str, value: i32) -> &mut Self {
        if value <= 0 {
            self.errors
                .push(FieldError::new(path, "must be greater than zero"));
        }
        self
    }

    pub fn non_empty_list<T>(&mut self, path: &str, values: &[T]) -> &mut Self {
        if values.is_empty() {
            self.errors
                .push(FieldError::new(path, "must contain at least one entry"));
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_submission() {
        let mut v = Validator::new();
        v.require("name", "Bridle Tote")
            .email("email", "buyer@example.com")
            .positive("quantity", 50);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn reports_every_failing_field() {
        let mut v = Validator::new();
        v.require("name", "  ")
            .email("email", "not-an-email")
            .positive("quantity", 0);
        match v.finish() {
            Err(ApiError::Validation(errors)) => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(paths, vec!["name", "email", "quantity"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_email_is_only_a_presence_failure() {
        // `email` checks shape, `require` checks presence; a blank value
        // should not double-report.
        let mut v = Validator::new();
        v.email("email", "");
        assert!(v.finish().is_ok());
    }
}
