//! Canonicalization applied after validation and before persistence.

use common::Money;
use serde_json::Value;

use crate::error::{DomainError, Result};
use crate::validation;

/// Returns a field that validation already required.
pub(crate) fn required<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a Value> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

/// Trimmed text.
pub fn text(value: &Value) -> String {
    validation::text(value).map(str::trim).unwrap_or_default().to_string()
}

/// Trimmed text, or `None` when blank.
pub fn optional_text(value: &Value) -> Option<String> {
    validation::text(value)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trimmed, lower-cased email, or `None` when blank.
pub fn email(value: &Value) -> Option<String> {
    optional_text(value).map(|s| s.to_lowercase())
}

/// Price rounded to two decimal places.
pub fn price(value: &Value) -> Money {
    validation::number(value)
        .map(Money::from_decimal)
        .unwrap_or_default()
}

/// Strict boolean from any accepted literal form.
///
/// Unrecognized forms become `false`. Validators reject those forms first,
/// so only callers that skip validation observe the fallback.
pub fn flag(value: &Value) -> bool {
    validation::flag(value).unwrap_or(false)
}

pub(crate) fn id(value: &Value, field: &str) -> Result<i64> {
    validation::id_value(value).ok_or_else(|| DomainError::validation(format!("Invalid {field}")))
}

pub(crate) fn coordinate(value: &Value) -> Option<f64> {
    validation::number(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn price_rounds_to_cents() {
        assert_eq!(price(&json!(19.999)).cents(), 2000);
        assert_eq!(price(&json!(19.994)).cents(), 1999);
        assert_eq!(price(&json!("10")).cents(), 1000);
    }

    #[test]
    fn text_is_trimmed_and_blank_optional_is_none() {
        assert_eq!(text(&json!("  Casa  ")), "Casa");
        assert_eq!(optional_text(&json!("   ")), None);
        assert_eq!(optional_text(&json!(" ref ")), Some("ref".to_string()));
    }

    #[test]
    fn email_is_lower_cased() {
        assert_eq!(
            email(&json!("  Ana@Example.COM ")),
            Some("ana@example.com".to_string())
        );
        assert_eq!(email(&json!("")), None);
    }

    #[test]
    fn unrecognized_flags_fall_back_to_false() {
        assert!(flag(&json!("1")));
        assert!(flag(&json!(true)));
        assert!(!flag(&json!("0")));
        assert!(!flag(&json!("maybe")));
    }
}
