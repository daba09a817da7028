//! Customer preference validation.

mod service;

pub use service::PreferenceService;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DomainError, Result};
use crate::normalize;
use crate::validation::{self, TextRule, Violations};

const KEY: TextRule = TextRule::new("preference_key", 1, 100);
const VALUE: TextRule = TextRule::new("preference_value", 0, 5000);

/// Preference fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferenceInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub preference_key: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub preference_value: Option<Value>,
}

/// Validates a new preference: key and value are required.
pub fn validate_preference(input: &PreferenceInput) -> Result<()> {
    let mut violations = Violations::new();
    KEY.check(&mut violations, input.preference_key.as_ref(), true);
    VALUE.check(&mut violations, input.preference_value.as_ref(), true);
    violations.into_result()
}

/// Validates a value change.
pub fn validate_preference_value(input: &PreferenceInput) -> Result<()> {
    let mut violations = Violations::new();
    VALUE.check(&mut violations, input.preference_value.as_ref(), true);
    violations.into_result()
}

/// Validates a key taken from a path and returns it trimmed.
pub fn parse_preference_key(raw: &str) -> Result<String> {
    let key = raw.trim();
    let len = key.chars().count();
    if len == 0 || len > 100 {
        return Err(DomainError::validation("Invalid preference_key"));
    }
    Ok(key.to_string())
}

pub fn normalize_key(input: &PreferenceInput) -> Result<String> {
    Ok(normalize::text(normalize::required(
        input.preference_key.as_ref(),
        "preference_key",
    )?))
}

pub fn normalize_value(input: &PreferenceInput) -> Result<String> {
    Ok(normalize::text(normalize::required(
        input.preference_value.as_ref(),
        "preference_value",
    )?))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(value: serde_json::Value) -> PreferenceInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn key_and_value_are_required() {
        let err = validate_preference(&input(json!({}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "preference_key is required, preference_value is required"
        );
    }

    #[test]
    fn empty_value_is_allowed() {
        validate_preference(&input(json!({"preference_key": "theme", "preference_value": ""})))
            .unwrap();
    }

    #[test]
    fn value_length_is_bounded() {
        let err = validate_preference_value(&input(json!({
            "preference_value": "x".repeat(5001)
        })))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "preference_value must be at most 5000 characters"
        );
    }

    #[test]
    fn path_keys_are_trimmed_and_bounded() {
        assert_eq!(parse_preference_key(" theme ").unwrap(), "theme");
        assert!(parse_preference_key("  ").is_err());
        assert!(parse_preference_key(&"k".repeat(101)).is_err());
    }
}
