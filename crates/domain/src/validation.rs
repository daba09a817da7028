//! Shared validation primitives.
//!
//! Inputs arrive as loosely typed JSON values: IDs may be numbers or numeric
//! strings and flags may be booleans, `"true"`/`"false"`, `"1"`/`"0"` or
//! `1`/`0`. The coercions here decide what counts as a valid value; the
//! entity validators use them and collect every violation before failing.

use std::sync::LazyLock;

use common::{MAX_PRICE_CENTS, Money};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use store::Page;

use crate::error::{DomainError, Result};

pub(crate) static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-()+]+$").expect("phone pattern compiles"));

pub(crate) static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Deserializes a field that is present in the body, keeping an explicit
/// `null` as `Some(Value::Null)`. Combined with `#[serde(default)]` an
/// absent field stays `None`, which partial updates rely on.
pub fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Message used when a partial update carries no recognized field.
pub const EMPTY_UPDATE: &str = "At least one field must be provided for update";

/// Accumulates rule violations so a single error enumerates all of them.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Fails with one `Validation` error joining every message with `", "`.
    pub fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.messages.join(", ")))
        }
    }
}

/// Parses a numeric string the way a lenient client would: surrounding
/// whitespace is ignored, the rest must be a finite number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses a boolean literal from its accepted string forms.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn id_from_number(n: f64) -> Option<i64> {
    let whole = n.trunc();
    if whole >= 1.0 && whole <= i64::MAX as f64 {
        Some(whole as i64)
    } else {
        None
    }
}

/// Parses an identifier: it must be numeric and its integer part positive.
pub fn parse_id(raw: &str, label: &str) -> Result<i64> {
    parse_numeric(raw)
        .and_then(id_from_number)
        .ok_or_else(|| DomainError::validation(format!("Invalid {label}")))
}

/// Checks an already-typed identifier.
pub fn require_id(id: i64, label: &str) -> Result<i64> {
    if id > 0 {
        Ok(id)
    } else {
        Err(DomainError::validation(format!("Invalid {label}")))
    }
}

/// Reads an identifier from a JSON number or numeric string.
pub fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(id_from_number),
        Value::String(s) => parse_numeric(s).and_then(id_from_number),
        _ => None,
    }
}

/// Reads a string value.
pub fn text(value: &Value) -> Option<&str> {
    value.as_str()
}

/// Reads a number from a JSON number or numeric string.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Reads a whole number from a JSON integer or integer string.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a boolean from any accepted literal form.
pub fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_flag(s),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Character count after trimming.
pub fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

/// Bounds for a text field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextRule {
    pub field: &'static str,
    pub min: usize,
    pub max: usize,
}

impl TextRule {
    pub const fn new(field: &'static str, min: usize, max: usize) -> Self {
        Self { field, min, max }
    }

    fn length_message(&self) -> String {
        if self.min <= 1 {
            format!("{} must be at most {} characters", self.field, self.max)
        } else {
            format!(
                "{} must be between {} and {} characters",
                self.field, self.min, self.max
            )
        }
    }

    /// Checks a text field. Returns the trimmed text when it passed, so
    /// callers can layer pattern checks on top.
    pub fn check<'a>(
        &self,
        violations: &mut Violations,
        value: Option<&'a Value>,
        required: bool,
    ) -> Option<&'a str> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            if required || value.is_some() {
                violations.push(format!("{} is required", self.field));
            }
            return None;
        };
        let Some(s) = text(value) else {
            violations.push(format!("{} must be a string", self.field));
            return None;
        };
        let len = char_len(s);
        if len == 0 && self.min > 0 {
            violations.push(format!("{} is required", self.field));
            return None;
        }
        if len < self.min || len > self.max {
            violations.push(self.length_message());
            return None;
        }
        Some(s.trim())
    }
}

/// Checks an optional text field where blank means "no value".
pub(crate) fn check_optional_text(
    violations: &mut Violations,
    value: Option<&Value>,
    field: &str,
    min: usize,
    max: usize,
) {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return;
    };
    let Some(s) = text(value) else {
        violations.push(format!("{field} must be a string"));
        return;
    };
    let len = char_len(s);
    if len == 0 {
        return;
    }
    if len < min || len > max {
        if min <= 1 {
            violations.push(format!("{field} must be at most {max} characters"));
        } else {
            violations.push(format!("{field} must be between {min} and {max} characters"));
        }
    }
}

pub(crate) fn check_id(
    violations: &mut Violations,
    value: Option<&Value>,
    field: &str,
    required: bool,
) {
    match value {
        None if required => violations.push(format!("{field} is required")),
        None => {}
        Some(v) => {
            if id_value(v).is_none() {
                violations.push(format!("Invalid {field}"));
            }
        }
    }
}

pub(crate) fn check_flag(violations: &mut Violations, value: Option<&Value>, field: &str) {
    if let Some(v) = value
        && flag(v).is_none()
    {
        violations.push(format!("{field} must be a boolean"));
    }
}

pub(crate) fn check_range(
    violations: &mut Violations,
    value: Option<&Value>,
    field: &str,
    min: f64,
    max: f64,
) {
    if let Some(v) = value.filter(|v| !v.is_null()) {
        match number(v) {
            Some(n) if (min..=max).contains(&n) => {}
            _ => violations.push(format!("{field} must be a number between {min} and {max}")),
        }
    }
}

/// Checks a price: a number, non-negative, at most 99,999,999.99 and at
/// most eight integer digits.
pub(crate) fn check_price(violations: &mut Violations, value: Option<&Value>, required: bool) {
    let Some(value) = value else {
        if required {
            violations.push("price is required");
        }
        return;
    };
    let Some(price) = number(value) else {
        violations.push("price must be a number");
        return;
    };
    if price < 0.0 {
        violations.push("price must be greater than or equal to 0");
    } else if price.trunc() >= 100_000_000.0 {
        violations.push("price must have at most 8 integer digits");
    } else if Money::from_decimal(price).cents() > MAX_PRICE_CENTS {
        violations.push("price must not exceed 99999999.99");
    }
}

pub(crate) fn check_choice(
    violations: &mut Violations,
    value: Option<&Value>,
    field: &str,
    choices: &[&str],
    required: bool,
) {
    match value {
        None if required => violations.push(format!("{field} is required")),
        None => {}
        Some(v) => {
            if !text(v).is_some_and(|s| choices.contains(&s)) {
                violations.push(format!("{field} must be one of: {}", choices.join(", ")));
            }
        }
    }
}

/// Fails with [`EMPTY_UPDATE`] unless a partial update carries a field.
pub fn require_any_field(has_fields: bool) -> Result<()> {
    if has_fields {
        Ok(())
    } else {
        Err(DomainError::validation(EMPTY_UPDATE))
    }
}

/// Parses listing bounds. Missing values fall back to the defaults.
pub fn page(limit: Option<&str>, offset: Option<&str>) -> Result<Page> {
    let mut violations = Violations::new();
    let mut result = Page::default();

    if let Some(raw) = limit {
        match raw.trim().parse::<usize>() {
            Ok(n) if (1..=Page::MAX_LIMIT).contains(&n) => result.limit = n,
            _ => violations.push(format!(
                "limit must be an integer between 1 and {}",
                Page::MAX_LIMIT
            )),
        }
    }
    if let Some(raw) = offset {
        // Offsets are bound as BIGINT, so they must fit an i64.
        match raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .and_then(|n| usize::try_from(n).ok())
        {
            Some(n) => result.offset = n,
            None => violations.push("offset must be a non-negative integer"),
        }
    }

    violations.into_result()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ids_must_be_numeric_and_positive() {
        assert_eq!(parse_id("12", "ID").unwrap(), 12);
        assert_eq!(parse_id(" 7 ", "ID").unwrap(), 7);
        assert_eq!(parse_id("3.9", "ID").unwrap(), 3);
        assert!(parse_id("0", "ID").is_err());
        assert!(parse_id("-4", "ID").is_err());
        assert!(parse_id("", "ID").is_err());
        assert!(parse_id("12abc", "ID").is_err());

        let err = parse_id("abc", "order_id").unwrap_err();
        assert_eq!(err.to_string(), "Invalid order_id");
    }

    #[test]
    fn id_values_accept_numbers_and_numeric_strings() {
        assert_eq!(id_value(&json!(5)), Some(5));
        assert_eq!(id_value(&json!("5")), Some(5));
        assert_eq!(id_value(&json!(0)), None);
        assert_eq!(id_value(&json!(true)), None);
        assert_eq!(id_value(&json!(null)), None);
    }

    #[test]
    fn flags_accept_the_allow_list_only() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!("true"), true),
            (json!("false"), false),
            (json!("1"), true),
            (json!("0"), false),
            (json!(1), true),
            (json!(0), false),
        ] {
            assert_eq!(flag(&value), Some(expected), "{value}");
        }
        assert_eq!(flag(&json!("yes")), None);
        assert_eq!(flag(&json!(2)), None);
        assert_eq!(flag(&json!("TRUE")), None);
    }

    #[test]
    fn violations_join_every_message() {
        let mut v = Violations::new();
        v.push("name is required");
        v.push("phone is required");
        let err = v.into_result().unwrap_err();
        assert_eq!(err.to_string(), "name is required, phone is required");
    }

    #[test]
    fn text_rule_reports_missing_type_and_length() {
        let rule = TextRule::new("name", 2, 5);
        let mut v = Violations::new();
        assert_eq!(rule.check(&mut v, Some(&json!("  Ana ")), true), Some("Ana"));
        assert!(v.is_empty());

        rule.check(&mut v, None, true);
        rule.check(&mut v, Some(&json!(42)), true);
        rule.check(&mut v, Some(&json!("A")), true);
        rule.check(&mut v, None, false);
        assert_eq!(
            v.messages(),
            [
                "name is required",
                "name must be a string",
                "name must be between 2 and 5 characters"
            ]
        );
    }

    #[test]
    fn price_rules() {
        let check = |value: serde_json::Value| {
            let mut v = Violations::new();
            check_price(&mut v, Some(&value), true);
            v.messages().to_vec()
        };
        assert!(check(json!(19.99)).is_empty());
        assert!(check(json!("10")).is_empty());
        assert!(check(json!(0)).is_empty());
        assert!(check(json!(99_999_999.99)).is_empty());
        assert_eq!(check(json!(-1)), ["price must be greater than or equal to 0"]);
        assert_eq!(check(json!(100_000_000)), ["price must have at most 8 integer digits"]);
        assert_eq!(check(json!("cheap")), ["price must be a number"]);
    }

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(page(None, None).unwrap(), Page::default());
        assert_eq!(page(Some("10"), Some("20")).unwrap(), Page::new(10, 20));

        let err = page(Some("0"), Some("-1")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "limit must be an integer between 1 and 1000, offset must be a non-negative integer"
        );
    }

    #[test]
    fn offset_must_fit_a_bigint() {
        let max = i64::MAX.to_string();
        assert_eq!(page(None, Some(&max)).unwrap().offset as u64, i64::MAX as u64);

        let err = page(None, Some("9223372036854775808")).unwrap_err();
        assert_eq!(err.to_string(), "offset must be a non-negative integer");
    }

    #[test]
    fn empty_partial_update_is_rejected() {
        assert!(require_any_field(true).is_ok());
        assert_eq!(require_any_field(false).unwrap_err().to_string(), EMPTY_UPDATE);
    }
}
