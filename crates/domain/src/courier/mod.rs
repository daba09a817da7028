//! Courier validation, normalization and filtering.

mod service;

pub use service::CourierService;

use serde::Deserialize;
use serde_json::Value;
use store::{CourierChanges, CourierFilter, NewCourier};

use crate::error::Result;
use crate::normalize;
use crate::validation::{self, PHONE_RE, TextRule, Violations};

const NAME: TextRule = TextRule::new("name", 1, 100);
const PHONE: TextRule = TextRule::new("phone", 1, 20);
const VEHICLE: TextRule = TextRule::new("vehicle", 1, 50);
const LICENSE_PLATE: TextRule = TextRule::new("license_plate", 1, 20);

/// Courier fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CourierInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub name: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub phone: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub vehicle: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub license_plate: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub available: Option<Value>,
}

impl CourierInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.vehicle.is_none()
            && self.license_plate.is_none()
            && self.available.is_none()
    }
}

pub fn validate_courier(input: &CourierInput, partial: bool) -> Result<()> {
    let mut violations = Violations::new();

    NAME.check(&mut violations, input.name.as_ref(), !partial);
    if let Some(phone) = PHONE.check(&mut violations, input.phone.as_ref(), !partial)
        && !PHONE_RE.is_match(phone)
    {
        violations.push("phone may only contain digits, spaces and the characters -()+");
    }
    VEHICLE.check(&mut violations, input.vehicle.as_ref(), !partial);
    LICENSE_PLATE.check(&mut violations, input.license_plate.as_ref(), !partial);
    validation::check_flag(&mut violations, input.available.as_ref(), "available");

    violations.into_result()
}

/// Builds a complete courier record. Couriers are available unless told
/// otherwise.
pub fn normalize_courier(input: &CourierInput) -> Result<NewCourier> {
    Ok(NewCourier {
        name: normalize::text(normalize::required(input.name.as_ref(), "name")?),
        phone: normalize::text(normalize::required(input.phone.as_ref(), "phone")?),
        vehicle: normalize::text(normalize::required(input.vehicle.as_ref(), "vehicle")?),
        license_plate: normalize::text(normalize::required(
            input.license_plate.as_ref(),
            "license_plate",
        )?),
        available: input.available.as_ref().is_none_or(normalize::flag),
    })
}

pub fn normalize_courier_changes(input: &CourierInput) -> CourierChanges {
    CourierChanges {
        name: input.name.as_ref().map(normalize::text),
        phone: input.phone.as_ref().map(normalize::text),
        vehicle: input.vehicle.as_ref().map(normalize::text),
        license_plate: input.license_plate.as_ref().map(normalize::text),
        available: input.available.as_ref().map(normalize::flag),
    }
}

/// Courier filter criteria as received in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CourierFilterInput {
    pub available: Option<String>,
    pub vehicle: Option<String>,
}

pub fn parse_courier_filter(input: &CourierFilterInput) -> Result<CourierFilter> {
    let mut violations = Violations::new();
    let mut filter = CourierFilter::new();

    if let Some(raw) = input.available.as_deref() {
        match validation::parse_flag(raw.trim()) {
            Some(available) => filter = filter.available(available),
            None => violations.push("available must be a boolean"),
        }
    }
    if let Some(vehicle) = input.vehicle.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        filter = filter.vehicle(vehicle);
    }

    violations.into_result()?;
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(value: serde_json::Value) -> CourierInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_mode_requires_every_text_field() {
        let err = validate_courier(&input(json!({"available": "0"})), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "name is required, phone is required, vehicle is required, \
             license_plate is required"
        );
    }

    #[test]
    fn length_ceilings_and_phone_pattern() {
        let err = validate_courier(
            &input(json!({"phone": "call me", "license_plate": "X".repeat(21)})),
            true,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "phone may only contain digits, spaces and the characters -()+, \
             license_plate must be at most 20 characters"
        );
    }

    #[test]
    fn couriers_are_available_by_default() {
        let courier = normalize_courier(&input(json!({
            "name": "Luis",
            "phone": "+57 300 000 0000",
            "vehicle": "moto",
            "license_plate": "ABC12D"
        })))
        .unwrap();
        assert!(courier.available);
    }

    #[test]
    fn filter_parses_availability() {
        let filter = parse_courier_filter(&CourierFilterInput {
            available: Some("false".to_string()),
            vehicle: Some("Moto".to_string()),
        })
        .unwrap();
        assert_eq!(filter.available, Some(false));
        assert_eq!(filter.vehicle.as_deref(), Some("Moto"));

        assert!(
            parse_courier_filter(&CourierFilterInput {
                available: Some("often".to_string()),
                vehicle: None,
            })
            .is_err()
        );
    }
}
