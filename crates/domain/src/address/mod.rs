//! Address validation and normalization.

mod service;

pub use service::AddressService;

use serde::Deserialize;
use serde_json::Value;
use store::{AddressChanges, NewAddress};

use crate::error::Result;
use crate::normalize;
use crate::validation::{self, TextRule, Violations};

const LABEL: TextRule = TextRule::new("label", 1, 50);
const ADDRESS_TEXT: TextRule = TextRule::new("address_text", 1, 255);
const REFERENCE_MAX: usize = 255;

/// Address fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub customer_id: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub label: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub address_text: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub reference: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub latitude: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub longitude: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub is_primary: Option<Value>,
}

impl AddressInput {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.label.is_none()
            && self.address_text.is_none()
            && self.reference.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.is_primary.is_none()
    }

    /// Whether the input asks for this address to become primary.
    pub fn wants_primary(&self) -> bool {
        self.is_primary.as_ref().is_some_and(normalize::flag)
    }
}

/// Validates address fields. In partial mode only present fields are checked.
pub fn validate_address(input: &AddressInput, partial: bool) -> Result<()> {
    let mut violations = Violations::new();

    validation::check_id(
        &mut violations,
        input.customer_id.as_ref(),
        "customer_id",
        !partial,
    );
    LABEL.check(&mut violations, input.label.as_ref(), !partial);
    ADDRESS_TEXT.check(&mut violations, input.address_text.as_ref(), !partial);
    validation::check_optional_text(
        &mut violations,
        input.reference.as_ref(),
        "reference",
        1,
        REFERENCE_MAX,
    );
    validation::check_range(
        &mut violations,
        input.latitude.as_ref(),
        "latitude",
        -90.0,
        90.0,
    );
    validation::check_range(
        &mut violations,
        input.longitude.as_ref(),
        "longitude",
        -180.0,
        180.0,
    );
    validation::check_flag(&mut violations, input.is_primary.as_ref(), "is_primary");

    violations.into_result()
}

/// Builds a complete address record from validated input.
pub fn normalize_address(input: &AddressInput) -> Result<NewAddress> {
    Ok(NewAddress {
        customer_id: normalize::id(
            normalize::required(input.customer_id.as_ref(), "customer_id")?,
            "customer_id",
        )?,
        label: normalize::text(normalize::required(input.label.as_ref(), "label")?),
        address_text: normalize::text(normalize::required(
            input.address_text.as_ref(),
            "address_text",
        )?),
        reference: input.reference.as_ref().and_then(normalize::optional_text),
        latitude: input.latitude.as_ref().and_then(normalize::coordinate),
        longitude: input.longitude.as_ref().and_then(normalize::coordinate),
        is_primary: input.wants_primary(),
    })
}

/// Builds a partial update from validated input.
pub fn normalize_address_changes(input: &AddressInput) -> Result<AddressChanges> {
    Ok(AddressChanges {
        customer_id: input
            .customer_id
            .as_ref()
            .map(|v| normalize::id(v, "customer_id"))
            .transpose()?,
        label: input.label.as_ref().map(normalize::text),
        address_text: input.address_text.as_ref().map(normalize::text),
        reference: input.reference.as_ref().map(normalize::optional_text),
        latitude: input.latitude.as_ref().map(normalize::coordinate),
        longitude: input.longitude.as_ref().map(normalize::coordinate),
        is_primary: input.is_primary.as_ref().map(normalize::flag),
    })
}
