//! Courier assignment validation.

mod service;

pub use service::AssignmentService;

use serde::Deserialize;
use serde_json::Value;
use store::NewAssignment;

use crate::error::Result;
use crate::normalize;
use crate::validation::{self, Violations};

/// Assignment fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssignmentInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub order_id: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub courier_id: Option<Value>,
}

/// Validates a new assignment: both ids are required.
pub fn validate_assignment(input: &AssignmentInput) -> Result<()> {
    let mut violations = Violations::new();
    validation::check_id(&mut violations, input.order_id.as_ref(), "order_id", true);
    validation::check_id(&mut violations, input.courier_id.as_ref(), "courier_id", true);
    violations.into_result()
}

/// Validates a reassignment: only the courier changes.
pub fn validate_reassignment(input: &AssignmentInput) -> Result<()> {
    let mut violations = Violations::new();
    validation::check_id(&mut violations, input.courier_id.as_ref(), "courier_id", true);
    violations.into_result()
}

pub fn normalize_assignment(input: &AssignmentInput) -> Result<NewAssignment> {
    Ok(NewAssignment {
        order_id: normalize::id(normalize::required(input.order_id.as_ref(), "order_id")?, "order_id")?,
        courier_id: normalize_courier_id(input)?,
    })
}

pub fn normalize_courier_id(input: &AssignmentInput) -> Result<i64> {
    normalize::id(
        normalize::required(input.courier_id.as_ref(), "courier_id")?,
        "courier_id",
    )
}
