//! Order validation and normalization.

mod service;

pub use service::OrderService;

use common::{MAX_TOTAL_CENTS, Money};
use serde::Deserialize;
use serde_json::Value;
use store::{NewOrder, OrderChanges, OrderStatus, OrderUpdate, PaymentMethod};

use crate::error::{DomainError, Result};
use crate::normalize;
use crate::validation::{self, Violations};

/// Largest storable order total.
const TOTAL_MAX: f64 = 9_999_999_999.99;

const PAYMENT_METHODS: [&str; 4] = ["credit_card", "debit_card", "paypal", "cash"];
const STATUSES: [&str; 5] = ["pending", "processing", "shipped", "delivered", "canceled"];

/// Which operation an order payload is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    /// New order: the total is server-derived and ignored; status is
    /// optional and defaults to pending.
    Create,
    /// Full replacement: every field, total included, is required.
    Update,
    /// Partial update of customer, address, payment method or status.
    Partial,
}

/// Order fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub customer_id: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub address_id: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub total: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub payment_method: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub status: Option<Value>,
}

impl OrderInput {
    /// True when no field a partial update may change is present.
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.address_id.is_none()
            && self.payment_method.is_none()
            && self.status.is_none()
    }
}

/// Body of a status change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub status: Option<Value>,
}

/// Validates order fields for the given operation.
pub fn validate_order(input: &OrderInput, mode: OrderMode) -> Result<()> {
    let mut violations = Violations::new();
    let full = mode != OrderMode::Partial;

    validation::check_id(&mut violations, input.customer_id.as_ref(), "customer_id", full);
    validation::check_id(&mut violations, input.address_id.as_ref(), "address_id", full);
    if mode == OrderMode::Update {
        check_total(&mut violations, input.total.as_ref());
    }
    validation::check_choice(
        &mut violations,
        input.payment_method.as_ref(),
        "payment_method",
        &PAYMENT_METHODS,
        full,
    );
    validation::check_choice(
        &mut violations,
        input.status.as_ref(),
        "status",
        &STATUSES,
        mode == OrderMode::Update,
    );

    violations.into_result()
}

/// Validates a status change.
pub fn validate_status(input: &StatusInput) -> Result<()> {
    let mut violations = Violations::new();
    validation::check_choice(&mut violations, input.status.as_ref(), "status", &STATUSES, true);
    violations.into_result()
}

fn check_total(violations: &mut Violations, value: Option<&Value>) {
    let Some(value) = value else {
        violations.push("total is required");
        return;
    };
    match validation::number(value) {
        Some(total) if (0.0..=TOTAL_MAX).contains(&total) => {}
        Some(_) => violations.push(format!(
            "total must be a number between 0 and {TOTAL_MAX}"
        )),
        None => violations.push("total must be a number"),
    }
}

fn payment_method(value: &Value) -> Result<PaymentMethod> {
    parse_choice(value, "payment_method")
}

fn status(value: &Value) -> Result<OrderStatus> {
    parse_choice(value, "status")
}

fn parse_choice<T: std::str::FromStr>(value: &Value, field: &str) -> Result<T> {
    validation::text(value)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DomainError::validation(format!("Invalid {field}")))
}

fn required_id(value: Option<&Value>, field: &str) -> Result<i64> {
    normalize::id(normalize::required(value, field)?, field)
}

/// Builds a new order from input validated in [`OrderMode::Create`].
pub fn normalize_new_order(input: &OrderInput) -> Result<NewOrder> {
    Ok(NewOrder {
        customer_id: required_id(input.customer_id.as_ref(), "customer_id")?,
        address_id: required_id(input.address_id.as_ref(), "address_id")?,
        payment_method: payment_method(normalize::required(
            input.payment_method.as_ref(),
            "payment_method",
        )?)?,
        status: input.status.as_ref().map(status).transpose()?.unwrap_or_default(),
    })
}

/// Builds a full replacement from input validated in [`OrderMode::Update`].
pub fn normalize_order_update(input: &OrderInput) -> Result<OrderUpdate> {
    Ok(OrderUpdate {
        customer_id: required_id(input.customer_id.as_ref(), "customer_id")?,
        address_id: required_id(input.address_id.as_ref(), "address_id")?,
        total: normalize::price(normalize::required(input.total.as_ref(), "total")?),
        payment_method: payment_method(normalize::required(
            input.payment_method.as_ref(),
            "payment_method",
        )?)?,
        status: status(normalize::required(input.status.as_ref(), "status")?)?,
    })
}

/// Builds a partial update from input validated in [`OrderMode::Partial`].
pub fn normalize_order_changes(input: &OrderInput) -> Result<OrderChanges> {
    Ok(OrderChanges {
        customer_id: input
            .customer_id
            .as_ref()
            .map(|v| normalize::id(v, "customer_id"))
            .transpose()?,
        address_id: input
            .address_id
            .as_ref()
            .map(|v| normalize::id(v, "address_id"))
            .transpose()?,
        payment_method: input.payment_method.as_ref().map(payment_method).transpose()?,
        status: input.status.as_ref().map(status).transpose()?,
    })
}

/// Parses a validated status change.
pub fn normalize_status(input: &StatusInput) -> Result<OrderStatus> {
    status(normalize::required(input.status.as_ref(), "status")?)
}

/// Sums `quantity × price` over the given items.
///
/// Fails when the sum does not fit the storable order total.
pub fn order_total<'a>(items: impl IntoIterator<Item = &'a store::OrderItem>) -> Result<Money> {
    items
        .into_iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.subtotal()?))
        .filter(|total| total.cents() <= MAX_TOTAL_CENTS)
        .ok_or_else(|| DomainError::validation("order total exceeds the maximum allowed"))
}
