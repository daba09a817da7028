//! Order item validation and normalization.

mod service;

pub use service::OrderItemService;

use serde::Deserialize;
use serde_json::Value;
use store::OrderItemChanges;

use crate::error::{DomainError, Result};
use crate::normalize;
use crate::validation::{self, Violations};

/// Which part of an existing item a change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    Quantity,
    Price,
    /// Quantity, price or both; at least one is required.
    Any,
}

/// Order item fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderItemInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub order_id: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub product_id: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub quantity: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub price: Option<Value>,
}

/// Validated item to insert; the price comes from the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

fn check_quantity(violations: &mut Violations, value: Option<&Value>, required: bool) {
    match value {
        None if required => violations.push("quantity is required"),
        None => {}
        Some(v) => {
            if quantity(v).is_none() {
                violations.push("quantity must be a positive integer");
            }
        }
    }
}

fn quantity(value: &Value) -> Option<i32> {
    validation::integer(value)
        .and_then(|n| i32::try_from(n).ok())
        .filter(|n| *n > 0)
}

/// Validates the body of a new item. Any client price is ignored.
pub fn validate_new_item(input: &OrderItemInput) -> Result<()> {
    let mut violations = Violations::new();
    validation::check_id(&mut violations, input.order_id.as_ref(), "order_id", true);
    validation::check_id(&mut violations, input.product_id.as_ref(), "product_id", true);
    check_quantity(&mut violations, input.quantity.as_ref(), true);
    violations.into_result()
}

/// Validates a change to an existing item.
pub fn validate_item_change(input: &OrderItemInput, change: ItemChange) -> Result<()> {
    if change == ItemChange::Any {
        validation::require_any_field(input.quantity.is_some() || input.price.is_some())?;
    }

    let mut violations = Violations::new();
    if change != ItemChange::Price {
        check_quantity(
            &mut violations,
            input.quantity.as_ref(),
            change == ItemChange::Quantity,
        );
    }
    if change != ItemChange::Quantity {
        validation::check_price(
            &mut violations,
            input.price.as_ref(),
            change == ItemChange::Price,
        );
    }
    violations.into_result()
}

pub fn normalize_new_item(input: &OrderItemInput) -> Result<NewOrderItem> {
    Ok(NewOrderItem {
        order_id: normalize::id(normalize::required(input.order_id.as_ref(), "order_id")?, "order_id")?,
        product_id: normalize::id(
            normalize::required(input.product_id.as_ref(), "product_id")?,
            "product_id",
        )?,
        quantity: normalize_quantity(normalize::required(input.quantity.as_ref(), "quantity")?)?,
    })
}

/// Builds the change set for the fields the change targets.
pub fn normalize_item_change(input: &OrderItemInput, change: ItemChange) -> Result<OrderItemChanges> {
    let quantity = match change {
        ItemChange::Price => None,
        _ => input.quantity.as_ref().map(normalize_quantity).transpose()?,
    };
    let price = match change {
        ItemChange::Quantity => None,
        _ => input.price.as_ref().map(normalize::price),
    };
    Ok(OrderItemChanges { quantity, price })
}

fn normalize_quantity(value: &Value) -> Result<i32> {
    quantity(value).ok_or_else(|| DomainError::validation("quantity must be a positive integer"))
}

#[cfg(test)]
mod tests {
    use common::Money;
    use serde_json::json;

    use super::*;

    fn input(value: serde_json::Value) -> OrderItemInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn new_item_needs_ids_and_positive_quantity() {
        let err = validate_new_item(&input(json!({"order_id": "x", "quantity": 0}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid order_id, product_id is required, quantity must be a positive integer"
        );

        let ok = input(json!({"order_id": 1, "product_id": "2", "quantity": "3", "price": -9}));
        validate_new_item(&ok).unwrap();
        assert_eq!(
            normalize_new_item(&ok).unwrap(),
            NewOrderItem {
                order_id: 1,
                product_id: 2,
                quantity: 3
            }
        );
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let err = validate_item_change(&input(json!({"quantity": 1.5})), ItemChange::Quantity)
            .unwrap_err();
        assert_eq!(err.to_string(), "quantity must be a positive integer");
    }

    #[test]
    fn targeted_changes_require_their_field() {
        let empty = input(json!({}));
        assert_eq!(
            validate_item_change(&empty, ItemChange::Quantity)
                .unwrap_err()
                .to_string(),
            "quantity is required"
        );
        assert_eq!(
            validate_item_change(&empty, ItemChange::Price)
                .unwrap_err()
                .to_string(),
            "price is required"
        );
        assert_eq!(
            validate_item_change(&empty, ItemChange::Any)
                .unwrap_err()
                .to_string(),
            validation::EMPTY_UPDATE
        );
    }

    #[test]
    fn targeted_change_ignores_the_other_field() {
        let body = input(json!({"quantity": 4, "price": 2.505}));
        let quantity_only = normalize_item_change(&body, ItemChange::Quantity).unwrap();
        assert_eq!(quantity_only.quantity, Some(4));
        assert_eq!(quantity_only.price, None);

        let both = normalize_item_change(&body, ItemChange::Any).unwrap();
        assert_eq!(both.quantity, Some(4));
        assert_eq!(both.price, Some(Money::from_decimal(2.505)));
    }
}
