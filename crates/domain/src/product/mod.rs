//! Product validation, normalization and filtering.

mod service;

pub use service::ProductService;

use common::Money;
use serde::Deserialize;
use serde_json::Value;
use store::{NewProduct, ProductChanges, ProductFilter};

use crate::error::Result;
use crate::normalize;
use crate::validation::{self, TextRule, Violations};

const NAME: TextRule = TextRule::new("name", 2, 100);
const DESCRIPTION_MIN: usize = 2;
const DESCRIPTION_MAX: usize = 5000;

/// Product fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub name: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub description: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub price: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub is_active: Option<Value>,
}

impl ProductInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.is_active.is_none()
    }

    /// The trimmed name, when one was supplied.
    pub fn name(&self) -> Option<String> {
        self.name.as_ref().map(normalize::text)
    }
}

/// Validates product fields. In partial mode only present fields are checked.
pub fn validate_product(input: &ProductInput, partial: bool) -> Result<()> {
    let mut violations = Violations::new();

    NAME.check(&mut violations, input.name.as_ref(), !partial);
    validation::check_optional_text(
        &mut violations,
        input.description.as_ref(),
        "description",
        DESCRIPTION_MIN,
        DESCRIPTION_MAX,
    );
    validation::check_price(&mut violations, input.price.as_ref(), !partial);
    validation::check_flag(&mut violations, input.is_active.as_ref(), "is_active");

    violations.into_result()
}

/// Builds a complete product record from validated input.
///
/// A missing `is_active` creates an inactive product.
pub fn normalize_product(input: &ProductInput) -> Result<NewProduct> {
    Ok(NewProduct {
        name: normalize::text(normalize::required(input.name.as_ref(), "name")?),
        description: input.description.as_ref().and_then(normalize::optional_text),
        price: normalize::price(normalize::required(input.price.as_ref(), "price")?),
        is_active: input.is_active.as_ref().is_some_and(normalize::flag),
    })
}

/// Builds a partial update from validated input.
pub fn normalize_product_changes(input: &ProductInput) -> ProductChanges {
    ProductChanges {
        name: input.name(),
        description: input.description.as_ref().map(normalize::optional_text),
        price: input.price.as_ref().map(normalize::price),
        is_active: input.is_active.as_ref().map(normalize::flag),
    }
}

/// Product filter criteria as received in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilterInput {
    pub name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub is_active: Option<String>,
}

/// Validates filter criteria and converts them into a store filter.
pub fn parse_product_filter(input: &ProductFilterInput) -> Result<ProductFilter> {
    let mut violations = Violations::new();
    let mut filter = ProductFilter::new();

    if let Some(name) = input.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        filter = filter.name(name);
    }

    let min_price = filter_price(&mut violations, input.min_price.as_deref(), "min_price");
    let max_price = filter_price(&mut violations, input.max_price.as_deref(), "max_price");
    if let (Some(min), Some(max)) = (min_price, max_price)
        && min > max
    {
        violations.push("min_price must not be greater than max_price");
    }
    filter.min_price = min_price;
    filter.max_price = max_price;

    if let Some(raw) = input.is_active.as_deref() {
        match validation::parse_flag(raw.trim()) {
            Some(is_active) => filter = filter.is_active(is_active),
            None => violations.push("is_active must be a boolean"),
        }
    }

    violations.into_result()?;
    Ok(filter)
}

fn filter_price(violations: &mut Violations, raw: Option<&str>, field: &str) -> Option<Money> {
    let raw = raw?;
    match validation::parse_numeric(raw) {
        Some(n) if n >= 0.0 => Some(Money::from_decimal(n)),
        _ => {
            violations.push(format!("{field} must be a non-negative number"));
            None
        }
    }
}
