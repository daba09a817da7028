//! Persisted records and the write payloads the repositories accept.

use chrono::{DateTime, Utc};
use common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting or fully replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Partial customer update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
}

impl CustomerChanges {
    pub fn apply_to(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
    }
}

/// A delivery address belonging to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub customer_id: i64,
    pub label: String,
    pub address_text: String,
    pub reference: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting or fully replacing an address.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub customer_id: i64,
    pub label: String,
    pub address_text: String,
    pub reference: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
}

/// Partial address update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressChanges {
    pub customer_id: Option<i64>,
    pub label: Option<String>,
    pub address_text: Option<String>,
    pub reference: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub is_primary: Option<bool>,
}

impl AddressChanges {
    pub fn apply_to(self, address: &mut Address) {
        if let Some(customer_id) = self.customer_id {
            address.customer_id = customer_id;
        }
        if let Some(label) = self.label {
            address.label = label;
        }
        if let Some(address_text) = self.address_text {
            address.address_text = address_text;
        }
        if let Some(reference) = self.reference {
            address.reference = reference;
        }
        if let Some(latitude) = self.latitude {
            address.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            address.longitude = longitude;
        }
        if let Some(is_primary) = self.is_primary {
            address.is_primary = is_primary;
        }
    }
}

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting or fully replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub is_active: bool,
}

/// Partial product update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Money>,
    pub is_active: Option<bool>,
}

impl ProductChanges {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
    }
}

/// Error returned when parsing an unknown enum literal.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Paypal,
        PaymentMethod::Cash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "payment_method",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an order.
///
/// Any status may follow any other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "status",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer order. `total` is derived from the order's items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub address_id: i64,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting an order; the total always starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub address_id: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
}

/// Data for fully replacing an order, total included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub customer_id: i64,
    pub address_id: i64,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
}

/// Partial order update. The total is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub customer_id: Option<i64>,
    pub address_id: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<OrderStatus>,
}

impl OrderChanges {
    pub fn apply_to(self, order: &mut Order) {
        if let Some(customer_id) = self.customer_id {
            order.customer_id = customer_id;
        }
        if let Some(address_id) = self.address_id {
            order.address_id = address_id;
        }
        if let Some(payment_method) = self.payment_method {
            order.payment_method = payment_method;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
    }
}

/// A line item, keyed by `(order_id, product_id)`.
///
/// `price` is the unit price captured when the item was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: Money,
}

impl OrderItem {
    /// Returns quantity × captured unit price, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

/// Partial order item update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderItemChanges {
    pub quantity: Option<i32>,
    pub price: Option<Money>,
}

impl OrderItemChanges {
    pub fn apply_to(self, item: &mut OrderItem) {
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
    }
}

/// A delivery courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Courier {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub vehicle: String,
    pub license_plate: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting or fully replacing a courier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourier {
    pub name: String,
    pub phone: String,
    pub vehicle: String,
    pub license_plate: String,
    pub available: bool,
}

/// Partial courier update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourierChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
    pub license_plate: Option<String>,
    pub available: Option<bool>,
}

impl CourierChanges {
    pub fn apply_to(self, courier: &mut Courier) {
        if let Some(name) = self.name {
            courier.name = name;
        }
        if let Some(phone) = self.phone {
            courier.phone = phone;
        }
        if let Some(vehicle) = self.vehicle {
            courier.vehicle = vehicle;
        }
        if let Some(license_plate) = self.license_plate {
            courier.license_plate = license_plate;
        }
        if let Some(available) = self.available {
            courier.available = available;
        }
    }
}

/// The courier currently delivering an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub order_id: i64,
    pub courier_id: i64,
    pub assigned_at: DateTime<Utc>,
}

/// Data for inserting an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssignment {
    pub order_id: i64,
    pub courier_id: i64,
}

/// A customer key/value preference, keyed by `(customer_id, preference_key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub customer_id: i64,
    pub preference_key: String,
    pub preference_value: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_their_wire_names() {
        assert_eq!("paypal".parse::<PaymentMethod>().unwrap(), PaymentMethod::Paypal);
        assert_eq!(
            "credit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());

        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_value(PaymentMethod::DebitCard).unwrap();
        assert_eq!(json, "debit_card");
        let json = serde_json::to_value(OrderStatus::Delivered).unwrap();
        assert_eq!(json, "delivered");
    }

    #[test]
    fn order_item_subtotal_uses_captured_price() {
        let item = OrderItem {
            order_id: 1,
            product_id: 2,
            quantity: 3,
            price: Money::from_cents(1050),
        };
        assert_eq!(item.subtotal(), Some(Money::from_cents(3150)));

        let huge = OrderItem {
            quantity: i32::MAX,
            price: Money::from_cents(common::MAX_PRICE_CENTS),
            ..item
        };
        assert_eq!(huge.subtotal(), None);
    }

    #[test]
    fn changes_only_touch_present_fields() {
        let mut customer = Customer {
            id: 1,
            name: "Ana".to_string(),
            phone: "3001234567".to_string(),
            email: Some("ana@example.com".to_string()),
            created_at: Utc::now(),
        };
        CustomerChanges {
            email: Some(None),
            ..Default::default()
        }
        .apply_to(&mut customer);

        assert_eq!(customer.name, "Ana");
        assert_eq!(customer.email, None);
    }
}
