//! Repository capability traits consumed by the domain services.
//!
//! Every lookup, update and delete keyed by id returns `Ok(None)` when the
//! target row does not exist; errors are reserved for genuine persistence
//! failures, including constraint violations reported as
//! [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation) or
//! [`StoreError::ForeignKeyViolation`](crate::StoreError::ForeignKeyViolation).
//!
//! Method names carry the entity name because one store type implements
//! all of the traits.

use async_trait::async_trait;
use common::Money;

use crate::{
    Address, AddressChanges, Assignment, CourierFilter, Courier, CourierChanges, Customer,
    CustomerChanges, NewAddress, NewAssignment, NewCourier, NewCustomer, NewOrder, NewProduct,
    Order, OrderChanges, OrderItem, OrderItemChanges, OrderStatus, OrderUpdate, Page, Preference,
    Product, ProductChanges, ProductFilter, Result,
};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Inserts a customer. The phone number must be unique.
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer>;

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>>;

    /// Lists customers ordered by id.
    async fn list_customers(&self, page: Page) -> Result<Vec<Customer>>;

    async fn update_customer(&self, id: i64, customer: NewCustomer) -> Result<Option<Customer>>;

    async fn update_customer_partial(
        &self,
        id: i64,
        changes: CustomerChanges,
    ) -> Result<Option<Customer>>;

    /// Deletes a customer together with its addresses and preferences.
    ///
    /// Fails with a foreign-key violation while orders reference it.
    async fn delete_customer(&self, id: i64) -> Result<Option<Customer>>;
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Inserts an address.
    ///
    /// When the new row is primary, every other primary address of the same
    /// customer is cleared atomically with the insert.
    async fn create_address(&self, address: NewAddress) -> Result<Address>;

    async fn get_address(&self, id: i64) -> Result<Option<Address>>;

    async fn list_addresses(&self, page: Page) -> Result<Vec<Address>>;

    async fn list_addresses_by_customer(&self, customer_id: i64) -> Result<Vec<Address>>;

    async fn get_primary_address(&self, customer_id: i64) -> Result<Option<Address>>;

    /// Replaces an address, clearing other primaries atomically when the
    /// resulting row is primary.
    async fn update_address(&self, id: i64, address: NewAddress) -> Result<Option<Address>>;

    /// Applies a partial update with the same primary-exclusivity guarantee.
    async fn update_address_partial(
        &self,
        id: i64,
        changes: AddressChanges,
    ) -> Result<Option<Address>>;

    /// Deletes an address. Fails with a foreign-key violation while orders
    /// reference it.
    async fn delete_address(&self, id: i64) -> Result<Option<Address>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product. Names are unique case-insensitively.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    async fn get_product(&self, id: i64) -> Result<Option<Product>>;

    async fn list_products(&self, page: Page) -> Result<Vec<Product>>;

    /// Finds a product by name, ignoring case. Inactive products count.
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>>;

    async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    async fn update_product(&self, id: i64, product: NewProduct) -> Result<Option<Product>>;

    async fn update_product_partial(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<Product>>;

    /// Marks a product inactive, keeping the row.
    async fn deactivate_product(&self, id: i64) -> Result<Option<Product>>;

    /// Removes a product row. Fails with a foreign-key violation while order
    /// items reference it.
    async fn delete_product(&self, id: i64) -> Result<Option<Product>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts an order with a zero total.
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    async fn get_order(&self, id: i64) -> Result<Option<Order>>;

    async fn list_orders(&self, page: Page) -> Result<Vec<Order>>;

    async fn list_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>>;

    async fn update_order(&self, id: i64, order: OrderUpdate) -> Result<Option<Order>>;

    async fn update_order_partial(&self, id: i64, changes: OrderChanges) -> Result<Option<Order>>;

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>>;

    async fn update_order_total(&self, id: i64, total: Money) -> Result<Option<Order>>;

    /// Deletes an order together with its items and assignment.
    async fn delete_order(&self, id: i64) -> Result<Option<Order>>;
}

#[async_trait]
pub trait OrderItemRepository: Send + Sync {
    /// Inserts an item. At most one row per `(order_id, product_id)`.
    async fn create_order_item(&self, item: OrderItem) -> Result<OrderItem>;

    async fn get_order_item(&self, order_id: i64, product_id: i64) -> Result<Option<OrderItem>>;

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>>;

    async fn order_item_exists(&self, order_id: i64, product_id: i64) -> Result<bool> {
        Ok(self.get_order_item(order_id, product_id).await?.is_some())
    }

    async fn update_order_item(
        &self,
        order_id: i64,
        product_id: i64,
        changes: OrderItemChanges,
    ) -> Result<Option<OrderItem>>;

    async fn delete_order_item(&self, order_id: i64, product_id: i64)
    -> Result<Option<OrderItem>>;

    /// Deletes every item of an order, returning the removed rows.
    async fn delete_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>>;
}

#[async_trait]
pub trait CourierRepository: Send + Sync {
    async fn create_courier(&self, courier: NewCourier) -> Result<Courier>;

    async fn get_courier(&self, id: i64) -> Result<Option<Courier>>;

    async fn list_couriers(&self, page: Page) -> Result<Vec<Courier>>;

    async fn filter_couriers(&self, filter: &CourierFilter) -> Result<Vec<Courier>>;

    async fn update_courier(&self, id: i64, courier: NewCourier) -> Result<Option<Courier>>;

    async fn update_courier_partial(
        &self,
        id: i64,
        changes: CourierChanges,
    ) -> Result<Option<Courier>>;

    /// Deletes a courier. Fails with a foreign-key violation while
    /// assignments reference it.
    async fn delete_courier(&self, id: i64) -> Result<Option<Courier>>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts an assignment. At most one per order.
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;

    async fn get_assignment(&self, id: i64) -> Result<Option<Assignment>>;

    async fn list_assignments(&self, page: Page) -> Result<Vec<Assignment>>;

    async fn get_assignment_by_order(&self, order_id: i64) -> Result<Option<Assignment>>;

    async fn list_assignments_by_courier(&self, courier_id: i64) -> Result<Vec<Assignment>>;

    async fn update_assignment_courier(
        &self,
        id: i64,
        courier_id: i64,
    ) -> Result<Option<Assignment>>;

    async fn delete_assignment(&self, id: i64) -> Result<Option<Assignment>>;
}

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Inserts a preference. At most one per `(customer_id, key)`.
    async fn create_preference(
        &self,
        customer_id: i64,
        key: &str,
        value: &str,
    ) -> Result<Preference>;

    async fn get_preference(&self, customer_id: i64, key: &str) -> Result<Option<Preference>>;

    /// Lists a customer's preferences ordered by key.
    async fn list_preferences(&self, customer_id: i64) -> Result<Vec<Preference>>;

    async fn update_preference(
        &self,
        customer_id: i64,
        key: &str,
        value: &str,
    ) -> Result<Option<Preference>>;

    async fn delete_preference(&self, customer_id: i64, key: &str) -> Result<Option<Preference>>;

    /// Deletes every preference of a customer, returning the removed rows.
    async fn delete_preferences(&self, customer_id: i64) -> Result<Vec<Preference>>;
}

/// A store offering every repository capability.
pub trait Store:
    CustomerRepository
    + AddressRepository
    + ProductRepository
    + OrderRepository
    + OrderItemRepository
    + CourierRepository
    + AssignmentRepository
    + PreferenceRepository
    + Clone
    + 'static
{
}

impl<T> Store for T where
    T: CustomerRepository
        + AddressRepository
        + ProductRepository
        + OrderRepository
        + OrderItemRepository
        + CourierRepository
        + AssignmentRepository
        + PreferenceRepository
        + Clone
        + 'static
{
}
