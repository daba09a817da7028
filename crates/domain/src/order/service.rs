//! Order service.

use store::{
    AddressRepository, CustomerRepository, Order, OrderItemRepository, OrderRepository, Page,
    StoreError, constraint,
};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::{require_any_field, require_id};

use super::{
    OrderInput, OrderMode, StatusInput, normalize_new_order, normalize_order_changes,
    normalize_order_update, normalize_status, order_total, validate_order, validate_status,
};

const ENTITY: &str = "order";

/// Places and maintains orders.
///
/// The total is never taken from a caller on creation; it starts at zero and
/// is derived from the order's items by [`OrderService::recompute_total`].
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S> OrderService<S>
where
    S: CustomerRepository + AddressRepository + OrderRepository + OrderItemRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order. The customer is checked before the address.
    #[tracing::instrument(skip(self, input))]
    pub async fn create_order(&self, input: OrderInput) -> Result<Order> {
        validate_order(&input, OrderMode::Create)?;
        let order = normalize_new_order(&input)?;

        self.ensure_customer(order.customer_id).await?;
        self.ensure_address(order.address_id).await?;

        let created = self
            .store
            .create_order(order)
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(
            order_id = created.id,
            customer_id = created.customer_id,
            "Order created"
        );
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, page: Page) -> Result<Vec<Order>> {
        Ok(self.store.list_orders(page).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: i64) -> Result<Order> {
        require_id(id, "ID")?;
        self.store.get_order(id).await?.ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customer_orders(&self, customer_id: i64) -> Result<Vec<Order>> {
        require_id(customer_id, "customer_id")?;
        self.ensure_customer(customer_id).await?;
        Ok(self.store.list_orders_by_customer(customer_id).await?)
    }

    /// Replaces every field of an order, total included.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_order(&self, id: i64, input: OrderInput) -> Result<Order> {
        require_id(id, "ID")?;
        validate_order(&input, OrderMode::Update)?;
        let order = normalize_order_update(&input)?;

        self.get_order(id).await?;
        self.ensure_customer(order.customer_id).await?;
        self.ensure_address(order.address_id).await?;

        let updated = self
            .store
            .update_order(id, order)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update");
        tracing::info!(order_id = id, "Order updated");
        Ok(updated)
    }

    /// Changes customer, address, payment method or status. The total is
    /// not part of a partial update.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_order_partial(&self, id: i64, input: OrderInput) -> Result<Order> {
        require_id(id, "ID")?;
        require_any_field(!input.is_empty())?;
        validate_order(&input, OrderMode::Partial)?;
        let changes = normalize_order_changes(&input)?;

        self.get_order(id).await?;
        if let Some(customer_id) = changes.customer_id {
            self.ensure_customer(customer_id).await?;
        }
        if let Some(address_id) = changes.address_id {
            self.ensure_address(address_id).await?;
        }

        let updated = self
            .store
            .update_order_partial(id, changes)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_partial");
        tracing::info!(order_id = id, "Order partially updated");
        Ok(updated)
    }

    /// Sets the status. Any status may follow any other.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_status(&self, id: i64, input: StatusInput) -> Result<Order> {
        require_id(id, "ID")?;
        validate_status(&input)?;
        let status = normalize_status(&input)?;

        let updated = self
            .store
            .update_order_status(id, status)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_status");
        tracing::info!(order_id = id, status = %status, "Order status updated");
        Ok(updated)
    }

    /// Recomputes the total as the sum of the order's item subtotals.
    #[tracing::instrument(skip(self))]
    pub async fn recompute_total(&self, id: i64) -> Result<Order> {
        require_id(id, "ID")?;
        self.get_order(id).await?;

        let items = self.store.list_order_items(id).await?;
        let total = order_total(&items)?;

        let updated = self
            .store
            .update_order_total(id, total)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_total");
        tracing::info!(order_id = id, total = %total, items = items.len(), "Order total recomputed");
        Ok(updated)
    }

    /// Deletes an order with its items and assignment.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: i64) -> Result<Order> {
        require_id(id, "ID")?;

        let deleted = self
            .store
            .delete_order(id)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(order_id = id, "Order deleted");
        Ok(deleted)
    }

    async fn ensure_customer(&self, customer_id: i64) -> Result<()> {
        match self.store.get_customer(customer_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Customer not found")),
        }
    }

    async fn ensure_address(&self, address_id: i64) -> Result<()> {
        match self.store.get_address(address_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Address not found")),
        }
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Order not found")
}

fn translate_write_error(e: StoreError) -> DomainError {
    match e.constraint() {
        Some(constraint::ORDER_CUSTOMER) if e.is_foreign_key_violation() => {
            DomainError::not_found("Customer not found")
        }
        Some(constraint::ORDER_ADDRESS) if e.is_foreign_key_violation() => {
            DomainError::not_found("Address not found")
        }
        _ => e.into(),
    }
}
