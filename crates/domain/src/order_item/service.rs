//! Order item service.

use store::{
    OrderItem, OrderItemRepository, OrderRepository, Product, ProductRepository, StoreError,
    constraint,
};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::require_id;

use super::{
    ItemChange, OrderItemInput, normalize_item_change, normalize_new_item, validate_item_change,
    validate_new_item,
};

const ENTITY: &str = "order_item";

/// Manages the line items of orders.
#[derive(Debug, Clone)]
pub struct OrderItemService<S> {
    store: S,
}

impl<S> OrderItemService<S>
where
    S: OrderRepository + ProductRepository + OrderItemRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a product to an order, capturing the product's current price.
    #[tracing::instrument(skip(self, input))]
    pub async fn add_item(&self, input: OrderItemInput) -> Result<OrderItem> {
        validate_new_item(&input)?;
        let item = normalize_new_item(&input)?;

        self.ensure_order(item.order_id).await?;
        let product = self.load_product(item.product_id).await?;
        if self
            .store
            .order_item_exists(item.order_id, item.product_id)
            .await?
        {
            return Err(duplicate_item());
        }

        let created = self
            .store
            .create_order_item(OrderItem {
                order_id: item.order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: product.price,
            })
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(
            order_id = created.order_id,
            product_id = created.product_id,
            quantity = created.quantity,
            price = %created.price,
            "Order item added"
        );
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        require_id(order_id, "order_id")?;
        self.ensure_order(order_id).await?;
        Ok(self.store.list_order_items(order_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_item(&self, order_id: i64, product_id: i64) -> Result<OrderItem> {
        require_id(order_id, "order_id")?;
        require_id(product_id, "product_id")?;
        self.store
            .get_order_item(order_id, product_id)
            .await?
            .ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_quantity(
        &self,
        order_id: i64,
        product_id: i64,
        input: OrderItemInput,
    ) -> Result<OrderItem> {
        self.change_item(order_id, product_id, input, ItemChange::Quantity)
            .await
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_price(
        &self,
        order_id: i64,
        product_id: i64,
        input: OrderItemInput,
    ) -> Result<OrderItem> {
        self.change_item(order_id, product_id, input, ItemChange::Price)
            .await
    }

    /// Changes quantity, price or both.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        order_id: i64,
        product_id: i64,
        input: OrderItemInput,
    ) -> Result<OrderItem> {
        self.change_item(order_id, product_id, input, ItemChange::Any)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_item(&self, order_id: i64, product_id: i64) -> Result<OrderItem> {
        require_id(order_id, "order_id")?;
        require_id(product_id, "product_id")?;

        let deleted = self
            .store
            .delete_order_item(order_id, product_id)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(order_id, product_id, "Order item deleted");
        Ok(deleted)
    }

    /// Removes every item of an order and returns them.
    #[tracing::instrument(skip(self))]
    pub async fn delete_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        require_id(order_id, "order_id")?;
        self.ensure_order(order_id).await?;

        let deleted = self.store.delete_order_items(order_id).await?;

        record_mutation(ENTITY, "delete_all");
        tracing::info!(order_id, count = deleted.len(), "Order items deleted");
        Ok(deleted)
    }

    async fn change_item(
        &self,
        order_id: i64,
        product_id: i64,
        input: OrderItemInput,
        change: ItemChange,
    ) -> Result<OrderItem> {
        require_id(order_id, "order_id")?;
        require_id(product_id, "product_id")?;
        validate_item_change(&input, change)?;
        let changes = normalize_item_change(&input, change)?;

        self.ensure_order(order_id).await?;
        self.load_product(product_id).await?;

        let updated = self
            .store
            .update_order_item(order_id, product_id, changes)
            .await?
            .ok_or_else(not_found)?;

        let operation = match change {
            ItemChange::Quantity => "update_quantity",
            ItemChange::Price => "update_price",
            ItemChange::Any => "update",
        };
        record_mutation(ENTITY, operation);
        tracing::info!(order_id, product_id, operation, "Order item updated");
        Ok(updated)
    }

    async fn ensure_order(&self, order_id: i64) -> Result<()> {
        match self.store.get_order(order_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Order not found")),
        }
    }

    async fn load_product(&self, product_id: i64) -> Result<Product> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product not found"))
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Order item not found")
}

fn duplicate_item() -> DomainError {
    DomainError::duplicate("This product is already in the order")
}

fn translate_write_error(e: StoreError) -> DomainError {
    match e.constraint() {
        Some(constraint::ORDER_ITEM_KEY) => duplicate_item(),
        Some(constraint::ORDER_ITEM_ORDER) if e.is_foreign_key_violation() => {
            DomainError::not_found("Order not found")
        }
        Some(constraint::ORDER_ITEM_PRODUCT) if e.is_foreign_key_violation() => {
            DomainError::not_found("Product not found")
        }
        _ => e.into(),
    }
}
