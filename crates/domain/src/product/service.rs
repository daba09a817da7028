//! Product service.

use store::{Page, Product, ProductRepository, StoreError, constraint};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::{require_any_field, require_id};

use super::{
    ProductFilterInput, ProductInput, normalize_product, normalize_product_changes,
    parse_product_filter, validate_product,
};

const ENTITY: &str = "product";

/// Manages the product catalogue. Names are unique regardless of case.
#[derive(Debug, Clone)]
pub struct ProductService<S> {
    store: S,
}

impl<S: ProductRepository> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        validate_product(&input, false)?;
        let product = normalize_product(&input)?;
        self.ensure_name_available(&product.name, None).await?;

        let created = self
            .store
            .create_product(product)
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(product_id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, page: Page) -> Result<Vec<Product>> {
        Ok(self.store.list_products(page).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<Product> {
        require_id(id, "ID")?;
        self.store.get_product(id).await?.ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn filter_products(&self, input: ProductFilterInput) -> Result<Vec<Product>> {
        let filter = parse_product_filter(&input)?;
        Ok(self.store.filter_products(&filter).await?)
    }

    /// Replaces every field of a product.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<Product> {
        require_id(id, "ID")?;
        validate_product(&input, false)?;
        let product = normalize_product(&input)?;

        self.get_product(id).await?;
        self.ensure_name_available(&product.name, Some(id)).await?;

        let updated = self
            .store
            .update_product(id, product)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update");
        tracing::info!(product_id = id, "Product updated");
        Ok(updated)
    }

    /// Changes only the fields present in `input`.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_product_partial(&self, id: i64, input: ProductInput) -> Result<Product> {
        require_id(id, "ID")?;
        require_any_field(!input.is_empty())?;
        validate_product(&input, true)?;
        let changes = normalize_product_changes(&input);

        self.get_product(id).await?;
        if let Some(name) = changes.name.as_deref() {
            self.ensure_name_available(name, Some(id)).await?;
        }

        let updated = self
            .store
            .update_product_partial(id, changes)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_partial");
        tracing::info!(product_id = id, "Product partially updated");
        Ok(updated)
    }

    /// Marks a product inactive. Repeating the call is harmless.
    #[tracing::instrument(skip(self))]
    pub async fn soft_delete_product(&self, id: i64) -> Result<Product> {
        require_id(id, "ID")?;

        let product = self
            .store
            .deactivate_product(id)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "soft_delete");
        tracing::info!(product_id = id, "Product deactivated");
        Ok(product)
    }

    /// Removes a product row. Products on existing orders cannot be removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<Product> {
        require_id(id, "ID")?;

        let deleted = self
            .store
            .delete_product(id)
            .await
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    DomainError::validation(
                        "Cannot delete a product referenced by order items; deactivate it instead",
                    )
                } else {
                    e.into()
                }
            })?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(product_id = id, "Product deleted");
        Ok(deleted)
    }

    /// Fails when another product already uses `name`, ignoring case.
    async fn ensure_name_available(&self, name: &str, current: Option<i64>) -> Result<()> {
        match self.store.find_product_by_name(name).await? {
            Some(existing) if Some(existing.id) != current => Err(duplicate_name()),
            _ => Ok(()),
        }
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Product not found")
}

fn duplicate_name() -> DomainError {
    DomainError::duplicate("A product with this name already exists")
}

fn translate_write_error(e: StoreError) -> DomainError {
    if e.constraint() == Some(constraint::PRODUCT_NAME) {
        duplicate_name()
    } else {
        e.into()
    }
}
