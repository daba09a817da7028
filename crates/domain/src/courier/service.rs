//! Courier service.

use store::{Courier, CourierRepository, Page};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::{require_any_field, require_id};

use super::{
    CourierFilterInput, CourierInput, normalize_courier, normalize_courier_changes,
    parse_courier_filter, validate_courier,
};

const ENTITY: &str = "courier";

#[derive(Debug, Clone)]
pub struct CourierService<S> {
    store: S,
}

impl<S: CourierRepository> CourierService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_courier(&self, input: CourierInput) -> Result<Courier> {
        validate_courier(&input, false)?;
        let created = self
            .store
            .create_courier(normalize_courier(&input)?)
            .await?;

        record_mutation(ENTITY, "create");
        tracing::info!(courier_id = created.id, "Courier created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_couriers(&self, page: Page) -> Result<Vec<Courier>> {
        Ok(self.store.list_couriers(page).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_courier(&self, id: i64) -> Result<Courier> {
        require_id(id, "ID")?;
        self.store.get_courier(id).await?.ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn filter_couriers(&self, input: CourierFilterInput) -> Result<Vec<Courier>> {
        let filter = parse_courier_filter(&input)?;
        Ok(self.store.filter_couriers(&filter).await?)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_courier(&self, id: i64, input: CourierInput) -> Result<Courier> {
        require_id(id, "ID")?;
        validate_courier(&input, false)?;

        let updated = self
            .store
            .update_courier(id, normalize_courier(&input)?)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update");
        tracing::info!(courier_id = id, "Courier updated");
        Ok(updated)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_courier_partial(&self, id: i64, input: CourierInput) -> Result<Courier> {
        require_id(id, "ID")?;
        require_any_field(!input.is_empty())?;
        validate_courier(&input, true)?;

        let updated = self
            .store
            .update_courier_partial(id, normalize_courier_changes(&input))
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_partial");
        tracing::info!(courier_id = id, "Courier partially updated");
        Ok(updated)
    }

    /// Deletes a courier. Couriers with assignments cannot be deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete_courier(&self, id: i64) -> Result<Courier> {
        require_id(id, "ID")?;

        let deleted = self
            .store
            .delete_courier(id)
            .await
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    DomainError::validation("Cannot delete a courier with existing assignments")
                } else {
                    e.into()
                }
            })?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(courier_id = id, "Courier deleted");
        Ok(deleted)
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Courier not found")
}
