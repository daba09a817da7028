//! Customer preference service.

use store::{CustomerRepository, Preference, PreferenceRepository, StoreError, constraint};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::require_id;

use super::{
    PreferenceInput, normalize_key, normalize_value, parse_preference_key, validate_preference,
    validate_preference_value,
};

const ENTITY: &str = "preference";

/// Stores key/value preferences per customer. Every operation checks the
/// customer first.
#[derive(Debug, Clone)]
pub struct PreferenceService<S> {
    store: S,
}

impl<S> PreferenceService<S>
where
    S: CustomerRepository + PreferenceRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_preference(
        &self,
        customer_id: i64,
        input: PreferenceInput,
    ) -> Result<Preference> {
        require_id(customer_id, "customer_id")?;
        validate_preference(&input)?;
        let key = normalize_key(&input)?;
        let value = normalize_value(&input)?;

        self.ensure_customer(customer_id).await?;
        if self.store.get_preference(customer_id, &key).await?.is_some() {
            return Err(duplicate_key());
        }

        let created = self
            .store
            .create_preference(customer_id, &key, &value)
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(customer_id, key = %key, "Preference created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_preferences(&self, customer_id: i64) -> Result<Vec<Preference>> {
        require_id(customer_id, "customer_id")?;
        self.ensure_customer(customer_id).await?;
        Ok(self.store.list_preferences(customer_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_preference(&self, customer_id: i64, key: &str) -> Result<Preference> {
        require_id(customer_id, "customer_id")?;
        let key = parse_preference_key(key)?;
        self.ensure_customer(customer_id).await?;
        self.store
            .get_preference(customer_id, &key)
            .await?
            .ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_preference(
        &self,
        customer_id: i64,
        key: &str,
        input: PreferenceInput,
    ) -> Result<Preference> {
        require_id(customer_id, "customer_id")?;
        let key = parse_preference_key(key)?;
        validate_preference_value(&input)?;
        let value = normalize_value(&input)?;

        self.ensure_customer(customer_id).await?;
        self.ensure_preference(customer_id, &key).await?;

        let updated = self
            .store
            .update_preference(customer_id, &key, &value)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update");
        tracing::info!(customer_id, key = %key, "Preference updated");
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_preference(&self, customer_id: i64, key: &str) -> Result<Preference> {
        require_id(customer_id, "customer_id")?;
        let key = parse_preference_key(key)?;

        self.ensure_customer(customer_id).await?;
        self.ensure_preference(customer_id, &key).await?;

        let deleted = self
            .store
            .delete_preference(customer_id, &key)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(customer_id, key = %key, "Preference deleted");
        Ok(deleted)
    }

    /// Removes every preference of a customer and returns them.
    #[tracing::instrument(skip(self))]
    pub async fn delete_preferences(&self, customer_id: i64) -> Result<Vec<Preference>> {
        require_id(customer_id, "customer_id")?;
        self.ensure_customer(customer_id).await?;

        let deleted = self.store.delete_preferences(customer_id).await?;

        record_mutation(ENTITY, "delete_all");
        tracing::info!(customer_id, count = deleted.len(), "Preferences deleted");
        Ok(deleted)
    }

    async fn ensure_customer(&self, customer_id: i64) -> Result<()> {
        match self.store.get_customer(customer_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Customer not found")),
        }
    }

    async fn ensure_preference(&self, customer_id: i64, key: &str) -> Result<()> {
        match self.store.get_preference(customer_id, key).await? {
            Some(_) => Ok(()),
            None => Err(not_found()),
        }
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Preference not found")
}

fn duplicate_key() -> DomainError {
    DomainError::duplicate("This preference already exists for the customer")
}

fn translate_write_error(e: StoreError) -> DomainError {
    match e.constraint() {
        Some(constraint::PREFERENCE_KEY) => duplicate_key(),
        Some(constraint::PREFERENCE_CUSTOMER) if e.is_foreign_key_violation() => {
            DomainError::not_found("Customer not found")
        }
        _ => e.into(),
    }
}
