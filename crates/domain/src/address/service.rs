//! Address service.

use store::{Address, AddressRepository, CustomerRepository, Page, StoreError, constraint};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::{require_any_field, require_id};

use super::{AddressInput, normalize_address, normalize_address_changes, validate_address};

const ENTITY: &str = "address";

/// Manages customer addresses and keeps at most one primary per customer.
#[derive(Debug, Clone)]
pub struct AddressService<S> {
    store: S,
}

impl<S> AddressService<S>
where
    S: CustomerRepository + AddressRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an address for an existing customer.
    ///
    /// A primary address replaces the customer's previous primary in the
    /// same write.
    #[tracing::instrument(skip(self, input))]
    pub async fn create_address(&self, input: AddressInput) -> Result<Address> {
        validate_address(&input, false)?;
        let address = normalize_address(&input)?;

        self.ensure_customer(address.customer_id).await?;
        if address.is_primary {
            self.log_primary_replacement(address.customer_id, None)
                .await?;
        }

        let created = self
            .store
            .create_address(address)
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(
            address_id = created.id,
            customer_id = created.customer_id,
            is_primary = created.is_primary,
            "Address created"
        );
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_addresses(&self, page: Page) -> Result<Vec<Address>> {
        Ok(self.store.list_addresses(page).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_address(&self, id: i64) -> Result<Address> {
        require_id(id, "ID")?;
        self.store.get_address(id).await?.ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customer_addresses(&self, customer_id: i64) -> Result<Vec<Address>> {
        require_id(customer_id, "customer_id")?;
        self.ensure_customer(customer_id).await?;
        Ok(self.store.list_addresses_by_customer(customer_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_primary_address(&self, customer_id: i64) -> Result<Address> {
        require_id(customer_id, "customer_id")?;
        self.ensure_customer(customer_id).await?;
        self.store
            .get_primary_address(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Primary address not found for this customer"))
    }

    /// Replaces every field of an address.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_address(&self, id: i64, input: AddressInput) -> Result<Address> {
        require_id(id, "ID")?;
        validate_address(&input, false)?;
        let address = normalize_address(&input)?;

        self.get_address(id).await?;
        self.ensure_customer(address.customer_id).await?;
        if address.is_primary {
            self.log_primary_replacement(address.customer_id, Some(id))
                .await?;
        }

        let updated = self
            .store
            .update_address(id, address)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update");
        tracing::info!(address_id = id, "Address updated");
        Ok(updated)
    }

    /// Changes only the fields present in `input`.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_address_partial(&self, id: i64, input: AddressInput) -> Result<Address> {
        require_id(id, "ID")?;
        require_any_field(!input.is_empty())?;
        validate_address(&input, true)?;
        let changes = normalize_address_changes(&input)?;

        let current = self.get_address(id).await?;
        if let Some(customer_id) = changes.customer_id {
            self.ensure_customer(customer_id).await?;
        }
        if changes.is_primary == Some(true) {
            let owner = changes.customer_id.unwrap_or(current.customer_id);
            self.log_primary_replacement(owner, Some(id)).await?;
        }

        let updated = self
            .store
            .update_address_partial(id, changes)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_partial");
        tracing::info!(address_id = id, "Address partially updated");
        Ok(updated)
    }

    /// Deletes an address. The primary address must be reassigned first.
    #[tracing::instrument(skip(self))]
    pub async fn delete_address(&self, id: i64) -> Result<Address> {
        require_id(id, "ID")?;

        let address = self.get_address(id).await?;
        if address.is_primary {
            return Err(DomainError::validation(
                "Cannot delete the primary address; set another address as primary first",
            ));
        }

        let deleted = self
            .store
            .delete_address(id)
            .await
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    DomainError::validation("Cannot delete an address used by existing orders")
                } else {
                    e.into()
                }
            })?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(address_id = id, "Address deleted");
        Ok(deleted)
    }

    async fn ensure_customer(&self, customer_id: i64) -> Result<()> {
        match self.store.get_customer(customer_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Customer not found")),
        }
    }

    async fn log_primary_replacement(&self, customer_id: i64, keep: Option<i64>) -> Result<()> {
        if let Some(previous) = self.store.get_primary_address(customer_id).await?
            && Some(previous.id) != keep
        {
            tracing::warn!(
                customer_id,
                previous_address_id = previous.id,
                "Primary address replaced"
            );
        }
        Ok(())
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Address not found")
}

fn translate_write_error(e: StoreError) -> DomainError {
    match e.constraint() {
        Some(constraint::ADDRESS_ONE_PRIMARY) => {
            DomainError::duplicate("Customer already has a primary address")
        }
        Some(constraint::ADDRESS_CUSTOMER) if e.is_foreign_key_violation() => {
            DomainError::not_found("Customer not found")
        }
        _ => e.into(),
    }
}
