//! Customer service.

use store::{Customer, CustomerRepository, Page, StoreError, constraint};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::{require_any_field, require_id};

use super::{
    CustomerInput, normalize_customer, normalize_customer_changes, validate_customer,
};

const ENTITY: &str = "customer";

/// Registers, reads, updates and removes customers.
#[derive(Debug, Clone)]
pub struct CustomerService<S> {
    store: S,
}

impl<S: CustomerRepository> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a customer. Phone numbers are unique.
    #[tracing::instrument(skip(self, input))]
    pub async fn add_customer(&self, input: CustomerInput) -> Result<Customer> {
        validate_customer(&input, false)?;
        let customer = normalize_customer(&input)?;

        let created = self
            .store
            .create_customer(customer)
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(customer_id = created.id, "Customer created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self, page: Page) -> Result<Vec<Customer>> {
        Ok(self.store.list_customers(page).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        require_id(id, "ID")?;
        self.store
            .get_customer(id)
            .await?
            .ok_or_else(not_found)
    }

    /// Replaces every field of a customer.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_customer(&self, id: i64, input: CustomerInput) -> Result<Customer> {
        require_id(id, "ID")?;
        validate_customer(&input, false)?;
        let customer = normalize_customer(&input)?;

        let updated = self
            .store
            .update_customer(id, customer)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update");
        tracing::info!(customer_id = id, "Customer updated");
        Ok(updated)
    }

    /// Changes only the fields present in `input`.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_customer_partial(
        &self,
        id: i64,
        input: CustomerInput,
    ) -> Result<Customer> {
        require_id(id, "ID")?;
        require_any_field(!input.is_empty())?;
        validate_customer(&input, true)?;

        let updated = self
            .store
            .update_customer_partial(id, normalize_customer_changes(&input))
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "update_partial");
        tracing::info!(customer_id = id, "Customer partially updated");
        Ok(updated)
    }

    /// Deletes a customer. Customers with orders cannot be deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: i64) -> Result<Customer> {
        require_id(id, "ID")?;

        let deleted = self
            .store
            .delete_customer(id)
            .await
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    DomainError::validation("Cannot delete customer with existing orders")
                } else {
                    e.into()
                }
            })?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(customer_id = id, "Customer deleted");
        Ok(deleted)
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Customer not found")
}

fn translate_write_error(e: StoreError) -> DomainError {
    if e.constraint() == Some(constraint::CUSTOMER_PHONE) {
        DomainError::duplicate("A customer with this phone number already exists")
    } else {
        e.into()
    }
}
