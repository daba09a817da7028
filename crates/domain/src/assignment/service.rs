//! Assignment service.

use store::{
    Assignment, AssignmentRepository, CourierRepository, OrderRepository, Page, StoreError,
    constraint,
};

use crate::error::{DomainError, Result};
use crate::telemetry::record_mutation;
use crate::validation::require_id;

use super::{
    AssignmentInput, normalize_assignment, normalize_courier_id, validate_assignment,
    validate_reassignment,
};

const ENTITY: &str = "assignment";

/// Assigns couriers to orders, one courier per order.
#[derive(Debug, Clone)]
pub struct AssignmentService<S> {
    store: S,
}

impl<S> AssignmentService<S>
where
    S: OrderRepository + CourierRepository + AssignmentRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_assignment(&self, input: AssignmentInput) -> Result<Assignment> {
        validate_assignment(&input)?;
        let assignment = normalize_assignment(&input)?;

        self.ensure_order(assignment.order_id).await?;
        self.ensure_courier(assignment.courier_id).await?;
        if self
            .store
            .get_assignment_by_order(assignment.order_id)
            .await?
            .is_some()
        {
            return Err(already_assigned());
        }

        let created = self
            .store
            .create_assignment(assignment)
            .await
            .map_err(translate_write_error)?;

        record_mutation(ENTITY, "create");
        tracing::info!(
            assignment_id = created.id,
            order_id = created.order_id,
            courier_id = created.courier_id,
            "Courier assigned"
        );
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_assignments(&self, page: Page) -> Result<Vec<Assignment>> {
        Ok(self.store.list_assignments(page).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_assignment(&self, id: i64) -> Result<Assignment> {
        require_id(id, "ID")?;
        self.store.get_assignment(id).await?.ok_or_else(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_order_assignment(&self, order_id: i64) -> Result<Assignment> {
        require_id(order_id, "order_id")?;
        self.ensure_order(order_id).await?;
        self.store
            .get_assignment_by_order(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("No courier assigned to this order"))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_courier_assignments(&self, courier_id: i64) -> Result<Vec<Assignment>> {
        require_id(courier_id, "courier_id")?;
        self.ensure_courier(courier_id).await?;
        Ok(self.store.list_assignments_by_courier(courier_id).await?)
    }

    /// Hands an assignment over to another courier.
    #[tracing::instrument(skip(self, input))]
    pub async fn reassign(&self, id: i64, input: AssignmentInput) -> Result<Assignment> {
        require_id(id, "ID")?;
        validate_reassignment(&input)?;
        let courier_id = normalize_courier_id(&input)?;

        self.ensure_courier(courier_id).await?;

        let updated = self
            .store
            .update_assignment_courier(id, courier_id)
            .await
            .map_err(translate_write_error)?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "reassign");
        tracing::info!(assignment_id = id, courier_id, "Courier reassigned");
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_assignment(&self, id: i64) -> Result<Assignment> {
        require_id(id, "ID")?;

        let deleted = self
            .store
            .delete_assignment(id)
            .await?
            .ok_or_else(not_found)?;

        record_mutation(ENTITY, "delete");
        tracing::info!(assignment_id = id, "Assignment deleted");
        Ok(deleted)
    }

    async fn ensure_order(&self, order_id: i64) -> Result<()> {
        match self.store.get_order(order_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Order not found")),
        }
    }

    async fn ensure_courier(&self, courier_id: i64) -> Result<()> {
        match self.store.get_courier(courier_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Courier not found")),
        }
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Assignment not found")
}

fn already_assigned() -> DomainError {
    DomainError::duplicate("This order already has an assigned courier")
}

fn translate_write_error(e: StoreError) -> DomainError {
    match e.constraint() {
        Some(constraint::ASSIGNMENT_ORDER) => already_assigned(),
        Some(constraint::ASSIGNMENT_ORDER_FK) if e.is_foreign_key_violation() => {
            DomainError::not_found("Order not found")
        }
        Some(constraint::ASSIGNMENT_COURIER) if e.is_foreign_key_violation() => {
            DomainError::not_found("Courier not found")
        }
        _ => e.into(),
    }
}
