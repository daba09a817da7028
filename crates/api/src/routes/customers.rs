//! Customer endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use domain::CustomerInput;
use store::{Customer, Store};

use super::{AppState, MutationResponse, PageQuery, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/customers", get(list::<S>).post(create::<S>))
        .route(
            "/customers/{id}",
            get(get_one::<S>)
                .put(update::<S>)
                .patch(update_partial::<S>)
                .delete(delete::<S>),
        )
}

/// POST /customers — register a customer.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let customer = state.services.customers.add_customer(input).await?;
    mutation(
        StatusCode::CREATED,
        "Customer created successfully",
        "customer",
        customer,
    )
}

/// GET /customers — list customers.
#[tracing::instrument(skip(state, query))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let Query(query) = query?;
    let customers = state.services.customers.list_customers(query.page()?).await?;
    Ok(Json(customers))
}

/// GET /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let id = path_id(&id, "ID")?;
    Ok(Json(state.services.customers.get_customer(id).await?))
}

/// PUT /customers/{id} — replace a customer.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let customer = state.services.customers.update_customer(id, input).await?;
    mutation(
        StatusCode::OK,
        "Customer updated successfully",
        "customer",
        customer,
    )
}

/// PATCH /customers/{id} — change some fields of a customer.
#[tracing::instrument(skip(state, payload))]
pub async fn update_partial<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let customer = state
        .services
        .customers
        .update_customer_partial(id, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Customer updated successfully",
        "customer",
        customer,
    )
}

/// DELETE /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let customer = state.services.customers.delete_customer(id).await?;
    mutation(
        StatusCode::OK,
        "Customer deleted successfully",
        "customer",
        customer,
    )
}
