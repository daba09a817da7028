//! Address endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use domain::AddressInput;
use store::{Address, Store};

use super::{AppState, MutationResponse, PageQuery, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/addresses", get(list::<S>).post(create::<S>))
        .route(
            "/addresses/{id}",
            get(get_one::<S>)
                .put(update::<S>)
                .patch(update_partial::<S>)
                .delete(delete::<S>),
        )
        .route(
            "/addresses/customer/{customer_id}",
            get(by_customer::<S>),
        )
        .route("/addresses/primary/{customer_id}", get(primary::<S>))
}

/// POST /addresses — create an address; a primary one replaces the
/// customer's previous primary.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<AddressInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let address = state.services.addresses.create_address(input).await?;
    mutation(
        StatusCode::CREATED,
        "Address created successfully",
        "address",
        address,
    )
}

/// GET /addresses
#[tracing::instrument(skip(state, query))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let Query(query) = query?;
    let addresses = state.services.addresses.list_addresses(query.page()?).await?;
    Ok(Json(addresses))
}

/// GET /addresses/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<Address>, ApiError> {
    let id = path_id(&id, "ID")?;
    Ok(Json(state.services.addresses.get_address(id).await?))
}

/// GET /addresses/customer/{customer_id}
#[tracing::instrument(skip(state))]
pub async fn by_customer<S: Store>(
    State(state): SharedState<S>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let customer_id = path_id(&customer_id, "customer_id")?;
    let addresses = state
        .services
        .addresses
        .list_customer_addresses(customer_id)
        .await?;
    Ok(Json(addresses))
}

/// GET /addresses/primary/{customer_id}
#[tracing::instrument(skip(state))]
pub async fn primary<S: Store>(
    State(state): SharedState<S>,
    Path(customer_id): Path<String>,
) -> Result<Json<Address>, ApiError> {
    let customer_id = path_id(&customer_id, "customer_id")?;
    let address = state
        .services
        .addresses
        .get_primary_address(customer_id)
        .await?;
    Ok(Json(address))
}

/// PUT /addresses/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<AddressInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let address = state.services.addresses.update_address(id, input).await?;
    mutation(
        StatusCode::OK,
        "Address updated successfully",
        "address",
        address,
    )
}

/// PATCH /addresses/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_partial<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<AddressInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let address = state
        .services
        .addresses
        .update_address_partial(id, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Address updated successfully",
        "address",
        address,
    )
}

/// DELETE /addresses/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let address = state.services.addresses.delete_address(id).await?;
    mutation(
        StatusCode::OK,
        "Address deleted successfully",
        "address",
        address,
    )
}
