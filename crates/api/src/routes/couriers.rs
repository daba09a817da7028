//! Courier endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use domain::{CourierFilterInput, CourierInput};
use store::{Courier, Store};

use super::{AppState, MutationResponse, PageQuery, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/couriers", get(list::<S>).post(create::<S>))
        .route("/couriers/filter", get(filter::<S>))
        .route(
            "/couriers/{id}",
            get(get_one::<S>)
                .put(update::<S>)
                .patch(update_partial::<S>)
                .delete(delete::<S>),
        )
}

/// POST /couriers
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<CourierInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let courier = state.services.couriers.create_courier(input).await?;
    mutation(
        StatusCode::CREATED,
        "Courier created successfully",
        "courier",
        courier,
    )
}

/// GET /couriers
#[tracing::instrument(skip(state, query))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Courier>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(
        state.services.couriers.list_couriers(query.page()?).await?,
    ))
}

/// GET /couriers/filter?available=&vehicle=
#[tracing::instrument(skip(state, query))]
pub async fn filter<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<CourierFilterInput>, QueryRejection>,
) -> Result<Json<Vec<Courier>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.services.couriers.filter_couriers(query).await?))
}

/// GET /couriers/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<Courier>, ApiError> {
    let id = path_id(&id, "ID")?;
    Ok(Json(state.services.couriers.get_courier(id).await?))
}

/// PUT /couriers/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<CourierInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let courier = state.services.couriers.update_courier(id, input).await?;
    mutation(
        StatusCode::OK,
        "Courier updated successfully",
        "courier",
        courier,
    )
}

/// PATCH /couriers/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_partial<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<CourierInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let courier = state
        .services
        .couriers
        .update_courier_partial(id, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Courier updated successfully",
        "courier",
        courier,
    )
}

/// DELETE /couriers/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let courier = state.services.couriers.delete_courier(id).await?;
    mutation(
        StatusCode::OK,
        "Courier deleted successfully",
        "courier",
        courier,
    )
}
