//! Courier assignment endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use domain::AssignmentInput;
use store::{Assignment, Store};

use super::{AppState, MutationResponse, PageQuery, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/assignments", get(list::<S>).post(create::<S>))
        .route(
            "/assignments/{id}",
            get(get_one::<S>).put(reassign::<S>).delete(delete::<S>),
        )
        .route("/assignments/order/{order_id}", get(by_order::<S>))
        .route("/assignments/courier/{courier_id}", get(by_courier::<S>))
}

/// POST /assignments — assign a courier to an order.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<AssignmentInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let assignment = state
        .services
        .assignments
        .create_assignment(input)
        .await?;
    mutation(
        StatusCode::CREATED,
        "Assignment created successfully",
        "assignment",
        assignment,
    )
}

/// GET /assignments
#[tracing::instrument(skip(state, query))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(
        state
            .services
            .assignments
            .list_assignments(query.page()?)
            .await?,
    ))
}

/// GET /assignments/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, ApiError> {
    let id = path_id(&id, "ID")?;
    Ok(Json(state.services.assignments.get_assignment(id).await?))
}

/// GET /assignments/order/{order_id}
#[tracing::instrument(skip(state))]
pub async fn by_order<S: Store>(
    State(state): SharedState<S>,
    Path(order_id): Path<String>,
) -> Result<Json<Assignment>, ApiError> {
    let order_id = path_id(&order_id, "order_id")?;
    Ok(Json(
        state
            .services
            .assignments
            .get_order_assignment(order_id)
            .await?,
    ))
}

/// GET /assignments/courier/{courier_id}
#[tracing::instrument(skip(state))]
pub async fn by_courier<S: Store>(
    State(state): SharedState<S>,
    Path(courier_id): Path<String>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let courier_id = path_id(&courier_id, "courier_id")?;
    Ok(Json(
        state
            .services
            .assignments
            .list_courier_assignments(courier_id)
            .await?,
    ))
}

/// PUT /assignments/{id} — hand the order to another courier.
#[tracing::instrument(skip(state, payload))]
pub async fn reassign<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<AssignmentInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let assignment = state.services.assignments.reassign(id, input).await?;
    mutation(
        StatusCode::OK,
        "Assignment updated successfully",
        "assignment",
        assignment,
    )
}

/// DELETE /assignments/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let assignment = state.services.assignments.delete_assignment(id).await?;
    mutation(
        StatusCode::OK,
        "Assignment deleted successfully",
        "assignment",
        assignment,
    )
}
