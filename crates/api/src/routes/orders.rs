//! Order endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use domain::{OrderInput, StatusInput};
use store::{Order, Store};

use super::{AppState, MutationResponse, PageQuery, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/orders", get(list::<S>).post(create::<S>))
        .route(
            "/orders/{id}",
            get(get_one::<S>)
                .put(update::<S>)
                .patch(update_partial::<S>)
                .delete(delete::<S>),
        )
        .route("/orders/{id}/status", patch(update_status::<S>))
        .route("/orders/{id}/total", patch(recompute_total::<S>))
        .route("/orders/customer/{customer_id}", get(by_customer::<S>))
}

/// POST /orders — place an order. Any `total` in the body is ignored.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let order = state.services.orders.create_order(input).await?;
    mutation(
        StatusCode::CREATED,
        "Order created successfully",
        "order",
        order,
    )
}

/// GET /orders
#[tracing::instrument(skip(state, query))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(
        state.services.orders.list_orders(query.page()?).await?,
    ))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = path_id(&id, "ID")?;
    Ok(Json(state.services.orders.get_order(id).await?))
}

/// GET /orders/customer/{customer_id}
#[tracing::instrument(skip(state))]
pub async fn by_customer<S: Store>(
    State(state): SharedState<S>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let customer_id = path_id(&customer_id, "customer_id")?;
    Ok(Json(
        state
            .services
            .orders
            .list_customer_orders(customer_id)
            .await?,
    ))
}

/// PUT /orders/{id} — replace an order, total included.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let order = state.services.orders.update_order(id, input).await?;
    mutation(StatusCode::OK, "Order updated successfully", "order", order)
}

/// PATCH /orders/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_partial<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let order = state
        .services
        .orders
        .update_order_partial(id, input)
        .await?;
    mutation(StatusCode::OK, "Order updated successfully", "order", order)
}

/// PATCH /orders/{id}/status
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<StatusInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let order = state.services.orders.update_status(id, input).await?;
    mutation(
        StatusCode::OK,
        "Order status updated successfully",
        "order",
        order,
    )
}

/// PATCH /orders/{id}/total — recompute the total from the order's items.
#[tracing::instrument(skip(state))]
pub async fn recompute_total<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let order = state.services.orders.recompute_total(id).await?;
    mutation(
        StatusCode::OK,
        "Order total updated successfully",
        "order",
        order,
    )
}

/// DELETE /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let order = state.services.orders.delete_order(id).await?;
    mutation(StatusCode::OK, "Order deleted successfully", "order", order)
}
