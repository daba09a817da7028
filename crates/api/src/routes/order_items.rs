//! Order item endpoints, keyed by order and product.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use domain::OrderItemInput;
use store::{OrderItem, Store};

use super::{AppState, MutationResponse, SharedState, mutation, path_id};
use crate::error::ApiError;

const KEY: &str = "order_item";

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/order-items", post(create::<S>))
        .route(
            "/order-items/order/{order_id}",
            get(list::<S>).delete(delete_all::<S>),
        )
        .route(
            "/order-items/order/{order_id}/product/{product_id}",
            get(get_one::<S>).patch(update::<S>).delete(delete::<S>),
        )
        .route(
            "/order-items/order/{order_id}/product/{product_id}/quantity",
            patch(update_quantity::<S>),
        )
        .route(
            "/order-items/order/{order_id}/product/{product_id}/price",
            patch(update_price::<S>),
        )
}

fn item_key(order_id: &str, product_id: &str) -> Result<(i64, i64), ApiError> {
    Ok((
        path_id(order_id, "order_id")?,
        path_id(product_id, "product_id")?,
    ))
}

/// POST /order-items — add a product to an order at its current price.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<OrderItemInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let item = state.services.order_items.add_item(input).await?;
    mutation(
        StatusCode::CREATED,
        "Order item created successfully",
        KEY,
        item,
    )
}

/// GET /order-items/order/{order_id}
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<OrderItem>>, ApiError> {
    let order_id = path_id(&order_id, "order_id")?;
    Ok(Json(state.services.order_items.list_items(order_id).await?))
}

/// GET /order-items/order/{order_id}/product/{product_id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path((order_id, product_id)): Path<(String, String)>,
) -> Result<Json<OrderItem>, ApiError> {
    let (order_id, product_id) = item_key(&order_id, &product_id)?;
    Ok(Json(
        state
            .services
            .order_items
            .get_item(order_id, product_id)
            .await?,
    ))
}

/// PATCH /order-items/order/{order_id}/product/{product_id} — change
/// quantity, price or both.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path((order_id, product_id)): Path<(String, String)>,
    payload: Result<Json<OrderItemInput>, JsonRejection>,
) -> MutationResponse {
    let (order_id, product_id) = item_key(&order_id, &product_id)?;
    let Json(input) = payload?;
    let item = state
        .services
        .order_items
        .update_item(order_id, product_id, input)
        .await?;
    mutation(StatusCode::OK, "Order item updated successfully", KEY, item)
}

/// PATCH /order-items/order/{order_id}/product/{product_id}/quantity
#[tracing::instrument(skip(state, payload))]
pub async fn update_quantity<S: Store>(
    State(state): SharedState<S>,
    Path((order_id, product_id)): Path<(String, String)>,
    payload: Result<Json<OrderItemInput>, JsonRejection>,
) -> MutationResponse {
    let (order_id, product_id) = item_key(&order_id, &product_id)?;
    let Json(input) = payload?;
    let item = state
        .services
        .order_items
        .update_quantity(order_id, product_id, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Order item quantity updated successfully",
        KEY,
        item,
    )
}

/// PATCH /order-items/order/{order_id}/product/{product_id}/price
#[tracing::instrument(skip(state, payload))]
pub async fn update_price<S: Store>(
    State(state): SharedState<S>,
    Path((order_id, product_id)): Path<(String, String)>,
    payload: Result<Json<OrderItemInput>, JsonRejection>,
) -> MutationResponse {
    let (order_id, product_id) = item_key(&order_id, &product_id)?;
    let Json(input) = payload?;
    let item = state
        .services
        .order_items
        .update_price(order_id, product_id, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Order item price updated successfully",
        KEY,
        item,
    )
}

/// DELETE /order-items/order/{order_id}/product/{product_id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path((order_id, product_id)): Path<(String, String)>,
) -> MutationResponse {
    let (order_id, product_id) = item_key(&order_id, &product_id)?;
    let item = state
        .services
        .order_items
        .delete_item(order_id, product_id)
        .await?;
    mutation(StatusCode::OK, "Order item deleted successfully", KEY, item)
}

/// DELETE /order-items/order/{order_id} — remove every item of an order.
#[tracing::instrument(skip(state))]
pub async fn delete_all<S: Store>(
    State(state): SharedState<S>,
    Path(order_id): Path<String>,
) -> MutationResponse {
    let order_id = path_id(&order_id, "order_id")?;
    let items = state.services.order_items.delete_items(order_id).await?;
    mutation(
        StatusCode::OK,
        "Order items deleted successfully",
        "order_items",
        items,
    )
}
