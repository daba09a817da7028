//! Product endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete as delete_route, get};
use axum::{Json, Router};
use domain::{ProductFilterInput, ProductInput};
use store::{Product, Store};

use super::{AppState, MutationResponse, PageQuery, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/products", get(list::<S>).post(create::<S>))
        .route("/products/filter", get(filter::<S>))
        .route("/products/soft/{id}", delete_route(soft_delete::<S>))
        .route(
            "/products/{id}",
            get(get_one::<S>)
                .put(update::<S>)
                .patch(update_partial::<S>)
                .delete(delete::<S>),
        )
}

/// POST /products
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> MutationResponse {
    let Json(input) = payload?;
    let product = state.services.products.create_product(input).await?;
    mutation(
        StatusCode::CREATED,
        "Product created successfully",
        "product",
        product,
    )
}

/// GET /products
#[tracing::instrument(skip(state, query))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    let products = state.services.products.list_products(query.page()?).await?;
    Ok(Json(products))
}

/// GET /products/filter?name=&min_price=&max_price=&is_active=
#[tracing::instrument(skip(state, query))]
pub async fn filter<S: Store>(
    State(state): SharedState<S>,
    query: Result<Query<ProductFilterInput>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.services.products.filter_products(query).await?))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = path_id(&id, "ID")?;
    Ok(Json(state.services.products.get_product(id).await?))
}

/// PUT /products/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let product = state.services.products.update_product(id, input).await?;
    mutation(
        StatusCode::OK,
        "Product updated successfully",
        "product",
        product,
    )
}

/// PATCH /products/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_partial<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let Json(input) = payload?;
    let product = state
        .services
        .products
        .update_product_partial(id, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Product updated successfully",
        "product",
        product,
    )
}

/// DELETE /products/soft/{id} — mark a product inactive.
#[tracing::instrument(skip(state))]
pub async fn soft_delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let product = state.services.products.soft_delete_product(id).await?;
    mutation(
        StatusCode::OK,
        "Product deactivated successfully",
        "product",
        product,
    )
}

/// DELETE /products/{id} — remove a product row.
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> MutationResponse {
    let id = path_id(&id, "ID")?;
    let product = state.services.products.delete_product(id).await?;
    mutation(
        StatusCode::OK,
        "Product deleted successfully",
        "product",
        product,
    )
}
