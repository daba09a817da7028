//! Customer preference endpoints, keyed by customer and preference key.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use domain::PreferenceInput;
use store::{Preference, Store};

use super::{AppState, MutationResponse, SharedState, mutation, path_id};
use crate::error::ApiError;

pub fn router<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route(
            "/preferences/{customer_id}",
            get(list::<S>).post(create::<S>).delete(delete_all::<S>),
        )
        .route(
            "/preferences/{customer_id}/{key}",
            get(get_one::<S>).put(update::<S>).delete(delete::<S>),
        )
}

/// POST /preferences/{customer_id}
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store>(
    State(state): SharedState<S>,
    Path(customer_id): Path<String>,
    payload: Result<Json<PreferenceInput>, JsonRejection>,
) -> MutationResponse {
    let customer_id = path_id(&customer_id, "customer_id")?;
    let Json(input) = payload?;
    let preference = state
        .services
        .preferences
        .create_preference(customer_id, input)
        .await?;
    mutation(
        StatusCode::CREATED,
        "Preference created successfully",
        "preference",
        preference,
    )
}

/// GET /preferences/{customer_id}
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): SharedState<S>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Preference>>, ApiError> {
    let customer_id = path_id(&customer_id, "customer_id")?;
    Ok(Json(
        state
            .services
            .preferences
            .list_preferences(customer_id)
            .await?,
    ))
}

/// GET /preferences/{customer_id}/{key}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: Store>(
    State(state): SharedState<S>,
    Path((customer_id, key)): Path<(String, String)>,
) -> Result<Json<Preference>, ApiError> {
    let customer_id = path_id(&customer_id, "customer_id")?;
    Ok(Json(
        state
            .services
            .preferences
            .get_preference(customer_id, &key)
            .await?,
    ))
}

/// PUT /preferences/{customer_id}/{key} — replace the stored value.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store>(
    State(state): SharedState<S>,
    Path((customer_id, key)): Path<(String, String)>,
    payload: Result<Json<PreferenceInput>, JsonRejection>,
) -> MutationResponse {
    let customer_id = path_id(&customer_id, "customer_id")?;
    let Json(input) = payload?;
    let preference = state
        .services
        .preferences
        .update_preference(customer_id, &key, input)
        .await?;
    mutation(
        StatusCode::OK,
        "Preference updated successfully",
        "preference",
        preference,
    )
}

/// DELETE /preferences/{customer_id}/{key}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): SharedState<S>,
    Path((customer_id, key)): Path<(String, String)>,
) -> MutationResponse {
    let customer_id = path_id(&customer_id, "customer_id")?;
    let preference = state
        .services
        .preferences
        .delete_preference(customer_id, &key)
        .await?;
    mutation(
        StatusCode::OK,
        "Preference deleted successfully",
        "preference",
        preference,
    )
}

/// DELETE /preferences/{customer_id}
#[tracing::instrument(skip(state))]
pub async fn delete_all<S: Store>(
    State(state): SharedState<S>,
    Path(customer_id): Path<String>,
) -> MutationResponse {
    let customer_id = path_id(&customer_id, "customer_id")?;
    let preferences = state
        .services
        .preferences
        .delete_preferences(customer_id)
        .await?;
    mutation(
        StatusCode::OK,
        "Preferences deleted successfully",
        "preferences",
        preferences,
    )
}
