//! HTTP handlers, one module per resource.

pub mod addresses;
pub mod assignments;
pub mod couriers;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod order_items;
pub mod orders;
pub mod preferences;
pub mod products;

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use domain::Services;
use domain::validation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use store::Page;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub services: Services<S>,
}

/// State extractor type shared by every resource router.
pub type SharedState<S> = axum::extract::State<Arc<AppState<S>>>;

/// Listing bounds as received in a query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Result<Page, ApiError> {
        Ok(validation::page(
            self.limit.as_deref(),
            self.offset.as_deref(),
        )?)
    }
}

/// Parses an identifier taken from the path.
pub fn path_id(raw: &str, label: &str) -> Result<i64, ApiError> {
    Ok(validation::parse_id(raw, label)?)
}

/// Response for a successful mutation: `{ "message": ..., <key>: record }`.
pub fn mutation<T: Serialize>(
    status: StatusCode,
    message: &str,
    key: &str,
    record: T,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let record = serde_json::to_value(record)
        .map_err(|e| ApiError::Internal(format!("Failed to encode response: {e}")))?;

    let mut body = Map::new();
    body.insert("message".to_string(), Value::String(message.to_string()));
    body.insert(key.to_string(), record);
    Ok((status, Json(Value::Object(body))))
}

/// Result type of a mutation handler.
pub type MutationResponse = Result<(StatusCode, Json<Value>), ApiError>;
