//! HTTP API server for the delivery backend.
//!
//! Exposes REST endpoints for customers, addresses, products, orders,
//! order items, couriers, assignments and preferences, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use domain::Services;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(routes::customers::router::<S>())
        .merge(routes::addresses::router::<S>())
        .merge(routes::products::router::<S>())
        .merge(routes::orders::router::<S>())
        .merge(routes::order_items::router::<S>())
        .merge(routes::couriers::router::<S>())
        .merge(routes::assignments::router::<S>())
        .merge(routes::preferences::router::<S>())
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state over a store.
pub fn create_state<S: Store>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        services: Services::new(store),
    })
}
