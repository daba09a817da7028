//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_state(InMemoryStore::default());
    api::create_app(state, get_metrics_handle())
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_customer(app: &axum::Router, phone: &str) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/customers",
        Some(json!({ "name": "Ana Gomez", "phone": phone, "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["customer"]["id"].as_i64().unwrap()
}

async fn create_address(app: &axum::Router, customer_id: i64, is_primary: bool) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/addresses",
        Some(json!({
            "customer_id": customer_id,
            "label": "Casa",
            "address_text": "Calle 1 # 2-3",
            "latitude": 4.65,
            "longitude": -74.05,
            "is_primary": is_primary
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["address"]["id"].as_i64().unwrap()
}

async fn create_product(app: &axum::Router, name: &str, price: f64) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/products",
        Some(json!({ "name": name, "price": price, "is_active": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["product"]["id"].as_i64().unwrap()
}

async fn create_order(app: &axum::Router, customer_id: i64, address_id: i64) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": customer_id,
            "address_id": address_id,
            "payment_method": "cash"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["order"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    create_customer(&app, "3001112233").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/plain"));
}

#[tokio::test]
async fn test_create_customer_with_null_email() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({ "name": "  Ana  ", "phone": "300 123 4567", "email": null })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Customer created successfully");
    assert_eq!(json["customer"]["name"], "Ana");
    assert!(json["customer"]["email"].is_null());
}

#[tokio::test]
async fn test_customer_validation_collects_every_message() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({ "name": "A", "phone": "abc", "email": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("name must be between 2 and 100 characters"));
    assert!(error.contains("phone"));
    assert!(error.contains("email"));
}

#[tokio::test]
async fn test_duplicate_phone_is_conflict() {
    let app = setup();
    create_customer(&app, "3001234567").await;

    let (status, json) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({ "name": "Otro", "phone": "3001234567" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unknown_customer_is_not_found() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/customers/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Customer not found");
}

#[tokio::test]
async fn test_invalid_path_id_is_bad_request() {
    let app = setup();

    for uri in ["/customers/abc", "/customers/0", "/orders/-3"] {
        let (status, json) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"], "Invalid ID");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customers")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let app = setup();
    let id = create_customer(&app, "3001234567").await;

    let (status, json) = send(&app, "PATCH", &format!("/customers/{id}"), Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "At least one field must be provided for update"
    );
}

#[tokio::test]
async fn test_second_primary_address_replaces_first() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;

    let first = create_address(&app, customer_id, true).await;
    let second = create_address(&app, customer_id, true).await;

    let (status, json) = send(
        &app,
        "GET",
        &format!("/addresses/primary/{customer_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"].as_i64(), Some(second));

    let (_, json) = send(&app, "GET", &format!("/addresses/{first}"), None).await;
    assert_eq!(json["is_primary"], false);

    let (_, json) = send(
        &app,
        "GET",
        &format!("/addresses/customer/{customer_id}"),
        None,
    )
    .await;
    let primaries = json
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_primary"] == true)
        .count();
    assert_eq!(primaries, 1);
}

#[tokio::test]
async fn test_primary_address_cannot_be_deleted() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;
    let primary = create_address(&app, customer_id, true).await;

    let (status, _) = send(&app, "DELETE", &format!("/addresses/{primary}"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_item_captures_product_price() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;
    let address_id = create_address(&app, customer_id, true).await;
    let product_id = create_product(&app, "Widget", 12.5).await;
    let order_id = create_order(&app, customer_id, address_id).await;

    let (status, json) = send(
        &app,
        "POST",
        "/order-items",
        Some(json!({ "order_id": order_id, "product_id": product_id, "quantity": 3, "price": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["order_item"]["price"], 12.5);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/products/{product_id}"),
        Some(json!({ "price": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        &app,
        "GET",
        &format!("/order-items/order/{order_id}/product/{product_id}"),
        None,
    )
    .await;
    assert_eq!(json["price"], 12.5);

    let (status, json) = send(&app, "PATCH", &format!("/orders/{order_id}/total"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["total"], 37.5);
}

#[tokio::test]
async fn test_same_product_twice_is_conflict() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;
    let address_id = create_address(&app, customer_id, true).await;
    let product_id = create_product(&app, "Widget", 10.0).await;
    let order_id = create_order(&app, customer_id, address_id).await;
    let item = json!({ "order_id": order_id, "product_id": product_id, "quantity": 1 });

    let (status, _) = send(&app, "POST", "/order-items", Some(item.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(&app, "POST", "/order-items", Some(item)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "This product is already in the order");
}

#[tokio::test]
async fn test_order_for_unknown_customer_is_not_found() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({ "customer_id": 42, "address_id": 7, "payment_method": "paypal" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Customer not found");
}

#[tokio::test]
async fn test_order_status_change() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;
    let address_id = create_address(&app, customer_id, true).await;
    let order_id = create_order(&app, customer_id, address_id).await;

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["status"], "delivered");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": "lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_courier_assignment_flow() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;
    let address_id = create_address(&app, customer_id, true).await;
    let order_id = create_order(&app, customer_id, address_id).await;

    let (status, json) = send(
        &app,
        "POST",
        "/couriers",
        Some(json!({
            "name": "Luis",
            "phone": "3109998877",
            "vehicle": "moto",
            "license_plate": "ABC123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["courier"]["available"], true);
    let courier_id = json["courier"]["id"].as_i64().unwrap();

    let assignment = json!({ "order_id": order_id, "courier_id": courier_id });
    let (status, _) = send(&app, "POST", "/assignments", Some(assignment.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "POST", "/assignments", Some(assignment)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(&app, "GET", &format!("/assignments/order/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["courier_id"].as_i64(), Some(courier_id));

    let (status, json) = send(&app, "GET", "/couriers/filter?vehicle=moto", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preferences_flow() {
    let app = setup();
    let customer_id = create_customer(&app, "3001234567").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/preferences/{customer_id}"),
        Some(json!({ "preference_key": "theme", "preference_value": "dark" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/preferences/{customer_id}/theme"),
        Some(json!({ "preference_value": "light" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["preference"]["preference_value"], "light");

    let (status, json) = send(&app, "DELETE", &format!("/preferences/{customer_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["preferences"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_rejects_bad_limit() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/customers?limit=0", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "limit must be an integer between 1 and 1000");
}
