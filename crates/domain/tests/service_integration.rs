//! Integration tests for the domain services.
//!
//! These tests drive the services against the in-memory store and check the
//! business rules end to end: referenced entities, primary-address
//! exclusivity, uniqueness, partial updates and derived totals.

use common::Money;
use domain::validation::EMPTY_UPDATE;
use domain::{
    AddressInput, AssignmentInput, CourierFilterInput, CourierInput, CustomerInput, DomainError,
    ErrorKind, OrderInput, OrderItemInput, PreferenceInput, ProductFilterInput, ProductInput,
    Services, StatusInput,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use store::{
    AddressRepository, InMemoryStore, NewOrder, OrderRepository, OrderStatus, Page,
    PaymentMethod,
};

/// Helper to create services over a fresh store
fn create_services() -> (Services<InMemoryStore>, InMemoryStore) {
    let store = InMemoryStore::new();
    (Services::new(store.clone()), store)
}

fn body<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

async fn customer(services: &Services<InMemoryStore>, phone: &str) -> i64 {
    services
        .customers
        .add_customer(body(json!({"name": "Ana", "phone": phone})))
        .await
        .unwrap()
        .id
}

async fn address(services: &Services<InMemoryStore>, customer_id: i64, primary: bool) -> i64 {
    services
        .addresses
        .create_address(body(json!({
            "customer_id": customer_id,
            "label": "Casa",
            "address_text": "Calle 1",
            "is_primary": primary
        })))
        .await
        .unwrap()
        .id
}

async fn product(services: &Services<InMemoryStore>, name: &str, price: f64) -> i64 {
    services
        .products
        .create_product(body(json!({"name": name, "price": price, "is_active": true})))
        .await
        .unwrap()
        .id
}

async fn order(services: &Services<InMemoryStore>) -> (i64, i64, i64) {
    let customer_id = customer(services, "3001234567").await;
    let address_id = address(services, customer_id, true).await;
    let order = services
        .orders
        .create_order(body(json!({
            "customer_id": customer_id,
            "address_id": address_id,
            "payment_method": "cash"
        })))
        .await
        .unwrap();
    (customer_id, address_id, order.id)
}

fn assert_kind<T: std::fmt::Debug>(result: Result<T, DomainError>, kind: ErrorKind) -> String {
    let err = result.unwrap_err();
    assert_eq!(err.kind(), kind, "unexpected error: {err}");
    err.to_string()
}

mod customers {
    use super::*;

    #[tokio::test]
    async fn add_customer_defaults_email_to_null() {
        let (services, _) = create_services();

        let created = services
            .customers
            .add_customer(body(json!({"name": "Ana", "phone": "3001234567"})))
            .await
            .unwrap();

        assert_eq!(created.name, "Ana");
        assert_eq!(created.email, None);
    }

    #[tokio::test]
    async fn duplicate_phone_is_a_duplicate_error() {
        let (services, _) = create_services();
        customer(&services, "3001234567").await;

        let message = assert_kind(
            services
                .customers
                .add_customer(body(json!({"name": "Bea", "phone": "3001234567"})))
                .await,
            ErrorKind::Duplicate,
        );
        assert!(message.contains("phone"));
    }

    #[tokio::test]
    async fn every_violation_is_reported_at_once() {
        let (services, _) = create_services();

        let message = assert_kind(
            services
                .customers
                .add_customer(body(json!({"name": "A", "phone": "12", "email": "x"})))
                .await,
            ErrorKind::Validation,
        );
        assert_eq!(
            message,
            "name must be between 2 and 100 characters, \
             phone must be between 7 and 20 characters, \
             email must be a valid email address"
        );
    }

    #[tokio::test]
    async fn partial_update_changes_only_given_fields() {
        let (services, _) = create_services();
        let id = customer(&services, "3001234567").await;

        let updated = services
            .customers
            .update_customer_partial(id, body(json!({"email": "ANA@MAIL.COM"})))
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.email.as_deref(), Some("ana@mail.com"));
    }

    #[tokio::test]
    async fn customer_with_orders_cannot_be_deleted() {
        let (services, _) = create_services();
        let (customer_id, _, _) = order(&services).await;

        let message = assert_kind(
            services.customers.delete_customer(customer_id).await,
            ErrorKind::Validation,
        );
        assert!(message.contains("orders"));
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let (services, _) = create_services();

        assert_kind(services.customers.get_customer(42).await, ErrorKind::NotFound);
        assert_kind(
            services
                .customers
                .update_customer(42, body(json!({"name": "Ana", "phone": "3001234567"})))
                .await,
            ErrorKind::NotFound,
        );
        assert_kind(services.customers.delete_customer(42).await, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn non_positive_ids_are_validation_errors() {
        let (services, _) = create_services();

        let message = assert_kind(services.customers.get_customer(0).await, ErrorKind::Validation);
        assert_eq!(message, "Invalid ID");
    }
}

mod addresses {
    use super::*;

    #[tokio::test]
    async fn address_requires_existing_customer() {
        let (services, _) = create_services();

        let message = assert_kind(
            services
                .addresses
                .create_address(body(json!({
                    "customer_id": 99,
                    "label": "Casa",
                    "address_text": "Calle 1"
                })))
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(message, "Customer not found");
    }

    #[tokio::test]
    async fn new_primary_replaces_previous_primary() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;

        let first = address(&services, customer_id, true).await;
        let second = address(&services, customer_id, true).await;

        let primary = services
            .addresses
            .get_primary_address(customer_id)
            .await
            .unwrap();
        assert_eq!(primary.id, second);

        let first = services.addresses.get_address(first).await.unwrap();
        assert!(!first.is_primary);
    }

    #[tokio::test]
    async fn at_most_one_primary_after_any_sequence() {
        let (services, store) = create_services();
        let customer_id = customer(&services, "3001234567").await;

        let a = address(&services, customer_id, false).await;
        let b = address(&services, customer_id, true).await;
        let c = address(&services, customer_id, false).await;

        let steps: [(i64, Value); 4] = [
            (a, json!({"is_primary": true})),
            (c, json!({"is_primary": "1"})),
            (b, json!({"is_primary": 1, "label": "Oficina"})),
            (b, json!({"is_primary": false})),
        ];

        for (id, change) in steps {
            services
                .addresses
                .update_address_partial(id, body(change))
                .await
                .unwrap();

            let primaries = store
                .list_addresses_by_customer(customer_id)
                .await
                .unwrap()
                .into_iter()
                .filter(|a| a.is_primary)
                .count();
            assert!(primaries <= 1, "found {primaries} primary addresses");
        }

        assert_kind(
            services.addresses.get_primary_address(customer_id).await,
            ErrorKind::NotFound,
        );
    }

    #[tokio::test]
    async fn full_update_with_primary_moves_the_flag() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;
        let first = address(&services, customer_id, true).await;
        let second = address(&services, customer_id, false).await;

        services
            .addresses
            .update_address(
                second,
                body(json!({
                    "customer_id": customer_id,
                    "label": "Oficina",
                    "address_text": "Carrera 7",
                    "is_primary": "true"
                })),
            )
            .await
            .unwrap();

        let primary = services
            .addresses
            .get_primary_address(customer_id)
            .await
            .unwrap();
        assert_eq!(primary.id, second);
        assert!(!services.addresses.get_address(first).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn primary_address_cannot_be_deleted() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;
        let primary = address(&services, customer_id, true).await;
        let other = address(&services, customer_id, false).await;

        let message = assert_kind(
            services.addresses.delete_address(primary).await,
            ErrorKind::Validation,
        );
        assert!(message.contains("primary"));

        services.addresses.delete_address(other).await.unwrap();
    }

    #[tokio::test]
    async fn address_used_by_an_order_cannot_be_deleted() {
        let (services, _) = create_services();
        let (customer_id, address_id, _) = order(&services).await;
        let replacement = address(&services, customer_id, true).await;
        assert!(
            !services
                .addresses
                .get_address(address_id)
                .await
                .unwrap()
                .is_primary
        );

        assert_kind(
            services.addresses.delete_address(address_id).await,
            ErrorKind::Validation,
        );
        assert_eq!(
            services
                .addresses
                .get_primary_address(customer_id)
                .await
                .unwrap()
                .id,
            replacement
        );
    }

    #[tokio::test]
    async fn listing_by_customer_checks_the_customer() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;
        address(&services, customer_id, false).await;
        address(&services, customer_id, false).await;

        let addresses = services
            .addresses
            .list_customer_addresses(customer_id)
            .await
            .unwrap();
        assert_eq!(addresses.len(), 2);

        assert_kind(
            services.addresses.list_customer_addresses(77).await,
            ErrorKind::NotFound,
        );
    }
}

mod products {
    use super::*;

    #[tokio::test]
    async fn names_are_unique_ignoring_case() {
        let (services, _) = create_services();
        product(&services, "Widget", 10.0).await;

        assert_kind(
            services
                .products
                .create_product(body(json!({"name": "widget", "price": 5})))
                .await,
            ErrorKind::Duplicate,
        );
    }

    #[tokio::test]
    async fn rename_to_taken_name_is_rejected() {
        let (services, _) = create_services();
        product(&services, "Widget", 10.0).await;
        let gadget = product(&services, "Gadget", 10.0).await;

        assert_kind(
            services
                .products
                .update_product_partial(gadget, body(json!({"name": "WIDGET"})))
                .await,
            ErrorKind::Duplicate,
        );

        // Keeping its own name with a different case is not a conflict.
        let renamed = services
            .products
            .update_product_partial(gadget, body(json!({"name": "GADGET"})))
            .await
            .unwrap();
        assert_eq!(renamed.name, "GADGET");
    }

    #[tokio::test]
    async fn prices_round_to_cents() {
        let (services, _) = create_services();

        let up = services
            .products
            .create_product(body(json!({"name": "Up", "price": 19.999})))
            .await
            .unwrap();
        let down = services
            .products
            .create_product(body(json!({"name": "Down", "price": 19.994})))
            .await
            .unwrap();

        assert_eq!(up.price, Money::from_cents(2000));
        assert_eq!(down.price, Money::from_cents(1999));
        assert!(!up.is_active);
    }

    #[tokio::test]
    async fn soft_delete_is_idempotent() {
        let (services, _) = create_services();
        let id = product(&services, "Widget", 10.0).await;

        let first = services.products.soft_delete_product(id).await.unwrap();
        let second = services.products.soft_delete_product(id).await.unwrap();

        assert!(!first.is_active);
        assert!(!second.is_active);
        assert_eq!(first.id, second.id);
        assert!(services.products.get_product(id).await.is_ok());
    }

    #[tokio::test]
    async fn hard_delete_removes_the_row() {
        let (services, _) = create_services();
        let id = product(&services, "Widget", 10.0).await;

        services.products.delete_product(id).await.unwrap();

        assert_kind(services.products.get_product(id).await, ErrorKind::NotFound);
        assert_kind(services.products.delete_product(id).await, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn product_on_an_order_cannot_be_hard_deleted() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 10.0).await;
        services
            .order_items
            .add_item(body(json!({
                "order_id": order_id,
                "product_id": product_id,
                "quantity": 1
            })))
            .await
            .unwrap();

        assert_kind(
            services.products.delete_product(product_id).await,
            ErrorKind::Validation,
        );
    }

    #[tokio::test]
    async fn filter_combines_criteria() {
        let (services, _) = create_services();
        product(&services, "Red Widget", 5.0).await;
        product(&services, "Blue Widget", 15.0).await;
        product(&services, "Gadget", 10.0).await;

        let found = services
            .products
            .filter_products(ProductFilterInput {
                name: Some("widget".to_string()),
                max_price: Some("10".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Red Widget");

        assert_kind(
            services
                .products
                .filter_products(ProductFilterInput {
                    min_price: Some("10".to_string()),
                    max_price: Some("5".to_string()),
                    ..Default::default()
                })
                .await,
            ErrorKind::Validation,
        );
    }
}

mod orders {
    use super::*;

    #[tokio::test]
    async fn customer_is_checked_before_address() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;
        let address_id = address(&services, customer_id, true).await;

        let message = assert_kind(
            services
                .orders
                .create_order(body(json!({
                    "customer_id": 999,
                    "address_id": address_id,
                    "payment_method": "paypal"
                })))
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(message, "Customer not found");

        let message = assert_kind(
            services
                .orders
                .create_order(body(json!({
                    "customer_id": customer_id,
                    "address_id": 999,
                    "payment_method": "paypal"
                })))
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(message, "Address not found");
    }

    #[tokio::test]
    async fn client_total_is_ignored_on_create() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;
        let address_id = address(&services, customer_id, true).await;

        let created = services
            .orders
            .create_order(body(json!({
                "customer_id": customer_id,
                "address_id": address_id,
                "payment_method": "credit_card",
                "total": 500
            })))
            .await
            .unwrap();

        assert_eq!(created.total, Money::zero());
        assert_eq!(created.status, OrderStatus::Pending);
        assert_eq!(created.payment_method, PaymentMethod::CreditCard);
    }

    #[tokio::test]
    async fn any_status_may_follow_any_other() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;

        for status in ["delivered", "pending", "canceled", "processing"] {
            let updated = services
                .orders
                .update_status(order_id, body::<StatusInput>(json!({"status": status})))
                .await
                .unwrap();
            assert_eq!(updated.status.as_str(), status);
        }

        assert_kind(
            services
                .orders
                .update_status(order_id, body(json!({"status": "lost"})))
                .await,
            ErrorKind::Validation,
        );
    }

    #[tokio::test]
    async fn recompute_total_sums_items() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let widget = product(&services, "Widget", 10.0).await;
        let gadget = product(&services, "Gadget", 2.5).await;

        let empty = services.orders.recompute_total(order_id).await.unwrap();
        assert_eq!(empty.total, Money::zero());

        for (product_id, quantity) in [(widget, 2), (gadget, 3)] {
            services
                .order_items
                .add_item(body(json!({
                    "order_id": order_id,
                    "product_id": product_id,
                    "quantity": quantity
                })))
                .await
                .unwrap();
        }

        let order = services.orders.recompute_total(order_id).await.unwrap();
        assert_eq!(order.total, Money::from_cents(2750));
    }

    async fn order_with_costly_item(quantity: i64) -> (Services<InMemoryStore>, i64) {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let yacht = product(&services, "Yacht", 99_999_999.99).await;
        services
            .order_items
            .add_item(body(json!({
                "order_id": order_id,
                "product_id": yacht,
                "quantity": quantity
            })))
            .await
            .unwrap();
        (services, order_id)
    }

    #[tokio::test]
    async fn recompute_total_rejects_overflowing_subtotal() {
        let (services, order_id) = order_with_costly_item(2_000_000_000).await;

        let message = assert_kind(
            services.orders.recompute_total(order_id).await,
            ErrorKind::Validation,
        );
        assert_eq!(message, "order total exceeds the maximum allowed");
    }

    #[tokio::test]
    async fn recompute_total_rejects_total_above_storable_maximum() {
        let (services, order_id) = order_with_costly_item(101).await;

        assert_kind(
            services.orders.recompute_total(order_id).await,
            ErrorKind::Validation,
        );
        let stored = services.orders.get_order(order_id).await.unwrap();
        assert_eq!(stored.total, Money::zero());
    }

    #[tokio::test]
    async fn full_update_requires_total() {
        let (services, _) = create_services();
        let (customer_id, address_id, order_id) = order(&services).await;

        assert_kind(
            services
                .orders
                .update_order(
                    order_id,
                    body(json!({
                        "customer_id": customer_id,
                        "address_id": address_id,
                        "payment_method": "cash",
                        "status": "shipped"
                    })),
                )
                .await,
            ErrorKind::Validation,
        );

        let updated = services
            .orders
            .update_order(
                order_id,
                body(json!({
                    "customer_id": customer_id,
                    "address_id": address_id,
                    "payment_method": "cash",
                    "status": "shipped",
                    "total": "12.345"
                })),
            )
            .await
            .unwrap();
        assert_eq!(updated.total, Money::from_cents(1235));
        assert_eq!(updated.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn partial_update_checks_new_references() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;

        assert_kind(
            services
                .orders
                .update_order_partial(order_id, body(json!({"address_id": 404})))
                .await,
            ErrorKind::NotFound,
        );

        let updated = services
            .orders
            .update_order_partial(order_id, body(json!({"payment_method": "debit_card"})))
            .await
            .unwrap();
        assert_eq!(updated.payment_method, PaymentMethod::DebitCard);
    }

    #[tokio::test]
    async fn deleting_an_order_removes_items_and_assignment() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 10.0).await;
        services
            .order_items
            .add_item(body(json!({
                "order_id": order_id,
                "product_id": product_id,
                "quantity": 1
            })))
            .await
            .unwrap();

        services.orders.delete_order(order_id).await.unwrap();

        assert_kind(
            services.order_items.get_item(order_id, product_id).await,
            ErrorKind::NotFound,
        );
        services.products.delete_product(product_id).await.unwrap();
    }
}

mod order_items {
    use super::*;

    #[tokio::test]
    async fn item_captures_product_price() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 10.0).await;

        let item = services
            .order_items
            .add_item(body(json!({
                "order_id": order_id,
                "product_id": product_id,
                "quantity": 2,
                "price": 1
            })))
            .await
            .unwrap();
        assert_eq!(item.price, Money::from_cents(1000));

        services
            .products
            .update_product_partial(product_id, body(json!({"price": 99.5})))
            .await
            .unwrap();

        let item = services
            .order_items
            .get_item(order_id, product_id)
            .await
            .unwrap();
        assert_eq!(item.price, Money::from_cents(1000));
        assert_eq!(item.quantity, 2);
    }

    #[tokio::test]
    async fn same_product_twice_is_a_duplicate() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 10.0).await;
        let item = json!({"order_id": order_id, "product_id": product_id, "quantity": 1});

        services.order_items.add_item(body(item.clone())).await.unwrap();
        assert_kind(
            services.order_items.add_item(body(item)).await,
            ErrorKind::Duplicate,
        );
    }

    #[tokio::test]
    async fn targeted_and_combined_updates() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 10.0).await;
        services
            .order_items
            .add_item(body(json!({
                "order_id": order_id,
                "product_id": product_id,
                "quantity": 1
            })))
            .await
            .unwrap();

        let item = services
            .order_items
            .update_quantity(order_id, product_id, body(json!({"quantity": 5})))
            .await
            .unwrap();
        assert_eq!(item.quantity, 5);

        let item = services
            .order_items
            .update_price(order_id, product_id, body(json!({"price": 7.25})))
            .await
            .unwrap();
        assert_eq!(item.price, Money::from_cents(725));

        let item = services
            .order_items
            .update_item(order_id, product_id, body(json!({"quantity": 3, "price": 8})))
            .await
            .unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price, Money::from_cents(800));

        assert_kind(
            services
                .order_items
                .update_item(order_id, product_id, body(json!({})))
                .await,
            ErrorKind::Validation,
        );
    }

    #[tokio::test]
    async fn updates_require_order_product_and_item() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 10.0).await;
        let quantity = || body::<OrderItemInput>(json!({"quantity": 2}));

        let missing_order = assert_kind(
            services
                .order_items
                .update_quantity(404, product_id, quantity())
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(missing_order, "Order not found");

        let missing_product = assert_kind(
            services
                .order_items
                .update_quantity(order_id, 404, quantity())
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(missing_product, "Product not found");

        let missing_item = assert_kind(
            services
                .order_items
                .update_quantity(order_id, product_id, quantity())
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(missing_item, "Order item not found");
    }

    #[tokio::test]
    async fn delete_all_items_of_an_order() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        for name in ["Widget", "Gadget"] {
            let product_id = product(&services, name, 1.0).await;
            services
                .order_items
                .add_item(body(json!({
                    "order_id": order_id,
                    "product_id": product_id,
                    "quantity": 1
                })))
                .await
                .unwrap();
        }

        let removed = services.order_items.delete_items(order_id).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert!(services.order_items.list_items(order_id).await.unwrap().is_empty());

        assert_kind(
            services.order_items.delete_items(404).await,
            ErrorKind::NotFound,
        );
    }
}

mod couriers_and_assignments {
    use super::*;

    fn courier_body(vehicle: &str, available: bool) -> CourierInput {
        body(json!({
            "name": "Luis",
            "phone": "+57 300 000 0000",
            "vehicle": vehicle,
            "license_plate": "ABC12D",
            "available": available
        }))
    }

    #[tokio::test]
    async fn filter_by_availability_and_vehicle() {
        let (services, _) = create_services();
        services
            .couriers
            .create_courier(courier_body("moto", true))
            .await
            .unwrap();
        services
            .couriers
            .create_courier(courier_body("bike", true))
            .await
            .unwrap();
        services
            .couriers
            .create_courier(courier_body("moto", false))
            .await
            .unwrap();

        let found = services
            .couriers
            .filter_couriers(CourierFilterInput {
                available: Some("1".to_string()),
                vehicle: Some("MOTO".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].available);
    }

    #[tokio::test]
    async fn one_courier_per_order() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;
        let first = services
            .couriers
            .create_courier(courier_body("moto", true))
            .await
            .unwrap();
        let second = services
            .couriers
            .create_courier(courier_body("bike", true))
            .await
            .unwrap();

        let assignment = services
            .assignments
            .create_assignment(body::<AssignmentInput>(json!({
                "order_id": order_id,
                "courier_id": first.id
            })))
            .await
            .unwrap();

        assert_kind(
            services
                .assignments
                .create_assignment(body(json!({
                    "order_id": order_id,
                    "courier_id": second.id
                })))
                .await,
            ErrorKind::Duplicate,
        );

        let reassigned = services
            .assignments
            .reassign(assignment.id, body(json!({"courier_id": second.id})))
            .await
            .unwrap();
        assert_eq!(reassigned.courier_id, second.id);

        let by_order = services
            .assignments
            .get_order_assignment(order_id)
            .await
            .unwrap();
        assert_eq!(by_order.id, assignment.id);

        assert_kind(
            services.couriers.delete_courier(second.id).await,
            ErrorKind::Validation,
        );
        services.couriers.delete_courier(first.id).await.unwrap();
    }

    #[tokio::test]
    async fn assignment_requires_order_and_courier() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;

        let message = assert_kind(
            services
                .assignments
                .create_assignment(body(json!({"order_id": order_id, "courier_id": 5})))
                .await,
            ErrorKind::NotFound,
        );
        assert_eq!(message, "Courier not found");
    }
}

mod preferences {
    use super::*;

    fn pref(key: &str, value: &str) -> PreferenceInput {
        body(json!({"preference_key": key, "preference_value": value}))
    }

    #[tokio::test]
    async fn preference_lifecycle() {
        let (services, _) = create_services();
        let customer_id = customer(&services, "3001234567").await;

        services
            .preferences
            .create_preference(customer_id, pref("theme", "dark"))
            .await
            .unwrap();
        assert_kind(
            services
                .preferences
                .create_preference(customer_id, pref("theme", "light"))
                .await,
            ErrorKind::Duplicate,
        );

        let updated = services
            .preferences
            .update_preference(customer_id, "theme", pref("theme", "light"))
            .await
            .unwrap();
        assert_eq!(updated.preference_value, "light");

        assert_kind(
            services
                .preferences
                .update_preference(customer_id, "language", pref("language", "es"))
                .await,
            ErrorKind::NotFound,
        );

        services
            .preferences
            .create_preference(customer_id, pref("language", "es"))
            .await
            .unwrap();
        let removed = services
            .preferences
            .delete_preferences(customer_id)
            .await
            .unwrap();
        assert_eq!(removed.len(), 2);
    }

    #[tokio::test]
    async fn every_operation_checks_the_customer() {
        let (services, _) = create_services();

        assert_kind(
            services
                .preferences
                .create_preference(9, pref("theme", "dark"))
                .await,
            ErrorKind::NotFound,
        );
        assert_kind(services.preferences.list_preferences(9).await, ErrorKind::NotFound);
        assert_kind(
            services.preferences.get_preference(9, "theme").await,
            ErrorKind::NotFound,
        );
        assert_kind(
            services.preferences.delete_preference(9, "theme").await,
            ErrorKind::NotFound,
        );
        assert_kind(
            services.preferences.delete_preferences(9).await,
            ErrorKind::NotFound,
        );
    }
}

mod partial_updates {
    use super::*;

    #[tokio::test]
    async fn empty_body_is_rejected_for_every_entity() {
        let (services, store) = create_services();
        let (customer_id, address_id, order_id) = order(&services).await;
        let product_id = product(&services, "Widget", 1.0).await;
        let courier = services
            .couriers
            .create_courier(body(json!({
                "name": "Luis",
                "phone": "3000000000",
                "vehicle": "moto",
                "license_plate": "ABC12D"
            })))
            .await
            .unwrap();

        let messages = [
            services
                .customers
                .update_customer_partial(customer_id, CustomerInput::default())
                .await
                .unwrap_err(),
            services
                .addresses
                .update_address_partial(address_id, AddressInput::default())
                .await
                .unwrap_err(),
            services
                .products
                .update_product_partial(product_id, ProductInput::default())
                .await
                .unwrap_err(),
            services
                .orders
                .update_order_partial(order_id, OrderInput::default())
                .await
                .unwrap_err(),
            services
                .couriers
                .update_courier_partial(courier.id, CourierInput::default())
                .await
                .unwrap_err(),
        ];

        for err in messages {
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.to_string(), EMPTY_UPDATE);
        }

        // Nothing changed underneath.
        let order = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn total_alone_is_not_a_partial_update() {
        let (services, _) = create_services();
        let (_, _, order_id) = order(&services).await;

        let err = services
            .orders
            .update_order_partial(order_id, body(json!({"total": 10})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), EMPTY_UPDATE);
    }
}

mod listings {
    use super::*;

    #[tokio::test]
    async fn pages_are_applied_in_id_order() {
        let (services, store) = create_services();
        let customer_id = customer(&services, "3001234567").await;
        let address_id = address(&services, customer_id, true).await;
        for _ in 0..5 {
            store
                .create_order(NewOrder {
                    customer_id,
                    address_id,
                    payment_method: PaymentMethod::Cash,
                    status: OrderStatus::Pending,
                })
                .await
                .unwrap();
        }

        let page = services.orders.list_orders(Page::new(2, 1)).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3]);

        let mine = services
            .orders
            .list_customer_orders(customer_id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 5);
    }
}
