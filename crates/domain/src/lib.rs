//! Domain layer for the delivery backend.
//!
//! This crate holds the rules that sit between the HTTP surface and the
//! store:
//! - per-entity validators with full and partial modes
//! - normalizers that canonicalize validated input
//! - services that check referenced entities, enforce invariants and call
//!   the repositories
//! - the [`DomainError`] taxonomy adapters map to responses

pub mod address;
pub mod assignment;
pub mod courier;
pub mod customer;
pub mod error;
pub mod normalize;
pub mod order;
pub mod order_item;
pub mod preference;
pub mod product;
pub mod validation;

mod telemetry;

pub use address::{AddressInput, AddressService};
pub use assignment::{AssignmentInput, AssignmentService};
pub use courier::{CourierFilterInput, CourierInput, CourierService};
pub use customer::{CustomerInput, CustomerService};
pub use error::{DomainError, ErrorKind, Result};
pub use order::{OrderInput, OrderMode, OrderService, StatusInput};
pub use order_item::{ItemChange, OrderItemInput, OrderItemService};
pub use preference::{PreferenceInput, PreferenceService};
pub use product::{ProductFilterInput, ProductInput, ProductService};

use store::Store;

/// Every domain service, built once over a shared store.
#[derive(Debug, Clone)]
pub struct Services<S> {
    pub customers: CustomerService<S>,
    pub addresses: AddressService<S>,
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
    pub order_items: OrderItemService<S>,
    pub couriers: CourierService<S>,
    pub assignments: AssignmentService<S>,
    pub preferences: PreferenceService<S>,
}

impl<S: Store> Services<S> {
    pub fn new(store: S) -> Self {
        Self {
            customers: CustomerService::new(store.clone()),
            addresses: AddressService::new(store.clone()),
            products: ProductService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            order_items: OrderItemService::new(store.clone()),
            couriers: CourierService::new(store.clone()),
            assignments: AssignmentService::new(store.clone()),
            preferences: PreferenceService::new(store),
        }
    }
}
