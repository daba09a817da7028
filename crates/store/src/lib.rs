//! Repository contracts and persistence drivers.
//!
//! Services depend only on the traits in [`repository`]; the in-memory
//! driver backs tests and database-less runs, the PostgreSQL driver backs
//! production deployments. Both enforce the same unique and foreign-key
//! constraints and report violations as distinguishable [`StoreError`]s.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod repository;

pub use common::Money;
pub use error::{StoreError, Result, constraint};
pub use memory::InMemoryStore;
pub use model::*;
pub use postgres::PostgresStore;
pub use query::{CourierFilter, Page, ProductFilter};
pub use repository::{
    AddressRepository, AssignmentRepository, CourierRepository, CustomerRepository,
    OrderItemRepository, OrderRepository, PreferenceRepository, ProductRepository, Store,
};
