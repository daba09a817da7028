//! Shared value types for the delivery backend.

pub mod types;

pub use types::{MAX_PRICE_CENTS, MAX_TOTAL_CENTS, Money};
