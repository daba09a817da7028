use thiserror::Error;

/// Names of the schema constraints both drivers report.
///
/// The in-memory driver uses the same names the SQL migration declares so
/// callers can branch on the constraint regardless of the backing store.
pub mod constraint {
    pub const CUSTOMER_PHONE: &str = "customers_phone_key";
    pub const PRODUCT_NAME: &str = "products_name_lower_idx";
    pub const ADDRESS_ONE_PRIMARY: &str = "addresses_one_primary_idx";
    pub const ORDER_ITEM_KEY: &str = "order_items_pkey";
    pub const ASSIGNMENT_ORDER: &str = "assignments_order_id_key";
    pub const PREFERENCE_KEY: &str = "customer_preferences_pkey";

    pub const ADDRESS_CUSTOMER: &str = "addresses_customer_id_fkey";
    pub const ORDER_CUSTOMER: &str = "orders_customer_id_fkey";
    pub const ORDER_ADDRESS: &str = "orders_address_id_fkey";
    pub const ORDER_ITEM_ORDER: &str = "order_items_order_id_fkey";
    pub const ORDER_ITEM_PRODUCT: &str = "order_items_product_id_fkey";
    pub const ASSIGNMENT_ORDER_FK: &str = "assignments_order_id_fkey";
    pub const ASSIGNMENT_COURIER: &str = "assignments_courier_id_fkey";
    pub const PREFERENCE_CUSTOMER: &str = "customer_preferences_customer_id_fkey";
}

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign-key constraint rejected the write or delete.
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn unique(constraint: &str) -> Self {
        StoreError::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }

    pub(crate) fn foreign_key(constraint: &str) -> Self {
        StoreError::ForeignKeyViolation {
            constraint: constraint.to_string(),
        }
    }

    /// Returns true if this is a unique-constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    /// Returns true if this is a foreign-key violation.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, StoreError::ForeignKeyViolation { .. })
    }

    /// Returns the violated constraint name, if any.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::UniqueViolation { constraint }
            | StoreError::ForeignKeyViolation { constraint } => Some(constraint),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return StoreError::UniqueViolation { constraint };
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return StoreError::ForeignKeyViolation { constraint };
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
