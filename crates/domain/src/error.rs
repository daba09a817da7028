//! Domain error types.

use store::StoreError;
use thiserror::Error;

/// Errors raised by validators and services.
///
/// The first four variants are the failures callers can act on; `Store`
/// carries unexpected persistence failures untouched.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed a structural or business rule.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Duplicate(String),

    /// An invariant not covered by the other kinds was violated.
    #[error("{0}")]
    BusinessRule(String),

    /// An unexpected persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Discriminant of a [`DomainError`], used by adapters to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    BusinessRule,
    Internal,
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        DomainError::Duplicate(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Duplicate(_) => ErrorKind::Duplicate,
            DomainError::BusinessRule(_) => ErrorKind::BusinessRule,
            DomainError::Store(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(DomainError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(DomainError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::duplicate("x").kind(), ErrorKind::Duplicate);
        assert_eq!(
            DomainError::BusinessRule("x".to_string()).kind(),
            ErrorKind::BusinessRule
        );
        let store_err = StoreError::UniqueViolation {
            constraint: "untranslated".to_string(),
        };
        assert_eq!(DomainError::from(store_err).kind(), ErrorKind::Internal);
    }

    #[test]
    fn message_is_displayed_verbatim() {
        let err = DomainError::validation("name is required, phone is required");
        assert_eq!(err.to_string(), "name is required, phone is required");
    }
}
