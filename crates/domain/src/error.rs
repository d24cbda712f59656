//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Not enough candidates (or free display slots) to satisfy a draw
    #[error("Not enough candidates: {available} available, {required} required")]
    Capacity { available: usize, required: usize },

    /// Committing would push a prize past its total slot count
    #[error("Prize quota exceeded: {used}/{total} used")]
    QuotaExceeded { used: u32, total: u32 },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when domain invariants or constraints are violated:
    /// - Required fields are empty or missing
    /// - Values are outside allowed ranges
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Participant name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create a capacity error
    pub fn capacity(available: usize, required: usize) -> Self {
        Self::Capacity {
            available,
            required,
        }
    }

    /// Create a quota exceeded error
    pub fn quota_exceeded(used: u32, total: u32) -> Self {
        Self::QuotaExceeded { used, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name cannot be empty");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Prize", "123e4567-e89b-12d3-a456-426614174000");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("Prize"));
        assert!(err.to_string().contains("123e4567"));
    }

    #[test]
    fn test_capacity_error() {
        let err = DomainError::capacity(1, 2);
        assert_eq!(
            err.to_string(),
            "Not enough candidates: 1 available, 2 required"
        );
    }

    #[test]
    fn test_quota_exceeded_error() {
        let err = DomainError::quota_exceeded(3, 2);
        assert!(matches!(err, DomainError::QuotaExceeded { used: 3, total: 2 }));
        assert_eq!(err.to_string(), "Prize quota exceeded: 3/2 used");
    }
}
