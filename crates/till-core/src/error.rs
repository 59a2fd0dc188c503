//! # Error Types
//!
//! Domain error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! till-core (this file)
//! ├── CoreError        - business rule violations
//! └── ValidationError  - malformed operator input
//!
//! till-db (separate crate)
//! ├── StoreError       - database operation failures
//! └── CheckoutError    - transactional finalize/return failures
//!
//! till-engine
//! └── EngineError      - what callers of the engine see
//! ```
//!
//! Every variant maps to a message an operator can act on; none of them are
//! fatal to the process.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with the given name exists.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// No customer with the given name exists.
    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    /// No sale with the given id exists.
    #[error("sale not found: {0}")]
    SaleNotFound(String),

    /// Requested quantity exceeds what the store has on hand.
    ///
    /// Raised both at cart-build time (advisory, against the row as last
    /// read) and at commit time (authoritative, inside the transaction).
    #[error("insufficient stock for {name} (available: {available}, requested: {requested})")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Finalize was called with no cart lines.
    #[error("no items in the sale")]
    EmptyCart,

    /// Cart has reached the maximum number of lines.
    #[error("cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the per-line maximum.
    #[error("quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A return requested more units than the sale line originally sold.
    #[error("return of {requested} exceeds sold quantity {sold} for {name}")]
    ReturnExceedsSold {
        name: String,
        sold: i64,
        requested: i64,
    },

    /// Input validation failure (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Operator input validation errors.
///
/// These occur before any business logic runs and never touch state.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value did not parse as a positive integer.
    #[error("{field} must be a positive integer")]
    NotAPositiveInteger { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be non-negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed {
        field: String,
        allowed: Vec<String>,
    },

    /// Invalid format (bad number, bad UUID, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience alias for Results carrying CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_reports_available() {
        let err = CoreError::InsufficientStock {
            name: "Cola 330ml".to_string(),
            available: 5,
            requested: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("available: 5"));
        assert!(msg.contains("Cola 330ml"));
    }

    #[test]
    fn validation_messages() {
        let err = ValidationError::Required {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity is required");

        let err = ValidationError::NotAPositiveInteger {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be a positive integer");
    }

    #[test]
    fn validation_converts_to_core_error() {
        let err = ValidationError::Required {
            field: "discount".to_string(),
        };
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Validation(_)));
    }

    #[test]
    fn empty_cart_message() {
        assert_eq!(CoreError::EmptyCart.to_string(), "no items in the sale");
    }
}
