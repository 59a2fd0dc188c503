//! Engine-level error type: what callers of a [`SaleSession`] see.
//!
//! [`SaleSession`]: crate::session::SaleSession

use thiserror::Error;

use till_core::{CoreError, ValidationError};
use till_db::{CheckoutError, StoreError};

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed operator input, rejected before any state changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A business rule refused the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The store failed.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl From<CheckoutError> for EngineError {
    fn from(err: CheckoutError) -> Self {
        match err {
            // bad input caught inside the store layer is still bad input
            CheckoutError::Domain(CoreError::Validation(e)) => EngineError::Validation(e),
            CheckoutError::Domain(e) => EngineError::Domain(e),
            CheckoutError::Store(e) => EngineError::Persistence(e),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_errors_keep_their_category() {
        let validation: EngineError = CheckoutError::Domain(CoreError::Validation(
            ValidationError::Negative {
                field: "return quantity".to_string(),
            },
        ))
        .into();
        assert!(matches!(validation, EngineError::Validation(_)));

        let domain: EngineError = CheckoutError::Domain(CoreError::EmptyCart).into();
        assert!(matches!(domain, EngineError::Domain(CoreError::EmptyCart)));

        let persistence: EngineError =
            CheckoutError::Store(StoreError::not_found("sale", "s1")).into();
        assert!(matches!(persistence, EngineError::Persistence(_)));
    }
}
