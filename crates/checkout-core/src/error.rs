//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  checkout-db errors                                                     │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  checkout-gateway errors                                                │
//! │  └── GatewayError     - Provider integration failures                   │
//! │                                                                         │
//! │  checkout-service errors                                                │
//! │  └── CheckoutError    - Wraps all of the above for callers              │
//! │                                                                         │
//! │  Taxonomy: NotFound | Conflict | InvalidState | ExternalFailure |       │
//! │            Validation — every variant below belongs to exactly one.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, ids, amounts)
//! 3. Errors are enum variants, never String
//! 4. No error is swallowed: a failure either aborts the checkout
//!    transaction entirely or leaves an explicit state on the Payment

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found. (NotFound)
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Insufficient stock to complete checkout. (InvalidState)
    ///
    /// Names the failing product so the caller can correct the cart.
    /// A stock race loser gets this error and is never retried
    /// automatically; the caller must resubmit.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Product exists but cannot be sold. (InvalidState)
    #[error("Product {name} is not active")]
    InactiveProduct { name: String },

    /// Cart has no items; nothing to convert into an order. (InvalidState)
    #[error("Cart {0} is empty")]
    EmptyCart(String),

    /// Loyalty redemption exceeds the available balance. (InvalidState)
    ///
    /// The ledger and balance are left unchanged.
    #[error("Insufficient loyalty balance for {user_id}: balance {balance}, requested {requested}")]
    InsufficientPoints {
        user_id: String,
        balance: i64,
        requested: i64,
    },

    /// A stored tag names a predicate the engine does not implement.
    ///
    /// Raised instead of silently evaluating to true or false, so a rule
    /// created with e.g. `condition_filter = "high_demand"` fails loudly.
    #[error("Condition predicate not implemented: {0}")]
    NotImplemented(String),

    /// Validation error (wraps ValidationError). (Validation)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Widget".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Widget: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "multiplier".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
