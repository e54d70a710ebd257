//! # Service Error Types
//!
//! What callers of the checkout core see. Lower-layer errors pass through
//! unwrapped where they already carry the right context; business failures
//! that rolled back a database transaction are unwrapped back to their
//! core variant so callers never match on the storage layer.

use thiserror::Error;

use checkout_core::CoreError;
use checkout_db::DbError;
use checkout_gateway::GatewayError;

/// Errors surfaced by the checkout orchestrator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Business rule violation (insufficient stock, empty cart, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure (not found, conflict, connection, ...).
    #[error(transparent)]
    Db(DbError),

    /// Payment provider failure (unconfigured, timeout, bad callback).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Operator action targeted a payment of the wrong method.
    #[error("Payment {payment_id} is not cash-on-delivery")]
    NotCashOnDelivery { payment_id: String },

    /// Operator action targeted a payment already in a terminal state.
    #[error("Payment {payment_id} is already settled")]
    PaymentAlreadySettled { payment_id: String },
}

/// Business failures detected inside a transaction come back as
/// `DbError::Domain`; unwrap them so callers match on [`CoreError`]
/// directly.
impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => CheckoutError::Core(core),
            other => CheckoutError::Db(other),
        }
    }
}

/// Result type for orchestrator operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_unwrap_to_core() {
        let db_err = DbError::Domain(CoreError::EmptyCart("user-1".to_string()));
        let err: CheckoutError = db_err.into();
        assert!(matches!(err, CheckoutError::Core(CoreError::EmptyCart(_))));

        let db_err = DbError::not_found("Order", "o1");
        let err: CheckoutError = db_err.into();
        assert!(matches!(err, CheckoutError::Db(DbError::NotFound { .. })));
    }
}
