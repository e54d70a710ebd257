//! # Gateway Error Types
//!
//! All provider-facing failures. Everything here maps to the external
//! failure class: the caller can retry the whole operation or surface the
//! error, but nothing in this crate leaves partial state behind.

use thiserror::Error;

/// Errors from the payment-provider integration.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Provider credentials or base URL are missing.
    #[error("Payment gateway not configured: {0}")]
    NotConfigured(String),

    /// Requested amount falls outside the provider's accepted bounds.
    #[error("Amount {amount_cents} outside provider bounds [{min_cents}, {max_cents}]")]
    AmountOutOfBounds {
        amount_cents: i64,
        min_cents: i64,
        max_cents: i64,
    },

    /// Provider answered with an error or an unusable body.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The outbound call did not complete within the configured timeout.
    #[error("Provider request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Callback payload is missing required fields.
    #[error("Malformed callback payload: missing field '{0}'")]
    MalformedCallback(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
