//! Gateway configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. The merchant id and shared secret have no defaults: an
//! unconfigured gateway fails every outbound request with NotConfigured
//! instead of silently talking to nobody.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};

/// Payment provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Merchant identifier issued by the provider.
    pub merchant_id: String,

    /// Shared secret for callback signatures.
    pub secret: String,

    /// Provider API base URL.
    pub base_url: String,

    /// URL the provider redirects the payer back to.
    pub return_url: String,

    /// Smallest amount the provider accepts, in cents.
    pub min_amount_cents: i64,

    /// Largest amount the provider accepts, in cents.
    pub max_amount_cents: i64,

    /// Timeout for the outbound redirect-URL request.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn load() -> GatewayResult<Self> {
        let config = GatewayConfig {
            merchant_id: env::var("GATEWAY_MERCHANT_ID")
                .map_err(|_| GatewayError::NotConfigured("GATEWAY_MERCHANT_ID".to_string()))?,

            secret: env::var("GATEWAY_SECRET")
                .map_err(|_| GatewayError::NotConfigured("GATEWAY_SECRET".to_string()))?,

            base_url: env::var("GATEWAY_BASE_URL")
                .map_err(|_| GatewayError::NotConfigured("GATEWAY_BASE_URL".to_string()))?,

            return_url: env::var("GATEWAY_RETURN_URL")
                .map_err(|_| GatewayError::NotConfigured("GATEWAY_RETURN_URL".to_string()))?,

            min_amount_cents: env::var("GATEWAY_MIN_AMOUNT_CENTS")
                .unwrap_or_else(|_| "100".to_string()) // 1 currency unit
                .parse()
                .map_err(|_| {
                    GatewayError::NotConfigured("GATEWAY_MIN_AMOUNT_CENTS".to_string())
                })?,

            max_amount_cents: env::var("GATEWAY_MAX_AMOUNT_CENTS")
                .unwrap_or_else(|_| "100000000".to_string()) // 1M currency units
                .parse()
                .map_err(|_| {
                    GatewayError::NotConfigured("GATEWAY_MAX_AMOUNT_CENTS".to_string())
                })?,

            request_timeout: Duration::from_secs(
                env::var("GATEWAY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        GatewayError::NotConfigured("GATEWAY_TIMEOUT_SECS".to_string())
                    })?,
            ),
        };

        Ok(config)
    }

    /// Checks an amount against the provider's accepted bounds.
    pub fn check_amount(&self, amount_cents: i64) -> GatewayResult<()> {
        if amount_cents < self.min_amount_cents || amount_cents > self.max_amount_cents {
            return Err(GatewayError::AmountOutOfBounds {
                amount_cents,
                min_cents: self.min_amount_cents,
                max_cents: self.max_amount_cents,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
