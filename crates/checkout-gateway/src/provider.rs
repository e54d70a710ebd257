//! # Provider Client
//!
//! Outbound half of the integration: ask the provider for a redirect URL
//! the payer is sent to. The trait seam exists so the orchestrator can be
//! tested against a scripted provider instead of the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Request body for the redirect-URL call.
#[derive(Debug, Clone, Serialize)]
pub struct RedirectRequest {
    /// Merchant identifier issued by the provider.
    pub merchant_id: String,

    /// Amount in cents.
    pub amount: i64,

    /// Human-readable order description.
    pub description: String,

    /// Payer's IP address, required by the provider for fraud checks.
    pub payer_ip: String,

    /// Where the provider sends the payer after the attempt.
    pub return_url: String,

    /// Our payment id; echoed back in the callback as merchant_ref.
    pub merchant_reference: String,
}

/// Provider response: the URL to redirect the payer to.
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectResponse {
    pub redirect_url: String,
}

/// Client for the provider's outbound API.
///
/// One implementation talks HTTP; tests substitute a scripted one.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Requests a redirect URL for a payment.
    async fn request_redirect(&self, request: &RedirectRequest) -> GatewayResult<RedirectResponse>;
}

/// HTTP implementation of [`ProviderClient`].
#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpProviderClient {
    /// Creates a client with the request timeout baked into the HTTP
    /// client, so no call can hang past the configured bound.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(HttpProviderClient { config, client })
    }

    /// Builds a redirect request for an amount after checking provider
    /// bounds.
    pub fn redirect_request(
        &self,
        amount_cents: i64,
        description: &str,
        payer_ip: &str,
        merchant_reference: &str,
    ) -> GatewayResult<RedirectRequest> {
        self.config.check_amount(amount_cents)?;

        Ok(RedirectRequest {
            merchant_id: self.config.merchant_id.clone(),
            amount: amount_cents,
            description: description.to_string(),
            payer_ip: payer_ip.to_string(),
            return_url: self.config.return_url.clone(),
            merchant_reference: merchant_reference.to_string(),
        })
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn request_redirect(&self, request: &RedirectRequest) -> GatewayResult<RedirectResponse> {
        let url = format!("{}/v1/redirect", self.config.base_url);

        debug!(
            merchant_reference = %request.merchant_reference,
            amount = request.amount,
            "Requesting redirect URL"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.config.request_timeout)
                } else {
                    GatewayError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider(format!("{status}: {body}")));
        }

        let redirect: RedirectResponse = response.json().await?;

        info!(
            merchant_reference = %request.merchant_reference,
            "Redirect URL obtained"
        );

        Ok(redirect)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> GatewayConfig {
        GatewayConfig {
            merchant_id: "merchant-1".to_string(),
            secret: "shared-secret".to_string(),
            base_url: "https://provider.example".to_string(),
            return_url: "https://shop.example/payment/return".to_string(),
            min_amount_cents: 100,
            max_amount_cents: 1_000_000,
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_redirect_request_carries_config() {
        let client = HttpProviderClient::new(config()).unwrap();
        let request = client
            .redirect_request(15_000, "Order o1", "203.0.113.7", "pay-1")
            .unwrap();

        assert_eq!(request.merchant_id, "merchant-1");
        assert_eq!(request.amount, 15_000);
        assert_eq!(request.return_url, "https://shop.example/payment/return");
        assert_eq!(request.merchant_reference, "pay-1");
    }

    #[test]
    fn test_redirect_request_enforces_bounds() {
        let client = HttpProviderClient::new(config()).unwrap();

        let err = client
            .redirect_request(10, "Order o1", "203.0.113.7", "pay-1")
            .unwrap_err();
        assert!(matches!(err, GatewayError::AmountOutOfBounds { .. }));
    }
}
