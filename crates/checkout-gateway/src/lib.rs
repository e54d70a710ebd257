//! # Checkout Gateway
//!
//! Integration with the external redirect-based payment provider.
//!
//! ## Flow
//! ```text
//! Outbound (trusted → provider):
//!   orchestrator ──▶ ProviderClient::request_redirect ──▶ {redirect_url}
//!
//! Inbound (provider → us, UNTRUSTED):
//!   callback fields + signature
//!        │
//!        ▼
//!   verify HMAC-SHA256 over sorted fields ──▶ mismatch: unauthenticated
//!        │
//!        ▼
//!   response code + txn status both OK? ──▶ Completed, else Failed
//! ```
//!
//! The gateway never touches the database; it turns provider bytes into
//! typed outcomes and leaves persistence to the orchestrator.

pub mod callback;
pub mod config;
pub mod error;
pub mod provider;
pub mod signature;

pub use callback::{CallbackOutcome, CallbackPayload};
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use provider::{HttpProviderClient, ProviderClient, RedirectRequest, RedirectResponse};
