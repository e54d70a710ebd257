//! # Callback Handling
//!
//! Inbound half of the integration. The provider POSTs a flat set of
//! key/value fields plus a signature; the payload is untrusted until the
//! signature verifies.
//!
//! ## Outcome Mapping
//! ```text
//! signature invalid                         → Unauthenticated
//! response_code OK AND txn_status OK        → Success
//! any other authenticated combination       → Failure
//! ```

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::signature::{self, SIGNATURE_FIELD};

/// Business response code the provider sends on success.
pub const RESPONSE_OK: &str = "000";

/// Transaction-status code the provider sends on success.
pub const TXN_SUCCESS: &str = "completed";

/// Required fields beyond the signature.
const MERCHANT_REF_FIELD: &str = "merchant_ref";
const TRANSACTION_ID_FIELD: &str = "transaction_id";
const RESPONSE_CODE_FIELD: &str = "response_code";
const TXN_STATUS_FIELD: &str = "txn_status";

/// A parsed provider callback.
///
/// `fields` keeps every key/value pair as received (bank metadata,
/// amounts, ...) so the orchestrator can store the blob verbatim.
#[derive(Debug, Clone)]
pub struct CallbackPayload {
    /// Our payment id, echoed back by the provider.
    pub merchant_ref: String,

    /// The provider's transaction id.
    pub transaction_id: String,

    /// Two-part result: business response code and transaction status.
    pub response_code: String,
    pub txn_status: String,

    /// The signature as received.
    pub signature: String,

    /// The full payload, signature included.
    pub fields: BTreeMap<String, String>,
}

/// What an authenticated (or rejected) callback means for the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Signature valid, both codes indicate success.
    Success,
    /// Signature valid, provider reports a failed attempt.
    Failure,
    /// Signature invalid; nothing in the payload can be trusted.
    Unauthenticated,
}

impl CallbackPayload {
    /// Parses the flat field set, failing on missing required fields.
    pub fn parse(fields: BTreeMap<String, String>) -> GatewayResult<Self> {
        let required = |name: &str| -> GatewayResult<String> {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| GatewayError::MalformedCallback(name.to_string()))
        };

        Ok(CallbackPayload {
            merchant_ref: required(MERCHANT_REF_FIELD)?,
            transaction_id: required(TRANSACTION_ID_FIELD)?,
            response_code: required(RESPONSE_CODE_FIELD)?,
            txn_status: required(TXN_STATUS_FIELD)?,
            signature: required(SIGNATURE_FIELD)?,
            fields,
        })
    }

    /// Verifies the signature and maps the result codes to an outcome.
    ///
    /// An unauthenticated payload never yields Success or Failure: the
    /// caller must leave the payment exactly as it was.
    pub fn outcome(&self, secret: &str) -> CallbackOutcome {
        let pairs = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()));

        if !signature::verify(pairs, secret, &self.signature) {
            warn!(
                merchant_ref = %self.merchant_ref,
                "Callback signature verification failed"
            );
            return CallbackOutcome::Unauthenticated;
        }

        let success = self.response_code == RESPONSE_OK && self.txn_status == TXN_SUCCESS;

        debug!(
            merchant_ref = %self.merchant_ref,
            response_code = %self.response_code,
            txn_status = %self.txn_status,
            success,
            "Callback authenticated"
        );

        if success {
            CallbackOutcome::Success
        } else {
            CallbackOutcome::Failure
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
