//! # Callback Signatures
//!
//! HMAC-SHA256 over the callback fields, sorted by key, excluding the
//! signature field itself:
//!
//! ```text
//! canonical = "amount=15000&merchant_ref=pay-1&response_code=000&..."
//! signature = lowercase_hex(HMAC-SHA256(secret, canonical))
//! ```
//!
//! Verification goes through `Mac::verify_slice`, which compares in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The field carrying the provider's signature; excluded from the
/// canonical string.
pub const SIGNATURE_FIELD: &str = "signature";

/// Builds the canonical string: fields sorted by key, `key=value` pairs
/// joined by `&`, the signature field left out.
pub fn canonical_string<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = fields
        .into_iter()
        .filter(|(k, _)| *k != SIGNATURE_FIELD)
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    out
}

/// Computes the lowercase-hex HMAC-SHA256 signature over the fields.
pub fn sign<'a, I>(fields: I, secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let canonical = canonical_string(fields);

    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC key of any length is accepted");
    mac.update(canonical.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a provided signature against the fields in constant time.
/// A signature that is not valid hex can never verify.
pub fn verify<'a, I>(fields: I, secret: &str, provided: &str) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let Ok(provided_bytes) = hex::decode(provided) else {
        return false;
    };

    let canonical = canonical_string(fields);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC key of any length is accepted");
    mac.update(canonical.as_bytes());

    mac.verify_slice(&provided_bytes).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
