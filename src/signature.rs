//! LINE webhook signature verification.
//!
//! The platform signs every delivery with the channel secret and sends
//! `base64(HMAC-SHA256(secret, raw_body))` in the `x-line-signature` header.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::RelayError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn keyed(channel_secret: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Compute the base64-encoded signature for a body.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    keyed(channel_secret, body)
        .map(|mac| STANDARD.encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Verify a signature header value against the raw request body.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(given) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Some(mac) = keyed(channel_secret, body) else {
        return false;
    };
    // verify_slice compares in constant time.
    mac.verify_slice(&given).is_ok()
}

/// Validate an optional header value, mapping failures to `RelayError`.
pub fn check(channel_secret: &str, body: &[u8], header: Option<&str>) -> Result<(), RelayError> {
    let signature = header.ok_or(RelayError::MissingSignature)?;
    if verify(channel_secret, body, signature) {
        Ok(())
    } else {
        Err(RelayError::InvalidSignature)
    }
}
