//! Bearer token inspection.
//!
//! Only the payload segment of the JWT is read; the signature is the
//! backend's business. Anything that cannot be decoded counts as expired so
//! a garbled credential always ends in a logout.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

/// Claims the client cares about. The backend also sends `id`, `username`
/// and `role`, which are read from the login response instead.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: f64,
}

/// Decode the payload (middle) segment of a JWT.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.trim().split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    if payload.is_empty() {
        return None;
    }

    // base64url -> standard alphabet, then restore padding
    let base64 = payload.replace('-', "+").replace('_', "/");
    let padded = format!(
        "{}{}",
        base64,
        "=".repeat((4usize.wrapping_sub(base64.len() % 4)) % 4)
    );
    let decoded = BASE64_STANDARD.decode(padded).ok()?;
    serde_json::from_slice::<TokenClaims>(&decoded).ok()
}

/// `true` when the token's `exp` is before `now`, or when the token cannot
/// be decoded at all.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Some(claims) => {
            let now_secs = now.timestamp_millis() as f64 / 1000.0;
            claims.exp < now_secs
        }
        None => {
            debug!("token payload could not be decoded, treating as expired");
            true
        }
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}
