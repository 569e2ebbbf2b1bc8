//! Token codec: structural and expiry validation of the access token.
//!
//! The server hands out a signed token of the form
//! `header.payload.signature`, where `payload` is base64url-encoded JSON
//! carrying at least an `exp` claim (seconds since the epoch). The client
//! never verifies the signature (it has no key). It only needs to know
//! whether the token is well-formed and when it stops being usable.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

use crate::TokenError;

/// Default safety margin applied by [`is_expired`].
///
/// A token is treated as expired this long before the server would
/// reject it, so requests issued right at the boundary don't fail
/// mid-flight.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// The claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Expiry instant, seconds since the epoch.
    pub exp: i64,
    /// Subject (the user handle), when the issuer includes it.
    pub sub: Option<String>,
    /// Issued-at instant, seconds since the epoch.
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Expiry instant in milliseconds. Widened so that absurd `exp`
    /// values cannot overflow the comparison.
    pub fn expires_at_millis(&self) -> i128 {
        i128::from(self.exp) * 1000
    }
}

/// Decodes the payload segment of `token`.
///
/// # Errors
/// - [`TokenError::Malformed`]: wrong segment count, bad base64, or the
///   payload is not a JSON object
/// - [`TokenError::MissingExpiry`]: no `exp`, or `exp` is not a number
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => {
            return Err(TokenError::Malformed(
                "expected three dot-separated segments".into(),
            ));
        }
    };

    // Some issuers pad base64url, some don't. Accept both.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Malformed(format!("payload is not base64url: {e}")))?;

    let json: Value = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("payload is not JSON: {e}")))?;
    let claims = json
        .as_object()
        .ok_or_else(|| TokenError::Malformed("payload is not a JSON object".into()))?;

    let exp = claims
        .get("exp")
        .and_then(numeric_claim)
        .ok_or(TokenError::MissingExpiry)?;

    Ok(TokenClaims {
        exp,
        sub: claims.get("sub").and_then(Value::as_str).map(str::to_owned),
        iat: claims.get("iat").and_then(numeric_claim),
    })
}

/// Returns `true` if `token` is unusable at `now_millis`.
///
/// Fails closed: a token that cannot be decoded is expired. Otherwise the
/// token is expired when `exp * 1000 < now + skew`.
pub fn is_expired(token: &str, now_millis: u64, skew: Duration) -> bool {
    match decode(token) {
        Ok(claims) => {
            let deadline = i128::from(now_millis) + skew.as_millis() as i128;
            claims.expires_at_millis() < deadline
        }
        Err(_) => true,
    }
}

fn numeric_claim(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

/// Builds an unsigned token carrying the given claims. Test fixture only:
/// the signature segment is a fixed placeholder.
#[cfg(any(test, feature = "testing"))]
pub fn mint_unsigned(exp: i64, sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "sub": sub, "exp": exp }).to_string(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
