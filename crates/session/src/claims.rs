//! Local inspection of bearer-token claims.
//!
//! The credential is a compact three-segment signed token; only the middle
//! segment is decoded here, and only to read the self-describing expiry.
//! Signature verification stays the server's responsibility — swapping in
//! real verification means replacing this module, not its callers.

use std::time::{SystemTime, UNIX_EPOCH};

use {
    base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD},
    serde::Deserialize,
};

/// Claims the client cares about. Anything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since epoch.
    pub exp: Option<u64>,
    /// Subject (user id), when present.
    pub sub: Option<String>,
}

/// Decode the claims segment of a three-segment token. Returns `None` for
/// anything that is not shaped like one or whose payload is not JSON.
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };
    // Tolerate padded encoders.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether the token is expired as of `now_secs`. A token with no decodable
/// `exp` claim is treated as expired; the boundary is inclusive (`exp ==
/// now` is already expired).
pub fn is_expired(token: &str, now_secs: u64) -> bool {
    match decode(token).and_then(|c| c.exp) {
        Some(exp) => exp <= now_secs,
        None => true,
    }
}

pub fn is_expired_now(token: &str) -> bool {
    is_expired(token, now_secs())
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Unsigned three-segment token with the given JSON payload, for tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn fake_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{header}.{body}.sig")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_exp_and_sub() {
        let token = fake_token(&serde_json::json!({"exp": 2_000_000_000u64, "sub": "u1"}));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.exp, Some(2_000_000_000));
        assert_eq!(claims.sub.as_deref(), Some("u1"));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let token = fake_token(&serde_json::json!({"exp": 1_000}));
        assert!(is_expired(&token, 1_000));
        assert!(is_expired(&token, 1_001));
        assert!(!is_expired(&token, 999));
    }

    #[test]
    fn missing_exp_means_expired() {
        let token = fake_token(&serde_json::json!({"sub": "u1"}));
        assert!(is_expired(&token, 0));
    }

    #[test]
    fn malformed_tokens_do_not_decode() {
        assert!(decode("").is_none());
        assert!(decode("only-one-segment").is_none());
        assert!(decode("a.b").is_none());
        assert!(decode("a.b.c.d").is_none());
        assert!(decode("a.%%%.c").is_none());
        // Valid base64 but not JSON.
        let garbage = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(decode(&format!("h.{garbage}.s")).is_none());
        assert!(is_expired("a.b.c", 0));
    }

    #[test]
    fn tolerates_padded_payload_segment() {
        let body = base64::engine::general_purpose::URL_SAFE
            .encode(serde_json::to_vec(&serde_json::json!({"exp": 5})).unwrap());
        let token = format!("h.{body}.s");
        assert_eq!(decode(&token).unwrap().exp, Some(5));
    }
}
