//! Best-effort JWT claims decoding.
//!
//! Decodes the payload segment without verifying the signature. Diagnostic
//! use only (token inspection panels, expiry hints); trust decisions always
//! come from the backend's own validation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token is not a three-segment JWT")]
    MalformedToken,

    #[error("payload segment is not valid base64url: {0}")]
    InvalidEncoding(String),

    #[error("payload is not a JSON object: {0}")]
    InvalidPayload(String),
}

/// Decode the claims object of a JWT without verification.
pub fn decode_claims(token: &str) -> Result<serde_json::Value, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ClaimsError::InvalidEncoding(e.to_string()))?;

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| ClaimsError::InvalidPayload(e.to_string()))?;

    if !value.is_object() {
        return Err(ClaimsError::InvalidPayload("not an object".to_string()));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.unverified-signature")
    }

    #[test]
    fn decodes_payload_claims() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "1",
            "tenantId": "tenant-a",
            "exp": 1_900_000_000u64,
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims["tenantId"], "tenant-a");
        assert_eq!(claims["sub"], "1");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(decode_claims("abc.def"), Err(ClaimsError::MalformedToken));
        assert_eq!(
            decode_claims("a.b.c.d"),
            Err(ClaimsError::MalformedToken)
        );
    }

    #[test]
    fn rejects_non_base64_payload() {
        assert!(matches!(
            decode_claims("aGVhZGVy.%%%.c2ln"),
            Err(ClaimsError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn rejects_non_object_payload() {
        let body = URL_SAFE_NO_PAD.encode(b"42");
        let token = format!("h.{body}.s");
        assert!(matches!(
            decode_claims(&token),
            Err(ClaimsError::InvalidPayload(_))
        ));
    }
}
