use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::UserId;

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the platform expects once a token has
/// been decoded and its signature verified. Timestamps use the standard
/// `iat` / `exp` seconds-since-epoch encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the stable user identifier from the identity provider.
    pub sub: UserId,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate the claims' time window.
///
/// Signature verification happens in [`crate::validator`]; this only looks at
/// `iat`/`exp` against `now`.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            issued_at: Utc.timestamp_opt(iat, 0).unwrap(),
            expires_at: Utc.timestamp_opt(exp, 0).unwrap(),
            email: None,
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let c = claims(1_000, 2_000);
        assert_eq!(validate_claims(&c, Utc.timestamp_opt(1_500, 0).unwrap()), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let c = claims(1_000, 2_000);
        assert_eq!(
            validate_claims(&c, Utc.timestamp_opt(2_000, 0).unwrap()),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, Utc.timestamp_opt(999, 0).unwrap()),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let c = claims(2_000, 1_000);
        assert_eq!(
            validate_claims(&c, Utc::now()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn serializes_standard_claim_names() {
        let now = Utc::now();
        let c = JwtClaims {
            sub: UserId::new(),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
            email: None,
        };
        let v = serde_json::to_value(&c).unwrap();
        assert!(v["iat"].is_i64());
        assert!(v["exp"].is_i64());
        assert!(v.get("email").is_none());
    }
}
