//! Signing and verification of rotating check-in tokens.
//!
//! Tokens are compact HS256 JWTs (`header.payload.signature`). The
//! embedded `exp` claim is the authority on validity; the stored
//! `expires_at` on a credential record mirrors it exactly.

use anyhow::Result;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---

/// Claims carried by every check-in token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinClaims {
    // ---
    /// Subject who requested the token.
    pub sub: String,

    /// Event the token admits check-in to.
    pub event_id: i32,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expiry, Unix seconds.
    pub exp: i64,

    /// Unique token id.
    pub jti: String,
}

// ---

/// Reasons a presented token is refused.
#[derive(Debug, Error)]
pub enum TokenError {
    // ---
    #[error("token expired")]
    Expired,

    #[error("token is for event {actual}, not {expected}")]
    EventMismatch { expected: i32, actual: i32 },

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        // ---
        match self {
            TokenError::Expired => "expired",
            TokenError::EventMismatch { .. } => "event_mismatch",
            TokenError::Invalid(_) => "invalid",
        }
    }
}

// ---

/// Signs and verifies check-in tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenSigner {
    // ---
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    // ---
    /// Creates a signer from the server secret.
    ///
    /// # Errors
    /// Fails if the secret is empty. This is a configuration error and
    /// should stop startup.
    pub fn new(secret: &str) -> Result<Self> {
        // ---
        if secret.is_empty() {
            anyhow::bail!("Missing required configuration: CHECKIN_SIGNING_SECRET");
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Produces the compact signed form of `claims`.
    pub fn sign(&self, claims: &CheckinClaims) -> Result<String, jsonwebtoken::errors::Error> {
        // ---
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Verifies signature and expiry of `token` as of `now`.
    ///
    /// A token is accepted iff the signature checks out under this secret
    /// and `now` is strictly before the embedded `exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<CheckinClaims, TokenError> {
        // ---
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's clock below; "exp" stays required.
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<CheckinClaims>(token, &self.decoding, &validation)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Like [`TokenSigner::verify`], additionally requiring the token to
    /// belong to `event_id`.
    pub fn verify_for_event(
        &self,
        token: &str,
        event_id: i32,
        now: DateTime<Utc>,
    ) -> Result<CheckinClaims, TokenError> {
        // ---
        let claims = self.verify(token, now)?;

        if claims.event_id != event_id {
            return Err(TokenError::EventMismatch {
                expected: event_id,
                actual: claims.event_id,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn claims(exp: i64) -> CheckinClaims {
        // ---
        CheckinClaims {
            sub: "u1".to_string(),
            event_id: 42,
            iat: exp - 30,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        // ---
        let err = TokenSigner::new("").unwrap_err();
        assert!(err.to_string().contains("CHECKIN_SIGNING_SECRET"));
    }

    #[test]
    fn token_has_three_segments() {
        // ---
        let signer = TokenSigner::new("secret").unwrap();
        let token = signer.sign(&claims(1_000)).unwrap();

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn accepted_only_before_expiry() {
        // ---
        let signer = TokenSigner::new("secret").unwrap();
        let original = claims(1_030);
        let token = signer.sign(&original).unwrap();

        let decoded = signer.verify(&token, at(1_000)).unwrap();
        assert_eq!(decoded, original);
        assert!(signer.verify(&token, at(1_029)).is_ok());

        assert!(matches!(signer.verify(&token, at(1_030)), Err(TokenError::Expired)));
        assert!(matches!(signer.verify(&token, at(5_000)), Err(TokenError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        // ---
        let signer = TokenSigner::new("secret").unwrap();
        let other = TokenSigner::new("another-secret").unwrap();
        let token = signer.sign(&claims(1_030)).unwrap();

        let err = other.verify(&token, at(1_000)).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
        assert_eq!(err.outcome(), "invalid");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        // ---
        let signer = TokenSigner::new("secret").unwrap();
        let token = signer.sign(&claims(1_030)).unwrap();
        let forged_claims = signer.sign(&CheckinClaims {
            event_id: 7,
            ..claims(1_030)
        });
        let forged_payload = forged_claims.unwrap();

        // Splice the other token's payload under the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = forged_payload.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(
            signer.verify(&spliced, at(1_000)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        // ---
        let signer = TokenSigner::new("secret").unwrap();

        assert!(matches!(
            signer.verify("not-a-token", at(0)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn event_mismatch_is_reported() {
        // ---
        let signer = TokenSigner::new("secret").unwrap();
        let token = signer.sign(&claims(1_030)).unwrap();

        assert!(signer.verify_for_event(&token, 42, at(1_000)).is_ok());

        let err = signer.verify_for_event(&token, 43, at(1_000)).unwrap_err();
        assert!(matches!(
            err,
            TokenError::EventMismatch {
                expected: 43,
                actual: 42
            }
        ));
    }
}
