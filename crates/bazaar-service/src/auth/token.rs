//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying `sub`, `iat` and `exp`. Expiry is checked
//! against the caller-supplied clock rather than the system clock so that
//! verification is deterministic.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use bazaar_core::config::{AuthConfig, SigningSecret};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens with a process-wide symmetric key.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SigningSecret, ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is compared against the injected clock in parse_and_verify
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// ## Summary
    /// Builds a codec from the auth settings.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if the configured lifetime does not fit
    /// in a signed duration.
    pub fn from_config(auth: &AuthConfig) -> ServiceResult<Self> {
        let ttl = i64::try_from(auth.token_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                ServiceError::InvalidConfiguration("auth.token_ttl_secs is too large".to_string())
            })?;
        Ok(Self::new(&auth.jwt_secret, ttl))
    }

    /// Configured token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// ## Summary
    /// Signs a token for `subject` valid from `now` until `now + ttl`.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if the expiry overflows or signing fails.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>, ttl: TimeDelta) -> ServiceResult<String> {
        let issued_at = now.timestamp();
        let expires_at = issued_at.checked_add(ttl.num_seconds()).ok_or_else(|| {
            ServiceError::InvalidConfiguration("Token expiry overflows".to_string())
        })?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at,
            exp: expires_at,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to sign token: {e}")))
    }

    /// ## Summary
    /// Verifies the signature and expiry of `token` and returns its subject.
    ///
    /// ## Errors
    /// - `Malformed` if the token cannot be decoded
    /// - `SignatureInvalid` if the signature does not verify under this key
    /// - `Expired` if `now` is at or past the expiry
    pub fn parse_and_verify(&self, token: &str, now: DateTime<Utc>) -> ServiceResult<String> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    ServiceError::SignatureInvalid
                }
                ErrorKind::ExpiredSignature => ServiceError::Expired,
                _ => ServiceError::Malformed,
            })?;

        if now.timestamp() >= data.claims.exp {
            return Err(ServiceError::Expired);
        }

        Ok(data.claims.sub)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
