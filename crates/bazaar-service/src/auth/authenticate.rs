use chrono::{DateTime, Utc};

use bazaar_core::constants::BEARER_SCHEME;
use bazaar_db::store::UserStore;

use super::{depot::AuthContext, identity::IdentityResolver, token::TokenCodec};
use crate::error::ServiceError;

/// ## Summary
/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for other schemes
/// or an empty token.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Establishes the caller's identity for one request.
///
/// Every failure leaves the request anonymous; turning anonymity into a
/// rejection is left to the access policy.
pub struct RequestAuthenticator<'a, S: UserStore + ?Sized> {
    codec: &'a TokenCodec,
    resolver: IdentityResolver<'a, S>,
}

impl<'a, S: UserStore + ?Sized> RequestAuthenticator<'a, S> {
    #[must_use]
    pub const fn new(codec: &'a TokenCodec, store: &'a S) -> Self {
        Self {
            codec,
            resolver: IdentityResolver::new(store),
        }
    }

    /// ## Summary
    /// Authenticates the raw `Authorization` header value, if any.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthContext {
        let Some(header) = authorization else {
            tracing::trace!("No authorization header");
            return AuthContext::Anonymous;
        };
        let Some(token) = bearer_token(header) else {
            tracing::debug!("Authorization header is not a bearer token");
            return AuthContext::Anonymous;
        };

        let subject = match self.codec.parse_and_verify(token, now) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                return AuthContext::Anonymous;
            }
        };
        let Ok(user_id) = uuid::Uuid::parse_str(&subject) else {
            tracing::debug!("Token subject is not a user id");
            return AuthContext::Anonymous;
        };

        match self.resolver.resolve(user_id).await {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.user_id, "Request authenticated");
                AuthContext::Authenticated(identity)
            }
            Err(ServiceError::NotFound(_)) => {
                tracing::debug!(%user_id, "Token subject no longer exists");
                AuthContext::Anonymous
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve token subject");
                AuthContext::Anonymous
            }
        }
    }
}
