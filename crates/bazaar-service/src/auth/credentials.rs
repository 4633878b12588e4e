use bazaar_db::{model::user::Identity, store::UserStore};

use super::{
    identity::IdentityResolver,
    password::{verify_password, verify_unknown_user},
};
use crate::error::{ServiceError, ServiceResult};

/// Checks a username/password pair against the stored hash.
pub struct CredentialVerifier<'a, S: UserStore + ?Sized> {
    resolver: IdentityResolver<'a, S>,
}

impl<'a, S: UserStore + ?Sized> CredentialVerifier<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            resolver: IdentityResolver::new(store),
        }
    }

    /// ## Summary
    /// Returns the identity if `password` matches its stored hash.
    ///
    /// Callers facing the network must collapse `NotFound` and
    /// `InvalidCredentials` into one outcome. An unknown username still pays
    /// for one Argon2 verification so both outcomes take comparable time.
    ///
    /// ## Errors
    /// - `NotFound` if no user has this username
    /// - `InvalidCredentials` if the password does not match
    #[tracing::instrument(skip(self, password))]
    pub async fn verify(&self, username: &str, password: &str) -> ServiceResult<Identity> {
        let identity = match self.resolver.resolve_by_username(username).await {
            Ok(identity) => identity,
            Err(ServiceError::NotFound(what)) => {
                let _mismatch = verify_unknown_user(password);
                return Err(ServiceError::NotFound(what));
            }
            Err(e) => return Err(e),
        };
        verify_password(password, &identity.password_hash)?;
        Ok(identity)
    }
}
