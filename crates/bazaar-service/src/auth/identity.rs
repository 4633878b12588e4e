use bazaar_db::{model::user::Identity, store::UserStore};

use crate::error::{ServiceError, ServiceResult};

/// Loads identities, with their role sets, from the user store.
pub struct IdentityResolver<'a, S: UserStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: UserStore + ?Sized> IdentityResolver<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Loads the identity behind a token subject.
    ///
    /// ## Errors
    /// Returns `NotFound` if the user no longer exists, or a database error.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, user_id: uuid::Uuid) -> ServiceResult<Identity> {
        self.store
            .find_identity_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {user_id}")))
    }

    /// ## Errors
    /// Returns `NotFound` if no user has this username, or a database error.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_by_username(&self, username: &str) -> ServiceResult<Identity> {
        self.store
            .find_identity_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {username}")))
    }
}
