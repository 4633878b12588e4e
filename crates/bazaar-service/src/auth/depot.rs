//! Depot helpers for the request-scoped authentication context.

use bazaar_db::model::user::Identity;

use crate::error::{ServiceError, ServiceResult};

pub mod depot_keys {
    pub const AUTH_CONTEXT: &str = "__auth_context";
}

/// Who is making the current request.
///
/// Established once per request by the authentication middleware and dropped
/// with the depot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    Authenticated(Identity),
    #[default]
    Anonymous,
}

impl AuthContext {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

static ANONYMOUS: AuthContext = AuthContext::Anonymous;

pub fn insert_auth_context(depot: &mut salvo::Depot, context: AuthContext) {
    depot.insert(depot_keys::AUTH_CONTEXT, context);
}

/// Returns the request's context; a depot without one is anonymous.
#[must_use]
pub fn get_auth_context(depot: &salvo::Depot) -> &AuthContext {
    depot
        .get::<AuthContext>(depot_keys::AUTH_CONTEXT)
        .unwrap_or(&ANONYMOUS)
}

/// Get the authenticated identity from the depot.
///
/// ## Errors
///
/// Returns `Unauthorized` if the request is anonymous.
pub fn get_identity_from_depot(depot: &salvo::Depot) -> ServiceResult<&Identity> {
    get_auth_context(depot)
        .identity()
        .ok_or(ServiceError::Unauthorized)
}

/// Check if the request carries an authenticated identity.
#[must_use]
pub fn is_authenticated(depot: &salvo::Depot) -> bool {
    get_auth_context(depot).is_authenticated()
}
