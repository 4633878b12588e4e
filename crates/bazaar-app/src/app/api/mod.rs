mod auth;
mod categories;
mod healthcheck;
mod products;
mod roles;
mod users;
mod util;

use std::{sync::Arc, time::Duration};

use salvo::{Router, timeout::Timeout};

use crate::middleware::{access::AccessControl, auth::AuthMiddleware};
use bazaar_service::auth::AccessPolicy;

// Re-export route constants from core
pub use bazaar_core::constants::{API_ROUTE_COMPONENT, API_ROUTE_PREFIX};

/// ## Summary
/// Constructs the API router. Every request gets a deadline, is
/// authenticated, and then has the access policy applied before reaching a
/// handler.
#[must_use]
pub fn routes(request_timeout: Duration, policy: Arc<AccessPolicy>) -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .hoop(Timeout::new(request_timeout))
        .hoop(AuthMiddleware)
        .hoop(AccessControl { policy })
        .push(auth::routes())
        .push(healthcheck::routes())
        .push(users::routes())
        .push(roles::routes())
        .push(categories::routes())
        .push(products::routes())
}
