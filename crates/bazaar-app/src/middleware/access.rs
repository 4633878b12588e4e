use std::sync::Arc;

use salvo::{Depot, Scribe};

use crate::error::AppError;
use bazaar_service::{
    auth::{AccessPolicy, Decision, DenyReason, get_auth_context},
    error::ServiceError,
};

/// ## Summary
/// Applies the route access policy to the context left by `AuthMiddleware`.
///
/// Must run after `AuthMiddleware`; a depot without a context is treated as
/// anonymous.
///
/// ## Errors
/// Returns HTTP 401 when the route needs a caller and none was established,
/// and HTTP 403 when the caller lacks a required role.
#[salvo::async_trait]
impl salvo::Handler for AccessControl {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let context = get_auth_context(depot);

        match self.policy.decide(req.method(), req.uri().path(), context) {
            Decision::Allow => {
                tracing::trace!("Access allowed");
            }
            Decision::Deny(reason) => {
                let error = match reason {
                    DenyReason::Unauthorized => ServiceError::Unauthorized,
                    DenyReason::Forbidden => ServiceError::Forbidden,
                };
                AppError::from(error).render(res);
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Middleware handler enforcing an [`AccessPolicy`].
pub struct AccessControl {
    pub policy: Arc<AccessPolicy>,
}
