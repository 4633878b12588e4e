use salvo::{Depot, Scribe, http::header::AUTHORIZATION};

use crate::{services_handler::get_codec_from_depot, store_handler::get_store_from_depot};
use bazaar_service::auth::{RequestAuthenticator, depot::insert_auth_context};

/// ## Summary
/// Establishes who is calling from the bearer token, if any.
///
/// Never rejects a request itself: a missing, invalid or expired token, or
/// one whose user no longer exists, leaves the request anonymous.
///
/// ## Side Effects
/// Inserts an `AuthContext` into the depot for downstream handlers.
///
/// ## Errors
/// Returns an HTTP 500 response if the depot lacks the codec or datastore.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
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
        tracing::trace!("Authenticating request");

        let (codec, store) = match (get_codec_from_depot(depot), get_store_from_depot(depot)) {
            (Ok(codec), Ok(store)) => (codec, store),
            (Err(e), _) | (_, Err(e)) => {
                e.render(res);
                ctrl.skip_rest();
                return;
            }
        };

        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let context = RequestAuthenticator::new(&codec, store.as_ref())
            .authenticate(authorization, chrono::Utc::now())
            .await;

        insert_auth_context(depot, context);
    }
}

/// ## Summary
/// Middleware handler for authentication.
pub struct AuthMiddleware;
