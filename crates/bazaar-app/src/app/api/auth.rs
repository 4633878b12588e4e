use chrono::Utc;
use salvo::{Depot, Request, Router, handler};

use super::util::json_body;
use crate::{
    config::get_config_from_depot, error::AppResult, services_handler::get_codec_from_depot,
    store_handler::get_store_from_depot,
};
use bazaar_core::constants::AUTH_ROUTE_COMPONENT;
use bazaar_service::account::{self, LoginRequest, RegisterRequest};

/// ## Summary
/// POST /api/auth/register - Create an account and return a session token
///
/// ## Side Effects
/// - Creates a user row linked to the default role
///
/// ## Errors
/// Returns HTTP 400 on validation failure and 409 if the username or email is
/// taken.
#[handler]
async fn register(req: &mut Request, depot: &mut Depot) -> AppResult<String> {
    let body: RegisterRequest = json_body(req).await?;
    let config = get_config_from_depot(depot)?;
    let store = get_store_from_depot(depot)?;
    let codec = get_codec_from_depot(depot)?;

    Ok(account::register(store.as_ref(), &codec, &config.auth, body, Utc::now()).await?)
}

/// ## Summary
/// POST /api/auth/login - Exchange a username and password for a session token
///
/// ## Errors
/// Returns HTTP 400 if a field is blank and 401 for any credential mismatch.
#[handler]
async fn login(req: &mut Request, depot: &mut Depot) -> AppResult<String> {
    let body: LoginRequest = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let codec = get_codec_from_depot(depot)?;

    Ok(account::login(store.as_ref(), &codec, body, Utc::now()).await?)
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(AUTH_ROUTE_COMPONENT)
        .push(Router::with_path("register").post(register))
        .push(Router::with_path("login").post(login))
}
