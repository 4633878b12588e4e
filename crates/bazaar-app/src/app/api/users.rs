use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};

use super::util::json_body;
use crate::{error::AppResult, store_handler::get_store_from_depot};
use bazaar_core::constants::USERS_ROUTE_COMPONENT;
use bazaar_db::model::user::Identity;
use bazaar_service::{
    account::{self, ProfileUpdate},
    auth::get_identity_from_depot,
};

/// ## Summary
/// GET /api/users/me - The caller's identity and roles
#[handler]
async fn me(depot: &mut Depot) -> AppResult<Json<Identity>> {
    Ok(Json(get_identity_from_depot(depot)?.clone()))
}

/// ## Summary
/// PUT /api/users/me - Change the caller's email and/or password
///
/// ## Errors
/// Returns HTTP 400 on validation failure and 409 if the email is taken.
#[handler]
async fn update_me(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Identity>> {
    let body: ProfileUpdate = json_body(req).await?;
    let identity = get_identity_from_depot(depot)?.clone();
    let store = get_store_from_depot(depot)?;

    Ok(Json(
        account::update_profile(store.as_ref(), &identity, body).await?,
    ))
}

/// ## Summary
/// DELETE /api/users/me - Remove the caller's account
///
/// ## Side Effects
/// Outstanding tokens for the account stop authenticating.
#[handler]
async fn delete_me(depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let user_id = get_identity_from_depot(depot)?.user_id;
    let store = get_store_from_depot(depot)?;

    account::delete_account(store.as_ref(), user_id).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(USERS_ROUTE_COMPONENT).push(
        Router::with_path("me")
            .get(me)
            .put(update_me)
            .delete(delete_me),
    )
}
