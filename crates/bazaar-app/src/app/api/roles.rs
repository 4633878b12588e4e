use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};

use super::util::json_body;
use crate::{error::AppResult, store_handler::get_store_from_depot};
use bazaar_core::constants::ROLES_ROUTE_COMPONENT;
use bazaar_db::model::{role::Role, user::Identity};
use bazaar_service::roles::{self, AssignRoleRequest, CreateRoleRequest};

#[handler]
async fn list(depot: &mut Depot) -> AppResult<Json<Vec<Role>>> {
    let store = get_store_from_depot(depot)?;
    Ok(Json(roles::list_roles(store.as_ref()).await?))
}

/// ## Summary
/// POST /api/roles - Create a role
///
/// ## Errors
/// Returns HTTP 400 for a malformed name and 409 if it exists.
#[handler]
async fn create(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<Json<Role>> {
    let body: CreateRoleRequest = json_body(req).await?;
    let store = get_store_from_depot(depot)?;

    let role = roles::create_role(store.as_ref(), body).await?;
    res.status_code(StatusCode::CREATED);
    Ok(Json(role))
}

/// ## Summary
/// POST /api/roles/assign - Grant a role to a user
///
/// ## Errors
/// Returns HTTP 404 if the user or role does not exist.
#[handler]
async fn assign(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Identity>> {
    let body: AssignRoleRequest = json_body(req).await?;
    let store = get_store_from_depot(depot)?;

    Ok(Json(roles::assign_role(store.as_ref(), body).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(ROLES_ROUTE_COMPONENT)
        .get(list)
        .post(create)
        .push(Router::with_path("assign").post(assign))
}
