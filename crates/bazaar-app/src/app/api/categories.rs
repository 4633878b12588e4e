use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};

use super::util::{json_body, path_id};
use crate::{
    error::AppResult, services_handler::get_catalog_from_depot,
    store_handler::get_store_from_depot,
};
use bazaar_core::constants::CATEGORIES_ROUTE_COMPONENT;
use bazaar_db::model::catalog::Category;
use bazaar_service::catalog::CategoryInput;

#[handler]
async fn list(depot: &mut Depot) -> AppResult<Json<Vec<Category>>> {
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    Ok(Json(catalog.list_categories(store.as_ref()).await?))
}

#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Category>> {
    let id = path_id(req)?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    Ok(Json(catalog.get_category(store.as_ref(), id).await?))
}

/// ## Summary
/// POST /api/categories - Create a category; its slug is derived from the name
///
/// ## Errors
/// Returns HTTP 400 on validation failure and 409 if the slug is taken.
#[handler]
async fn create(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<Category>> {
    let body: CategoryInput = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    let category = catalog.create_category(store.as_ref(), body).await?;
    res.status_code(StatusCode::CREATED);
    Ok(Json(category))
}

#[handler]
async fn update(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Category>> {
    let id = path_id(req)?;
    let body: CategoryInput = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    Ok(Json(catalog.update_category(store.as_ref(), id, body).await?))
}

/// ## Summary
/// DELETE /api/categories/{id}
///
/// ## Errors
/// Returns HTTP 409 while products still belong to the category.
#[handler]
async fn delete(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = path_id(req)?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    catalog.delete_category(store.as_ref(), id).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CATEGORIES_ROUTE_COMPONENT)
        .get(list)
        .post(create)
        .push(
            Router::with_path("{id}")
                .get(get)
                .put(update)
                .delete(delete),
        )
}
