use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};

use super::util::{json_body, path_id};
use crate::{
    error::{AppError, AppResult},
    services_handler::get_catalog_from_depot,
    store_handler::get_store_from_depot,
};
use bazaar_core::constants::PRODUCTS_ROUTE_COMPONENT;
use bazaar_db::model::catalog::Product;
use bazaar_service::catalog::ProductInput;

/// ## Summary
/// GET /api/products[?category_id=] - List products, optionally by category
///
/// ## Errors
/// Returns HTTP 400 if `category_id` is not a UUID.
#[handler]
async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<Product>>> {
    let category_id = req
        .query::<String>("category_id")
        .map(|raw| {
            uuid::Uuid::parse_str(&raw)
                .map_err(|_err| AppError::BadRequest("Invalid category_id".to_string()))
        })
        .transpose()?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    Ok(Json(catalog.list_products(store.as_ref(), category_id).await?))
}

#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Product>> {
    let id = path_id(req)?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    Ok(Json(catalog.get_product(store.as_ref(), id).await?))
}

/// ## Summary
/// POST /api/products - Create a product in an existing category
///
/// ## Errors
/// Returns HTTP 400 on validation failure and 404 if the category is missing.
#[handler]
async fn create(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<Product>> {
    let body: ProductInput = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    let product = catalog.create_product(store.as_ref(), body).await?;
    res.status_code(StatusCode::CREATED);
    Ok(Json(product))
}

#[handler]
async fn update(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Product>> {
    let id = path_id(req)?;
    let body: ProductInput = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    Ok(Json(catalog.update_product(store.as_ref(), id, body).await?))
}

#[handler]
async fn delete(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let id = path_id(req)?;
    let store = get_store_from_depot(depot)?;
    let catalog = get_catalog_from_depot(depot)?;

    catalog.delete_product(store.as_ref(), id).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(PRODUCTS_ROUTE_COMPONENT)
        .get(list)
        .post(create)
        .push(
            Router::with_path("{id}")
                .get(get)
                .put(update)
                .delete(delete),
        )
}
