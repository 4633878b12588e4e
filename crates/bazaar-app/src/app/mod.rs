pub mod api;

use std::sync::Arc;

use salvo::Router;

use crate::{
    config::{ConfigHandler, Settings},
    services_handler::ServicesHandler,
    store_handler::StoreHandler,
};
use bazaar_db::store::Store;
use bazaar_service::{
    auth::{AccessPolicy, TokenCodec},
    catalog::CatalogService,
};

/// ## Summary
/// Assembles the full application router: depot injection hoops followed by
/// the API tree.
///
/// ## Errors
/// Returns an error if the token codec cannot be built from the settings.
pub fn router(settings: &Settings, store: Arc<dyn Store>) -> anyhow::Result<Router> {
    let codec = Arc::new(TokenCodec::from_config(&settings.auth)?);
    let catalog = Arc::new(CatalogService::new(settings.cache.ttl()));
    let policy = Arc::new(AccessPolicy::default_rules(&settings.auth.admin_role));

    Ok(Router::new()
        .hoop(ConfigHandler {
            settings: Arc::new(settings.clone()),
        })
        .hoop(StoreHandler { store })
        .hoop(ServicesHandler { codec, catalog })
        .push(api::routes(settings.server.request_timeout(), policy)))
}
