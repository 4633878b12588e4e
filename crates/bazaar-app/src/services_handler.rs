use std::sync::Arc;

use salvo::async_trait;

use crate::error::AppResult;
use bazaar_core::error::CoreError;
use bazaar_service::{auth::TokenCodec, catalog::CatalogService};

/// Shares the long-lived services (token codec, catalog cache) with every
/// request.
pub struct ServicesHandler {
    pub codec: Arc<TokenCodec>,
    pub catalog: Arc<CatalogService>,
}

#[async_trait]
impl salvo::Handler for ServicesHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.codec));
        depot.inject(Arc::clone(&self.catalog));
    }
}

/// ## Errors
/// Returns an error if the token codec is not found in the depot.
pub fn get_codec_from_depot(depot: &salvo::Depot) -> AppResult<Arc<TokenCodec>> {
    depot
        .obtain::<Arc<TokenCodec>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Token codec not found in depot").into())
}

/// ## Errors
/// Returns an error if the catalog service is not found in the depot.
pub fn get_catalog_from_depot(depot: &salvo::Depot) -> AppResult<Arc<CatalogService>> {
    depot
        .obtain::<Arc<CatalogService>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Catalog service not found in depot").into()
        })
}
