use std::sync::Arc;

use salvo::async_trait;

use crate::error::AppResult;
use bazaar_core::error::CoreError;
use bazaar_db::store::Store;

/// Shares the datastore with every request through the depot.
pub struct StoreHandler {
    pub store: Arc<dyn Store>,
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.store));
    }
}

/// ## Summary
/// Retrieves the datastore from the depot.
///
/// ## Errors
/// Returns an error if the datastore is not found in the depot.
pub fn get_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn Store>> {
    depot
        .obtain::<Arc<dyn Store>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Datastore not found in depot").into())
}
