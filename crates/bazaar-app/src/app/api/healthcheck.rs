use salvo::{Router, handler};

use bazaar_core::constants::HEALTHCHECK_ROUTE_COMPONENT;

#[handler]
async fn hello() -> &'static str {
    "OK"
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(HEALTHCHECK_ROUTE_COMPONENT).get(hello)
}
