//! Bazaar server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `bazaar_test::` paths.

pub mod component {
    pub use bazaar_core::{constants, util, validation};
    pub use bazaar_service::{account, auth, cache, catalog, roles};

    pub mod db {
        pub use bazaar_db::db::*;
    }

    pub mod store {
        pub use bazaar_app::store_handler::StoreHandler;
        pub use bazaar_db::store::*;
    }

    pub mod model {
        pub use bazaar_db::model::*;
    }

    pub mod middleware {
        pub use bazaar_app::middleware::*;
    }

    pub mod config {
        pub use bazaar_app::config::ConfigHandler;
        pub use bazaar_core::config::*;
    }

    pub mod error {
        pub use bazaar_app::error::*;
    }
}

pub mod app {
    pub use bazaar_app::app::*;
}
