//! Persistence layer: diesel schema and models, the Postgres pool, and the
//! store traits the service layer talks to.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
