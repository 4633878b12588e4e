//! HTTP surface: salvo middleware, handlers and router assembly.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services_handler;
pub mod store_handler;
