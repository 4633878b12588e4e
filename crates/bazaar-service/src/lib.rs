//! Authentication, authorization and the account and catalog use cases built
//! on top of them.

pub mod account;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod roles;
