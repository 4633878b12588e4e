//! Shared building blocks for the Bazaar backend: settings, route constants,
//! field validation and the core error type.

pub mod config;
pub mod constants;
pub mod error;
pub mod util;
pub mod validation;
