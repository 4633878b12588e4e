//! Integration tests driving the full router.
//!
//! Every test builds its own application over a fresh in-memory store, so
//! tests run in parallel without a database.

mod access;
mod auth;
mod catalog;
mod helpers;
mod profile;
mod roles;
