pub mod catalog;
pub mod role;
pub mod user;
