//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `token`: signing and verifying session tokens
//! - `password`: password hashing and verification with Argon2
//! - `identity`: loading identities with their role sets
//! - `credentials`: username/password checks for login
//! - `authenticate`: per-request bearer token authentication
//! - `access`: ordered route rules and the allow/deny decision
//! - `depot`: request-scoped authentication context in the Salvo depot

pub mod access;
pub mod authenticate;
pub mod credentials;
pub mod depot;
pub mod identity;
pub mod password;
pub mod token;

pub use access::{AccessPolicy, AccessRule, Decision, DenyReason, Requirement, RoutePattern};
pub use authenticate::{RequestAuthenticator, bearer_token};
pub use credentials::CredentialVerifier;
pub use depot::{AuthContext, get_auth_context, get_identity_from_depot, is_authenticated};
pub use identity::IdentityResolver;
pub use token::{Claims, TokenCodec};
