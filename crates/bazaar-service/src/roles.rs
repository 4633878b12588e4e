//! Role management for administrators.

use serde::Deserialize;

use bazaar_core::validation::{FieldErrors, validate_required, validate_role_name};
use bazaar_db::{
    error::DbError,
    model::{role::Role, user::Identity},
    store::UserStore,
};

use crate::auth::identity::IdentityResolver;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRoleRequest {
    pub username: String,
    pub role: String,
}

/// ## Errors
/// Returns database errors.
pub async fn list_roles<S: UserStore + ?Sized>(store: &S) -> ServiceResult<Vec<Role>> {
    Ok(store.list_roles().await?)
}

/// ## Summary
/// Creates a new role.
///
/// ## Errors
/// - `ValidationFailed` if the name is not 2-30 uppercase letters or `_`
/// - `AlreadyExists` if a role with this name exists
#[tracing::instrument(skip(store))]
pub async fn create_role<S: UserStore + ?Sized>(
    store: &S,
    request: CreateRoleRequest,
) -> ServiceResult<Role> {
    let mut errors = FieldErrors::new();
    validate_role_name(&mut errors, &request.name);
    errors.into_result()?;

    let role = store.create_role(&request.name).await.map_err(|e| match e {
        DbError::UniqueViolation(_) => {
            ServiceError::AlreadyExists(format!("Role {} already exists", request.name))
        }
        other => other.into(),
    })?;

    tracing::info!(role = %role.name, "Role created");
    Ok(role)
}

/// ## Summary
/// Grants `role` to `username`. Granting a held role changes nothing.
///
/// ## Errors
/// - `ValidationFailed` if either field is blank
/// - `NotFound` if the user or the role does not exist
#[tracing::instrument(skip(store))]
pub async fn assign_role<S: UserStore + ?Sized>(
    store: &S,
    request: AssignRoleRequest,
) -> ServiceResult<Identity> {
    let mut errors = FieldErrors::new();
    validate_required(&mut errors, "username", &request.username);
    validate_required(&mut errors, "role", &request.role);
    errors.into_result()?;

    let resolver = IdentityResolver::new(store);
    let identity = resolver.resolve_by_username(&request.username).await?;
    store.assign_role(identity.user_id, &request.role).await?;

    tracing::info!(user_id = %identity.user_id, role = %request.role, "Role assigned");
    resolver.resolve(identity.user_id).await
}
