//! Registration, login, profile maintenance and the bootstrap administrator.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use bazaar_core::{
    config::AuthConfig,
    validation::{
        FieldErrors, validate_email, validate_password, validate_required, validate_username,
    },
};
use bazaar_db::{
    error::DbError,
    model::user::{Identity, NewUser, UserChanges},
    store::UserStore,
};

use crate::auth::{
    credentials::CredentialVerifier, identity::IdentityResolver, password::hash_password,
    token::TokenCodec,
};
use crate::error::{ServiceError, ServiceResult};

#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn issue_session(codec: &TokenCodec, identity: &Identity, now: DateTime<Utc>) -> ServiceResult<String> {
    codec.issue(&identity.user_id.to_string(), now, codec.ttl())
}

/// ## Errors
/// Returns `AlreadyExists` if `email` belongs to a user other than `owner`.
async fn ensure_email_available<S: UserStore + ?Sized>(
    store: &S,
    email: &str,
    owner: Option<uuid::Uuid>,
) -> ServiceResult<()> {
    match store.user_id_by_email(email).await? {
        Some(existing) if Some(existing) != owner => Err(ServiceError::AlreadyExists(
            "Email is already registered".to_string(),
        )),
        _ => Ok(()),
    }
}

/// ## Summary
/// Creates an account holding the default role and returns a session token
/// for it.
///
/// ## Side Effects
/// - Inserts a user row and one role link in a single unit of work
///
/// ## Errors
/// - `ValidationFailed` if any field is malformed
/// - `AlreadyExists` if the username or email is taken; nothing is written
/// - `InvalidConfiguration` if the default role is missing
#[tracing::instrument(skip(store, codec, auth, request, now), fields(username = %request.username))]
pub async fn register<S: UserStore + ?Sized>(
    store: &S,
    codec: &TokenCodec,
    auth: &AuthConfig,
    request: RegisterRequest,
    now: DateTime<Utc>,
) -> ServiceResult<String> {
    let mut errors = FieldErrors::new();
    validate_username(&mut errors, &request.username, auth.unicode_usernames);
    validate_email(&mut errors, &request.email);
    validate_password(&mut errors, &request.password);
    errors.into_result()?;

    if store.username_exists(&request.username).await? {
        return Err(ServiceError::AlreadyExists(
            "Username is already taken".to_string(),
        ));
    }
    ensure_email_available(store, &request.email, None).await?;

    let password_hash = hash_password(&request.password)?;
    let new_user = NewUser {
        id: uuid::Uuid::now_v7(),
        username: &request.username,
        email: &request.email,
        password_hash: &password_hash,
    };

    let identity = store
        .create_user(new_user, &auth.default_role)
        .await
        .map_err(|e| match e {
            DbError::NotFound(_) => ServiceError::InvalidConfiguration(format!(
                "Default role {} does not exist",
                auth.default_role
            )),
            DbError::UniqueViolation(_) => {
                ServiceError::AlreadyExists("Username or email is already registered".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %identity.user_id, "User registered");
    issue_session(codec, &identity, now)
}

/// ## Summary
/// Exchanges a username and password for a session token.
///
/// ## Errors
/// - `ValidationFailed` if either field is blank
/// - `InvalidCredentials` for an unknown username or a wrong password alike
#[tracing::instrument(skip(store, codec, request, now), fields(username = %request.username))]
pub async fn login<S: UserStore + ?Sized>(
    store: &S,
    codec: &TokenCodec,
    request: LoginRequest,
    now: DateTime<Utc>,
) -> ServiceResult<String> {
    let mut errors = FieldErrors::new();
    validate_required(&mut errors, "username", &request.username);
    validate_required(&mut errors, "password", &request.password);
    errors.into_result()?;

    let identity = CredentialVerifier::new(store)
        .verify(&request.username, &request.password)
        .await
        .map_err(|e| match e {
            ServiceError::NotFound(_) | ServiceError::InvalidCredentials => {
                tracing::debug!("Login rejected");
                ServiceError::InvalidCredentials
            }
            other => other,
        })?;

    tracing::info!(user_id = %identity.user_id, "User logged in");
    issue_session(codec, &identity, now)
}

/// ## Summary
/// Changes the caller's email and/or password.
///
/// ## Errors
/// - `ValidationFailed` if a supplied field is malformed
/// - `AlreadyExists` if the new email belongs to someone else
/// - `NotFound` if the account was removed meanwhile
#[tracing::instrument(skip(store, identity, update), fields(user_id = %identity.user_id))]
pub async fn update_profile<S: UserStore + ?Sized>(
    store: &S,
    identity: &Identity,
    update: ProfileUpdate,
) -> ServiceResult<Identity> {
    let mut errors = FieldErrors::new();
    if let Some(email) = &update.email {
        validate_email(&mut errors, email);
    }
    if let Some(password) = &update.password {
        validate_password(&mut errors, password);
    }
    errors.into_result()?;

    if let Some(email) = &update.email {
        ensure_email_available(store, email, Some(identity.user_id)).await?;
    }

    let changes = UserChanges {
        email: update.email,
        password_hash: update
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?,
    };

    let updated = store
        .update_user(identity.user_id, changes)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {}", identity.user_id)))?;

    tracing::info!("Profile updated");
    Ok(updated)
}

/// ## Summary
/// Removes an account. Tokens issued to it stop resolving.
///
/// ## Errors
/// Returns `NotFound` if the account does not exist.
#[tracing::instrument(skip(store))]
pub async fn delete_account<S: UserStore + ?Sized>(
    store: &S,
    user_id: uuid::Uuid,
) -> ServiceResult<()> {
    if !store.delete_user(user_id).await? {
        return Err(ServiceError::NotFound(format!("User {user_id}")));
    }
    tracing::info!("Account deleted");
    Ok(())
}

/// ## Summary
/// Creates the configured default and admin roles if they are missing.
///
/// ## Errors
/// Returns database errors.
#[tracing::instrument(skip_all)]
pub async fn ensure_roles<S: UserStore + ?Sized>(store: &S, auth: &AuthConfig) -> ServiceResult<()> {
    for name in [&auth.default_role, &auth.admin_role] {
        let role = store.ensure_role(name).await?;
        tracing::debug!(role = %role.name, "Role present");
    }
    Ok(())
}

/// ## Summary
/// Makes sure the configured bootstrap administrator exists and holds the
/// admin role. Does nothing when none is configured.
///
/// An existing user with the configured username keeps its password and
/// email and only gains the admin role.
///
/// ## Side Effects
/// - May insert a user row and role links
///
/// ## Errors
/// - `ValidationFailed` if the configured account is malformed
/// - `AlreadyExists` if the configured email belongs to another user
#[tracing::instrument(skip_all)]
pub async fn ensure_bootstrap_admin<S: UserStore + ?Sized>(
    store: &S,
    auth: &AuthConfig,
) -> ServiceResult<Option<Identity>> {
    let Some(admin) = auth.bootstrap_admin.as_ref() else {
        return Ok(None);
    };

    let resolver = IdentityResolver::new(store);
    let user_id = match resolver.resolve_by_username(&admin.username).await {
        Ok(existing) => {
            tracing::debug!(user_id = %existing.user_id, "Bootstrap admin already exists");
            existing.user_id
        }
        Err(ServiceError::NotFound(_)) => {
            let mut errors = FieldErrors::new();
            validate_username(&mut errors, &admin.username, auth.unicode_usernames);
            validate_email(&mut errors, &admin.email);
            validate_password(&mut errors, &admin.password);
            errors.into_result()?;
            ensure_email_available(store, &admin.email, None).await?;

            let password_hash = hash_password(&admin.password)?;
            let created = store
                .create_user(
                    NewUser {
                        id: uuid::Uuid::now_v7(),
                        username: &admin.username,
                        email: &admin.email,
                        password_hash: &password_hash,
                    },
                    &auth.default_role,
                )
                .await?;
            tracing::info!(user_id = %created.user_id, "Bootstrap admin created");
            created.user_id
        }
        Err(e) => return Err(e),
    };

    store.assign_role(user_id, &auth.admin_role).await?;
    resolver.resolve(user_id).await.map(Some)
}
