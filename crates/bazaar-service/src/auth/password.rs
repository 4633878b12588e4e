use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Hashes a password using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if password hashing fails.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to hash password: {e}")))?;

    Ok(password_hash.to_string())
}

/// ## Summary
/// Verifies a password against a stored Argon2 hash.
///
/// ## Errors
/// Returns `InvalidCredentials` on mismatch and `InvalidConfiguration` if the
/// stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Invalid password hash: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!("Password verification failed: {err}");
            ServiceError::InvalidCredentials
        })
}

/// Hash checked when a login names no stored user, so that a miss costs the
/// same Argon2 work as a wrong password.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    hash_password("unknown-user-placeholder")
        .inspect_err(|e| tracing::error!(error = %e, "Failed to prepare unknown-user hash"))
        .ok()
});

/// ## Summary
/// Runs a full Argon2 verification of `password` against a fixed hash that no
/// account uses.
///
/// ## Errors
/// Returns `InvalidCredentials` for any password other than the placeholder,
/// and `InvalidConfiguration` if the placeholder hash could not be built.
pub fn verify_unknown_user(password: &str) -> ServiceResult<()> {
    let hash = UNKNOWN_USER_HASH.as_deref().ok_or_else(|| {
        ServiceError::InvalidConfiguration("Unknown-user hash unavailable".to_string())
    })?;
    verify_password(password, hash)
}
