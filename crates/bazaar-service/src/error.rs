use bazaar_core::validation::FieldErrors;
use bazaar_db::error::DbError;
use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token has expired")]
    Expired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error(transparent)]
    DatabaseError(DbError),

    #[error(transparent)]
    CoreError(#[from] bazaar_core::error::CoreError),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

/// Constraint violations become domain outcomes; everything else stays an
/// infrastructure failure.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(constraint) => Self::AlreadyExists(constraint),
            DbError::ForeignKeyViolation(constraint) => Self::Conflict(constraint),
            DbError::NotFound(what) => Self::NotFound(what),
            DbError::CoreError(core) => Self::CoreError(core),
            other => Self::DatabaseError(other),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
