use thiserror::Error;

use crate::validation::FieldErrors;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
