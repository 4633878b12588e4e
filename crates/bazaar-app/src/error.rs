use salvo::http::{
    StatusCode,
    header::{HeaderValue, WWW_AUTHENTICATE},
};
use serde::Serialize;
use thiserror::Error;

use bazaar_core::{constants::BEARER_SCHEME, error::CoreError, validation::FieldErrors};
use bazaar_db::error::DbError;
use bazaar_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::ServiceError(ServiceError::ValidationFailed(_))
            | Self::CoreError(CoreError::ValidationFailed(_)) => {
                (StatusCode::BAD_REQUEST, "ValidationFailed")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            Self::ServiceError(ServiceError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "InvalidCredentials")
            }
            Self::ServiceError(
                ServiceError::Unauthorized
                | ServiceError::Malformed
                | ServiceError::SignatureInvalid
                | ServiceError::Expired,
            ) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::ServiceError(ServiceError::Forbidden) => (StatusCode::FORBIDDEN, "Forbidden"),
            Self::ServiceError(ServiceError::NotFound(_)) | Self::DatabaseError(DbError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NotFound")
            }
            Self::ServiceError(ServiceError::AlreadyExists(_))
            | Self::DatabaseError(DbError::UniqueViolation(_)) => {
                (StatusCode::CONFLICT, "AlreadyExists")
            }
            Self::ServiceError(ServiceError::Conflict(_)) => (StatusCode::CONFLICT, "Conflict"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    /// ## Summary
    /// Builds the response body. Server-side failures get a generic message
    /// so internals never reach the client.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        let (status, error) = self.classify();

        let message = match self {
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => INTERNAL_MESSAGE.to_string(),
            Self::ServiceError(ServiceError::InvalidCredentials) => {
                "Invalid username or password".to_string()
            }
            Self::ServiceError(ServiceError::ValidationFailed(_))
            | Self::CoreError(CoreError::ValidationFailed(_)) => "Validation failed".to_string(),
            other => other.to_string(),
        };

        let fields = match self {
            Self::ServiceError(ServiceError::ValidationFailed(errors))
            | Self::CoreError(CoreError::ValidationFailed(errors)) => Some(errors.clone()),
            _ => None,
        };

        ErrorBody {
            status: status.as_u16(),
            error,
            message,
            fields,
        }
    }
}

impl salvo::Scribe for AppError {
    fn render(self, res: &mut salvo::Response) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(BEARER_SCHEME),
            );
        }

        res.status_code(status);
        res.render(salvo::writing::Json(self.body()));
    }
}
