use salvo::Request;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// ## Summary
/// Parses the JSON request body.
///
/// ## Errors
/// Returns `BadRequest` if the body is missing or does not match `T`.
pub async fn json_body<T: DeserializeOwned + Send>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>().await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse request body");
        AppError::BadRequest("Invalid request body".to_string())
    })
}

/// ## Summary
/// Reads the `{id}` path segment as a UUID.
///
/// ## Errors
/// Returns `BadRequest` if the segment is missing or not a UUID.
pub fn path_id(req: &Request) -> AppResult<uuid::Uuid> {
    req.param::<String>("id")
        .and_then(|raw| uuid::Uuid::parse_str(&raw).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid id".to_string()))
}
