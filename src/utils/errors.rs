use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type: an HTTP status plus the underlying error.
///
/// Handlers and services return `Result<_, AppError>`; the `IntoResponse`
/// impl renders the error as `{"error": "..."}` with the carried status.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

// Anything convertible to anyhow::Error (sqlx, jsonwebtoken, bcrypt, ...)
// becomes a 500 when propagated with `?`.
impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_status() {
        let err = AppError::unauthorized("Unauthorized".to_string());
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error.to_string(), "Unauthorized");
    }

    #[test]
    fn test_blanket_from_maps_to_internal() {
        let err: AppError = anyhow!("store unreachable").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
