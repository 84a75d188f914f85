//! Unified application error model and HTTP mapping.
//! Route handlers and components return `AppError`; the `IntoResponse` impl
//! guarantees every failure leaves the API boundary as `{error: ...}` with a
//! status from the taxonomy below, never as an unmapped panic or plain string.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Missing or malformed required field in a request payload.
    #[error("{0}")]
    Validation(String),

    /// Target id absent from the store.
    #[error("{0}")]
    NotFound(String),

    /// Missing, invalid or expired session token.
    #[error("{0}")]
    Authentication(String),

    /// Valid identity, insufficient privilege.
    #[error("{0}")]
    Authorization(String),

    /// Database, auth service or object store unreachable or unconfigured.
    #[error("{0}")]
    Unavailable(String),

    /// Catch-all for failures with no better classification.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation<S: Into<String>>(msg: S) -> Self { AppError::Validation(msg.into()) }
    pub fn not_found<S: Into<String>>(msg: S) -> Self { AppError::NotFound(msg.into()) }
    pub fn authentication<S: Into<String>>(msg: S) -> Self { AppError::Authentication(msg.into()) }
    pub fn authorization<S: Into<String>>(msg: S) -> Self { AppError::Authorization(msg.into()) }
    pub fn unavailable<S: Into<String>>(msg: S) -> Self { AppError::Unavailable(msg.into()) }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AppError::Internal(msg.into()) }

    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.http_status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures mean the backend could not be reached at all.
        AppError::Unavailable(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::validation("missing").http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("absent").http_status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::authentication("no token").http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::authorization("not admin").http_status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::unavailable("db down").http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::internal("boom").http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
