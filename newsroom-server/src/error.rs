//! Error types for newsroom-server
//!
//! Every handler returns [`ApiResult`]; failures become a JSON body of the
//! form `{"success": false, "error": ..., "code": ...}` with optional
//! `details` and `redirect` fields.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No valid session (401)
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        redirect: Option<&'static str>,
    },

    /// Session lacks the required role (403)
    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        redirect: Option<&'static str>,
    },

    /// Conflict (409), e.g. email already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Field validation failed (400) with per-field messages
    #[error("Validation failed: {message}")]
    Validation { message: String, details: Vec<String> },

    /// Optional integration not configured (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// newsroom-common error
    #[error("Common error: {0}")]
    Common(#[from] newsroom_common::Error),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            redirect: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            message: message.into(),
            redirect: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Common(err) => match err {
                newsroom_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
                newsroom_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                newsroom_common::Error::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Io(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut details: Option<Vec<String>> = None;
        let mut redirect: Option<&'static str> = None;

        let (error_code, message) = match self {
            ApiError::NotFound(msg) => ("NOT_FOUND", msg),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiError::Unauthorized { message, redirect: r } => {
                redirect = r;
                ("UNAUTHORIZED", message)
            }
            ApiError::Forbidden { message, redirect: r } => {
                redirect = r;
                ("FORBIDDEN", message)
            }
            ApiError::Conflict(msg) => ("CONFLICT", msg),
            ApiError::Validation { message, details: d } => {
                details = Some(d);
                ("VALIDATION_ERROR", message)
            }
            ApiError::ServiceUnavailable(msg) => ("SERVICE_UNAVAILABLE", msg),
            ApiError::Internal(msg) => ("INTERNAL_ERROR", msg),
            ApiError::Database(ref err) => ("DATABASE_ERROR", err.to_string()),
            ApiError::Io(ref err) => ("IO_ERROR", err.to_string()),
            ApiError::Other(ref err) => ("INTERNAL_ERROR", err.to_string()),
            ApiError::Common(err) => match err {
                newsroom_common::Error::NotFound(msg)
                | newsroom_common::Error::InvalidInput(msg)
                | newsroom_common::Error::Conflict(msg) => ("COMMON_ERROR", msg),
                other => ("COMMON_ERROR", other.to_string()),
            },
        };

        if status.is_server_error() {
            error!(code = error_code, "{}", message);
        }

        let mut body = json!({
            "success": false,
            "error": message,
            "code": error_code,
        });
        if let Value::Object(map) = &mut body {
            if let Some(details) = details {
                map.insert("details".to_string(), json!(details));
            }
            if let Some(redirect) = redirect {
                map.insert("redirect".to_string(), json!(redirect));
            }
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON request body whose rejection is an [`ApiError`]
///
/// Malformed bodies get the same `{"success": false, ...}` envelope as
/// every other failure instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_errors_keep_their_status() {
        let conflict = ApiError::from(newsroom_common::Error::Conflict("taken".into()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing = ApiError::from(newsroom_common::Error::NotFound("user".into()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let config = ApiError::from(newsroom_common::Error::Config("bad".into()));
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::Validation {
            message: "Validation failed".into(),
            details: vec!["Source is required".into()],
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
