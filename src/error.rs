// HTTP API error types
use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Closed error taxonomy for the HTTP surface. Upstream failures are
/// classified into these kinds structurally (by the store client), never by
/// matching substrings of error messages at the handler boundary.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized - no credential was presented
    Unauthorized(String),

    // 401 Unauthorized - a credential was presented but rejected; the
    // response also clears the session cookie
    InvalidSession(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error; `details` carries the raw upstream message
    // for diagnostics, `message` stays non-leaking
    Internal { message: String, details: Option<String> },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn invalid_session(message: impl Into<String>) -> Self {
        ApiError::InvalidSession(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        ApiError::Internal { message: message.into(), details }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::InvalidSession(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::InvalidSession(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::TooManyRequests(msg) => msg,
            ApiError::Internal { message, .. } => message,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            ApiError::Internal { message, details } => {
                let mut body = json!({ "error": message });
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                body
            }
            _ => json!({ "error": self.message() }),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::Upstream { status, message } => {
                tracing::error!(status, %message, "document store request failed");
                ApiError::internal("An error occurred while processing your request", Some(message))
            }
            StoreError::Network(err) => {
                tracing::error!(error = %err, "document store unreachable");
                ApiError::internal("An error occurred while processing your request", Some(err.to_string()))
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let clear_cookie = matches!(self, ApiError::InvalidSession(_));
        let mut response = (self.status_code(), Json(self.to_json())).into_response();

        // An invalid (not merely absent) session must also delete the cookie
        if clear_cookie {
            if let Ok(value) = crate::session::clear_session_cookie().parse() {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }

        response
    }
}
