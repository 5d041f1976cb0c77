use serde_json::Value;
use thiserror::Error;

/// Typed failure kinds surfaced by the document store / identity provider.
/// Classification happens once, here, from the provider's structured error
/// body; route handlers match on these kinds instead of message text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("store request failed with status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl StoreError {
    /// Classify a non-2xx provider response. The provider returns
    /// `{ "message": ..., "code": ..., "type": ... }`; the `type` tag is the
    /// stable discriminator, the status code is the fallback.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown store error")
            .to_string();
        let kind = body.get("type").and_then(Value::as_str).unwrap_or("");

        match kind {
            "user_already_exists" | "document_already_exists" => StoreError::Conflict(message),
            "user_not_found" | "document_not_found" | "collection_not_found" => {
                StoreError::NotFound(message)
            }
            "user_invalid_credentials"
            | "general_unauthorized_scope"
            | "user_session_not_found"
            | "user_unauthorized" => StoreError::Unauthorized(message),
            "general_argument_invalid" | "document_invalid_structure" => {
                StoreError::Validation(message)
            }
            _ => match status {
                400 => StoreError::Validation(message),
                401 | 403 => StoreError::Unauthorized(message),
                404 => StoreError::NotFound(message),
                409 => StoreError::Conflict(message),
                _ => StoreError::Upstream { status, message },
            },
        }
    }
}
