//! Client error types

use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport error, no response was received
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflicting resource state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The refresh endpoint rejected the session; the stored token was cleared
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] Arc<ClientError>),

    /// The refresh endpoint answered without an access token
    #[error("Invalid refresh response: {0}")]
    InvalidRefreshResponse(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Header value could not be encoded
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Token storage could not be read or written
    #[error("Token store error: {0}")]
    TokenStore(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status of the response that produced this error, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            Self::AuthenticationFailed(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Conflict(_) => Some(StatusCode::CONFLICT),
            Self::ServerError { status, .. } => StatusCode::from_u16(*status).ok(),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Whether the caller has to sign in again
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::RefreshFailed(_))
    }

    /// Whether the failure happened before any response arrived
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

/// Extract a human readable message from an error response body.
///
/// Backend errors are shaped as `{ "message": "..." }`; anything else falls
/// back to the raw body and finally to the status reason.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
            return message.to_string();
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_string)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes_to_variants() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "x".into()),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::CONFLICT, "x".into()),
            ClientError::Conflict(_)
        ));
        let err = ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_auth_expired());
    }

    #[test]
    fn refresh_failure_reports_inner_status() {
        let inner = ClientError::from_status(StatusCode::UNAUTHORIZED, "expired".into());
        let err = ClientError::RefreshFailed(Arc::new(inner));
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_auth_expired());
    }

    #[test]
    fn error_message_prefers_json_message() {
        let body = br#"{"message":"Asset tag already exists"}"#;
        assert_eq!(
            error_message(StatusCode::CONFLICT, body),
            "Asset tag already exists"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, b" upstream down "), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, b""), "Not Found");
    }
}
