//! Hub error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type. Per-message variants are only
//! ever logged by the connection loop; they never reach the remote peer.
//! HTTP-level variants map to a status code and a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// ```json
/// { "error": { "code": 2001, "message": "origin not allowed: https://evil.test" } }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Hub error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category      | HTTP Status               |
/// |-----------|---------------|---------------------------|
/// | 1000–1999 | Bad input     | 400 Bad Request           |
/// | 2000–2999 | Access policy | 403 Forbidden             |
/// | 3000–3999 | Server        | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Frame was not a valid envelope: bad JSON, unknown kind, or a
    /// missing/ill-typed field.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),

    /// Binary frame whose bytes are not UTF-8.
    #[error("binary frame is not valid utf-8")]
    NonUtf8Frame,

    /// WebSocket upgrade from a browser origin outside the allow-list.
    #[error("origin not allowed: {0}")]
    OriginRejected(String),

    /// Startup configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MalformedEnvelope(_) => 1001,
            Self::NonUtf8Frame => 1002,
            Self::OriginRejected(_) => 2001,
            Self::InvalidConfig(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedEnvelope(_) | Self::NonUtf8Frame => StatusCode::BAD_REQUEST,
            Self::OriginRejected(_) => StatusCode::FORBIDDEN,
            Self::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn origin_rejection_is_forbidden() {
        let err = RelayError::OriginRejected("https://evil.test".to_string());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.to_string(), "origin not allowed: https://evil.test");
    }

    #[test]
    fn json_errors_convert_to_malformed() {
        let Err(json_err) = serde_json::from_str::<serde_json::Value>("{") else {
            panic!("expected parse failure");
        };
        let err = RelayError::from(json_err);
        assert!(matches!(err, RelayError::MalformedEnvelope(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn into_response_carries_code() {
        let response = RelayError::OriginRejected("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let Ok(body) = axum::body::to_bytes(response.into_body(), 10_000).await else {
            panic!("body read failed");
        };
        let Ok(parsed) = serde_json::from_slice::<serde_json::Value>(&body) else {
            panic!("body is not json");
        };
        assert_eq!(parsed["error"]["code"], 2001);
    }
}
