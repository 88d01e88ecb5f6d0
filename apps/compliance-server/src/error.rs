//! Error types for the compliance server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared_pdf::ExtractionError;
use thiserror::Error;
use tracing::error;

use crate::gemini::GeminiError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Document exceeds the {0} byte upload limit")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Upstream timeout after {0}s")]
    UpstreamTimeout(u64),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("Document exceeds the {} byte upload limit", limit),
            ),
            ServerError::Extraction(err) if err.is_input_error() => {
                (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT", err.to_string())
            }
            ServerError::Extraction(err) => {
                error!("Extraction failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    err.to_string(),
                )
            }
            ServerError::Misconfigured(msg) => {
                error!("Server misconfiguration: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_MISCONFIGURED",
                    format!("Server misconfiguration: {}", msg),
                )
            }
            ServerError::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                message.clone(),
            ),
            ServerError::UpstreamTimeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                format!("Upstream timeout after {}s", secs),
            ),
            ServerError::UpstreamUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", msg.clone())
            }
            ServerError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    msg.clone(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<GeminiError> for ServerError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Upstream { status, message } => ServerError::Upstream { status, message },
            GeminiError::Timeout(secs) => ServerError::UpstreamTimeout(secs),
            GeminiError::Transport(msg) => ServerError::UpstreamUnavailable(msg),
            GeminiError::Client(msg) => ServerError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServerError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (ServerError::PayloadTooLarge(10), StatusCode::PAYLOAD_TOO_LARGE),
            (
                ServerError::Extraction(ExtractionError::UnsupportedKind("a.doc".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::Extraction(ExtractionError::InvalidEncoding("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::Extraction(ExtractionError::Parse("corrupt".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServerError::Misconfigured("Missing GEMINI_API_KEY".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServerError::Upstream { status: 429, message: "quota".into() },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ServerError::Upstream { status: 1000, message: "odd".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (ServerError::UpstreamTimeout(30), StatusCode::GATEWAY_TIMEOUT),
            (ServerError::UpstreamUnavailable("refused".into()), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
