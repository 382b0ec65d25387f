//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; each failure class maps to
//! its own status code and a JSON body of the form
//! `{"error": "...", "code": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use formatfusion_av::Error as MediaError;
use serde_json::json;

/// Errors produced by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Media(e) => match e {
                MediaError::InvalidInput(_) | MediaError::UnsupportedFormat { .. } => {
                    StatusCode::BAD_REQUEST
                }
                MediaError::FileNotFound { .. } => StatusCode::NOT_FOUND,
                MediaError::Decode { .. } | MediaError::Encode { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                MediaError::ToolFailed { .. } | MediaError::ParseError { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                MediaError::ToolNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
                MediaError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                MediaError::Io(_) | MediaError::Json(_) | MediaError::Workspace(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Media(e) => match e {
                MediaError::InvalidInput(_) => "invalid_input",
                MediaError::UnsupportedFormat { .. } => "unsupported_format",
                MediaError::FileNotFound { .. } => "not_found",
                MediaError::Decode { .. } => "decode_error",
                MediaError::Encode { .. } => "encode_error",
                MediaError::ToolFailed { .. } => "tool_failed",
                MediaError::ParseError { .. } => "tool_output_error",
                MediaError::ToolNotFound { .. } => "tool_not_found",
                MediaError::Timeout { .. } => "timeout",
                MediaError::Io(_) => "io_error",
                MediaError::Json(_) => "json_error",
                MediaError::Workspace(_) => "workspace_error",
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self,
                "Server error in API handler"
            );
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_produces_404() {
        let response = AppError::NotFound("upload abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn decode_failure_produces_422() {
        let err = AppError::from(MediaError::decode("/tmp/x.png", "bad magic"));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "decode_error");
    }

    #[test]
    fn tool_failures_map_to_gateway_codes() {
        let failed = AppError::from(MediaError::tool_failed("ffmpeg", "exit 1"));
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);

        let missing = AppError::from(MediaError::tool_not_found("ffmpeg"));
        assert_eq!(missing.status(), StatusCode::SERVICE_UNAVAILABLE);

        let slow = AppError::from(MediaError::Timeout {
            tool: "ffmpeg".into(),
            timeout: std::time::Duration::from_secs(1),
        });
        assert_eq!(slow.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn unsupported_format_is_bad_request() {
        let err = AppError::from(MediaError::unsupported_format("image", "gif"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
