use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("{message}")]
    Backend { message: String },
    #[error("upstream error: {message}")]
    Upstream { message: String },
    #[error("internal error")]
    Internal { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }

    /// Message for a JSON-RPC error reply. Unlike `Display`, it keeps the
    /// cause of internal errors, since the reply goes to the local client.
    pub fn rpc_message(&self) -> String {
        match self {
            Self::Internal { message, .. } => format!("internal error: {message}"),
            other => other.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownMethod(_) => "unknown_method",
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidParams(_) => "invalid_params",
            Self::Backend { .. } => "backend_unavailable",
            Self::Upstream { .. } => "upstream_failure",
            Self::Internal { code, .. } => *code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match self {
            Self::Internal { message, .. } => {
                tracing::error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Upstream { ref message } => {
                tracing::warn!(error = %message, "gemini request failed");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            Self::Backend { ref message } => {
                tracing::warn!(error = %message, "backend request failed");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            other => (StatusCode::BAD_REQUEST, other.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn unknown_method_message_names_the_method() {
        let error = AppError::UnknownMethod("foo".to_string());
        assert_eq!(error.to_string(), "Unknown method: foo");
        assert_eq!(error.code(), "unknown_method");
    }

    #[test]
    fn backend_error_displays_underlying_message() {
        let error = AppError::backend("connection refused");
        assert_eq!(error.to_string(), "connection refused");
    }

    #[test]
    fn internal_error_hides_details() {
        let error = AppError::internal("serializer exploded");
        assert_eq!(error.to_string(), "internal error");
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rpc_message_keeps_internal_cause() {
        let error = AppError::internal("result serialization: boom");
        assert_eq!(error.rpc_message(), "internal error: result serialization: boom");
        assert_eq!(
            AppError::UnknownTool("x".to_string()).rpc_message(),
            "Unknown tool: x"
        );
    }

    #[test]
    fn upstream_error_maps_to_bad_gateway() {
        let response = AppError::upstream("quota exceeded").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
