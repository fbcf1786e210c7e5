pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Standard error response body.
///
/// ```json
/// {
///   "error": "INVALID_ORDER_STATUS",
///   "detail": "Invalid order status."
/// }
/// ```
///
/// `errors` is only present for field validation failures and maps each
/// offending field to its violated rules.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable description of the failure
    pub detail: String,
    /// Per-field validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            error: code.as_str().to_string(),
            detail: detail.into(),
            errors: None,
        }
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    /// Client error with an explicit code; the detail is returned verbatim.
    #[error("{detail}")]
    Client { code: ErrorCode, detail: String },

    /// Server-side failure with an explicit code; the detail is returned verbatim.
    #[error("{detail}")]
    Server { code: ErrorCode, detail: String },

    #[error("Not Found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Client error carrying the code's default message
    pub fn client(code: ErrorCode) -> Self {
        Self::Client {
            code,
            detail: code.default_message().to_string(),
        }
    }

    pub fn server(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Server {
            code,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::info!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {}",
                    e
                );
                (
                    e.status(),
                    ErrorResponse::new(ErrorCode::JsonExtraction, e.body_text()),
                )
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {}",
                    e
                );
                let mut body = ErrorResponse::new(
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message(),
                );
                body.errors = Some(field_errors(&e));
                (ErrorCode::ValidationError.status(), body)
            }
            AppError::Client { code, detail } => {
                tracing::info!(error_code = code.code(), "Client error: {}", detail);
                (code.status(), ErrorResponse::new(code, detail))
            }
            AppError::Server { code, detail } => {
                tracing::error!(error_code = code.code(), "Server error: {}", detail);
                (code.status(), ErrorResponse::new(code, detail))
            }
            AppError::NotFound(detail) => {
                tracing::debug!(error_code = ErrorCode::NotFound.code(), "Not found: {}", detail);
                (StatusCode::NOT_FOUND, ErrorResponse::new(ErrorCode::NotFound, detail))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten validator errors into `{ field: [{code, message, params}] }`.
fn field_errors(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_error_uses_default_message() {
        let (status, body) = body_of(AppError::client(ErrorCode::InvalidOrderStatus)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.detail, "Invalid order status.");
        assert_eq!(body.error, "INVALID_ORDER_STATUS");
        assert!(body.errors.is_none());
    }

    #[tokio::test]
    async fn test_server_error_keeps_detail() {
        let err = AppError::server(ErrorCode::MailDeliveryFailed, "Failed to send email: 554 no");
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.detail, "Failed to send email: 554 no");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = body_of(AppError::NotFound("/nope".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "NOT_FOUND");
    }

    #[test]
    fn test_error_response_omits_empty_errors() {
        let json = serde_json::to_value(ErrorResponse::new(ErrorCode::MailDeliveryFailed, "boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "MAIL_DELIVERY_FAILED", "detail": "boom"})
        );
    }
}
