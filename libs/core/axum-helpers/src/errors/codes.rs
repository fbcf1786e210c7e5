//! Type-safe error codes for API responses.
//!
//! Each code carries a string identifier for clients, an integer for logs and
//! dashboards, a default message and the HTTP status it is answered with.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InvalidOrderStatus;
//! assert_eq!(code.as_str(), "INVALID_ORDER_STATUS");
//! assert_eq!(code.code(), 1101);
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request errors (1000-1099)
    /// Request body failed field validation
    ValidationError,
    /// Request body could not be extracted as JSON
    JsonExtraction,
    /// No route matched the request
    NotFound,

    // Notification request errors (1100-1199)
    /// Order status is not one of the known labels
    InvalidOrderStatus,
    /// The recipient address was refused
    InvalidEmailAddress,

    // Mail transport errors (2000-2099)
    /// The SMTP endpoint could not be reached
    MailConnectionFailed,
    /// The SMTP endpoint refused the credentials
    MailAuthenticationFailed,
    /// The TLS session with the SMTP endpoint could not be set up
    MailEncryptionFailed,
    /// Any other SMTP failure
    MailDeliveryFailed,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidOrderStatus => "INVALID_ORDER_STATUS",
            Self::InvalidEmailAddress => "INVALID_EMAIL_ADDRESS",
            Self::MailConnectionFailed => "MAIL_CONNECTION_FAILED",
            Self::MailAuthenticationFailed => "MAIL_AUTHENTICATION_FAILED",
            Self::MailEncryptionFailed => "MAIL_ENCRYPTION_FAILED",
            Self::MailDeliveryFailed => "MAIL_DELIVERY_FAILED",
        }
    }

    pub const fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1002,
            Self::NotFound => 1004,
            Self::InvalidOrderStatus => 1101,
            Self::InvalidEmailAddress => 1102,
            Self::MailConnectionFailed => 2001,
            Self::MailAuthenticationFailed => 2002,
            Self::MailEncryptionFailed => 2003,
            Self::MailDeliveryFailed => 2099,
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed.",
            Self::JsonExtraction => "Invalid JSON request body.",
            Self::NotFound => "The requested resource was not found.",
            Self::InvalidOrderStatus => "Invalid order status.",
            Self::InvalidEmailAddress => "Invalid email address.",
            Self::MailConnectionFailed => "Could not connect to the mail server.",
            Self::MailAuthenticationFailed => "Mail server authentication failed.",
            Self::MailEncryptionFailed => "Could not establish a secure connection to the mail server.",
            Self::MailDeliveryFailed => "Failed to send email.",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            Self::JsonExtraction | Self::InvalidOrderStatus | Self::InvalidEmailAddress => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MailConnectionFailed
            | Self::MailAuthenticationFailed
            | Self::MailEncryptionFailed
            | Self::MailDeliveryFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
