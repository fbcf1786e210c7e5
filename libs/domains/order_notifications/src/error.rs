use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use email::NotifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderNotificationError {
    #[error("Unrecognized order status: '{0}'")]
    UnrecognizedStatus(String),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

pub type OrderNotificationResult<T> = Result<T, OrderNotificationError>;

/// Convert OrderNotificationError to AppError for standardized error responses
impl From<OrderNotificationError> for AppError {
    fn from(err: OrderNotificationError) -> Self {
        match err {
            OrderNotificationError::UnrecognizedStatus(_) => {
                AppError::client(ErrorCode::InvalidOrderStatus)
            }
            OrderNotificationError::Notify(NotifyError::InvalidRecipientAddress(_)) => {
                AppError::client(ErrorCode::InvalidEmailAddress)
            }
            OrderNotificationError::Notify(err) => {
                let code = match err {
                    NotifyError::TransportConnectionFailed(_) => ErrorCode::MailConnectionFailed,
                    NotifyError::AuthenticationFailed(_) => ErrorCode::MailAuthenticationFailed,
                    NotifyError::EncryptionNegotiationFailed(_) => ErrorCode::MailEncryptionFailed,
                    _ => ErrorCode::MailDeliveryFailed,
                };
                AppError::server(code, err.to_string())
            }
        }
    }
}

impl IntoResponse for OrderNotificationError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
