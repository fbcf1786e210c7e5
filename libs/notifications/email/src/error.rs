//! Error types for mail delivery.
//!
//! Transports report what went wrong on the wire as a [`TransportError`].
//! [`NotifyError`] is the closed set of outcomes callers act on; the mapping
//! between the two lives in one `From` impl so every transport, real or fake,
//! is classified the same way.

use std::fmt;
use thiserror::Error;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// SMTP reply codes meaning the credentials were refused or are required.
const AUTHENTICATION_REPLY_CODES: [u16; 4] = [454, 530, 534, 535];

/// SMTP reply codes meaning the mailbox or its syntax was refused.
const RECIPIENT_REPLY_CODES: [u16; 4] = [501, 550, 551, 553];

/// The point of the SMTP session a reply answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpStage {
    /// Greeting and EHLO
    Connect,
    StartTls,
    Auth,
    /// `MAIL FROM`
    Sender,
    /// `RCPT TO`
    Recipient,
    /// `DATA` and the message content
    Data,
}

impl SmtpStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth => "AUTH",
            Self::Sender => "MAIL FROM",
            Self::Recipient => "RCPT TO",
            Self::Data => "DATA",
        }
    }
}

impl fmt::Display for SmtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw failure reported by a [`MailTransport`](crate::MailTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The recipient could not be parsed as a mailbox
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Name resolution, TCP connect or network I/O failed
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("timed out: {0}")]
    Timeout(String),

    /// TLS handshake or STARTTLS upgrade failed
    #[error("TLS negotiation failed: {0}")]
    Tls(String),

    /// Authentication failed before the server sent a reply code
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The server answered a command with a negative reply
    #[error("server replied {code} to {stage}: {message}")]
    Rejected {
        stage: SmtpStage,
        code: u16,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Classified delivery failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipientAddress(String),

    #[error("Could not connect to the mail server: {0}")]
    TransportConnectionFailed(String),

    #[error("Mail server authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Secure connection to the mail server failed: {0}")]
    EncryptionNegotiationFailed(String),

    #[error("Failed to send email: {0}")]
    UnknownTransportFailure(String),
}

impl NotifyError {
    /// Stable identifier for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRecipientAddress(_) => "invalid_recipient_address",
            Self::TransportConnectionFailed(_) => "transport_connection_failed",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::EncryptionNegotiationFailed(_) => "encryption_negotiation_failed",
            Self::UnknownTransportFailure(_) => "unknown_transport_failure",
        }
    }
}

impl From<TransportError> for NotifyError {
    fn from(err: TransportError) -> Self {
        let message = err.to_string();
        match err {
            TransportError::InvalidAddress { .. } => Self::InvalidRecipientAddress(message),
            TransportError::Connection(_) | TransportError::Timeout(_) => {
                Self::TransportConnectionFailed(message)
            }
            TransportError::Tls(_) => Self::EncryptionNegotiationFailed(message),
            TransportError::Authentication(_) => Self::AuthenticationFailed(message),
            TransportError::Rejected {
                stage: SmtpStage::StartTls,
                ..
            } => Self::EncryptionNegotiationFailed(message),
            TransportError::Rejected {
                stage: SmtpStage::Auth,
                ..
            } => Self::AuthenticationFailed(message),
            TransportError::Rejected { code, .. } if AUTHENTICATION_REPLY_CODES.contains(&code) => {
                Self::AuthenticationFailed(message)
            }
            // Only a refused RCPT TO points at the customer's address
            TransportError::Rejected {
                stage: SmtpStage::Recipient,
                code,
                ..
            } if RECIPIENT_REPLY_CODES.contains(&code) => Self::InvalidRecipientAddress(message),
            TransportError::Rejected { .. } | TransportError::Other(_) => {
                Self::UnknownTransportFailure(message)
            }
        }
    }
}
