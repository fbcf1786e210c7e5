//! Mail transport implementations

pub mod memory;
pub mod smtp;

pub use memory::InMemoryTransport;
pub use smtp::{EncryptionMode, SmtpConfig, SmtpCredentials, SmtpTransport};

use crate::error::TransportError;
use crate::models::EmailMessage;
use async_trait::async_trait;

/// A way of handing one message to one recipient.
///
/// Each `send` is a single attempt: implementations must not retry or queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submit a message
    async fn send(&self, message: &EmailMessage) -> Result<(), TransportError>;

    /// Check that the mail endpoint is reachable and accepts a session
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Transport name used in logs
    fn name(&self) -> &'static str;
}
