//! Single-attempt delivery with error classification

use crate::error::{NotifyError, NotifyResult};
use crate::models::EmailMessage;
use crate::provider::MailTransport;
use std::sync::Arc;
use tracing::instrument;

/// Sends one message through a [`MailTransport`] and classifies the outcome.
///
/// There is no retry and no queue: each call is exactly one transport attempt.
pub struct Notifier<T: MailTransport> {
    transport: Arc<T>,
}

impl<T: MailTransport> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: MailTransport> Notifier<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[instrument(skip(self, message), fields(transport = self.transport.name(), to = %message.to))]
    pub async fn notify(&self, message: &EmailMessage) -> NotifyResult<()> {
        match self.transport.send(message).await {
            Ok(()) => {
                tracing::info!(subject = %message.subject, "Email sent");
                Ok(())
            }
            Err(err) => {
                let classified = NotifyError::from(err);
                tracing::warn!(kind = classified.kind(), error = %classified, "Email delivery failed");
                Err(classified)
            }
        }
    }

    pub async fn health_check(&self) -> NotifyResult<()> {
        self.transport.health_check().await.map_err(NotifyError::from)
    }
}
