//! In-memory mail transport for tests and local runs

use super::MailTransport;
use crate::error::TransportError;
use crate::models::EmailMessage;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Records every message it is handed instead of delivering it.
///
/// A transport created with [`InMemoryTransport::failing`] returns the given
/// error on every send, still counting the attempt.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    attempts: Arc<Mutex<usize>>,
    failure: Option<TransportError>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub async fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Number of `send` calls, successful or not
    pub async fn attempt_count(&self) -> usize {
        *self.attempts.lock().await
    }

    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.sent.lock().await.iter().any(|m| m.to == address)
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        *self.attempts.lock().await = 0;
    }
}

#[async_trait]
impl MailTransport for InMemoryTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), TransportError> {
        *self.attempts.lock().await += 1;

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        self.sent.lock().await.push(message.clone());
        tracing::debug!(to = %message.to, subject = %message.subject, "Stored message in memory");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let transport = InMemoryTransport::new();
        transport
            .send(&EmailMessage::new("jane@example.com", "Hello", "Body"))
            .await
            .unwrap();

        assert_eq!(transport.sent_count().await, 1);
        assert_eq!(transport.attempt_count().await, 1);
        assert!(transport.was_sent_to("jane@example.com").await);
        assert!(!transport.was_sent_to("john@example.com").await);

        transport.clear().await;
        assert_eq!(transport.sent_count().await, 0);
        assert_eq!(transport.attempt_count().await, 0);
    }

    #[tokio::test]
    async fn test_failing_transport_counts_attempts() {
        let transport = InMemoryTransport::failing(TransportError::Connection("refused".into()));
        let err = transport
            .send(&EmailMessage::new("jane@example.com", "Hello", "Body"))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Connection("refused".into()));
        assert_eq!(transport.sent_count().await, 0);
        assert_eq!(transport.attempt_count().await, 1);
        assert!(transport.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let transport = InMemoryTransport::new();
        let clone = transport.clone();
        clone
            .send(&EmailMessage::new("jane@example.com", "Hello", "Body"))
            .await
            .unwrap();
        assert_eq!(transport.sent_count().await, 1);
    }
}
