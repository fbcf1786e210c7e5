use email::{EmailMessage, MailTransport, Notifier, NotifyResult};
use tracing::instrument;

use crate::error::{OrderNotificationError, OrderNotificationResult};
use crate::models::{OrderEmailRequest, OrderStatus};
use crate::templates::{TemplateBranding, select_template};

/// Turns an order status update into exactly one customer email
pub struct OrderNotificationService<T: MailTransport> {
    notifier: Notifier<T>,
    branding: TemplateBranding,
}

impl<T: MailTransport> Clone for OrderNotificationService<T> {
    fn clone(&self) -> Self {
        Self {
            notifier: self.notifier.clone(),
            branding: self.branding.clone(),
        }
    }
}

impl<T: MailTransport> OrderNotificationService<T> {
    pub fn new(transport: T, branding: TemplateBranding) -> Self {
        Self {
            notifier: Notifier::new(transport),
            branding,
        }
    }

    pub fn transport(&self) -> &T {
        self.notifier.transport()
    }

    /// Build the email for the request's status without sending it.
    ///
    /// Fails with [`OrderNotificationError::UnrecognizedStatus`] for anything
    /// that is not one of the [`OrderStatus`] labels.
    pub fn compose(&self, request: &OrderEmailRequest) -> OrderNotificationResult<EmailMessage> {
        let status: OrderStatus = request
            .status
            .parse()
            .map_err(|_| OrderNotificationError::UnrecognizedStatus(request.status.clone()))?;

        let message = select_template(
            status,
            &request.customers_name,
            &request.order_id,
            request.delivery_time.as_deref(),
            &self.branding,
        )
        .into_message(request.customers_email.as_str());

        Ok(message)
    }

    /// Compose and send the status email. One delivery attempt, no retry.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, status = %request.status))]
    pub async fn send_status_email(&self, request: &OrderEmailRequest) -> OrderNotificationResult<()> {
        let message = self.compose(request)?;
        self.notifier.notify(&message).await?;
        Ok(())
    }

    /// Whether the mail server currently accepts sessions
    pub async fn check_mail_server(&self) -> NotifyResult<()> {
        self.notifier.health_check().await
    }
}
