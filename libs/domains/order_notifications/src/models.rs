use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;
use validator::Validate;

/// Lifecycle stage of a food order; each stage has its own email.
///
/// Parsing accepts only the customer-facing labels, exactly as written.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
pub enum OrderStatus {
    #[serde(rename = "Order Confirmed")]
    #[strum(serialize = "Order Confirmed")]
    OrderConfirmed,

    #[serde(rename = "Cooking in Progress")]
    #[strum(serialize = "Cooking in Progress")]
    CookingInProgress,

    #[serde(rename = "Order is About to be Delivered")]
    #[strum(serialize = "Order is About to be Delivered")]
    AboutToBeDelivered,

    #[serde(rename = "Order Delivered")]
    #[strum(serialize = "Order Delivered")]
    Delivered,
}

/// Request body for `POST /send-order-status-email/`
///
/// `status` stays free text here so an unknown value can be answered with a
/// dedicated 400 instead of a generic deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderEmailRequest {
    #[validate(length(min = 1, message = "Customer name must not be empty"))]
    #[schema(example = "Jane")]
    pub customers_name: String,

    #[validate(email(message = "Must be a valid email address"))]
    #[schema(example = "jane@example.com")]
    pub customers_email: String,

    /// One of the [`OrderStatus`] labels
    #[schema(example = "Order Confirmed")]
    pub status: String,

    #[schema(example = "A-1001")]
    pub order_id: String,

    /// Shown in the "about to be delivered" email
    #[serde(default)]
    #[schema(example = "18:45")]
    pub delivery_time: Option<String>,
}

/// Body returned once the email has been handed to the mail server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmailSentResponse {
    #[schema(example = "Email sent successfully!")]
    pub message: String,
}

impl EmailSentResponse {
    pub fn sent() -> Self {
        Self {
            message: "Email sent successfully!".to_string(),
        }
    }
}
