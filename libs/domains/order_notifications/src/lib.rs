//! Order Notifications Domain
//!
//! Sends a customer email whenever an order changes status.
//!
//! ```text
//! POST /send-order-status-email/
//!        │
//! ┌──────▼──────┐
//! │  Handlers   │  ← JSON extraction + field validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← status parsing, template selection
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Notifier   │  ← one SMTP attempt, classified failure (email crate)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_order_notifications::{handlers, OrderNotificationService, TemplateBranding};
//! use email::InMemoryTransport;
//!
//! let service = OrderNotificationService::new(InMemoryTransport::new(), TemplateBranding::default());
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod templates;

pub use error::{OrderNotificationError, OrderNotificationResult};
pub use handlers::ApiDoc;
pub use models::{EmailSentResponse, OrderEmailRequest, OrderStatus};
pub use service::OrderNotificationService;
pub use templates::{
    DELIVERY_TIME_PLACEHOLDER, OrderTemplate, TemplateBranding, select_template,
};
