//! Plain-text email delivery over SMTP
//!
//! ## Components
//!
//! - **Transports**: [`SmtpTransport`] (lettre) and [`InMemoryTransport`] behind the
//!   [`MailTransport`] trait
//! - **Notifier**: one delivery attempt per call, failures classified into [`NotifyError`]
//!
//! ```ignore
//! use core_config::FromEnv;
//! use email::{EmailMessage, Notifier, SmtpConfig, SmtpTransport};
//!
//! let notifier = Notifier::new(SmtpTransport::new(SmtpConfig::from_env()?));
//! notifier
//!     .notify(&EmailMessage::new("jane@example.com", "Order Confirmation", "Hi Jane"))
//!     .await?;
//! ```

pub mod error;
pub mod models;
pub mod notifier;
pub mod provider;

pub use error::{NotifyError, NotifyResult, SmtpStage, TransportError};
pub use models::EmailMessage;
pub use notifier::Notifier;
pub use provider::{
    EncryptionMode, InMemoryTransport, MailTransport, SmtpConfig, SmtpCredentials, SmtpTransport,
};
