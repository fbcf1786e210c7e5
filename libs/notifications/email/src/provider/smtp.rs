//! SMTP mail transport using lettre

use super::MailTransport;
use crate::error::{SmtpStage, TransportError};
use crate::models::EmailMessage;
use async_trait::async_trait;
use core_config::{env_optional, env_parse_or, env_required, ConfigError, FromEnv};
use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        self,
        authentication::{Credentials, DEFAULT_MECHANISMS},
        client::{AsyncSmtpConnection, TlsParameters},
        commands::{Data, Mail, Rcpt},
        extension::{ClientId, Extension, MailBodyParameter, MailParameter},
    },
    Address, Message,
};
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Lowercase fragments that identify a TLS failure inside an error chain
const TLS_MARKERS: [&str; 4] = ["tls", "certificate", "handshake", "ssl"];

/// Connect and per-command timeout of a session
const SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// How the session with the SMTP endpoint is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    /// Implicit TLS from the first byte (SMTPS)
    #[default]
    Tls,
    /// Plain connection upgraded with STARTTLS, upgrade required
    StartTls,
    /// No encryption; only for local catch-all servers such as Mailpit
    None,
}

impl EncryptionMode {
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Tls => 465,
            Self::StartTls => 587,
            Self::None => 25,
        }
    }
}

impl FromStr for EncryptionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "smtps" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!(
                "unknown encryption mode '{other}', expected one of: tls, starttls, none"
            )),
        }
    }
}

#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

/// SMTP transport configuration
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub encryption: EncryptionMode,
    pub credentials: Option<SmtpCredentials>,
    pub from_address: String,
    pub from_name: Option<String>,
}

impl SmtpConfig {
    /// Sender mailbox, e.g. `Kitchen <orders@example.com>`
    pub fn sender(&self) -> Result<Mailbox, AddressError> {
        let address: Address = self.from_address.parse()?;
        Ok(Mailbox::new(self.from_name.clone(), address))
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("encryption", &self.encryption)
            .field(
                "username",
                &self.credentials.as_ref().map(|c| c.username.as_str()),
            )
            .field("password", &self.credentials.as_ref().map(|_| "<redacted>"))
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .finish()
    }
}

impl FromEnv for SmtpConfig {
    /// Reads:
    /// - `SMTP_HOST` (required)
    /// - `SMTP_ENCRYPTION`: `tls` (default), `starttls` or `none`
    /// - `SMTP_PORT`: defaults to the encryption mode's standard port
    /// - `SMTP_USERNAME` / `SMTP_PASSWORD`: both or neither
    /// - `EMAIL_FROM_ADDRESS`: defaults to `SMTP_USERNAME`
    /// - `EMAIL_FROM_NAME` (optional)
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_required("SMTP_HOST")?;
        let encryption: EncryptionMode = env_parse_or("SMTP_ENCRYPTION", EncryptionMode::default())?;
        let port = env_parse_or("SMTP_PORT", encryption.default_port())?;

        let credentials = match (env_optional("SMTP_USERNAME"), env_optional("SMTP_PASSWORD")) {
            (Some(username), Some(password)) => Some(SmtpCredentials { username, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid(
                    "SMTP_PASSWORD is required when SMTP_USERNAME is set".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "SMTP_USERNAME is required when SMTP_PASSWORD is set".to_string(),
                ));
            }
        };

        let from_address = env_optional("EMAIL_FROM_ADDRESS")
            .or_else(|| credentials.as_ref().map(|c| c.username.clone()))
            .ok_or_else(|| ConfigError::MissingEnvVar("EMAIL_FROM_ADDRESS".to_string()))?;

        let config = Self {
            host,
            port,
            encryption,
            credentials,
            from_address,
            from_name: env_optional("EMAIL_FROM_NAME"),
        };

        config.sender().map_err(|e| ConfigError::ParseError {
            key: "EMAIL_FROM_ADDRESS".to_string(),
            details: e.to_string(),
        })?;

        Ok(config)
    }
}

/// SMTP transport.
///
/// Every call opens its own session (connect, TLS, AUTH, MAIL/RCPT/DATA, QUIT)
/// and closes it before returning, whatever the outcome. Commands are issued
/// one at a time so a negative reply is reported with the [`SmtpStage`] it
/// answered.
#[derive(Clone)]
pub struct SmtpTransport {
    config: Arc<SmtpConfig>,
}

impl SmtpTransport {
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn tls_parameters(&self) -> Result<TlsParameters, TransportError> {
        TlsParameters::new(self.config.host.clone()).map_err(|e| TransportError::Tls(e.to_string()))
    }

    /// Connect, secure and authenticate a session.
    ///
    /// On error the connection has already been closed.
    async fn open_session(&self) -> Result<AsyncSmtpConnection, TransportError> {
        let hello = ClientId::default();
        let implicit_tls = match self.config.encryption {
            EncryptionMode::Tls => Some(self.tls_parameters()?),
            EncryptionMode::StartTls | EncryptionMode::None => None,
        };

        let mut conn = AsyncSmtpConnection::connect_tokio1(
            (self.config.host.as_str(), self.config.port),
            Some(SESSION_TIMEOUT),
            &hello,
            implicit_tls,
            None,
        )
        .await
        .map_err(|e| self.classify(e, SmtpStage::Connect))?;

        if let Err(err) = self.secure_and_authenticate(&mut conn, &hello).await {
            conn.abort().await;
            return Err(err);
        }

        Ok(conn)
    }

    async fn secure_and_authenticate(
        &self,
        conn: &mut AsyncSmtpConnection,
        hello: &ClientId,
    ) -> Result<(), TransportError> {
        if self.config.encryption == EncryptionMode::StartTls {
            conn.starttls(self.tls_parameters()?, hello)
                .await
                .map_err(|e| self.classify(e, SmtpStage::StartTls))?;
        }

        if let Some(c) = &self.config.credentials {
            let credentials = Credentials::new(c.username.clone(), c.password.clone());
            conn.auth(DEFAULT_MECHANISMS, &credentials)
                .await
                .map_err(|e| self.classify(e, SmtpStage::Auth))?;
        }

        Ok(())
    }

    async fn transmit(
        &self,
        conn: &mut AsyncSmtpConnection,
        message: &Message,
    ) -> Result<(), TransportError> {
        let envelope = message.envelope();
        let raw = message.formatted();

        let mut mail_options = Vec::new();
        if !raw.is_ascii() {
            if !conn.server_info().supports_feature(Extension::EightBitMime) {
                return Err(TransportError::Other(
                    "message contains non-ASCII bytes but the server does not support 8BITMIME"
                        .to_string(),
                ));
            }
            mail_options.push(MailParameter::Body(MailBodyParameter::EightBitMime));
        }

        conn.command(Mail::new(envelope.from().cloned(), mail_options))
            .await
            .map_err(|e| self.classify(e, SmtpStage::Sender))?;

        for recipient in envelope.to() {
            conn.command(Rcpt::new(recipient.clone(), Vec::new()))
                .await
                .map_err(|e| self.classify(e, SmtpStage::Recipient))?;
        }

        conn.command(Data)
            .await
            .map_err(|e| self.classify(e, SmtpStage::Data))?;
        let response = conn
            .message(&raw)
            .await
            .map_err(|e| self.classify(e, SmtpStage::Data))?;

        tracing::debug!(
            host = %self.config.host,
            code = %response.code(),
            "SMTP server accepted message"
        );

        Ok(())
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message, TransportError> {
        let from = self
            .config
            .sender()
            .map_err(|e| TransportError::Other(format!("invalid sender address: {e}")))?;

        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e: AddressError| TransportError::InvalidAddress {
                address: email.to.clone(),
                reason: e.to_string(),
            })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| TransportError::Other(format!("failed to build message: {e}")))
    }

    /// Whether `stage` is where a TLS handshake happens for the configured mode
    fn is_handshake(&self, stage: SmtpStage) -> bool {
        matches!(
            (self.config.encryption, stage),
            (EncryptionMode::Tls, SmtpStage::Connect) | (EncryptionMode::StartTls, SmtpStage::StartTls)
        )
    }

    fn classify(&self, err: smtp::Error, stage: SmtpStage) -> TransportError {
        let message = err.to_string();

        if err.is_timeout() {
            return TransportError::Timeout(message);
        }
        if let Some(code) = err.status() {
            return TransportError::Rejected {
                stage,
                code: code.into(),
                message,
            };
        }
        if err.is_tls() || (self.is_handshake(stage) && chain_mentions_tls(&err)) {
            return TransportError::Tls(message);
        }
        if stage == SmtpStage::StartTls {
            // e.g. the server does not advertise STARTTLS
            return TransportError::Tls(message);
        }
        if stage == SmtpStage::Auth && err.is_client() {
            return TransportError::Authentication(message);
        }
        if chain_has_io_error(&err) {
            return TransportError::Connection(message);
        }

        TransportError::Other(message)
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, email: &EmailMessage) -> Result<(), TransportError> {
        let message = self.build_message(email)?;
        let mut conn = self.open_session().await?;

        match self.transmit(&mut conn, &message).await {
            Ok(()) => {
                if let Err(e) = conn.quit().await {
                    tracing::debug!(error = %e, "QUIT after delivery failed");
                }
                Ok(())
            }
            Err(err) => {
                conn.abort().await;
                Err(err)
            }
        }
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        let mut conn = self.open_session().await?;
        conn.quit()
            .await
            .map(|_| ())
            .map_err(|e| self.classify(e, SmtpStage::Connect))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

fn error_chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |e: &&'a (dyn StdError + 'static)| (*e).source())
}

/// rustls reports handshake failures as `InvalidData` I/O errors wrapped in a
/// connection error, so the chain is inspected rather than the error kind.
fn chain_mentions_tls(err: &smtp::Error) -> bool {
    error_chain(err).any(|cause| {
        let invalid_data = cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::InvalidData);
        let text = cause.to_string().to_ascii_lowercase();
        invalid_data || TLS_MARKERS.iter().any(|marker| text.contains(marker))
    })
}

fn chain_has_io_error(err: &smtp::Error) -> bool {
    error_chain(err).any(|cause| cause.is::<io::Error>())
}
