//! SMTP transport tests against an in-process SMTP responder
//!
//! The responder speaks just enough plaintext SMTP to drive lettre through a
//! real session, with scripted replies per command, so the classification of
//! actual lettre errors is covered end to end.

use email::{
    EmailMessage, EncryptionMode, MailTransport, Notifier, NotifyError, SmtpConfig,
    SmtpCredentials, SmtpTransport,
};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const GREETING: &[u8] = b"220 fake.test ESMTP\r\n";

/// Plaintext SMTP server on a random local port
struct FakeSmtpServer {
    port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

struct Script {
    greeting: &'static [u8],
    overrides: Vec<(&'static str, &'static str)>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl Script {
    fn reply_to(&self, verb: &str) -> &'static str {
        if let Some((_, reply)) = self.overrides.iter().find(|(v, _)| *v == verb) {
            return reply;
        }
        match verb {
            "EHLO" => "250-fake.test\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME",
            "AUTH" => "235 2.7.0 Authentication successful",
            "MAIL" | "RCPT" | "NOOP" => "250 2.1.0 Ok",
            "DATA" => "354 End data with <CR><LF>.<CR><LF>",
            "QUIT" => "221 2.0.0 Bye",
            _ => "500 5.5.2 Error: command not recognized",
        }
    }
}

impl FakeSmtpServer {
    async fn start(overrides: &[(&'static str, &'static str)]) -> Self {
        Self::start_with_greeting(GREETING, overrides).await
    }

    async fn start_with_greeting(
        greeting: &'static [u8],
        overrides: &[(&'static str, &'static str)],
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Script {
            greeting,
            overrides: overrides.to_vec(),
            commands: Arc::clone(&commands),
        });

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&script)));
            }
        });

        Self { port, commands }
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

async fn serve(stream: TcpStream, script: Arc<Script>) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    if write.write_all(script.greeting).await.is_err() {
        return;
    }

    let mut in_data = false;
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let text = String::from_utf8_lossy(&line);
        let command = text.trim_end();

        if in_data {
            if command == "." {
                in_data = false;
                if write.write_all(b"250 2.0.0 Ok: queued\r\n").await.is_err() {
                    return;
                }
            }
            continue;
        }

        let verb = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        script.commands.lock().unwrap().push(verb.clone());

        let reply = script.reply_to(&verb);
        in_data = verb == "DATA" && reply.starts_with("354");
        if write.write_all(format!("{reply}\r\n").as_bytes()).await.is_err() {
            return;
        }
        if verb == "QUIT" {
            return;
        }
    }
}

fn config(port: u16, encryption: EncryptionMode) -> SmtpConfig {
    SmtpConfig {
        host: "127.0.0.1".to_string(),
        port,
        encryption,
        credentials: Some(SmtpCredentials {
            username: "orders@example.com".to_string(),
            password: "secret".to_string(),
        }),
        from_address: "orders@example.com".to_string(),
        from_name: Some("Kitchen".to_string()),
    }
}

fn order_email() -> EmailMessage {
    EmailMessage::new("jane@example.com", "Order Confirmation", "Hi Jane,\n\nThanks!")
}

async fn notify(config: SmtpConfig) -> Result<(), NotifyError> {
    Notifier::new(SmtpTransport::new(config)).notify(&order_email()).await
}

#[tokio::test]
async fn test_successful_session_runs_every_command_and_quits() {
    let server = FakeSmtpServer::start(&[]).await;

    notify(config(server.port, EncryptionMode::None)).await.unwrap();

    assert_eq!(
        server.commands(),
        vec!["EHLO", "AUTH", "MAIL", "RCPT", "DATA", "QUIT"]
    );
}

#[tokio::test]
async fn test_recipient_rejection_is_invalid_recipient() {
    let server = FakeSmtpServer::start(&[("RCPT", "550 5.1.1 <jane@example.com>: Recipient address rejected")]).await;

    let err = notify(config(server.port, EncryptionMode::None)).await.unwrap_err();

    assert!(matches!(err, NotifyError::InvalidRecipientAddress(_)), "{err:?}");
    assert!(err.to_string().contains("RCPT TO"));
    assert_eq!(server.commands().last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn test_sender_rejection_is_not_a_recipient_error() {
    let server =
        FakeSmtpServer::start(&[("MAIL", "553 5.7.1 Sender address rejected: not owned by user")])
            .await;

    let err = notify(config(server.port, EncryptionMode::None)).await.unwrap_err();

    assert!(matches!(err, NotifyError::UnknownTransportFailure(_)), "{err:?}");
    assert!(err.to_string().contains("MAIL FROM"));
    assert!(!server.commands().contains(&"RCPT".to_string()));
    assert_eq!(server.commands().last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn test_syntax_error_on_auth_is_authentication_failure() {
    let server = FakeSmtpServer::start(&[("AUTH", "501 5.5.4 Syntax error in parameters")]).await;

    let err = notify(config(server.port, EncryptionMode::None)).await.unwrap_err();

    assert!(matches!(err, NotifyError::AuthenticationFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_rejected_credentials_are_authentication_failure() {
    let server =
        FakeSmtpServer::start(&[("AUTH", "535 5.7.8 Authentication credentials invalid")]).await;

    let err = notify(config(server.port, EncryptionMode::None)).await.unwrap_err();

    assert!(matches!(err, NotifyError::AuthenticationFailed(_)), "{err:?}");
    assert!(!server.commands().contains(&"MAIL".to_string()));
}

#[tokio::test]
async fn test_message_refused_after_data_is_unknown_failure() {
    let server = FakeSmtpServer::start(&[("DATA", "554 5.3.0 Transaction failed")]).await;

    let err = notify(config(server.port, EncryptionMode::None)).await.unwrap_err();

    assert!(matches!(err, NotifyError::UnknownTransportFailure(_)), "{err:?}");
}

#[tokio::test]
async fn test_implicit_tls_against_plaintext_server_is_encryption_failure() {
    let server = FakeSmtpServer::start(&[]).await;

    let err = notify(config(server.port, EncryptionMode::Tls)).await.unwrap_err();

    assert!(matches!(err, NotifyError::EncryptionNegotiationFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_starttls_not_offered_is_encryption_failure() {
    let server = FakeSmtpServer::start(&[]).await;

    let err = notify(config(server.port, EncryptionMode::StartTls)).await.unwrap_err();

    assert!(matches!(err, NotifyError::EncryptionNegotiationFailed(_)), "{err:?}");
    assert!(!server.commands().contains(&"AUTH".to_string()));
}

#[tokio::test]
async fn test_garbled_greeting_without_tls_is_connection_failure() {
    let server = FakeSmtpServer::start_with_greeting(b"\xff\xfe\xfd garbage\r\n", &[]).await;

    let err = notify(config(server.port, EncryptionMode::None)).await.unwrap_err();

    assert!(matches!(err, NotifyError::TransportConnectionFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_unresolvable_host_is_connection_failure() {
    let mut config = config(25, EncryptionMode::None);
    config.host = "mail.example.invalid".to_string();

    let err = notify(config).await.unwrap_err();

    assert!(matches!(err, NotifyError::TransportConnectionFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_health_check_authenticates_and_quits() {
    let server = FakeSmtpServer::start(&[]).await;
    let transport = SmtpTransport::new(config(server.port, EncryptionMode::None));

    transport.health_check().await.unwrap();
    assert_eq!(server.commands(), vec!["EHLO", "AUTH", "QUIT"]);

    let refusing =
        FakeSmtpServer::start(&[("AUTH", "535 5.7.8 Authentication credentials invalid")]).await;
    let err = Notifier::new(SmtpTransport::new(config(refusing.port, EncryptionMode::None)))
        .health_check()
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::AuthenticationFailed(_)), "{err:?}");
}
