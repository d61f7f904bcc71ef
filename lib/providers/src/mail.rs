//! Outbound mail.
//!
//! Transport failures are classified into authentication, connection and
//! other problems. [`deliver`] renders every outcome as a message for the
//! user and never returns an error.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP reply codes that mean the credentials were refused
const AUTH_FAILURE_CODES: &[&str] = &["530", "534", "535"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

/// Sends one plain-text message
pub trait MailTransport: Send + Sync {
    fn send(&self, receiver: &str, subject: &str, body: &str) -> Result<(), TransportError>;
}

impl<T: MailTransport + ?Sized> MailTransport for &T {
    fn send(&self, receiver: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        (**self).send(receiver, subject, body)
    }
}

/// Send and describe the outcome for the user
pub fn deliver<T: MailTransport + ?Sized>(
    transport: &T,
    receiver: &str,
    subject: &str,
    body: &str,
) -> String {
    match transport.send(receiver, subject, body) {
        Ok(()) => {
            tracing::info!(receiver, "email sent");
            format!("Email sent successfully to {receiver}!")
        }
        Err(TransportError::Authentication(detail)) => {
            tracing::warn!(%detail, "smtp authentication failed");
            "Error: Could not authenticate. Please check your email credentials. \
             If using Gmail with 2FA, you might need to generate an 'App Password'."
                .to_string()
        }
        Err(TransportError::Connection(detail)) => {
            tracing::warn!(%detail, "smtp connection failed");
            format!(
                "Error: Could not connect to the SMTP server. \
                 Check internet or server details: {detail}"
            )
        }
        Err(TransportError::Other(detail)) => {
            tracing::warn!(%detail, "email delivery failed");
            format!("An unexpected error occurred: {detail}")
        }
    }
}

/// Settings for [`SmtpMailer`]
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            password: String::new(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            timeout: Duration::from_secs(30),
        }
    }
}

/// STARTTLS SMTP relay with login credentials
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, receiver: &str, subject: &str, body: &str) -> Result<Message, TransportError> {
        let from: Mailbox = self
            .config
            .sender
            .parse()
            .map_err(|e| TransportError::Other(format!("invalid sender address: {e}")))?;
        let to: Mailbox = receiver
            .parse()
            .map_err(|e| TransportError::Other(format!("invalid recipient address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| TransportError::Other(e.to_string()))
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, receiver: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        let message = self.build_message(receiver, subject, body)?;

        let mailer = SmtpTransport::starttls_relay(&self.config.smtp_host)
            .map_err(|e| TransportError::Connection(e.to_string()))?
            .port(self.config.smtp_port)
            .timeout(Some(self.config.timeout))
            .credentials(Credentials::new(
                self.config.sender.clone(),
                self.config.password.clone(),
            ))
            .build();

        mailer.send(&message).map(|_| ()).map_err(|e| classify(&e))
    }
}

fn classify(err: &lettre::transport::smtp::Error) -> TransportError {
    let detail = err.to_string();
    if let Some(code) = err.status() {
        if AUTH_FAILURE_CODES.contains(&code.to_string().as_str()) {
            return TransportError::Authentication(detail);
        }
    }
    // no server reply at all: the socket, TLS or timeout failed
    if err.status().is_none() && !err.is_client() && !err.is_response() {
        return TransportError::Connection(detail);
    }
    TransportError::Other(detail)
}
