//! Outgoing mail transport.
//!
//! Dispatch treats delivery failure as recorded data, not an exceptional
//! condition, so the trait surfaces a plain error value per send and nothing
//! else. Tests swap in a double; production uses lettre over SMTP.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("message build error: {0}")]
    Build(String),
    #[error("smtp error: {0}")]
    Smtp(String),
}

/// One call per recipient per dispatch; the sender address is fixed at
/// construction time from process-wide configuration.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn send(&self, subject: &str, body: &str, to: &str) -> Result<(), TransportError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| TransportError::InvalidAddress(config.from.clone()))?;

        let mut builder = match config.tls.as_str() {
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| TransportError::Smtp(e.to_string()))?,
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::Smtp(e.to_string()))?,
        };
        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            // App passwords pasted from provider UIs tend to carry spaces
            let clean: String = password.chars().filter(|c| !c.is_whitespace()).collect();
            builder = builder.credentials(Credentials::new(username.clone(), clean));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, subject: &str, body: &str, to: &str) -> Result<(), TransportError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| TransportError::InvalidAddress(to.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| TransportError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;
        Ok(())
    }
}
