//! # SMTP Transport Implementation
//!
//! Delivers registry messages to an SMTP relay through [`lettre`]. The default
//! configuration targets a local development relay (`localhost:1025`) and
//! upgrades to TLS only when the relay offers it, accepting self-signed
//! certificates.
//!
//! [`lettre`]: https://docs.rs/lettre
use std::{future::Future, pin::Pin, task::Poll};

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::client::{Tls, TlsParameters},
};
use tower::Service;

use crate::registry::{
    api::{MailMessage, MailReceipt},
    error::TransportError,
    services::notification::DEFAULT_SENDER,
};

pub const DEFAULT_SMTP_HOST: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 1025;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Plaintext only.
    None,
    /// Upgrade with STARTTLS when the relay supports it.
    #[default]
    Opportunistic,
    /// Fail unless STARTTLS succeeds.
    Required,
    /// TLS from the first byte (SMTPS).
    Wrapper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    /// Sender address of outgoing notifications
    pub sender: String,
    pub tls: TlsMode,
    /// Accept relay certificates that fail verification
    pub accept_invalid_certs: bool,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            sender: DEFAULT_SENDER.to_string(),
            tls: TlsMode::default(),
            accept_invalid_certs: true,
        }
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Builds the transport. No connection is opened until the first message.
    pub fn new(config: &MailerConfig) -> Result<Self, TransportError> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port);
        let builder = match config.tls {
            TlsMode::None => builder,
            TlsMode::Opportunistic => builder.tls(Tls::Opportunistic(tls_parameters(config)?)),
            TlsMode::Required => builder.tls(Tls::Required(tls_parameters(config)?)),
            TlsMode::Wrapper => builder.tls(Tls::Wrapper(tls_parameters(config)?)),
        };
        Ok(Self { transport: builder.build() })
    }
}

fn tls_parameters(config: &MailerConfig) -> Result<TlsParameters, TransportError> {
    TlsParameters::builder(config.host.clone())
        .dangerous_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| TransportError::Tls(e.to_string()))
}

fn build_message(message: MailMessage) -> Result<Message, TransportError> {
    let from = message
        .from
        .parse::<Mailbox>()
        .map_err(|_| TransportError::InvalidAddress(message.from.clone()))?;
    let to = message
        .to
        .parse::<Mailbox>()
        .map_err(|_| TransportError::InvalidAddress(message.to.clone()))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(message.text)
        .map_err(|e| TransportError::InvalidMessage(e.to_string()))
}

impl Service<MailMessage> for SmtpMailer {
    type Response = MailReceipt;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: MailMessage) -> Self::Future {
        let transport = self.transport.clone();
        Box::pin(async move {
            let email = build_message(message)?;
            let response =
                transport.send(email).await.map_err(|e| TransportError::Delivery(e.to_string()))?;
            Ok(MailReceipt(format!(
                "{} {}",
                response.code(),
                response.message().collect::<Vec<_>>().join(" ")
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_smtp_mailer_builds_without_connecting() {
        assert!(SmtpMailer::new(&MailerConfig::default()).is_ok());
        assert!(
            SmtpMailer::new(&MailerConfig { tls: TlsMode::None, ..Default::default() }).is_ok()
        );
    }

    #[test]
    fn unit_smtp_build_message_rejects_invalid_addresses() {
        let message = MailMessage {
            from: "info@spacefarers.gal".to_string(),
            to: "not an address".to_string(),
            subject: "Subject".to_string(),
            text: "Body".to_string(),
        };
        assert_eq!(
            build_message(message).unwrap_err(),
            TransportError::InvalidAddress("not an address".to_string())
        );
    }

    #[tokio::test]
    async fn unit_smtp_mailer_unreachable_relay() {
        // Port 9 (discard) is not expected to run an SMTP relay.
        let mut mailer = SmtpMailer::new(&MailerConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            tls: TlsMode::None,
            ..Default::default()
        })
        .unwrap();
        let result = mailer
            .call(MailMessage {
                from: "info@spacefarers.gal".to_string(),
                to: "a@b.c".to_string(),
                subject: "Subject".to_string(),
                text: "Body".to_string(),
            })
            .await;
        assert!(matches!(result, Err(TransportError::Delivery(_))));
    }
}
