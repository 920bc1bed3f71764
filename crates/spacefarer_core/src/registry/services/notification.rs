//! Notification service for confirmation messages.
//!
//! Wraps a mail transport and turns registry events into messages. The
//! transport is injected so that the same service runs against an SMTP relay in
//! production and against the loopback transport in tests. A process-wide
//! SMTP-backed instance is available through [`NotificationService::global`].
use std::{future::Future, pin::Pin, task::Poll};

use once_cell::sync::OnceCell;
use tower::{Service, ServiceExt};
use tracing::{error, info};

use crate::{
    registry::{
        api::{MailMessage, MailReceipt, NotificationRequest, NotificationResponse},
        error::{SpacefarerError, TransportError},
    },
    transport::smtp::{MailerConfig, SmtpMailer},
};

/// Sender address of registry notifications.
pub const DEFAULT_SENDER: &str = "info@spacefarers.gal";

pub const CONFIRMATION_SUBJECT: &str = "Your spacefarer application was succesful";

static GLOBAL_NOTIFICATION: OnceCell<NotificationService<SmtpMailer>> = OnceCell::new();

/// Builds the application confirmation sent once a spacefarer is created.
pub fn confirmation_message(sender: &str, email: &str, name: &str) -> MailMessage {
    MailMessage {
        from: sender.to_string(),
        to: email.to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        text: format!("Dear {name},\r\nCongratulations for embarking on your adventure!"),
    }
}

#[derive(Debug, Clone)]
pub struct NotificationService<T> {
    sender: String,
    transport: T,
}

impl<T> NotificationService<T> {
    pub fn new(transport: T) -> Self {
        Self { sender: DEFAULT_SENDER.to_string(), transport }
    }

    /// Overrides the sender address of confirmation messages.
    pub fn with_sender(self, sender: impl Into<String>) -> Self {
        Self { sender: sender.into(), ..self }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

impl NotificationService<SmtpMailer> {
    /// Process-wide notification service backed by the default SMTP relay.
    ///
    /// The transport is built on the first call, later calls return the same
    /// instance.
    pub fn global() -> Result<&'static Self, TransportError> {
        Self::global_with(MailerConfig::default)
    }

    /// Same as [`NotificationService::global`], `config` is only evaluated if
    /// the instance does not exist yet.
    pub fn global_with(
        config: impl FnOnce() -> MailerConfig,
    ) -> Result<&'static Self, TransportError> {
        GLOBAL_NOTIFICATION.get_or_try_init(|| {
            let config = config();
            let sender = config.sender.clone();
            Ok(NotificationService::new(SmtpMailer::new(&config)?).with_sender(sender))
        })
    }
}

impl<T> NotificationService<T>
where
    T: Service<MailMessage, Response = MailReceipt, Error = TransportError>
        + Clone
        + Send
        + 'static,
    T::Future: Send,
{
    /// Delivers a message through the transport.
    ///
    /// Transport failures are logged and reported as
    /// [`SpacefarerError::EmailSendingFailed`], with the transport error kept
    /// as its source.
    pub async fn send(&self, message: MailMessage) -> Result<MailReceipt, SpacefarerError> {
        match self.transport.clone().oneshot(message).await {
            Ok(receipt) => {
                info!("[notification] Email sent: {}", receipt.0);
                Ok(receipt)
            }
            Err(err) => {
                error!("[notification] Failed to send email: {}", err);
                Err(SpacefarerError::EmailSendingFailed(err))
            }
        }
    }
}

impl<T> Service<NotificationRequest> for NotificationService<T>
where
    T: Service<MailMessage, Response = MailReceipt, Error = TransportError>
        + Clone
        + Send
        + Sync
        + 'static,
    T::Future: Send,
{
    type Response = NotificationResponse;
    type Error = SpacefarerError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: NotificationRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            let message = match request {
                NotificationRequest::Send(message) => message,
                NotificationRequest::Confirm { email, name } => {
                    confirmation_message(&this.sender, &email, &name)
                }
            };
            this.send(message).await.map(NotificationResponse::Sent)
        })
    }
}
