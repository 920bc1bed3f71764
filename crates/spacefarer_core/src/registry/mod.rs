//! Spacefarer registry module.
//!
//! ## Request Flow
//!
//! ```text
//! SpacefarerRequest ──► before hook ──► store ──► after hook ──► SpacefarerResponse
//!                           │                         │
//!                           ▼                         ▼
//!                   ReferenceService         NotificationService ──► mail transport
//! ```
//!
//! ## Components
//!
//! - **Pipeline** ([`pipeline::SpacefarerApiService`]): entry point running
//!   the hooks around the store
//! - **Handler** ([`handler::SpacefarerHandler`]): validation hooks
//! - **Reference** ([`services::reference::ReferenceService`]): ranks and
//!   departments
//! - **Notification** ([`services::notification::NotificationService`]):
//!   confirmation messages
//!
//! ## Initialization Helpers
//!
//! - `init_registry()`: registry over any mail transport
//! - `init_registry_with_smtp()`: registry delivering through an SMTP relay
pub mod api;
pub mod error;
pub mod handler;
pub mod infrastructure;
pub mod pipeline;
pub mod services;

use crate::transport::smtp::{MailerConfig, SmtpMailer};

/// Standard registry stack parameterized by mail transport type.
pub type SpacefarerApiDefaultStack<T> = pipeline::SpacefarerApiService<
    services::reference::ReferenceService,
    services::notification::NotificationService<T>,
>;

/// Initialize a registry stack delivering notifications through `transport`.
///
/// # Arguments
/// * `reference` - Rank and department tables read by the hooks
/// * `transport` - Mail transport used for confirmation messages
/// * `config` - Hook configuration
pub fn init_registry<T>(
    reference: services::reference::ReferenceService,
    transport: T,
    config: handler::HandlerConfig,
) -> SpacefarerApiDefaultStack<T>
where
    T: tower::Service<api::MailMessage, Response = api::MailReceipt, Error = error::TransportError>
        + Clone
        + Send
        + Sync
        + 'static,
    T::Future: Send,
{
    let notification = services::notification::NotificationService::new(transport);
    let handler = handler::SpacefarerHandler::new(reference, notification).with_config(config);
    pipeline::SpacefarerApiService::new(handler)
}

/// Initialize a registry stack delivering notifications to an SMTP relay.
///
/// Fails if the transport cannot be configured (e.g. invalid TLS settings),
/// no connection is attempted here.
pub fn init_registry_with_smtp(
    reference: services::reference::ReferenceService,
    mailer: &MailerConfig,
    config: handler::HandlerConfig,
) -> Result<SpacefarerApiDefaultStack<SmtpMailer>, error::TransportError> {
    let notification = services::notification::NotificationService::new(SmtpMailer::new(mailer)?)
        .with_sender(mailer.sender.clone());
    let handler = handler::SpacefarerHandler::new(reference, notification).with_config(config);
    Ok(pipeline::SpacefarerApiService::new(handler))
}
