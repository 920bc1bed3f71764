//! Mail transports used by the notification service.
//!
//! Every transport is a `tower::Service<MailMessage>`:
//! - [`smtp::SmtpMailer`]: delivery to an SMTP relay
//! - [`loopback::MailLoopback`]: in-memory outbox for tests and demos
//! - [`nop::MailNop`]: drops or refuses every message

pub mod loopback;
pub mod nop;
pub mod smtp;
