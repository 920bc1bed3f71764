use std::{pin::Pin, task::Poll};

use tower::Service;

use crate::registry::{
    api::{MailMessage, MailReceipt},
    error::TransportError,
};

/// Transport that drops every message, or refuses all of them when built with
/// [`MailNop::failing`].
#[derive(Debug, Clone, Default)]
pub struct MailNop {
    failure: Option<String>,
}

impl MailNop {
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()) }
    }
}

impl Service<MailMessage> for MailNop {
    type Response = MailReceipt;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: MailMessage) -> Self::Future {
        let failure = self.failure.clone();
        Box::pin(async move {
            match failure {
                Some(reason) => Err(TransportError::Delivery(reason)),
                None => Ok(MailReceipt("nop".to_string())),
            }
        })
    }
}
