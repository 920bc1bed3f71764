//! # Loopback Transport Implementation
//!
//! In-process mail transport that keeps every message it is given instead of
//! delivering it. Used by tests and demos to inspect what the registry sends,
//! with an optional delay to simulate a slow relay.
use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    task::Poll,
    time::Duration,
};

use tower::Service;

use crate::registry::{
    api::{MailMessage, MailReceipt},
    error::TransportError,
};

#[derive(Debug, Clone, Default)]
pub struct MailLoopback {
    outbox: Arc<Mutex<Vec<MailMessage>>>,
    counter: Arc<AtomicU64>,
    delay_ms: u64,
}

impl MailLoopback {
    /// Creates a loopback transport that waits `delay_ms` before accepting
    /// each message.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms, ..Default::default() }
    }

    /// Messages accepted so far, in delivery order.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.outbox.lock().map(|outbox| outbox.clone()).unwrap_or_default()
    }
}

impl Service<MailMessage> for MailLoopback {
    type Response = MailReceipt;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: MailMessage) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            if this.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(this.delay_ms)).await;
            }
            let id = this.counter.fetch_add(1, Ordering::SeqCst) + 1;
            this.outbox
                .lock()
                .map_err(|_| TransportError::Delivery("loopback outbox poisoned".to_string()))?
                .push(message);
            Ok(MailReceipt(format!("loopback-{id}")))
        })
    }
}
