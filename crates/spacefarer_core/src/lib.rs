//! Spacefarer registry core.
//!
//! This crate gates the creation and update of spacefarer records behind a set
//! of validation hooks. Before a spacefarer is persisted, the hooks check that
//! the referenced rank and department exist, that the spacefarer has collected
//! enough stardust for the requested rank (or pick the highest rank the
//! stardust allows), and complete the basic wormhole navigation training.
//! Once a spacefarer is created, a confirmation message is sent through a
//! mail transport.
//!
//! Every component is exposed as a [`tower`] service so that stacks can be
//! composed, layered and substituted in tests.
//!
//! [`tower`]: https://docs.rs/tower

#[cfg(test)]
mod tests;

pub mod registry;
pub mod transport;

pub mod spacefarer_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing output.
    ///
    /// Logs are filtered through `RUST_LOG` and are disabled when it is unset.
    /// Safe to call several times, only the first call installs the subscriber.
    pub fn init() {
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
