//! Services composing the registry.
//!
//! - **Reference**: Rank and department tables read by the hooks
//! - **Notification**: Confirmation messages over a mail transport
//! - **Store**: In-memory spacefarer table written by the pipeline

pub mod notification;
pub mod reference;
pub mod store;
