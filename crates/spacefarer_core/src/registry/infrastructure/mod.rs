//! Registry infrastructure.
//!
//! Record types shared by every service, and the in-flight request wrapper
//! through which hooks mutate payloads and signal rejections.

pub mod model;
pub mod request;
