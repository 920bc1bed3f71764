//! External-facing API of the registry and the request types of its internal
//! services.

pub mod types;

// Re-export all types for convenience
pub use types::*;
