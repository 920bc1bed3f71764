//! In-flight request handed to the hooks.
//!
//! A hook may mutate the payload and may reject the request. Rejecting is a
//! signal recorded on the request, not an error: the hook keeps running and
//! the pipeline decides what to do with the collected rejections once the hook
//! returns. Hard failures go through [`SpacefarerError`] instead.
//!
//! [`SpacefarerError`]: crate::registry::error::SpacefarerError
use std::fmt;

/// HTTP-equivalent status used for client caused rejections.
pub const BAD_REQUEST: u16 = 400;

/// Client error recorded by a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub message: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRequest<T> {
    pub data: T,
    rejections: Vec<Rejection>,
}

impl<T> EntityRequest<T> {
    pub fn new(data: T) -> Self {
        Self { data, rejections: Vec::new() }
    }

    /// Marks the request as failed without interrupting the current hook.
    pub fn reject(&mut self, status: u16, message: impl Into<String>) {
        self.rejections.push(Rejection { status, message: message.into() });
    }

    pub fn is_rejected(&self) -> bool {
        !self.rejections.is_empty()
    }

    /// Rejections in the order they were recorded.
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn into_parts(self) -> (T, Vec<Rejection>) {
        (self.data, self.rejections)
    }
}
