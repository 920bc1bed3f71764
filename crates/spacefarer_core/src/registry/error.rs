use thiserror::Error;

use crate::registry::infrastructure::{
    model::{RankId, SpacefarerId},
    request::Rejection,
};

#[derive(Debug, Error, PartialEq)]
pub enum SpacefarerError {
    #[error("Spacefarer error, internal registry error")]
    InternalRegistryError,

    #[error("Spacefarer error, request rejected ({})", join_rejections(.0))]
    Rejected(Vec<Rejection>),

    #[error("Insufficent stardust collection for rank {0}")]
    InsufficientStardust(String),

    #[error("Spacefarer error, no rank available for {0} collected stardust")]
    NoEligibleRank(i64),

    #[error("Spacefarer error, rank not found (id: {0})")]
    RankNotFound(RankId),

    #[error("Spacefarer error, spacefarer not found (id: {0})")]
    SpacefarerNotFound(SpacefarerId),

    #[error("Spacefarer error, spacefarer already exists (id: {0})")]
    DuplicateSpacefarer(SpacefarerId),

    #[error("Spacefarer error, no identifier left to assign")]
    IdentifierSpaceExhausted,

    #[error("Spacefarer error, reference data unavailable ({0})")]
    ReferenceUnavailable(String),

    #[error("Email sending failed")]
    EmailSendingFailed(#[source] TransportError),
}

impl SpacefarerError {
    /// Rejections carried by a rejected request, empty for hard failures.
    pub fn rejections(&self) -> &[Rejection] {
        match self {
            SpacefarerError::Rejected(rejections) => rejections,
            _ => &[],
        }
    }
}

fn join_rejections(rejections: &[Rejection]) -> String {
    rejections.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("Transport error, invalid mail address ({0})")]
    InvalidAddress(String),

    #[error("Transport error, failed to build message ({0})")]
    InvalidMessage(String),

    #[error("Transport error, failed to configure TLS ({0})")]
    Tls(String),

    #[error("Transport error, delivery failed ({0})")]
    Delivery(String),
}
