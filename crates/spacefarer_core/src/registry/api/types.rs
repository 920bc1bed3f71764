//! Registry API type definitions.
//!
//! Request and response types for every service of the registry:
//!
//! ## Registry API
//! Entry point used by clients to create, update and read spacefarers. Each
//! request goes through the validation hooks before it reaches the store.
//!
//! ## Internal Service APIs
//! - **Reference**: Rank and department lookups, including the highest rank a
//!   stardust amount allows
//! - **Notification**: Confirmation messages sent after a spacefarer is created
//! - **Mail transport**: Delivery of a single message to an SMTP relay
use crate::registry::infrastructure::model::{
    Department, DepartmentId, Rank, RankId, Spacefarer, SpacefarerDraft, SpacefarerId,
    SpacefarerPatch,
};

/// Registry request types.
#[derive(Debug, Clone)]
pub enum SpacefarerRequest {
    /// Create a spacefarer.
    ///
    /// The draft is validated and completed by the create hook, persisted, and
    /// a confirmation message is sent to the spacefarer.
    Create(SpacefarerDraft),

    /// Create several spacefarers one after the other.
    ///
    /// Processing stops at the first failure, spacefarers created before it
    /// are kept.
    CreateBatch(Vec<SpacefarerDraft>),

    /// Update the listed fields of an existing spacefarer.
    Update {
        /// Identifier of the stored spacefarer
        id: SpacefarerId,
        /// Fields to change
        patch: SpacefarerPatch,
    },

    /// Read a single spacefarer.
    Get(SpacefarerId),

    /// Read all spacefarers ordered by identifier.
    List,
}

/// Registry response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpacefarerResponse {
    /// Spacefarer created or updated, as stored.
    Stored(Spacefarer),

    /// Spacefarers created by a batch, in request order.
    StoredBatch(Vec<Spacefarer>),

    /// Result of a point read.
    Spacefarer(Option<Spacefarer>),

    /// Result of a listing.
    Spacefarers(Vec<Spacefarer>),
}

/// Reference data request types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceRequest {
    /// Point lookup of a rank.
    GetRank(RankId),

    /// Point lookup of a department.
    GetDepartment(DepartmentId),

    /// Rank with the greatest required stardust that does not exceed the
    /// given amount.
    HighestEligibleRank(i64),

    /// All ranks ordered by ascending required stardust.
    ListRanks,

    /// Insert or replace a rank.
    InsertRank(Rank),

    /// Insert or replace a department.
    InsertDepartment(Department),
}

/// Reference data response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceResponse {
    Rank(Option<Rank>),
    Department(Option<Department>),
    Ranks(Vec<Rank>),
    Ack,
}

/// Message handed to a mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Server acknowledgement returned by a mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt(pub String);

/// Notification request types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationRequest {
    /// Send an arbitrary message.
    Send(MailMessage),

    /// Send the application confirmation to a freshly created spacefarer.
    Confirm {
        /// Recipient address
        email: String,
        /// Name used in the greeting
        name: String,
    },
}

/// Notification response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResponse {
    Sent(MailReceipt),
}
