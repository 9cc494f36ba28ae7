/// In-process store used for tests and embedding.
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::dao::models::{AttendanceEntity, Availability, MatchEntity, PushFailureEntity};
use crate::dao::storage::StorageResult;

/// Ordering of a match listing along the `match_date` axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrder {
    /// Soonest first, the default schedule view.
    Upcoming,
    /// Latest first, the history view.
    History,
}

/// Outcome of an atomic per-member status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The named member's status was changed.
    Applied,
    /// No match with the given id exists.
    MatchMissing,
    /// The match exists but carries no record for the member.
    MemberMissing,
}

/// Partial update of a match document. Only the populated fields are
/// written; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct MatchChanges {
    pub venue: Option<String>,
    pub address: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub opponent: Option<String>,
    pub status: Option<String>,
    /// Recomputed comparable instant, present whenever `date` or `time` is.
    pub match_date: Option<OffsetDateTime>,
    /// Replacement squad map. Setting this discards all recorded responses.
    pub squad: Option<IndexMap<String, AttendanceEntity>>,
    /// New `updated_time` stamp, always written.
    pub updated_time: Option<OffsetDateTime>,
}

/// Abstraction over the persistence layer for match documents.
///
/// Implementations must apply `set_member_status` as a single-field write on
/// the stored document. Reading the whole squad, mutating one key in memory
/// and writing the map back loses concurrent writers' updates to other
/// members.
pub trait MatchStore: Send + Sync {
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_match(&self, id: String) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn delete_match(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;
    fn list_matches(&self, order: MatchOrder) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    fn next_match_after(
        &self,
        instant: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn update_match(
        &self,
        id: String,
        changes: MatchChanges,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn set_member_status(
        &self,
        id: String,
        member_id: String,
        status: Availability,
    ) -> BoxFuture<'static, StorageResult<StatusUpdate>>;
}

/// Append-mostly record of failed delivery attempts, keyed by minute bucket.
///
/// A later attempt landing in the same bucket overwrites the earlier entry.
/// Nothing in this crate ever deletes a recorded entry.
pub trait FailureLedger: Send + Sync {
    fn record(&self, entry: PushFailureEntity) -> BoxFuture<'static, StorageResult<()>>;
}
