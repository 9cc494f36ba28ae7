//! DashMap-backed store keeping everything in process memory.
//!
//! Primarily a deterministic stand-in for the MongoDB backend in tests, but
//! also usable for single-process embedding. Per-entry locking gives the
//! same single-document atomicity the document database provides, so
//! `set_member_status` here is safe against the lost-update race.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use time::OffsetDateTime;

use crate::dao::{
    match_store::{FailureLedger, MatchChanges, MatchOrder, MatchStore, StatusUpdate},
    models::{Availability, MatchEntity, PushFailureEntity},
    storage::StorageResult,
};

/// In-memory implementation of [`MatchStore`] and [`FailureLedger`].
#[derive(Clone, Default)]
pub struct MemoryMatchStore {
    matches: Arc<DashMap<String, MatchEntity>>,
    push_failures: Arc<DashMap<String, PushFailureEntity>>,
}

impl MemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded failure-ledger entries, in no particular
    /// order.
    pub fn failure_entries(&self) -> Vec<PushFailureEntity> {
        self.push_failures
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of stored matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    fn apply_changes(entity: &mut MatchEntity, changes: MatchChanges) {
        let MatchChanges {
            venue,
            address,
            date,
            time,
            opponent,
            status,
            match_date,
            squad,
            updated_time,
        } = changes;

        if let Some(venue) = venue {
            entity.venue = venue;
        }
        if let Some(address) = address {
            entity.address = Some(address);
        }
        if let Some(date) = date {
            entity.date = date;
        }
        if let Some(time) = time {
            entity.time = time;
        }
        if let Some(opponent) = opponent {
            entity.opponent = opponent;
        }
        if let Some(status) = status {
            entity.status = Some(status);
        }
        if let Some(match_date) = match_date {
            entity.match_date = match_date;
        }
        if let Some(squad) = squad {
            entity.squad = squad;
        }
        if let Some(updated_time) = updated_time {
            entity.updated_time = updated_time;
        }
    }
}

impl MatchStore for MemoryMatchStore {
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.matches.insert(entity.id.clone(), entity);
            Ok(())
        })
    }

    fn find_match(&self, id: String) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.matches.get(&id).map(|entry| entry.value().clone())) })
    }

    fn delete_match(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.matches.remove(&id).is_some()) })
    }

    fn list_matches(&self, order: MatchOrder) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut matches: Vec<MatchEntity> = store
                .matches
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            matches.sort_by_key(|entity| entity.match_date);
            if order == MatchOrder::History {
                matches.reverse();
            }
            Ok(matches)
        })
    }

    fn next_match_after(
        &self,
        instant: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let next = store
                .matches
                .iter()
                .filter(|entry| entry.value().match_date > instant)
                .min_by_key(|entry| entry.value().match_date)
                .map(|entry| entry.value().clone());
            Ok(next)
        })
    }

    fn update_match(
        &self,
        id: String,
        changes: MatchChanges,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            match store.matches.get_mut(&id) {
                Some(mut entry) => {
                    Self::apply_changes(entry.value_mut(), changes);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn set_member_status(
        &self,
        id: String,
        member_id: String,
        status: Availability,
    ) -> BoxFuture<'static, StorageResult<StatusUpdate>> {
        let store = self.clone();
        Box::pin(async move {
            // The entry guard holds the shard lock, so the single-field
            // write cannot interleave with another writer on this match.
            let Some(mut entry) = store.matches.get_mut(&id) else {
                return Ok(StatusUpdate::MatchMissing);
            };
            match entry.value_mut().squad.get_mut(&member_id) {
                Some(record) => {
                    record.status = status;
                    Ok(StatusUpdate::Applied)
                }
                None => Ok(StatusUpdate::MemberMissing),
            }
        })
    }
}

impl FailureLedger for MemoryMatchStore {
    fn record(&self, entry: PushFailureEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.push_failures.insert(entry.bucket_id.clone(), entry);
            Ok(())
        })
    }
}
