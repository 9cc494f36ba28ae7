use std::sync::Arc;

use time::OffsetDateTime;

use crate::{
    dao::{
        match_store::{MatchOrder, MatchStore},
        models::Availability,
    },
    dto::MatchView,
    error::ServiceError,
};

/// Read-side projections over the availability store for one requesting
/// member.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn MatchStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// The single match with the earliest `match_date` strictly after now,
    /// projected with the member's own status, or `None` when no future
    /// match is stored.
    pub async fn next_upcoming(
        &self,
        member_id: &str,
    ) -> Result<Option<MatchView>, ServiceError> {
        let next = self
            .store
            .next_match_after(OffsetDateTime::now_utc())
            .await?;
        Ok(next.map(|entity| MatchView::for_member(entity, member_id)))
    }

    /// Count of stored matches the member has not responded to. A match
    /// without a record for the member counts as not-responded.
    pub async fn unread_count(&self, member_id: &str) -> Result<u64, ServiceError> {
        let matches = self.store.list_matches(MatchOrder::Upcoming).await?;
        let count = matches
            .iter()
            .filter(|entity| {
                entity
                    .squad
                    .get(member_id)
                    .map(|record| record.status)
                    .unwrap_or_default()
                    == Availability::NotResponded
            })
            .count();
        Ok(count as u64)
    }

    /// Full match details for one member, squad map stripped and replaced
    /// by the member's own status.
    pub async fn details_for_member(
        &self,
        match_id: &str,
        member_id: &str,
    ) -> Result<MatchView, ServiceError> {
        let entity = self
            .store
            .find_match(match_id.to_owned())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` not found")))?;
        Ok(MatchView::for_member(entity, member_id))
    }
}
