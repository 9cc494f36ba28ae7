use std::sync::Arc;

use indexmap::IndexMap;
use time::OffsetDateTime;
use tracing::info;
use validator::Validate;

use crate::{
    config::AppConfig,
    dao::{
        match_store::{MatchChanges, MatchOrder, MatchStore, StatusUpdate},
        models::{AttendanceEntity, Availability, MatchEntity, derive_match_id, parse_match_instant},
    },
    dto::{CreateMatchRequest, PatchMatchRequest, validation::validate_member_id},
    error::ServiceError,
    services::{dispatch::NotificationDispatcher, roster::RosterResolver},
};

/// Body of the announcement sent when a match is first scheduled.
const AVAILABILITY_PROMPT: &str = "Set your availability.";
/// Body of the announcement sent when match details change.
const UPDATED_PROMPT: &str = "Match details updated. Set your availability.";

/// Whether a match patch rebuilds the squad from the current directory
/// snapshot.
///
/// Refreshing is an explicit, destructive choice: every response already
/// recorded on the match is discarded and reset to not-responded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterPolicy {
    /// Keep the stored squad and its responses.
    PreserveResponses,
    /// Rebuild the squad from the directory, losing recorded responses.
    RefreshRoster,
}

/// Owns the match lifecycle: creation, descriptive patches, per-member
/// status updates and deletion, plus the notification fan-out each write
/// triggers.
#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn MatchStore>,
    resolver: RosterResolver,
    dispatcher: NotificationDispatcher,
    config: AppConfig,
}

impl AvailabilityService {
    pub fn new(
        store: Arc<dyn MatchStore>,
        resolver: RosterResolver,
        dispatcher: NotificationDispatcher,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
            config,
        }
    }

    /// Schedule a new match and announce it to the full roster.
    ///
    /// Validation and roster resolution happen before anything is written:
    /// a rejected request or an unreachable directory leaves no partial
    /// state and sends no notification. The announcement itself is
    /// best-effort; the match is considered created even when every push
    /// fails.
    pub async fn create_match(
        &self,
        request: CreateMatchRequest,
    ) -> Result<MatchEntity, ServiceError> {
        request.validate()?;
        let match_date = parse_match_instant(&request.date, &request.time)
            .map_err(|err| ServiceError::InvalidInput(format!("invalid scheduling key: {err}")))?;

        let squad = self.resolver.resolve().await?;
        let now = OffsetDateTime::now_utc();
        let entity = MatchEntity {
            id: derive_match_id(&request.date, &request.time, &request.opponent),
            venue: request.venue,
            address: request.address,
            date: request.date,
            time: request.time,
            opponent: request.opponent,
            status: request.status,
            match_date,
            created_time: now,
            updated_time: now,
            squad,
        };

        self.store.save_match(entity.clone()).await?;

        let outcome = self
            .dispatcher
            .dispatch(
                &self.notification_title(&entity.opponent),
                AVAILABILITY_PROMPT,
                squad_tokens(&entity.squad),
            )
            .await;
        info!(
            match_id = %entity.id,
            sent = outcome.success_count,
            failed = outcome.failure_count,
            "announced new match"
        );

        Ok(entity)
    }

    /// Update a match's descriptive fields and notify the roster.
    ///
    /// Only supplied fields are written. With
    /// [`RosterPolicy::RefreshRoster`] the squad is rebuilt from the
    /// directory first, discarding recorded responses.
    pub async fn patch_match(
        &self,
        id: &str,
        request: PatchMatchRequest,
        policy: RosterPolicy,
    ) -> Result<(), ServiceError> {
        if id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "match id must not be empty".into(),
            ));
        }
        request.validate()?;

        let current = self
            .store
            .find_match(id.to_owned())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))?;

        let PatchMatchRequest {
            venue,
            address,
            date,
            time,
            opponent,
            status,
        } = request;

        let match_date = if date.is_some() || time.is_some() {
            let date = date.as_deref().unwrap_or(&current.date);
            let time = time.as_deref().unwrap_or(&current.time);
            let instant = parse_match_instant(date, time).map_err(|err| {
                ServiceError::InvalidInput(format!("invalid scheduling key: {err}"))
            })?;
            Some(instant)
        } else {
            None
        };

        let squad = match policy {
            RosterPolicy::RefreshRoster => Some(self.resolver.resolve().await?),
            RosterPolicy::PreserveResponses => None,
        };

        let notified_opponent = opponent.clone().unwrap_or_else(|| current.opponent.clone());
        let roster = squad.clone().unwrap_or(current.squad);

        let changes = MatchChanges {
            venue,
            address,
            date,
            time,
            opponent,
            status,
            match_date,
            squad,
            updated_time: Some(OffsetDateTime::now_utc()),
        };

        let updated = self.store.update_match(id.to_owned(), changes).await?;
        if !updated {
            return Err(ServiceError::NotFound(format!("match `{id}` not found")));
        }

        let outcome = self
            .dispatcher
            .dispatch(
                &self.notification_title(&notified_opponent),
                UPDATED_PROMPT,
                squad_tokens(&roster),
            )
            .await;
        info!(
            match_id = %id,
            sent = outcome.success_count,
            failed = outcome.failure_count,
            "announced match update"
        );

        Ok(())
    }

    /// Change one member's response on one match.
    ///
    /// The write touches exactly one field; every other record and every
    /// descriptive field is left alone, so two members answering at the
    /// same time cannot overwrite each other.
    pub async fn patch_member_status(
        &self,
        match_id: &str,
        member_id: &str,
        status: Availability,
    ) -> Result<(), ServiceError> {
        if match_id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "match id must not be empty".into(),
            ));
        }
        validate_member_id(member_id)
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

        match self
            .store
            .set_member_status(match_id.to_owned(), member_id.to_owned(), status)
            .await?
        {
            StatusUpdate::Applied => Ok(()),
            StatusUpdate::MatchMissing => {
                Err(ServiceError::NotFound(format!("match `{match_id}` not found")))
            }
            StatusUpdate::MemberMissing => Err(ServiceError::NotFound(format!(
                "member `{member_id}` has no record on match `{match_id}`"
            ))),
        }
    }

    /// Fetch the full stored match.
    pub async fn get_match(&self, id: &str) -> Result<MatchEntity, ServiceError> {
        self.store
            .find_match(id.to_owned())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))
    }

    /// Remove a match and all its attendance data. The failure ledger is
    /// match-agnostic and unaffected.
    pub async fn delete_match(&self, id: &str) -> Result<(), ServiceError> {
        if self.store.delete_match(id.to_owned()).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("match `{id}` not found")))
        }
    }

    /// List every stored match in the requested `match_date` ordering.
    pub async fn list_matches(&self, order: MatchOrder) -> Result<Vec<MatchEntity>, ServiceError> {
        Ok(self.store.list_matches(order).await?)
    }

    fn notification_title(&self, opponent: &str) -> String {
        format!("{} vs. {}", self.config.team_name(), opponent)
    }
}

/// One raw token per squad record, in squad order. Members without a
/// registered device contribute an empty token the dispatcher skips.
fn squad_tokens(squad: &IndexMap<String, AttendanceEntity>) -> Vec<String> {
    squad
        .values()
        .map(|record| record.push_token.clone().unwrap_or_default())
        .collect()
}
