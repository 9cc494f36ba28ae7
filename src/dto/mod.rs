//! Boundary types consumed by the routing layer that sits above this crate.

/// Validation helpers shared by request types.
pub mod validation;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::{Validate, ValidationErrors};

use crate::dao::models::{Availability, MatchEntity};
use self::validation::{validate_date, validate_required_text, validate_time};

/// Payload used to schedule a brand-new match.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMatchRequest {
    pub venue: String,
    /// Scheduling date, `YYYY-MM-DD`.
    pub date: String,
    /// Kick-off time, 24-hour `HH:MM`.
    pub time: String,
    pub opponent: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Descriptive match status, opaque to this crate.
    #[serde(default)]
    pub status: Option<String>,
}

impl Validate for CreateMatchRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_required_text("venue", &self.venue) {
            errors.add("venue", e);
        }
        if let Err(e) = validate_required_text("opponent", &self.opponent) {
            errors.add("opponent", e);
        }
        if let Err(e) = validate_date(&self.date) {
            errors.add("date", e);
        }
        if let Err(e) = validate_time(&self.time) {
            errors.add("time", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial update of a match's descriptive fields. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchMatchRequest {
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Validate for PatchMatchRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref date) = self.date {
            if let Err(e) = validate_date(date) {
                errors.add("date", e);
            }
        }
        if let Some(ref time) = self.time {
            if let Err(e) = validate_time(time) {
                errors.add("time", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// A match projected for one requesting member: the raw squad map is
/// stripped and replaced with that member's own status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchView {
    pub id: String,
    pub venue: String,
    pub address: Option<String>,
    pub date: String,
    pub time: String,
    pub opponent: String,
    pub status: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub match_date: OffsetDateTime,
    /// The requesting member's own response, `NotResponded` when the member
    /// has no record on this match.
    pub my_status: Availability,
}

impl MatchView {
    /// Project a stored match for the given member.
    pub fn for_member(entity: MatchEntity, member_id: &str) -> Self {
        let my_status = entity
            .squad
            .get(member_id)
            .map(|record| record.status)
            .unwrap_or_default();

        Self {
            id: entity.id,
            venue: entity.venue,
            address: entity.address,
            date: entity.date,
            time: entity.time,
            opponent: entity.opponent,
            status: entity.status,
            match_date: entity.match_date,
            my_status,
        }
    }
}
