use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, macros::format_description};

/// A member's current response for one match.
///
/// Historically this was carried as independent bit flags (1, 2, 8, 4) even
/// though no two were ever set together; the closed enum keeps the same four
/// states without the accidental-combination hazard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Member confirmed they will play.
    Yes,
    /// Member declined.
    No,
    /// Member postponed the decision.
    Snoozed,
    /// Member has not answered yet. Every reader treats an absent record as
    /// this value.
    #[default]
    NotResponded,
}

impl Availability {
    /// Stable wire name, identical to the serde encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Yes => "yes",
            Availability::No => "no",
            Availability::Snoozed => "snoozed",
            Availability::NotResponded => "not_responded",
        }
    }
}

/// Per-member attendance state embedded in a match's squad map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceEntity {
    /// Registered device token, absent when the member never registered one.
    pub push_token: Option<String>,
    /// Display name copied from the directory at resolution time.
    pub display_name: String,
    /// Current response state.
    pub status: Availability,
}

/// One scheduled match instance shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Stable identifier, deterministic from date, time and opponent.
    pub id: String,
    /// Where the match is played.
    pub venue: String,
    /// Free-form address or post code.
    pub address: Option<String>,
    /// Scheduling date as supplied by the caller (`YYYY-MM-DD`).
    pub date: String,
    /// Kick-off time as supplied by the caller (`HH:MM`).
    pub time: String,
    /// Opposing team name.
    pub opponent: String,
    /// Descriptive match status, opaque to this crate.
    pub status: Option<String>,
    /// Parsed, comparable form of `date` + `time` used for ordering.
    #[serde(with = "time::serde::rfc3339")]
    pub match_date: OffsetDateTime,
    /// Set by the service when the match is first persisted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    /// Bumped by the service on every descriptive update.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_time: OffsetDateTime,
    /// Attendance record per roster member, keyed by member id. Each
    /// directory member present at resolution time has exactly one entry.
    pub squad: IndexMap<String, AttendanceEntity>,
}

/// Record of one delivery attempt's failed tokens, keyed by a minute bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushFailureEntity {
    /// Day+month+year+hour+minute of the attempt, UTC, unpadded. Two
    /// attempts landing in the same minute overwrite each other.
    pub bucket_id: String,
    /// Tokens that did not deliver, in original send order.
    pub failed_tokens: Vec<String>,
    /// Transport-assigned id of the attempt, or `"not available"`.
    pub message_id: String,
}

/// Derive the stable match id from its scheduling key. Two calls with the
/// same date, time and opponent name the same fixture.
pub fn derive_match_id(date: &str, time: &str, opponent: &str) -> String {
    let mut slug = String::with_capacity(opponent.len());
    for c in opponent.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    format!("{}-{}-{}", date, time.replace(':', ""), slug)
}

/// Parse the caller-supplied `YYYY-MM-DD` date and `HH:MM` time into the
/// comparable UTC instant stored as `match_date`.
pub fn parse_match_instant(date: &str, time: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let date_format = format_description!("[year]-[month]-[day]");
    let time_format = format_description!("[hour]:[minute]");
    let date = Date::parse(date, &date_format)?;
    let time = Time::parse(time, &time_format)?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}
