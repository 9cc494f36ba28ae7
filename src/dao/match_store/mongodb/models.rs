//! Document models stored in MongoDB and their entity conversions.
//!
//! The only difference from the shared entities is the timestamp
//! representation: documents carry native bson datetimes so the server can
//! index and range-scan `match_date`.

use indexmap::IndexMap;
use mongodb::bson::{self, doc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::dao::models::{AttendanceEntity, MatchEntity, PushFailureEntity};

#[derive(Debug, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub venue: String,
    pub address: Option<String>,
    pub date: String,
    pub time: String,
    pub opponent: String,
    pub status: Option<String>,
    pub match_date: bson::DateTime,
    pub created_time: bson::DateTime,
    pub updated_time: bson::DateTime,
    pub squad: IndexMap<String, AttendanceEntity>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MongoPushFailureDocument {
    #[serde(rename = "_id")]
    pub bucket_id: String,
    pub failed_tokens: Vec<String>,
    pub message_id: String,
}

pub fn time_to_bson(value: OffsetDateTime) -> bson::DateTime {
    bson::DateTime::from_millis((value.unix_timestamp_nanos() / 1_000_000) as i64)
}

pub fn bson_to_time(value: bson::DateTime) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(value.timestamp_millis()) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(entity: MatchEntity) -> Self {
        Self {
            id: entity.id,
            venue: entity.venue,
            address: entity.address,
            date: entity.date,
            time: entity.time,
            opponent: entity.opponent,
            status: entity.status,
            match_date: time_to_bson(entity.match_date),
            created_time: time_to_bson(entity.created_time),
            updated_time: time_to_bson(entity.updated_time),
            squad: entity.squad,
        }
    }
}

impl From<MongoMatchDocument> for MatchEntity {
    fn from(document: MongoMatchDocument) -> Self {
        Self {
            id: document.id,
            venue: document.venue,
            address: document.address,
            date: document.date,
            time: document.time,
            opponent: document.opponent,
            status: document.status,
            match_date: bson_to_time(document.match_date),
            created_time: bson_to_time(document.created_time),
            updated_time: bson_to_time(document.updated_time),
            squad: document.squad,
        }
    }
}

impl From<PushFailureEntity> for MongoPushFailureDocument {
    fn from(entity: PushFailureEntity) -> Self {
        Self {
            bucket_id: entity.bucket_id,
            failed_tokens: entity.failed_tokens,
            message_id: entity.message_id,
        }
    }
}

/// Build the bson form of a squad map by hand so partial `$set` updates do
/// not depend on a serializer round-trip.
pub fn squad_to_document(squad: &IndexMap<String, AttendanceEntity>) -> bson::Document {
    let mut document = bson::Document::new();
    for (member_id, record) in squad {
        let token = match &record.push_token {
            Some(token) => bson::Bson::String(token.clone()),
            None => bson::Bson::Null,
        };
        document.insert(
            member_id.clone(),
            doc! {
                "push_token": token,
                "display_name": record.display_name.clone(),
                "status": record.status.as_str(),
            },
        );
    }
    document
}
