use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use time::OffsetDateTime;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoMatchDocument, MongoPushFailureDocument, squad_to_document, time_to_bson},
};
use crate::dao::{
    match_store::{FailureLedger, MatchChanges, MatchOrder, MatchStore, StatusUpdate},
    models::{Availability, MatchEntity, PushFailureEntity},
    storage::StorageResult,
};

const MATCH_COLLECTION_NAME: &str = "matches";
const PUSH_LOG_COLLECTION_NAME: &str = "push_logs";

/// Data Access Object encapsulating MongoDB interaction for match documents
/// and the push-failure ledger.
#[derive(Clone)]
pub struct MongoMatchStore {
    database: Database,
}

impl MongoMatchStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (_client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self { database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.database.collection::<Document>(MATCH_COLLECTION_NAME);
        let index = IndexModel::builder()
            .keys(doc! {"match_date": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_date_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "match_date",
                source,
            })?;

        Ok(())
    }

    fn collection(&self) -> Collection<MongoMatchDocument> {
        self.database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    fn push_log_collection(&self) -> Collection<MongoPushFailureDocument> {
        self.database
            .collection::<MongoPushFailureDocument>(PUSH_LOG_COLLECTION_NAME)
    }

    async fn save(&self, entity: MatchEntity) -> MongoResult<()> {
        let id = entity.id.clone();
        let document: MongoMatchDocument = entity.into();
        self.collection()
            .replace_one(doc! {"_id": id.as_str()}, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn find(&self, id: String) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .collection()
            .find_one(doc! {"_id": id.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn delete(&self, id: String) -> MongoResult<bool> {
        let result = self
            .collection()
            .delete_one(doc! {"_id": id.as_str()})
            .await
            .map_err(|source| MongoDaoError::DeleteMatch { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn list(&self, order: MatchOrder) -> MongoResult<Vec<MatchEntity>> {
        let direction = match order {
            MatchOrder::Upcoming => 1,
            MatchOrder::History => -1,
        };
        let documents: Vec<MongoMatchDocument> = self
            .collection()
            .find(doc! {})
            .sort(doc! {"match_date": direction})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn next_after(&self, instant: OffsetDateTime) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .collection()
            .find_one(doc! {"match_date": {"$gt": time_to_bson(instant)}})
            .sort(doc! {"match_date": 1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;
        Ok(document.map(Into::into))
    }

    async fn update(&self, id: String, changes: MatchChanges) -> MongoResult<bool> {
        let mut set = Document::new();
        if let Some(venue) = changes.venue {
            set.insert("venue", venue);
        }
        if let Some(address) = changes.address {
            set.insert("address", address);
        }
        if let Some(date) = changes.date {
            set.insert("date", date);
        }
        if let Some(time) = changes.time {
            set.insert("time", time);
        }
        if let Some(opponent) = changes.opponent {
            set.insert("opponent", opponent);
        }
        if let Some(status) = changes.status {
            set.insert("status", status);
        }
        if let Some(match_date) = changes.match_date {
            set.insert("match_date", time_to_bson(match_date));
        }
        if let Some(squad) = changes.squad {
            set.insert("squad", squad_to_document(&squad));
        }
        if let Some(updated_time) = changes.updated_time {
            set.insert("updated_time", time_to_bson(updated_time));
        }

        let result = self
            .collection()
            .update_one(doc! {"_id": id.as_str()}, doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::UpdateMatch { id, source })?;
        Ok(result.matched_count > 0)
    }

    /// Single-field status write. The filter requires the member's record to
    /// exist so the update cannot invent a squad entry for a non-member.
    async fn set_status(
        &self,
        id: String,
        member_id: String,
        status: Availability,
    ) -> MongoResult<StatusUpdate> {
        let mut filter = Document::new();
        filter.insert("_id", id.clone());
        filter.insert(format!("squad.{member_id}"), doc! {"$exists": true});

        let mut set = Document::new();
        set.insert(format!("squad.{member_id}.status"), status.as_str());

        let result = self
            .collection()
            .update_one(filter, doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::UpdateMatch {
                id: id.clone(),
                source,
            })?;

        if result.matched_count > 0 {
            return Ok(StatusUpdate::Applied);
        }
        match self.find(id).await? {
            Some(_) => Ok(StatusUpdate::MemberMissing),
            None => Ok(StatusUpdate::MatchMissing),
        }
    }

    async fn record_failures(&self, entry: PushFailureEntity) -> MongoResult<()> {
        let bucket_id = entry.bucket_id.clone();
        let document: MongoPushFailureDocument = entry.into();
        self.push_log_collection()
            .replace_one(doc! {"_id": bucket_id.as_str()}, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::RecordPushFailure { bucket_id, source })?;
        Ok(())
    }
}

impl MatchStore for MongoMatchStore {
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save(entity).await.map_err(Into::into) })
    }

    fn find_match(&self, id: String) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn delete_match(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete(id).await.map_err(Into::into) })
    }

    fn list_matches(&self, order: MatchOrder) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(order).await.map_err(Into::into) })
    }

    fn next_match_after(
        &self,
        instant: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.next_after(instant).await.map_err(Into::into) })
    }

    fn update_match(
        &self,
        id: String,
        changes: MatchChanges,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update(id, changes).await.map_err(Into::into) })
    }

    fn set_member_status(
        &self,
        id: String,
        member_id: String,
        status: Availability,
    ) -> BoxFuture<'static, StorageResult<StatusUpdate>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .set_status(id, member_id, status)
                .await
                .map_err(Into::into)
        })
    }
}

impl FailureLedger for MongoMatchStore {
    fn record(&self, entry: PushFailureEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.record_failures(entry).await.map_err(Into::into) })
    }
}
