use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    dao::models::{AttendanceEntity, Availability},
    directory::MemberDirectory,
    error::ServiceError,
};

/// Builds the initial per-match attendance map from the current member
/// directory snapshot.
#[derive(Clone)]
pub struct RosterResolver {
    directory: Arc<dyn MemberDirectory>,
}

impl RosterResolver {
    pub fn new(directory: Arc<dyn MemberDirectory>) -> Self {
        Self { directory }
    }

    /// Read the full directory and build one attendance record per member,
    /// every status forced to [`Availability::NotResponded`].
    ///
    /// Fails when the directory is unreachable; there is no partial or
    /// cached fallback. Callers use this on match creation and on an
    /// explicit roster refresh only, since refreshing discards every
    /// response already recorded.
    pub async fn resolve(
        &self,
    ) -> Result<IndexMap<String, AttendanceEntity>, ServiceError> {
        let members = self
            .directory
            .list_members()
            .await
            .map_err(ServiceError::DirectoryUnavailable)?;

        let mut squad = IndexMap::with_capacity(members.len());
        for member in members {
            squad.insert(
                member.id,
                AttendanceEntity {
                    push_token: member.push_token,
                    display_name: member.display_name,
                    status: Availability::NotResponded,
                },
            );
        }
        Ok(squad)
    }
}
