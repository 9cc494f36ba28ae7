//! Member directory collaborator.
//!
//! The directory is the external identity service that knows the current
//! roster. This crate only ever reads it; roster membership is resolved
//! from a full snapshot at match creation (or on an explicit refresh) and
//! never written back.

#[cfg(feature = "http-directory")]
pub mod http;

use std::error::Error;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One directory member as returned by the external service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Stable member identifier.
    pub id: String,
    /// Name shown to other roster members.
    pub display_name: String,
    /// Registered push token, absent when the member has no device.
    pub push_token: Option<String>,
}

/// Failures raised by directory backends.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory could not be reached or answered unusably.
    #[error("member directory unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The directory has no member with the given id.
    #[error("no directory member with id `{id}`")]
    MissingMember { id: String },
}

impl DirectoryError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        DirectoryError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Read-only view of the member directory.
pub trait MemberDirectory: Send + Sync {
    fn list_members(&self) -> BoxFuture<'static, Result<Vec<Member>, DirectoryError>>;
    fn get_member(&self, id: String) -> BoxFuture<'static, Result<Member, DirectoryError>>;
}
