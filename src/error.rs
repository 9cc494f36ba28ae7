use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, directory::DirectoryError};

/// Errors that can occur in service layer operations.
///
/// Delivery failures are deliberately absent: a failed push is recorded in
/// the failure ledger and never surfaced to the caller that triggered it.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// The member directory could not be read.
    #[error("member directory unavailable")]
    DirectoryUnavailable(#[source] DirectoryError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}
