use thiserror::Error;

use crate::blob::BlobError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Compare-and-swap kept losing; safe to retry the whole request.
    #[error("Conflicting concurrent update in {operation} after {attempts} attempts")]
    Conflict {
        operation: &'static str,
        attempts: u32,
    },

    #[error("Branch '{0}' is protected")]
    Protected(String),

    #[error("Branch '{branch}' has no active version")]
    NoActiveVersion { branch: String },

    #[error("Metadata store error while trying to {context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Blob store error while trying to {context}: {source}")]
    Blob {
        context: &'static str,
        #[source]
        source: BlobError,
    },
}

impl VersionError {
    pub fn store(context: &'static str, source: StoreError) -> Self {
        VersionError::Store { context, source }
    }

    pub fn blob(context: &'static str, source: BlobError) -> Self {
        VersionError::Blob { context, source }
    }
}
