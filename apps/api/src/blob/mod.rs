//! Immutable prompt content addressed by path.

pub mod cache;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use cache::CachedBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Blob not found: {path}")]
    NotFound { path: String },

    #[error("Blob already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Blob backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` at `path`. Never overwrites: if `path` already holds
    /// content the call fails with [`BlobError::AlreadyExists`].
    async fn write_once(&self, path: &str, bytes: Bytes) -> Result<(), BlobError>;

    async fn read(&self, path: &str) -> Result<Bytes, BlobError>;
}
