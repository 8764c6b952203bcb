//! Versioned metadata records addressed by `(pk, sk)`.
//!
//! Every stored record carries a `VersionTag` that the store bumps on each
//! write. A write guarded by [`Precondition::Tag`] only applies when the
//! stored tag still matches, which makes it a compare-and-swap. This is the
//! only concurrency primitive the version engine relies on.

pub mod keys;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryMetadataStore;
pub use postgres::PgMetadataStore;

/// Opaque per-record write counter.
pub type VersionTag = i64;

/// Composite record key: partition key plus sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    pub pk: String,
    pub sk: String,
}

impl Key {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

/// A stored record together with its current tag.
#[derive(Debug, Clone)]
pub struct Item {
    pub key: Key,
    pub tag: VersionTag,
    pub body: serde_json::Value,
}

impl Item {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.body.clone()).map_err(|source| StoreError::Malformed {
            key: self.key.clone(),
            source,
        })
    }
}

/// Encodes a typed record as a store body.
pub fn encode<T: Serialize>(record: &T) -> Result<serde_json::Value, StoreError> {
    Ok(serde_json::to_value(record)?)
}

/// Guard applied to a `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Insert only; fails if the key already holds a record.
    Absent,
    /// Update only; fails unless the stored tag equals this one.
    Tag(VersionTag),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Condition failed for record {key}")]
    ConditionFailed { key: Key },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed record {key}: {source}")]
    Malformed {
        key: Key,
        source: serde_json::Error,
    },

    #[error("Record codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type ItemStream<'a> = BoxStream<'a, Result<Item, StoreError>>;

/// Storage backend for metadata records.
///
/// Implementations must be safe to call concurrently from many tasks.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Point read. `Ok(None)` when the key holds no record.
    async fn get(&self, key: &Key) -> Result<Option<Item>, StoreError>;

    /// Writes `body` at `key` if `condition` holds, returning the new tag.
    /// A failed condition yields [`StoreError::ConditionFailed`] and leaves
    /// the stored record untouched.
    async fn put(
        &self,
        key: &Key,
        body: serde_json::Value,
        condition: Precondition,
    ) -> Result<VersionTag, StoreError>;

    /// Returns `Ok(true)` if a record existed and was removed.
    async fn delete(&self, key: &Key) -> Result<bool, StoreError>;

    /// Lazily streams every record in partition `pk` whose sort key starts
    /// with `sk_prefix`, in sort key order. The stream is finite and cannot
    /// be resumed once dropped.
    fn query_prefix(&self, pk: &str, sk_prefix: &str) -> ItemStream<'_>;
}
