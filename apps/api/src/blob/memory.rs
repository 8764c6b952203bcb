use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{BlobError, BlobStore};

/// Process-local blob store. Used for `STORAGE_BACKEND=memory` and in tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write_once(&self, path: &str, bytes: Bytes) -> Result<(), BlobError> {
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(path) {
            return Err(BlobError::AlreadyExists {
                path: path.to_string(),
            });
        }
        blobs.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Bytes, BlobError> {
        self.blobs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_once_refuses_overwrite() {
        let store = MemoryBlobStore::new();
        store.write_once("a/b", Bytes::from_static(b"one")).await.unwrap();

        let err = store
            .write_once("a/b", Bytes::from_static(b"two"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::AlreadyExists { .. }));
        assert_eq!(store.read("a/b").await.unwrap(), Bytes::from_static(b"one"));
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.read("missing").await,
            Err(BlobError::NotFound { .. })
        ));
    }
}
