//! Read-through Redis cache in front of a blob store.
//!
//! Content at a path never changes, so cached entries never go stale; the
//! TTL only bounds memory. Redis failures are logged and fall through to the
//! wrapped store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use tracing::{debug, warn};

use super::{BlobError, BlobStore};

const CACHE_KEY_PREFIX: &str = "prompt-content:";

pub struct CachedBlobStore {
    inner: Arc<dyn BlobStore>,
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl CachedBlobStore {
    pub fn new(inner: Arc<dyn BlobStore>, conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self {
            inner,
            conn,
            ttl_secs,
        }
    }

    async fn cached(&self, key: &str) -> Option<Bytes> {
        let mut conn = self.conn.clone();
        match redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<Vec<u8>>>(&mut conn)
            .await
        {
            Ok(hit) => hit.map(Bytes::from),
            Err(e) => {
                warn!("Content cache read failed for {key}: {e}");
                None
            }
        }
    }

    async fn remember(&self, key: &str, bytes: &Bytes) {
        let mut conn = self.conn.clone();
        let result = redis::cmd("SET")
            .arg(key)
            .arg(bytes.as_ref())
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await;
        if let Err(e) = result {
            warn!("Content cache write failed for {key}: {e}");
        }
    }
}

#[async_trait]
impl BlobStore for CachedBlobStore {
    async fn write_once(&self, path: &str, bytes: Bytes) -> Result<(), BlobError> {
        self.inner.write_once(path, bytes).await
    }

    async fn read(&self, path: &str) -> Result<Bytes, BlobError> {
        let key = cache_key(path);
        if let Some(hit) = self.cached(&key).await {
            debug!("Content cache hit for {path}");
            return Ok(hit);
        }

        let bytes = self.inner.read(path).await?;
        self.remember(&key, &bytes).await;
        Ok(bytes)
    }
}

fn cache_key(path: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_namespaced() {
        assert_eq!(
            cache_key("prompts/abc/main/v1/ff"),
            "prompt-content:prompts/abc/main/v1/ff"
        );
    }
}
