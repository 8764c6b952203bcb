//! In-memory metadata store for local runs and tests.
//!
//! Records live in a `BTreeMap` so prefix queries come back in key order,
//! matching the PostgreSQL backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use super::{Item, ItemStream, Key, MetadataStore, Precondition, StoreError, VersionTag};

#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: RwLock<BTreeMap<Key, (VersionTag, serde_json::Value)>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(key).map(|(tag, body)| Item {
            key: key.clone(),
            tag: *tag,
            body: body.clone(),
        }))
    }

    async fn put(
        &self,
        key: &Key,
        body: serde_json::Value,
        condition: Precondition,
    ) -> Result<VersionTag, StoreError> {
        let mut records = self.records.write().await;
        let current = records.get(key).map(|(tag, _)| *tag);

        let allowed = match condition {
            Precondition::Absent => current.is_none(),
            Precondition::Tag(expected) => current == Some(expected),
        };
        if !allowed {
            return Err(StoreError::ConditionFailed { key: key.clone() });
        }

        let tag = current.map_or(1, |t| t + 1);
        records.insert(key.clone(), (tag, body));
        Ok(tag)
    }

    async fn delete(&self, key: &Key) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(key).is_some())
    }

    fn query_prefix(&self, pk: &str, sk_prefix: &str) -> ItemStream<'_> {
        let start = Key::new(pk, sk_prefix);
        stream::once(async move {
            let records = self.records.read().await;
            let matched: Vec<Result<Item, StoreError>> = records
                .range(start.clone()..)
                .take_while(|(k, _)| k.pk == start.pk && k.sk.starts_with(&start.sk))
                .map(|(k, (tag, body))| {
                    Ok(Item {
                        key: k.clone(),
                        tag: *tag,
                        body: body.clone(),
                    })
                })
                .collect();
            stream::iter(matched)
        })
        .flatten()
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_precondition_rejects_existing_key() {
        let store = MemoryMetadataStore::new();
        let key = Key::new("P", "S");
        store.put(&key, json!({"n": 1}), Precondition::Absent).await.unwrap();

        let err = store
            .put(&key, json!({"n": 2}), Precondition::Absent)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed { .. }));

        let item = store.get(&key).await.unwrap().unwrap();
        assert_eq!(item.body, json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_stale_tag_is_rejected_without_writing() {
        let store = MemoryMetadataStore::new();
        let key = Key::new("P", "S");
        let first = store.put(&key, json!(1), Precondition::Absent).await.unwrap();
        let second = store.put(&key, json!(2), Precondition::Tag(first)).await.unwrap();
        assert_eq!(second, first + 1);

        let err = store.put(&key, json!(3), Precondition::Tag(first)).await;
        assert!(matches!(err, Err(StoreError::ConditionFailed { .. })));
        assert_eq!(store.get(&key).await.unwrap().unwrap().body, json!(2));
    }

    #[tokio::test]
    async fn test_tag_precondition_on_missing_key_fails() {
        let store = MemoryMetadataStore::new();
        let err = store
            .put(&Key::new("P", "S"), json!(1), Precondition::Tag(1))
            .await;
        assert!(matches!(err, Err(StoreError::ConditionFailed { .. })));
    }

    #[tokio::test]
    async fn test_query_prefix_is_scoped_and_ordered() {
        let store = MemoryMetadataStore::new();
        for (pk, sk) in [
            ("A", "ITEM#2"),
            ("A", "ITEM#1"),
            ("A", "OTHER#1"),
            ("B", "ITEM#0"),
        ] {
            store
                .put(&Key::new(pk, sk), json!(sk), Precondition::Absent)
                .await
                .unwrap();
        }

        let items: Vec<Item> = store.query_prefix("A", "ITEM#").try_collect().await.unwrap();
        let sks: Vec<_> = items.iter().map(|i| i.key.sk.as_str()).collect();
        assert_eq!(sks, vec!["ITEM#1", "ITEM#2"]);
    }

    #[tokio::test]
    async fn test_malformed_body_names_its_key() {
        let store = MemoryMetadataStore::new();
        let key = Key::new("ORG#acme", "PROJECT#p1");
        store.put(&key, json!("not a map"), Precondition::Absent).await.unwrap();

        let item = store.get(&key).await.unwrap().unwrap();
        let err = item.decode::<BTreeMap<String, i64>>().unwrap_err();
        assert!(err.to_string().contains("ORG#acme/PROJECT#p1"));
        assert!(matches!(err, StoreError::Malformed { key: ref bad, .. } if *bad == key));
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = MemoryMetadataStore::new();
        let key = Key::new("P", "S");
        store.put(&key, json!(1), Precondition::Absent).await.unwrap();
        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
        assert!(store.get(&key).await.unwrap().is_none());
    }
}
