//! PostgreSQL metadata store.
//!
//! All record kinds share one `records` table keyed by `(pk, sk)`. The `tag`
//! column is incremented by every write; guarded writes compare it in the
//! `WHERE` clause so the check and the write are a single statement.

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::{Item, ItemStream, Key, MetadataStore, Precondition, StoreError, VersionTag};

#[derive(Debug, FromRow)]
struct RecordRow {
    pk: String,
    sk: String,
    tag: i64,
    body: serde_json::Value,
}

impl From<RecordRow> for Item {
    fn from(row: RecordRow) -> Self {
        Item {
            key: Key::new(row.pk, row.sk),
            tag: row.tag,
            body: row.body,
        }
    }
}

#[derive(Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>, StoreError> {
        let row: Option<RecordRow> =
            sqlx::query_as("SELECT pk, sk, tag, body FROM records WHERE pk = $1 AND sk = $2")
                .bind(&key.pk)
                .bind(&key.sk)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Item::from))
    }

    async fn put(
        &self,
        key: &Key,
        body: serde_json::Value,
        condition: Precondition,
    ) -> Result<VersionTag, StoreError> {
        let tag: Option<i64> = match condition {
            Precondition::Absent => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO records (pk, sk, tag, body)
                    VALUES ($1, $2, 1, $3)
                    ON CONFLICT (pk, sk) DO NOTHING
                    RETURNING tag
                    "#,
                )
                .bind(&key.pk)
                .bind(&key.sk)
                .bind(Json(&body))
                .fetch_optional(&self.pool)
                .await?
            }
            Precondition::Tag(expected) => {
                sqlx::query_scalar(
                    r#"
                    UPDATE records
                    SET body = $3, tag = tag + 1, updated_at = now()
                    WHERE pk = $1 AND sk = $2 AND tag = $4
                    RETURNING tag
                    "#,
                )
                .bind(&key.pk)
                .bind(&key.sk)
                .bind(Json(&body))
                .bind(expected)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        tag.ok_or_else(|| StoreError::ConditionFailed { key: key.clone() })
    }

    async fn delete(&self, key: &Key) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE pk = $1 AND sk = $2")
            .bind(&key.pk)
            .bind(&key.sk)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn query_prefix(&self, pk: &str, sk_prefix: &str) -> ItemStream<'_> {
        sqlx::query_as::<_, RecordRow>(
            "SELECT pk, sk, tag, body FROM records WHERE pk = $1 AND sk LIKE $2 ORDER BY sk",
        )
        .bind(pk.to_owned())
        .bind(like_prefix(sk_prefix))
        .fetch(&self.pool)
        .map(|row| row.map(Item::from).map_err(StoreError::from))
        .boxed()
    }
}

/// Builds a `LIKE` pattern matching `prefix` literally, using PostgreSQL's
/// default `\` escape character.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
