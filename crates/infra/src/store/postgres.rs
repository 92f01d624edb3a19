//! Postgres-backed document store.
//!
//! All collections share one `documents` table keyed by `(collection, id)`; bodies are
//! JSONB. Conditional updates run as a single `UPDATE ... WHERE version = $n`, so two
//! writers racing on the same version cannot both succeed.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `AlreadyExists` |
//! | Any other | N/A | `Backend` |

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row};
use tracing::instrument;

use eventsphere_core::ExpectedVersion;

use super::{DocumentStore, StoreError, Versioned};

const SCHEMA: &str = include_str!("../../migrations/0001_documents.sql");

/// Create the `documents` table and its index if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

/// One logical collection (e.g. `"expos"`) inside the shared `documents` table.
pub struct PostgresDocumentStore<K, V> {
    pool: Arc<PgPool>,
    collection: &'static str,
    _key: PhantomData<fn() -> K>,
    _value: PhantomData<fn() -> V>,
}

impl<K, V> PostgresDocumentStore<K, V> {
    pub fn new(pool: PgPool, collection: &'static str) -> Self {
        Self {
            pool: Arc::new(pool),
            collection,
            _key: PhantomData,
            _value: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }
}

impl<K, V> Clone for PostgresDocumentStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            collection: self.collection,
            _key: PhantomData,
            _value: PhantomData,
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::AlreadyExists(format!("{operation}: {}", db.message()))
        }
        _ => StoreError::Backend(format!("{operation}: {err}")),
    }
}

fn to_version(raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::Backend(format!("negative version {raw}")))
}

fn decode<V: DeserializeOwned>(body: serde_json::Value) -> Result<V, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn encode<V: Serialize>(value: &V) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl<K, V> DocumentStore<K, V> for PostgresDocumentStore<K, V>
where
    K: Display + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    #[instrument(skip(self), fields(collection = self.collection, id = %id), err)]
    async fn get(&self, id: &K) -> Result<Option<Versioned<V>>, StoreError> {
        let row = sqlx::query("SELECT version, body FROM documents WHERE collection = $1 AND id = $2")
            .bind(self.collection)
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let version: i64 = row.try_get("version").map_err(|e| map_sqlx_error("get", e))?;
        let body: serde_json::Value = row.try_get("body").map_err(|e| map_sqlx_error("get", e))?;

        Ok(Some(Versioned::new(decode(body)?, to_version(version)?)))
    }

    #[instrument(skip(self, value), fields(collection = self.collection, id = %id), err)]
    async fn insert(&self, id: K, value: V) -> Result<Versioned<V>, StoreError> {
        let body = encode(&value)?;
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, version, body)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(self.collection)
        .bind(id.to_string())
        .bind(body)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        Ok(Versioned::new(value, 1))
    }

    #[instrument(skip(self, value), fields(collection = self.collection, id = %id, expected = ?expected), err)]
    async fn update(&self, id: K, value: V, expected: ExpectedVersion) -> Result<Versioned<V>, StoreError> {
        let body = encode(&value)?;
        let expected_raw: Option<i64> = match expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(
                i64::try_from(v).map_err(|_| StoreError::Backend(format!("version {v} out of range")))?,
            ),
        };

        let row = sqlx::query(
            r#"
            UPDATE documents
            SET body = $3, version = version + 1, updated_at = NOW()
            WHERE collection = $1 AND id = $2
              AND ($4::BIGINT IS NULL OR version = $4)
            RETURNING version
            "#,
        )
        .bind(self.collection)
        .bind(id.to_string())
        .bind(body)
        .bind(expected_raw)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if let Some(row) = row {
            let version: i64 = row.try_get("version").map_err(|e| map_sqlx_error("update", e))?;
            return Ok(Versioned::new(value, to_version(version)?));
        }

        // Nothing matched: either the row is gone or someone else bumped it.
        let current: Option<i64> =
            sqlx::query_scalar("SELECT version FROM documents WHERE collection = $1 AND id = $2")
                .bind(self.collection)
                .bind(id.to_string())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("update", e))?;

        match current {
            None => Err(StoreError::NotFound(id.to_string())),
            Some(found) => Err(StoreError::Concurrency(format!(
                "{id}: expected {expected:?}, found {found}"
            ))),
        }
    }

    #[instrument(skip(self), fields(collection = self.collection, id = %id), err)]
    async fn delete(&self, id: &K) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(self.collection)
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(collection = self.collection), err)]
    async fn list(&self) -> Result<Vec<Versioned<V>>, StoreError> {
        let rows = sqlx::query("SELECT version, body FROM documents WHERE collection = $1 ORDER BY id ASC")
            .bind(self.collection)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.into_iter()
            .map(|row| {
                let version: i64 = row.try_get("version").map_err(|e| map_sqlx_error("list", e))?;
                let body: serde_json::Value = row.try_get("body").map_err(|e| map_sqlx_error("list", e))?;
                Ok(Versioned::new(decode(body)?, to_version(version)?))
            })
            .collect()
    }
}
