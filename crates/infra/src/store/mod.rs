//! Versioned document storage.
//!
//! Every document carries a store-assigned `version` starting at 1 and bumped on each
//! successful write. `update` takes an [`ExpectedVersion`] so callers get
//! compare-and-swap semantics per document.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventsphere_core::ExpectedVersion;

pub use in_memory::InMemoryDocumentStore;

/// A stored document and its current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<V> {
    pub value: V,
    pub version: u64,
}

impl<V> Versioned<V> {
    pub fn new(value: V, version: u64) -> Self {
        Self { value, version }
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

/// Document store operation error.
///
/// Infrastructure errors only; domain failures never pass through here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("document (de)serialization failed: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Keyed collection of versioned documents.
///
/// Implementations must:
/// - assign version 1 on insert and `current + 1` on every update
/// - reject `update` when `expected` does not match the stored version
/// - return `list` in key order (ids are time-ordered UUIDv7, so this is creation order)
#[async_trait]
pub trait DocumentStore<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn get(&self, id: &K) -> Result<Option<Versioned<V>>, StoreError>;

    /// Create a new document; fails with `AlreadyExists` if `id` is taken.
    async fn insert(&self, id: K, value: V) -> Result<Versioned<V>, StoreError>;

    /// Replace an existing document if its version matches `expected`.
    async fn update(&self, id: K, value: V, expected: ExpectedVersion) -> Result<Versioned<V>, StoreError>;

    /// Returns `false` when nothing was stored under `id`.
    async fn delete(&self, id: &K) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<Versioned<V>>, StoreError>;
}

#[async_trait]
impl<K, V, S> DocumentStore<K, V> for Arc<S>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: DocumentStore<K, V> + ?Sized,
{
    async fn get(&self, id: &K) -> Result<Option<Versioned<V>>, StoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, id: K, value: V) -> Result<Versioned<V>, StoreError> {
        (**self).insert(id, value).await
    }

    async fn update(&self, id: K, value: V, expected: ExpectedVersion) -> Result<Versioned<V>, StoreError> {
        (**self).update(id, value, expected).await
    }

    async fn delete(&self, id: &K) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<Versioned<V>>, StoreError> {
        (**self).list().await
    }
}
