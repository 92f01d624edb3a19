use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::RwLock;

use async_trait::async_trait;

use eventsphere_core::ExpectedVersion;

use super::{DocumentStore, StoreError, Versioned};

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryDocumentStore<K, V> {
    docs: RwLock<BTreeMap<K, Versioned<V>>>,
}

impl<K: Ord, V> Default for InMemoryDocumentStore<K, V> {
    fn default() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord, V> InMemoryDocumentStore<K, V> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl<K, V> DocumentStore<K, V> for InMemoryDocumentStore<K, V>
where
    K: Ord + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: &K) -> Result<Option<Versioned<V>>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.get(id).cloned())
    }

    async fn insert(&self, id: K, value: V) -> Result<Versioned<V>, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        if docs.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        let stored = Versioned::new(value, 1);
        docs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: K, value: V, expected: ExpectedVersion) -> Result<Versioned<V>, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let current = docs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency(format!(
                "{id}: expected {expected:?}, found {}",
                current.version
            )));
        }

        *current = Versioned::new(value, current.version + 1);
        Ok(current.clone())
    }

    async fn delete(&self, id: &K) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        Ok(docs.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<Versioned<V>>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use eventsphere_core::ExpoId;

    use super::*;

    #[tokio::test]
    async fn insert_get_update_delete() {
        let store = InMemoryDocumentStore::<ExpoId, String>::new();
        let id = ExpoId::new();

        let v1 = store.insert(id, "a".to_string()).await.unwrap();
        assert_eq!(v1.version, 1);
        assert!(matches!(
            store.insert(id, "dup".to_string()).await,
            Err(StoreError::AlreadyExists(_))
        ));

        let v2 = store
            .update(id, "b".to_string(), ExpectedVersion::Exact(1))
            .await
            .unwrap();
        assert_eq!(v2, Versioned::new("b".to_string(), 2));
        assert_eq!(store.get(&id).await.unwrap(), Some(v2));

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert_eq!(store.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryDocumentStore::<ExpoId, u32>::new();
        let id = ExpoId::new();
        store.insert(id, 1).await.unwrap();
        store.update(id, 2, ExpectedVersion::Exact(1)).await.unwrap();

        let err = store.update(id, 3, ExpectedVersion::Exact(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));
        assert_eq!(store.get(&id).await.unwrap().map(|d| d.value), Some(2));

        store.update(id, 4, ExpectedVersion::Any).await.unwrap();
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = InMemoryDocumentStore::<ExpoId, u32>::new();
        let err = store
            .update(ExpoId::new(), 1, ExpectedVersion::Any)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_in_key_order() {
        let store = InMemoryDocumentStore::<ExpoId, ExpoId>::new();
        let mut ids: Vec<ExpoId> = (0..5).map(|_| ExpoId::new()).collect();
        for id in ids.iter().rev() {
            store.insert(*id, *id).await.unwrap();
        }
        ids.sort();

        let listed: Vec<_> = store.list().await.unwrap().into_iter().map(Versioned::into_value).collect();
        assert_eq!(listed, ids);
    }
}
