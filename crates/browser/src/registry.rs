//! In-memory session registry.

use std::{collections::HashMap, sync::Arc};

use {
    thiserror::Error,
    tokio::sync::{Mutex, RwLock},
};

/// Registry-level errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("session '{0}' is already running")]
    Conflict(String),
}

/// Map of caller-chosen session ids to live entries.
///
/// Enforces at-most-one entry per id; the registry owns each entry's
/// lifetime once inserted. Generic over the entry type so the map
/// semantics are testable without launching browsers.
pub struct SessionRegistry<T> {
    inner: RwLock<HashMap<String, Arc<Mutex<T>>>>,
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SessionRegistry<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Create-if-absent. A duplicate id is a conflict; the value is
    /// dropped in that case.
    pub async fn insert(&self, id: &str, value: T) -> Result<Arc<Mutex<T>>, RegistryError> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(id) {
            return Err(RegistryError::Conflict(id.to_string()));
        }
        let entry = Arc::new(Mutex::new(value));
        inner.insert(id.to_string(), Arc::clone(&entry));
        Ok(entry)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<T>>> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Option<Arc<Mutex<T>>> {
        self.inner.write().await.remove(id)
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    /// All live session ids.
    pub async fn ids(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_id_is_a_conflict_and_keeps_the_first_entry() {
        let registry = SessionRegistry::new();
        registry.insert("run-1", 1u32).await.unwrap();

        let err = registry.insert("run-1", 2u32).await.unwrap_err();
        assert_eq!(err, RegistryError::Conflict("run-1".into()));

        let entry = registry.get("run-1").await.unwrap();
        assert_eq!(*entry.lock().await, 1);
    }

    #[tokio::test]
    async fn remove_releases_the_id() {
        let registry = SessionRegistry::new();
        registry.insert("run-1", 7u32).await.unwrap();

        assert!(registry.remove("run-1").await.is_some());
        assert!(!registry.contains("run-1").await);
        assert!(registry.remove("run-1").await.is_none());

        // The id is free again after removal.
        registry.insert("run-1", 8u32).await.unwrap();
    }

    #[tokio::test]
    async fn ids_lists_live_sessions() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty().await);

        registry.insert("a", 0u32).await.unwrap();
        registry.insert("b", 0u32).await.unwrap();

        let mut ids = registry.ids().await;
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.len().await, 2);
    }
}
