//! In-memory object store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ObjectStore, ObjectStoreError};

/// Object store keeping everything in process memory.
///
/// Selected explicitly with `backend = "memory"`; contents do not survive
/// a restart. Used for development and tests.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Remove an object. Test helper for simulating unfetchable artifacts.
    pub async fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.write().await.remove(key)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryObjectStore::new();
        store
            .put("cat_original.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        let bytes = store.get("cat_original.jpg").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryObjectStore::new();
        let result = store.get("missing").await;
        assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryObjectStore::new();
        store.put("key", vec![1], "image/png").await.unwrap();
        store.put("key", vec![2], "image/png").await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), vec![2]);
        assert_eq!(store.len().await, 1);
    }
}
