// Process-native session storage
// Keeps a local cache of the variable map and double-writes every mutation
// through the session handle, so the cache and the persisted map never
// diverge within a request. Once destroyed, the store rejects mutations so
// neither side can drift ahead of the other.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{SessionStore, StorageError};
use crate::handle::SessionHandle;

struct NativeState {
    values: HashMap<String, Value>,
    destroyed: bool,
}

impl NativeState {
    fn writable(&mut self) -> Result<&mut HashMap<String, Value>, StorageError> {
        if self.destroyed {
            return Err(StorageError::Backend(
                "session already destroyed".to_string(),
            ));
        }
        Ok(&mut self.values)
    }
}

pub struct NativeStore {
    handle: Arc<dyn SessionHandle>,
    state: RwLock<NativeState>,
}

impl NativeStore {
    /// Build the store, priming the cache from the persisted session map
    pub async fn new(handle: Arc<dyn SessionHandle>) -> Result<Self, StorageError> {
        let values = handle.load().await?;
        debug!(
            "Loaded {} session variable(s) for session {}",
            values.len(),
            handle.id().await
        );
        Ok(Self {
            handle,
            state: RwLock::new(NativeState {
                values,
                destroyed: false,
            }),
        })
    }

    async fn persist(&self, values: &HashMap<String, Value>) -> Result<(), StorageError> {
        self.handle.save_all(values.clone()).await
    }
}

#[async_trait]
impl SessionStore for NativeStore {
    async fn session_id(&self) -> Result<String, StorageError> {
        Ok(self.handle.id().await)
    }

    async fn get(&self, name: &str) -> Result<Option<Value>, StorageError> {
        let state = self.state.read().await;
        Ok(state.values.get(name).cloned())
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>, StorageError> {
        let state = self.state.read().await;
        Ok(state.values.clone())
    }

    async fn set(&self, name: &str, value: Value) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let values = state.writable()?;
        values.insert(name.to_string(), value);
        self.persist(&state.values).await
    }

    async fn set_many(&self, batch: HashMap<String, Value>) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let values = state.writable()?;
        values.extend(batch);
        self.persist(&state.values).await
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let values = state.writable()?;
        values.remove(name);
        self.persist(&state.values).await
    }

    async fn remove_all(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let values = state.writable()?;
        values.clear();
        self.persist(&state.values).await
    }

    async fn destroy(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state.values.clear();
        state.destroyed = true;
        info!("Destroying session {}", self.handle.id().await);
        self.handle.destroy().await
    }

    async fn regenerate_id(&self) -> Result<String, StorageError> {
        let mut state = self.state.write().await;
        state.writable()?;
        let new_id = self.handle.regenerate_id().await?;
        // Regeneration discards the persisted map; refill it from the cache.
        self.handle.save_all(state.values.clone()).await?;
        debug!("Refilled session {} after id regeneration", new_id);
        Ok(new_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::MemorySessionHandle;
    use serde_json::json;

    async fn store_with_handle() -> (NativeStore, Arc<MemorySessionHandle>) {
        let handle = Arc::new(MemorySessionHandle::new());
        let store = NativeStore::new(handle.clone()).await.unwrap();
        (store, handle)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _handle) = store_with_handle().await;

        store.set("user_id", json!(42)).await.unwrap();
        assert_eq!(store.get("user_id").await.unwrap(), Some(json!(42)));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mutations_double_write_to_handle() {
        let (store, handle) = store_with_handle().await;

        store.set("a", json!(1)).await.unwrap();
        let mut batch = HashMap::new();
        batch.insert("b".to_string(), json!(2));
        batch.insert("c".to_string(), json!(3));
        store.set_many(batch).await.unwrap();
        store.remove("a").await.unwrap();

        let persisted = handle.load().await.unwrap();
        assert_eq!(persisted, store.get_all().await.unwrap());
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted.get("b"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_remove_all_keeps_session_alive() {
        let (store, handle) = store_with_handle().await;

        store.set("key", json!("value")).await.unwrap();
        store.remove_all().await.unwrap();

        assert!(store.get_all().await.unwrap().is_empty());
        assert!(handle.load().await.unwrap().is_empty());
        // The session itself still accepts writes
        store.set("key", json!("again")).await.unwrap();
        assert_eq!(handle.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_destroy_clears_cache_and_session() {
        let (store, handle) = store_with_handle().await;

        store.set("key", json!("value")).await.unwrap();
        store.destroy().await.unwrap();

        assert!(store.get_all().await.unwrap().is_empty());
        assert!(handle.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_rejected_after_destroy() {
        let (store, handle) = store_with_handle().await;

        store.set("key", json!("value")).await.unwrap();
        store.destroy().await.unwrap();

        // The cache may not drift ahead of the torn-down session.
        assert!(matches!(
            store.set("key", json!("again")).await,
            Err(StorageError::Backend(_))
        ));
        assert!(matches!(
            store.remove("key").await,
            Err(StorageError::Backend(_))
        ));
        assert!(store.regenerate_id().await.is_err());

        // Reads still report the emptied session.
        assert_eq!(store.get("key").await.unwrap(), None);
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(handle.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_regenerate_preserves_variables() {
        let (store, handle) = store_with_handle().await;

        store.set("user_id", json!(42)).await.unwrap();
        let old_id = store.session_id().await.unwrap();

        let new_id = store.regenerate_id().await.unwrap();
        assert_ne!(old_id, new_id);
        assert_eq!(store.session_id().await.unwrap(), new_id);

        // The refill wrote the cached variables under the new id
        let persisted = handle.load().await.unwrap();
        assert_eq!(persisted.get("user_id"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_cache_primed_from_existing_session() {
        let handle = Arc::new(MemorySessionHandle::new());
        let mut values = HashMap::new();
        values.insert("carried".to_string(), json!("over"));
        handle.save_all(values).await.unwrap();

        let store = NativeStore::new(handle).await.unwrap();
        assert_eq!(store.get("carried").await.unwrap(), Some(json!("over")));
    }
}
