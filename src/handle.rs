// External session mechanism
// The host runtime owns session-id exchange with the client; stores talk to
// it through this handle instead of an ambient global map.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::store::StorageError;

/// Handle to the per-request session mechanism: an opaque identifier plus a
/// persisted variable map keyed by it.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Current session identifier
    async fn id(&self) -> String;

    /// Issue a fresh session identifier. The persisted map for the old
    /// identifier is discarded; callers that want to keep their variables
    /// must save them again afterwards.
    async fn regenerate_id(&self) -> Result<String, StorageError>;

    /// Read the full persisted variable map
    async fn load(&self) -> Result<HashMap<String, Value>, StorageError>;

    /// Replace the full persisted variable map
    async fn save_all(&self, values: HashMap<String, Value>) -> Result<(), StorageError>;

    /// Tear down the session entirely. Until a new session starts, reads
    /// yield an empty map and writes are dropped.
    async fn destroy(&self) -> Result<(), StorageError>;
}

struct HandleState {
    id: String,
    values: HashMap<String, Value>,
    active: bool,
}

/// In-process session mechanism. Backs the native store in embedded hosts
/// and serves as the test double for request-to-request scenarios.
pub struct MemorySessionHandle {
    state: Arc<RwLock<HandleState>>,
}

impl MemorySessionHandle {
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        debug!("Started session {}", id);
        Self {
            state: Arc::new(RwLock::new(HandleState {
                id,
                values: HashMap::new(),
                active: true,
            })),
        }
    }
}

impl Default for MemorySessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionHandle for MemorySessionHandle {
    async fn id(&self) -> String {
        self.state.read().await.id.clone()
    }

    async fn regenerate_id(&self) -> Result<String, StorageError> {
        let mut state = self.state.write().await;
        if !state.active {
            return Err(StorageError::Backend(
                "cannot regenerate a destroyed session".to_string(),
            ));
        }
        let new_id = uuid::Uuid::new_v4().to_string();
        debug!("Regenerated session id {} -> {}", state.id, new_id);
        state.id = new_id.clone();
        // The map for the old identifier is gone; the store refills it.
        state.values.clear();
        Ok(new_id)
    }

    async fn load(&self) -> Result<HashMap<String, Value>, StorageError> {
        let state = self.state.read().await;
        if !state.active {
            return Ok(HashMap::new());
        }
        Ok(state.values.clone())
    }

    async fn save_all(&self, values: HashMap<String, Value>) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if !state.active {
            // Writes after destroy do not persist anywhere.
            return Ok(());
        }
        state.values = values;
        Ok(())
    }

    async fn destroy(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        info!("Destroyed session {}", state.id);
        state.values.clear();
        state.active = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let handle = MemorySessionHandle::new();

        let mut values = HashMap::new();
        values.insert("user_id".to_string(), json!(42));
        handle.save_all(values).await.unwrap();

        let loaded = handle.load().await.unwrap();
        assert_eq!(loaded.get("user_id"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_regenerate_changes_id_and_clears_map() {
        let handle = MemorySessionHandle::new();
        let old_id = handle.id().await;

        let mut values = HashMap::new();
        values.insert("key".to_string(), json!("value"));
        handle.save_all(values).await.unwrap();

        let new_id = handle.regenerate_id().await.unwrap();
        assert_ne!(old_id, new_id);
        assert_eq!(handle.id().await, new_id);
        assert!(handle.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_drops_state_and_writes() {
        let handle = MemorySessionHandle::new();

        let mut values = HashMap::new();
        values.insert("key".to_string(), json!("value"));
        handle.save_all(values.clone()).await.unwrap();

        handle.destroy().await.unwrap();
        assert!(handle.load().await.unwrap().is_empty());

        // Writes after destroy are dropped
        handle.save_all(values).await.unwrap();
        assert!(handle.load().await.unwrap().is_empty());

        // And the id cannot be regenerated
        assert!(handle.regenerate_id().await.is_err());
    }
}
