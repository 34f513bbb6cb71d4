// Database session storage (stub)
// Selected by the "database"/"mongo" handlers; not implemented yet.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::{SessionStore, StorageError};

const NOT_IMPLEMENTED: &str = "database session storage";

pub struct DatabaseStore;

impl DatabaseStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DatabaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for DatabaseStore {
    async fn session_id(&self) -> Result<String, StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn get(&self, _name: &str) -> Result<Option<Value>, StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>, StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn set(&self, _name: &str, _value: Value) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn set_many(&self, _values: HashMap<String, Value>) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn remove(&self, _name: &str) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn remove_all(&self) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn destroy(&self) -> Result<(), StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }

    async fn regenerate_id(&self) -> Result<String, StorageError> {
        Err(StorageError::Unsupported(NOT_IMPLEMENTED))
    }
}
