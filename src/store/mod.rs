// Storage backend abstraction
// Pluggable persistence for session variables, selected once at manager
// construction from a fixed set of backends.

pub mod database;
pub mod memcached;
pub mod native;

pub use database::DatabaseStore;
pub use memcached::MemcachedStore;
pub use native::NativeStore;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SessionError;
use crate::handle::SessionHandle;

/// Trait for session variable storage backends
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Identifier of the underlying session
    async fn session_id(&self) -> Result<String, StorageError>;

    /// Get a session variable, `None` when it was never set or was removed
    async fn get(&self, name: &str) -> Result<Option<Value>, StorageError>;

    /// Get all session variables
    async fn get_all(&self) -> Result<HashMap<String, Value>, StorageError>;

    /// Set a session variable
    async fn set(&self, name: &str, value: Value) -> Result<(), StorageError>;

    /// Set multiple session variables at once
    async fn set_many(&self, values: HashMap<String, Value>) -> Result<(), StorageError>;

    /// Remove a session variable
    async fn remove(&self, name: &str) -> Result<(), StorageError>;

    /// Remove all session variables, keeping the session itself alive
    async fn remove_all(&self) -> Result<(), StorageError>;

    /// Destroy the session and all its variables
    async fn destroy(&self) -> Result<(), StorageError>;

    /// Regenerate the session identifier, re-populating the new session
    /// with the current variables when the backend supports it
    async fn regenerate_id(&self) -> Result<String, StorageError>;
}

/// Storage errors
#[derive(Debug, Clone)]
pub enum StorageError {
    /// The selected backend exists but is not implemented
    Unsupported(&'static str),
    /// The underlying session mechanism failed
    Backend(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unsupported(what) => write!(f, "Storage not implemented: {}", what),
            StorageError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Storage handler selector, one variant per recognized configuration name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHandler {
    Native,
    Memcache,
    Memcached,
    Mongo,
    Database,
    Null,
}

impl StorageHandler {
    /// Parse a configured handler name. Unrecognized names are an explicit
    /// error rather than a silently missing backend.
    pub fn from_name(name: &str) -> Result<Self, SessionError> {
        match name {
            "native" => Ok(StorageHandler::Native),
            "memcache" => Ok(StorageHandler::Memcache),
            "memcached" => Ok(StorageHandler::Memcached),
            "mongo" => Ok(StorageHandler::Mongo),
            "database" => Ok(StorageHandler::Database),
            "null" => Ok(StorageHandler::Null),
            other => Err(SessionError::UnknownBackend(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageHandler::Native => "native",
            StorageHandler::Memcache => "memcache",
            StorageHandler::Memcached => "memcached",
            StorageHandler::Mongo => "mongo",
            StorageHandler::Database => "database",
            StorageHandler::Null => "null",
        }
    }
}

/// Factory function to create a storage backend for the selected handler
pub async fn create_store(
    handler: StorageHandler,
    handle: Arc<dyn SessionHandle>,
) -> Result<Box<dyn SessionStore>, SessionError> {
    match handler {
        StorageHandler::Native => Ok(Box::new(NativeStore::new(handle).await?)),
        StorageHandler::Memcache | StorageHandler::Memcached => {
            Ok(Box::new(MemcachedStore::new()))
        }
        StorageHandler::Mongo | StorageHandler::Database => Ok(Box::new(DatabaseStore::new())),
        StorageHandler::Null => Err(StorageError::Unsupported("null storage handler").into()),
    }
}
