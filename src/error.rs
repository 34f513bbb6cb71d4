// Crate-level errors

use crate::store::StorageError;

/// Errors surfaced by the session manager and configuration layer
#[derive(Debug, Clone)]
pub enum SessionError {
    /// The configured storage handler name is not one of the recognized set
    UnknownBackend(String),
    /// A storage backend operation failed
    Storage(StorageError),
    /// The configuration file could not be read or parsed
    Config(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownBackend(name) => {
                write!(f, "Unknown session storage handler: '{}'", name)
            }
            SessionError::Storage(err) => write!(f, "Session storage error: {}", err),
            SessionError::Config(msg) => write!(f, "Session configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err)
    }
}
