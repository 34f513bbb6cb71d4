// Session state management with hijack/expiry checks over pluggable storage
pub mod config;
pub mod error;
pub mod handle;
pub mod session;
pub mod store;

pub use config::SessionConfig;
pub use error::SessionError;
pub use handle::{MemorySessionHandle, SessionHandle};
pub use session::{SessionManager, SessionStatus};
pub use store::{SessionStore, StorageError, StorageHandler};
