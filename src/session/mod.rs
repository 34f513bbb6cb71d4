// Session management module
// Per-request session manager over a pluggable storage backend, with
// hijack and inactivity checks on construction.

pub mod manager;
pub mod types;

pub use manager::SessionManager;
pub use types::{SessionStatus, LAST_ACTIVE_TIME, USER_AGENT};
