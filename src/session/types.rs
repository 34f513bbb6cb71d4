// Session types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved variable holding the user-agent string the session was bound to
pub const USER_AGENT: &str = "UserAgent";

/// Reserved variable holding the unix timestamp of the last request
pub const LAST_ACTIVE_TIME: &str = "LastActiveTime";

/// Session status after the construction-time checks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session passed the hijack and expiry checks
    Valid,
    /// Session failed a check and was torn down
    Destroyed,
}

/// Read a stored `LastActiveTime` value as unix seconds. Tolerates the
/// timestamp having been stored as a JSON number or a numeric string.
pub(crate) fn as_unix_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
