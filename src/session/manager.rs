// Session manager for per-request session lifecycle

use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{as_unix_seconds, SessionStatus, LAST_ACTIVE_TIME, USER_AGENT};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::handle::SessionHandle;
use crate::store::{create_store, SessionStore, StorageHandler};

/// Per-request session manager. Construction selects the storage backend,
/// runs the hijack/expiry checks, and finalizes the session identifier; the
/// instance then serves variable access for the rest of the request.
pub struct SessionManager {
    handle: Arc<dyn SessionHandle>,
    store: Box<dyn SessionStore>,
    session_id: String,
    expire_secs: i64,
    status: SessionStatus,
}

impl SessionManager {
    /// Build a manager for the current request. `user_agent` is the
    /// caller-supplied user-agent string of the request being served.
    pub async fn new(
        config: &SessionConfig,
        handle: Arc<dyn SessionHandle>,
        user_agent: &str,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let handler = config.handler()?;
        let store = create_store(handler, handle.clone()).await?;

        let mut manager = Self {
            handle,
            store,
            session_id: String::new(),
            expire_secs: config.expire_secs,
            status: SessionStatus::Valid,
        };

        manager.check_session(user_agent).await?;
        manager.finalize_id().await?;

        Ok(manager)
    }

    /// Hijack and inactivity check. A session whose stored user agent does
    /// not match the current request, or whose last activity is older than
    /// the expiry threshold, is destroyed before any other operation runs.
    async fn check_session(&mut self, user_agent: &str) -> Result<(), SessionError> {
        let now = Utc::now().timestamp();

        match self.store.get(USER_AGENT).await? {
            None => {
                // New session: bind it to the current client.
                debug!("Binding new session to user agent");
                self.store
                    .set(USER_AGENT, Value::String(user_agent.to_string()))
                    .await?;
            }
            Some(stored_agent) => {
                let agent_mismatch = stored_agent.as_str() != Some(user_agent);

                let expired = self
                    .store
                    .get(LAST_ACTIVE_TIME)
                    .await?
                    .as_ref()
                    .and_then(as_unix_seconds)
                    .map(|last_active| now - last_active > self.expire_secs)
                    .unwrap_or(false);

                if agent_mismatch || expired {
                    warn!(
                        agent_mismatch,
                        expired, "Session failed hijack/expiry check, destroying"
                    );
                    self.store.destroy().await?;
                    self.status = SessionStatus::Destroyed;
                    // A destroyed session gets no activity timestamp.
                    return Ok(());
                }
            }
        }

        self.store.set(LAST_ACTIVE_TIME, json!(now)).await?;
        Ok(())
    }

    /// Finalize the session identifier. A valid session gets a fresh id on
    /// every request; a destroyed one keeps whatever the handle reports.
    async fn finalize_id(&mut self) -> Result<(), SessionError> {
        self.session_id = match self.status {
            SessionStatus::Valid => self.store.regenerate_id().await?,
            SessionStatus::Destroyed => self.store.session_id().await?,
        };
        Ok(())
    }

    /// Current session identifier
    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Outcome of the construction-time checks
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Get a session variable, `None` when absent
    pub async fn get(&self, name: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.store.get(name).await?)
    }

    /// Get all session variables
    pub async fn get_all(&self) -> Result<HashMap<String, Value>, SessionError> {
        Ok(self.store.get_all().await?)
    }

    /// Get several session variables at once; absent names map to `None`
    pub async fn get_many(
        &self,
        names: &[&str],
    ) -> Result<HashMap<String, Option<Value>>, SessionError> {
        let mut values = HashMap::with_capacity(names.len());
        for name in names {
            values.insert(name.to_string(), self.store.get(name).await?);
        }
        Ok(values)
    }

    /// Set a session variable
    pub async fn set(&self, name: &str, value: Value) -> Result<(), SessionError> {
        Ok(self.store.set(name, value).await?)
    }

    /// Set multiple session variables at once
    pub async fn set_many(&self, values: HashMap<String, Value>) -> Result<(), SessionError> {
        Ok(self.store.set_many(values).await?)
    }

    /// Remove a session variable
    pub async fn remove(&self, name: &str) -> Result<(), SessionError> {
        Ok(self.store.remove(name).await?)
    }

    /// Remove several session variables
    pub async fn remove_many(&self, names: &[&str]) -> Result<(), SessionError> {
        for name in names {
            self.store.remove(name).await?;
        }
        Ok(())
    }

    /// Remove all session variables, keeping the session alive
    pub async fn remove_all(&self) -> Result<(), SessionError> {
        Ok(self.store.remove_all().await?)
    }

    /// Destroy the session and all its variables
    pub async fn destroy(&mut self) -> Result<(), SessionError> {
        self.store.destroy().await?;
        self.status = SessionStatus::Destroyed;
        info!("Session {} destroyed on request", self.session_id);
        Ok(())
    }

    /// Regenerate the session identifier, preserving the stored variables
    /// when the backend supports refilling
    pub async fn regenerate_id(&mut self) -> Result<String, SessionError> {
        let new_id = self.store.regenerate_id().await?;
        self.session_id = new_id.clone();
        Ok(new_id)
    }

    /// Swap the storage backend, optionally copying the current variables
    /// into the new store
    pub async fn set_storage(
        &mut self,
        handler: StorageHandler,
        copy: bool,
    ) -> Result<(), SessionError> {
        let old_values = if copy {
            Some(self.store.get_all().await?)
        } else {
            None
        };

        self.store = create_store(handler, self.handle.clone()).await?;
        info!("Switched session storage to {}", handler.as_str());

        if let Some(values) = old_values {
            self.store.set_many(values).await?;
        }
        Ok(())
    }
}
