// Session configuration loading

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::SessionError;
use crate::store::StorageHandler;

/// Default inactivity expiry, in seconds
pub const DEFAULT_EXPIRE_SECS: i64 = 1800;

/// Session component configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Storage handler name: native, memcache, memcached, mongo, database
    /// or null. Only `native` is implemented.
    #[serde(default = "default_storage_handler")]
    pub storage_handler: String,
    /// Inactivity expiry threshold in seconds
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

fn default_storage_handler() -> String {
    "native".to_string()
}

fn default_expire_secs() -> i64 {
    DEFAULT_EXPIRE_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_handler: default_storage_handler(),
            expire_secs: default_expire_secs(),
        }
    }
}

impl SessionConfig {
    /// Resolve the configured handler name into a backend selector
    pub fn handler(&self) -> Result<StorageHandler, SessionError> {
        StorageHandler::from_name(&self.storage_handler)
    }

    /// Validate the configuration eagerly
    pub fn validate(&self) -> Result<(), SessionError> {
        self.handler()?;
        if self.expire_secs <= 0 {
            // A non-positive threshold would expire every returning session.
            return Err(SessionError::Config(format!(
                "expire_secs must be positive, got {}",
                self.expire_secs
            )));
        }
        Ok(())
    }
}

/// Load session configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SessionConfig, SessionError> {
    let path = path.as_ref();
    info!("Loading session configuration from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| {
        SessionError::Config(format!(
            "failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parse session configuration from YAML text
pub fn parse_config(contents: &str) -> Result<SessionConfig, SessionError> {
    let config: SessionConfig = serde_yaml::from_str(contents)
        .map_err(|e| SessionError::Config(format!("failed to parse YAML config: {}", e)))?;

    config.validate()?;
    info!(
        "Session configuration loaded: handler '{}', expiry {}s",
        config.storage_handler, config.expire_secs
    );
    Ok(config)
}

/// Load session configuration with fallback options: the
/// `SESSION_CONFIG_PATH` environment variable, then common file locations,
/// then built-in defaults.
pub fn load_config_with_fallback() -> SessionConfig {
    if let Ok(config_path) = std::env::var("SESSION_CONFIG_PATH") {
        match load_config(&config_path) {
            Ok(config) => return config,
            Err(e) => warn!(
                "Failed to load config from SESSION_CONFIG_PATH ({}): {}",
                config_path, e
            ),
        }
    }

    for path in ["session.yaml", "session.yml"] {
        if Path::new(path).exists() {
            match load_config(path) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to load config from '{}': {}", path, e),
            }
        }
    }

    SessionConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.storage_handler, "native");
        assert_eq!(config.expire_secs, 1800);
        assert_eq!(config.handler().unwrap(), StorageHandler::Native);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
storage_handler: memcached
expire_secs: 600
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.handler().unwrap(), StorageHandler::Memcached);
        assert_eq!(config.expire_secs, 600);
    }

    #[test]
    fn test_parse_applies_defaults_for_missing_fields() {
        let config = parse_config("storage_handler: native\n").unwrap();
        assert_eq!(config.expire_secs, DEFAULT_EXPIRE_SECS);
    }

    #[test]
    fn test_unknown_handler_fails_validation() {
        let result = parse_config("storage_handler: flatfile\n");
        assert!(matches!(
            result.err(),
            Some(SessionError::UnknownBackend(name)) if name == "flatfile"
        ));
    }

    #[test]
    fn test_non_positive_expiry_fails_validation() {
        for yaml in ["expire_secs: 0\n", "expire_secs: -300\n"] {
            let result = parse_config(yaml);
            assert!(matches!(result.err(), Some(SessionError::Config(_))));
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        std::fs::write(&path, "storage_handler: native\nexpire_secs: 900\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.expire_secs, 900);
    }
}
