//! Configuration management for netforge
//!
//! Configuration comes from built-in defaults, an optional TOML file, and
//! `NETFORGE_<SECTION>_<KEY>` environment variables, applied in that order.

use crate::logging::LogLevel;
use crate::topology::LinkPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Signing key used when none is configured. Fine for local development only.
pub const DEFAULT_SECRET_KEY: &str = "netforge-development-secret-change-me";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub topology: TopologyConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// How long in-flight requests get to finish after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled connections
    pub pool_size: u32,

    /// How long a connection waits on a locked database before failing
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,

    /// Enable SQLite write-ahead logging
    pub enable_wal: bool,
}

/// Credential configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC key for bearer tokens
    pub secret_key: String,

    /// Lifetime of issued bearer tokens
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

/// Topology replacement behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// What to do with links whose client ids do not resolve
    pub link_policy: LinkPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/netforge.db"),
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
            enable_wal: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            token_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

fn parse_override<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        message: e.to_string(),
    })
}

impl Config {
    /// Defaults overridden by environment variables
    ///
    /// Environment variables follow the pattern: NETFORGE_<SECTION>_<KEY>
    /// Example: NETFORGE_SERVER_BIND_ADDRESS=0.0.0.0:8000
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// File (when given) and then environment, validated once at the end
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read_toml(path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse `path` without validating it
    fn read_toml(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `NETFORGE_*` overrides obtained through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("NETFORGE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = parse_override("NETFORGE_SERVER_BIND_ADDRESS", &raw)?;
        }

        if let Some(raw) = lookup("NETFORGE_STORE_DATABASE_PATH") {
            self.store.database_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("NETFORGE_STORE_POOL_SIZE") {
            self.store.pool_size = parse_override("NETFORGE_STORE_POOL_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("NETFORGE_STORE_ENABLE_WAL") {
            self.store.enable_wal = parse_override("NETFORGE_STORE_ENABLE_WAL", &raw)?;
        }

        if let Some(raw) = lookup("NETFORGE_AUTH_SECRET_KEY") {
            self.auth.secret_key = raw;
        }
        if let Some(raw) = lookup("NETFORGE_AUTH_TOKEN_TTL_SECS") {
            let secs: u64 = parse_override("NETFORGE_AUTH_TOKEN_TTL_SECS", &raw)?;
            self.auth.token_ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("NETFORGE_LOG_LEVEL") {
            self.logging.level = raw;
        }
        if let Some(raw) = lookup("NETFORGE_LOG_JSON") {
            self.logging.json_format = parse_override("NETFORGE_LOG_JSON", &raw)?;
        }

        if let Some(raw) = lookup("NETFORGE_TOPOLOGY_LINK_POLICY") {
            self.topology.link_policy = parse_override("NETFORGE_TOPOLOGY_LINK_POLICY", &raw)?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.pool_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "store.pool_size must be greater than 0".to_string(),
            ));
        }

        if self.store.database_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "store.database_path must not be empty".to_string(),
            ));
        }

        if self.auth.secret_key.len() < 16 {
            return Err(ConfigError::ValidationFailed(
                "auth.secret_key must be at least 16 bytes".to_string(),
            ));
        }

        if self.auth.token_ttl.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "auth.token_ttl must be greater than 0".to_string(),
            ));
        }

        if LogLevel::from_str(&self.logging.level).is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.auth.uses_default_secret());
        assert_eq!(config.topology.link_policy, LinkPolicy::Lenient);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.store.pool_size = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.auth.secret_key = "short".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.auth.token_ttl = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();

        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("NETFORGE_SERVER_BIND_ADDRESS", "0.0.0.0:9000"),
                ("NETFORGE_STORE_DATABASE_PATH", "/tmp/nf.db"),
                ("NETFORGE_AUTH_TOKEN_TTL_SECS", "60"),
                ("NETFORGE_TOPOLOGY_LINK_POLICY", "strict"),
                ("NETFORGE_LOG_JSON", "true"),
            ]))
            .unwrap();

        assert_eq!(config.server.bind_address.port(), 9000);
        assert_eq!(config.store.database_path, PathBuf::from("/tmp/nf.db"));
        assert_eq!(config.auth.token_ttl, Duration::from_secs(60));
        assert_eq!(config.topology.link_policy, LinkPolicy::Strict);
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_invalid_env_override_names_the_key() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup_from(&[("NETFORGE_STORE_POOL_SIZE", "many")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "NETFORGE_STORE_POOL_SIZE", .. }
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netforge.toml");
        std::fs::write(
            &path,
            r#"
            [auth]
            secret_key = "a-much-longer-production-secret"
            token_ttl = "2h"

            [topology]
            link_policy = "strict"
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.auth.token_ttl, Duration::from_secs(2 * 60 * 60));
        assert!(!config.auth.uses_default_secret());
        assert_eq!(config.topology.link_policy, LinkPolicy::Strict);
        assert_eq!(config.store.pool_size, StoreConfig::default().pool_size);
    }

    #[test]
    fn test_load_and_from_file_share_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netforge.toml");
        std::fs::write(&path, "[store]\npool_size = 4\n").unwrap();

        assert_eq!(Config::load(Some(path.as_path())).unwrap().store.pool_size, 4);
        assert_eq!(Config::from_file(&path).unwrap().store.pool_size, 4);

        std::fs::write(&path, "[store\npool_size = ").unwrap();
        assert!(matches!(Config::load(Some(path.as_path())), Err(ConfigError::ParseError(_))));
        assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError(_))));

        let missing = dir.path().join("absent.toml");
        assert!(matches!(Config::load(Some(missing.as_path())), Err(ConfigError::FileReadError(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = Config::default();
        config.store.pool_size = 3;
        config.save_to_file(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.store.pool_size, 3);
        assert_eq!(reloaded.server.bind_address, config.server.bind_address);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::default();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(DEFAULT_SECRET_KEY));
        assert!(rendered.contains("REDACTED"));
    }
}
