//! Configuration types for Tessera.
//!
//! Configuration is loaded from a single YAML file (`tessera.yaml` by
//! default). Every section is optional and falls back to defaults, so an
//! empty file is a valid configuration that connects to `$DATABASE_URL`.

pub mod tenancy;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use tenancy::TenancyConfig;
pub use upstream::{PoolConfig, UpstreamConfig};

/// Complete Tessera configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TesseraConfig {
    /// Project name, informational only.
    #[serde(default)]
    pub project: Option<String>,

    /// Shared Postgres database.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Tenant header names.
    #[serde(default)]
    pub tenancy: TenancyConfig,

    /// Session token settings.
    #[serde(default)]
    pub token: TokenConfig,

    /// Logging.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
        }
    }
}

impl ServerConfig {
    /// `addr:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }
}

/// Session token configuration.
///
/// The signing key is deliberately absent: it is generated in memory at
/// startup and never read from or written to configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token lifetime in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `tracing-subscriber` env-filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TesseraConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document for a struct
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.ttl_seconds == 0 {
            return Err(ConfigError::Config(
                "token.ttl_seconds must be greater than zero".to_string(),
            ));
        }

        let pool = &self.upstream.pool;
        if pool.max_connections == 0 {
            return Err(ConfigError::Config(
                "upstream.pool.max_connections must be greater than zero".to_string(),
            ));
        }
        if pool.min_connections > pool.max_connections {
            return Err(ConfigError::Config(format!(
                "upstream.pool.min_connections ({}) exceeds max_connections ({})",
                pool.min_connections, pool.max_connections
            )));
        }
        if pool.acquire_timeout_seconds == 0 {
            return Err(ConfigError::Config(
                "upstream.pool.acquire_timeout_seconds must be greater than zero".to_string(),
            ));
        }

        for header in self.tenancy.headers() {
            if header.trim().is_empty() {
                return Err(ConfigError::Config(
                    "tenancy header names must not be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_ttl_seconds() -> u64 {
    3600
}

fn default_log_filter() -> String {
    "info".to_string()
}
