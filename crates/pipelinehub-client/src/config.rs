//! Client configuration.
//!
//! Resolution order for the config file:
//! 1. An explicit path
//! 2. `PIPELINEHUB_CONFIG`
//! 3. `<config dir>/pipelinehub/config.toml`
//!
//! A missing default file yields defaults; a missing explicit file is an
//! error. Environment variables then override individual `[api]` keys.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::wire::DEFAULT_PAGE_LIMIT;

/// Project name used for the config directory and env prefix.
pub const PROJECT_NAME: &str = "pipelinehub";

/// Env var naming the config file.
pub const ENV_CONFIG: &str = "PIPELINEHUB_CONFIG";
/// Env var overriding `api.base_url`.
pub const ENV_API_URL: &str = "PIPELINEHUB_API_URL";
/// Env var overriding `api.project_id`.
pub const ENV_PROJECT_ID: &str = "PIPELINEHUB_PROJECT_ID";
/// Env var overriding `api.public_key`.
pub const ENV_PUBLIC_KEY: &str = "PIPELINEHUB_PUBLIC_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmConfig {
    /// Record API connection
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

/// Record API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; empty selects the in-memory backend
    #[serde(default)]
    pub base_url: String,
    /// Project identifier sent with every request
    #[serde(default)]
    pub project_id: String,
    /// Public API key
    #[serde(default)]
    pub public_key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Page size for list queries
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project_id: String::new(),
            public_key: String::new(),
            timeout_secs: default_timeout_secs(),
            page_limit: default_page_limit(),
        }
    }
}

impl ApiConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl CrmConfig {
    /// Default config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Resolves the config file path without touching the filesystem.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_with(explicit, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        explicit: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Some(path) = env(ENV_CONFIG).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Loads configuration, applying process environment overrides.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Loads configuration using `env` as the environment.
    pub fn load_with(explicit: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match Self::resolve_with(explicit, &env) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if explicit.is_some() => {
                return Err(Error::io_with_path(
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                    path,
                ));
            }
            _ => Self::default(),
        };
        config.apply_overrides(env);
        Ok(config)
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Applies `PIPELINEHUB_*` overrides from `env`.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(project) = env(ENV_PROJECT_ID) {
            self.api.project_id = project;
        }
        if let Some(key) = env(ENV_PUBLIC_KEY) {
            self.api.public_key = key;
        }
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
