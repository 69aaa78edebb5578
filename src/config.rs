//! Configuration Management
//!
//! Handles persistent configuration storage for the `nah` command-line tool
//! and resolves the effective client settings from flags, environment and
//! the config file.

use crate::nah::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the endpoint
pub const ENDPOINT_ENV: &str = "NAH_ENDPOINT";

/// Environment variable consulted for the API token
pub const TOKEN_ENV: &str = "NAH_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// API endpoint base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Non-empty value of an environment variable
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nah").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; missing or unreadable files yield defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective endpoint (CLI > NAH_ENDPOINT > config > default)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> String {
        non_empty(cli)
            .or_else(|| env_value(ENDPOINT_ENV))
            .or_else(|| non_empty(self.endpoint.as_deref()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective token (CLI > NAH_TOKEN > config); `None` means unauthenticated
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        non_empty(cli)
            .or_else(|| env_value(TOKEN_ENV))
            .or_else(|| non_empty(self.token.as_deref()))
    }

    /// Get effective request timeout (CLI > config > default)
    pub fn effective_timeout(&self, cli: Option<u64>) -> Duration {
        cli.or(self.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Resolve everything into a client configuration
    pub fn client_config(
        &self,
        endpoint: Option<&str>,
        token: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> ClientConfig {
        ClientConfig {
            endpoint: self.effective_endpoint(endpoint),
            token: self.effective_token(token),
            timeout: self.effective_timeout(timeout_secs),
        }
    }
}
