//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the artifact service URL, the identity provider's API key, an optional
//! auth emulator host, the request timeout, and the last used email.
//!
//! Configuration is stored at `~/.config/relicveil/config.json`. Environment
//! variables override the file; the CLI loads `.env` before reading them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_TIMEOUT_SECS;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "relicveil";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Artifact service used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub const API_URL_ENV: &str = "RELICVEIL_API_URL";
pub const FIREBASE_API_KEY_ENV: &str = "RELICVEIL_FIREBASE_API_KEY";
pub const AUTH_EMULATOR_HOST_ENV: &str = "RELICVEIL_AUTH_EMULATOR_HOST";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub firebase_api_key: Option<String>,
    pub auth_emulator_host: Option<String>,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            firebase_api_key: None,
            auth_emulator_host: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from variables found by `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = var(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(key) = var(FIREBASE_API_KEY_ENV) {
            self.firebase_api_key = Some(key);
        }
        if let Some(host) = var(AUTH_EMULATOR_HOST_ENV) {
            self.auth_emulator_host = Some(host);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
