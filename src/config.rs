// src/config.rs

//! Application configuration and persisted watcher state.
//!
//! Settings that describe the environment (HTTP session, delivery
//! template) live in a TOML config file. Settings the watcher mutates at
//! runtime (polling interval, watch list) go through a [`ConfigStore`],
//! a flat key/value surface the embedding host backs however it likes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP session settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Delivery presentation settings
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.base_url.trim().is_empty() {
            return Err(AppError::config("http.base_url is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.delivery.template.trim().is_empty() {
            return Err(AppError::config("delivery.template is empty"));
        }
        Ok(())
    }
}

/// HTTP session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL of the site hosting the profile pages
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Login form path POSTed to by `authenticate`
    #[serde(default = "defaults::login_path")]
    pub login_path: String,

    /// Account name submitted on login; leave unset for public pages
    #[serde(default)]
    pub username: Option<String>,

    /// Password submitted on login
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            login_path: defaults::login_path(),
            username: None,
            password: None,
        }
    }
}

/// Delivery presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Template applied to each delivered record; see
    /// `PostRecord::format` for the supported placeholders
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "https://twitter.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pagewatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn login_path() -> String {
        "/login".into()
    }
    pub fn template() -> String {
        "{display_name} (@{handle}): {text} [{source_client}]".into()
    }
}

/// Host-backed persistence for watcher state.
///
/// The watcher stores two flat string values: `interval` (seconds) and
/// `targets` (comma-joined screen names). Reads happen once at
/// construction, writes on every accepted control command.
pub trait ConfigStore: Send + Sync {
    /// Read a stored value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a stored value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store keeping values as a flat TOML table.
pub struct TomlStateStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlStateStore {
    /// Open the store at `path`, starting empty if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }
}

impl ConfigStore for TomlStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        let serialized = toml::to_string(&*values)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write to a temp file, then rename; the state file is never
        // left half-written.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
