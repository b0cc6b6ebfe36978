use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::integration::{SessionIdentity, DEFAULT_ORG_ID, DEFAULT_USER_ID};

/// Complete hub configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Integrations backend
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Identity a new session starts with
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_org_id")]
    pub org_id: String,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_org_id() -> String {
    DEFAULT_ORG_ID.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            org_id: default_org_id(),
        }
    }
}

impl SessionConfig {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(&self.user_id, &self.org_id)
    }
}

/// Provider connection flows
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Delay between credential polls while the user authorizes (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polls before a connection attempt is abandoned
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_poll_attempts() -> u32 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl ProviderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl HubConfig {
    /// Load from the file named by `HUB_CONFIG` (defaults if unset), then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let config = match std::env::var("HUB_CONFIG") {
            Ok(path) => load_config(&path)?,
            Err(_) => HubConfig::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Override fields from `HUB_*` variables resolved through `lookup`.
    /// Unparseable numeric values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("HUB_BACKEND_URL") {
            self.backend.base_url = v;
        }
        if let Some(v) = lookup("HUB_USER_ID") {
            self.session.user_id = v;
        }
        if let Some(v) = lookup("HUB_ORG_ID") {
            self.session.org_id = v;
        }
        if let Some(v) = lookup("HUB_POLL_INTERVAL_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.provider.poll_interval_ms = n;
            }
        }
        if let Some(v) = lookup("HUB_MAX_POLL_ATTEMPTS") {
            if let Ok(n) = v.parse::<u32>() {
                self.provider.max_poll_attempts = n;
            }
        }
        self
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<HubConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: HubConfig =
        toml::from_str(&contents).with_context(|| format!("Invalid config file {}", path))?;
    Ok(config)
}
