//! Configuration handling for the TUI

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_API_ADDRESS;

/// Environment variable overriding the configured backend address
pub const API_ADDRESS_ENV: &str = "RESONATE_ID_API_ADDRESS";

/// User configuration for the portal client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PortalConfig {
    /// Base URL of the account portal backend
    pub api_address: Option<String>,
    /// Domain shown in titles and used for app hostname hints
    pub app_domain: Option<String>,
    /// How long a request may run before the loader shows
    pub loader_delay_ms: Option<u64>,
    /// Default toast lifetime
    pub notification_timeout_secs: Option<u64>,
    /// Per-request timeout
    pub request_timeout_secs: Option<u64>,
}

impl PortalConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("coop", "resonate", "resonate-id")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, then apply the environment override
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        if let Ok(address) = std::env::var(API_ADDRESS_ENV) {
            config = config.with_api_address(address);
        }
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: PortalConfig = serde_json::from_str(&content)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn with_api_address(mut self, address: String) -> Self {
        let address = address.trim();
        if !address.is_empty() {
            self.api_address = Some(address.to_string());
        }
        self
    }

    pub fn api_address(&self) -> &str {
        self.api_address.as_deref().unwrap_or(DEFAULT_API_ADDRESS)
    }

    pub fn app_domain(&self) -> &str {
        self.app_domain.as_deref().unwrap_or("resonate.coop")
    }

    pub fn loader_delay(&self) -> Duration {
        Duration::from_millis(self.loader_delay_ms.unwrap_or(300))
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs.unwrap_or(5))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(30))
    }
}
