//! Dashboard configuration loading
//!
//! Resolution priority, highest first:
//! 1. Command-line argument or its environment variable (handled by clap)
//! 2. TOML config file (`--config` or `<config_dir>/scriptorium/config.toml`)
//! 3. `VITE_API_URL` for the API URL only (legacy deployments)
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_API_URL;
use crate::{Error, Result};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable honoured by older deployments for the backend URL
pub const LEGACY_API_URL_ENV: &str = "VITE_API_URL";

/// Effective dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardConfig {
    pub api_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Values supplied on the command line (or via their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_secs: Option<u64>,
}

/// On-disk configuration; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Load a TOML config file.
    ///
    /// Returns `Ok(None)` when the file does not exist and `Error::Config`
    /// when it exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "Loaded config file");
        Ok(Some(config))
    }
}

/// Platform config file location, e.g. `~/.config/scriptorium/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scriptorium").join("config.toml"))
}

impl DashboardConfig {
    /// Resolve the effective configuration from overrides, environment,
    /// config file and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let path = overrides.config_path.clone().or_else(default_config_path);
        let file = match path {
            Some(path) => TomlConfig::load(&path)?,
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                None
            }
        };

        let legacy_api_url = std::env::var(LEGACY_API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());

        let config = Self::merge(overrides, legacy_api_url, file.unwrap_or_default());
        config.validate()?;
        Ok(config)
    }

    /// Layer overrides and file values over defaults; the legacy URL
    /// variable only fills an API URL that neither of them sets
    pub fn merge(
        overrides: &ConfigOverrides,
        legacy_api_url: Option<String>,
        file: TomlConfig,
    ) -> Self {
        let defaults = Self::default();
        Self {
            api_url: overrides
                .api_url
                .clone()
                .or(file.api_url)
                .or(legacy_api_url)
                .unwrap_or(defaults.api_url),
            bind_addr: overrides
                .bind_addr
                .clone()
                .or(file.bind_addr)
                .unwrap_or(defaults.bind_addr),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            request_timeout_secs: overrides
                .request_timeout_secs
                .or(file.request_timeout_secs)
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("api_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Listen address for the dashboard server
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind_addr {:?}: {}", self.bind_addr, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
