//! Global configuration and the per-user sap directory.
//!
//! The sap directory (`~/.sap` by default, or `$SAP_HOME`) holds:
//!
//! - `config.toml` - this configuration
//! - `manifest.json` - packages installed on this machine
//! - `cache/` - scratch space for downloads
//! - `registry/` - the directory backing the default package server
//!
//! # Configuration File
//!
//! ```toml
//! server = "packages.internal"
//! port = 8080
//! registry_dir = "/srv/sap/registry"
//! ```
//!
//! Every field is optional. The server host is resolved with the following
//! precedence, highest first:
//!
//! 1. the `--server` command line flag
//! 2. the `SAP_SERVER` environment variable
//! 3. `server` in `config.toml`
//! 4. `localhost`

use crate::constants::{
    CACHE_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MANIFEST_FILE_NAME, REGISTRY_DIR_NAME, SAP_HOME_ENV, SAP_SERVER_ENV,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves the sap directory: `$SAP_HOME` when set, otherwise `~/.sap`.
///
/// # Errors
///
/// Returns an error if `SAP_HOME` is unset and the home directory cannot be
/// determined.
pub fn sap_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(SAP_HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
        .join(".sap"))
}

/// Global user configuration stored in `<sap dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Package server host
    pub server: String,

    /// Package server port
    pub port: u16,

    /// Directory backing the registry server. Relative paths are resolved
    /// against the sap directory; `None` means `<sap dir>/registry`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_dir: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            registry_dir: None,
        }
    }
}

impl GlobalConfig {
    /// Loads `config.toml` from `sap_dir`, falling back to defaults when the
    /// file does not exist. `SAP_SERVER` is applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(sap_dir: &Path) -> Result<Self> {
        let path = sap_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(server) = std::env::var(SAP_SERVER_ENV) {
            if !server.trim().is_empty() {
                config.server = server.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Loads a configuration file from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Writes the configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;
        crate::utils::atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// Replaces the server host when `server` is given.
    #[must_use]
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.server = server;
        }
        self
    }

    /// The registry directory, resolved against `sap_dir`.
    #[must_use]
    pub fn registry_dir(&self, sap_dir: &Path) -> PathBuf {
        match &self.registry_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => sap_dir.join(dir),
            None => sap_dir.join(REGISTRY_DIR_NAME),
        }
    }
}

/// Path of the installed-package manifest inside `sap_dir`.
#[must_use]
pub fn manifest_path(sap_dir: &Path) -> PathBuf {
    sap_dir.join(MANIFEST_FILE_NAME)
}

/// Path of the download cache inside `sap_dir`.
#[must_use]
pub fn cache_dir(sap_dir: &Path) -> PathBuf {
    sap_dir.join(CACHE_DIR_NAME)
}
