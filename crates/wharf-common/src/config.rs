//! Process-wide configuration.
//!
//! Settings are loaded once from a YAML file and kept in a global store that
//! can be replaced or updated at any time. Readers take a fresh copy on every
//! access, so a change is visible to the next caller.

use std::path::Path;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{WharfError, WharfResult};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wharf/config.yml";

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Docker environment settings.
    pub docker: DockerSettings,
}

/// Docker environment settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    /// Network settings for server containers.
    pub network: DockerNetworkSettings,
}

/// Network settings for server containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerNetworkSettings {
    /// Host-side IP of the bridge interface that replaces loopback bindings.
    pub interface: String,
    /// Isolated network mode: drop loopback bindings instead of rewriting them.
    pub ispn: bool,
    /// Name of the bridge network servers are attached to.
    pub name: String,
}

impl Default for DockerNetworkSettings {
    fn default() -> Self {
        Self {
            interface: "172.18.0.1".to_string(),
            ispn: false,
            name: "wharf_nw".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a YAML document.
    pub fn from_yaml(contents: &str) -> WharfResult<Self> {
        // An empty file is a valid, all-defaults configuration.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> WharfResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&contents).map_err(|e| WharfError::Config {
            message: format!("{}: {e}", path.display()),
        })?;

        tracing::debug!(
            path = %path.display(),
            interface = %settings.docker.network.interface,
            ispn = settings.docker.network.ispn,
            "Configuration loaded"
        );
        Ok(settings)
    }

    /// Set the bridge interface address.
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.docker.network.interface = interface.into();
        self
    }

    /// Enable or disable isolated network mode.
    #[must_use]
    pub fn with_ispn(mut self, ispn: bool) -> Self {
        self.docker.network.ispn = ispn;
        self
    }
}

/// Get a copy of the current process-wide settings.
#[must_use]
pub fn get() -> Settings {
    SETTINGS.read().clone()
}

/// Replace the process-wide settings.
pub fn set(settings: Settings) {
    *SETTINGS.write() = settings;
}

/// Modify the process-wide settings in place.
pub fn update(f: impl FnOnce(&mut Settings)) {
    f(&mut *SETTINGS.write());
}
