//! Configuration management for the Grid CLI tools
//!
//! Configuration lives in TOML with multiple named profiles, one per
//! subscription/environment. Resolution order for every knob is CLI flag >
//! environment variable > profile value > built-in default; the flag and
//! environment layers are applied by the binaries, this module only owns the
//! file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::poll::PollConfig;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One named connection to the Grid platform
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Profile {
    /// Subscription all cluster operations run against
    pub subscription_id: String,
    /// Control plane endpoint; the public endpoint when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Identity endpoint that issues bearer tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Resource group cluster operations default to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    /// Defaults applied to `create` when flags are omitted
    #[serde(default)]
    pub cluster: ClusterDefaults,
    /// Polling knobs shared by every waiting component
    #[serde(default)]
    pub poll: PollSettings,
    /// Storage account holding the diagnostic log tables (gridlogs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSettings>,
}

/// Cluster shape defaults for `create`
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ClusterDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_nodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_public_key_path: Option<String>,
}

/// Timing knobs, all overridable per invocation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct PollSettings {
    /// Seconds between poll ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
    /// Minutes before a watched operation times out; 0 disables monitoring
    /// beyond the initial check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_mins: Option<u64>,
    /// Age in hours past which `delete-stale` considers a cluster stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_cutoff_hours: Option<i64>,
    /// Delete a cluster automatically when its create fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_on_error: Option<bool>,
}

impl PollSettings {
    pub const DEFAULT_DELETE_CUTOFF_HOURS: i64 = 24;

    /// Fold these settings over the built-in defaults
    pub fn to_poll_config(self) -> PollConfig {
        PollConfig {
            interval: self
                .interval_secs
                .map(Duration::from_secs)
                .unwrap_or(PollConfig::DEFAULT_INTERVAL),
            timeout: self
                .timeout_mins
                .map(|mins| Duration::from_secs(mins * 60))
                .unwrap_or(PollConfig::DEFAULT_TIMEOUT),
        }
    }
}

/// Storage account settings for the log downloader
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StorageSettings {
    pub account: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_suffix: Option<String>,
    /// Exact log table name; when unset the table is discovered by prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<String>,
}

impl Config {
    /// Load from the default platform location; a missing file is an empty
    /// configuration, not an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Save to the default platform location, creating parent directories
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::Config(format!("cannot create {}: {e}", parent.display())))?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("cannot serialize configuration: {e}")))?;
        fs::write(path, raw)
            .map_err(|e| CoreError::Config(format!("cannot write {}: {e}", path.display())))
    }

    /// Default configuration file location
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "gridplatform", "gridctl")
            .ok_or_else(|| CoreError::Config("cannot determine config directory".to_string()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve `explicit` or fall back to the configured default profile.
    pub fn resolve_profile<'a>(
        &'a self,
        explicit: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile)> {
        let name = match explicit {
            Some(name) => name,
            None => self.default_profile.as_deref().ok_or_else(|| {
                CoreError::Config(
                    "no profile named and no default_profile configured".to_string(),
                )
            })?,
        };
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| CoreError::Config(format!("profile '{name}' not found")))?;
        Ok((name, profile))
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        if self.profiles.is_empty() && self.default_profile.is_none() {
            self.default_profile = Some(name.clone());
        }
        self.profiles.insert(name, profile);
    }
}
