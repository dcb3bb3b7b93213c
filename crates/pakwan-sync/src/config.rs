//! # Sync Configuration
//!
//! Where the dataset lives and how long we wait for it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PAKWAN_REMOTE_URL=https://pos.example.com                          │
//! │     PAKWAN_SYNC_MODE=offline                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pakwan-pos/pos.toml (Linux)                              │
//! │     ~/Library/Application Support/com.pakwan.pos/pos.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     online, no remote URL, 4s timeout, unpartitioned                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! mode = "online"  # online | offline
//!
//! [remote]
//! base_url = "https://pakwan-pos-default-rtdb.example.com"
//! root_path = "posData"
//! document_suffix = ".json"
//! timeout_secs = 4
//!
//! [partition]
//! enabled = false
//! reference_path = "reference"
//! orders_path = "orders"
//!
//! [cache]
//! database_path = "/var/lib/pakwan/pakwan.db"
//! slot_key = "posData"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use pakwan_core::MonthKey;
use pakwan_store::remote::join_path;
use pakwan_store::{HttpRemoteConfig, HttpRemoteStore, RemoteStore};

use crate::error::{SyncError, SyncResult};

/// Accepted range for the remote timeout, in seconds.
pub const REMOTE_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 3..=5;

// =============================================================================
// Sync Mode
// =============================================================================

/// Whether the terminal talks to the remote store at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Remote first, local cache as fallback.
    #[default]
    Online,

    /// Local cache and bundled data only.
    Offline,
}

impl SyncMode {
    pub fn is_remote_enabled(&self) -> bool {
        matches!(self, SyncMode::Online)
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Online => write!(f, "online"),
            SyncMode::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for SyncMode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" | "remote" => Ok(SyncMode::Online),
            "offline" | "local" | "disabled" => Ok(SyncMode::Offline),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown sync mode: '{}'. Valid options: online, offline",
                other
            ))),
        }
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Remote document store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the document store. No URL means no remote.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Path of the dataset document below the base URL.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Appended to every document path (`posData` → `posData.json`).
    #[serde(default = "default_document_suffix")]
    pub document_suffix: String,

    /// Upper bound on every remote call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Database secret, sent as the `auth` query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

fn default_root_path() -> String {
    "posData".to_string()
}

fn default_document_suffix() -> String {
    ".json".to_string()
}

fn default_timeout_secs() -> u64 {
    4
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: None,
            root_path: default_root_path(),
            document_suffix: default_document_suffix(),
            timeout_secs: default_timeout_secs(),
            auth_token: None,
        }
    }
}

// =============================================================================
// Partition Settings
// =============================================================================

/// Month partitioning of the remote ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Reference data document, relative to `root_path`.
    #[serde(default = "default_reference_path")]
    pub reference_path: String,

    /// Parent of the per-month order documents, relative to `root_path`.
    #[serde(default = "default_orders_path")]
    pub orders_path: String,
}

fn default_reference_path() -> String {
    "reference".to_string()
}

fn default_orders_path() -> String {
    "orders".to_string()
}

impl Default for PartitionSettings {
    fn default() -> Self {
        PartitionSettings {
            enabled: false,
            reference_path: default_reference_path(),
            orders_path: default_orders_path(),
        }
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_slot_key")]
    pub slot_key: String,
}

fn default_slot_key() -> String {
    pakwan_store::DEFAULT_SLOT_KEY.to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            database_path: None,
            slot_key: default_slot_key(),
        }
    }
}

// =============================================================================
// Remote Layout
// =============================================================================

/// Document paths on the remote store, resolved from the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    /// Whole dataset (unpartitioned mode).
    pub dataset_path: String,
    /// Everything except orders (partitioned mode).
    pub reference_path: String,
    /// Parent of `YYYY-MM` order documents (partitioned mode).
    pub orders_path: String,
    pub partitioned: bool,
}

impl RemoteLayout {
    /// `posData/orders/2025-03`
    pub fn month_path(&self, month: MonthKey) -> String {
        join_path(&[self.orders_path.as_str(), month.to_string().as_str()])
    }
}

impl Default for RemoteLayout {
    fn default() -> Self {
        SyncConfig::default().layout()
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Online or offline.
    #[serde(default)]
    pub mode: SyncMode,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub partition: PartitionSettings,

    #[serde(default)]
    pub cache: CacheSettings,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(ref base) = self.remote.base_url {
            let url = url::Url::parse(base)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(SyncError::InvalidUrl(format!(
                    "Remote URL must start with http:// or https://, got: {}",
                    base
                )));
            }
        }

        if !REMOTE_TIMEOUT_RANGE.contains(&self.remote.timeout_secs) {
            return Err(SyncError::InvalidConfig(format!(
                "remote.timeout_secs must be between {} and {}, got {}",
                REMOTE_TIMEOUT_RANGE.start(),
                REMOTE_TIMEOUT_RANGE.end(),
                self.remote.timeout_secs
            )));
        }

        if join_path(&[self.remote.root_path.as_str()]).is_empty() {
            return Err(SyncError::InvalidConfig("remote.root_path must not be empty".into()));
        }

        if self.partition.enabled
            && join_path(&[self.partition.reference_path.as_str()])
                == join_path(&[self.partition.orders_path.as_str()])
        {
            return Err(SyncError::InvalidConfig(
                "partition.reference_path and partition.orders_path must differ".into(),
            ));
        }

        if self.cache.slot_key.trim().is_empty() {
            return Err(SyncError::InvalidConfig("cache.slot_key must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `PAKWAN_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("PAKWAN_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.base_url = (!url.trim().is_empty()).then_some(url);
        }

        if let Some(secs) = var("PAKWAN_REMOTE_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.remote.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric PAKWAN_REMOTE_TIMEOUT_SECS"),
            }
        }

        if let Some(token) = var("PAKWAN_REMOTE_AUTH") {
            self.remote.auth_token = Some(token);
        }

        if let Some(mode) = var("PAKWAN_SYNC_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding sync mode from environment");
                    self.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown sync mode in environment"),
            }
        }

        if let Some(flag) = var("PAKWAN_PARTITION_BY_MONTH") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.partition.enabled = true,
                "0" | "false" | "no" | "off" => self.partition.enabled = false,
                _ => warn!(value = %flag, "Ignoring invalid PAKWAN_PARTITION_BY_MONTH"),
            }
        }

        if let Some(path) = var("PAKWAN_CACHE_PATH") {
            self.cache.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pakwan", "pos")
            .map(|dirs| dirs.config_dir().join("pos.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// True when a remote client should be built.
    pub fn is_remote_enabled(&self) -> bool {
        self.mode.is_remote_enabled() && self.remote.base_url.is_some()
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    /// SQLite cache file: explicit path, else the platform data directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.cache.database_path {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "pakwan", "pos")
            .map(|dirs| dirs.data_dir().join("pakwan.db"))
            .unwrap_or_else(|| PathBuf::from("pakwan.db"))
    }

    pub fn layout(&self) -> RemoteLayout {
        let root = self.remote.root_path.as_str();
        RemoteLayout {
            dataset_path: join_path(&[root]),
            reference_path: join_path(&[root, self.partition.reference_path.as_str()]),
            orders_path: join_path(&[root, self.partition.orders_path.as_str()]),
            partitioned: self.partition.enabled,
        }
    }

    /// Builds the HTTP remote client, or `None` when offline or unconfigured.
    pub fn build_remote(&self) -> SyncResult<Option<Arc<dyn RemoteStore>>> {
        let Some(base_url) = self.remote.base_url.clone().filter(|_| self.mode.is_remote_enabled())
        else {
            info!(mode = %self.mode, "Remote store disabled");
            return Ok(None);
        };

        let client = HttpRemoteStore::new(HttpRemoteConfig {
            base_url,
            document_suffix: self.remote.document_suffix.clone(),
            request_timeout: self.remote_timeout(),
            auth_token: self.remote.auth_token.clone(),
        })?;
        Ok(Some(Arc::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_sync_mode_parsing() {
        assert_eq!("online".parse::<SyncMode>().unwrap(), SyncMode::Online);
        assert_eq!("OFFLINE".parse::<SyncMode>().unwrap(), SyncMode::Offline);
        assert_eq!("local".parse::<SyncMode>().unwrap(), SyncMode::Offline);
        assert!("hub".parse::<SyncMode>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.mode, SyncMode::Online);
        assert_eq!(config.remote.timeout_secs, 4);
        assert_eq!(config.cache.slot_key, "posData");
        assert!(!config.is_remote_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.remote.timeout_secs = 30;
        assert!(config.validate().is_err());
        config.remote.timeout_secs = 3;
        assert!(config.validate().is_ok());

        config.remote.base_url = Some("ws://localhost:8080".into());
        assert!(config.validate().unwrap_err().is_config_error());
        config.remote.base_url = Some("https://pos.example.com".into());
        assert!(config.validate().is_ok());

        config.partition.enabled = true;
        config.partition.orders_path = "reference/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SyncConfig::default();
        config.apply_overrides(env(&[
            ("PAKWAN_REMOTE_URL", "https://pos.example.com"),
            ("PAKWAN_REMOTE_TIMEOUT_SECS", "5"),
            ("PAKWAN_SYNC_MODE", "offline"),
            ("PAKWAN_PARTITION_BY_MONTH", "true"),
            ("PAKWAN_CACHE_PATH", "/tmp/pakwan-test.db"),
        ]));

        assert_eq!(config.remote.base_url.as_deref(), Some("https://pos.example.com"));
        assert_eq!(config.remote.timeout_secs, 5);
        assert_eq!(config.mode, SyncMode::Offline);
        assert!(config.partition.enabled);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/pakwan-test.db"));
        assert!(!config.is_remote_enabled());
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = SyncConfig::default();
        config.apply_overrides(env(&[
            ("PAKWAN_REMOTE_TIMEOUT_SECS", "soon"),
            ("PAKWAN_SYNC_MODE", "sideways"),
        ]));
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn test_layout_paths() {
        let mut config = SyncConfig::default();
        config.partition.enabled = true;
        let layout = config.layout();

        assert_eq!(layout.dataset_path, "posData");
        assert_eq!(layout.reference_path, "posData/reference");
        assert_eq!(
            layout.month_path(MonthKey::new(2025, 3).unwrap()),
            "posData/orders/2025-03"
        );
    }

    #[test]
    fn test_build_remote_respects_mode() {
        let mut config = SyncConfig::default();
        assert!(config.build_remote().unwrap().is_none());

        config.remote.base_url = Some("https://pos.example.com".into());
        assert!(config.build_remote().unwrap().is_some());

        config.mode = SyncMode::Offline;
        assert!(config.build_remote().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("pos.toml");

        let mut config = SyncConfig::default();
        config.remote.base_url = Some("https://pos.example.com".into());
        config.partition.enabled = true;
        config.cache.database_path = Some(dir.path().join("pakwan.db"));
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[remote]"));
        assert!(contents.contains("[partition]"));

        let loaded: SyncConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let config: SyncConfig = toml::from_str("mode = \"offline\"\n[remote]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.mode, SyncMode::Offline);
        assert_eq!(config.remote.timeout_secs, 5);
        assert_eq!(config.remote.root_path, "posData");
        assert_eq!(config.partition, PartitionSettings::default());
    }
}
