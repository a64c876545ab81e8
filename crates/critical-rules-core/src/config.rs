//! Configuration types for the critical rules server.

use crate::error::RulesError;
use critical_rules_store::{BootstrapDefaults, RulesStore, StoreLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default data directory.
pub const DATA_DIR_ENV: &str = "CRITICAL_RULES_HOME";

/// Upstream location of the rules document.
pub const DEFAULT_CONTENT_URL: &str =
    "https://raw.githubusercontent.com/optimaquantum/claude-critical-rules-mcp/main/CRITICAL-RULES.md";

/// Upstream location of the version descriptor.
pub const DEFAULT_VERSION_URL: &str =
    "https://raw.githubusercontent.com/optimaquantum/claude-critical-rules-mcp/main/version.json";

/// Upstream location of the changelog.
pub const DEFAULT_CHANGELOG_URL: &str =
    "https://raw.githubusercontent.com/optimaquantum/claude-critical-rules-mcp/main/CHANGELOG.md";

/// Top-level configuration.
///
/// Every section has defaults, so an empty TOML file (or no file at all)
/// yields a working configuration.
///
/// ```toml
/// [storage]
/// data_dir = "/var/lib/critical-rules"
///
/// [remote]
/// timeout_secs = 10
///
/// [bootstrap]
/// version = "1.0.0"
/// rule_count = 96
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Where the installed rules live.
    pub storage: StorageConfig,

    /// Where updates come from.
    pub remote: RemoteConfig,

    /// Values for the first-run version record.
    pub bootstrap: BootstrapDefaults,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory holding the document, record, changelog and backups.
    pub data_dir: PathBuf,

    /// File names inside the data directory.
    #[serde(flatten)]
    pub layout: StoreLayout,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            layout: StoreLayout::default(),
        }
    }
}

/// Remote source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// URL of the rules document.
    pub content_url: String,

    /// URL of the version descriptor.
    pub version_url: String,

    /// URL of the changelog.
    pub changelog_url: String,

    /// Per-request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            content_url: DEFAULT_CONTENT_URL.to_string(),
            version_url: DEFAULT_VERSION_URL.to_string(),
            changelog_url: DEFAULT_CHANGELOG_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl RulesConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, RulesError> {
        toml::from_str(text).map_err(|e| RulesError::Config(e.to_string()))
    }

    /// Loads configuration from `path`, or defaults when the file is absent.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(RulesError::Config(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), RulesError> {
        for (name, url) in [
            ("content_url", &self.remote.content_url),
            ("version_url", &self.remote.version_url),
            ("changelog_url", &self.remote.changelog_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(RulesError::Config(format!(
                    "remote.{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.storage.layout.rules_file.is_empty() || self.storage.layout.version_file.is_empty()
        {
            return Err(RulesError::Config(
                "storage file names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Opens the store described by the storage section.
    pub fn store(&self) -> RulesStore {
        RulesStore::open(&self.storage.data_dir, self.storage.layout.clone())
    }
}

/// `$CRITICAL_RULES_HOME`, else the platform data directory, else `./critical-rules`.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("critical-rules-mcp"))
        .unwrap_or_else(|| PathBuf::from("./critical-rules"))
}
