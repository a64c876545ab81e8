//! # Core Data Models for the Rules Store
//!
//! This module defines the types shared by every layer that touches the
//! installed rules: the version record persisted next to the document, the
//! defaults used to bootstrap it, and the store error type.
//!
//! ## Wire Format
//!
//! The version record is the same JSON document the upstream repository
//! publishes as `version.json`, so a remote descriptor can be copied into the
//! local record without translation:
//!
//! | Field | JSON key | Meaning |
//! |-------|----------|---------|
//! | `version` | `version` | Release string, compared by plain equality |
//! | `date` | `date` | ISO-8601 issue timestamp |
//! | `checksum` | `sha256` | Lowercase hex SHA-256 of the rules document |
//! | `rule_count` | `rulesCount` | Number of documented failure patterns |
//!
//! The spelled-out keys `checksum` and `ruleCount` are accepted on input.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::digest::sha256_hex;

/// Version used when no record has ever been persisted.
pub const DEFAULT_BOOTSTRAP_VERSION: &str = "1.0.0";

/// Rule count used when no record has ever been persisted.
pub const DEFAULT_RULE_COUNT: u64 = 96;

/// Metadata describing one release of the rules document.
///
/// Used for both the locally installed record and the remote descriptor
/// fetched during update checks; the two share one shape.
///
/// # Example
///
/// ```rust
/// use critical_rules_store::VersionRecord;
///
/// let record: VersionRecord = serde_json::from_str(r#"{
///     "version": "1.1.0",
///     "date": "2025-03-01T12:00:00.000Z",
///     "sha256": "abc123",
///     "rulesCount": 97
/// }"#).unwrap();
///
/// assert_eq!(record.short_date(), "2025-03-01");
/// assert_eq!(record.rule_count, 97);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Release string, e.g. "1.0.0".
    pub version: String,

    /// ISO-8601 timestamp of the release.
    pub date: String,

    /// Hex SHA-256 of the rules document this record describes.
    #[serde(rename = "sha256", alias = "checksum")]
    pub checksum: String,

    /// Informational count of documented failure patterns.
    #[serde(rename = "rulesCount", alias = "ruleCount")]
    pub rule_count: u64,
}

impl VersionRecord {
    /// Synthesizes a record for content that has never been versioned.
    ///
    /// The checksum is computed over `content` and the date is the current
    /// UTC time, formatted the way the upstream publisher formats it.
    pub fn bootstrap(content: &str, defaults: &BootstrapDefaults) -> Self {
        Self {
            version: defaults.version.clone(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            checksum: sha256_hex(content),
            rule_count: defaults.rule_count,
        }
    }

    /// Date portion of the timestamp (everything before the `T`).
    pub fn short_date(&self) -> &str {
        self.date.split('T').next().unwrap_or_default()
    }

    /// Leading characters of the checksum, for display.
    pub fn checksum_prefix(&self, len: usize) -> &str {
        match self.checksum.char_indices().nth(len) {
            Some((idx, _)) => &self.checksum[..idx],
            None => &self.checksum,
        }
    }

    /// Plain string equality of the version fields.
    ///
    /// No semantic-version ordering is applied: "0.9.0" and "1.0.0" are simply
    /// different, in either direction.
    pub fn same_version(&self, other: &VersionRecord) -> bool {
        self.version == other.version
    }
}

/// Values used to synthesize the first version record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapDefaults {
    /// Placeholder version string.
    pub version: String,

    /// Default rule count.
    pub rule_count: u64,
}

impl Default for BootstrapDefaults {
    fn default() -> Self {
        Self {
            version: DEFAULT_BOOTSTRAP_VERSION.to_string(),
            rule_count: DEFAULT_RULE_COUNT,
        }
    }
}

/// Errors that can occur while reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation was performed on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A persisted version record could not be parsed or serialized.
    #[error("Malformed version record: {0}")]
    Parse(#[from] serde_json::Error),

    /// The rules document does not exist.
    #[error("Rules document not found at {0}")]
    MissingContent(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
