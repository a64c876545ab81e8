//! Loading and saving the version record.

use crate::models::{BootstrapDefaults, Result, StoreError, VersionRecord};
use crate::storage::RulesStore;
use std::fs;
use std::io::ErrorKind;
use tracing::debug;

impl RulesStore {
    /// Loads the persisted version record, bootstrapping one if absent.
    ///
    /// A persisted record is returned verbatim; only its structure is
    /// validated. When no record exists, one is synthesized from `defaults`
    /// with a checksum computed over `content` (the document currently
    /// loaded). The synthesized record is not written back.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` if the record exists but is malformed, and
    /// `StoreError::Io` if it exists but cannot be read.
    pub fn load_version(&self, content: &str, defaults: &BootstrapDefaults) -> Result<VersionRecord> {
        let path = self.version_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No version record at {}, bootstrapping", path.display());
                Ok(VersionRecord::bootstrap(content, defaults))
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Serializes `record` and overwrites the persisted copy.
    pub fn save_version(&self, record: &VersionRecord) -> Result<()> {
        let path = self.version_path();
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).map_err(|e| StoreError::io(path, e))
    }
}
