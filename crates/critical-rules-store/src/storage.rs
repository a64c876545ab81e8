//! # File-Backed Rules Storage
//!
//! The rules live in a single data directory as plain files so that users
//! can inspect, diff and restore them with ordinary tools:
//!
//! | File | Purpose |
//! |------|---------|
//! | `CRITICAL-RULES.md` | Installed rules document |
//! | `version.json` | Version record for the installed document |
//! | `CHANGELOG.md` | Optional changelog, refreshed on update |
//! | `CRITICAL-RULES.backup.<version>.md` | Pre-update snapshots |
//!
//! ## Write Semantics
//!
//! - Document, record and changelog writes overwrite in place. There is no
//!   partial-write protection; a crash mid-write can corrupt the file.
//! - Backups are write-once. A backup is never overwritten: when the
//!   version-tagged name is taken, a UTC timestamp is appended.
//! - Nothing in this module deletes files.

use crate::models::{Result, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// File names used inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLayout {
    /// Rules document file name.
    pub rules_file: String,

    /// Version record file name.
    pub version_file: String,

    /// Changelog file name.
    pub changelog_file: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            rules_file: "CRITICAL-RULES.md".to_string(),
            version_file: "version.json".to_string(),
            changelog_file: "CHANGELOG.md".to_string(),
        }
    }
}

/// Handle to the rules data directory.
///
/// Opening a store performs no I/O; every operation touches the filesystem
/// directly so that external edits are always observed.
///
/// # Example
///
/// ```rust,no_run
/// use critical_rules_store::{RulesStore, StoreLayout};
///
/// let store = RulesStore::open("./data", StoreLayout::default());
/// let rules = store.read_rules().unwrap();
/// let backup = store.write_backup(&rules, "1.0.0").unwrap();
/// println!("Backup written to {}", backup.display());
/// ```
#[derive(Debug, Clone)]
pub struct RulesStore {
    root: PathBuf,
    layout: StoreLayout,
}

impl RulesStore {
    /// Creates a handle for the given data directory.
    pub fn open<P: AsRef<Path>>(root: P, layout: StoreLayout) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            layout,
        }
    }

    /// Creates the data directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the rules document.
    pub fn rules_path(&self) -> PathBuf {
        self.root.join(&self.layout.rules_file)
    }

    /// Path of the version record.
    pub fn version_path(&self) -> PathBuf {
        self.root.join(&self.layout.version_file)
    }

    /// Path of the changelog.
    pub fn changelog_path(&self) -> PathBuf {
        self.root.join(&self.layout.changelog_file)
    }

    /// Returns true if a rules document is installed.
    pub fn has_rules(&self) -> bool {
        self.rules_path().is_file()
    }

    /// Reads the installed rules document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingContent` if the document does not exist and
    /// `StoreError::Io` for any other read failure.
    pub fn read_rules(&self) -> Result<String> {
        let path = self.rules_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::MissingContent(path)),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Overwrites the rules document.
    pub fn write_rules(&self, content: &str) -> Result<()> {
        let path = self.rules_path();
        fs::write(&path, content).map_err(|e| StoreError::io(path, e))
    }

    /// Returns true if a changelog file exists.
    pub fn has_changelog(&self) -> bool {
        self.changelog_path().is_file()
    }

    /// Reads the changelog, or `None` if there is none.
    pub fn read_changelog(&self) -> Result<Option<String>> {
        let path = self.changelog_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Overwrites the changelog.
    pub fn write_changelog(&self, text: &str) -> Result<()> {
        let path = self.changelog_path();
        fs::write(&path, text).map_err(|e| StoreError::io(path, e))
    }

    /// Preferred backup path for a document superseded at `version`.
    pub fn backup_path(&self, version: &str) -> PathBuf {
        self.root.join(self.backup_file_name(&sanitize_tag(version), None))
    }

    /// Writes a write-once backup of `content`, tagged with `version`.
    ///
    /// Returns the path actually written. If the version-tagged name already
    /// exists a UTC timestamp (and, if needed, a counter) is appended so that
    /// earlier backups are preserved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be created or written. In
    /// that case no existing file has been modified.
    pub fn write_backup(&self, content: &str, version: &str) -> Result<PathBuf> {
        let tag = sanitize_tag(version);
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut attempt = 0u32;
        loop {
            let suffix = match attempt {
                0 => None,
                1 => Some(stamp.clone()),
                n => Some(format!("{stamp}-{}", n - 1)),
            };
            let path = self.root.join(self.backup_file_name(&tag, suffix.as_deref()));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let written = file.write_all(content.as_bytes()).and_then(|_| file.sync_all());
                    drop(file);
                    discard_partial(&path, written)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(StoreError::io(path, e)),
            }
        }
    }

    /// Lists backup files in the data directory, sorted by name.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let prefix = format!("{}.backup.", self.rules_stem());
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                backups.push(entry.path());
            }
        }
        backups.sort();
        Ok(backups)
    }

    fn rules_stem(&self) -> &str {
        Path::new(&self.layout.rules_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("rules")
    }

    fn backup_file_name(&self, tag: &str, suffix: Option<&str>) -> String {
        let ext = Path::new(&self.layout.rules_file)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("md");
        match suffix {
            Some(suffix) => format!("{}.backup.{tag}.{suffix}.{ext}", self.rules_stem()),
            None => format!("{}.backup.{tag}.{ext}", self.rules_stem()),
        }
    }
}

/// Removes a backup whose write failed so its write-once name stays free.
fn discard_partial(path: &Path, written: std::io::Result<()>) -> Result<()> {
    written.map_err(|e| {
        if let Err(cleanup) = fs::remove_file(path) {
            warn!("Could not remove partial backup {}: {}", path.display(), cleanup);
        }
        StoreError::io(path, e)
    })
}

/// Makes a version string safe to embed in a file name.
///
/// Characters outside `[A-Za-z0-9._-]` become `_` and leading dots are
/// dropped, so a hostile version such as `../../etc` cannot escape the data
/// directory.
pub fn sanitize_tag(version: &str) -> String {
    let cleaned: String = version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
