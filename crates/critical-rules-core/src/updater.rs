//! # Update Orchestrator
//!
//! Decides whether the installed rules are current and, when asked, replaces
//! them with the published release after verifying its checksum.
//!
//! ## State Machine
//!
//! ```text
//!   Idle ──▶ CheckingRemote ──▶ Verifying ──▶ Committed
//!                 │                 │
//!                 └──────┬──────────┘
//!                        ▼
//!                     Failed
//! ```
//!
//! ## Update Sequence
//!
//! | Step | Action | On failure |
//! |------|--------|------------|
//! | 1 | Fetch version descriptor | Abort, nothing touched |
//! | 2 | Compare version strings (unless forced) | `AlreadyCurrent`, nothing touched |
//! | 3 | Fetch rules document | Abort, nothing touched |
//! | 4 | SHA-256 of document vs descriptor checksum | `Integrity`, nothing written |
//! | 5 | Write backup of current document | Abort, nothing else written |
//! | 6 | Overwrite document on disk | Abort, report names the backup |
//! | 7 | Fetch and write changelog | Logged and ignored |
//! | 8 | Swap in-memory pair, persist record | Reported, document already replaced |
//! | 9 | Report | - |
//!
//! Verification strictly precedes every write, and the backup strictly
//! precedes the overwrite. Steps 7 and 8 are not atomic with each other.
//!
//! Version strings are compared with plain equality. A remote version that
//! is "older" in semantic-version terms is still offered as an update.

use crate::remote::{RemoteArtifact, RemoteError};
use crate::runtime::{Installed, RulesRuntime};
use chrono::{SecondsFormat, Utc};
use critical_rules_store::digest::{checksums_match, sha256_hex};
use critical_rules_store::{StoreError, VersionRecord};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Progress of an update attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// No update in flight.
    Idle,
    /// Fetching the remote descriptor and document.
    CheckingRemote,
    /// Comparing checksums and writing the new release.
    Verifying,
    /// The new release is installed.
    Committed,
    /// The attempt was aborted.
    Failed,
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateState::Idle => "idle",
            UpdateState::CheckingRemote => "checking remote",
            UpdateState::Verifying => "verifying",
            UpdateState::Committed => "committed",
            UpdateState::Failed => "failed",
        })
    }
}

fn advance(state: &mut UpdateState, next: UpdateState) {
    debug!("Update state: {} -> {}", state, next);
    *state = next;
}

/// Errors that abort an update or update check.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A remote artifact could not be fetched.
    #[error(transparent)]
    RemoteUnavailable(#[from] RemoteError),

    /// The version descriptor is not a valid version record.
    #[error("Invalid version descriptor: {0}")]
    InvalidDescriptor(#[from] serde_json::Error),

    /// The downloaded document does not match the announced checksum.
    #[error("SHA256 mismatch - file may be corrupted (expected {expected}, got {actual})")]
    Integrity {
        /// Checksum from the descriptor.
        expected: String,
        /// Checksum of the downloaded document.
        actual: String,
    },

    /// The pre-update backup could not be written.
    #[error("Could not write backup: {0}")]
    Backup(#[source] StoreError),

    /// The new document could not be written.
    ///
    /// The document on disk may be truncated; `backup` holds the prior copy.
    #[error("Could not write rules: {source}")]
    Write {
        /// Backup written before the failed overwrite.
        backup: PathBuf,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The new version record could not be persisted.
    ///
    /// The document has already been replaced when this occurs.
    #[error("Rules installed but version record could not be saved: {0}")]
    Persist(#[source] StoreError),
}

impl UpdateError {
    /// True if the failure happened before the installed document was touched.
    pub fn left_state_unchanged(&self) -> bool {
        !matches!(self, UpdateError::Write { .. } | UpdateError::Persist(_))
    }
}

/// Result of comparing local and remote versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// Version strings are equal.
    UpToDate {
        /// The installed record.
        local: VersionRecord,
    },
    /// Version strings differ.
    UpdateAvailable {
        /// The installed record.
        local: VersionRecord,
        /// The published descriptor.
        remote: VersionRecord,
    },
}

impl UpdateCheck {
    /// True if an update is offered.
    pub fn is_available(&self) -> bool {
        matches!(self, UpdateCheck::UpdateAvailable { .. })
    }
}

/// Remote half of a version-info request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The caller did not ask for a remote check.
    NotChecked,
    /// The remote descriptor was retrieved.
    Checked(VersionRecord),
    /// The remote check failed; the message is for display only.
    Unavailable(String),
}

/// Local version fields plus an optional remote comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// The installed record.
    pub local: VersionRecord,
    /// Outcome of the remote check, if any.
    pub remote: RemoteStatus,
}

/// Result of a successful update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Versions matched and the update was not forced.
    AlreadyCurrent {
        /// The installed version string.
        version: String,
    },
    /// A new release was installed.
    Installed(UpdateReport),
}

/// Details of an installed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Record that was replaced.
    pub previous: VersionRecord,
    /// Record now installed.
    pub current: VersionRecord,
    /// Backup of the replaced document.
    pub backup_path: PathBuf,
    /// Changelog path, if it was refreshed.
    pub changelog_path: Option<PathBuf>,
    /// When the update was applied (ISO-8601).
    pub updated_at: String,
}

impl UpdateReport {
    /// Date portion of `updated_at`.
    pub fn updated_date(&self) -> &str {
        self.updated_at.split('T').next().unwrap_or_default()
    }
}

impl RulesRuntime {
    /// Fetches and parses the remote version descriptor.
    async fn fetch_descriptor(&self) -> Result<VersionRecord, UpdateError> {
        let text = self.remote.fetch(RemoteArtifact::VersionDescriptor).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Compares the installed version with the published one.
    ///
    /// # Errors
    ///
    /// `RemoteUnavailable` if the descriptor cannot be fetched,
    /// `InvalidDescriptor` if it cannot be parsed.
    pub async fn check_for_update(&self) -> Result<UpdateCheck, UpdateError> {
        let remote = self.fetch_descriptor().await?;
        let local = self.record().await;

        let announced = remote.version.clone();
        let check = if local.same_version(&remote) {
            UpdateCheck::UpToDate { local }
        } else {
            UpdateCheck::UpdateAvailable { local, remote }
        };

        if check.is_available() {
            info!("Rules update available: v{}", announced);
        } else {
            debug!("Rules up to date at v{}", announced);
        }
        Ok(check)
    }

    /// Returns local version fields, optionally with a remote comparison.
    ///
    /// Never fails: a remote failure is folded into
    /// [`RemoteStatus::Unavailable`]. With `check_remote == false` no network
    /// call is made.
    pub async fn version_info(&self, check_remote: bool) -> VersionInfo {
        let local = self.record().await;
        let remote = if check_remote {
            match self.fetch_descriptor().await {
                Ok(record) => RemoteStatus::Checked(record),
                Err(e) => {
                    warn!("Remote version check failed: {}", e);
                    RemoteStatus::Unavailable("Unable to check remote version".to_string())
                }
            }
        } else {
            RemoteStatus::NotChecked
        };

        VersionInfo { local, remote }
    }

    /// Downloads, verifies and installs the published release.
    ///
    /// Serialized with every other update by the runtime's update lock.
    /// See the module documentation for the exact sequence and failure
    /// semantics.
    pub async fn apply_update(&self, force: bool) -> Result<UpdateOutcome, UpdateError> {
        let mut state = self.update_lock.lock().await;
        *state = UpdateState::Idle;

        let result = self.run_update(&mut *state, force).await;
        match &result {
            Ok(UpdateOutcome::Installed(report)) => {
                info!(
                    "Rules updated v{} -> v{} (backup: {})",
                    report.previous.version,
                    report.current.version,
                    report.backup_path.display()
                );
            }
            Ok(UpdateOutcome::AlreadyCurrent { version }) => {
                debug!("Rules already at v{}, update skipped", version);
            }
            Err(e) => {
                warn!("Rules update failed: {}", e);
                advance(&mut *state, UpdateState::Failed);
            }
        }
        result
    }

    async fn run_update(
        &self,
        state: &mut UpdateState,
        force: bool,
    ) -> Result<UpdateOutcome, UpdateError> {
        advance(state, UpdateState::CheckingRemote);
        let remote = self.fetch_descriptor().await?;
        let current = self.installed().await;

        if !force && current.record.same_version(&remote) {
            advance(state, UpdateState::Idle);
            return Ok(UpdateOutcome::AlreadyCurrent {
                version: current.record.version,
            });
        }

        let content = self.remote.fetch(RemoteArtifact::Content).await?;

        advance(state, UpdateState::Verifying);
        let actual = sha256_hex(&content);
        if !checksums_match(&remote.checksum, &actual) {
            return Err(UpdateError::Integrity {
                expected: remote.checksum,
                actual,
            });
        }

        let backup_path = self
            .store
            .write_backup(&current.content, &current.record.version)
            .map_err(UpdateError::Backup)?;
        if let Err(source) = self.store.write_rules(&content) {
            return Err(UpdateError::Write {
                backup: backup_path,
                source,
            });
        }

        let changelog_path = self.refresh_changelog().await;

        *self.installed.write().await = Installed {
            content: Arc::from(content),
            record: remote.clone(),
        };
        self.store.save_version(&remote).map_err(UpdateError::Persist)?;

        advance(state, UpdateState::Committed);
        Ok(UpdateOutcome::Installed(UpdateReport {
            previous: current.record,
            current: remote,
            backup_path,
            changelog_path,
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }

    /// Best-effort changelog refresh. Failures are logged, never returned.
    async fn refresh_changelog(&self) -> Option<PathBuf> {
        let text = match self.remote.fetch(RemoteArtifact::Changelog).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{} not refreshed: {}", e.artifact(), e);
                return None;
            }
        };

        match self.store.write_changelog(&text) {
            Ok(()) => Some(self.store.changelog_path()),
            Err(e) => {
                warn!("Changelog not written: {}", e);
                None
            }
        }
    }
}
