//! The runtime context shared by every request handler.
//!
//! [`RulesRuntime`] owns the installed rules (document + version record), the
//! store they were loaded from, the remote source used for updates, and the
//! single lock that serializes mutating operations. Handlers receive it behind
//! an `Arc`; there is no module-level state.

use crate::config::RulesConfig;
use crate::error::RulesError;
use crate::remote::{HttpRemote, RemoteSource};
use crate::updater::UpdateState;
use critical_rules_store::{RulesStore, VersionRecord};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// The installed document and the record describing it.
///
/// Always read and replaced as a pair so that no reader observes a document
/// with the wrong record.
#[derive(Debug, Clone)]
pub struct Installed {
    /// The rules document.
    pub content: Arc<str>,

    /// Its version record.
    pub record: VersionRecord,
}

/// Process-wide runtime context.
///
/// # Example
///
/// ```rust,no_run
/// use critical_rules_core::{RulesConfig, RulesRuntime};
///
/// # async fn run() -> Result<(), critical_rules_core::RulesError> {
/// let runtime = RulesRuntime::load(&RulesConfig::default())?;
/// println!("{}", runtime.version_info_text(false).await);
/// # Ok(())
/// # }
/// ```
pub struct RulesRuntime {
    pub(crate) store: RulesStore,
    pub(crate) remote: Arc<dyn RemoteSource>,
    pub(crate) installed: RwLock<Installed>,
    /// Held for the whole update sequence; holds the last update state.
    pub(crate) update_lock: Mutex<UpdateState>,
}

impl RulesRuntime {
    /// Loads installed state and connects to the configured HTTP remote.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::StartupLoad` if the document is missing or the
    /// version record is malformed, and `RulesError::Config` /
    /// `RulesError::Internal` for configuration or client setup problems.
    pub fn load(config: &RulesConfig) -> Result<Self, RulesError> {
        config.validate()?;
        let remote = HttpRemote::new(config.remote.clone())?;
        Self::with_remote(config, Arc::new(remote))
    }

    /// Loads installed state with an explicit remote source.
    pub fn with_remote(
        config: &RulesConfig,
        remote: Arc<dyn RemoteSource>,
    ) -> Result<Self, RulesError> {
        let store = config.store();
        let content = store.read_rules()?;
        let record = store.load_version(&content, &config.bootstrap)?;

        info!(
            "Loaded rules v{} ({} patterns, {})",
            record.version,
            record.rule_count,
            record.short_date()
        );

        Ok(Self {
            store,
            remote,
            installed: RwLock::new(Installed {
                content: Arc::from(content),
                record,
            }),
            update_lock: Mutex::new(UpdateState::Idle),
        })
    }

    /// Snapshot of the installed pair.
    pub async fn installed(&self) -> Installed {
        self.installed.read().await.clone()
    }

    /// The installed rules document.
    pub async fn content(&self) -> Arc<str> {
        self.installed.read().await.content.clone()
    }

    /// The installed version record.
    pub async fn record(&self) -> VersionRecord {
        self.installed.read().await.record.clone()
    }

    /// Installed version without waiting. `None` while an update is
    /// swapping the installed pair.
    pub fn try_version(&self) -> Option<String> {
        self.installed
            .try_read()
            .ok()
            .map(|installed| installed.record.version.clone())
    }

    /// The store backing this runtime.
    pub fn store(&self) -> &RulesStore {
        &self.store
    }

    /// State the most recent update attempt finished in.
    pub async fn last_update_state(&self) -> UpdateState {
        *self.update_lock.lock().await
    }
}
