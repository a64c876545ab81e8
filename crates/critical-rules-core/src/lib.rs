//! # Critical Rules Core
//!
//! Runtime for the critical rules MCP server: the installed rules, the
//! update orchestrator that replaces them, and the markdown responses the
//! host receives.
//!
//! ## Components
//!
//! | Component | Module | Role |
//! |-----------|--------|------|
//! | Runtime context | [`runtime`] | Owns the installed pair and the update lock |
//! | Remote Source Adapter | [`remote`] | Fetches the three published artifacts |
//! | Update Orchestrator | [`updater`] | Check, verify, back up, install |
//! | Resources | [`resources`] | `critical-rules://` URIs |
//! | Tools | [`tools`] | The five-tool catalog and dispatcher |
//! | Templates | [`render`] | Markdown responses |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CRITICAL RULES CORE                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │   tools / resources ──▶ ┌───────────────┐                   │
//! │                         │ RulesRuntime  │                   │
//! │                         └───────┬───────┘                   │
//! │                                 │                           │
//! │          ┌──────────────────────┼─────────────────┐         │
//! │          ▼                      ▼                 ▼         │
//! │   ┌─────────────┐      ┌────────────────┐  ┌────────────┐   │
//! │   │   render    │      │    updater     │─▶│   remote   │   │
//! │   └─────────────┘      └───────┬────────┘  └────────────┘   │
//! │                                ▼                            │
//! │                      critical-rules-store                   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use critical_rules_core::{RulesConfig, RulesRuntime};
//!
//! # async fn run() -> Result<(), critical_rules_core::RulesError> {
//! let runtime = RulesRuntime::load(&RulesConfig::default())?;
//!
//! println!("{}", runtime.check_for_updates_text().await);
//! println!("{}", runtime.update_rules_text(false).await);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Handling
//!
//! - Startup load failures are fatal (`RulesError::StartupLoad`).
//! - Remote, parse and integrity failures during an update are rendered as
//!   text; local state is untouched unless the report says otherwise.
//! - The changelog is optional: failing to refresh it never fails an update.

pub mod config;
mod error;
pub mod remote;
pub mod render;
pub mod resources;
pub mod runtime;
pub mod tools;
pub mod updater;

pub use config::{RemoteConfig, RulesConfig, StorageConfig};
pub use error::RulesError;
pub use remote::{HttpRemote, RemoteArtifact, RemoteError, RemoteSource};
pub use resources::{ResourceEntry, ResourceText, CHANGELOG_URI, INSTRUCTIONS_URI};
pub use runtime::{Installed, RulesRuntime};
pub use tools::ToolKind;
pub use updater::{
    RemoteStatus, UpdateCheck, UpdateError, UpdateOutcome, UpdateReport, UpdateState, VersionInfo,
};

// Re-export store types for convenience
pub use critical_rules_store::{BootstrapDefaults, RulesStore, StoreError, StoreLayout, VersionRecord};

/// Core result type for runtime operations.
pub type Result<T> = std::result::Result<T, RulesError>;
