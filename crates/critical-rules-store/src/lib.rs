//! # Critical Rules Store - Installed Content and Version Record
//!
//! The store owns everything that lives on disk: the rules document served to
//! the assistant host, the version record describing it, the optional
//! changelog, and the backups taken before each update.
//!
//! ## Purpose
//!
//! 1. **Version Record** - The `{version, date, sha256, rulesCount}` document
//!    shared by the local install and the remote publisher.
//!
//! 2. **Digests** - Lowercase hex SHA-256 of the document, used both to
//!    bootstrap the first record and to verify downloaded content.
//!
//! 3. **File Storage** - Plain files in one data directory, with write-once
//!    version-tagged backups.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        RULES STORE                        │
//! ├───────────────────────────────────────────────────────────┤
//! │                                                           │
//! │  ┌──────────────────┐          ┌───────────────────────┐  │
//! │  │  VERSION RECORD  │  sha256  │     DATA DIRECTORY    │  │
//! │  │                  │◀────────▶│                       │  │
//! │  │  • load / save   │          │  • CRITICAL-RULES.md  │  │
//! │  │  • bootstrap     │          │  • version.json       │  │
//! │  │  • short date    │          │  • CHANGELOG.md       │  │
//! │  └──────────────────┘          │  • *.backup.<v>.md    │  │
//! │                                └───────────────────────┘  │
//! │                                                           │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. At startup the document is read, then the record is loaded or
//!    bootstrapped from the document's digest.
//! 2. The record only changes when an update is accepted; the update layer
//!    writes a backup, the new document, the changelog, and finally the record.
//! 3. Backups accumulate; nothing here deletes them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use critical_rules_store::{BootstrapDefaults, RulesStore, StoreLayout};
//!
//! let store = RulesStore::open("./data", StoreLayout::default());
//! let rules = store.read_rules().unwrap();
//! let record = store.load_version(&rules, &BootstrapDefaults::default()).unwrap();
//!
//! println!("Rules v{} ({})", record.version, record.short_date());
//! ```

pub mod digest;
pub mod models;
pub mod storage;
pub mod version;

pub use models::{BootstrapDefaults, Result, StoreError, VersionRecord};
pub use storage::{RulesStore, StoreLayout};

#[cfg(test)]
mod tests;
