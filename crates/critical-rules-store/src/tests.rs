//! # Integration Tests for the Rules Store
//!
//! These tests walk the store through the same sequence the update layer
//! drives: first-run bootstrap, backup, overwrite, record replacement, and a
//! restart that reloads the persisted pair.

use crate::digest::{checksums_match, sha256_hex};
use crate::models::{BootstrapDefaults, VersionRecord};
use crate::storage::{RulesStore, StoreLayout};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn seeded_store(dir: &TempDir, content: &str) -> RulesStore {
    let store = RulesStore::open(dir.path(), StoreLayout::default());
    store.write_rules(content).unwrap();
    store
}

fn remote_record(version: &str, content: &str) -> VersionRecord {
    VersionRecord {
        version: version.to_string(),
        date: "2025-04-01T10:00:00.000Z".to_string(),
        checksum: sha256_hex(content),
        rule_count: 97,
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_first_run_record_matches_content() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir, "# Rules v1\n");

    let content = store.read_rules().unwrap();
    let record = store
        .load_version(&content, &BootstrapDefaults::default())
        .unwrap();

    assert!(checksums_match(&record.checksum, &sha256_hex(&content)));
}

#[test]
fn test_update_sequence_keeps_pair_consistent() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir, "# Rules v1\n");
    let old_content = store.read_rules().unwrap();
    let old_record = store
        .load_version(&old_content, &BootstrapDefaults::default())
        .unwrap();

    let new_content = "# Rules v2\n";
    let new_record = remote_record("1.1.0", new_content);

    let backup = store.write_backup(&old_content, &old_record.version).unwrap();
    store.write_rules(new_content).unwrap();
    store.save_version(&new_record).unwrap();

    // Restart: reload from disk
    let reloaded = store.read_rules().unwrap();
    let reloaded_record = store
        .load_version(&reloaded, &BootstrapDefaults::default())
        .unwrap();

    assert_eq!(reloaded, new_content);
    assert_eq!(reloaded_record, new_record);
    assert!(checksums_match(&reloaded_record.checksum, &sha256_hex(&reloaded)));
    assert_eq!(fs::read_to_string(backup).unwrap(), old_content);
}

#[test]
fn test_custom_layout() {
    let dir = TempDir::new().unwrap();
    let layout = StoreLayout {
        rules_file: "RULES.txt".to_string(),
        version_file: "meta.json".to_string(),
        changelog_file: "NEWS.txt".to_string(),
    };
    let store = RulesStore::open(dir.path(), layout);
    store.write_rules("body").unwrap();

    let backup = store.write_backup("body", "2.0.0").unwrap();
    assert!(backup.ends_with("RULES.backup.2.0.0.txt"));
    assert!(dir.path().join("RULES.txt").exists());
}

#[test]
fn test_ensure_dir_creates_nested() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = RulesStore::open(&nested, StoreLayout::default());

    store.ensure_dir().unwrap();
    store.write_rules("ok").unwrap();
    assert_eq!(store.read_rules().unwrap(), "ok");
}

#[test]
fn test_list_backups_without_dir() {
    let dir = TempDir::new().unwrap();
    let store = RulesStore::open(dir.path().join("missing"), StoreLayout::default());
    assert!(store.list_backups().unwrap().is_empty());
}
