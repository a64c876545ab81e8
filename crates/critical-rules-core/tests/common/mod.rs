//! Shared fixtures: an in-memory remote and a seeded data directory.

#![allow(dead_code)]

use async_trait::async_trait;
use critical_rules_core::{
    RemoteArtifact, RemoteError, RemoteSource, RulesConfig, RulesRuntime, VersionRecord,
};
use critical_rules_store::digest::sha256_hex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const LOCAL_RULES: &str = "# Critical Rules\n\n1. Verify, don't assume.\n";
pub const REMOTE_RULES: &str = "# Critical Rules\n\n1. Verify, don't assume.\n2. Back up everything.\n";
pub const REMOTE_CHANGELOG: &str = "# Changelog\n\n## 1.1.0\n- Added backup rule\n";

/// In-memory remote with scripted responses and a call log.
#[derive(Default)]
pub struct StubRemote {
    responses: Mutex<HashMap<RemoteArtifact, Result<String, String>>>,
    calls: Mutex<Vec<RemoteArtifact>>,
}

impl StubRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, artifact: RemoteArtifact, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(artifact, Ok(text.into()));
        self
    }

    pub fn fail(self, artifact: RemoteArtifact, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(artifact, Err(message.into()));
        self
    }

    pub fn descriptor(self, record: &VersionRecord) -> Self {
        let json = serde_json::to_string(record).unwrap();
        self.serve(RemoteArtifact::VersionDescriptor, json)
    }

    /// Descriptor, content and changelog for a consistent release.
    pub fn release(version: &str, content: &str) -> Self {
        Self::new()
            .descriptor(&release_record(version, content))
            .serve(RemoteArtifact::Content, content)
            .serve(RemoteArtifact::Changelog, REMOTE_CHANGELOG)
    }

    pub fn calls(&self) -> Vec<RemoteArtifact> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSource for StubRemote {
    async fn fetch(&self, artifact: RemoteArtifact) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push(artifact);
        match self.responses.lock().unwrap().get(&artifact) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(RemoteError::Unavailable {
                artifact,
                message: message.clone(),
            }),
            None => Err(RemoteError::Unavailable {
                artifact,
                message: "Failed to fetch: Not Found".to_string(),
            }),
        }
    }
}

pub fn release_record(version: &str, content: &str) -> VersionRecord {
    VersionRecord {
        version: version.to_string(),
        date: "2025-04-01T10:00:00.000Z".to_string(),
        checksum: sha256_hex(content),
        rule_count: 97,
    }
}

pub fn local_record(version: &str) -> VersionRecord {
    VersionRecord {
        version: version.to_string(),
        date: "2025-01-01T00:00:00.000Z".to_string(),
        checksum: sha256_hex(LOCAL_RULES),
        rule_count: 96,
    }
}

/// A data directory holding `LOCAL_RULES` and, optionally, a version record.
pub struct Fixture {
    pub dir: TempDir,
    pub config: RulesConfig,
}

impl Fixture {
    pub fn new(record: Option<&VersionRecord>) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = RulesConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();

        let store = config.store();
        store.write_rules(LOCAL_RULES).unwrap();
        if let Some(record) = record {
            store.save_version(record).unwrap();
        }

        Self { dir, config }
    }

    pub fn with_version(version: &str) -> Self {
        Self::new(Some(&local_record(version)))
    }

    pub fn runtime(&self, remote: Arc<StubRemote>) -> RulesRuntime {
        RulesRuntime::with_remote(&self.config, remote).unwrap()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        snapshot_dir(self.dir.path())
    }
}

/// File name to contents for every regular file in `dir`.
pub fn snapshot_dir(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.path().is_file())
        .map(|entry| {
            (
                entry.file_name().to_string_lossy().into_owned(),
                std::fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

/// Replaces the file at `path` with an empty directory so writes to it fail.
pub fn block_with_dir(path: &Path) {
    std::fs::remove_file(path).unwrap();
    std::fs::create_dir(path).unwrap();
}
