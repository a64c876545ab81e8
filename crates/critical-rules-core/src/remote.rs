//! # Remote Source Adapter
//!
//! Retrieves the three artifacts the upstream repository publishes. Each
//! call is a single independent GET: no retry, no caching, no shared mutable
//! state, so callers may issue fetches concurrently.
//!
//! | Artifact | Default location |
//! |----------|------------------|
//! | [`RemoteArtifact::Content`] | `CRITICAL-RULES.md` |
//! | [`RemoteArtifact::VersionDescriptor`] | `version.json` |
//! | [`RemoteArtifact::Changelog`] | `CHANGELOG.md` |
//!
//! Any failure, whether a non-success status or a transport error (DNS,
//! refused connection, timeout), becomes [`RemoteError::Unavailable`] with a
//! message. The kind of failure is not preserved.

use crate::config::RemoteConfig;
use crate::error::RulesError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// One of the fixed remote artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteArtifact {
    /// The rules document.
    Content,
    /// The version descriptor (`version.json`).
    VersionDescriptor,
    /// The changelog.
    Changelog,
}

impl fmt::Display for RemoteArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RemoteArtifact::Content => "rules document",
            RemoteArtifact::VersionDescriptor => "version descriptor",
            RemoteArtifact::Changelog => "changelog",
        })
    }
}

/// Failure to retrieve a remote artifact.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The artifact could not be retrieved.
    #[error("{message}")]
    Unavailable {
        /// Which artifact was requested.
        artifact: RemoteArtifact,
        /// Transport or status message.
        message: String,
    },
}

impl RemoteError {
    /// The artifact whose fetch failed.
    pub fn artifact(&self) -> RemoteArtifact {
        match self {
            RemoteError::Unavailable { artifact, .. } => *artifact,
        }
    }
}

/// Source of remote artifacts.
///
/// Implemented over HTTP by [`HttpRemote`]; tests substitute in-memory
/// sources.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Retrieves the full text of `artifact`.
    async fn fetch(&self, artifact: RemoteArtifact) -> Result<String, RemoteError>;
}

/// HTTP implementation of [`RemoteSource`].
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemote {
    /// Builds a client honouring the configured timeout.
    pub fn new(config: RemoteConfig) -> Result<Self, RulesError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("critical-rules-mcp/", env!("CARGO_PKG_VERSION")));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| RulesError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// URL an artifact is fetched from.
    pub fn url(&self, artifact: RemoteArtifact) -> &str {
        match artifact {
            RemoteArtifact::Content => &self.config.content_url,
            RemoteArtifact::VersionDescriptor => &self.config.version_url,
            RemoteArtifact::Changelog => &self.config.changelog_url,
        }
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch(&self, artifact: RemoteArtifact) -> Result<String, RemoteError> {
        let url = self.url(artifact);
        debug!("Fetching {} from {}", artifact, url);

        let unavailable = |message: String| RemoteError::Unavailable { artifact, message };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to fetch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!(
                "Failed to fetch: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        response
            .text()
            .await
            .map_err(|e| unavailable(format!("Failed to read response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_follow_config() {
        let config = RemoteConfig {
            content_url: "https://example.test/rules.md".to_string(),
            version_url: "https://example.test/version.json".to_string(),
            changelog_url: "https://example.test/CHANGELOG.md".to_string(),
            timeout_secs: 0,
        };
        let remote = HttpRemote::new(config).unwrap();

        assert_eq!(remote.url(RemoteArtifact::Content), "https://example.test/rules.md");
        assert_eq!(
            remote.url(RemoteArtifact::VersionDescriptor),
            "https://example.test/version.json"
        );
        assert_eq!(
            remote.url(RemoteArtifact::Changelog),
            "https://example.test/CHANGELOG.md"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let config = RemoteConfig {
            version_url: "http://127.0.0.1:9/version.json".to_string(),
            timeout_secs: 5,
            ..RemoteConfig::default()
        };
        let remote = HttpRemote::new(config).unwrap();

        let err = remote
            .fetch(RemoteArtifact::VersionDescriptor)
            .await
            .unwrap_err();
        assert_eq!(err.artifact(), RemoteArtifact::VersionDescriptor);
        assert!(err.to_string().starts_with("Failed to fetch"));
    }

    #[test]
    fn test_artifact_display() {
        assert_eq!(RemoteArtifact::Content.to_string(), "rules document");
        assert_eq!(RemoteArtifact::Changelog.to_string(), "changelog");
    }
}
