//! Readable resources exposed to the host.

use crate::error::RulesError;
use crate::runtime::RulesRuntime;

/// URI of the rules document.
pub const INSTRUCTIONS_URI: &str = "critical-rules://instructions";

/// URI of the changelog.
pub const CHANGELOG_URI: &str = "critical-rules://changelog";

/// MIME type of every resource.
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Listing entry for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Resource URI.
    pub uri: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: String,
    /// MIME type.
    pub mime_type: &'static str,
}

/// Text of a resource read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceText {
    /// Resource URI.
    pub uri: String,
    /// MIME type.
    pub mime_type: &'static str,
    /// Full text.
    pub text: String,
}

impl RulesRuntime {
    /// Lists readable resources.
    ///
    /// The instructions are always listed; the changelog only when a
    /// changelog file exists.
    pub async fn list_resources(&self) -> Vec<ResourceEntry> {
        let rule_count = self.record().await.rule_count;
        let mut resources = vec![ResourceEntry {
            uri: INSTRUCTIONS_URI,
            name: "Claude AI Critical Rules",
            description: format!(
                "Mandatory instructions to prevent {rule_count} documented failure patterns"
            ),
            mime_type: MARKDOWN_MIME,
        }];

        if self.store.has_changelog() {
            resources.push(ResourceEntry {
                uri: CHANGELOG_URI,
                name: "Rules Changelog",
                description: "History of updates and changes to the critical rules".to_string(),
                mime_type: MARKDOWN_MIME,
            });
        }

        resources
    }

    /// Reads a resource by URI.
    ///
    /// # Errors
    ///
    /// `RulesError::UnknownResource` for any URI other than the two above, or
    /// for the changelog when no changelog file exists.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceText, RulesError> {
        let text = match uri {
            INSTRUCTIONS_URI => self.content().await.to_string(),
            CHANGELOG_URI => self
                .store
                .read_changelog()
                .map_err(|e| RulesError::Internal(e.to_string()))?
                .ok_or_else(|| RulesError::UnknownResource(uri.to_string()))?,
            _ => return Err(RulesError::UnknownResource(uri.to_string())),
        };

        Ok(ResourceText {
            uri: uri.to_string(),
            mime_type: MARKDOWN_MIME,
            text,
        })
    }
}
