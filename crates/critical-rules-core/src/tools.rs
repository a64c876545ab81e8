//! The tool catalog and a protocol-independent dispatcher.
//!
//! Each tool produces a markdown string. The MCP server calls the typed
//! methods directly; [`RulesRuntime::call_tool`] accepts a name and raw JSON
//! arguments for callers without typed routing (the CLI `tool` command).

use crate::error::RulesError;
use crate::render;
use crate::runtime::RulesRuntime;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The five tools the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Checklist for a task about to start.
    VerifyCompliance,
    /// Condensed rules overview.
    GetRulesSummary,
    /// Installed version, optionally compared with the remote.
    GetVersionInfo,
    /// Remote update check.
    CheckForUpdates,
    /// Download and install the published rules.
    UpdateRules,
}

impl ToolKind {
    /// Every tool, in catalog order.
    pub const ALL: [ToolKind; 5] = [
        ToolKind::VerifyCompliance,
        ToolKind::GetRulesSummary,
        ToolKind::GetVersionInfo,
        ToolKind::CheckForUpdates,
        ToolKind::UpdateRules,
    ];

    /// Wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::VerifyCompliance => "verify_compliance",
            ToolKind::GetRulesSummary => "get_rules_summary",
            ToolKind::GetVersionInfo => "get_version_info",
            ToolKind::CheckForUpdates => "check_for_updates",
            ToolKind::UpdateRules => "update_rules",
        }
    }

    /// True if the tool may touch the network.
    pub fn uses_remote(self) -> bool {
        matches!(
            self,
            ToolKind::GetVersionInfo | ToolKind::CheckForUpdates | ToolKind::UpdateRules
        )
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| RulesError::UnknownTool(s.to_string()))
    }
}

impl RulesRuntime {
    /// Compliance checklist for `task_description`.
    pub async fn verify_compliance_text(&self, task_description: &str) -> String {
        render::compliance_checklist(task_description, &self.record().await)
    }

    /// Rules summary.
    pub async fn rules_summary_text(&self) -> String {
        render::rules_summary(&self.record().await)
    }

    /// Version information, optionally with a remote check.
    pub async fn version_info_text(&self, check_remote: bool) -> String {
        render::version_info(&self.version_info(check_remote).await)
    }

    /// Update check report. Failures are rendered, not returned.
    pub async fn check_for_updates_text(&self) -> String {
        render::update_check(&self.check_for_update().await)
    }

    /// Update report. Failures are rendered, not returned.
    pub async fn update_rules_text(&self, force: bool) -> String {
        render::update_result(&self.apply_update(force).await)
    }

    /// Invokes a tool by name with JSON arguments.
    ///
    /// Argument handling matches the published tool schemas:
    /// `task_description` is required for `verify_compliance`, `check_remote`
    /// is true unless explicitly `false`, and `force` is false unless
    /// explicitly `true`.
    ///
    /// # Errors
    ///
    /// `RulesError::UnknownTool` for names outside the catalog and
    /// `RulesError::InvalidArguments` when a required argument is missing.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> Result<String, RulesError> {
        let tool = name.parse::<ToolKind>()?;
        debug!(tool = %tool, remote = tool.uses_remote(), "Dispatching tool");
        let text = match tool {
            ToolKind::VerifyCompliance => {
                let task = arguments
                    .get("task_description")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        RulesError::InvalidArguments(
                            "task_description (string) is required".to_string(),
                        )
                    })?;
                self.verify_compliance_text(task).await
            }
            ToolKind::GetRulesSummary => self.rules_summary_text().await,
            ToolKind::GetVersionInfo => {
                let check_remote = arguments.get("check_remote") != Some(&Value::Bool(false));
                self.version_info_text(check_remote).await
            }
            ToolKind::CheckForUpdates => self.check_for_updates_text().await,
            ToolKind::UpdateRules => {
                let force = arguments.get("force") == Some(&Value::Bool(true));
                self.update_rules_text(force).await
            }
        };
        Ok(text)
    }
}
