//! MCP server: the five tools and two resources over rmcp.
//!
//! Every handler delegates to [`RulesRuntime`]; this module only maps
//! between protocol types and the runtime's markdown responses.

use critical_rules_core::{ResourceEntry, ResourceText, RulesError, RulesRuntime};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
        PaginatedRequestParams, RawResource, ReadResourceRequestParams, ReadResourceResult,
        Resource, ResourceContents, ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Name reported in the initialize handshake.
pub const SERVER_NAME: &str = "critical-rules-mcp";

const INSTRUCTIONS: &str = "Critical rules for technical work. Call verify_compliance before \
starting a task, read critical-rules://instructions for the full rules, and use \
check_for_updates / update_rules to stay on the published version.";

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct VerifyComplianceRequest {
    /// Description of the task about to be performed
    task_description: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetVersionInfoRequest {
    /// Check GitHub for the latest version (default: true)
    #[serde(default = "default_check_remote")]
    check_remote: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRulesRequest {
    /// Reinstall even if already on the latest version (default: false)
    #[serde(default)]
    force: bool,
}

fn default_check_remote() -> bool {
    true
}

// --- Server ---

#[derive(Clone)]
pub struct RulesServer {
    runtime: Arc<RulesRuntime>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RulesServer {
    pub fn new(runtime: Arc<RulesRuntime>) -> Self {
        Self {
            runtime,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Verify compliance with critical rules before starting a technical task. Returns mandatory checklist."
    )]
    async fn verify_compliance(
        &self,
        Parameters(req): Parameters<VerifyComplianceRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .runtime
            .verify_compliance_text(&req.task_description)
            .await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get condensed summary of critical rules")]
    async fn get_rules_summary(&self) -> Result<CallToolResult, McpError> {
        let text = self.runtime.rules_summary_text().await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get current version information and check for updates")]
    async fn get_version_info(
        &self,
        Parameters(req): Parameters<GetVersionInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.runtime.version_info_text(req.check_remote).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Check if updates are available from GitHub repository")]
    async fn check_for_updates(&self) -> Result<CallToolResult, McpError> {
        let text = self.runtime.check_for_updates_text().await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Download and install latest rules from GitHub (with SHA256 verification and automatic backup)"
    )]
    async fn update_rules(
        &self,
        Parameters(req): Parameters<UpdateRulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.runtime.update_rules_text(req.force).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for RulesServer {
    fn get_info(&self) -> ServerInfo {
        let version = self
            .runtime
            .try_version()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = self
            .runtime
            .list_resources()
            .await
            .into_iter()
            .map(to_resource)
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!("Reading resource {}", request.uri);
        match self.runtime.read_resource(&request.uri).await {
            Ok(resource) => Ok(ReadResourceResult {
                contents: vec![to_contents(resource)],
            }),
            Err(e @ RulesError::UnknownResource(_)) => {
                Err(McpError::resource_not_found(e.to_string(), None))
            }
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }
}

fn to_resource(entry: ResourceEntry) -> Resource {
    let mut raw = RawResource::new(entry.uri, entry.name);
    raw.description = Some(entry.description);
    raw.mime_type = Some(entry.mime_type.to_string());
    raw.no_annotation()
}

fn to_contents(resource: ResourceText) -> ResourceContents {
    let mut contents = ResourceContents::text(resource.text, resource.uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(resource.mime_type.to_string());
    }
    contents
}

#[cfg(test)]
mod tests {
    use super::*;
    use critical_rules_core::{RemoteArtifact, RemoteError, RemoteSource, RulesConfig, ToolKind};

    struct OfflineRemote;

    #[async_trait::async_trait]
    impl RemoteSource for OfflineRemote {
        async fn fetch(&self, artifact: RemoteArtifact) -> Result<String, RemoteError> {
            Err(RemoteError::Unavailable {
                artifact,
                message: "offline".to_string(),
            })
        }
    }

    fn server(dir: &tempfile::TempDir) -> RulesServer {
        let mut config = RulesConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.store().write_rules("# Rules\n").unwrap();
        let runtime = RulesRuntime::with_remote(&config, Arc::new(OfflineRemote)).unwrap();
        RulesServer::new(Arc::new(runtime))
    }

    #[test]
    fn test_router_matches_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = server(&dir);

        let mut routed: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        let mut catalog: Vec<String> = ToolKind::ALL.iter().map(|t| t.name().to_string()).collect();
        routed.sort();
        catalog.sort();
        assert_eq!(routed, catalog);
    }

    #[test]
    fn test_server_info() {
        let dir = tempfile::TempDir::new().unwrap();
        let info = server(&dir).get_info();

        assert_eq!(info.server_info.name, SERVER_NAME);
        assert_eq!(info.server_info.version, "1.0.0");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }

    #[test]
    fn test_request_defaults() {
        let info: GetVersionInfoRequest = serde_json::from_str("{}").unwrap();
        assert!(info.check_remote);

        let update: UpdateRulesRequest = serde_json::from_str("{}").unwrap();
        assert!(!update.force);

        assert!(serde_json::from_str::<VerifyComplianceRequest>("{}").is_err());
    }

    #[test]
    fn test_resource_mapping() {
        let contents = to_contents(ResourceText {
            uri: "critical-rules://instructions".to_string(),
            mime_type: "text/markdown",
            text: "# Rules".to_string(),
        });
        match contents {
            ResourceContents::TextResourceContents {
                uri, mime_type, text, ..
            } => {
                assert_eq!(uri, "critical-rules://instructions");
                assert_eq!(mime_type.as_deref(), Some("text/markdown"));
                assert_eq!(text, "# Rules");
            }
            other => panic!("expected text contents, got {:?}", other),
        }
    }
}
