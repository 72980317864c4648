//! MCP server implementation.
//!
//! Exposes the tool registry as MCP tools and the data directory's Parquet
//! files as MCP resources. File reads run under `spawn_blocking` so a slow
//! disk never stalls the rmcp runtime.

use std::sync::Arc;

use rmcp::model::{
    AnnotateAble, CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject,
    ListResourceTemplatesResult, ListResourcesResult, ListToolsResult, PaginatedRequestParams,
    ProtocolVersion, RawResource, RawResourceTemplate, ReadResourceRequestParams,
    ReadResourceResult, Resource, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use tracing::warn;

use super::registry::{ToolCallError, ToolRegistry};
use crate::error::SummaryError;
use crate::summary::SummaryProvider;

/// URI scheme of Parquet file resources.
const RESOURCE_SCHEME: &str = "parquet://";

/// Maps a failed tool call onto the MCP error envelope.
fn to_mcp_error(error: ToolCallError) -> McpError {
    match error {
        ToolCallError::UnknownTool { .. }
        | ToolCallError::Summary(SummaryError::InvalidArguments { .. }) => {
            McpError::invalid_params(error.to_string(), None)
        }
        ToolCallError::Summary(SummaryError::FileNotFound { .. }) => {
            McpError::resource_not_found(error.to_string(), None)
        }
        ToolCallError::Summary(SummaryError::UnreadableFormat { .. }) => {
            McpError::internal_error(error.to_string(), None)
        }
    }
}

/// Research-router MCP server.
///
/// Provides the `summaries_parquet_file` tool and one resource per Parquet
/// file in the data directory.
#[derive(Debug, Clone)]
pub struct ResearchMcpServer {
    registry: Arc<ToolRegistry>,
    provider: SummaryProvider,
}

impl ResearchMcpServer {
    /// Creates a server whose tool reads files from `provider`'s data directory.
    #[must_use]
    pub fn new(provider: SummaryProvider) -> Self {
        Self {
            registry: Arc::new(ToolRegistry::with_summary_tool(provider.clone())),
            provider,
        }
    }

    /// Returns the summary provider.
    #[must_use]
    pub const fn provider(&self) -> &SummaryProvider {
        &self.provider
    }

    /// Runs one tool call off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns the protocol error for a rejected or failed call.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let registry = self.registry.clone();
        let name = name.to_string();

        let text = tokio::task::spawn_blocking(move || {
            registry.call(&name, arguments.as_ref()).map_err(|e| {
                warn!(tool = %name, error = %e, "tool call failed");
                to_mcp_error(e)
            })
        })
        .await
        .map_err(|e| McpError::internal_error(format!("Task join error: {e}"), None))??;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// One resource per Parquet file in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the directory cannot be read.
    pub async fn resources(&self) -> Result<Vec<Resource>, McpError> {
        let provider = self.provider.clone();

        let names = tokio::task::spawn_blocking(move || provider.list_files())
            .await
            .map_err(|e| McpError::internal_error(format!("Task join error: {e}"), None))?
            .map_err(|e| {
                McpError::internal_error(format!("Failed to list data directory: {e}"), None)
            })?;

        Ok(names
            .into_iter()
            .map(|name| {
                let mut raw = RawResource::new(format!("{RESOURCE_SCHEME}{name}"), name);
                raw.description = Some("Row and column counts of a Parquet file".to_string());
                raw.mime_type = Some("application/json".to_string());
                raw.no_annotation()
            })
            .collect())
    }

    /// Reads the summary of the file named by a `parquet://` URI as JSON.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` for a foreign URI and otherwise the same
    /// errors as the summary tool.
    pub async fn read_summary(&self, uri: &str) -> Result<String, McpError> {
        let filename = uri
            .strip_prefix(RESOURCE_SCHEME)
            .ok_or_else(|| {
                McpError::invalid_params(
                    format!("Invalid URI scheme, expected {RESOURCE_SCHEME}: {uri}"),
                    None,
                )
            })?
            .to_string();
        let provider = self.provider.clone();

        let summary = tokio::task::spawn_blocking(move || provider.summarize(&filename))
            .await
            .map_err(|e| McpError::internal_error(format!("Task join error: {e}"), None))?
            .map_err(|e| to_mcp_error(e.into()))?;

        serde_json::to_string_pretty(&summary)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {e}"), None))
    }
}

impl ServerHandler for ResearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "research-router".to_string(),
                title: Some("Research Router MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: Some("https://github.com/zircote/research-router".to_string()),
            },
            instructions: Some(
                "Use the `summaries_parquet_file` tool with a `filename` relative to the \
                 server's data directory to get its row and column counts. Files are also \
                 listed as parquet:// resources."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.registry.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        CallToolRequestParams {
            name, arguments, ..
        }: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(&name, arguments).await
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: self.resources().await?,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParams { uri, .. }: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let content = self.read_summary(&uri).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(content, uri)],
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let template = RawResourceTemplate {
            uri_template: format!("{RESOURCE_SCHEME}{{filename}}"),
            name: "Parquet file summary".to_string(),
            title: None,
            description: Some(
                "Returns JSON with the filename, row count and column count of a Parquet file."
                    .to_string(),
            ),
            mime_type: Some("application/json".to_string()),
            icons: None,
        };

        Ok(ListResourceTemplatesResult {
            resource_templates: vec![template.no_annotation()],
            next_cursor: None,
            meta: None,
        })
    }
}
