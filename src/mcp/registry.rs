//! Explicit tool registry.
//!
//! Tools are registered by name at startup with a description, an input
//! schema derived from their parameter type, and a handler. Arguments are
//! validated against the parameter type before a handler ever runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::params::SummaryParams;
use crate::error::SummaryError;
use crate::summary::SummaryProvider;

/// Name of the Parquet summary tool.
pub const SUMMARY_TOOL: &str = "summaries_parquet_file";

/// Description of the Parquet summary tool.
pub const SUMMARY_TOOL_DESCRIPTION: &str =
    "Summarise a Parquet file by reporting the number of rows and columns";

type Handler = Box<dyn Fn(&JsonObject) -> Result<String, SummaryError> + Send + Sync>;

/// Errors from dispatching a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    /// No tool is registered under the requested name.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// The requested name.
        name: String,
    },

    /// The tool rejected its arguments or failed.
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// One registered tool.
pub struct RegisteredTool {
    description: &'static str,
    input_schema: Arc<JsonObject>,
    handler: Handler,
}

impl RegisteredTool {
    /// Tool description shown to clients.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// JSON Schema of the tool's arguments.
    #[must_use]
    pub fn input_schema(&self) -> &JsonObject {
        &self.input_schema
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Name-keyed set of tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, RegisteredTool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the Parquet summary tool.
    #[must_use]
    pub fn with_summary_tool(provider: SummaryProvider) -> Self {
        let mut registry = Self::new();
        registry.register(
            SUMMARY_TOOL,
            SUMMARY_TOOL_DESCRIPTION,
            move |params: SummaryParams| {
                provider
                    .summarize(&params.filename)
                    .map(|summary| summary.describe())
            },
        );
        registry
    }

    /// Registers `handler` under `name`, replacing any previous tool.
    ///
    /// The input schema is generated from `P`; arguments that do not
    /// deserialize into `P` are rejected without calling `handler`.
    pub fn register<P, F>(&mut self, name: &'static str, description: &'static str, handler: F)
    where
        P: DeserializeOwned + JsonSchema,
        F: Fn(P) -> Result<String, SummaryError> + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |arguments: &JsonObject| {
            let params = serde_json::from_value::<P>(serde_json::Value::Object(arguments.clone()))
                .map_err(|e| SummaryError::InvalidArguments {
                    message: e.to_string(),
                })?;
            handler(params)
        });

        self.tools.insert(
            name,
            RegisteredTool {
                description,
                input_schema: Arc::new(input_schema::<P>()),
                handler,
            },
        );
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Tool definitions in name order.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|(name, tool)| Tool::new(*name, tool.description, tool.input_schema.clone()))
            .collect()
    }

    /// Dispatches one call.
    ///
    /// # Errors
    ///
    /// - [`ToolCallError::UnknownTool`] if `name` is not registered.
    /// - [`SummaryError::InvalidArguments`] if `arguments` are missing or do
    ///   not match the tool's schema.
    /// - Whatever the handler returns.
    pub fn call(&self, name: &str, arguments: Option<&JsonObject>) -> Result<String, ToolCallError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolCallError::UnknownTool {
            name: name.to_string(),
        })?;
        let arguments = arguments.ok_or_else(|| SummaryError::InvalidArguments {
            message: format!("{name} requires arguments"),
        })?;

        debug!(tool = name, "dispatching tool call");
        Ok((tool.handler)(arguments)?)
    }
}

fn input_schema<P: JsonSchema>() -> JsonObject {
    let schema = schemars::schema_for!(P);
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => JsonObject::new(),
    }
}
