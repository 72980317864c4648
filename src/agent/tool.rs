//! Tool type definitions for function-calling.
//!
//! Handoffs to specialist agents are presented to the triage model as
//! tools named `transfer_to_<agent>`; a call to one of them is the routing
//! decision.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Prefix shared by all handoff tool names.
pub const HANDOFF_PREFIX: &str = "transfer_to_";

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// Returns the handoff tool name for an agent, e.g.
/// `"Physics Researcher"` → `"transfer_to_physics_researcher"`.
#[must_use]
pub fn handoff_tool_name(agent_name: &str) -> String {
    let mut slug = String::with_capacity(agent_name.len());
    let mut pending_sep = false;
    for ch in agent_name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    format!("{HANDOFF_PREFIX}{slug}")
}

/// Builds the handoff tool definition for an agent.
#[must_use]
pub fn handoff_tool(agent_name: &str, handoff_description: &str) -> ToolDefinition {
    ToolDefinition {
        name: handoff_tool_name(agent_name),
        description: format!(
            "Handoff to the {agent_name} agent to handle the request. {handoff_description}"
        ),
        parameters: json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}
