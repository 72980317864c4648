//! Triage agent.
//!
//! Sees each specialist as a `transfer_to_*` tool and must call exactly one;
//! the called tool names the specialist that answers the query.

use async_trait::async_trait;

use super::config::RouterConfig;
use super::specialist::SpecialistAgent;
use super::tool::ToolDefinition;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that picks which specialist handles a query.
pub struct TriageAgent {
    model: String,
    system_prompt: String,
    handoffs: Vec<ToolDefinition>,
}

impl TriageAgent {
    /// Name reported in logs and traces.
    pub const NAME: &'static str = "Triage Agent";

    /// Creates a triage agent that can hand off to `specialists`.
    #[must_use]
    pub fn new(config: &RouterConfig, system_prompt: String, specialists: &[SpecialistAgent]) -> Self {
        Self {
            model: config.triage_model.clone(),
            system_prompt,
            handoffs: specialists.iter().map(SpecialistAgent::handoff_tool).collect(),
        }
    }

    /// Resolves the triage response to one of `specialists`.
    ///
    /// When the model emits several handoff calls, the first one wins.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Handoff`] if no handoff was called or the
    /// called tool names no configured specialist.
    pub fn resolve<'a>(
        response: &AgentResponse,
        specialists: &'a [SpecialistAgent],
    ) -> Result<&'a SpecialistAgent, AgentError> {
        let call = response.tool_calls.first().ok_or_else(|| AgentError::Handoff {
            message: "triage agent answered without handing off to a specialist".to_string(),
        })?;

        specialists
            .iter()
            .find(|s| s.handoff_name() == call.name)
            .ok_or_else(|| AgentError::Handoff {
                message: format!("unknown handoff target: {}", call.name),
            })
    }
}

#[async_trait]
impl Agent for TriageAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        256
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.handoffs.clone()
    }

    fn require_tool(&self) -> bool {
        true
    }
}
