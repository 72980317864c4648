//! Domain specialist agents.
//!
//! Specialists are plain configuration: a name, a one-line handoff
//! description shown to the triage agent, and instructions. They are built
//! once per router and never mutated.

use async_trait::async_trait;

use super::config::RouterConfig;
use super::prompt::PromptSet;
use super::tool::{ToolDefinition, handoff_tool, handoff_tool_name};
use super::traits::Agent;

/// A named, instruction-bound responder for one research domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistAgent {
    name: String,
    handoff_description: String,
    instructions: String,
    model: String,
    max_tokens: u32,
}

impl SpecialistAgent {
    /// Creates a specialist.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        handoff_description: impl Into<String>,
        instructions: impl Into<String>,
        config: &RouterConfig,
    ) -> Self {
        Self {
            name: name.into(),
            handoff_description: handoff_description.into(),
            instructions: instructions.into(),
            model: config.specialist_model.clone(),
            max_tokens: config.specialist_max_tokens,
        }
    }

    /// The physics research specialist.
    #[must_use]
    pub fn physics(config: &RouterConfig, prompts: &PromptSet) -> Self {
        Self::new(
            "Physics Researcher",
            "Specialist agent for Physics Research",
            prompts.physics.clone(),
            config,
        )
    }

    /// The financial research specialist.
    #[must_use]
    pub fn financial(config: &RouterConfig, prompts: &PromptSet) -> Self {
        Self::new(
            "Financial Researcher",
            "Specialist agent for Financial Research",
            prompts.financial.clone(),
            config,
        )
    }

    /// The default specialist set offered to the triage agent.
    #[must_use]
    pub fn defaults(config: &RouterConfig, prompts: &PromptSet) -> Vec<Self> {
        vec![Self::physics(config, prompts), Self::financial(config, prompts)]
    }

    /// Description the triage agent sees for this handoff.
    #[must_use]
    pub fn handoff_description(&self) -> &str {
        &self.handoff_description
    }

    /// Tool name the triage agent calls to select this specialist.
    #[must_use]
    pub fn handoff_name(&self) -> String {
        handoff_tool_name(&self.name)
    }

    /// Tool definition exposing this specialist as a handoff target.
    #[must_use]
    pub fn handoff_tool(&self) -> ToolDefinition {
        handoff_tool(&self.name, &self.handoff_description)
    }
}

#[async_trait]
impl Agent for SpecialistAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.instructions
    }

    fn temperature(&self) -> f32 {
        0.3
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
