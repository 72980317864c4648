//! Agent trait definition.
//!
//! The guardrail, triage and specialist agents implement this trait, which
//! turns an agent's fixed configuration plus one user message into a single
//! chat request.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use super::tool::{ToolCall, ToolDefinition};
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone, Default)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Tool calls the agent requested (handoffs for the triage agent).
    pub tool_calls: Vec<ToolCall>,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"tool_calls"`).
    pub finish_reason: Option<String>,
}

impl From<ChatResponse> for AgentResponse {
    fn from(response: ChatResponse) -> Self {
        Self {
            content: response.content,
            tool_calls: response.tool_calls,
            usage: response.usage,
            finish_reason: response.finish_reason,
        }
    }
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a specific role (guardrail, triage, specialist)
/// with fixed instructions and model configuration.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging, tracing and handoff resolution.
    fn name(&self) -> &str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Tool definitions available to this agent.
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Whether the agent must answer with a tool call.
    fn require_tool(&self) -> bool {
        false
    }

    /// Builds the chat request for one user message.
    fn build_request(&self, user_msg: &str) -> ChatRequest {
        ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(self.system_prompt()), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
            tools: self.tools(),
            require_tool: self.require_tool(),
        }
    }

    /// Executes the agent with the given user message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = self.build_request(user_msg);
        let response = provider.chat(&request).await?;
        Ok(response.into())
    }
}
