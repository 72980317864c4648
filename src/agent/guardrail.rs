//! Guardrail agent.
//!
//! Classifies whether a query is a research question before any specialist
//! is consulted. A negative verdict trips the guardrail and ends the run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::RouterConfig;
use super::message::TokenUsage;
use super::prompt::GUARDRAIL_OUTPUT_CONTRACT;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::error::AgentError;

/// Structured judgment on whether a query is in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    /// `true` when the query is a research question.
    pub is_research: bool,
    /// The classifier's rationale.
    pub reasoning: String,
}

impl GuardrailVerdict {
    /// Whether this verdict trips the guardrail.
    #[must_use]
    pub const fn tripwire_triggered(&self) -> bool {
        !self.is_research
    }
}

/// A verdict plus the tokens spent reaching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The parsed verdict.
    pub verdict: GuardrailVerdict,
    /// Provider-reported usage for the classification call.
    pub usage: TokenUsage,
}

/// Agent that classifies queries as research or not.
pub struct GuardrailAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl GuardrailAgent {
    /// Name reported in logs and traces.
    pub const NAME: &'static str = "Guardrail Check";

    /// Creates a guardrail agent with the given configuration and instructions.
    ///
    /// The JSON output contract is appended to `instructions`.
    #[must_use]
    pub fn new(config: &RouterConfig, instructions: String) -> Self {
        Self {
            model: config.guardrail_model.clone(),
            max_tokens: config.guardrail_max_tokens,
            system_prompt: format!("{}\n\n{GUARDRAIL_OUTPUT_CONTRACT}", instructions.trim_end()),
        }
    }

    /// Classifies `query` with a single provider call.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Classification`] if the provider call fails or
    /// the reply is not a verdict. A failed call keeps its cause in
    /// `message` and leaves `content` empty.
    pub async fn evaluate(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
    ) -> Result<Evaluation, AgentError> {
        let response = self
            .execute(provider, query)
            .await
            .map_err(|e| AgentError::Classification {
                message: format!("guardrail call failed: {e}"),
                content: String::new(),
            })?;
        Ok(Evaluation {
            verdict: Self::parse_verdict(&response.content)?,
            usage: response.usage,
        })
    }

    /// Parses the classifier's JSON output into a verdict.
    ///
    /// Tolerates a surrounding markdown code fence.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Classification`] if the content is not a verdict.
    pub fn parse_verdict(content: &str) -> Result<GuardrailVerdict, AgentError> {
        let trimmed = content.trim();

        let json_str = if trimmed.starts_with("```") {
            trimmed
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
        } else {
            trimmed
        };

        serde_json::from_str::<GuardrailVerdict>(json_str).map_err(|e| {
            AgentError::Classification {
                message: format!("malformed guardrail verdict: {e}"),
                content: content.to_string(),
            }
        })
    }
}

#[async_trait]
impl Agent for GuardrailAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
