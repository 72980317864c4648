//! Scripted provider for agent tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use super::tool::ToolCall;
use crate::error::AgentError;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Plain text content.
    Text(String),
    /// A single tool call with the given name.
    Tool(String),
    /// A transport failure.
    Fail(String),
    /// Never completes.
    Hang,
}

impl Reply {
    /// Guardrail verdict reply.
    pub fn verdict(is_research: bool, reasoning: &str) -> Self {
        Self::Text(
            serde_json::json!({ "is_research": is_research, "reasoning": reasoning }).to_string(),
        )
    }
}

/// Provider that answers from a queue and records every request.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Creates a provider that replies in order.
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// System prompts of the requests received so far.
    pub fn system_prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.messages.first().map(|m| m.content.clone()))
            .collect()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };

        match reply {
            Some(Reply::Text(content)) => Ok(ChatResponse {
                content,
                usage,
                tool_calls: Vec::new(),
                finish_reason: Some("stop".to_string()),
            }),
            Some(Reply::Tool(name)) => Ok(ChatResponse {
                content: String::new(),
                usage,
                tool_calls: vec![ToolCall {
                    id: "call_0".to_string(),
                    name,
                    arguments: "{}".to_string(),
                }],
                finish_reason: Some("tool_calls".to_string()),
            }),
            Some(Reply::Fail(message)) => Err(AgentError::RuntimeUnavailable { message }),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(AgentError::RuntimeUnavailable {
                message: "script exhausted".to_string(),
            }),
        }
    }
}
