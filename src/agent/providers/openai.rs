//! `OpenAI` provider backed by `async-openai`.
//!
//! Any `OpenAI`-compatible endpoint works through the base URL override in
//! [`RouterConfig`].

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool,
    ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequest,
    CreateChatCompletionResponse, FunctionObject, ResponseFormat,
};
use async_trait::async_trait;
use tracing::debug;

use crate::agent::config::RouterConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::agent::session::Credential;
use crate::agent::tool::{ToolCall, ToolDefinition};
use crate::error::AgentError;

/// Chat-completions client for `OpenAI`-compatible APIs.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Creates a provider authenticated with `credential`.
    #[must_use]
    pub fn new(config: &RouterConfig, credential: &Credential) -> Self {
        let mut openai = OpenAIConfig::new().with_api_key(credential.expose());
        if let Some(base_url) = &config.base_url {
            openai = openai.with_api_base(base_url);
        }
        Self {
            client: Client::with_config(openai),
        }
    }

    fn to_openai_message(message: &ChatMessage) -> ChatCompletionRequestMessage {
        let text = message.content.clone();
        match message.role {
            Role::System => ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(text),
                name: None,
            }
            .into(),
            Role::User => ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(text),
                name: None,
            }
            .into(),
        }
    }

    fn to_openai_tool(tool: &ToolDefinition) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                parameters: Some(tool.parameters.clone()),
                strict: None,
            },
        }
    }

    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let tools: Vec<ChatCompletionTool> = request.tools.iter().map(Self::to_openai_tool).collect();
        let tool_choice = (request.require_tool && !tools.is_empty())
            .then_some(ChatCompletionToolChoiceOption::Required);

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(Self::to_openai_message).collect(),
            // Zero is the API default; omitting it keeps reasoning models happy.
            temperature: request.temperature.filter(|&t| t != 0.0),
            max_completion_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat::JsonObject),
            tools: (!tools.is_empty()).then_some(tools),
            tool_choice,
            ..Default::default()
        }
    }

    fn to_tool_call(call: &ChatCompletionMessageToolCall) -> ToolCall {
        ToolCall {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        }
    }

    /// Reads the first choice. A refusal is surfaced as the content.
    fn parse_response(response: CreateChatCompletionResponse) -> ChatResponse {
        let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let Some(choice) = response.choices.into_iter().next() else {
            return ChatResponse {
                usage,
                ..ChatResponse::default()
            };
        };

        let message = choice.message;
        ChatResponse {
            content: message.content.or(message.refusal).unwrap_or_default(),
            usage,
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .iter()
                .map(Self::to_tool_call)
                .collect(),
            finish_reason: choice
                .finish_reason
                .map(|reason| format!("{reason:?}").to_lowercase()),
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        debug!(
            model = %request.model,
            tools = request.tools.len(),
            json_mode = request.json_mode,
            "chat completion request"
        );

        let response = self
            .client
            .chat()
            .create(Self::build_request(request))
            .await
            .map_err(|e| AgentError::RuntimeUnavailable {
                message: e.to_string(),
            })?;

        Ok(Self::parse_response(response))
    }
}
