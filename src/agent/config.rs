//! Router configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use super::session::Credential;
use crate::error::AgentError;

/// Default model for the guardrail classifier.
const DEFAULT_GUARDRAIL_MODEL: &str = "gpt-4o-mini";
/// Default model for the triage (handoff) agent.
const DEFAULT_TRIAGE_MODEL: &str = "gpt-4o-mini";
/// Default model for specialist agents.
const DEFAULT_SPECIALIST_MODEL: &str = "gpt-4o";
/// Default guardrail max tokens.
const DEFAULT_GUARDRAIL_MAX_TOKENS: u32 = 512;
/// Default specialist max tokens.
const DEFAULT_SPECIALIST_MAX_TOKENS: u32 = 2048;
/// Default timeout for a single runtime call, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for one router instance.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API credential for the provider. Checked when the provider is created.
    pub credential: Option<Credential>,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the guardrail agent.
    pub guardrail_model: String,
    /// Model for the triage agent.
    pub triage_model: String,
    /// Model for specialist agents.
    pub specialist_model: String,
    /// Maximum tokens for guardrail responses.
    pub guardrail_max_tokens: u32,
    /// Maximum tokens for specialist responses.
    pub specialist_max_tokens: u32,
    /// Upper bound on each runtime call.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    pub prompt_dir: Option<PathBuf>,
    /// JSONL file receiving one trace record per run.
    pub trace_file: Option<PathBuf>,
}

impl RouterConfig {
    /// Creates a new builder for `RouterConfig`.
    #[must_use]
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for invalid values.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`RouterConfig`].
#[derive(Debug, Clone, Default)]
pub struct RouterConfigBuilder {
    provider: Option<String>,
    credential: Option<Credential>,
    base_url: Option<String>,
    guardrail_model: Option<String>,
    triage_model: Option<String>,
    specialist_model: Option<String>,
    guardrail_max_tokens: Option<u32>,
    specialist_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
    trace_file: Option<PathBuf>,
}

impl RouterConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("RESEARCH_PROVIDER").ok();
        }
        if self.credential.is_none() {
            self.credential = std::env::var("OPENAI_API_KEY")
                .ok()
                .and_then(Credential::new);
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL").ok();
        }
        if self.guardrail_model.is_none() {
            self.guardrail_model = std::env::var("RESEARCH_GUARDRAIL_MODEL").ok();
        }
        if self.triage_model.is_none() {
            self.triage_model = std::env::var("RESEARCH_TRIAGE_MODEL").ok();
        }
        if self.specialist_model.is_none() {
            self.specialist_model = std::env::var("RESEARCH_SPECIALIST_MODEL").ok();
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("RESEARCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("RESEARCH_PROMPT_DIR").ok().map(PathBuf::from);
        }
        if self.trace_file.is_none() {
            self.trace_file = std::env::var("RESEARCH_TRACE_FILE").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key. Blank keys are ignored.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        if let Some(credential) = Credential::new(key) {
            self.credential = Some(credential);
        }
        self
    }

    /// Sets the credential.
    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the guardrail model.
    #[must_use]
    pub fn guardrail_model(mut self, model: impl Into<String>) -> Self {
        self.guardrail_model = Some(model.into());
        self
    }

    /// Sets the triage model.
    #[must_use]
    pub fn triage_model(mut self, model: impl Into<String>) -> Self {
        self.triage_model = Some(model.into());
        self
    }

    /// Sets the specialist model.
    #[must_use]
    pub fn specialist_model(mut self, model: impl Into<String>) -> Self {
        self.specialist_model = Some(model.into());
        self
    }

    /// Sets the specialist max tokens.
    #[must_use]
    pub const fn specialist_max_tokens(mut self, n: u32) -> Self {
        self.specialist_max_tokens = Some(n);
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Sets the trace export file.
    #[must_use]
    pub fn trace_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace_file = Some(path.into());
        self
    }

    /// Builds the [`RouterConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for a zero timeout. A missing
    /// credential is not an error here; see [`crate::agent::client::create_provider`].
    pub fn build(self) -> Result<RouterConfig, AgentError> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(AgentError::Config {
                message: "timeout must be greater than zero".to_string(),
            });
        }

        Ok(RouterConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            credential: self.credential,
            base_url: self.base_url,
            guardrail_model: self
                .guardrail_model
                .unwrap_or_else(|| DEFAULT_GUARDRAIL_MODEL.to_string()),
            triage_model: self
                .triage_model
                .unwrap_or_else(|| DEFAULT_TRIAGE_MODEL.to_string()),
            specialist_model: self
                .specialist_model
                .unwrap_or_else(|| DEFAULT_SPECIALIST_MODEL.to_string()),
            guardrail_max_tokens: self
                .guardrail_max_tokens
                .unwrap_or(DEFAULT_GUARDRAIL_MAX_TOKENS),
            specialist_max_tokens: self
                .specialist_max_tokens
                .unwrap_or(DEFAULT_SPECIALIST_MAX_TOKENS),
            timeout,
            prompt_dir: self.prompt_dir,
            trace_file: self.trace_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = RouterConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.credential.as_ref().map(Credential::expose), Some("test-key"));
        assert_eq!(config.guardrail_model, DEFAULT_GUARDRAIL_MODEL);
        assert_eq!(config.specialist_model, DEFAULT_SPECIALIST_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.trace_file.is_none());
    }

    #[test]
    fn test_builder_without_api_key() {
        let config = RouterConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_builder_blank_api_key_is_ignored() {
        let config = RouterConfig::builder()
            .api_key("  ")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_builder_zero_timeout() {
        let result = RouterConfig::builder()
            .api_key("key")
            .timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(AgentError::Config { .. })));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = RouterConfig::builder()
            .api_key("key")
            .provider("custom")
            .triage_model("gpt-4.1-mini")
            .specialist_max_tokens(4096)
            .timeout(Duration::from_secs(30))
            .trace_file("/tmp/trace.jsonl")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.triage_model, "gpt-4.1-mini");
        assert_eq!(config.specialist_max_tokens, 4096);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.trace_file, Some(PathBuf::from("/tmp/trace.jsonl")));
    }
}
