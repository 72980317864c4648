//! Provider construction.
//!
//! The only place a [`Credential`] leaves the session: it is handed to the
//! concrete provider here and nowhere else.

use std::sync::Arc;

use tracing::debug;

use crate::agent::config::RouterConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::agent::session::Credential;
use crate::error::AgentError;

/// Creates the provider named by [`RouterConfig::provider`].
///
/// Names are matched case-insensitively, so the front-end's display label
/// (`"OpenAI"`) and the environment value (`"openai"`) select the same
/// provider.
///
/// # Errors
///
/// - [`AgentError::CredentialMissing`] if the config carries no credential.
/// - [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_provider(config: &RouterConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    let credential: &Credential = config
        .credential
        .as_ref()
        .ok_or(AgentError::CredentialMissing)?;

    match config.provider.trim().to_ascii_lowercase().as_str() {
        "openai" => {
            debug!(base_url = ?config.base_url, "creating openai provider");
            Ok(Arc::new(OpenAiProvider::new(config, credential)))
        }
        _ => Err(AgentError::UnsupportedProvider {
            name: config.provider.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("openai" ; "env name")]
    #[test_case("OpenAI" ; "display label")]
    fn test_create_openai_provider(name: &str) {
        let config = RouterConfig::builder()
            .api_key("test")
            .provider(name)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config).unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_missing_credential() {
        let config = RouterConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            create_provider(&config),
            Err(AgentError::CredentialMissing)
        ));
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = RouterConfig::builder()
            .api_key("test")
            .provider("unknown")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let result = create_provider(&config);
        assert!(matches!(
            result,
            Err(AgentError::UnsupportedProvider { name }) if name == "unknown"
        ));
    }
}
