//! Session-scoped state for the front-end.
//!
//! The credential lives here rather than in the process environment, and is
//! handed to each router explicitly when a query is submitted.

use std::fmt;

use super::config::{RouterConfig, RouterConfigBuilder};
use crate::error::AgentError;

/// Provider choices offered by the front-end.
pub const PROVIDERS: &[&str] = &["OpenAI"];

/// An API key. `Debug` and `Display` never reveal the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw key. Returns `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the secret for use in an outbound request.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Mutable state of one front-end session.
#[derive(Debug, Clone)]
pub struct Session {
    credential: Option<Credential>,
    provider: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            credential: None,
            provider: "openai".to_string(),
        }
    }
}

impl Session {
    /// Creates an empty session using the default provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the session credential. Blank input clears it.
    pub fn set_credential(&mut self, raw: &str) {
        self.credential = Credential::new(raw);
    }

    /// Returns `true` once a credential has been entered.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Selects the provider by its display label (see [`PROVIDERS`]).
    pub fn select_provider(&mut self, label: &str) {
        self.provider = label.to_ascii_lowercase();
    }

    /// Returns the selected provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Resolves the router configuration for one submission.
    ///
    /// The session credential and provider override whatever `base` holds.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if `base` holds invalid values. A
    /// missing key surfaces later, when the provider is created.
    pub fn router_config(&self, base: RouterConfigBuilder) -> Result<RouterConfig, AgentError> {
        let mut builder = base.provider(self.provider.clone());
        if let Some(credential) = &self.credential {
            builder = builder.credential(credential.clone());
        }
        builder.build()
    }
}
