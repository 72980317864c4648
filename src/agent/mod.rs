//! Guardrail-gated research routing.
//!
//! Answers a research query by consulting a guardrail classifier, handing the
//! query to a triage model that picks a domain specialist, and returning that
//! specialist's answer. Uses a pluggable provider abstraction backed by
//! OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! User query → Router
//!   ├── GuardrailAgent (is this research?) ──no──→ Declined
//!   ├── TriageAgent (transfer_to_* handoff tools, tool choice required)
//!   └── SpecialistAgent (Physics / Financial) → Answered
//! ```
//!
//! # Feature Gate
//!
//! This module requires the `agent` feature flag:
//! ```toml
//! [dependencies]
//! research-router = { version = "...", features = ["agent"] }
//! ```

pub mod client;
pub mod config;
pub mod guardrail;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod router;
pub mod session;
pub mod specialist;
pub mod tool;
pub mod trace;
pub mod traits;
pub mod triage;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use config::{RouterConfig, RouterConfigBuilder};
pub use guardrail::{Evaluation, GuardrailAgent, GuardrailVerdict};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use router::{AgentRoster, RouteOutcome, Router, RoutingDecision};
pub use session::{Credential, PROVIDERS, Session};
pub use specialist::SpecialistAgent;
pub use tool::{ToolCall, ToolDefinition};
pub use traits::{Agent, AgentResponse};
pub use triage::TriageAgent;
