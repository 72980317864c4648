//! Guardrail-gated agent router.
//!
//! Runs one query through the workflow:
//!
//! ```text
//! query → GuardrailAgent ──(not research)──→ Declined { rationale }
//!             │
//!             └─(research)→ TriageAgent ─ transfer_to_* → SpecialistAgent → Answered
//! ```
//!
//! The guardrail always runs first and a specialist is only invoked after an
//! accepting verdict. Every provider call is bounded by the configured
//! timeout; nothing is retried.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::client::create_provider;
use super::config::RouterConfig;
use super::guardrail::{Evaluation, GuardrailAgent};
use super::message::TokenUsage;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::specialist::SpecialistAgent;
use super::trace::{RunTrace, SpanKind};
use super::traits::{Agent, AgentResponse};
use super::triage::TriageAgent;
use crate::error::AgentError;

/// Result of dispatching a query to a specialist.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    /// Name of the specialist that answered.
    pub agent: String,
    /// The specialist's final response.
    pub response: String,
    /// Tokens used across guardrail, triage and specialist.
    pub usage: TokenUsage,
    /// Wall time of the whole run.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Outcome of [`Router::route`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RouteOutcome {
    /// A specialist answered.
    Answered(RoutingDecision),
    /// The guardrail tripped; no specialist was invoked.
    Declined {
        /// The guardrail's rationale, verbatim.
        rationale: String,
    },
}

/// The guardrail, triage and specialist agents of one session.
///
/// Built once from configuration and prompts, then shared read-only by
/// every router created for that session.
pub struct AgentRoster {
    guardrail: GuardrailAgent,
    triage: TriageAgent,
    specialists: Arc<[SpecialistAgent]>,
}

impl AgentRoster {
    /// Builds the default roster from `config` and `prompts`.
    #[must_use]
    pub fn new(config: &RouterConfig, prompts: &PromptSet) -> Self {
        let specialists = SpecialistAgent::defaults(config, prompts);
        Self {
            guardrail: GuardrailAgent::new(config, prompts.guardrail.clone()),
            triage: TriageAgent::new(config, prompts.triage.clone(), &specialists),
            specialists: Arc::from(specialists),
        }
    }

    /// Builds the roster, reading prompt overrides from [`RouterConfig::prompt_dir`].
    #[must_use]
    pub fn load(config: &RouterConfig) -> Self {
        Self::new(config, &PromptSet::load(config.prompt_dir.as_deref()))
    }

    /// The specialists the triage agent can hand off to.
    #[must_use]
    pub fn specialists(&self) -> &[SpecialistAgent] {
        &self.specialists
    }
}

/// Routes research queries to specialist agents.
pub struct Router {
    provider: Arc<dyn LlmProvider>,
    roster: Arc<AgentRoster>,
    timeout: Duration,
    trace_file: Option<PathBuf>,
}

impl Router {
    /// Creates a router with the default specialists.
    ///
    /// Loads prompt templates from [`RouterConfig::prompt_dir`], falling
    /// back to compiled-in defaults.
    pub fn new(provider: Arc<dyn LlmProvider>, config: &RouterConfig) -> Self {
        Self::with_roster(provider, config, Arc::new(AgentRoster::load(config)))
    }

    /// Creates a router using explicit prompts.
    pub fn with_prompts(
        provider: Arc<dyn LlmProvider>,
        config: &RouterConfig,
        prompts: &PromptSet,
    ) -> Self {
        Self::with_roster(provider, config, Arc::new(AgentRoster::new(config, prompts)))
    }

    /// Creates a router over an existing roster.
    pub fn with_roster(
        provider: Arc<dyn LlmProvider>,
        config: &RouterConfig,
        roster: Arc<AgentRoster>,
    ) -> Self {
        Self {
            provider,
            roster,
            timeout: config.timeout,
            trace_file: config.trace_file.clone(),
        }
    }

    /// Creates a router backed by the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::CredentialMissing`] without a credential and
    /// [`AgentError::UnsupportedProvider`] for unknown providers.
    pub fn from_config(config: &RouterConfig) -> Result<Self, AgentError> {
        Ok(Self::new(create_provider(config)?, config))
    }

    /// Returns a router that shares this one's agents but talks to `provider`.
    #[must_use]
    pub fn with_provider(&self, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            roster: Arc::clone(&self.roster),
            timeout: self.timeout,
            trace_file: self.trace_file.clone(),
        }
    }

    /// The agents this router dispatches to.
    #[must_use]
    pub fn roster(&self) -> &Arc<AgentRoster> {
        &self.roster
    }

    /// The specialists this router can hand off to.
    #[must_use]
    pub fn specialists(&self) -> &[SpecialistAgent] {
        self.roster.specialists()
    }

    /// Routes one query.
    ///
    /// Empty queries are not short-circuited; the guardrail decides.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Classification`] if the guardrail call fails or its
    ///   output is malformed.
    /// - [`AgentError::RuntimeUnavailable`] on later transport failures and
    ///   on any timeout.
    /// - [`AgentError::Handoff`] if triage does not pick a known specialist.
    pub async fn route(&self, query: &str) -> Result<RouteOutcome, AgentError> {
        let mut trace = RunTrace::start();
        let result = self.run(query, &mut trace).await;
        trace.finish(&result);
        if let Some(path) = self.trace_file.clone() {
            if let Err(e) = tokio::task::spawn_blocking(move || trace.export(&path)).await {
                warn!(error = %e, "trace export task failed");
            }
        }
        result
    }

    async fn run(&self, query: &str, trace: &mut RunTrace) -> Result<RouteOutcome, AgentError> {
        let start = Instant::now();
        let roster = &self.roster;
        let guardrail = &roster.guardrail;

        let checked = self
            .timed(
                guardrail.name(),
                SpanKind::Guardrail,
                trace,
                |e: &Evaluation| e.usage,
                guardrail.evaluate(self.provider.as_ref(), query),
            )
            .await?;
        if checked.verdict.tripwire_triggered() {
            info!("guardrail tripped; query declined");
            return Ok(RouteOutcome::Declined {
                rationale: checked.verdict.reasoning,
            });
        }

        let triaged = self.call(&roster.triage, SpanKind::Triage, query, trace).await?;
        let specialist = TriageAgent::resolve(&triaged, &roster.specialists)?;
        debug!(specialist = specialist.name(), "handoff resolved");

        let answer = self
            .call(specialist, SpanKind::Specialist, query, trace)
            .await?;

        let usage = checked
            .usage
            .saturating_add(triaged.usage)
            .saturating_add(answer.usage);
        info!(
            specialist = specialist.name(),
            total_tokens = usage.total_tokens,
            "query answered"
        );

        Ok(RouteOutcome::Answered(RoutingDecision {
            agent: specialist.name().to_string(),
            response: answer.content,
            usage,
            elapsed: start.elapsed(),
        }))
    }

    /// Runs one agent call under the timeout and records it in the trace.
    async fn call(
        &self,
        agent: &dyn Agent,
        kind: SpanKind,
        query: &str,
        trace: &mut RunTrace,
    ) -> Result<AgentResponse, AgentError> {
        debug!(agent = agent.name(), model = agent.model(), "calling agent");
        self.timed(
            agent.name(),
            kind,
            trace,
            |r: &AgentResponse| r.usage,
            agent.execute(self.provider.as_ref(), query),
        )
        .await
    }

    async fn timed<T, F>(
        &self,
        name: &str,
        kind: SpanKind,
        trace: &mut RunTrace,
        usage: impl Fn(&T) -> TokenUsage,
        fut: F,
    ) -> Result<T, AgentError>
    where
        F: Future<Output = Result<T, AgentError>>,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(AgentError::RuntimeUnavailable {
                    message: format!(
                        "{name} did not respond within {}s",
                        self.timeout.as_secs_f64()
                    ),
                })
            });

        trace.record(name, kind, started.elapsed(), result.as_ref().map(&usage));
        result
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::{FINANCIAL_SYSTEM_PROMPT, GUARDRAIL_SYSTEM_PROMPT, PHYSICS_SYSTEM_PROMPT};
    use crate::agent::testing::{Reply, ScriptedProvider};
    use tempfile::TempDir;

    fn config() -> RouterConfig {
        RouterConfig::builder()
            .api_key("test")
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn router(provider: &Arc<ScriptedProvider>, config: &RouterConfig) -> Router {
        let provider: Arc<dyn LlmProvider> = provider.clone();
        Router::with_prompts(provider, config, &PromptSet::defaults())
    }

    #[tokio::test]
    async fn test_declined_never_invokes_specialist() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::verdict(false, "This is a cooking question, not research."),
            Reply::Text("should never be used".to_string()),
        ]));
        let router = router(&provider, &config());

        let outcome = router
            .route("How do I bake bread?")
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));

        match outcome {
            RouteOutcome::Declined { rationale } => {
                assert_eq!(rationale, "This is a cooking question, not research.");
            }
            RouteOutcome::Answered(_) => unreachable!("expected a declination"),
        }
        let prompts = provider.system_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(GUARDRAIL_SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn test_accepted_invokes_exactly_one_specialist() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::verdict(true, "Asks about physics."),
            Reply::Tool("transfer_to_physics_researcher".to_string()),
            Reply::Text("Tunnelling happens because...".to_string()),
        ]));
        let router = router(&provider, &config());

        let outcome = router
            .route("Explain quantum tunnelling")
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));

        let RouteOutcome::Answered(decision) = outcome else {
            unreachable!("expected an answer");
        };
        assert_eq!(decision.agent, "Physics Researcher");
        assert_eq!(decision.response, "Tunnelling happens because...");
        assert_eq!(decision.usage.total_tokens, 45);

        let prompts = provider.system_prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with(GUARDRAIL_SYSTEM_PROMPT));
        assert_eq!(prompts[2], PHYSICS_SYSTEM_PROMPT);
        assert!(!prompts.contains(&FINANCIAL_SYSTEM_PROMPT.to_string()));
    }

    #[tokio::test]
    async fn test_specialist_receives_original_query() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::verdict(true, "Finance."),
            Reply::Tool("transfer_to_financial_researcher".to_string()),
            Reply::Text("Rates rose because...".to_string()),
        ]));
        let router = router(&provider, &config());
        let _ = router.route("Why did rates rise in 2022?").await;

        let requests = provider.requests();
        let last = requests.last().unwrap_or_else(|| unreachable!());
        assert_eq!(last.messages[1].content, "Why did rates rise in 2022?");
        assert!(last.tools.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_reaches_guardrail() {
        let provider = Arc::new(ScriptedProvider::new([Reply::verdict(
            false,
            "The message is empty.",
        )]));
        let router = router(&provider, &config());

        let outcome = router.route("").await;
        assert!(matches!(outcome, Ok(RouteOutcome::Declined { .. })));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[1].content, "");
        assert!(requests[0].json_mode);
    }

    #[tokio::test]
    async fn test_malformed_verdict_stops_routing() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::Text("I think so".to_string()),
            Reply::Tool("transfer_to_physics_researcher".to_string()),
        ]));
        let router = router(&provider, &config());

        let result = router.route("Explain entropy").await;
        assert!(matches!(result, Err(AgentError::Classification { .. })));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_guardrail_call_failure_is_classification_error() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::Fail("401 Unauthorized".to_string()),
            Reply::Tool("transfer_to_physics_researcher".to_string()),
        ]));
        let router = router(&provider, &config());

        let result = router.route("Explain entropy").await;
        assert!(matches!(
            result,
            Err(AgentError::Classification { message, .. }) if message.contains("401")
        ));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_specialist_transport_failure_is_runtime_unavailable() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::verdict(true, "Physics."),
            Reply::Tool("transfer_to_physics_researcher".to_string()),
            Reply::Fail("connection reset".to_string()),
        ]));
        let router = router(&provider, &config());

        let result = router.route("Explain entropy").await;
        assert!(matches!(
            result,
            Err(AgentError::RuntimeUnavailable { message }) if message.contains("connection reset")
        ));
    }

    #[tokio::test]
    async fn test_with_provider_shares_agents() {
        let first = Arc::new(ScriptedProvider::new([Reply::verdict(false, "No.")]));
        let second = Arc::new(ScriptedProvider::new([Reply::verdict(false, "Still no.")]));
        let base = router(&first, &config());
        let provider: Arc<dyn LlmProvider> = second.clone();
        let swapped = base.with_provider(provider);

        assert!(Arc::ptr_eq(base.roster(), swapped.roster()));
        let outcome = swapped.route("hello").await;
        assert!(matches!(outcome, Ok(RouteOutcome::Declined { rationale }) if rationale == "Still no."));
        assert!(first.requests().is_empty());
        assert_eq!(second.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_handoff_is_error() {
        let provider = Arc::new(ScriptedProvider::new([
            Reply::verdict(true, "Research."),
            Reply::Text("Let me answer directly.".to_string()),
        ]));
        let router = router(&provider, &config());

        let result = router.route("Explain entropy").await;
        assert!(matches!(result, Err(AgentError::Handoff { .. })));
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_runtime_unavailable() {
        let provider = Arc::new(ScriptedProvider::new([Reply::Hang]));
        let router = router(&provider, &config());

        let result = router.route("Explain entropy").await;
        assert!(matches!(
            result,
            Err(AgentError::RuntimeUnavailable { message }) if message.contains("did not respond")
        ));
    }

    #[tokio::test]
    async fn test_trace_written_per_run() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let trace_path = dir.path().join("runs.jsonl");
        let config = RouterConfig::builder()
            .api_key("test")
            .trace_file(&trace_path)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = Arc::new(ScriptedProvider::new([
            Reply::verdict(true, "Finance."),
            Reply::Tool("transfer_to_financial_researcher".to_string()),
            Reply::Text("Answer.".to_string()),
        ]));
        let router = router(&provider, &config);

        let outcome = router.route("What caused the 2008 crisis?").await;
        assert!(matches!(outcome, Ok(RouteOutcome::Answered(_))));

        let contents = std::fs::read_to_string(&trace_path).unwrap_or_default();
        let value: serde_json::Value =
            serde_json::from_str(contents.trim()).unwrap_or(serde_json::Value::Null);
        assert_eq!(value["outcome"], "answered");
        assert_eq!(value["specialist"], "Financial Researcher");
        assert_eq!(value["spans"].as_array().map_or(0, Vec::len), 3);
    }

    #[tokio::test]
    async fn test_trace_export_failure_does_not_fail_route() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let config = RouterConfig::builder()
            .api_key("test")
            .trace_file(dir.path())
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = Arc::new(ScriptedProvider::new([Reply::verdict(false, "No.")]));
        let router = router(&provider, &config);

        let outcome = router.route("hello").await;
        assert!(matches!(outcome, Ok(RouteOutcome::Declined { .. })));
    }

    #[test]
    fn test_from_config_requires_credential() {
        let config = RouterConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            Router::from_config(&config),
            Err(AgentError::CredentialMissing)
        ));
    }

    #[test]
    fn test_from_config_builds_default_specialists() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let config = RouterConfig::builder()
            .api_key("sk-test")
            .prompt_dir(dir.path())
            .build()
            .unwrap_or_else(|_| unreachable!());
        let router = Router::from_config(&config).unwrap_or_else(|e| unreachable!("{e}"));
        let names: Vec<&str> = router.specialists().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Physics Researcher", "Financial Researcher"]);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = RouteOutcome::Declined {
            rationale: "Not research.".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap_or(serde_json::Value::Null);
        assert_eq!(json["outcome"], "declined");
        assert_eq!(json["rationale"], "Not research.");
    }
}
