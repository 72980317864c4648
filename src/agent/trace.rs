//! Per-run trace records.
//!
//! A [`RunTrace`] collects one span per agent call. When a trace file is
//! configured the finished trace is appended as a JSON line. Export is best
//! effort: failures are logged and never reach the caller.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

use super::message::TokenUsage;
use super::router::RouteOutcome;
use crate::error::AgentError;

/// Role of the agent behind a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Guardrail classification.
    Guardrail,
    /// Triage handoff selection.
    Triage,
    /// Specialist answer.
    Specialist,
}

/// One agent call.
#[derive(Debug, Clone, Serialize)]
pub struct TraceSpan {
    /// Agent name.
    pub agent: String,
    /// Agent role.
    pub kind: SpanKind,
    /// Wall time of the call.
    pub elapsed_ms: u64,
    /// Tokens reported by the provider.
    pub total_tokens: u32,
    /// Error message when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Trace of a single `route` call.
#[derive(Debug, Clone, Serialize)]
pub struct RunTrace {
    /// Workflow label.
    pub workflow: &'static str,
    /// Unix time the run started, in milliseconds.
    pub started_at_ms: u64,
    /// Wall time of the whole run.
    pub elapsed_ms: u64,
    /// `"answered"`, `"declined"` or `"error"`.
    pub outcome: &'static str,
    /// Specialist that answered, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialist: Option<String>,
    /// Calls in the order they were made.
    pub spans: Vec<TraceSpan>,
    #[serde(skip)]
    started: Instant,
}

impl Default for RunTrace {
    fn default() -> Self {
        Self::start()
    }
}

impl RunTrace {
    /// Starts a new trace.
    #[must_use]
    pub fn start() -> Self {
        let started_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, millis);
        Self {
            workflow: "research-router",
            started_at_ms,
            elapsed_ms: 0,
            outcome: "pending",
            specialist: None,
            spans: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Records a finished agent call.
    pub fn record(
        &mut self,
        agent: &str,
        kind: SpanKind,
        elapsed: Duration,
        result: Result<TokenUsage, &AgentError>,
    ) {
        let (total_tokens, error) = match result {
            Ok(usage) => (usage.total_tokens, None),
            Err(e) => (0, Some(e.to_string())),
        };
        self.spans.push(TraceSpan {
            agent: agent.to_string(),
            kind,
            elapsed_ms: millis(elapsed),
            total_tokens,
            error,
        });
    }

    /// Marks the run finished with `result`.
    pub fn finish(&mut self, result: &Result<RouteOutcome, AgentError>) {
        self.elapsed_ms = millis(self.started.elapsed());
        match result {
            Ok(RouteOutcome::Answered(decision)) => {
                self.outcome = "answered";
                self.specialist = Some(decision.agent.clone());
            }
            Ok(RouteOutcome::Declined { .. }) => self.outcome = "declined",
            Err(_) => self.outcome = "error",
        }
    }

    /// Appends this trace as one JSON line to `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or written.
    pub fn try_export(&self, path: &Path) -> std::io::Result<()> {
        let line = serde_json::to_string(self).map_err(std::io::Error::other)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }

    /// Exports the trace, logging instead of failing.
    pub fn export(&self, path: &Path) {
        if let Err(e) = self.try_export(path) {
            warn!(path = %path.display(), error = %e, "trace export failed");
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
