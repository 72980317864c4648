//! Front-end session.
//!
//! [`Frontend`] owns the session credential and turns each submitted query
//! into exactly one [`Router::route`] call. A submission made while another
//! is still pending is rejected, never queued.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::client::create_provider;
use crate::agent::{
    AgentRoster, LlmProvider, RouteOutcome, Router, RouterConfig, RouterConfigBuilder, Session,
};
use crate::error::AgentError;

/// Creates the provider for one submission from the resolved configuration.
pub type ProviderFactory =
    Box<dyn Fn(&RouterConfig) -> Result<Arc<dyn LlmProvider>, AgentError> + Send + Sync>;

/// Front-end rejections that are not routing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrontendError {
    /// A submission is already in flight.
    #[error("a request is already being processed")]
    Busy,
}

/// What the user sees after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rendered {
    /// A specialist answered.
    Answer {
        /// Specialist name.
        agent: String,
        /// The answer text.
        text: String,
    },
    /// The guardrail declined the query.
    Declined {
        /// The guardrail's rationale.
        rationale: String,
    },
    /// The submission failed.
    Failure {
        /// Error description.
        message: String,
    },
}

impl Rendered {
    /// Text shown in the output area.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Answer { text, .. } => text.clone(),
            Self::Declined { rationale } => format!("request declined: {rationale}"),
            Self::Failure { message } => format!("error: {message}"),
        }
    }

    /// Whether this is a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

impl From<Result<RouteOutcome, AgentError>> for Rendered {
    fn from(result: Result<RouteOutcome, AgentError>) -> Self {
        match result {
            Ok(RouteOutcome::Answered(decision)) => Self::Answer {
                agent: decision.agent,
                text: decision.response,
            },
            Ok(RouteOutcome::Declined { rationale }) => Self::Declined { rationale },
            Err(e) => Self::Failure {
                message: e.to_string(),
            },
        }
    }
}

/// One interactive session.
///
/// The agents are built once, when the session starts. Each submission only
/// resolves the credential and provider.
pub struct Frontend {
    session: Session,
    base: RouterConfigBuilder,
    roster: Arc<AgentRoster>,
    connect: ProviderFactory,
    in_flight: tokio::sync::Mutex<()>,
    last: Mutex<Option<Rendered>>,
}

impl Frontend {
    /// Creates a front-end whose routers are configured from `base` plus
    /// the session.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if `base` holds invalid values.
    pub fn new(base: RouterConfigBuilder) -> Result<Self, AgentError> {
        Self::with_provider_factory(base, Box::new(create_provider))
    }

    /// Creates a front-end with a custom provider factory.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if `base` holds invalid values.
    pub fn with_provider_factory(
        base: RouterConfigBuilder,
        connect: ProviderFactory,
    ) -> Result<Self, AgentError> {
        let config = base.clone().build()?;
        let roster = Arc::new(AgentRoster::load(&config));
        debug!(
            specialists = roster.specialists().len(),
            "agents ready for session"
        );
        Ok(Self {
            session: Session::new(),
            base,
            roster,
            connect,
            in_flight: tokio::sync::Mutex::new(()),
            last: Mutex::new(None),
        })
    }

    /// The session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Selects the provider by display label.
    pub fn select_provider(&mut self, label: &str) {
        self.session.select_provider(label);
    }

    /// Stores the credential for later submissions.
    pub fn set_credential(&mut self, raw: &str) {
        self.session.set_credential(raw);
    }

    /// The most recent rendered output.
    #[must_use]
    pub fn last_output(&self) -> Option<Rendered> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn router(&self) -> Result<Router, AgentError> {
        let config = self.session.router_config(self.base.clone())?;
        let provider = (self.connect)(&config)?;
        Ok(Router::with_roster(provider, &config, Arc::clone(&self.roster)))
    }

    /// Submits one query.
    ///
    /// Routing failures, including a missing credential, are rendered as
    /// [`Rendered::Failure`].
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Busy`] if a submission is already pending.
    pub async fn submit(&self, query: &str) -> Result<Rendered, FrontendError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("submission rejected: previous request still pending");
            return Err(FrontendError::Busy);
        };

        let result = match self.router() {
            Ok(router) => {
                debug!(provider = self.session.provider(), "submitting query");
                router.route(query).await
            }
            Err(e) => Err(e),
        };

        let rendered = Rendered::from(result);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(rendered.clone());
        Ok(rendered)
    }
}
