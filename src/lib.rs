//! # research-router
//!
//! Guardrail-gated research routing with a terminal front-end, plus an MCP
//! tool that summarises Parquet files.
//!
//! ## Overview
//!
//! A query first passes a guardrail classifier that decides whether it is a
//! research question. Accepted queries go to a triage model that hands off
//! to exactly one specialist (physics or finance); declined queries return
//! the guardrail's rationale and no specialist is consulted.
//!
//! Independently, the `summaries_parquet_file` MCP tool reports the row and
//! column counts of a Parquet file in a fixed data directory.
//!
//! ## Modules
//!
//! - [`summary`]: Parquet footer summaries
//! - [`agent`]: guardrail, triage, specialists and the router (`agent` feature)
//! - [`mcp`]: MCP server and tool registry (`mcp` feature)
//! - [`cli`]: command-line interface
//! - [`error`]: error types

pub mod cli;
pub mod error;
pub mod summary;

#[cfg(feature = "agent")]
pub mod agent;

#[cfg(feature = "mcp")]
pub mod mcp;

pub use error::{Error, Result};
pub use summary::{FileSummary, SummaryProvider};

#[cfg(feature = "agent")]
pub use agent::{RouteOutcome, Router, RouterConfig, RoutingDecision};

#[cfg(feature = "mcp")]
pub use mcp::{ResearchMcpServer, ToolRegistry};
