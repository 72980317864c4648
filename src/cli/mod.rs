//! CLI layer for research-router.
//!
//! Provides the command-line interface using clap, with commands for the
//! interactive research session, one-shot queries, Parquet summaries and
//! the MCP server.

pub mod commands;
#[cfg(feature = "agent")]
pub mod frontend;
pub mod output;
pub mod parser;

pub use commands::execute;
#[cfg(feature = "agent")]
pub use frontend::{Frontend, FrontendError, Rendered};
pub use output::OutputFormat;
#[cfg(feature = "mcp")]
pub use parser::McpCommands;
pub use parser::{Cli, Commands};
#[cfg(feature = "agent")]
pub use parser::{PromptCommands, RouterArgs};
