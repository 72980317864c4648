//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::summary::DEFAULT_DATA_DIR;

/// Research Router: guardrail-gated research agents and a Parquet summary tool.
///
/// Routes research questions to a physics or financial specialist after a
/// guardrail check, and serves an MCP tool that reports Parquet row and
/// column counts.
#[derive(Parser, Debug)]
#[command(name = "research-router")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive research session.
    ///
    /// Prompts for a provider and an API key (skipped when `OPENAI_API_KEY`
    /// is set), then answers queries until `exit` or end of input.
    #[cfg(feature = "agent")]
    #[command(after_help = r#"Examples:
  research-router chat
  OPENAI_API_KEY=sk-... research-router chat --trace-file runs.jsonl
"#)]
    Chat {
        /// Router overrides.
        #[command(flatten)]
        router: RouterArgs,
    },

    /// Submit a single query and print the answer.
    ///
    /// Exits non-zero if the query could not be routed. A guardrail
    /// declination is a normal result.
    #[cfg(feature = "agent")]
    #[command(after_help = r#"Examples:
  research-router ask "Explain quantum tunnelling"
  research-router --format json ask "What caused the 2008 financial crisis?"
"#)]
    Ask {
        /// The research question.
        query: String,

        /// Router overrides.
        #[command(flatten)]
        router: RouterArgs,
    },

    /// Report the row and column counts of a Parquet file.
    #[command(after_help = r#"Examples:
  research-router summarize sales.parquet
  research-router summarize sales.parquet --data-dir /srv/parquet
"#)]
    Summarize {
        /// File name relative to the data directory.
        filename: String,

        /// Directory holding Parquet files.
        #[arg(long, env = "PARQUET_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },

    /// MCP server operations.
    #[cfg(feature = "mcp")]
    #[command(subcommand)]
    Mcp(McpCommands),

    /// Prompt template management.
    #[cfg(feature = "agent")]
    #[command(subcommand)]
    Prompts(PromptCommands),
}

/// Router overrides shared by `chat` and `ask`.
///
/// Unset options fall back to the `RESEARCH_*` environment variables.
#[cfg(feature = "agent")]
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RouterArgs {
    /// Model for the guardrail classifier.
    #[arg(long)]
    pub guardrail_model: Option<String>,

    /// Model for the triage agent.
    #[arg(long)]
    pub triage_model: Option<String>,

    /// Model for specialist agents.
    #[arg(long)]
    pub specialist_model: Option<String>,

    /// Per-call timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory with custom prompt templates.
    #[arg(long)]
    pub prompt_dir: Option<PathBuf>,

    /// Append one JSON trace record per run to this file.
    #[arg(long)]
    pub trace_file: Option<PathBuf>,
}

/// MCP server subcommands.
#[cfg(feature = "mcp")]
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Reads JSON-RPC messages from stdin, writes responses to stdout.
    #[command(after_help = r#"Examples:
  research-router mcp stdio
  research-router mcp stdio --data-dir /srv/parquet
"#)]
    Stdio {
        /// Directory holding Parquet files.
        #[arg(long, env = "PARQUET_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },

    /// Start MCP server with streamable HTTP transport.
    #[command(after_help = r#"Examples:
  research-router mcp sse                            # Listen on 127.0.0.1:3000
  research-router mcp sse --host 0.0.0.0 --port 8080
"#)]
    Sse {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to.
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Directory holding Parquet files.
        #[arg(long, env = "PARQUET_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
}

/// Prompt template subcommands.
#[cfg(feature = "agent")]
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Write the default prompt templates for editing.
    ///
    /// Existing files are left untouched.
    #[command(after_help = r#"Examples:
  research-router prompts init
  research-router prompts init --dir ./prompts
"#)]
    Init {
        /// Target directory (default: ~/.config/research-router/prompts).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summarize() {
        let cli = Cli::try_parse_from([
            "research-router",
            "summarize",
            "sales.parquet",
            "--data-dir",
            "/srv/parquet",
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        match cli.command {
            Commands::Summarize { filename, data_dir } => {
                assert_eq!(filename, "sales.parquet");
                assert_eq!(data_dir, PathBuf::from("/srv/parquet"));
            }
            #[allow(unreachable_patterns)]
            _ => unreachable!("expected summarize"),
        }
    }

    #[cfg(feature = "agent")]
    #[test]
    fn test_parse_ask_with_overrides() {
        let cli = Cli::try_parse_from([
            "research-router",
            "--format",
            "json",
            "ask",
            "Explain entropy",
            "--timeout",
            "30",
            "--trace-file",
            "runs.jsonl",
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Ask { query, router } => {
                assert_eq!(query, "Explain entropy");
                assert_eq!(router.timeout, Some(30));
                assert_eq!(router.trace_file, Some(PathBuf::from("runs.jsonl")));
            }
            _ => unreachable!("expected ask"),
        }
    }

    #[cfg(feature = "mcp")]
    #[test]
    fn test_parse_mcp_sse() {
        let cli = Cli::try_parse_from(["research-router", "mcp", "sse", "--port", "8080"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        match cli.command {
            Commands::Mcp(McpCommands::Sse { host, port, .. }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8080);
            }
            _ => unreachable!("expected mcp sse"),
        }
    }
}
