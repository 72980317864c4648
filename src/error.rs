//! Error types for research-router.
//!
//! Each subsystem has its own error enum; [`Error`] wraps them for the CLI
//! boundary. Guardrail declinations are not errors and never appear here.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent routing failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Parquet summary failure.
    #[error(transparent)]
    Summary(#[from] SummaryError),

    /// Command execution failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while talking to the agent runtime.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No credential was supplied before a submit.
    #[error("no API key configured: set OPENAI_API_KEY or enter a key for this session")]
    CredentialMissing,

    /// The guardrail call returned something that is not a verdict.
    #[error("guardrail classification failed: {message}")]
    Classification {
        /// What went wrong.
        message: String,
        /// Raw model output, kept for diagnostics.
        content: String,
    },

    /// Network, auth or timeout failure reaching the runtime.
    #[error("agent runtime unavailable: {message}")]
    RuntimeUnavailable {
        /// Underlying failure.
        message: String,
    },

    /// The triage agent did not hand off to a configured specialist.
    #[error("handoff failed: {message}")]
    Handoff {
        /// Why the handoff could not be resolved.
        message: String,
    },

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Configured provider name.
        name: String,
    },

    /// Invalid configuration value.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the invalid value.
        message: String,
    },
}

/// Errors raised by the Parquet summary provider and its tool shim.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The named file does not exist in the data directory.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Resolved path that was looked up.
        path: PathBuf,
    },

    /// The file exists but is not a readable Parquet file.
    #[error("unreadable parquet file {}: {message}", path.display())]
    UnreadableFormat {
        /// Path of the offending file.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// Tool arguments or filename did not satisfy the declared schema.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// What was wrong with the arguments.
        message: String,
    },
}

/// Errors raised while executing a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered in the requested format.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_error_messages() {
        let err = SummaryError::FileNotFound {
            path: PathBuf::from("data/missing.parquet"),
        };
        assert_eq!(err.to_string(), "file not found: data/missing.parquet");

        let err = SummaryError::InvalidArguments {
            message: "missing required parameter `filename`".to_string(),
        };
        assert!(err.to_string().contains("filename"));
    }

    #[test]
    fn test_error_is_transparent() {
        let err: Error = AgentError::CredentialMissing.into();
        assert!(err.to_string().starts_with("no API key configured"));
    }
}
