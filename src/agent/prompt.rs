//! Agent instructions.
//!
//! Each agent's system prompt has a compiled-in default that can be
//! overridden by a markdown file in a prompt directory.

use std::path::{Path, PathBuf};

/// Instructions for the guardrail classifier.
pub const GUARDRAIL_SYSTEM_PROMPT: &str = r"Check if the user is asking about research.

An empty or meaningless message is not a research question.";

/// Output format the guardrail must follow. Appended to any guardrail
/// instructions, including user overrides, because the call runs in JSON mode.
pub const GUARDRAIL_OUTPUT_CONTRACT: &str = r#"Respond with a single JSON object and nothing else:
{"is_research": true | false, "reasoning": "<one or two sentences explaining the decision>"}"#;

/// Instructions for the triage agent.
pub const TRIAGE_SYSTEM_PROMPT: &str = r"You determine which agent to use based on user's research query.

Always hand off by calling exactly one of the transfer tools. Do not answer the question yourself.";

/// Instructions for the physics specialist.
pub const PHYSICS_SYSTEM_PROMPT: &str = r"You provide assistance with Physics Research. Explain your reasoning at each step and include examples.";

/// Instructions for the financial specialist.
pub const FINANCIAL_SYSTEM_PROMPT: &str = r"You provide assistance with Financial Research. Explain important events and context clearly.";

/// Default prompt directory relative to the home directory.
const DEFAULT_PROMPT_DIR: &str = ".config/research-router/prompts";

/// Filename for the guardrail prompt template.
const GUARDRAIL_FILENAME: &str = "guardrail.md";
/// Filename for the triage prompt template.
const TRIAGE_FILENAME: &str = "triage.md";
/// Filename for the physics specialist prompt template.
const PHYSICS_FILENAME: &str = "physics.md";
/// Filename for the financial specialist prompt template.
const FINANCIAL_FILENAME: &str = "financial.md";

/// Resolved system prompts for every agent.
///
/// Loaded once when a router is built; use [`PromptSet::load`] to resolve
/// overrides or [`PromptSet::defaults`] for the compiled-in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Guardrail classifier instructions.
    pub guardrail: String,
    /// Triage agent instructions.
    pub triage: String,
    /// Physics specialist instructions.
    pub physics: String,
    /// Financial specialist instructions.
    pub financial: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Without an explicit directory, `~/.config/research-router/prompts/` is
    /// consulted. Each file is loaded independently; a missing file uses its
    /// default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir.map(PathBuf::from).or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            guardrail: load_file(GUARDRAIL_FILENAME, GUARDRAIL_SYSTEM_PROMPT),
            triage: load_file(TRIAGE_FILENAME, TRIAGE_SYSTEM_PROMPT),
            physics: load_file(PHYSICS_FILENAME, PHYSICS_SYSTEM_PROMPT),
            financial: load_file(FINANCIAL_FILENAME, FINANCIAL_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            guardrail: GUARDRAIL_SYSTEM_PROMPT.to_string(),
            triage: TRIAGE_SYSTEM_PROMPT.to_string(),
            physics: PHYSICS_SYSTEM_PROMPT.to_string(),
            financial: FINANCIAL_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (GUARDRAIL_FILENAME, GUARDRAIL_SYSTEM_PROMPT),
            (TRIAGE_FILENAME, TRIAGE_SYSTEM_PROMPT),
            (PHYSICS_FILENAME, PHYSICS_SYSTEM_PROMPT),
            (FINANCIAL_FILENAME, FINANCIAL_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}
