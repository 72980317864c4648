//! Command implementations.
//!
//! Each command returns the text to print on stdout; `main` does the
//! printing. Async work runs on a runtime created per command.

use std::path::Path;

use crate::cli::output::OutputFormat;
#[cfg(feature = "mcp")]
use crate::cli::parser::McpCommands;
use crate::cli::parser::{Cli, Commands};
#[cfg(feature = "agent")]
use crate::cli::parser::{PromptCommands, RouterArgs};
use crate::error::{CommandError, Result};
use crate::summary::SummaryProvider;

/// Executes the parsed command and returns its output.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        #[cfg(feature = "agent")]
        Commands::Chat { router } => cmd_chat(router, format),
        #[cfg(feature = "agent")]
        Commands::Ask { query, router } => cmd_ask(query, router, format),
        Commands::Summarize { filename, data_dir } => cmd_summarize(data_dir, filename, format),
        #[cfg(feature = "mcp")]
        Commands::Mcp(sub) => cmd_mcp(sub),
        #[cfg(feature = "agent")]
        Commands::Prompts(PromptCommands::Init { dir }) => {
            cmd_init_prompts(dir.as_deref(), format)
        }
    }
}

fn cmd_summarize(data_dir: &Path, filename: &str, format: OutputFormat) -> Result<String> {
    let summary = SummaryProvider::new(data_dir).summarize(filename)?;

    match format {
        OutputFormat::Text => Ok(format!("{}\n", summary.describe())),
        OutputFormat::Json => Ok(format.to_json(&summary)?),
    }
}

/// Builds router configuration from CLI overrides, then the environment.
#[cfg(feature = "agent")]
fn router_builder(args: &RouterArgs) -> crate::agent::RouterConfigBuilder {
    let mut builder = crate::agent::RouterConfig::builder();
    if let Some(model) = &args.guardrail_model {
        builder = builder.guardrail_model(model);
    }
    if let Some(model) = &args.triage_model {
        builder = builder.triage_model(model);
    }
    if let Some(model) = &args.specialist_model {
        builder = builder.specialist_model(model);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    if let Some(dir) = &args.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    if let Some(path) = &args.trace_file {
        builder = builder.trace_file(path);
    }
    builder.from_env()
}

#[cfg(feature = "agent")]
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

#[cfg(feature = "agent")]
fn cmd_ask(query: &str, args: &RouterArgs, format: OutputFormat) -> Result<String> {
    use crate::cli::frontend::{Frontend, Rendered};

    let frontend = Frontend::new(router_builder(args))?;
    let rendered = runtime()?
        .block_on(frontend.submit(query))
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

    if let Rendered::Failure { message } = &rendered {
        return Err(CommandError::ExecutionFailed(message.clone()).into());
    }

    match format {
        OutputFormat::Text => Ok(format!("{}\n", rendered.text())),
        OutputFormat::Json => Ok(format.to_json(&rendered)?),
    }
}

/// Runs the interactive session until `exit`, `quit` or end of input.
#[cfg(feature = "agent")]
fn cmd_chat(args: &RouterArgs, format: OutputFormat) -> Result<String> {
    use std::time::Duration;

    use dialoguer::console::Term;
    use dialoguer::{Input, Password, Select};
    use indicatif::{ProgressBar, ProgressStyle};

    use crate::agent::PROVIDERS;
    use crate::cli::frontend::Frontend;

    let prompt_failed =
        |e: dialoguer::Error| CommandError::ExecutionFailed(format!("Prompt failed: {e}"));

    let term = Term::stdout();
    let rt = runtime()?;
    let mut frontend = Frontend::new(router_builder(args))?;

    let choice = Select::new()
        .with_prompt("Select a provider")
        .items(PROVIDERS)
        .default(0)
        .interact()
        .map_err(prompt_failed)?;
    frontend.select_provider(PROVIDERS[choice]);

    let env_key = std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.trim().is_empty());
    if !env_key {
        let key = Password::new()
            .with_prompt(format!("{} API key", PROVIDERS[choice]))
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_failed)?;
        frontend.set_credential(&key);
    }

    loop {
        let query: String = Input::new()
            .with_prompt("Research query (exit to quit)")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_failed)?;
        if matches!(query.trim(), "exit" | "quit") {
            break;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Processing...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = rt.block_on(frontend.submit(&query));
        spinner.finish_and_clear();

        let output = match (result, format) {
            (Ok(rendered), OutputFormat::Text) => rendered.text(),
            (Ok(rendered), OutputFormat::Json) => format.to_json(&rendered)?.trim_end().to_string(),
            (Err(e), _) => e.to_string(),
        };
        term.write_line(&output)?;
    }

    Ok(String::new())
}

#[cfg(feature = "agent")]
fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    use std::fmt::Write as _;

    use crate::agent::prompt::PromptSet;

    let target_dir = dir
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown");
                let _ = writeln!(output, "  {name}");
            }
            output.push_str("\nEdit these files to customize agent instructions.\n");
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json)?)
        }
    }
}

/// Starts the MCP server with the specified transport.
///
/// Runs until the client disconnects (stdio) or the server is stopped (HTTP).
#[cfg(feature = "mcp")]
fn cmd_mcp(cmd: &McpCommands) -> Result<String> {
    use crate::mcp::{ResearchMcpServer, serve_http, serve_stdio};

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    rt.block_on(async {
        match cmd {
            McpCommands::Stdio { data_dir } => {
                serve_stdio(ResearchMcpServer::new(SummaryProvider::new(data_dir))).await
            }
            McpCommands::Sse {
                host,
                port,
                data_dir,
            } => {
                let server = ResearchMcpServer::new(SummaryProvider::new(data_dir));
                serve_http(server, host, *port).await
            }
        }
    })
    .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SummaryError};
    use crate::summary::fixtures::write_parquet;
    use clap::Parser;
    use tempfile::TempDir;

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        write_parquet(&dir.path().join("sales.parquet"), 4, 12);
        dir
    }

    #[test]
    fn test_cmd_summarize_text() {
        let dir = data_dir();
        let output = cmd_summarize(dir.path(), "sales.parquet", OutputFormat::Text)
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(output, "Parquet file 'sales.parquet' has 12 rows and 4 columns.\n");
    }

    #[test]
    fn test_cmd_summarize_json() {
        let dir = data_dir();
        let output = cmd_summarize(dir.path(), "sales.parquet", OutputFormat::Json)
            .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&output).unwrap_or(serde_json::Value::Null);
        assert_eq!(value["filename"], "sales.parquet");
        assert_eq!(value["rows"], 12);
        assert_eq!(value["columns"], 4);
    }

    #[test]
    fn test_cmd_summarize_missing() {
        let dir = data_dir();
        let result = cmd_summarize(dir.path(), "missing.parquet", OutputFormat::Text);
        assert!(matches!(
            result,
            Err(Error::Summary(SummaryError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_execute_summarize() {
        let dir = data_dir();
        let data_dir = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "research-router",
            "summarize",
            "sales.parquet",
            "--data-dir",
            data_dir.as_str(),
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        let output = execute(&cli).unwrap_or_else(|e| unreachable!("{e}"));
        assert!(output.contains("12 rows and 4 columns"));
    }

    #[cfg(feature = "agent")]
    #[test]
    fn test_cmd_init_prompts() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let target = dir.path().join("prompts");

        let output = cmd_init_prompts(Some(&target), OutputFormat::Text)
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(output.starts_with("Wrote 4 prompt template(s)"));
        assert!(target.join("guardrail.md").exists());

        let again = cmd_init_prompts(Some(&target), OutputFormat::Text)
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(again.starts_with("All prompt templates already exist"));
    }

    #[cfg(feature = "agent")]
    #[test]
    fn test_router_builder_overrides() {
        let args = RouterArgs {
            specialist_model: Some("gpt-4.1".to_string()),
            timeout: Some(15),
            ..RouterArgs::default()
        };
        let config = router_builder(&args)
            .api_key("sk-test")
            .build()
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(config.specialist_model, "gpt-4.1");
        assert_eq!(config.timeout, std::time::Duration::from_secs(15));
    }
}
