use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use prdraft_agent::{create_agent, AgentConfig, AgentType};
use prdraft_core::{Pipeline, PipelineOutcome, RunError, DEFAULT_MAX_DIFF_BYTES};
use prdraft_git::{PatchRequest, DEFAULT_REMOTE};
use prdraft_logging::{init_tracing, LogEvent, LogFormat, Logger};

mod config;

use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "prdraft",
    about = "Generate a pull request description from the diff between two git branches",
    after_help = "Example: prdraft --repo-path ./my-repo --feature-branch my-feature --base-branch main",
    version,
    author
)]
struct Cli {
    /// Path to the local git repository
    #[arg(short, long, alias = "repo_path", default_value = ".")]
    repo_path: PathBuf,

    /// Branch with the new code
    #[arg(short, long, alias = "feature_branch")]
    feature_branch: String,

    /// Branch to compare against (default: base_branch from prdraft.toml, else main)
    #[arg(short, long, alias = "base_branch", conflicts_with = "detect_base")]
    base_branch: Option<String>,

    /// Detect the base branch: remote HEAD, then main, then master
    #[arg(long)]
    detect_base: bool,

    /// Remote consulted by --detect-base (default: origin)
    #[arg(long)]
    remote: Option<String>,

    /// Agent that writes the description
    #[arg(short, long, value_enum)]
    agent: Option<AgentChoice>,

    /// Run this agent binary instead of the one on PATH
    #[arg(long)]
    agent_path: Option<PathBuf>,

    /// Model to use (if agent supports it)
    #[arg(short, long)]
    model: Option<String>,

    /// Give up on the agent after this long, e.g. "90s" or "5m"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Cut diffs longer than this many bytes before sending them to the agent
    #[arg(long)]
    max_diff_bytes: Option<usize>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append JSON log events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the patch and exit without running the agent
    #[arg(long)]
    patch_only: bool,

    /// Output the final result as JSON
    #[arg(long, conflicts_with = "patch_only")]
    json_output: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentChoice {
    Claude,
    Opencode,
    Cursor,
}

impl From<AgentChoice> for AgentType {
    fn from(choice: AgentChoice) -> Self {
        match choice {
            AgentChoice::Claude => AgentType::ClaudeCode,
            AgentChoice::Opencode => AgentType::OpenCode,
            AgentChoice::Cursor => AgentType::Cursor,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger);

    // Project file first, user file fills the gaps
    let project = ProjectConfig::load(&cli.repo_path)?.unwrap_or_default();
    let config = project.or(ProjectConfig::load_user()?.unwrap_or_default());

    let agent_type = match (cli.agent, config.agent.as_deref()) {
        (Some(choice), _) => choice.into(),
        (None, Some(name)) => name
            .parse::<AgentType>()
            .map_err(|e| anyhow::anyhow!("Invalid agent in config: {}", e))?,
        (None, None) => AgentType::ClaudeCode,
    };

    let mut agent_config = AgentConfig::new(cli.repo_path.clone());
    if let Some(model) = cli.model.clone().or(config.model.clone()) {
        agent_config = agent_config.with_model(model);
    }
    if let Some(timeout) = cli.timeout.or(config.timeout) {
        agent_config = agent_config.with_timeout(timeout);
    }

    let mut request = PatchRequest::new(&cli.repo_path, &cli.feature_branch);
    request.base_branch = config.base_branch_for(cli.base_branch.as_deref(), cli.detect_base);

    let remote = cli
        .remote
        .clone()
        .or(config.remote.clone())
        .unwrap_or_else(|| DEFAULT_REMOTE.to_string());
    let max_diff_bytes = cli
        .max_diff_bytes
        .or(config.max_diff_bytes)
        .unwrap_or(DEFAULT_MAX_DIFF_BYTES);

    let agent_path = cli.agent_path.clone().or(config.agent_path.clone());
    let agent = create_agent(agent_type, agent_path);
    let pipeline = Pipeline::new(agent.as_ref(), agent_config, logger.clone())
        .with_remote(remote)
        .with_max_diff_bytes(max_diff_bytes);

    if cli.patch_only {
        let patch = pipeline
            .extract(&request)
            .unwrap_or_else(|e| fail(&logger, e));
        print!("{}", patch.text);
        return Ok(());
    }

    let outcome = pipeline
        .run(&request)
        .await
        .unwrap_or_else(|e| fail(&logger, e));

    if cli.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        if outcome.is_truncated() {
            eprintln!("Note: the diff was truncated before it was sent to the agent.");
        }
        if let Some(text) = render_outcome(&outcome) {
            print!("{}", text);
        }
    }

    Ok(())
}

/// Report a run error and exit with its status
fn fail(logger: &Logger, error: RunError) -> ! {
    logger.log(&LogEvent::ErrorEncountered {
        error: error.to_string(),
    });
    std::process::exit(error.exit_code());
}

/// Text for stdout; `None` when the logger already reported everything
fn render_outcome(outcome: &PipelineOutcome) -> Option<String> {
    outcome.description().map(|description| {
        format!(
            "\n--- Generated PR Description ---\n{}\n---------------------------------\n",
            description.text
        )
    })
}
