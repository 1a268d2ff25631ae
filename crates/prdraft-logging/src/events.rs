use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// How the base branch of a comparison was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSource {
    /// Supplied by the caller
    Explicit,
    /// Read from the remote's symbolic HEAD
    RemoteHead,
    /// Picked from the local `main`/`master` fallback list
    LocalFallback,
}

impl fmt::Display for BaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseSource::Explicit => write!(f, "explicit"),
            BaseSource::RemoteHead => write!(f, "remote HEAD"),
            BaseSource::LocalFallback => write!(f, "local fallback"),
        }
    }
}

/// Structured log events for a description run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        repo_path: PathBuf,
        feature_branch: String,
        base_branch: Option<String>,
    },
    RepositoryOpened {
        path: PathBuf,
    },
    BaseBranchResolved {
        branch: String,
        source: BaseSource,
    },
    ComparingBranches {
        feature_branch: String,
        base_branch: String,
    },
    PatchGenerated {
        files_changed: usize,
        insertions: usize,
        deletions: usize,
        bytes: usize,
    },
    /// The two branches have identical trees
    PatchEmpty {
        feature_branch: String,
        base_branch: String,
    },
    AgentStarted {
        agent: String,
        model: Option<String>,
        prompt_bytes: usize,
    },
    AgentCompleted {
        agent: String,
        exit_code: i32,
        duration_secs: f64,
    },
    DescriptionReady {
        chars: usize,
    },
    ErrorEncountered {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for prdraft events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File sink is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                repo_path,
                feature_branch,
                base_branch,
            } => {
                let base = base_branch.as_deref().unwrap_or("(auto)");
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "prdraft".bold().bright_white(),
                    " ".repeat(60) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Repo:".dimmed(),
                    Self::truncate_with_padding(&repo_path.display().to_string(), 60, 67)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Branches:".dimmed(),
                    Self::truncate_with_padding(&format!("{} <- {}", base, feature_branch), 56, 63)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::RepositoryOpened { path } => {
                let _ = writeln!(
                    stderr,
                    "  {} Opened repository {}",
                    "✓".bright_green(),
                    path.display().to_string().dimmed()
                );
            }
            LogEvent::BaseBranchResolved { branch, source } => {
                let _ = writeln!(
                    stderr,
                    "  {} Base branch {} {}",
                    "→".bright_cyan(),
                    branch.bold(),
                    format!("({})", source).dimmed()
                );
            }
            LogEvent::ComparingBranches {
                feature_branch,
                base_branch,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} Comparing {} against {}",
                    "▶".bright_cyan(),
                    feature_branch.bright_cyan().bold(),
                    base_branch.bold()
                );
            }
            LogEvent::PatchGenerated {
                files_changed,
                insertions,
                deletions,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} {}, {} {}, {} {}",
                    "Diff:".dimmed(),
                    files_changed,
                    if *files_changed == 1 { "file" } else { "files" },
                    format!("+{}", insertions).green(),
                    if *insertions == 1 { "line" } else { "lines" },
                    format!("-{}", deletions).red(),
                    if *deletions == 1 { "line" } else { "lines" }
                );
                let _ = writeln!(stderr);
            }
            LogEvent::PatchEmpty { .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "⚠".bright_yellow(),
                    "The two branches are identical. No patch generated.".bright_yellow()
                );
            }
            LogEvent::AgentStarted { agent, model, .. } => {
                let model = model
                    .as_deref()
                    .map(|m| format!(" ({})", m))
                    .unwrap_or_default();
                let _ = writeln!(
                    stderr,
                    "  {} {}{}",
                    "▶".bright_magenta(),
                    agent.bright_magenta().bold(),
                    model.dimmed()
                );
            }
            LogEvent::AgentCompleted {
                exit_code,
                duration_secs,
                ..
            } => {
                if *exit_code == 0 {
                    let _ = writeln!(
                        stderr,
                        "    {} Done ({:.1}s)",
                        "✓".bright_green(),
                        duration_secs
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "    {} Exit {} ({:.1}s)",
                        "✗".bright_red(),
                        exit_code,
                        duration_secs
                    );
                }
                let _ = writeln!(stderr);
            }
            LogEvent::DescriptionReady { .. } => {
                // The description itself is printed by main.rs
            }
            LogEvent::ErrorEncountered { error } => {
                let _ = writeln!(stderr);
                let _ = writeln!(stderr, "{} {}", "✗".bright_red(), error.bright_red());
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted {
                feature_branch,
                base_branch,
                ..
            } => format!(
                "[{}] run:start {}..{}",
                timestamp,
                base_branch.as_deref().unwrap_or("?"),
                feature_branch
            ),
            LogEvent::RepositoryOpened { path } => {
                format!("[{}] repo:open {}", timestamp, path.display())
            }
            LogEvent::BaseBranchResolved { branch, source } => {
                format!("[{}] base:{} ({})", timestamp, branch, source)
            }
            LogEvent::ComparingBranches {
                feature_branch,
                base_branch,
            } => format!("[{}] diff:{}..{}", timestamp, base_branch, feature_branch),
            LogEvent::PatchGenerated {
                files_changed,
                insertions,
                deletions,
                bytes,
            } => format!(
                "[{}] patch {}f +{} -{} {}b",
                timestamp, files_changed, insertions, deletions, bytes
            ),
            LogEvent::PatchEmpty { .. } => format!("[{}] patch:empty", timestamp),
            LogEvent::AgentStarted { agent, .. } => {
                format!("[{}] agent:start {}", timestamp, agent)
            }
            LogEvent::AgentCompleted {
                agent,
                exit_code,
                duration_secs,
            } => format!(
                "[{}] agent:done {} exit={} {:.1}s",
                timestamp, agent, exit_code, duration_secs
            ),
            LogEvent::DescriptionReady { chars } => {
                format!("[{}] description {}c", timestamp, chars)
            }
            LogEvent::ErrorEncountered { error } => format!("[{}] error:{}", timestamp, error),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let len = s.chars().count();
        let truncated = if len > max_len {
            let kept: String = s.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LogEvent::BaseBranchResolved {
            branch: "main".to_string(),
            source: BaseSource::LocalFallback,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "base_branch_resolved");
        assert_eq!(json["branch"], "main");
        assert_eq!(json["source"], "local_fallback");
    }

    #[test]
    fn test_file_sink_writes_json_lines_with_timestamp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();

        logger.log(&LogEvent::PatchEmpty {
            feature_branch: "feature".to_string(),
            base_branch: "main".to_string(),
        });
        logger.log(&LogEvent::DescriptionReady { chars: 42 });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "patch_empty");
        assert!(first["timestamp"].is_string());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["chars"], 42);
    }

    #[test]
    fn test_truncate_with_padding() {
        let padded = Logger::truncate_with_padding("short", 10, 12);
        assert_eq!(padded, "short      │");

        let truncated = Logger::truncate_with_padding("a-very-long-branch-name", 10, 12);
        assert!(truncated.starts_with("a-very-..."));
        assert!(truncated.ends_with('│'));
    }
}
