use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::AgentOutput;

/// Errors that can occur during agent execution
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to spawn agent process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Agent execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("Agent not found at path: {0}")]
    NotFound(String),
}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Working directory for the agent
    pub working_dir: PathBuf,
    /// Optional timeout (None = no limit)
    pub timeout: Option<Duration>,
    /// Additional environment variables
    pub env_vars: HashMap<String, String>,
    /// Model to use (if agent supports it)
    pub model: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: None,
            env_vars: HashMap::new(),
            model: None,
        }
    }
}

impl AgentConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env_vars.insert(key, value);
        self
    }
}

/// Supported agent types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentType {
    ClaudeCode,
    OpenCode,
    Cursor,
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentType::ClaudeCode => write!(f, "claude-code"),
            AgentType::OpenCode => write!(f, "opencode"),
            AgentType::Cursor => write!(f, "cursor"),
        }
    }
}

impl std::str::FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" | "claude-code" | "claudecode" => Ok(AgentType::ClaudeCode),
            "opencode" | "open-code" => Ok(AgentType::OpenCode),
            "cursor" => Ok(AgentType::Cursor),
            _ => Err(format!("Unknown agent type: {}", s)),
        }
    }
}

/// A text-generation agent: one prompt in, one answer out
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable name of the agent (e.g., "Claude Code", "OpenCode")
    fn name(&self) -> &str;

    fn agent_type(&self) -> AgentType;

    /// Run the agent non-interactively on `prompt` and capture its answer
    async fn execute(&self, prompt: &str, config: &AgentConfig) -> Result<AgentOutput, AgentError>;

    /// Check if the agent CLI is available on the system
    async fn is_available(&self) -> bool;

    /// Get the path to the agent binary
    fn binary_path(&self) -> &Path;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_type_from_str() {
        assert_eq!("claude".parse::<AgentType>().unwrap(), AgentType::ClaudeCode);
        assert_eq!(
            "Claude-Code".parse::<AgentType>().unwrap(),
            AgentType::ClaudeCode
        );
        assert_eq!("open-code".parse::<AgentType>().unwrap(), AgentType::OpenCode);
        assert_eq!("cursor".parse::<AgentType>().unwrap(), AgentType::Cursor);
        assert!("gpt".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_agent_type_display_round_trips() {
        for agent_type in [AgentType::ClaudeCode, AgentType::OpenCode, AgentType::Cursor] {
            assert_eq!(
                agent_type.to_string().parse::<AgentType>().unwrap(),
                agent_type
            );
        }
    }

    #[test]
    fn test_config_builders() {
        let config = AgentConfig::new(PathBuf::from("/repo"))
            .with_model("sonnet".to_string())
            .with_timeout(Duration::from_secs(30))
            .with_env("NO_COLOR".to_string(), "1".to_string());

        assert_eq!(config.working_dir, PathBuf::from("/repo"));
        assert_eq!(config.model.as_deref(), Some("sonnet"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.env_vars.get("NO_COLOR").map(String::as_str), Some("1"));
    }
}
