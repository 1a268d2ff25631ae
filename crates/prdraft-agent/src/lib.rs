//! # prdraft-agent
//!
//! The text-generation side of prdraft. An [`Agent`] takes one prompt and
//! returns one answer; the implementations here drive coding-agent CLIs in
//! non-interactive mode through [`ProcessSpawner`].

mod claude;
mod cursor;
mod opencode;
mod output;
mod spawner;
mod traits;

pub use claude::ClaudeCodeAgent;
pub use cursor::CursorAgent;
pub use opencode::OpenCodeAgent;
pub use output::AgentOutput;
pub use spawner::ProcessSpawner;
pub use traits::{Agent, AgentConfig, AgentError, AgentType};

use std::path::PathBuf;

/// Create an agent by type, optionally running a specific binary instead of
/// the one found on `PATH`
pub fn create_agent(agent_type: AgentType, binary_path: Option<PathBuf>) -> Box<dyn Agent> {
    match (agent_type, binary_path) {
        (AgentType::ClaudeCode, None) => Box::new(ClaudeCodeAgent::new()),
        (AgentType::ClaudeCode, Some(path)) => Box::new(ClaudeCodeAgent::with_binary_path(path)),
        (AgentType::OpenCode, None) => Box::new(OpenCodeAgent::new()),
        (AgentType::OpenCode, Some(path)) => Box::new(OpenCodeAgent::with_binary_path(path)),
        (AgentType::Cursor, None) => Box::new(CursorAgent::new()),
        (AgentType::Cursor, Some(path)) => Box::new(CursorAgent::with_binary_path(path)),
    }
}
