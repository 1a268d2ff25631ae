use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Patch(#[from] prdraft_git::PatchError),

    #[error("Description error: {0}")]
    Writer(#[from] crate::WriterError),

    #[error("Agent '{agent}' is not available at '{}'. Make sure it's installed and in PATH.", .binary.display())]
    AgentUnavailable { agent: String, binary: PathBuf },
}

impl RunError {
    /// Process exit status: 2 for repository/branch problems, 3 for agent ones
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Patch(_) => 2,
            Self::Writer(_) | Self::AgentUnavailable { .. } => 3,
        }
    }
}
