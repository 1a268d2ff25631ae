use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which side of the comparison a branch name was given for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    Feature,
    Base,
}

impl fmt::Display for BranchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchRole::Feature => write!(f, "Feature branch"),
            BranchRole::Base => write!(f, "Base branch"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Repository path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Not a valid git repository: {}", .0.display())]
    InvalidRepository(PathBuf),

    #[error("Could not determine the default branch. Please specify a base branch.")]
    AmbiguousBaseBranch,

    #[error("{role} '{name}' not found")]
    BranchNotFound { role: BranchRole, name: String },

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

// Only the message survives so callers never see git2 types.
impl From<git2::Error> for PatchError {
    fn from(err: git2::Error) -> Self {
        PatchError::Unexpected(err.message().to_string())
    }
}
