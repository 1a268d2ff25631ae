use prdraft_git::DiffSummary;
use prdraft_logging::BaseSource;
use serde::Serialize;

use crate::PrDescription;

/// The final outcome of a description run
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Both branches have the same tree; the agent was not invoked
    NoChanges {
        feature_branch: String,
        base_branch: String,
    },
    Described {
        feature_branch: String,
        base_branch: String,
        base_source: BaseSource,
        summary: DiffSummary,
        /// The diff was cut before it was sent to the agent
        diff_truncated: bool,
        description: PrDescription,
    },
}

impl PipelineOutcome {
    pub fn description(&self) -> Option<&PrDescription> {
        match self {
            Self::NoChanges { .. } => None,
            Self::Described { description, .. } => Some(description),
        }
    }

    pub fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges { .. })
    }

    /// The agent saw a shortened diff
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            Self::Described {
                diff_truncated: true,
                ..
            }
        )
    }

    pub fn base_branch(&self) -> &str {
        match self {
            Self::NoChanges { base_branch, .. } => base_branch,
            Self::Described { base_branch, .. } => base_branch,
        }
    }
}
