use git2::{BranchType, DiffFindOptions, DiffOptions, ErrorCode, Repository, Tree};
use prdraft_logging::{BaseSource, LogEvent, Logger};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::branch::{ensure_local_branch, resolve_base_branch};
use crate::diff::{render_patch, DiffSummary};
use crate::{BranchRole, PatchError};

/// Remote consulted for the default branch unless told otherwise
pub const DEFAULT_REMOTE: &str = "origin";

/// What to compare
#[derive(Debug, Clone)]
pub struct PatchRequest {
    pub repo_path: PathBuf,
    pub feature_branch: String,
    /// `None` lets the extractor pick the base branch
    pub base_branch: Option<String>,
}

impl PatchRequest {
    pub fn new(repo_path: impl Into<PathBuf>, feature_branch: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            feature_branch: feature_branch.into(),
            base_branch: None,
        }
    }

    pub fn with_base_branch(mut self, base_branch: impl Into<String>) -> Self {
        self.base_branch = Some(base_branch.into());
        self
    }
}

/// Result of a successful extraction
#[derive(Debug, Clone)]
pub struct Patch {
    /// Unified diff from base to feature; empty when the trees match
    pub text: String,
    pub feature_branch: String,
    pub base_branch: String,
    pub base_source: BaseSource,
    pub summary: DiffSummary,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Computes branch-to-branch patches. Every call opens its own repository
/// handle and only reads from it.
pub struct PatchExtractor<'a> {
    logger: &'a Logger,
    remote: String,
}

impl<'a> PatchExtractor<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Use another remote's HEAD when resolving the base branch
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn extract(&self, request: &PatchRequest) -> Result<Patch, PatchError> {
        let repo = open_repository(&request.repo_path)?;
        info!(path = %request.repo_path.display(), "Opened repository");
        self.logger.log(&LogEvent::RepositoryOpened {
            path: request.repo_path.clone(),
        });

        let (base_branch, base_source) = match &request.base_branch {
            Some(branch) => (branch.clone(), BaseSource::Explicit),
            None => resolve_base_branch(&repo, &self.remote)?,
        };
        self.logger.log(&LogEvent::BaseBranchResolved {
            branch: base_branch.clone(),
            source: base_source,
        });

        ensure_local_branch(&repo, &request.feature_branch, BranchRole::Feature)?;
        ensure_local_branch(&repo, &base_branch, BranchRole::Base)?;

        info!(
            feature = %request.feature_branch,
            base = %base_branch,
            "Comparing branches"
        );
        self.logger.log(&LogEvent::ComparingBranches {
            feature_branch: request.feature_branch.clone(),
            base_branch: base_branch.clone(),
        });

        // Two-dot semantics: full tree of base against full tree of feature.
        let base_tree = branch_tree(&repo, &base_branch)?;
        let feature_tree = branch_tree(&repo, &request.feature_branch)?;

        let mut opts = DiffOptions::new();
        let mut diff =
            repo.diff_tree_to_tree(Some(&base_tree), Some(&feature_tree), Some(&mut opts))?;
        // Pair deletions with additions like `git diff` does by default
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

        let text = render_patch(&diff)?;
        let summary = DiffSummary::from_diff(&diff)?;

        debug!(
            diff_len = text.len(),
            files_changed = summary.files_changed,
            "Generated patch"
        );
        if !text.is_empty() {
            self.logger.log(&LogEvent::PatchGenerated {
                files_changed: summary.files_changed,
                insertions: summary.insertions,
                deletions: summary.deletions,
                bytes: text.len(),
            });
        }

        Ok(Patch {
            text,
            feature_branch: request.feature_branch.clone(),
            base_branch,
            base_source,
            summary,
        })
    }
}

/// Compute the patch between two local branches.
///
/// With `base_branch` omitted the base is taken from the `origin` remote's
/// HEAD, then from a local `main` or `master`. Returns the empty string when
/// both branches have the same tree.
pub fn create_patch(
    logger: &Logger,
    repo_path: impl AsRef<Path>,
    feature_branch: &str,
    base_branch: Option<&str>,
) -> Result<String, PatchError> {
    let mut request = PatchRequest::new(repo_path.as_ref(), feature_branch);
    request.base_branch = base_branch.map(str::to_string);

    PatchExtractor::new(logger)
        .extract(&request)
        .map(|patch| patch.text)
}

/// Open exactly `path`, without searching parent directories
fn open_repository(path: &Path) -> Result<Repository, PatchError> {
    if !path.exists() {
        return Err(PatchError::PathNotFound(path.to_path_buf()));
    }

    Repository::open(path).map_err(|e| match e.code() {
        ErrorCode::NotFound => PatchError::InvalidRepository(path.to_path_buf()),
        _ => PatchError::from(e),
    })
}

fn branch_tree<'r>(repo: &'r Repository, name: &str) -> Result<Tree<'r>, PatchError> {
    let branch = repo.find_branch(name, BranchType::Local)?;
    Ok(branch.get().peel_to_tree()?)
}
