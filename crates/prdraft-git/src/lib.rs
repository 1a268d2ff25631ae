//! # prdraft-git
//!
//! Patch extraction between two local branches of a git repository.
//!
//! ## Overview
//!
//! Given a repository path, a feature branch and an optional base branch,
//! the extractor:
//! - opens the repository (the path itself, no parent discovery)
//! - resolves the base branch when none is given: the remote's symbolic
//!   HEAD first, then a local `main`, then a local `master`
//! - checks that both branches exist locally
//! - diffs the base tree against the feature tree
//!
//! Failures come back as a [`PatchError`] that callers can match on. An
//! empty patch is not an error: it means the two trees are identical.
//!
//! ## Key Types
//!
//! - [`PatchExtractor`] - Runs extractions, reporting to a [`Logger`](prdraft_logging::Logger)
//! - [`PatchRequest`] - Repository path and branch names
//! - [`Patch`] - Diff text, resolved branches and a [`DiffSummary`]
//! - [`create_patch`] - Shorthand returning just the diff text
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prdraft_git::create_patch;
//! use prdraft_logging::{LogFormat, Logger};
//!
//! let logger = Logger::new(LogFormat::Compact);
//! let patch = create_patch(&logger, "./my-repo", "my-feature", Some("main"))?;
//! if patch.is_empty() {
//!     println!("nothing to describe");
//! }
//! ```

mod branch;
mod diff;
mod error;
mod extract;

pub use branch::{remote_default_branch, resolve_base_branch, FALLBACK_BASE_BRANCHES};
pub use diff::{render_patch, DiffSummary};
pub use error::{BranchRole, PatchError};
pub use extract::{create_patch, Patch, PatchExtractor, PatchRequest, DEFAULT_REMOTE};
