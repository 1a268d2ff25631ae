use git2::{BranchType, ErrorCode, Repository};
use prdraft_logging::BaseSource;
use tracing::debug;

use crate::{BranchRole, PatchError};

/// Local branches tried, in order, when the remote has no default branch
pub const FALLBACK_BASE_BRANCHES: [&str; 2] = ["main", "master"];

/// Default branch advertised by the remote's symbolic HEAD
/// (`refs/remotes/<remote>/HEAD`), if one can be read.
pub fn remote_default_branch(repo: &Repository, remote: &str) -> Option<String> {
    let name = format!("refs/remotes/{}/HEAD", remote);
    let reference = repo.find_reference(&name).ok()?;
    let target = reference.symbolic_target()?;
    let branch = branch_from_target(target);

    debug!(remote, target, branch = ?branch, "Read remote HEAD");
    branch
}

/// Final path segment of a ref name: `refs/remotes/origin/main` -> `main`
fn branch_from_target(target: &str) -> Option<String> {
    target
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub fn local_branch_exists(repo: &Repository, name: &str) -> Result<bool, PatchError> {
    match repo.find_branch(name, BranchType::Local) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn ensure_local_branch(
    repo: &Repository,
    name: &str,
    role: BranchRole,
) -> Result<(), PatchError> {
    if local_branch_exists(repo, name)? {
        Ok(())
    } else {
        Err(PatchError::BranchNotFound {
            role,
            name: name.to_string(),
        })
    }
}

/// Pick a base branch when the caller did not name one.
///
/// The remote's default branch wins; otherwise the first of
/// [`FALLBACK_BASE_BRANCHES`] that exists locally. The remote candidate is
/// not checked here, validation happens with the other branch checks.
pub fn resolve_base_branch(
    repo: &Repository,
    remote: &str,
) -> Result<(String, BaseSource), PatchError> {
    if let Some(branch) = remote_default_branch(repo, remote) {
        return Ok((branch, BaseSource::RemoteHead));
    }

    for candidate in FALLBACK_BASE_BRANCHES {
        if local_branch_exists(repo, candidate)? {
            return Ok((candidate.to_string(), BaseSource::LocalFallback));
        }
    }

    Err(PatchError::AmbiguousBaseBranch)
}
