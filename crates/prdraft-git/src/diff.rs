use git2::{Diff, DiffFormat};
use serde::Serialize;

/// Summary of diff statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn from_diff(diff: &Diff<'_>) -> Result<Self, git2::Error> {
        let stats = diff.stats()?;
        Ok(Self {
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }
}

/// Render a diff in `git diff` patch format.
///
/// git2 hands file and hunk headers over whole, but content lines arrive
/// without their `+`/`-`/space marker, so it is put back here.
///
/// Content that is not valid UTF-8 is decoded lossily: each invalid byte
/// sequence becomes U+FFFD in the returned text.
pub fn render_patch(diff: &Diff<'_>) -> Result<String, git2::Error> {
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if let origin @ ('+' | '-' | ' ') = line.origin() {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    Ok(text)
}
