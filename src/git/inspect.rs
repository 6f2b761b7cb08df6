use std::path::Path;

use git2::Repository;

use crate::error::Result;

/// Commit information shown after a publish
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The commit hash (shortened)
    pub hash: String,
    /// First line of the commit message
    pub summary: String,
    /// The commit author
    pub author: String,
}

/// True when `path` is inside a git working tree (bare repositories don't count).
pub fn is_work_tree(path: &Path) -> bool {
    match Repository::discover(path) {
        Ok(repo) => !repo.is_bare(),
        Err(_) => false,
    }
}

/// The commit HEAD points at, or `None` for a repository with no commits yet.
pub fn head_commit(path: &Path) -> Result<Option<CommitInfo>> {
    let repo = Repository::discover(path)?;

    let head = match repo.head() {
        Ok(head) => head,
        Err(e)
            if e.code() == git2::ErrorCode::UnbornBranch
                || e.code() == git2::ErrorCode::NotFound =>
        {
            return Ok(None)
        }
        Err(e) => return Err(e.into()),
    };

    let commit = head.peel_to_commit()?;
    let hash = commit.id().to_string();
    let summary = commit.summary().unwrap_or("(empty message)").to_string();
    let author = commit.author().name().unwrap_or("unknown").to_string();

    let info = CommitInfo {
        hash: hash.chars().take(7).collect(),
        summary,
        author,
    };
    Ok(Some(info))
}
