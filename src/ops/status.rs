use crate::config::current_branch;
use crate::error::Result;
use crate::hash::Hash;
use crate::refs::get_ref;
use crate::repo::Repo;
use crate::stage::list_staged;
use crate::types::StagedFile;

/// the active branch, where it points and what is staged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub branch: String,
    /// None while the branch has no commits
    pub snapshot: Option<Hash>,
    pub staged: Vec<StagedFile>,
}

/// gather the status report for `repo`
pub fn status(repo: &Repo) -> Result<Status> {
    let branch = current_branch(repo)?;
    let head = get_ref(repo, &branch)?;
    Ok(Status {
        branch,
        snapshot: head.snapshot,
        staged: list_staged(repo)?,
    })
}
