use tracing::info;

use crate::config::current_branch;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::refs::{create_ref, delete_ref, get_ref, list_refs, ref_exists, validate_ref_name};
use crate::repo::Repo;

/// a branch as shown by `list_branches`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub snapshot: Option<Hash>,
    /// true for the active branch
    pub current: bool,
}

/// create a branch at the current branch's snapshot
///
/// returns the snapshot the new branch points at. an existing name fails
/// with `RefExists` and leaves that branch untouched.
pub fn create_branch(repo: &mut Repo, name: &str) -> Result<Option<Hash>> {
    validate_ref_name(name)?;

    let snapshot = repo.transaction(|tx| {
        if ref_exists(tx, name)? {
            return Err(Error::RefExists(name.to_string()));
        }
        let head = get_ref(tx, &current_branch(tx)?)?;
        create_ref(tx, name, head.snapshot.as_ref())?;
        Ok(head.snapshot)
    })?;

    info!(branch = name, snapshot = ?snapshot, "created branch");
    Ok(snapshot)
}

/// delete a branch other than the active one
pub fn delete_branch(repo: &mut Repo, name: &str) -> Result<()> {
    validate_ref_name(name)?;

    repo.transaction(|tx| {
        if current_branch(tx)? == name {
            return Err(Error::CurrentBranch(name.to_string()));
        }
        delete_ref(tx, name)
    })?;

    info!(branch = name, "deleted branch");
    Ok(())
}

/// all branches sorted by name, with the active one marked
pub fn list_branches(repo: &Repo) -> Result<Vec<BranchInfo>> {
    let current = current_branch(repo)?;

    let mut branches: Vec<BranchInfo> = list_refs(repo)?
        .into_iter()
        .map(|r| BranchInfo {
            current: r.name == current,
            name: r.name,
            snapshot: r.snapshot,
        })
        .collect();
    branches.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(branches)
}
