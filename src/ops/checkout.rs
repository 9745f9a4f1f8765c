use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{current_branch, set_current_branch};
use crate::error::{Error, Result};
use crate::fs::{
    is_metadata_path, move_into_place, prune_empty_dirs, remove_path, scan, validate_path,
    write_file,
};
use crate::hash::Hash;
use crate::object::{get_snapshot, list_snapshot_files, read_object};
use crate::refs::{get_ref, ref_exists};
use crate::repo::Repo;

/// what a checkout token resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// a branch and its pointer (None while it has no commits)
    Branch { name: String, snapshot: Option<Hash> },
    /// a bare snapshot hash
    Detached(Hash),
}

/// checkout options
#[derive(Clone, Debug, Default)]
pub struct CheckoutOptions {
    /// make the working tree match the target snapshot
    pub reset_workspace: bool,
}

/// result of a checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// already on the requested branch, working tree untouched
    Current { branch: String },
    /// active branch changed, working tree untouched
    Switched { from: String, to: String },
    /// working tree reconciled to `snapshot` (`branch` is None when detached)
    WorkspaceReset {
        branch: Option<String>,
        snapshot: Hash,
        stats: ReconcileStats,
    },
    /// a reset was requested but the branch has no commits; tree left alone
    NoCommits { branch: String },
}

/// counters from a working tree reconciliation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub written: usize,
    pub removed: usize,
    pub pruned_dirs: usize,
}

/// resolve a checkout token
///
/// empty means the current branch, then branch names are tried, then full
/// snapshot hashes.
pub fn resolve_target(repo: &Repo, token: &str) -> Result<CheckoutTarget> {
    let token = token.trim();

    let name = if token.is_empty() {
        current_branch(repo)?
    } else if ref_exists(repo, token)? {
        token.to_string()
    } else {
        return resolve_snapshot(repo, token);
    };

    let branch = get_ref(repo, &name)?;
    Ok(CheckoutTarget::Branch {
        name,
        snapshot: branch.snapshot,
    })
}

fn resolve_snapshot(repo: &Repo, token: &str) -> Result<CheckoutTarget> {
    let not_found = || Error::NotFound(token.to_string());

    let hash = Hash::from_hex(token).map_err(|_| not_found())?;
    match get_snapshot(repo, &hash) {
        Ok(snapshot) => Ok(CheckoutTarget::Detached(snapshot.hash)),
        Err(Error::SnapshotNotFound(_)) => Err(not_found()),
        Err(e) => Err(e),
    }
}

/// switch branches and/or reset the working tree
///
/// switching to a branch only moves the head pointer unless
/// `reset_workspace` is set. a snapshot hash always resets the working tree
/// and leaves head alone.
pub fn checkout(repo: &mut Repo, token: &str, opts: CheckoutOptions) -> Result<CheckoutOutcome> {
    match resolve_target(repo, token)? {
        CheckoutTarget::Branch { name, snapshot } => {
            let previous = current_branch(repo.db())?;
            if previous != name {
                set_current_branch(repo.db(), &name)?;
                info!(from = %previous, to = %name, "switched branch");
            }

            if !opts.reset_workspace {
                return Ok(if previous == name {
                    CheckoutOutcome::Current { branch: name }
                } else {
                    CheckoutOutcome::Switched {
                        from: previous,
                        to: name,
                    }
                });
            }

            match snapshot {
                Some(hash) => {
                    let stats = reconcile(repo, &hash)?;
                    Ok(CheckoutOutcome::WorkspaceReset {
                        branch: Some(name),
                        snapshot: hash,
                        stats,
                    })
                }
                None => {
                    info!(branch = %name, "no commits yet, working tree left alone");
                    Ok(CheckoutOutcome::NoCommits { branch: name })
                }
            }
        }
        CheckoutTarget::Detached(hash) => {
            let stats = reconcile(repo, &hash)?;
            Ok(CheckoutOutcome::WorkspaceReset {
                branch: None,
                snapshot: hash,
                stats,
            })
        }
    }
}

/// make the working tree match a snapshot exactly
///
/// the target tree is first materialized in a scratch directory under the
/// metadata directory; if that fails the working tree is untouched. stale
/// files are then deleted, the new files renamed into place, and emptied
/// directories pruned.
///
/// the metadata directory is never touched, and a stale file whose own name
/// starts with `.` is kept. other files inside dot-directories are reconciled
/// like any other, and empty dot-directories are pruned. a manifest path that
/// would land outside the working tree or inside the metadata directory fails
/// with `InvalidPath` before anything is written.
///
/// a failure after the first deletion can still leave the tree partially
/// updated.
pub fn reconcile(repo: &Repo, snapshot: &Hash) -> Result<ReconcileStats> {
    get_snapshot(repo, snapshot)?;

    let expected: BTreeMap<String, Hash> = list_snapshot_files(repo, snapshot)?
        .into_iter()
        .map(|f| (f.path, f.object))
        .collect();
    for path in expected.keys() {
        validate_path(path)?;
    }

    let scratch = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());
    if let Err(e) = materialize(repo, &expected, &scratch) {
        discard_scratch(&scratch);
        return Err(e);
    }

    let result = swap_in(repo.root(), &repo.metadata_path(), &expected, &scratch);
    discard_scratch(&scratch);
    let stats = result?;

    info!(
        %snapshot,
        written = stats.written,
        removed = stats.removed,
        pruned = stats.pruned_dirs,
        "reconciled working tree"
    );
    Ok(stats)
}

fn materialize(repo: &Repo, expected: &BTreeMap<String, Hash>, scratch: &Path) -> Result<()> {
    for (path, object) in expected {
        let content = read_object(repo, object)?;
        write_file(&scratch.join(path), &content)?;
    }
    Ok(())
}

fn swap_in(
    root: &Path,
    metadata: &Path,
    expected: &BTreeMap<String, Hash>,
    scratch: &Path,
) -> Result<ReconcileStats> {
    let mut stats = ReconcileStats::default();

    for file in scan(root)? {
        if is_metadata_path(&file.path) || expected.contains_key(&file.path) {
            continue;
        }
        if remove_path(&root.join(&file.path))? {
            debug!(path = %file.path, "removed stale file");
            stats.removed += 1;
        }
    }

    for path in expected.keys() {
        move_into_place(&scratch.join(path), &root.join(path))?;
        stats.written += 1;
    }

    stats.pruned_dirs = prune_empty_dirs(root, metadata)?;
    Ok(stats)
}

fn discard_scratch(scratch: &Path) {
    if let Err(e) = remove_path(scratch) {
        warn!(path = %scratch.display(), error = %e, "failed to remove scratch directory");
    }
}
