use tracing::{debug, warn};

use crate::config::current_branch;
use crate::db::Executor;
use crate::error::{Error, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::object::{get_object, list_object_hashes, snapshot_exists};
use crate::refs::{list_refs, ref_exists};
use crate::repo::Repo;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects re-hashed
    pub objects_checked: usize,
    /// objects whose content no longer matches their hash
    pub corrupt_objects: Vec<Hash>,
    /// manifest rows referencing objects that are not stored
    pub missing_objects: Vec<MissingObject>,
    /// refs pointing at snapshots that are not stored, as (ref, snapshot)
    pub dangling_refs: Vec<(String, Hash)>,
    /// snapshots whose parent is not stored
    pub missing_parents: Vec<MissingParent>,
    /// problem with the head entry, if any
    pub head_error: Option<String>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty()
            && self.missing_objects.is_empty()
            && self.dangling_refs.is_empty()
            && self.missing_parents.is_empty()
            && self.head_error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingObject {
    pub object: Hash,
    pub snapshot: Hash,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingParent {
    pub snapshot: Hash,
    pub parent: Hash,
}

/// verify repository integrity
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();

    // verify object hashes
    for hash in list_object_hashes(repo)? {
        report.objects_checked += 1;
        let object = get_object(repo, &hash)?;
        if compute_object_hash(&object.content) != hash {
            warn!(%hash, "corrupt object");
            report.corrupt_objects.push(hash);
        }
    }

    // manifest rows without an object
    let mut stmt = repo.prepare(
        "SELECT f.object_hash, f.snapshot_hash, f.path FROM snapshot_files f
         LEFT JOIN objects o ON o.hash = f.object_hash
         WHERE o.hash IS NULL ORDER BY f.snapshot_hash, f.path",
    )?;
    report.missing_objects = stmt
        .query_map([], |row| {
            Ok(MissingObject {
                object: row.get(0)?,
                snapshot: row.get(1)?,
                path: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    drop(stmt);

    // snapshots without their parent
    let mut stmt = repo.prepare(
        "SELECT s.hash, s.parent_hash FROM snapshot s
         LEFT JOIN snapshot p ON p.hash = s.parent_hash
         WHERE s.parent_hash IS NOT NULL AND p.hash IS NULL ORDER BY s.hash",
    )?;
    report.missing_parents = stmt
        .query_map([], |row| {
            Ok(MissingParent {
                snapshot: row.get(0)?,
                parent: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    drop(stmt);

    // refs into nothing
    for r in list_refs(repo)? {
        if let Some(hash) = r.snapshot {
            if !snapshot_exists(repo, &hash)? {
                report.dangling_refs.push((r.name, hash));
            }
        }
    }
    report.dangling_refs.sort();

    report.head_error = match current_branch(repo) {
        Ok(name) => {
            if ref_exists(repo, &name)? {
                None
            } else {
                Some(format!("head names missing branch '{}'", name))
            }
        }
        Err(Error::DataNotFound(_)) => Some("head is not set".to_string()),
        Err(e) => return Err(e),
    };

    debug!(
        objects = report.objects_checked,
        ok = report.is_ok(),
        "fsck finished"
    );
    Ok(report)
}
