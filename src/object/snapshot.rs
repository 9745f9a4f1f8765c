use rusqlite::{params, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::db::{now, Executor};
use crate::error::{Error, Result};
use crate::fs::validate_path;
use crate::hash::Hash;
use crate::object::blob::object_exists;
use crate::types::{FileEntry, Snapshot, SnapshotFile};

/// canonical text that identifies a snapshot
///
/// format:
///   parent:<hex>\n          (only when there is a parent)
///   message:<message>
///   \npath:<path>\nobject:<hex>   (per file, sorted by path)
pub fn canonical_snapshot_text(
    parent: Option<&Hash>,
    message: &str,
    files: &[FileEntry],
) -> String {
    let mut sorted: Vec<&FileEntry> = files.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut text = String::new();
    if let Some(parent) = parent {
        text.push_str("parent:");
        text.push_str(&parent.to_hex());
        text.push('\n');
    }
    text.push_str("message:");
    text.push_str(message);

    for file in sorted {
        text.push_str("\npath:");
        text.push_str(&file.path);
        text.push_str("\nobject:");
        text.push_str(&file.object.to_hex());
    }

    text
}

/// compute snapshot identity from parent, message and manifest
///
/// input order of `files` does not matter.
pub fn compute_snapshot_hash(
    parent: Option<&Hash>,
    message: &str,
    files: &[FileEntry],
) -> Hash {
    let text = canonical_snapshot_text(parent, message, files);
    Hash::from_bytes(Sha256::digest(text.as_bytes()).into())
}

/// true if both manifests hold the same (path, object) pairs
pub fn compare_file_sets(a: &[FileEntry], b: &[FileEntry]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&FileEntry> = a.iter().collect();
    let mut b: Vec<&FileEntry> = b.iter().collect();
    a.sort();
    b.sort();
    a == b
}

/// persist a snapshot and its manifest, returning the computed hash
///
/// every referenced object and the parent (if any) must already be stored.
/// building the same logical snapshot twice yields the same hash and leaves
/// a single row.
pub fn build_snapshot(
    db: &impl Executor,
    parent: Option<&Hash>,
    message: &str,
    author: Option<&str>,
    files: &[FileEntry],
) -> Result<Hash> {
    let mut sorted = files.to_vec();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));
    for pair in sorted.windows(2) {
        if pair[0].path == pair[1].path {
            return Err(Error::DuplicatePath(pair[0].path.clone()));
        }
    }
    for file in &sorted {
        validate_path(&file.path)?;
    }

    if let Some(parent) = parent {
        if !snapshot_exists(db, parent)? {
            return Err(Error::SnapshotNotFound(*parent));
        }
    }
    for file in &sorted {
        if !object_exists(db, &file.object)? {
            return Err(Error::ObjectNotFound(file.object));
        }
    }

    let hash = compute_snapshot_hash(parent, message, &sorted);

    let inserted = db.execute(
        "INSERT OR IGNORE INTO snapshot (hash, parent_hash, message, author, timestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![hash, parent, message, author, now()],
    )?;

    for file in &sorted {
        db.execute(
            "INSERT OR IGNORE INTO snapshot_files (snapshot_hash, path, object_hash) \
             VALUES (?1, ?2, ?3)",
            params![hash, file.path, file.object],
        )?;
    }

    debug!(%hash, files = sorted.len(), new = inserted > 0, "built snapshot");

    Ok(hash)
}

/// read a snapshot row
pub fn get_snapshot(db: &impl Executor, hash: &Hash) -> Result<Snapshot> {
    db.query_row(
        "SELECT hash, parent_hash, message, author, timestamp FROM snapshot WHERE hash = ?1",
        params![hash],
        snapshot_from_row,
    )
    .optional()?
    .ok_or(Error::SnapshotNotFound(*hash))
}

/// check if a snapshot is stored
pub fn snapshot_exists(db: &impl Executor, hash: &Hash) -> Result<bool> {
    let found = db
        .query_row(
            "SELECT 1 FROM snapshot WHERE hash = ?1",
            params![hash],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// a snapshot's manifest, ordered by path
pub fn list_snapshot_files(db: &impl Executor, hash: &Hash) -> Result<Vec<SnapshotFile>> {
    let mut stmt = db.prepare(
        "SELECT snapshot_hash, path, object_hash FROM snapshot_files \
         WHERE snapshot_hash = ?1 ORDER BY path",
    )?;
    let files = stmt
        .query_map(params![hash], |row| {
            Ok(SnapshotFile {
                snapshot: row.get(0)?,
                path: row.get(1)?,
                object: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(files)
}

/// a snapshot's manifest as (path, object) entries
pub fn snapshot_entries(db: &impl Executor, hash: &Hash) -> Result<Vec<FileEntry>> {
    Ok(list_snapshot_files(db, hash)?
        .into_iter()
        .map(FileEntry::from)
        .collect())
}

/// all snapshots, oldest first
pub fn list_snapshots(db: &impl Executor) -> Result<Vec<Snapshot>> {
    let mut stmt = db.prepare(
        "SELECT hash, parent_hash, message, author, timestamp FROM snapshot \
         ORDER BY timestamp, hash",
    )?;
    let snapshots = stmt
        .query_map([], snapshot_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(snapshots)
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        hash: row.get(0)?,
        parent: row.get(1)?,
        message: row.get(2)?,
        author: row.get(3)?,
        timestamp: row.get(4)?,
    })
}
