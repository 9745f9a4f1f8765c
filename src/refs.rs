use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::db::{now, Executor};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::snapshot_exists;
use crate::types::Ref;

/// branch name that can never be created or deleted (case-insensitive)
pub const RESERVED_REF: &str = "head";

/// read a branch
pub fn get_ref(db: &impl Executor, name: &str) -> Result<Ref> {
    db.query_row(
        "SELECT name, snapshot_hash, updated_at FROM refs WHERE name = ?1",
        params![name],
        ref_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::RefNotFound(name.to_string()))
}

/// check if a branch exists
pub fn ref_exists(db: &impl Executor, name: &str) -> Result<bool> {
    let found = db
        .query_row(
            "SELECT 1 FROM refs WHERE name = ?1",
            params![name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// create a branch pointing at `snapshot` (None = no commits yet)
///
/// never overwrites: an existing name fails with `RefExists`, leaving the
/// stored pointer untouched.
pub fn create_ref(db: &impl Executor, name: &str, snapshot: Option<&Hash>) -> Result<()> {
    validate_ref_name(name)?;
    ensure_snapshot(db, snapshot)?;

    let inserted = db.execute(
        "INSERT OR IGNORE INTO refs (name, snapshot_hash, updated_at) VALUES (?1, ?2, ?3)",
        params![name, snapshot, now()],
    )?;
    if inserted == 0 {
        return Err(Error::RefExists(name.to_string()));
    }

    debug!(ref_name = name, snapshot = ?snapshot, "created ref");
    Ok(())
}

/// move an existing branch, refreshing its update time
pub fn update_ref(db: &impl Executor, name: &str, snapshot: Option<&Hash>) -> Result<()> {
    ensure_snapshot(db, snapshot)?;

    let updated = db.execute(
        "UPDATE refs SET snapshot_hash = ?2, updated_at = ?3 WHERE name = ?1",
        params![name, snapshot, now()],
    )?;
    if updated == 0 {
        return Err(Error::RefNotFound(name.to_string()));
    }

    debug!(ref_name = name, snapshot = ?snapshot, "updated ref");
    Ok(())
}

/// delete a branch
pub fn delete_ref(db: &impl Executor, name: &str) -> Result<()> {
    validate_ref_name(name)?;

    let removed = db.execute("DELETE FROM refs WHERE name = ?1", params![name])?;
    if removed == 0 {
        return Err(Error::RefNotFound(name.to_string()));
    }
    Ok(())
}

/// list all branches (store order, unsorted)
pub fn list_refs(db: &impl Executor) -> Result<Vec<Ref>> {
    let mut stmt = db.prepare("SELECT name, snapshot_hash, updated_at FROM refs")?;
    let refs = stmt
        .query_map([], ref_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(refs)
}

/// true for the reserved name in any letter case
pub fn is_reserved(name: &str) -> bool {
    name.eq_ignore_ascii_case(RESERVED_REF)
}

/// validate branch name
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidRef("empty ref name".to_string()));
    }

    if is_reserved(name) {
        return Err(Error::InvalidRef(format!("'{}' is reserved", name)));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidRef(format!(
            "ref name cannot contain whitespace or control characters: {:?}",
            name
        )));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(Error::InvalidRef(format!(
            "ref name cannot start or end with '/': {}",
            name
        )));
    }

    if name.contains("//") {
        return Err(Error::InvalidRef(format!(
            "ref name cannot contain '//': {}",
            name
        )));
    }

    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidRef(format!(
                "ref name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}

fn ensure_snapshot(db: &impl Executor, snapshot: Option<&Hash>) -> Result<()> {
    if let Some(hash) = snapshot {
        if !snapshot_exists(db, hash)? {
            return Err(Error::SnapshotNotFound(*hash));
        }
    }
    Ok(())
}

fn ref_from_row(row: &Row<'_>) -> rusqlite::Result<Ref> {
    Ok(Ref {
        name: row.get(0)?,
        snapshot: row.get(1)?,
        updated_at: row.get(2)?,
    })
}
