use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::db::Executor;
use crate::error::{Error, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::types::Object;

/// store content in the object table
///
/// deduplication: inserting content that is already stored is a no-op.
/// always returns the content hash.
pub fn put_object(db: &impl Executor, content: &[u8]) -> Result<Hash> {
    let hash = compute_object_hash(content);

    let inserted = db.execute(
        "INSERT OR IGNORE INTO objects (hash, content) VALUES (?1, ?2)",
        params![hash, content],
    )?;

    if inserted > 0 {
        debug!(%hash, size = content.len(), "stored object");
    }

    Ok(hash)
}

/// read an object row
pub fn get_object(db: &impl Executor, hash: &Hash) -> Result<Object> {
    db.query_row(
        "SELECT hash, content, created_at FROM objects WHERE hash = ?1",
        params![hash],
        |row| {
            Ok(Object {
                hash: row.get(0)?,
                content: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(Error::ObjectNotFound(*hash))
}

/// read object content, verifying it still matches its hash
pub fn read_object(db: &impl Executor, hash: &Hash) -> Result<Vec<u8>> {
    let object = get_object(db, hash)?;
    if compute_object_hash(&object.content) != *hash {
        return Err(Error::CorruptObject(*hash));
    }
    Ok(object.content)
}

/// check if an object is stored
pub fn object_exists(db: &impl Executor, hash: &Hash) -> Result<bool> {
    let found = db
        .query_row(
            "SELECT 1 FROM objects WHERE hash = ?1",
            params![hash],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// delete an object (maintenance flows only)
pub fn delete_object(db: &impl Executor, hash: &Hash) -> Result<()> {
    let removed = db.execute("DELETE FROM objects WHERE hash = ?1", params![hash])?;
    if removed == 0 {
        return Err(Error::ObjectNotFound(*hash));
    }
    Ok(())
}

/// all stored object hashes, oldest first
pub fn list_object_hashes(db: &impl Executor) -> Result<Vec<Hash>> {
    let mut stmt = db.prepare("SELECT hash FROM objects ORDER BY created_at, hash")?;
    let hashes = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<Hash>>>()?;
    Ok(hashes)
}
