use rusqlite::{params, OptionalExtension};

use crate::db::Executor;
use crate::error::{Error, Result};
use crate::refs::ref_exists;

/// config key naming the active branch
pub const HEAD_KEY: &str = "head";
/// config key naming the push destination
pub const REMOTE_KEY: &str = "remote";

/// read a config value
pub fn get_config(db: &impl Executor, key: &str) -> Result<String> {
    db.query_row(
        "SELECT value FROM config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| Error::DataNotFound(key.to_string()))
}

/// write a config value (insert or replace)
pub fn set_config(db: &impl Executor, key: &str, value: &str) -> Result<()> {
    db.execute(
        "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// remove a config value; absent keys are not an error
pub fn delete_config(db: &impl Executor, key: &str) -> Result<()> {
    db.execute("DELETE FROM config WHERE key = ?1", params![key])?;
    Ok(())
}

/// name of the currently active branch
pub fn current_branch(db: &impl Executor) -> Result<String> {
    get_config(db, HEAD_KEY)
}

/// point head at an existing branch
pub fn set_current_branch(db: &impl Executor, name: &str) -> Result<()> {
    if !ref_exists(db, name)? {
        return Err(Error::RefNotFound(name.to_string()));
    }
    set_config(db, HEAD_KEY, name)
}

/// the configured push destination as `<user>/<repo>`
pub fn remote(db: &impl Executor) -> Result<String> {
    get_config(db, REMOTE_KEY)
}

/// record the push destination
///
/// accepts `<user>/<repo>` or any path or URL ending with it. an already
/// configured remote is left alone and reported as `RemoteExists`.
pub fn set_remote(db: &impl Executor, spec: &str) -> Result<String> {
    let normalized = parse_remote(spec)?;

    match get_config(db, REMOTE_KEY) {
        Ok(existing) => return Err(Error::RemoteExists(existing)),
        Err(Error::DataNotFound(_)) => {}
        Err(e) => return Err(e),
    }

    set_config(db, REMOTE_KEY, &normalized)?;
    Ok(normalized)
}

/// reduce a remote spec to its last two path segments
pub fn parse_remote(spec: &str) -> Result<String> {
    let parts: Vec<&str> = spec
        .trim()
        .trim_matches('/')
        .split('/')
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [.., user, repo] => Ok(format!("{}/{}", user, repo)),
        _ => Err(Error::InvalidRemote(spec.to_string())),
    }
}
