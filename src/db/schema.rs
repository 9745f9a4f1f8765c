use rusqlite::Connection;

use crate::error::{Error, Result};

/// tables mirror the data model; every statement is idempotent
const SCHEMA: &str = r#"
-- content-addressed storage
CREATE TABLE IF NOT EXISTS objects (
    hash TEXT PRIMARY KEY,
    content BLOB NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

-- commits
CREATE TABLE IF NOT EXISTS snapshot (
    hash TEXT PRIMARY KEY,
    parent_hash TEXT,
    message TEXT NOT NULL,
    author TEXT,
    timestamp INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    FOREIGN KEY(parent_hash) REFERENCES snapshot(hash) ON DELETE SET NULL
);

-- manifest rows
CREATE TABLE IF NOT EXISTS snapshot_files (
    snapshot_hash TEXT NOT NULL,
    path TEXT NOT NULL CHECK (path != ''),
    object_hash TEXT NOT NULL,
    PRIMARY KEY (snapshot_hash, path),
    FOREIGN KEY(snapshot_hash) REFERENCES snapshot(hash) ON DELETE CASCADE,
    FOREIGN KEY(object_hash) REFERENCES objects(hash) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS refs (
    name TEXT PRIMARY KEY CHECK (name != ''),
    snapshot_hash TEXT,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    FOREIGN KEY(snapshot_hash) REFERENCES snapshot(hash) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY CHECK (key != ''),
    value TEXT NOT NULL
);

-- staging is intent only
CREATE TABLE IF NOT EXISTS staged_files (
    path TEXT PRIMARY KEY CHECK (path != ''),
    staged_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);
"#;

/// rows every fresh repository starts with
const SEED: &str = r#"
INSERT OR IGNORE INTO refs (name, snapshot_hash) VALUES ('main', NULL);
INSERT OR IGNORE INTO config (key, value) VALUES ('head', 'main');
"#;

/// create missing tables
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).map_err(Error::SchemaApply)
}

/// insert the default branch and head pointer
///
/// only called on init: re-running it on open would resurrect a deleted `main`.
pub fn seed_defaults(conn: &Connection) -> Result<()> {
    conn.execute_batch(SEED).map_err(Error::SchemaApply)
}
