//! persistent store plumbing: connection setup, the executor capability and
//! the transaction coordinator

mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::{CachedStatement, Connection, Params, Row, Transaction, TransactionBehavior};
use tracing::debug;

use crate::error::{Error, Result};

pub use schema::{apply_schema, seed_defaults};

/// how long a writer waits on another process's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// something engine functions can run statements against
///
/// implemented by a plain connection and by an active transaction, so store
/// functions don't care which one they receive.
pub trait Executor {
    fn connection(&self) -> &Connection;

    fn execute<P: Params>(&self, sql: &str, params: P) -> rusqlite::Result<usize> {
        self.connection().execute(sql, params)
    }

    fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> rusqlite::Result<T>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.connection().query_row(sql, params, f)
    }

    fn prepare(&self, sql: &str) -> rusqlite::Result<CachedStatement<'_>> {
        self.connection().prepare_cached(sql)
    }
}

impl Executor for Connection {
    fn connection(&self) -> &Connection {
        self
    }
}

impl Executor for Transaction<'_> {
    fn connection(&self) -> &Connection {
        self
    }
}

/// open the store file and configure the connection
pub fn open_store(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).map_err(|source| Error::StoreOpen {
        path: path.to_path_buf(),
        source,
    })?;
    configure(&conn).map_err(|source| Error::StoreOpen {
        path: path.to_path_buf(),
        source,
    })?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// in-memory store with the schema applied and defaults seeded
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    apply_schema(&conn)?;
    seed_defaults(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    // round-trip query doubles as a liveness check
    conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
    Ok(())
}

/// current unix time in seconds, as stored in timestamp columns
pub(crate) fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// run `f` inside one immediate transaction
///
/// commits only if `f` returns Ok. any error (or a panic unwinding through
/// here) drops the transaction, which rolls back every statement it ran.
pub fn with_tx<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    match f(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            debug!(error = %e, "rolling back transaction");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(db: &impl Executor) -> i64 {
        db.query_row("SELECT COUNT(*) FROM staged_files", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_tx_commits_on_ok() {
        let mut conn = open_in_memory().unwrap();

        with_tx(&mut conn, |tx| {
            tx.execute("INSERT INTO staged_files (path) VALUES ('a.txt')", [])?;
            tx.execute("INSERT INTO staged_files (path) VALUES ('b.txt')", [])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn test_tx_rolls_back_on_error() {
        let mut conn = open_in_memory().unwrap();

        let result: Result<()> = with_tx(&mut conn, |tx| {
            tx.execute("INSERT INTO staged_files (path) VALUES ('a.txt')", [])?;
            Err(Error::EmptyMessage)
        });

        assert!(matches!(result, Err(Error::EmptyMessage)));
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_tx_rolls_back_on_storage_failure() {
        let mut conn = open_in_memory().unwrap();

        // second insert violates the CHECK constraint
        let result = with_tx(&mut conn, |tx| {
            tx.execute("INSERT INTO staged_files (path) VALUES ('a.txt')", [])?;
            tx.execute("INSERT INTO staged_files (path) VALUES ('')", [])?;
            Ok(())
        });

        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_executor_works_for_both_variants() {
        let mut conn = open_in_memory().unwrap();
        assert_eq!(count(&conn), 0);

        with_tx(&mut conn, |tx| {
            tx.execute("INSERT INTO staged_files (path) VALUES ('x')", [])?;
            assert_eq!(count(tx), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let conn = open_in_memory().unwrap();
        let result = conn.execute(
            "INSERT INTO refs (name, snapshot_hash) VALUES ('dev', 'missing')",
            [],
        );
        assert!(result.is_err());
    }
}
