use rusqlite::params;
use tracing::debug;

use crate::db::{now, Executor};
use crate::error::Result;
use crate::fs::validate_path;
use crate::types::StagedFile;

/// queue a path for the next commit; re-staging is a no-op
pub fn stage_path(db: &impl Executor, path: &str) -> Result<()> {
    validate_path(path)?;

    let inserted = db.execute(
        "INSERT OR IGNORE INTO staged_files (path, staged_at) VALUES (?1, ?2)",
        params![path, now()],
    )?;
    if inserted > 0 {
        debug!(path, "staged");
    }
    Ok(())
}

/// remove exactly this path from the stage; returns whether it was staged
pub fn unstage_path(db: &impl Executor, path: &str) -> Result<bool> {
    let removed = db.execute("DELETE FROM staged_files WHERE path = ?1", params![path])?;
    Ok(removed > 0)
}

/// empty the stage
pub fn clear_stage(db: &impl Executor) -> Result<usize> {
    Ok(db.execute("DELETE FROM staged_files", [])?)
}

/// staged paths, oldest first
pub fn list_staged(db: &impl Executor) -> Result<Vec<StagedFile>> {
    // rowid breaks ties between entries staged within the same second
    let mut stmt =
        db.prepare("SELECT path, staged_at FROM staged_files ORDER BY staged_at, rowid")?;
    let files = stmt
        .query_map([], |row| {
            Ok(StagedFile {
                path: row.get(0)?,
                staged_at: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(files)
}

/// staged entries equal to `base` or beneath it
pub fn staged_under(db: &impl Executor, base: &str) -> Result<Vec<StagedFile>> {
    let prefix = format!("{}/", base);
    Ok(list_staged(db)?
        .into_iter()
        .filter(|f| f.path == base || f.path.starts_with(&prefix))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::error::Error;

    fn paths(db: &impl Executor) -> Vec<String> {
        list_staged(db).unwrap().into_iter().map(|f| f.path).collect()
    }

    #[test]
    fn test_staging_lifecycle() {
        let db = open_in_memory().unwrap();

        stage_path(&db, "file-a.txt").unwrap();
        stage_path(&db, "dir/file-b.txt").unwrap();
        assert_eq!(paths(&db), vec!["file-a.txt", "dir/file-b.txt"]);

        assert!(unstage_path(&db, "file-a.txt").unwrap());
        assert_eq!(paths(&db), vec!["dir/file-b.txt"]);

        assert_eq!(clear_stage(&db).unwrap(), 1);
        assert!(paths(&db).is_empty());
    }

    #[test]
    fn test_restage_is_noop() {
        let db = open_in_memory().unwrap();

        stage_path(&db, "a.txt").unwrap();
        stage_path(&db, "b.txt").unwrap();
        stage_path(&db, "a.txt").unwrap();

        // first staging time kept
        assert_eq!(paths(&db), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_unstage_is_exact() {
        let db = open_in_memory().unwrap();
        stage_path(&db, "dir/a.txt").unwrap();

        assert!(!unstage_path(&db, "dir").unwrap());
        assert_eq!(paths(&db), vec!["dir/a.txt"]);
    }

    #[test]
    fn test_staged_under_prefix() {
        let db = open_in_memory().unwrap();
        stage_path(&db, "src/a.rs").unwrap();
        stage_path(&db, "src/nested/b.rs").unwrap();
        stage_path(&db, "src").unwrap();
        stage_path(&db, "srcs/c.rs").unwrap();

        let matched: Vec<String> = staged_under(&db, "src")
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(matched, vec!["src/a.rs", "src/nested/b.rs", "src"]);
    }

    #[test]
    fn test_stage_rejects_unsafe_paths() {
        let db = open_in_memory().unwrap();

        for bad in ["../outside.txt", "/abs.txt", "a//b", "a/./b", ".kuro/kuro.db", ""] {
            let result = stage_path(&db, bad);
            assert!(matches!(result, Err(Error::InvalidPath(_))), "{:?} staged", bad);
        }
        assert!(paths(&db).is_empty());
    }
}
