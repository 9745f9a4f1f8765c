use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fs::{is_metadata_path, scan};
use crate::ignore::{is_ignored, load_ignore_rules};
use crate::repo::Repo;
use crate::stage::stage_path;

/// outcome of staging a path
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddReport {
    /// paths now on the stage
    pub staged: Vec<String>,
    /// paths skipped by ignore rules
    pub ignored: Vec<String>,
}

/// stage a file, or every file under a directory
///
/// metadata paths are never staged. all surviving paths are staged in a
/// single transaction.
pub fn add(repo: &mut Repo, path: &Path) -> Result<AddReport> {
    let rel = repo.relative_path(path)?;
    let abs = repo.root().join(&rel);
    if !abs.exists() {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }

    let patterns = load_ignore_rules(&repo.ignore_path())?;

    let candidates: Vec<String> = if abs.is_dir() {
        scan(&abs)?
            .into_iter()
            .map(|f| join_rel(&rel, &f.path))
            .collect()
    } else {
        vec![rel]
    };

    let mut report = AddReport::default();
    for candidate in candidates {
        if candidate.is_empty() || is_metadata_path(&candidate) {
            continue;
        }
        if is_ignored(&candidate, &patterns) {
            debug!(path = %candidate, "ignored");
            report.ignored.push(candidate);
        } else {
            report.staged.push(candidate);
        }
    }

    repo.transaction(|tx| {
        for path in &report.staged {
            stage_path(tx, path)?;
        }
        Ok(())
    })?;

    info!(
        staged = report.staged.len(),
        ignored = report.ignored.len(),
        "added paths"
    );
    Ok(report)
}

fn join_rel(base: &str, path: &str) -> String {
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::list_staged;
    use std::fs;
    use tempfile::tempdir;

    fn staged(repo: &Repo) -> Vec<String> {
        list_staged(repo.db())
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect()
    }

    #[test]
    fn test_add_single_file() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let report = add(&mut repo, &dir.path().join("a.txt")).unwrap();

        assert_eq!(report.staged, vec!["a.txt"]);
        assert_eq!(staged(&repo), vec!["a.txt"]);
    }

    #[test]
    fn test_add_directory_skips_metadata() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("dir")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("dir/b.txt"), "b").unwrap();

        let report = add(&mut repo, dir.path()).unwrap();

        assert_eq!(report.staged, vec!["a.txt", "dir/b.txt"]);
        assert!(staged(&repo).iter().all(|p| !p.starts_with(".kuro")));
    }

    #[test]
    fn test_add_subdirectory_prefixes_paths() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/nested/lib.rs"), "fn main() {}").unwrap();

        let report = add(&mut repo, &dir.path().join("src")).unwrap();
        assert_eq!(report.staged, vec!["src/nested/lib.rs"]);
    }

    #[test]
    fn test_add_applies_ignore_rules() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();
        fs::write(repo.ignore_path(), "node_modules\n*.log\n").unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/x.js"), "x").unwrap();
        fs::write(dir.path().join("debug.log"), "log").unwrap();
        fs::write(dir.path().join("main.js"), "main").unwrap();

        let report = add(&mut repo, dir.path()).unwrap();

        assert_eq!(report.staged, vec!["main.js"]);
        assert_eq!(report.ignored, vec!["debug.log", "node_modules/x.js"]);
        assert_eq!(staged(&repo), vec!["main.js"]);
    }

    #[test]
    fn test_add_ignored_single_file() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();
        fs::write(repo.ignore_path(), "*.log\n").unwrap();
        fs::write(dir.path().join("debug.log"), "log").unwrap();

        let report = add(&mut repo, &dir.path().join("debug.log")).unwrap();

        assert!(report.staged.is_empty());
        assert_eq!(report.ignored, vec!["debug.log"]);
    }

    #[test]
    fn test_add_missing_path() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();

        let result = add(&mut repo, &dir.path().join("ghost.txt"));
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_add_outside_repo() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir(&root).unwrap();
        let mut repo = Repo::init(&root).unwrap();
        fs::write(dir.path().join("outside.txt"), "x").unwrap();

        let result = add(&mut repo, &dir.path().join("outside.txt"));
        assert!(matches!(result, Err(Error::PathOutsideRepo(_))));
    }
}
