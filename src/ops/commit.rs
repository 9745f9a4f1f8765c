use std::io::ErrorKind;

use tracing::info;

use crate::config::current_branch;
use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::object::{build_snapshot, compare_file_sets, put_object, snapshot_entries};
use crate::refs::{get_ref, update_ref};
use crate::repo::Repo;
use crate::stage::{clear_stage, list_staged};
use crate::types::FileEntry;

/// result of a commit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// a new snapshot was recorded and the branch advanced
    Committed { hash: Hash, files: usize },
    /// the stage was empty
    NothingStaged,
    /// the staged files match the branch's current snapshot; nothing written
    NoChanges,
}

/// record the staged paths as a new snapshot on the current branch
///
/// staged files are re-read from disk, so edits made after staging are
/// captured. the manifest is exactly the staged set. objects, snapshot,
/// branch pointer and stage clear are applied together or not at all.
pub fn commit(repo: &mut Repo, message: &str, author: Option<&str>) -> Result<CommitOutcome> {
    if message.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let root = repo.root().to_path_buf();

    repo.transaction(|tx| {
        let branch = current_branch(tx)?;
        let head = get_ref(tx, &branch)?;

        let staged = list_staged(tx)?;
        if staged.is_empty() {
            return Ok(CommitOutcome::NothingStaged);
        }

        let mut contents = Vec::with_capacity(staged.len());
        let mut entries = Vec::with_capacity(staged.len());
        for file in &staged {
            let path = root.join(&file.path);
            let content = match std::fs::read(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(Error::PathNotFound(path));
                }
                Err(e) => return Err(e).with_path(&path),
            };
            entries.push(FileEntry::new(file.path.clone(), compute_object_hash(&content)));
            contents.push(content);
        }

        let current = match &head.snapshot {
            Some(hash) => snapshot_entries(tx, hash)?,
            None => Vec::new(),
        };
        if head.snapshot.is_some() && compare_file_sets(&entries, &current) {
            info!(branch = %branch, "no changes to commit");
            return Ok(CommitOutcome::NoChanges);
        }

        for content in &contents {
            put_object(tx, content)?;
        }

        let hash = build_snapshot(tx, head.snapshot.as_ref(), message, author, &entries)?;
        update_ref(tx, &branch, Some(&hash))?;
        clear_stage(tx)?;

        info!(branch = %branch, %hash, files = entries.len(), "committed");
        Ok(CommitOutcome::Committed {
            hash,
            files: entries.len(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{get_snapshot, list_snapshots};
    use crate::ops::add;
    use crate::stage::stage_path;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn manifest(repo: &Repo, hash: &Hash) -> Vec<String> {
        snapshot_entries(repo.db(), hash)
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect()
    }

    fn committed_hash(outcome: CommitOutcome) -> Hash {
        match outcome {
            CommitOutcome::Committed { hash, .. } => hash,
            other => panic!("expected commit, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_staged_files() {
        let (dir, mut repo) = setup();
        write(dir.path(), "a.txt", "a");
        write(dir.path(), "dir/b.txt", "b");
        stage_path(repo.db(), "a.txt").unwrap();
        stage_path(repo.db(), "dir/b.txt").unwrap();

        let hash = committed_hash(commit(&mut repo, "m1", None).unwrap());

        assert_eq!(get_ref(repo.db(), "main").unwrap().snapshot, Some(hash));
        assert_eq!(manifest(&repo, &hash), vec!["a.txt", "dir/b.txt"]);
        assert!(list_staged(repo.db()).unwrap().is_empty());

        let snapshot = get_snapshot(repo.db(), &hash).unwrap();
        assert_eq!(snapshot.message, "m1");
        assert!(snapshot.parent.is_none());
    }

    #[test]
    fn test_commit_links_parent() {
        let (dir, mut repo) = setup();
        write(dir.path(), "a.txt", "v1");
        stage_path(repo.db(), "a.txt").unwrap();
        let first = committed_hash(commit(&mut repo, "one", Some("alice")).unwrap());

        write(dir.path(), "a.txt", "v2");
        stage_path(repo.db(), "a.txt").unwrap();
        let second = committed_hash(commit(&mut repo, "two", Some("alice")).unwrap());

        let snapshot = get_snapshot(repo.db(), &second).unwrap();
        assert_eq!(snapshot.parent, Some(first));
        assert_eq!(snapshot.author.as_deref(), Some("alice"));
    }

    #[test]
    fn test_commit_empty_message() {
        let (_dir, mut repo) = setup();
        assert!(matches!(commit(&mut repo, "  ", None), Err(Error::EmptyMessage)));
    }

    #[test]
    fn test_commit_nothing_staged() {
        let (_dir, mut repo) = setup();
        assert_eq!(commit(&mut repo, "m", None).unwrap(), CommitOutcome::NothingStaged);
        assert!(list_snapshots(repo.db()).unwrap().is_empty());
    }

    #[test]
    fn test_noop_commit_writes_nothing() {
        let (dir, mut repo) = setup();
        write(dir.path(), "a.txt", "same");
        stage_path(repo.db(), "a.txt").unwrap();
        let first = committed_hash(commit(&mut repo, "one", None).unwrap());
        let before = get_ref(repo.db(), "main").unwrap();

        stage_path(repo.db(), "a.txt").unwrap();
        let outcome = commit(&mut repo, "again", None).unwrap();

        assert_eq!(outcome, CommitOutcome::NoChanges);
        assert_eq!(get_ref(repo.db(), "main").unwrap(), before);
        assert_eq!(list_snapshots(repo.db()).unwrap().len(), 1);
        assert_eq!(before.snapshot, Some(first));
        // stage left in place
        assert_eq!(list_staged(repo.db()).unwrap().len(), 1);
    }

    #[test]
    fn test_commit_captures_edits_after_staging() {
        let (dir, mut repo) = setup();
        write(dir.path(), "a.txt", "staged version");
        stage_path(repo.db(), "a.txt").unwrap();
        write(dir.path(), "a.txt", "edited later");

        let hash = committed_hash(commit(&mut repo, "m", None).unwrap());

        let entries = snapshot_entries(repo.db(), &hash).unwrap();
        assert_eq!(entries[0].object, compute_object_hash(b"edited later"));
    }

    #[test]
    fn test_commit_missing_staged_file_rolls_back() {
        let (dir, mut repo) = setup();
        write(dir.path(), "a.txt", "a");
        stage_path(repo.db(), "a.txt").unwrap();
        stage_path(repo.db(), "gone.txt").unwrap();

        let result = commit(&mut repo, "m", None);

        assert!(matches!(result, Err(Error::PathNotFound(_))));
        assert!(get_ref(repo.db(), "main").unwrap().snapshot.is_none());
        assert_eq!(list_staged(repo.db()).unwrap().len(), 2);
    }

    #[test]
    fn test_commit_after_add_directory() {
        let (dir, mut repo) = setup();
        write(dir.path(), "src/lib.rs", "lib");
        write(dir.path(), "README", "readme");
        add(&mut repo, dir.path()).unwrap();

        let hash = committed_hash(commit(&mut repo, "import", None).unwrap());
        assert_eq!(manifest(&repo, &hash), vec!["README", "src/lib.rs"]);
    }
}
