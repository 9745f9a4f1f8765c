use tracing::warn;

use crate::config::current_branch;
use crate::error::{Error, Result};
use crate::object::{get_snapshot, list_snapshot_files};
use crate::refs::get_ref;
use crate::repo::Repo;
use crate::types::Snapshot;

/// snapshot with its manifest size for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub snapshot: Snapshot,
    pub files: usize,
}

/// history of one branch, newest first
#[derive(Debug, Clone)]
pub struct History {
    pub branch: String,
    pub entries: Vec<LogEntry>,
    /// false if the walk hit a missing ancestor
    pub complete: bool,
}

/// walk a branch's parent chain (defaults to the current branch)
pub fn log(repo: &Repo, branch: Option<&str>, max_count: Option<usize>) -> Result<History> {
    let branch = match branch {
        Some(name) => name.to_string(),
        None => current_branch(repo)?,
    };
    let head = get_ref(repo, &branch)?;

    let mut history = History {
        branch,
        entries: Vec::new(),
        complete: true,
    };

    let mut cursor = head.snapshot;
    while let Some(hash) = cursor {
        if max_count.is_some_and(|max| history.entries.len() >= max) {
            break;
        }

        let snapshot = match get_snapshot(repo, &hash) {
            Ok(snapshot) => snapshot,
            Err(Error::SnapshotNotFound(_)) => {
                warn!(branch = %history.branch, %hash, "commit history is incomplete");
                history.complete = false;
                break;
            }
            Err(e) => return Err(e),
        };

        let files = list_snapshot_files(repo, &hash)?.len();
        cursor = snapshot.parent;
        history.entries.push(LogEntry { snapshot, files });
    }

    Ok(history)
}

/// format a log entry for display
impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "commit {}", self.snapshot.hash)?;
        if let Some(author) = &self.snapshot.author {
            writeln!(f, "Author: {}", author)?;
        }
        writeln!(f, "Date:   {}", self.snapshot.timestamp)?;
        writeln!(f, "Files:  {}", self.files)?;
        writeln!(f)?;
        for line in self.snapshot.message.lines() {
            writeln!(f, "    {}", line)?;
        }
        Ok(())
    }
}
