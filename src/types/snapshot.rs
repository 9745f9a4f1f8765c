use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// an immutable commit: a file manifest plus an optional parent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub hash: Hash,
    /// parent snapshot (None for a root snapshot)
    pub parent: Option<Hash>,
    pub message: String,
    pub author: Option<String>,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
}

/// one manifest row of a snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub snapshot: Hash,
    pub path: String,
    pub object: Hash,
}

/// a (path, object) pair used to build and compare manifests
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub object: Hash,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, object: Hash) -> Self {
        Self {
            path: path.into(),
            object,
        }
    }
}

impl From<SnapshotFile> for FileEntry {
    fn from(file: SnapshotFile) -> Self {
        Self {
            path: file.path,
            object: file.object,
        }
    }
}
