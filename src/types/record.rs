use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// a stored content blob
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    pub hash: Hash,
    pub content: Vec<u8>,
    pub created_at: i64,
}

/// a branch: named, mutable pointer into history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub name: String,
    /// None while the branch has no commits
    pub snapshot: Option<Hash>,
    pub updated_at: i64,
}

/// a path queued for the next commit (intent only, no content captured)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    pub path: String,
    pub staged_at: i64,
}
