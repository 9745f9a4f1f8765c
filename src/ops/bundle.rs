use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::current_branch;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{get_object, get_snapshot, list_snapshot_files};
use crate::refs::get_ref;
use crate::repo::Repo;
use crate::types::{Ref, Snapshot, SnapshotFile};

/// everything a remote needs to reproduce the current branch's snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub metadata: BundleMetadata,
    #[serde(rename = "ref")]
    pub branch: Ref,
    pub snapshot: Snapshot,
    pub files: Vec<SnapshotFile>,
    pub objects: Vec<BundleObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// repository name (the root directory's name)
    pub name: String,
    /// active branch
    pub head: String,
}

/// an object with its content hex-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleObject {
    pub hash: Hash,
    pub content: String,
    pub created_at: i64,
}

impl Bundle {
    /// encode as the JSON payload sent to a remote
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// decode a JSON payload
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// collect the current branch's snapshot, manifest and objects
pub fn bundle(repo: &Repo) -> Result<Bundle> {
    let head = current_branch(repo)?;
    let branch = get_ref(repo, &head)?;
    let hash = branch
        .snapshot
        .ok_or_else(|| Error::NoCommits(head.clone()))?;

    let snapshot = get_snapshot(repo, &hash)?;
    let files = list_snapshot_files(repo, &hash)?;

    let mut objects: Vec<BundleObject> = Vec::with_capacity(files.len());
    for file in &files {
        if objects.iter().any(|o| o.hash == file.object) {
            continue;
        }
        let object = get_object(repo, &file.object)?;
        objects.push(BundleObject {
            hash: object.hash,
            content: hex::encode(&object.content),
            created_at: object.created_at,
        });
    }

    let name = repo
        .root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!(branch = %head, %hash, objects = objects.len(), "bundled snapshot");

    Ok(Bundle {
        metadata: BundleMetadata { name, head },
        branch,
        snapshot,
        files,
        objects,
    })
}
