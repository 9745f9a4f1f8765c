use std::path::PathBuf;

use crate::Hash;

/// error type for kuro operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository not found at {0}")]
    NoRepo(PathBuf),

    #[error("repository already initialized at {0}")]
    RepoExists(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(Hash),

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("config key not found: {0}")]
    DataNotFound(String),

    #[error("ignore file not found: {0}")]
    IgnoreFileNotFound(PathBuf),

    #[error("branch or commit not found: {0}")]
    NotFound(String),

    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("branch already exists: {0}")]
    RefExists(String),

    #[error("remote already exists: {0}")]
    RemoteExists(String),

    #[error("invalid branch name: {0}")]
    InvalidRef(String),

    #[error("cannot delete the current branch: {0}")]
    CurrentBranch(String),

    #[error("path is outside the repository: {0}")]
    PathOutsideRepo(PathBuf),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("duplicate path in snapshot: {0}")]
    DuplicatePath(String),

    #[error("commit message required")]
    EmptyMessage,

    #[error("no commits yet on branch {0}")]
    NoCommits(String),

    #[error("invalid remote '{0}': expected <user>/<repo>")]
    InvalidRemote(String),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("repository integrity check failed")]
    IntegrityCheck,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open store at {path}: {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to apply schema: {0}")]
    SchemaApply(#[source] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("settings error: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("settings serialization error: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// true for the expected, recoverable "does not exist" conditions
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ObjectNotFound(_)
                | Error::SnapshotNotFound(_)
                | Error::RefNotFound(_)
                | Error::DataNotFound(_)
                | Error::IgnoreFileNotFound(_)
                | Error::NotFound(_)
                | Error::PathNotFound(_)
        )
    }

    /// true when the caller may report and continue (re-init, re-create)
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Error::RepoExists(_) | Error::RefExists(_) | Error::RemoteExists(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert!(Error::RefNotFound("dev".into()).is_not_found());
        assert!(Error::DataNotFound("remote".into()).is_not_found());
        assert!(Error::IgnoreFileNotFound(PathBuf::from(".kuro/.kuroignore")).is_not_found());
        assert!(!Error::EmptyMessage.is_not_found());
        assert!(!Error::CurrentBranch("main".into()).is_not_found());
    }

    #[test]
    fn test_already_exists_family() {
        assert!(Error::RepoExists(PathBuf::from("/tmp/x")).is_already_exists());
        assert!(Error::RefExists("dev".into()).is_already_exists());
        assert!(!Error::RefNotFound("dev".into()).is_already_exists());
    }
}
