use std::path::{Component, Path, PathBuf};

use rusqlite::{Connection, Transaction};
use tracing::info;

use crate::db::{self, Executor};
use crate::error::{Error, IoResultExt, Result};

/// name of the directory that marks a repository root
pub const METADATA_DIR: &str = ".kuro";
/// store file inside the metadata directory
pub const STORE_FILE: &str = "kuro.db";
/// ignore rule file inside the metadata directory
pub const IGNORE_FILE: &str = ".kuroignore";
/// scratch area for workspace reconciliation
pub const TMP_DIR: &str = "tmp";

/// a kuro repository: a working tree root plus its open store
///
/// constructed once by the caller and passed to every engine operation.
pub struct Repo {
    root: PathBuf,
    conn: Connection,
}

impl Repo {
    /// initialize a new repository rooted at the given path
    pub fn init(root: &Path) -> Result<Self> {
        let store_path = root.join(METADATA_DIR).join(STORE_FILE);
        if store_path.exists() {
            return Err(Error::RepoExists(root.to_path_buf()));
        }

        let meta = root.join(METADATA_DIR);
        std::fs::create_dir_all(&meta).with_path(&meta)?;

        let conn = db::open_store(&store_path)?;
        db::seed_defaults(&conn)?;

        info!(root = %root.display(), "initialized repository");

        Ok(Self {
            root: root.to_path_buf(),
            conn,
        })
    }

    /// open an existing repository rooted at the given path
    pub fn open(root: &Path) -> Result<Self> {
        let store_path = root.join(METADATA_DIR).join(STORE_FILE);
        if !store_path.is_file() {
            return Err(Error::NoRepo(root.to_path_buf()));
        }

        let conn = db::open_store(&store_path)?;

        Ok(Self {
            root: root.to_path_buf(),
            conn,
        })
    }

    /// walk upward from `start` until a metadata directory is found
    pub fn discover(start: &Path) -> Result<Self> {
        let start = if start.is_absolute() {
            lexical_normalize(start)
        } else {
            let cwd = std::env::current_dir().with_path(start)?;
            lexical_normalize(&cwd.join(start))
        };

        for dir in start.ancestors() {
            if dir.join(METADATA_DIR).is_dir() {
                return Self::open(dir);
            }
        }

        Err(Error::NoRepo(start))
    }

    /// working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// path to the metadata directory
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    /// path to the store file
    pub fn store_path(&self) -> PathBuf {
        self.metadata_path().join(STORE_FILE)
    }

    /// path to the ignore rule file
    pub fn ignore_path(&self) -> PathBuf {
        self.metadata_path().join(IGNORE_FILE)
    }

    /// path to the scratch directory used by checkout
    pub fn tmp_path(&self) -> PathBuf {
        self.metadata_path().join(TMP_DIR)
    }

    /// the store connection, for reads outside a transaction
    pub fn db(&self) -> &Connection {
        &self.conn
    }

    /// run `f` as one all-or-nothing unit of work
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        db::with_tx(&mut self.conn, f)
    }

    /// turn a path into the normalized, root-relative form used by the store
    ///
    /// relative inputs are taken relative to the root. the root itself maps to "".
    pub fn relative_path(&self, path: &Path) -> Result<String> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let rel = lexical_normalize(&joined)
            .strip_prefix(lexical_normalize(&self.root))
            .map(Path::to_path_buf)
            .map_err(|_| Error::PathOutsideRepo(path.to_path_buf()))?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => return Err(Error::PathOutsideRepo(path.to_path_buf())),
            }
        }

        Ok(parts.join("/"))
    }
}

impl Executor for Repo {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// resolve `.` and `..` without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
