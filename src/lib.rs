//! kuro - local-first version control engine
//!
//! stores file content by hash in a single SQLite file, groups content into
//! immutable snapshots linked by parent pointers, and keeps a working tree
//! in sync with any snapshot on checkout.
//!
//! # Core concepts
//!
//! - **Object**: content blob keyed by SHA-256 of its bytes, stored whole
//! - **Snapshot**: a commit; a sorted file manifest plus an optional parent
//! - **Ref**: a branch, a named mutable pointer to a snapshot
//! - **Head**: the config entry naming the active branch
//! - **Stage**: the set of paths queued for the next commit (paths only)
//!
//! # Hash format
//!
//! object hash = SHA256(content)
//!
//! snapshot hash = SHA256 of the canonical text
//!
//! ```text
//! parent:<hex>\n           (only for non-root snapshots)
//! message:<message>
//! \npath:<path>\nobject:<hex>   (per file, sorted by path)
//! ```
//!
//! # Example usage
//!
//! ```no_run
//! use kuro::{Repo, ops};
//! use std::path::Path;
//!
//! // initialize a repository
//! let mut repo = Repo::init(Path::new("/path/to/project")).unwrap();
//!
//! // stage everything and commit it
//! ops::add(&mut repo, Path::new("/path/to/project")).unwrap();
//! ops::commit(&mut repo, "initial commit", None).unwrap();
//!
//! // reset the working tree to the tip of a branch
//! let opts = ops::CheckoutOptions { reset_workspace: true };
//! ops::checkout(&mut repo, "main", opts).unwrap();
//! ```

mod config;
mod db;
mod error;
mod hash;
mod ignore;
mod object;
mod refs;
mod repo;
mod settings;
mod stage;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::{
    current_branch, delete_config, get_config, parse_remote, remote, set_config,
    set_current_branch, set_remote, HEAD_KEY, REMOTE_KEY,
};
pub use db::{open_in_memory, open_store, with_tx, Executor};
pub use error::{Error, IoResultExt, Result};
pub use hash::{compute_object_hash, Hash};
pub use ignore::{is_ignored, load_ignore_file, load_ignore_rules, parse_patterns};
pub use object::{
    build_snapshot, canonical_snapshot_text, compare_file_sets, compute_snapshot_hash,
    delete_object, get_object, get_snapshot, list_object_hashes, list_snapshot_files,
    list_snapshots, object_exists, put_object, read_object, snapshot_entries, snapshot_exists,
};
pub use refs::{
    create_ref, delete_ref, get_ref, is_reserved, list_refs, ref_exists, update_ref,
    validate_ref_name, RESERVED_REF,
};
pub use repo::{Repo, IGNORE_FILE, METADATA_DIR, STORE_FILE, TMP_DIR};
pub use settings::{Settings, SETTINGS_ENV};
pub use stage::{clear_stage, list_staged, stage_path, staged_under, unstage_path};
pub use types::{FileEntry, Object, Ref, Snapshot, SnapshotFile, StagedFile};
