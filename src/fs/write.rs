use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{IoResultExt, Result};
use crate::fs::scan::walk_error;

/// write a file, creating parent directories and replacing whatever is there
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    if path.is_dir() {
        fs::remove_dir_all(path).with_path(path)?;
    }
    fs::write(path, content).with_path(path)
}

/// rename `src` over `dest`, creating parents of `dest`
pub fn move_into_place(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    if dest.is_dir() {
        fs::remove_dir_all(dest).with_path(dest)?;
    }
    fs::rename(src, dest).with_path(dest)
}

/// delete a file or a directory tree; returns false if nothing was there
pub fn remove_path(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_path(path),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_path(path),
    }
}

/// remove directories under `root` that are empty, deepest first
///
/// `root` itself and the `skip` subtree are never touched. returns the
/// number of directories removed.
pub fn prune_empty_dirs(root: &Path, skip: &Path) -> Result<usize> {
    let mut dirs = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.path() != skip);

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    // children before parents
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));

    let mut removed = 0;
    for dir in &dirs {
        let is_empty = fs::read_dir(dir).with_path(dir)?.next().is_none();
        if is_empty {
            fs::remove_dir(dir).with_path(dir)?;
            removed += 1;
        }
    }

    Ok(removed)
}
