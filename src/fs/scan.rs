use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::repo::METADATA_DIR;

/// a file found in the working tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkspaceFile {
    /// root-relative, forward-slash path
    pub path: String,
    /// final path segment
    pub name: String,
}

/// enumerate files under `root`, sorted by path
///
/// directories and entries whose name starts with `.` are left out. the
/// metadata directory is not excluded here; filter with `is_metadata_path`.
pub fn scan(root: &Path) -> Result<Vec<WorkspaceFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::PathOutsideRepo(entry.path().to_path_buf()))?;

        files.push(WorkspaceFile {
            path: normalize_path(rel),
            name,
        });
    }

    files.sort();
    Ok(files)
}

/// true if a normalized path lies inside the metadata directory
pub fn is_metadata_path(path: &str) -> bool {
    path.split('/').next() == Some(METADATA_DIR)
}

/// reject a repository path that could escape the working tree or reach metadata
///
/// paths are `/`-separated and relative; empty segments, `.` and `..` are refused.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidPath("empty path".to_string()));
    }

    if path.starts_with('/') || path.contains('\\') || path.contains('\0') {
        return Err(Error::InvalidPath(format!("not a relative path: {:?}", path)));
    }

    if path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(Error::InvalidPath(format!("non-normal segment in {:?}", path)));
    }

    if is_metadata_path(path) {
        return Err(Error::InvalidPath(format!("metadata path: {}", path)));
    }

    Ok(())
}

/// join the normal components of a relative path with `/`
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(root).to_path_buf();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
    Error::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn paths(root: &Path) -> Vec<String> {
        scan(root).unwrap().into_iter().map(|f| f.path).collect()
    }

    #[test]
    fn test_scan_nested_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dir/sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("dir/b.txt"), "b").unwrap();
        fs::write(dir.path().join("dir/sub/c.txt"), "c").unwrap();

        assert_eq!(paths(dir.path()), vec!["a.txt", "dir/b.txt", "dir/sub/c.txt"]);

        let files = scan(dir.path()).unwrap();
        assert_eq!(files[2].name, "c.txt");
    }

    #[test]
    fn test_scan_skips_hidden_names_and_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join(".env"), "secret").unwrap();
        fs::write(dir.path().join("visible"), "x").unwrap();

        assert_eq!(paths(dir.path()), vec!["visible"]);
    }

    #[test]
    fn test_scan_keeps_metadata_contents() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".kuro")).unwrap();
        fs::write(dir.path().join(".kuro/kuro.db"), "").unwrap();

        let found = paths(dir.path());
        assert_eq!(found, vec![".kuro/kuro.db"]);
        assert!(is_metadata_path(&found[0]));
    }

    #[test]
    fn test_is_metadata_path() {
        assert!(is_metadata_path(".kuro"));
        assert!(is_metadata_path(".kuro/tmp/x"));
        assert!(!is_metadata_path("a/.kuro/x"));
        assert!(!is_metadata_path(".kurox/y"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./a/b/c.txt")), "a/b/c.txt");
        assert_eq!(normalize_path(Path::new("")), "");
    }

    #[test]
    fn test_validate_path() {
        for ok in ["a.txt", "dir/b.txt", ".gitignore", "a/.kuro/x", "..a/b..", ".kurox"] {
            assert!(validate_path(ok).is_ok(), "{} rejected", ok);
        }
        for bad in [
            "",
            "/etc/passwd",
            "../outside.txt",
            "a/../../x",
            "./a",
            "a/./b",
            "a//b",
            "a/",
            "a\\b",
            ".kuro",
            ".kuro/kuro.db",
        ] {
            assert!(
                matches!(validate_path(bad), Err(Error::InvalidPath(_))),
                "{:?} accepted",
                bad
            );
        }
    }
}
