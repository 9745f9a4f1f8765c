use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, IoResultExt, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// read ignore rules, one per line; blank lines and `#` comments are skipped
///
/// a missing file is reported as `IgnoreFileNotFound` so callers can treat it
/// as an empty rule set.
pub fn load_ignore_file(path: &Path) -> Result<Vec<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::IgnoreFileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e).with_path(path),
    };
    Ok(parse_patterns(&content))
}

/// like `load_ignore_file`, with an absent file meaning no rules
pub fn load_ignore_rules(path: &Path) -> Result<Vec<String>> {
    match load_ignore_file(path) {
        Err(Error::IgnoreFileNotFound(_)) => Ok(Vec::new()),
        other => other,
    }
}

/// split rule file content into patterns
pub fn parse_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// check a repository-relative path against ignore patterns
pub fn is_ignored(path: &str, patterns: &[String]) -> bool {
    let path = path.trim_matches('/');
    patterns.iter().any(|pattern| matches_pattern(path, pattern))
}

fn matches_pattern(path: &str, pattern: &str) -> bool {
    if let Some(dir) = pattern.strip_suffix('/') {
        let dir = dir.trim_start_matches('/');
        return path == dir || path.starts_with(&format!("{}/", dir));
    }

    if pattern.contains('/') {
        return glob_match(pattern.trim_start_matches('/'), path);
    }

    path.split('/').any(|segment| glob_match(pattern, segment))
}

fn glob_match(pattern: &str, candidate: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(p) => p.matches_with(candidate, MATCH_OPTIONS),
        // unparseable patterns only match literally
        Err(_) => pattern == candidate,
    }
}
