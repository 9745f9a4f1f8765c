use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::repo::Repo;
use crate::stage::{clear_stage, list_staged, staged_under, unstage_path};

/// take a path, or everything beneath it, off the stage
///
/// the repository root clears the whole stage. returns the removed paths;
/// an empty result means nothing matching was staged.
pub fn unstage(repo: &mut Repo, path: &Path) -> Result<Vec<String>> {
    let base = repo.relative_path(path)?;

    let removed = repo.transaction(|tx| {
        if base.is_empty() {
            let all: Vec<String> = list_staged(tx)?.into_iter().map(|f| f.path).collect();
            clear_stage(tx)?;
            return Ok(all);
        }

        let matched: Vec<String> = staged_under(tx, &base)?.into_iter().map(|f| f.path).collect();
        for path in &matched {
            unstage_path(tx, path)?;
        }
        Ok(matched)
    })?;

    info!(path = %base, removed = removed.len(), "unstaged");
    Ok(removed)
}
