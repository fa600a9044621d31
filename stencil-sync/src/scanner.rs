//! Project file enumeration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::vcs::Vcs;

/// Files under `root` that version control would consider part of the
/// working tree (tracked, modified, untracked but not ignored), relative to
/// `root`.
///
/// `root` is made a repository first if it is not one already. Order is the
/// collaborator's; repeated entries keep their first position.
pub fn list_files(vcs: &dyn Vcs, root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    vcs.init(root)?;
    let listed = vcs.list_files(root)?;

    let mut seen = HashSet::with_capacity(listed.len());
    let files: Vec<PathBuf> = listed
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect();

    tracing::debug!(root = %root.display(), count = files.len(), "listed project files");
    Ok(files)
}
