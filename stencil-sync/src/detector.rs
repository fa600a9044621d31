//! Change detection between a project file and its template counterpart.

use std::path::Path;

use crate::error::SyncError;
use crate::vcs::Vcs;

/// Whether `project_file` needs attention.
///
/// A missing or absent template file always counts as changed; otherwise the
/// two files are compared through the collaborator's diff.
pub fn has_changed(
    vcs: &dyn Vcs,
    project_file: &Path,
    template_file: Option<&Path>,
) -> Result<bool, SyncError> {
    match template_file {
        Some(template_file) if template_file.exists() => {
            Ok(vcs.has_diff(project_file, template_file)?)
        }
        _ => Ok(true),
    }
}
