//! Template directory layout.
//!
//! A template keeps the generated project under one top-level directory
//! whose name is itself a placeholder. Everything else at the template root
//! (hooks, the template's own README, CI files) is not part of the project.

use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};

/// Project-root directory name assumed when no top-level template directory
/// is placeholder-named.
pub const DEFAULT_PROJECT_ROOT: &str = "{{ cookiecutter.project_slug }}";

/// Find the template's project subtree, relative to `template_root`.
///
/// The subtree is the only top-level directory whose name contains a
/// `{{ … }}` placeholder; when there is none, [`DEFAULT_PROJECT_ROOT`] must
/// exist. More than one candidate is ambiguous.
pub fn locate_project_root(template_root: &Path) -> Result<PathBuf, ConfigError> {
    let entries = std::fs::read_dir(template_root).map_err(|e| io_err(template_root, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(template_root, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| io_err(entry.path(), e))?
            .is_dir();
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_dir && name.contains("{{") && name.contains("}}") {
            candidates.push(name);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => {
            if !template_root.join(DEFAULT_PROJECT_ROOT).is_dir() {
                return Err(ConfigError::ProjectRootMissing {
                    template_root: template_root.to_path_buf(),
                    name: DEFAULT_PROJECT_ROOT.to_string(),
                });
            }
            Ok(PathBuf::from(DEFAULT_PROJECT_ROOT))
        }
        1 => Ok(PathBuf::from(candidates.remove(0))),
        _ => Err(ConfigError::AmbiguousProjectRoot {
            template_root: template_root.to_path_buf(),
            candidates,
        }),
    }
}
