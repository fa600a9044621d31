pub mod apply;
pub mod integrate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use stencil_core::{locator, replay, ReplayConfiguration};

/// Options shared by `apply` and `integrate`.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Path of the generated project.
    #[arg(long, default_value = ".")]
    pub project_path: PathBuf,

    /// Replay file recorded at generation time [default: <project-path>/.cookiecutter.json].
    #[arg(long)]
    pub replay_file: Option<PathBuf>,

    /// Path of the template (defaults to the location recorded in the replay file).
    #[arg(long)]
    pub template_path: Option<String>,
}

impl ProjectArgs {
    /// Absolute project directory.
    pub fn project_root(&self) -> Result<PathBuf> {
        let root = std::fs::canonicalize(&self.project_path)
            .with_context(|| format!("project path '{}' not found", self.project_path.display()))?;
        if !root.is_dir() {
            bail!("project path '{}' is not a directory", root.display());
        }
        Ok(root)
    }

    pub fn load_replay(&self, project_root: &Path) -> Result<ReplayConfiguration> {
        let path = self
            .replay_file
            .clone()
            .unwrap_or_else(|| project_root.join(replay::DEFAULT_REPLAY_FILE));
        let replay = replay::load(&path)?;
        tracing::debug!(path = %path.display(), keys = replay.len(), "loaded replay configuration");
        Ok(replay)
    }

    /// `--template-path`, expanded, when given.
    pub fn explicit_template(&self) -> Result<Option<PathBuf>> {
        self.template_path
            .as_deref()
            .map(locator::expand_path)
            .transpose()
            .map_err(Into::into)
    }
}

/// Canonical template directory; it must exist.
pub fn existing_dir(path: &Path) -> Result<PathBuf> {
    let resolved = std::fs::canonicalize(path)
        .with_context(|| format!("template path '{}' not found", path.display()))?;
    if !resolved.is_dir() {
        bail!("template path '{}' is not a directory", resolved.display());
    }
    Ok(resolved)
}
