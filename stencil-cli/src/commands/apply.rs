//! `stencil apply`: re-render the template over the project.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tempfile::TempDir;

use stencil_core::TemplateLocator;
use stencil_renderer::Instantiator;
use stencil_sync::{GitCli, Vcs};

use super::{existing_dir, ProjectArgs};

/// Arguments for `stencil apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl ApplyArgs {
    pub fn run(self) -> Result<()> {
        let project_root = self.project.project_root()?;
        let replay = self.project.load_replay(&project_root)?;
        let output_dir = project_root
            .parent()
            .context("project path has no parent directory")?;

        let locator = match self.project.explicit_template()? {
            Some(path) => TemplateLocator::Local(path),
            None => TemplateLocator::from_replay(&replay)?,
        };

        // A remote checkout lives in `_checkout` until rendering is done.
        let (template_dir, _checkout): (PathBuf, Option<TempDir>) = match locator {
            TemplateLocator::Local(path) => (existing_dir(&path)?, None),
            TemplateLocator::Remote(url) => {
                let dir = tempfile::tempdir().context("failed to create checkout directory")?;
                let dest = dir.path().join("template");
                GitCli::default()
                    .clone_shallow(&url, &dest)
                    .with_context(|| format!("failed to clone template from {url}"))?;
                tracing::info!(%url, dest = %dest.display(), "cloned template");
                (dest, Some(dir))
            }
        };

        let report = Instantiator::new()
            .apply(&template_dir, &replay, output_dir)
            .with_context(|| format!("failed to apply template '{}'", template_dir.display()))?;

        println!(
            "✓ applied {} to {} ({} files, {} rendered)",
            template_dir.display().to_string().cyan(),
            report.project_dir.display().to_string().cyan().bold(),
            report.files.len(),
            report.rendered,
        );
        Ok(())
    }
}
