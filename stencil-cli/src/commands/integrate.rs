//! `stencil integrate`: fold project changes back into the template.

use std::io;

use anyhow::{Context, Result};
use clap::Args;

use stencil_core::locator;
use stencil_sync::{GitCli, IntegrateRequest, PromptChooser, Reconciler};

use super::{existing_dir, ProjectArgs};
use crate::terminal::{self, TerminalReporter};

/// Arguments for `stencil integrate`.
#[derive(Args, Debug)]
pub struct IntegrateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Proceed even when the template has unstaged changes.
    #[arg(long)]
    pub ignore_unstaged_changes: bool,
}

impl IntegrateArgs {
    pub fn run(self) -> Result<()> {
        let project_root = self.project.project_root()?;
        let replay = self.project.load_replay(&project_root)?;

        let template_path = match self.project.explicit_template()? {
            Some(path) => existing_dir(&path)?,
            None => match locator::template_path_from_replay(&replay)? {
                Some(path) => existing_dir(&path)?,
                None => {
                    let stdin = io::stdin();
                    terminal::prompt_template_path(stdin.lock(), io::stdout())?
                }
            },
        };
        tracing::debug!(
            project = %project_root.display(),
            template = %template_path.display(),
            "resolved integration paths"
        );

        let git = GitCli::default();
        let mut chooser = PromptChooser::new(io::stdin().lock(), io::stdout())
            .with_path_style(terminal::highlight_path);
        let mut reporter = TerminalReporter::new(io::stdout());

        let report = Reconciler::new(&git, &mut chooser, &mut reporter)
            .integrate(&IntegrateRequest {
                project_root: &project_root,
                template_root: &template_path,
                replay: &replay,
                ignore_unstaged: self.ignore_unstaged_changes,
            })
            .with_context(|| {
                format!(
                    "failed to integrate '{}' into '{}'",
                    project_root.display(),
                    template_path.display()
                )
            })?;

        reporter.print_summary(&report);
        Ok(())
    }
}
