//! Reintegration driver.
//!
//! ## `integrate` protocol
//!
//! 1. Refuse to run when the template has unstaged changes (unless told to
//!    ignore them), before anything is touched.
//! 2. Build the path mapping and list the project files.
//! 3. For each file: derive its template path, classify it, pick an action
//!    and execute it. Unchanged files are reported and skipped.
//! 4. Return the per-file report.
//!
//! Execution is strictly sequential; a per-file I/O failure aborts the run
//! without rolling back earlier files.

use std::path::{Path, PathBuf};

use stencil_core::{ReplayConfiguration, TemplateFileAction};

use crate::error::SyncError;
use crate::ignore::{ignore_entry, IgnoreList};
use crate::report::{FileOutcome, FileReport, IntegrateReport, ProgressEvent, Reporter};
use crate::resolver::{ActionResolver, Chooser, TemplateState};
use crate::templater::{self, PathMapping};
use crate::vcs::Vcs;
use crate::{scanner, writer};

/// Inputs of one `integrate` run.
#[derive(Debug, Clone, Copy)]
pub struct IntegrateRequest<'a> {
    pub project_root: &'a Path,
    pub template_root: &'a Path,
    pub replay: &'a ReplayConfiguration,
    /// Skip the unstaged-changes precondition.
    pub ignore_unstaged: bool,
}

pub struct Reconciler<'a> {
    vcs: &'a dyn Vcs,
    resolver: ActionResolver<'a>,
    reporter: &'a mut dyn Reporter,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        vcs: &'a dyn Vcs,
        chooser: &'a mut dyn Chooser,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            vcs,
            resolver: ActionResolver::new(vcs, chooser),
            reporter,
        }
    }

    /// Fold project changes back into the template.
    pub fn integrate(&mut self, request: &IntegrateRequest<'_>) -> Result<IntegrateReport, SyncError> {
        let template_root = request.template_root;
        if !request.ignore_unstaged && self.vcs.has_unstaged_changes(template_root)? {
            return Err(SyncError::UnstagedChanges {
                template_root: template_root.to_path_buf(),
            });
        }

        let mapping = templater::build_mapping(self.vcs, template_root, request.replay)?;
        let files = scanner::list_files(self.vcs, request.project_root)?;

        tracing::info!(
            project = %request.project_root.display(),
            template = %template_root.display(),
            files = files.len(),
            "integrating project into template"
        );
        self.reporter.report(&ProgressEvent::Started {
            project_root: request.project_root.to_path_buf(),
            template_root: template_root.to_path_buf(),
            files: files.len(),
        });

        let ignore_list = IgnoreList::at(template_root);
        let mut report = IntegrateReport::default();
        for project_rel in &files {
            let Some(file_report) =
                self.integrate_file(request, &mapping, &ignore_list, project_rel)?
            else {
                continue;
            };
            self.reporter.report(&ProgressEvent::File(file_report.clone()));
            report.push(file_report);
        }

        self.reporter.report(&ProgressEvent::Finished);
        Ok(report)
    }

    fn integrate_file(
        &mut self,
        request: &IntegrateRequest<'_>,
        mapping: &PathMapping,
        ignore_list: &IgnoreList,
        project_rel: &Path,
    ) -> Result<Option<FileReport>, SyncError> {
        let project_file = request.project_root.join(project_rel);
        if !project_file.is_file() {
            tracing::debug!(path = %project_rel.display(), "listed but not on disk, skipping");
            return Ok(None);
        }

        let template_rel = mapping.resolve(project_rel);
        let template_file = template_rel.as_ref().map(|rel| request.template_root.join(rel));
        tracing::debug!(
            project = %project_rel.display(),
            template = ?template_rel,
            "resolved template path"
        );

        let (state, action) = self.resolver.resolve(
            &project_file,
            template_file.as_deref(),
            project_rel,
            template_rel.as_deref(),
        )?;
        if state == TemplateState::Unchanged {
            return Ok(Some(FileReport {
                project_path: project_rel.to_path_buf(),
                template_path: template_rel,
                outcome: FileOutcome::Unchanged,
            }));
        }

        let target_rel = template_rel.unwrap_or_else(|| mapping.fallback_target(project_rel));
        self.execute(action, request.template_root, ignore_list, &project_file, &target_rel)?;

        Ok(Some(FileReport {
            project_path: project_rel.to_path_buf(),
            template_path: Some(target_rel),
            outcome: FileOutcome::from_action(action),
        }))
    }

    fn execute(
        &self,
        action: TemplateFileAction,
        template_root: &Path,
        ignore_list: &IgnoreList,
        project_file: &Path,
        target_rel: &Path,
    ) -> Result<(), SyncError> {
        let target: PathBuf = template_root.join(target_rel);
        match action {
            TemplateFileAction::Copy => {
                writer::copy_file(project_file, &target)?;
                tracing::info!(from = %project_file.display(), to = %target.display(), "copied");
            }
            TemplateFileAction::Patch => {
                writer::copy_file(project_file, &target)?;
                self.vcs.interactive_patch(template_root, &target)?;
                tracing::info!(file = %target.display(), "patched");
            }
            TemplateFileAction::Ignore => {
                ignore_list.append(&ignore_entry(target_rel))?;
            }
            TemplateFileAction::Skip => {
                tracing::debug!(file = %project_file.display(), "skipped");
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
