//! Reintegration outcomes and the output sink they are reported through.

use std::collections::BTreeMap;
use std::path::PathBuf;

use stencil_core::TemplateFileAction;

/// What happened to one project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileOutcome {
    /// Template file already identical; nothing asked.
    Unchanged,
    Copied,
    Patched,
    Ignored,
    Skipped,
}

impl FileOutcome {
    pub fn all() -> &'static [FileOutcome] {
        &[
            FileOutcome::Unchanged,
            FileOutcome::Copied,
            FileOutcome::Patched,
            FileOutcome::Ignored,
            FileOutcome::Skipped,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Unchanged => "unchanged",
            FileOutcome::Copied => "copied",
            FileOutcome::Patched => "patched",
            FileOutcome::Ignored => "ignored",
            FileOutcome::Skipped => "skipped",
        }
    }

    /// Outcome of executing `action` on a file that needed attention.
    pub fn from_action(action: TemplateFileAction) -> Self {
        match action {
            TemplateFileAction::Copy => FileOutcome::Copied,
            TemplateFileAction::Ignore => FileOutcome::Ignored,
            TemplateFileAction::Patch => FileOutcome::Patched,
            TemplateFileAction::Skip => FileOutcome::Skipped,
        }
    }
}

impl std::fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Project-relative path.
    pub project_path: PathBuf,
    /// Template-relative path acted on, if any.
    pub template_path: Option<PathBuf>,
    pub outcome: FileOutcome,
}

/// Ordered per-file outcomes of one `integrate` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrateReport {
    pub files: Vec<FileReport>,
}

impl IntegrateReport {
    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    pub fn count(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    /// Outcome → count, only for outcomes that occurred.
    pub fn counts(&self) -> BTreeMap<FileOutcome, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.outcome).or_insert(0) += 1;
        }
        counts
    }

    /// Files whose template side was modified.
    pub fn changed(&self) -> usize {
        self.count(FileOutcome::Copied) + self.count(FileOutcome::Patched) + self.count(FileOutcome::Ignored)
    }
}

/// Progress notifications emitted while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Mapping built and project listed.
    Started {
        project_root: PathBuf,
        template_root: PathBuf,
        files: usize,
    },
    /// One file finished.
    File(FileReport),
    Finished,
}

/// Output sink for user-facing progress.
pub trait Reporter {
    fn report(&mut self, event: &ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, outcome: FileOutcome) -> FileReport {
        FileReport {
            project_path: PathBuf::from(path),
            template_path: None,
            outcome,
        }
    }

    #[test]
    fn counts_group_by_outcome() {
        let mut report = IntegrateReport::default();
        report.push(file("a", FileOutcome::Unchanged));
        report.push(file("b", FileOutcome::Copied));
        report.push(file("c", FileOutcome::Unchanged));
        report.push(file("d", FileOutcome::Ignored));

        let counts = report.counts();
        assert_eq!(counts.get(&FileOutcome::Unchanged), Some(&2));
        assert_eq!(counts.get(&FileOutcome::Copied), Some(&1));
        assert!(!counts.contains_key(&FileOutcome::Patched));
        assert_eq!(report.changed(), 2);
    }

    #[test]
    fn outcome_follows_action() {
        assert_eq!(FileOutcome::from_action(TemplateFileAction::Copy), FileOutcome::Copied);
        assert_eq!(FileOutcome::from_action(TemplateFileAction::Skip), FileOutcome::Skipped);
        assert_eq!(FileOutcome::all().len(), 5);
    }
}
