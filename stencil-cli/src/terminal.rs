//! Terminal-facing pieces of `integrate`: the template-path prompt and the
//! progress reporter.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use stencil_core::locator;
use stencil_sync::ignore::IGNORE_FILE;
use stencil_sync::{FileOutcome, FileReport, IntegrateReport, ProgressEvent, Reporter};

pub fn highlight_path(path: &str) -> String {
    path.cyan().to_string()
}

/// Ask for a template directory until an existing one is given.
pub fn prompt_template_path<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> Result<PathBuf> {
    loop {
        write!(writer, "template path: ").context("failed to write prompt")?;
        writer.flush().context("failed to write prompt")?;

        let mut line = String::new();
        if reader.read_line(&mut line).context("failed to read template path")? == 0 {
            bail!("aborted: no template path given");
        }
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        let path = locator::expand_path(raw)?;
        match std::fs::canonicalize(&path) {
            Ok(resolved) if resolved.is_dir() => return Ok(resolved),
            _ => writeln!(writer, "Error: directory '{}' does not exist.", path.display())
                .context("failed to write prompt")?,
        }
    }
}

// ---------------------------------------------------------------------------
// TerminalReporter
// ---------------------------------------------------------------------------

/// Prints integration progress the way a person reads it.
pub struct TerminalReporter<W: Write> {
    out: W,
    template_root: PathBuf,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "files")]
    files: usize,
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            template_root: PathBuf::new(),
        }
    }

    /// Per-outcome table printed after the run.
    pub fn print_summary(&mut self, report: &IntegrateReport) {
        let counts = report.counts();
        if counts.is_empty() {
            let _ = writeln!(self.out, "No project files to integrate.");
            return;
        }
        let rows: Vec<SummaryRow> = FileOutcome::all()
            .iter()
            .filter_map(|outcome| {
                counts.get(outcome).map(|files| SummaryRow {
                    outcome: outcome.label().to_string(),
                    files: *files,
                })
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        let _ = writeln!(self.out, "{table}");
        let _ = writeln!(self.out, "template files updated: {}", report.changed());
    }

    fn file_line(&self, file: &FileReport) -> String {
        let project = quoted(&file.project_path);
        let template = file
            .template_path
            .as_deref()
            .map(quoted)
            .unwrap_or_default();
        match file.outcome {
            FileOutcome::Unchanged => format!("skipping {project}, unchanged"),
            FileOutcome::Skipped => format!("skipping {project}"),
            FileOutcome::Copied => format!("copied {project} to {template}"),
            FileOutcome::Patched => format!("patched {template} from {project}"),
            FileOutcome::Ignored => format!(
                "added {template} to {}",
                quoted(&self.template_root.join(IGNORE_FILE))
            ),
        }
    }
}

impl<W: Write> Reporter for TerminalReporter<W> {
    fn report(&mut self, event: &ProgressEvent) {
        let _ = match event {
            ProgressEvent::Started {
                project_root,
                template_root,
                files,
            } => {
                self.template_root = template_root.clone();
                writeln!(
                    self.out,
                    "Integrating project into template:\n\n   project: {}\n  template: {}\n     files: {}",
                    project_root.display().to_string().cyan().bold(),
                    template_root.display().to_string().cyan().bold(),
                    files.to_string().bold(),
                )
            }
            ProgressEvent::File(file) => {
                let line = self.file_line(file);
                writeln!(self.out, "\n      {line}")
            }
            ProgressEvent::Finished => writeln!(self.out, "\nfinished integrating project!\n"),
        };
    }
}

fn quoted(path: &Path) -> String {
    format!("'{}'", path.display())
}
