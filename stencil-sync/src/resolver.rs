//! Per-file action selection.
//!
//! Selection is split in two: [`decide`] is a pure function of the
//! [`TemplateState`] and says whether an action is automatic or which choices
//! to offer; [`ActionResolver`] inspects the files, applies [`decide`] and
//! asks the injected [`Chooser`] when a choice is needed.
//!
//! | state     | decision                   |
//! |-----------|----------------------------|
//! | Unmapped  | offer copy, skip           |
//! | Missing   | offer copy, ignore, skip   |
//! | Unchanged | skip, no prompt            |
//! | Changed   | offer copy, patch, skip    |

use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

use stencil_core::TemplateFileAction;

use crate::detector;
use crate::error::{io_err, SyncError};
use crate::vcs::Vcs;

/// Action taken when the user just presses enter.
pub const DEFAULT_ACTION: TemplateFileAction = TemplateFileAction::Skip;

const UNMAPPED_CHOICES: &[TemplateFileAction] = &[TemplateFileAction::Copy, TemplateFileAction::Skip];
const MISSING_CHOICES: &[TemplateFileAction] = &[
    TemplateFileAction::Copy,
    TemplateFileAction::Ignore,
    TemplateFileAction::Skip,
];
const CHANGED_CHOICES: &[TemplateFileAction] = &[
    TemplateFileAction::Copy,
    TemplateFileAction::Patch,
    TemplateFileAction::Skip,
];

// ---------------------------------------------------------------------------
// State and decision
// ---------------------------------------------------------------------------

/// Relationship between a project file and its template counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateState {
    /// No template path could be derived.
    Unmapped,
    /// A template path was derived but nothing exists there.
    Missing,
    /// The template file exists with identical content.
    Unchanged,
    /// The template file exists and differs.
    Changed,
}

impl TemplateState {
    /// Classify a project file against its (possibly absent) template file.
    pub fn inspect(
        vcs: &dyn Vcs,
        project_file: &Path,
        template_file: Option<&Path>,
    ) -> Result<Self, SyncError> {
        let state = match template_file {
            None => TemplateState::Unmapped,
            Some(template_file) if !template_file.exists() => TemplateState::Missing,
            Some(template_file) => {
                if detector::has_changed(vcs, project_file, Some(template_file))? {
                    TemplateState::Changed
                } else {
                    TemplateState::Unchanged
                }
            }
        };
        Ok(state)
    }
}

impl fmt::Display for TemplateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateState::Unmapped => "unmapped",
            TemplateState::Missing => "missing",
            TemplateState::Unchanged => "unchanged",
            TemplateState::Changed => "changed",
        })
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Take this action without asking.
    Auto(TemplateFileAction),
    /// Ask, offering these actions in label order.
    Offer(&'static [TemplateFileAction]),
}

pub fn decide(state: TemplateState) -> Decision {
    match state {
        TemplateState::Unmapped => Decision::Offer(UNMAPPED_CHOICES),
        TemplateState::Missing => Decision::Offer(MISSING_CHOICES),
        TemplateState::Unchanged => Decision::Auto(TemplateFileAction::Skip),
        TemplateState::Changed => Decision::Offer(CHANGED_CHOICES),
    }
}

// ---------------------------------------------------------------------------
// Chooser
// ---------------------------------------------------------------------------

/// Everything a chooser needs to present one question.
#[derive(Debug, Clone, Copy)]
pub struct ActionPrompt<'a> {
    /// Project-relative path of the file being integrated.
    pub project_path: &'a Path,
    /// Template-relative destination, when one was derived.
    pub template_path: Option<&'a Path>,
    pub state: TemplateState,
    /// Offered actions, in label order.
    pub choices: &'a [TemplateFileAction],
    pub default: TemplateFileAction,
}

/// Picks one of the offered actions.
pub trait Chooser {
    fn choose(&mut self, prompt: &ActionPrompt<'_>) -> Result<TemplateFileAction, SyncError>;
}

/// Line-based chooser over any reader/writer pair.
///
/// Empty input selects the default, anything else must be a prefix of an
/// offered label; invalid input asks again and end of input aborts.
pub struct PromptChooser<R, W> {
    reader: R,
    writer: W,
    style_path: fn(&str) -> String,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            style_path: str::to_string,
        }
    }

    /// Decorate paths before they are printed, e.g. with terminal colours.
    pub fn with_path_style(mut self, style: fn(&str) -> String) -> Self {
        self.style_path = style;
        self
    }

    fn render(&self, prompt: &ActionPrompt<'_>) -> String {
        let project = (self.style_path)(&prompt.project_path.display().to_string());
        let template = (self.style_path)(
            &prompt
                .template_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unmapped)".to_string()),
        );
        let choices = prompt
            .choices
            .iter()
            .map(TemplateFileAction::prompt_label)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "\n integrate: {project}\n      into: {template} ?\n\n      {choices} [{}]: ",
            &prompt.default.label()[..1]
        )
    }
}

impl<R: BufRead, W: Write> Chooser for PromptChooser<R, W> {
    fn choose(&mut self, prompt: &ActionPrompt<'_>) -> Result<TemplateFileAction, SyncError> {
        let text = self.render(prompt);
        loop {
            self.writer
                .write_all(text.as_bytes())
                .and_then(|()| self.writer.flush())
                .map_err(|e| io_err("<prompt>", e))?;

            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| io_err("<prompt>", e))?;
            if read == 0 {
                return Err(SyncError::Aborted);
            }
            if line.trim().is_empty() {
                return Ok(prompt.default);
            }
            if let Some(action) = TemplateFileAction::from_response(&line, prompt.choices) {
                return Ok(action);
            }
            writeln!(self.writer, "Error: '{}' is not a valid choice.", line.trim())
                .map_err(|e| io_err("<prompt>", e))?;
        }
    }
}

// ---------------------------------------------------------------------------
// ActionResolver
// ---------------------------------------------------------------------------

/// Combines file inspection, [`decide`] and the chooser.
pub struct ActionResolver<'a> {
    vcs: &'a dyn Vcs,
    chooser: &'a mut dyn Chooser,
}

impl<'a> ActionResolver<'a> {
    pub fn new(vcs: &'a dyn Vcs, chooser: &'a mut dyn Chooser) -> Self {
        Self { vcs, chooser }
    }

    /// Inspect the files and pick an action.
    ///
    /// `project_file`/`template_file` are absolute; the relative paths are
    /// what the chooser shows. The inspected state is returned alongside the
    /// action so callers can tell an automatic skip from a chosen one.
    pub fn resolve(
        &mut self,
        project_file: &Path,
        template_file: Option<&Path>,
        project_rel: &Path,
        template_rel: Option<&Path>,
    ) -> Result<(TemplateState, TemplateFileAction), SyncError> {
        let state = TemplateState::inspect(self.vcs, project_file, template_file)?;
        let action = self.choose(state, project_rel, template_rel)?;
        Ok((state, action))
    }

    fn choose(
        &mut self,
        state: TemplateState,
        project_rel: &Path,
        template_rel: Option<&Path>,
    ) -> Result<TemplateFileAction, SyncError> {
        let choices = match decide(state) {
            Decision::Auto(action) => return Ok(action),
            Decision::Offer(choices) => choices,
        };

        let prompt = ActionPrompt {
            project_path: project_rel,
            template_path: template_rel,
            state,
            choices,
            default: DEFAULT_ACTION,
        };
        let action = self.chooser.choose(&prompt)?;
        if !choices.contains(&action) {
            return Err(SyncError::UnofferedAction {
                action,
                path: project_rel.to_path_buf(),
            });
        }
        tracing::debug!(path = %project_rel.display(), %state, %action, "chose action");
        Ok(action)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
