//! In-memory collaborators for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use stencil_core::TemplateFileAction;

use crate::error::{SyncError, VcsError};
use crate::report::{ProgressEvent, Reporter};
use crate::resolver::{ActionPrompt, Chooser, TemplateState};
use crate::vcs::Vcs;

/// [`Vcs`] over the real filesystem without a `git` binary.
///
/// Listing walks the directory (skipping `.git`), diffs compare bytes and
/// every mutating call is recorded.
#[derive(Debug, Default)]
pub struct FsVcs {
    listing: Option<Vec<PathBuf>>,
    extra: Vec<PathBuf>,
    unstaged: bool,
    init_calls: RefCell<Vec<PathBuf>>,
    patch_calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl FsVcs {
    /// Return exactly `paths` from every listing.
    pub fn with_listing<const N: usize>(paths: [&str; N]) -> Self {
        Self {
            listing: Some(paths.iter().map(PathBuf::from).collect()),
            ..Self::default()
        }
    }

    /// Append `paths` to the walked listing, whether or not they exist.
    pub fn with_extra_listing<const N: usize>(mut self, paths: [&str; N]) -> Self {
        self.extra = paths.iter().map(PathBuf::from).collect();
        self
    }

    pub fn with_unstaged(mut self, unstaged: bool) -> Self {
        self.unstaged = unstaged;
        self
    }

    pub fn init_calls(&self) -> Vec<PathBuf> {
        self.init_calls.borrow().clone()
    }

    pub fn patch_calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.patch_calls.borrow().clone()
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if entry.file_name() != ".git" {
                walk(root, &path, out)?;
            }
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(())
}

fn fake_failure(command: &str, err: std::io::Error) -> VcsError {
    VcsError::Failed {
        command: command.to_string(),
        status: "exit status: 1".to_string(),
        stderr: err.to_string(),
    }
}

impl Vcs for FsVcs {
    fn init(&self, root: &Path) -> Result<(), VcsError> {
        self.init_calls.borrow_mut().push(root.to_path_buf());
        Ok(())
    }

    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, VcsError> {
        if let Some(listing) = &self.listing {
            return Ok(listing.clone());
        }
        let mut files = Vec::new();
        walk(root, root, &mut files).map_err(|e| fake_failure("ls-files", e))?;
        files.sort();
        files.extend(self.extra.iter().cloned());
        Ok(files)
    }

    fn has_diff(&self, a: &Path, b: &Path) -> Result<bool, VcsError> {
        let left = fs::read(a).map_err(|e| fake_failure("diff", e))?;
        let right = fs::read(b).map_err(|e| fake_failure("diff", e))?;
        Ok(left != right)
    }

    fn has_unstaged_changes(&self, _root: &Path) -> Result<bool, VcsError> {
        Ok(self.unstaged)
    }

    fn interactive_patch(&self, root: &Path, file: &Path) -> Result<(), VcsError> {
        self.patch_calls
            .borrow_mut()
            .push((root.to_path_buf(), file.to_path_buf()));
        Ok(())
    }

    fn clone_shallow(&self, url: &str, _dest: &Path) -> Result<(), VcsError> {
        Err(VcsError::Failed {
            command: format!("clone {url}"),
            status: "exit status: 128".to_string(),
            stderr: "network disabled in tests".to_string(),
        })
    }
}

/// Owned copy of an [`ActionPrompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub project_path: PathBuf,
    pub template_path: Option<PathBuf>,
    pub state: TemplateState,
    pub choices: Vec<TemplateFileAction>,
}

/// Answers prompts from a fixed script; an exhausted script aborts.
#[derive(Debug, Default)]
pub struct ScriptedChooser {
    answers: VecDeque<TemplateFileAction>,
    prompts: Vec<RecordedPrompt>,
}

impl ScriptedChooser {
    pub fn new(answers: impl IntoIterator<Item = TemplateFileAction>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[RecordedPrompt] {
        &self.prompts
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&mut self, prompt: &ActionPrompt<'_>) -> Result<TemplateFileAction, SyncError> {
        self.prompts.push(RecordedPrompt {
            project_path: prompt.project_path.to_path_buf(),
            template_path: prompt.template_path.map(Path::to_path_buf),
            state: prompt.state,
            choices: prompt.choices.to_vec(),
        });
        self.answers.pop_front().ok_or(SyncError::Aborted)
    }
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Vec<ProgressEvent>,
}

impl RecordingReporter {
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}
