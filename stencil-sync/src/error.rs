//! Error types for stencil-sync.

use std::path::PathBuf;

use thiserror::Error;

use stencil_core::{ConfigError, TemplateFileAction};

/// Failure of the version-control collaborator itself: the binary could not
/// be spawned or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The command could not be started (not installed, permission denied).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// All errors that can arise from reintegration.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Replay, template-variable or template-layout problem.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The version-control collaborator failed.
    #[error("version control error: {0}")]
    Vcs(#[from] VcsError),

    /// The template working tree has unstaged changes.
    #[error(
        "template '{template_root}' has unstaged changes; stage or stash them, or pass --ignore-unstaged-changes"
    )]
    UnstagedChanges { template_root: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A chooser answered with an action that was not offered.
    #[error("action '{action}' was not offered for {path}")]
    UnofferedAction {
        action: TemplateFileAction,
        path: PathBuf,
    },

    /// The user closed the prompt without answering.
    #[error("aborted")]
    Aborted,
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
