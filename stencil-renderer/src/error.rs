//! Error types for stencil-renderer.

use std::path::PathBuf;

use thiserror::Error;

use stencil_core::ConfigError;

/// All errors that can arise while instantiating a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A path segment or file body failed to render.
    #[error("failed to render {path}: {source}")]
    Tera {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// Building the tera context failed.
    #[error("context error: {0}")]
    Context(#[source] tera::Error),

    /// Template layout problem (no project root, ambiguous root).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A path segment rendered to something that is not a single name.
    #[error("path segment '{segment}' in {path} rendered to invalid name '{rendered}'")]
    InvalidSegment {
        path: PathBuf,
        segment: String,
        rendered: String,
    },

    /// Filesystem error while reading the template or writing output.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
