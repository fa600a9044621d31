//! Error types for stencil-core.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors: a bad replay record, a template variable that
/// cannot be resolved, or a template layout that cannot be mapped.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading configuration.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The replay file did not exist at the expected path.
    #[error("replay file not found at {path}")]
    ReplayNotFound { path: PathBuf },

    /// The replay file is not valid JSON.
    #[error("failed to parse replay file at {path}: {source}")]
    ReplayParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The replay file parsed but carries no `cookiecutter` object.
    #[error("replay file at {path} has no `cookiecutter` object")]
    MissingSection { path: PathBuf },

    /// A `{{ cookiecutter.<key> }}` placeholder names a key the replay
    /// configuration does not define.
    #[error("template variable `{key}` in '{path}' has no value in the replay configuration")]
    UnresolvedVariable { key: String, path: String },

    /// A `{{ … }}` expression that is not a plain `cookiecutter.<key>` lookup.
    #[error("cannot resolve template expression `{expression}` in '{path}'")]
    UnresolvedExpression { expression: String, path: String },

    /// A replay value substituted into a path would not form a single path
    /// segment (it contains a separator, or the segment becomes `.`/`..`).
    #[error("replay value {value:?} for `{key}` in '{path}' is not a valid path segment")]
    InvalidPathValue {
        key: String,
        value: String,
        path: String,
    },

    /// More than one top-level template directory is placeholder-named.
    #[error("template at {template_root} has more than one project root: {}", .candidates.join(", "))]
    AmbiguousProjectRoot {
        template_root: PathBuf,
        candidates: Vec<String>,
    },

    /// The project-root subtree does not exist in the template.
    #[error("template project root '{name}' not found under {template_root}")]
    ProjectRootMissing { template_root: PathBuf, name: String },

    /// The project-root placeholder substitutes to an empty string.
    #[error("template project root '{name}' resolves to an empty name")]
    EmptyProjectRoot { name: String },

    /// Two distinct template paths resolve to the same project path.
    #[error("template paths {first} and {second} both resolve to project path {resolved}")]
    PathCollision {
        resolved: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// No template path given and none recorded in the replay file.
    #[error("no template path given and `_template` is not set in the replay configuration")]
    MissingTemplatePath,

    /// `dirs::home_dir()` returned `None` while expanding `~`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
