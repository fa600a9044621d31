//! Replay record loading.
//!
//! A replay record is the JSON document written at generation time. Only its
//! nested `cookiecutter` object is used:
//!
//! ```text
//! {
//!   "cookiecutter": {
//!     "project_slug": "demo",
//!     "_template": "~/src/python-template",
//!     "_repository_url": "git@github.com:acme/python-template.git"
//!   }
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{io_err, ConfigError};
use crate::types::{ReplayConfiguration, REPLAY_NAMESPACE};

/// Replay file name looked up inside the project path by default.
pub const DEFAULT_REPLAY_FILE: &str = ".cookiecutter.json";

/// Load the replay configuration recorded at `path`.
///
/// Returns `ConfigError::ReplayNotFound` if absent, `ConfigError::ReplayParse`
/// if the file is not JSON and `ConfigError::MissingSection` if it has no
/// `cookiecutter` object.
pub fn load(path: &Path) -> Result<ReplayConfiguration, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ReplayNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    load_from_reader(path, file)
}

/// Load from an already-open reader. `path` is only used in error messages.
pub fn load_from_reader(
    path: &Path,
    mut reader: impl Read,
) -> Result<ReplayConfiguration, ConfigError> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|e| io_err(path, e))?;
    parse(path, &contents)
}

fn parse(path: &Path, contents: &str) -> Result<ReplayConfiguration, ConfigError> {
    let mut document: Value =
        serde_json::from_str(contents).map_err(|source| ConfigError::ReplayParse {
            path: path.to_path_buf(),
            source,
        })?;

    match document.get_mut(REPLAY_NAMESPACE).map(Value::take) {
        Some(Value::Object(section)) => {
            let replay = ReplayConfiguration::from_map(section);
            tracing::debug!(path = %path.display(), keys = replay.len(), "loaded replay configuration");
            Ok(replay)
        }
        _ => Err(ConfigError::MissingSection {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_replay(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(DEFAULT_REPLAY_FILE);
        std::fs::write(&path, contents).expect("write replay");
        path
    }

    #[test]
    fn loads_cookiecutter_section() {
        let dir = TempDir::new().unwrap();
        let path = write_replay(
            &dir,
            r#"{"cookiecutter": {"project_slug": "demo", "_template": "/tpl"}, "other": 1}"#,
        );
        let replay = load(&path).expect("load");
        assert_eq!(replay.len(), 2);
        assert_eq!(replay.value_str("project_slug").as_deref(), Some("demo"));
        assert_eq!(replay.template(), Some("/tpl"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReplayNotFound { .. }), "got: {err}");
    }

    #[test]
    fn invalid_json_is_parse_error_with_path() {
        let dir = TempDir::new().unwrap();
        let path = write_replay(&dir, "{ not json");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReplayParse { .. }), "got: {err}");
        assert!(err.to_string().contains(DEFAULT_REPLAY_FILE));
    }

    #[test]
    fn missing_section_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_replay(&dir, r#"{"project_slug": "demo"}"#);
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { .. }), "got: {err}");

        let path = write_replay(&dir, r#"{"cookiecutter": ["demo"]}"#);
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { .. }), "got: {err}");
    }

    #[test]
    fn load_from_reader_matches_load() {
        let json = r#"{"cookiecutter": {"project_slug": "demo"}}"#;
        let replay = load_from_reader(Path::new("<stdin>"), json.as_bytes()).expect("load");
        assert_eq!(replay.value_str("project_slug").as_deref(), Some("demo"));
    }
}
