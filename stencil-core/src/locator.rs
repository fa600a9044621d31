//! Template locator helpers.
//!
//! A template is located either by a local path (`--template-path`, or the
//! replay's `_template` value) or by the origin URL recorded in
//! `_repository_url`. URLs are normalised to HTTPS so they can be cloned
//! without SSH credentials.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::types::ReplayConfiguration;

/// Where a template lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocator {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A git URL, already normalised to `https://`.
    Remote(String),
}

impl TemplateLocator {
    /// Classify `raw`: anything that looks like a git URL becomes
    /// [`TemplateLocator::Remote`], everything else a path with variables and
    /// `~` expanded.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if is_remote(trimmed) {
            Ok(TemplateLocator::Remote(normalize_repository_url(trimmed)))
        } else {
            Ok(TemplateLocator::Local(expand_path(trimmed)?))
        }
    }

    /// Locator for `stencil apply` when no template path was given:
    /// `_repository_url` first, then `_template`.
    pub fn from_replay(replay: &ReplayConfiguration) -> Result<Self, ConfigError> {
        if let Some(url) = replay.repository_url() {
            return Ok(TemplateLocator::Remote(normalize_repository_url(url)));
        }
        match replay.template() {
            Some(raw) => Self::parse(raw),
            None => Err(ConfigError::MissingTemplatePath),
        }
    }
}

fn is_remote(raw: &str) -> bool {
    ["https://", "http://", "git@", "git://", "ssh://"]
        .iter()
        .any(|prefix| raw.starts_with(prefix))
}

/// Local template path recorded in the replay's `_template` key, expanded.
///
/// Returns `Ok(None)` when the key is absent or blank so the caller can
/// prompt instead.
pub fn template_path_from_replay(
    replay: &ReplayConfiguration,
) -> Result<Option<PathBuf>, ConfigError> {
    replay.template().map(expand_path).transpose()
}

/// Expand `$VAR` / `${VAR}` references and a leading `~`.
///
/// Unset variables are left as written.
pub fn expand_path(raw: &str) -> Result<PathBuf, ConfigError> {
    let expanded = env_var_pattern().replace_all(raw, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    if expanded == "~" {
        return home();
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        return Ok(home()?.join(rest));
    }
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Rewrite `git@host:`, `git://host/` and `https://host/` prefixes to
/// `https://host/`, after trimming and lowercasing.
///
/// ```
/// use stencil_core::locator::normalize_repository_url;
///
/// assert_eq!(
///     normalize_repository_url("git@github.com:Acme/template.git"),
///     "https://github.com/acme/template.git",
/// );
/// ```
pub fn normalize_repository_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    repository_prefix_pattern()
        .replace(&lowered, "https://${host}/")
        .into_owned()
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:([A-Za-z_][A-Za-z0-9_]*)|\{([A-Za-z_][A-Za-z0-9_]*)\})")
            .expect("valid env var pattern")
    })
}

fn repository_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:git@|git://|https://)(?P<host>.*?)(?::|/)")
            .expect("valid repository url pattern")
    })
}
