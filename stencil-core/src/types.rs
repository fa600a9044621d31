//! Domain types for stencil.
//!
//! [`ReplayConfiguration`] is the immutable variable → value map recorded at
//! generation time. [`TemplateFileAction`] is the closed set of things the
//! reconciler can do with a changed project file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder namespace used in template paths: `{{ cookiecutter.<key> }}`.
pub const REPLAY_NAMESPACE: &str = "cookiecutter";

/// Reserved replay key holding the template source locator.
pub const TEMPLATE_KEY: &str = "_template";

/// Reserved replay key holding the template's origin URL.
pub const REPOSITORY_URL_KEY: &str = "_repository_url";

// ---------------------------------------------------------------------------
// ReplayConfiguration
// ---------------------------------------------------------------------------

/// Variable name → recorded value.
///
/// Values are kept as JSON so the instantiation engine can receive structured
/// context; [`ReplayConfiguration::value_str`] gives the form used for path
/// substitution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayConfiguration(BTreeMap<String, Value>);

impl ReplayConfiguration {
    /// Build a configuration from any iterator of key/value pairs.
    pub fn from_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// String form of a value: JSON strings verbatim, `null` as empty, and
    /// anything else as compact JSON.
    pub fn value_str(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// `_template`, when recorded as a non-empty string.
    pub fn template(&self) -> Option<&str> {
        self.non_empty_str(TEMPLATE_KEY)
    }

    /// `_repository_url`, when recorded as a non-empty string.
    pub fn repository_url(&self) -> Option<&str> {
        self.non_empty_str(REPOSITORY_URL_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// TemplateFileAction
// ---------------------------------------------------------------------------

/// Action to take for the template file of a changed project file.
///
/// Variants are declared in label order so `Ord` matches the order choices
/// are presented in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFileAction {
    /// Overwrite the template file with the project file bytes.
    Copy,
    /// Record the template-relative path in the template's `.gitignore`.
    Ignore,
    /// Copy, then stage hunks interactively.
    Patch,
    /// Take no action.
    Skip,
}

impl TemplateFileAction {
    /// All actions in label order.
    pub fn all() -> &'static [TemplateFileAction] {
        &[
            TemplateFileAction::Copy,
            TemplateFileAction::Ignore,
            TemplateFileAction::Patch,
            TemplateFileAction::Skip,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateFileAction::Copy => "copy",
            TemplateFileAction::Ignore => "ignore",
            TemplateFileAction::Patch => "patch",
            TemplateFileAction::Skip => "skip",
        }
    }

    /// Prompt form of the label, e.g. `[c]opy`.
    pub fn prompt_label(&self) -> String {
        let label = self.label();
        format!("[{}]{}", &label[..1], &label[1..])
    }

    /// Match a user response against `offered`.
    ///
    /// The trimmed, lowercased response must be a non-empty prefix of an
    /// offered label, so a single letter is enough.
    pub fn from_response(response: &str, offered: &[TemplateFileAction]) -> Option<Self> {
        let response = response.trim().to_lowercase();
        if response.is_empty() {
            return None;
        }
        offered
            .iter()
            .copied()
            .find(|action| action.label().starts_with(&response))
    }
}

impl fmt::Display for TemplateFileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
