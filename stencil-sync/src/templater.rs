//! Reverse path templating.
//!
//! A template keeps the generated project under a single top-level directory
//! whose name is itself a placeholder (conventionally
//! `{{ cookiecutter.project_slug }}`). Every path below it may contain further
//! `{{ cookiecutter.<key> }}` placeholders. [`build_mapping`] substitutes the
//! replay values into each listed template path and records
//! `resolved project path → template path` for the file and for each of its
//! ancestor directories:
//!
//! ```text
//! {{ cookiecutter.project_slug }}/{{ cookiecutter.module }}/cli.py
//!
//!   ""               -> {{ cookiecutter.project_slug }}
//!   "demo_app"       -> {{ cookiecutter.project_slug }}/{{ cookiecutter.module }}
//!   "demo_app/cli.py"-> {{ cookiecutter.project_slug }}/{{ cookiecutter.module }}/cli.py
//! ```
//!
//! Keys are relative to the project root; values are relative to the template
//! root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use stencil_core::layout::locate_project_root;
use stencil_core::{types::REPLAY_NAMESPACE, ConfigError, ReplayConfiguration};

use crate::error::SyncError;
use crate::vcs::Vcs;

// ---------------------------------------------------------------------------
// PathMapping
// ---------------------------------------------------------------------------

/// Resolved project-relative path → template-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    project_root_dir: PathBuf,
    project_name: String,
    entries: BTreeMap<PathBuf, PathBuf>,
}

impl PathMapping {
    /// Empty mapping for a template whose project subtree is
    /// `project_root_dir` and resolves to `project_name`.
    pub fn new(project_root_dir: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            project_root_dir: project_root_dir.into(),
            project_name: project_name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Concrete name the project subtree resolves to, e.g. `demo`.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct lookup, no ancestor fallback.
    pub fn get(&self, project_rel: &Path) -> Option<&Path> {
        self.entries.get(project_rel).map(PathBuf::as_path)
    }

    /// Record one pairing. Re-inserting an identical pairing is a no-op; a
    /// different template path for the same project path is a
    /// `ConfigError::PathCollision`.
    pub fn insert(
        &mut self,
        project_rel: PathBuf,
        template_rel: PathBuf,
    ) -> Result<(), ConfigError> {
        match self.entries.get(&project_rel) {
            Some(existing) if *existing == template_rel => Ok(()),
            Some(existing) => Err(ConfigError::PathCollision {
                resolved: project_rel,
                first: existing.clone(),
                second: template_rel,
            }),
            None => {
                self.entries.insert(project_rel, template_rel);
                Ok(())
            }
        }
    }

    /// Map one template file (relative to the project subtree) and all of its
    /// ancestors.
    pub fn insert_template_file(
        &mut self,
        subtree_rel: &Path,
        replay: &ReplayConfiguration,
    ) -> Result<(), ConfigError> {
        let mut template_rel = self.project_root_dir.clone();
        let mut project_rel = PathBuf::new();
        self.insert(project_rel.clone(), template_rel.clone())?;

        for component in subtree_rel.components() {
            let raw = component.as_os_str();
            template_rel.push(raw);
            // Placeholders are ASCII, so a non-UTF-8 segment is taken literally.
            match raw.to_str() {
                Some(segment) => {
                    let resolved = substitute(segment, replay, subtree_rel)?;
                    if resolved.is_empty() {
                        tracing::debug!(
                            path = %subtree_rel.display(),
                            "segment resolves to an empty name, not mapped"
                        );
                        return Ok(());
                    }
                    project_rel.push(resolved);
                }
                None => project_rel.push(raw),
            }
            self.insert(project_rel.clone(), template_rel.clone())?;
        }
        Ok(())
    }

    /// Template path for a project-relative path.
    ///
    /// Direct entries win. Otherwise the deepest mapped ancestor directory is
    /// used and the remaining suffix appended to its template path. `None`
    /// when nothing, not even the project root, is mapped.
    pub fn resolve(&self, project_rel: &Path) -> Option<PathBuf> {
        if let Some(template_rel) = self.entries.get(project_rel) {
            return Some(template_rel.clone());
        }
        project_rel.ancestors().skip(1).find_map(|ancestor| {
            let template_dir = self.entries.get(ancestor)?;
            let suffix = project_rel.strip_prefix(ancestor).ok()?;
            Some(template_dir.join(suffix))
        })
    }

    /// Where an unmapped project file lands in the template: the same
    /// relative path under the project subtree.
    pub fn fallback_target(&self, project_rel: &Path) -> PathBuf {
        self.project_root_dir.join(project_rel)
    }
}

// ---------------------------------------------------------------------------
// Mapping construction
// ---------------------------------------------------------------------------

/// Build the full path mapping for `template_root`.
///
/// Template files are enumerated with [`Vcs::list_files`], so anything the
/// template repository ignores is left out of the mapping.
pub fn build_mapping(
    vcs: &dyn Vcs,
    template_root: &Path,
    replay: &ReplayConfiguration,
) -> Result<PathMapping, SyncError> {
    let root_dir = locate_project_root(template_root)?;
    let root_label = root_dir.to_string_lossy().into_owned();
    let project_name = substitute(&root_label, replay, &root_dir)?;
    if project_name.trim().is_empty() {
        return Err(ConfigError::EmptyProjectRoot { name: root_label }.into());
    }

    vcs.init(template_root)?;
    let subtree = template_root.join(&root_dir);
    let files = vcs.list_files(&subtree)?;

    let mut mapping = PathMapping::new(root_dir, project_name);
    for file in &files {
        mapping.insert_template_file(file, replay)?;
    }

    tracing::debug!(
        template = %template_root.display(),
        project = mapping.project_name(),
        files = files.len(),
        entries = mapping.len(),
        "built path mapping"
    );
    Ok(mapping)
}

// ---------------------------------------------------------------------------
// Placeholder substitution
// ---------------------------------------------------------------------------

/// Replace every `{{ cookiecutter.<key> }}` in `segment` with the replay value.
///
/// `context` is the template path being resolved, used in error messages.
pub fn substitute(
    segment: &str,
    replay: &ReplayConfiguration,
    context: &Path,
) -> Result<String, ConfigError> {
    let mut resolved = String::with_capacity(segment.len());
    let mut literal = String::new();
    let mut last = 0;
    let mut last_key = None;

    for caps in placeholder_pattern().captures_iter(segment) {
        let Some(whole) = caps.get(0) else { continue };
        literal.push_str(&segment[last..whole.start()]);
        resolved.push_str(&segment[last..whole.start()]);
        last = whole.end();

        if &caps["namespace"] != REPLAY_NAMESPACE {
            return Err(ConfigError::UnresolvedExpression {
                expression: whole.as_str().to_string(),
                path: context.display().to_string(),
            });
        }
        let key = &caps["key"];
        let value = replay
            .value_str(key)
            .ok_or_else(|| ConfigError::UnresolvedVariable {
                key: key.to_string(),
                path: context.display().to_string(),
            })?;
        if value.contains(['/', '\\']) {
            return Err(invalid_path_value(key, &value, context));
        }
        resolved.push_str(&value);
        last_key = Some(key.to_string());
    }
    literal.push_str(&segment[last..]);
    resolved.push_str(&segment[last..]);

    if let Some(key) = last_key {
        if resolved == "." || resolved == ".." {
            return Err(invalid_path_value(&key, &resolved, context));
        }
    }

    if let Some(start) = literal.find("{{").or_else(|| literal.find("{%")) {
        return Err(ConfigError::UnresolvedExpression {
            expression: literal[start..].to_string(),
            path: context.display().to_string(),
        });
    }
    Ok(resolved)
}

fn invalid_path_value(key: &str, value: &str, context: &Path) -> ConfigError {
    ConfigError::InvalidPathValue {
        key: key.to_string(),
        value: value.to_string(),
        path: context.display().to_string(),
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\{\{\s*(?P<namespace>[A-Za-z_][A-Za-z0-9_]*)\.(?P<key>[A-Za-z_][A-Za-z0-9_]*)\s*\}\}",
        )
        .expect("valid placeholder pattern")
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FsVcs;
    use rstest::rstest;
    use stencil_core::layout::DEFAULT_PROJECT_ROOT;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn replay() -> ReplayConfiguration {
        ReplayConfiguration::from_map([
            ("project_slug", json!("demo")),
            ("python_module_name", json!("demo_app")),
        ])
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn substitute_replaces_known_keys() {
        let out = substitute(
            "{{cookiecutter.python_module_name}}_{{ cookiecutter.project_slug }}.py",
            &replay(),
            Path::new("x"),
        )
        .unwrap();
        assert_eq!(out, "demo_app_demo.py");
    }

    #[test]
    fn substitute_rejects_unknown_key() {
        let err = substitute("{{ cookiecutter.author }}", &replay(), Path::new("a/b")).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedVariable { ref key, .. } if key == "author"));
        assert!(err.to_string().contains("a/b"));
    }

    #[test]
    fn substitute_rejects_foreign_namespace_and_jinja_blocks() {
        let err = substitute("{{ env.HOME }}", &replay(), Path::new("x")).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedExpression { .. }));

        let err = substitute(
            "{% if cookiecutter.docker %}Dockerfile{% endif %}",
            &replay(),
            Path::new("x"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedExpression { .. }));

        let err = substitute("{{ cookiecutter.project_slug|lower }}", &replay(), Path::new("x"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedExpression { .. }));
    }

    #[rstest]
    #[case::nested("src/pkg")]
    #[case::absolute("/etc")]
    #[case::backslash("a\\b")]
    #[case::parent("..")]
    fn path_values_must_stay_one_segment(#[case] value: &str) {
        let mut mapping = PathMapping::new(DEFAULT_PROJECT_ROOT, "demo");
        let replay = ReplayConfiguration::from_map([("python_module_name", json!(value))]);
        let err = mapping
            .insert_template_file(Path::new("{{ cookiecutter.python_module_name }}/cli.py"), &replay)
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidPathValue { ref key, .. } if key == "python_module_name"),
            "got: {err}"
        );
        assert!(err.to_string().contains("python_module_name"));
    }

    #[test]
    fn dotted_literal_segments_are_not_rejected() {
        let out = substitute("{{ cookiecutter.project_slug }}.d", &replay(), Path::new("x")).unwrap();
        assert_eq!(out, "demo.d");
    }

    #[test]
    fn empty_segment_leaves_file_unmapped() {
        let mut mapping = PathMapping::new(DEFAULT_PROJECT_ROOT, "demo");
        let replay = ReplayConfiguration::from_map([("docs_dir", json!(""))]);
        mapping
            .insert_template_file(Path::new("{{ cookiecutter.docs_dir }}/index.md"), &replay)
            .unwrap();
        assert_eq!(mapping.len(), 1);
        assert!(mapping.get(Path::new("index.md")).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn non_utf8_segments_map_literally() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = Path::new(OsStr::from_bytes(b"caf\xe9.txt"));
        let mut mapping = PathMapping::new(DEFAULT_PROJECT_ROOT, "demo");
        mapping
            .insert_template_file(&Path::new("{{ cookiecutter.python_module_name }}").join(name), &replay())
            .unwrap();

        let expected = Path::new(DEFAULT_PROJECT_ROOT)
            .join("{{ cookiecutter.python_module_name }}")
            .join(name);
        assert_eq!(
            mapping.get(&Path::new("demo_app").join(name)),
            Some(expected.as_path())
        );
    }

    #[test]
    fn mapping_includes_files_and_ancestors() {
        let template = TempDir::new().unwrap();
        touch(template.path(), "{{ cookiecutter.project_slug }}/README.md");
        touch(
            template.path(),
            "{{ cookiecutter.project_slug }}/{{ cookiecutter.python_module_name }}/cli/__init__.py",
        );

        let mapping = build_mapping(&FsVcs::default(), template.path(), &replay()).unwrap();
        let slug = Path::new(DEFAULT_PROJECT_ROOT);

        assert_eq!(mapping.project_name(), "demo");
        assert_eq!(mapping.get(Path::new("")), Some(slug));
        assert_eq!(
            mapping.get(Path::new("README.md")),
            Some(slug.join("README.md").as_path())
        );
        assert_eq!(
            mapping.get(Path::new("demo_app")),
            Some(slug.join("{{ cookiecutter.python_module_name }}").as_path())
        );
        assert_eq!(
            mapping.get(Path::new("demo_app/cli/__init__.py")),
            Some(
                slug.join("{{ cookiecutter.python_module_name }}/cli/__init__.py")
                    .as_path()
            )
        );
        // "", README.md, demo_app, demo_app/cli, demo_app/cli/__init__.py
        assert_eq!(mapping.len(), 5);
    }

    #[test]
    fn resolve_prefers_deepest_ancestor() {
        let mut mapping = PathMapping::new(DEFAULT_PROJECT_ROOT, "demo");
        mapping
            .insert_template_file(Path::new("{{ cookiecutter.python_module_name }}/cli/main.py"), &replay())
            .unwrap();

        let resolved = mapping.resolve(Path::new("demo_app/cli/new.py")).unwrap();
        assert_eq!(
            resolved,
            Path::new(DEFAULT_PROJECT_ROOT).join("{{ cookiecutter.python_module_name }}/cli/new.py")
        );

        let resolved = mapping.resolve(Path::new("docs/guide/intro.md")).unwrap();
        assert_eq!(resolved, Path::new(DEFAULT_PROJECT_ROOT).join("docs/guide/intro.md"));
    }

    #[test]
    fn resolve_on_empty_mapping_is_none() {
        let mapping = PathMapping::new(DEFAULT_PROJECT_ROOT, "demo");
        assert!(mapping.resolve(Path::new("a/b.txt")).is_none());
        assert_eq!(
            mapping.fallback_target(Path::new("a/b.txt")),
            Path::new(DEFAULT_PROJECT_ROOT).join("a/b.txt")
        );
    }

    #[test]
    fn colliding_template_paths_are_rejected() {
        let mut mapping = PathMapping::new(DEFAULT_PROJECT_ROOT, "demo");
        mapping
            .insert_template_file(Path::new("{{ cookiecutter.python_module_name }}.txt"), &replay())
            .unwrap();
        let err = mapping
            .insert_template_file(Path::new("demo_app.txt"), &replay())
            .unwrap_err();
        assert!(matches!(err, ConfigError::PathCollision { .. }), "got: {err}");
    }

    #[test]
    fn custom_project_root_placeholder_is_detected() {
        let template = TempDir::new().unwrap();
        touch(template.path(), "{{ cookiecutter.python_module_name }}/setup.py");
        touch(template.path(), "hooks/pre_prompt.py");

        let mapping = build_mapping(&FsVcs::default(), template.path(), &replay()).unwrap();
        assert_eq!(mapping.project_name(), "demo_app");
        assert!(mapping.get(Path::new("setup.py")).is_some());
    }

    #[test]
    fn two_placeholder_roots_are_ambiguous() {
        let template = TempDir::new().unwrap();
        touch(template.path(), "{{ cookiecutter.project_slug }}/a.txt");
        touch(template.path(), "{{ cookiecutter.python_module_name }}/b.txt");

        let err = build_mapping(&FsVcs::default(), template.path(), &replay()).unwrap_err();
        assert!(
            matches!(err, SyncError::Config(ConfigError::AmbiguousProjectRoot { .. })),
            "got: {err}"
        );
    }

    #[test]
    fn missing_project_root_is_configuration_error() {
        let template = TempDir::new().unwrap();
        touch(template.path(), "README.md");
        let err = build_mapping(&FsVcs::default(), template.path(), &replay()).unwrap_err();
        assert!(
            matches!(err, SyncError::Config(ConfigError::ProjectRootMissing { .. })),
            "got: {err}"
        );
    }

    #[test]
    fn unresolvable_project_root_is_configuration_error() {
        let template = TempDir::new().unwrap();
        touch(template.path(), "{{ cookiecutter.project_slug }}/a.txt");

        let empty = ReplayConfiguration::from_map([("project_slug", json!(""))]);
        let err = build_mapping(&FsVcs::default(), template.path(), &empty).unwrap_err();
        assert!(matches!(err, SyncError::Config(ConfigError::EmptyProjectRoot { .. })));

        let missing = ReplayConfiguration::default();
        let err = build_mapping(&FsVcs::default(), template.path(), &missing).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Config(ConfigError::UnresolvedVariable { .. })
        ));
    }

    #[test]
    fn mapping_is_deterministic() {
        let template = TempDir::new().unwrap();
        touch(template.path(), "{{ cookiecutter.project_slug }}/b.txt");
        touch(template.path(), "{{ cookiecutter.project_slug }}/a/c.txt");

        let first = build_mapping(&FsVcs::default(), template.path(), &replay()).unwrap();
        let second = build_mapping(&FsVcs::default(), template.path(), &replay()).unwrap();
        assert_eq!(first, second);
    }
}
