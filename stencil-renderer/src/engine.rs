//! Tera instantiation engine.
//!
//! # Layout
//!
//! | template                                    | output                     |
//! |---------------------------------------------|----------------------------|
//! | `<template>/{{ cookiecutter.project_slug }}` | `<output>/<project_slug>`  |
//! | `…/{{ cookiecutter.module }}/cli.py`         | `…/<module>/cli.py`        |
//! | `<template>/hooks`, `<template>/README.md`   | not rendered               |
//!
//! Every path segment and every UTF-8 file body under the project subtree is
//! rendered with tera; non-UTF-8 files are copied byte for byte. A segment
//! that renders to an empty name drops the entry (and everything below it).

use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use stencil_core::layout::locate_project_root;
use stencil_core::{ConfigError, ReplayConfiguration};

use crate::context::TemplateContext;
use crate::error::{io_err, RenderError};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

/// What one `apply` produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Root of the generated project.
    pub project_dir: PathBuf,
    /// Every file written, in walk order.
    pub files: Vec<PathBuf>,
    /// Files whose body went through tera.
    pub rendered: usize,
    /// Files copied without rendering.
    pub verbatim: usize,
    /// Template paths dropped because their name rendered empty.
    pub dropped: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Instantiator
// ---------------------------------------------------------------------------

/// Renders a template's project subtree into an output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Instantiator;

impl Instantiator {
    pub fn new() -> Self {
        Instantiator
    }

    /// Instantiate `template_dir` with `replay` into `output_dir`.
    ///
    /// The project lands in `output_dir/<rendered project root name>`;
    /// existing files there are overwritten.
    pub fn apply(
        &self,
        template_dir: &Path,
        replay: &ReplayConfiguration,
        output_dir: &Path,
    ) -> Result<ApplyReport, RenderError> {
        let root_dir = locate_project_root(template_dir)?;
        let ctx = TemplateContext::from_replay(replay).to_tera_context()?;

        let root_label = root_dir.to_string_lossy().into_owned();
        let source_root = template_dir.join(&root_dir);
        let name = render_segment(&root_label, &source_root, &ctx)?
            .ok_or(ConfigError::EmptyProjectRoot { name: root_label })?;

        let project_dir = output_dir.join(name);
        std::fs::create_dir_all(&project_dir).map_err(|e| io_err(&project_dir, e))?;

        let mut report = ApplyReport {
            project_dir: project_dir.clone(),
            ..ApplyReport::default()
        };
        render_tree(&source_root, &project_dir, &ctx, &mut report)?;

        tracing::info!(
            template = %template_dir.display(),
            project = %project_dir.display(),
            files = report.files.len(),
            rendered = report.rendered,
            "applied template"
        );
        Ok(report)
    }
}

fn render_tree(
    source: &Path,
    dest: &Path,
    ctx: &Context,
    report: &mut ApplyReport,
) -> Result<(), RenderError> {
    let mut entries = std::fs::read_dir(source)
        .map_err(|e| io_err(source, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(source, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().map_err(|e| io_err(&path, e))?.is_dir();
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_dir && SKIPPED_DIRS.contains(&name.as_str()) {
            continue;
        }

        let Some(rendered) = render_segment(&name, &path, ctx)? else {
            tracing::debug!(path = %path.display(), "name rendered empty, dropping");
            report.dropped.push(path);
            continue;
        };
        let target = dest.join(rendered);

        if is_dir {
            std::fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
            render_tree(&path, &target, ctx, report)?;
        } else {
            render_file(&path, &target, ctx, report)?;
        }
    }
    Ok(())
}

fn render_file(
    source: &Path,
    target: &Path,
    ctx: &Context,
    report: &mut ApplyReport,
) -> Result<(), RenderError> {
    let bytes = std::fs::read(source).map_err(|e| io_err(source, e))?;
    let body = match String::from_utf8(bytes) {
        Ok(text) if has_markup(&text) => {
            report.rendered += 1;
            Tera::one_off(&text, ctx, false)
                .map_err(|source_err| RenderError::Tera {
                    path: source.to_path_buf(),
                    source: source_err,
                })?
                .into_bytes()
        }
        Ok(text) => {
            report.verbatim += 1;
            text.into_bytes()
        }
        Err(not_utf8) => {
            report.verbatim += 1;
            not_utf8.into_bytes()
        }
    };

    std::fs::write(target, body).map_err(|e| io_err(target, e))?;
    let permissions = std::fs::metadata(source)
        .map_err(|e| io_err(source, e))?
        .permissions();
    std::fs::set_permissions(target, permissions).map_err(|e| io_err(target, e))?;

    tracing::debug!(from = %source.display(), to = %target.display(), "wrote file");
    report.files.push(target.to_path_buf());
    Ok(())
}

/// Render one path segment. `None` when it renders to an empty name.
fn render_segment(segment: &str, path: &Path, ctx: &Context) -> Result<Option<String>, RenderError> {
    if !has_markup(segment) {
        return Ok(Some(segment.to_string()));
    }
    let rendered = Tera::one_off(segment, ctx, false).map_err(|source| RenderError::Tera {
        path: path.to_path_buf(),
        source,
    })?;
    let rendered = rendered.trim();
    if rendered.is_empty() {
        return Ok(None);
    }
    if rendered.contains(['/', '\\']) || rendered == "." || rendered == ".." {
        return Err(RenderError::InvalidSegment {
            path: path.to_path_buf(),
            segment: segment.to_string(),
            rendered: rendered.to_string(),
        });
    }
    Ok(Some(rendered.to_string()))
}

fn has_markup(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
