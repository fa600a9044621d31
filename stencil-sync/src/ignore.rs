//! Template ignore list.
//!
//! Ignored paths are appended to `<template root>/.gitignore` so the template
//! repository itself stops listing them. The file is append-only and every
//! append re-reads it to avoid duplicate lines.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Ignore file name at the template root.
pub const IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone)]
pub struct IgnoreList {
    path: PathBuf,
}

impl IgnoreList {
    /// Ignore list stored at `<template_root>/.gitignore`.
    pub fn at(template_root: &Path) -> Self {
        Self {
            path: template_root.join(IGNORE_FILE),
        }
    }

    /// Append `entry` unless an identical line exists. Returns `true` when
    /// the file was written.
    pub fn append(&self, entry: &str) -> Result<bool, SyncError> {
        let current = self.read()?;
        if current.lines().any(|line| line == entry) {
            tracing::debug!(entry, "already ignored");
            return Ok(false);
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_err(&self.path, e))?;
        let mut line = String::with_capacity(entry.len() + 2);
        if !current.is_empty() && !current.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(entry);
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|e| io_err(&self.path, e))?;

        tracing::info!(entry, file = %self.path.display(), "added ignore entry");
        Ok(true)
    }

    fn read(&self) -> Result<String, SyncError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(io_err(&self.path, e)),
        }
    }
}

/// Ignore-file line for a template-relative path, always `/`-separated.
pub fn ignore_entry(template_rel: &Path) -> String {
    template_rel
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
