//! # stencil-renderer
//!
//! Tera-based instantiation of a template into a project tree.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stencil_core::replay;
//! use stencil_renderer::Instantiator;
//!
//! fn regenerate(project: &Path, template: &Path) {
//!     let Ok(replay) = replay::load(&project.join(".cookiecutter.json")) else { return };
//!     let Some(parent) = project.parent() else { return };
//!     if let Ok(report) = Instantiator::new().apply(template, &replay, parent) {
//!         println!("{} files written to {}", report.files.len(), report.project_dir.display());
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{ApplyReport, Instantiator};
pub use error::RenderError;
