//! Stencil core library: replay configuration, domain types, errors.
//!
//! Public API surface:
//! - [`types`]: [`ReplayConfiguration`] and [`TemplateFileAction`]
//! - [`error`]: [`ConfigError`]
//! - [`replay`]: replay record loading
//! - [`locator`]: template locator helpers (path expansion, repository URLs)
//! - [`layout`]: project-root subtree lookup inside a template

pub mod error;
pub mod layout;
pub mod locator;
pub mod replay;
pub mod types;

pub use error::ConfigError;
pub use locator::TemplateLocator;
pub use types::{ReplayConfiguration, TemplateFileAction};
