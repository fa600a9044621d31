//! # stencil-sync
//!
//! Reintegration of a generated project back into its template.
//!
//! Call [`Reconciler::integrate`] with an [`IntegrateRequest`]; version
//! control, prompting and progress output are injected as [`Vcs`],
//! [`Chooser`] and [`Reporter`].

pub mod detector;
pub mod error;
pub mod ignore;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod templater;
pub mod vcs;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use error::{SyncError, VcsError};
pub use reconciler::{IntegrateRequest, Reconciler};
pub use report::{FileOutcome, FileReport, IntegrateReport, NullReporter, ProgressEvent, Reporter};
pub use resolver::{ActionPrompt, Chooser, PromptChooser, TemplateState};
pub use templater::PathMapping;
pub use vcs::{GitCli, Vcs};
