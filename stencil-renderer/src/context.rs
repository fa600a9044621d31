//! Rendering context built from a replay configuration.

use serde::{Deserialize, Serialize};

use stencil_core::ReplayConfiguration;

use crate::error::RenderError;

/// Payload every path segment and file body is rendered with.
///
/// Serialises as `{ "cookiecutter": { <key>: <value>, … } }`, so templates
/// address values as `{{ cookiecutter.<key> }}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub cookiecutter: ReplayConfiguration,
}

impl TemplateContext {
    pub fn from_replay(replay: &ReplayConfiguration) -> Self {
        Self {
            cookiecutter: replay.clone(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::Context)
    }
}
