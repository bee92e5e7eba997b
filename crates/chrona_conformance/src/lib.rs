//! Conformance test helpers for the Chrona harness generator.
//!
//! Provides a shared flow that takes project TOML text through every stage
//! (load → resolve → structure → render → capture sizing) and returns the
//! intermediate results for assertion in integration tests.

#![warn(missing_docs)]

use chrona_capture::{CaptureError, CaptureParams, CaptureRequest};
use chrona_codegen::{generate_target, CodegenError, GeneratedTarget};
use chrona_config::{load_config_from_str, resolve_target, ConfigError, ProjectConfig, ResolvedTarget};
use chrona_structure::{StructureConfig, StructureError, TimeArbitration};
use thiserror::Error;

/// A failure at any stage of the flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Loading or resolving the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The structure of the target is invalid.
    #[error(transparent)]
    Structure(#[from] StructureError),
    /// Rendering failed.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    /// Capture sizing failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Everything produced for one target.
pub struct FlowResult {
    /// The resolved target.
    pub target: ResolvedTarget,
    /// Its validated structure.
    pub structure: StructureConfig,
    /// Rendered artifacts.
    pub generated: GeneratedTarget,
    /// Capture parameters for the requested interval.
    pub capture: CaptureParams,
}

impl FlowResult {
    /// The arbitration model of the target.
    pub fn arbitration(&self) -> TimeArbitration<'_> {
        TimeArbitration::from_structure(&self.structure)
    }

    /// Rendered module text.
    pub fn top_sv(&self) -> &str {
        &self.generated.top_sv
    }
}

/// Prepends a minimal `[project]` table to `body`.
pub fn project_toml(body: &str) -> String {
    format!("[project]\nname = \"conformance_test\"\n\n{body}")
}

/// Loads a project whose `[project]` table is supplied by [`project_toml`].
pub fn load_project(body: &str) -> Result<ProjectConfig, ConfigError> {
    load_config_from_str(&project_toml(body))
}

/// Runs the whole flow for `target_name` of an already loaded project.
pub fn run_target(
    config: &ProjectConfig,
    target_name: &str,
    request: &CaptureRequest,
) -> Result<FlowResult, FlowError> {
    let target = resolve_target(config, target_name)?;
    let structure = StructureConfig::from_target(&target)?;
    let generated = generate_target(&target)?;
    let capture = CaptureParams::for_target(&target, &structure, request)?;
    Ok(FlowResult {
        target,
        structure,
        generated,
        capture,
    })
}

/// Loads `body` and runs the flow for `target_name` over the default
/// capture interval.
pub fn run_flow(body: &str, target_name: &str) -> Result<FlowResult, FlowError> {
    let config = load_project(body)?;
    run_target(&config, target_name, &CaptureRequest::default())
}

/// Returns the byte offset of each needle in `haystack`, or `None` for the
/// first needle that is missing or appears before its predecessor.
pub fn ordered_offsets(haystack: &str, needles: &[&str]) -> Option<Vec<usize>> {
    let mut offsets = Vec::with_capacity(needles.len());
    let mut from = 0;
    for needle in needles {
        let at = from + haystack[from..].find(needle)?;
        offsets.push(at);
        from = at + needle.len();
    }
    Some(offsets)
}
