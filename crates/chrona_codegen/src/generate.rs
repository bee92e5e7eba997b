//! Per-target artifact generation.

use crate::defines::{harness_defines, render_defines};
use crate::error::CodegenError;
use crate::top::ModuleAssembler;
use chrona_common::ArtifactHash;
use chrona_config::{resolve_all, ProjectConfig, ResolvedTarget, TargetKind};
use chrona_structure::StructureConfig;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// The artifacts of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTarget {
    /// Target name.
    pub name: String,
    /// Simulation or FPGA.
    pub kind: TargetKind,
    /// Text of the generated top module.
    pub top_sv: String,
    /// Text of the defines header.
    pub defines_svh: String,
    /// Fingerprint over both texts.
    pub fingerprint: ArtifactHash,
}

/// Builds the structure of `target` and renders its artifacts.
pub fn generate_target(target: &ResolvedTarget) -> Result<GeneratedTarget, CodegenError> {
    info!(target_name = %target.name, "generating target");
    let structure =
        StructureConfig::from_target(target).map_err(|source| CodegenError::Structure {
            target: target.name.clone(),
            source,
        })?;
    let top_sv = ModuleAssembler::new(target, &structure).render()?;
    let defines_svh = render_defines(&harness_defines(target));
    let fingerprint = ArtifactHash::from_parts([top_sv.as_str(), defines_svh.as_str()]);
    info!(
        target_name = %target.name,
        %fingerprint,
        bytes = top_sv.len(),
        "target generated"
    );
    Ok(GeneratedTarget {
        name: target.name.clone(),
        kind: target.kind,
        top_sv,
        defines_svh,
        fingerprint,
    })
}

/// Generates every target of `config` in parallel.
///
/// Targets share nothing, so each is generated independently. Results are
/// merged in name order and the first failing target, by name, is reported.
pub fn generate_all(
    config: &ProjectConfig,
) -> Result<BTreeMap<String, GeneratedTarget>, CodegenError> {
    let targets = resolve_all(config)?;
    let results: Vec<Result<GeneratedTarget, CodegenError>> = targets
        .par_iter()
        .map(|(_, target)| generate_target(target))
        .collect();

    let mut out = BTreeMap::new();
    for result in results {
        let generated = result?;
        out.insert(generated.name.clone(), generated);
    }
    Ok(out)
}
