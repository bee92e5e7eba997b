//! Errors raised while generating harness artifacts.

use chrona_common::FixedPointError;
use chrona_config::ConfigError;
use chrona_structure::StructureError;

/// Errors that can occur while generating a target's harness.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The project configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The target's structure is invalid.
    #[error("target '{target}': {source}")]
    Structure {
        /// Target name.
        target: String,
        /// The structural problem.
        source: StructureError,
    },

    /// A fixed-point parameter does not fit its encoding.
    #[error("cannot encode {name}: {source}")]
    Encoding {
        /// Name of the parameter being encoded.
        name: &'static str,
        /// The range failure.
        source: FixedPointError,
    },
}
