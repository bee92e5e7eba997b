//! Parsing and validation of `chrona.toml` project configuration files.
//!
//! The configuration is a declarative schema: every signal, clock and target is
//! a typed record deserialized by `serde`, never an expression to evaluate.
//! [`resolve_target`] merges the global settings with one target's overrides.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_all, resolve_target, EmulationSettings, ResolvedTarget};
pub use types::*;
