//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::{resolve_all, validate_emulation};
use crate::types::ProjectConfig;
use std::path::Path;

/// File name of the project configuration inside a project directory.
pub const CONFIG_FILE_NAME: &str = "chrona.toml";

/// Loads and validates `chrona.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Validation resolves every target once, so a bad override in any target is
/// reported here rather than when that target is first generated.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    let project = &config.project;
    for (field, value) in [
        ("project.name", &project.name),
        ("project.top", &project.top),
        ("project.dut_module", &project.dut_module),
        ("project.dut_instance", &project.dut_instance),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    validate_emulation("emulation", &config.emulation)?;
    resolve_all(config)?;
    Ok(())
}
