//! Target resolution: merging global and target-specific configurations.

use crate::error::ConfigError;
use crate::types::{
    ClockSection, ControlSection, EmulationConfig, ProbeSection, ProjectConfig, SignalRecord,
    TargetConfig, TargetKind,
};
use chrona_common::{Frequency, TimeFormat};
use std::collections::BTreeMap;

const IMPLICIT_TARGETS: [&str; 2] = ["fpga", "sim"];

/// Validated numeric emulation parameters of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct EmulationSettings {
    /// Fixed time step in seconds.
    pub dt: f64,
    /// Encoding of time-step values (`DT_WIDTH`, `DT_EXPONENT`).
    pub dt_format: TimeFormat,
    /// Encoding of accumulated time (`TIME_WIDTH`, `DT_EXPONENT`).
    pub time_format: TimeFormat,
    /// Bit width of the decimation threshold.
    pub dec_bits: u32,
    /// Capture buffer depth in samples.
    pub ila_depth: u32,
    /// Simulated stop time in seconds.
    pub tstop: f64,
    /// JTAG clock frequency.
    pub jtag_freq: Frequency,
    /// Waveform dump file for simulation targets.
    pub vcd_file: String,
}

/// A fully resolved target: global settings with the target's overrides
/// applied and its local signals appended after the global ones.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// The target name.
    pub name: String,
    /// Simulation or FPGA.
    pub kind: TargetKind,
    /// Generated module name.
    pub top: String,
    /// Module name of the design-under-test.
    pub dut_module: String,
    /// Instance name of the design-under-test.
    pub dut_instance: String,
    /// Header files to include.
    pub includes: Vec<String>,
    /// Numeric emulation parameters.
    pub emulation: EmulationSettings,
    /// Merged clock declarations.
    pub clocks: ClockSection,
    /// Merged control signals.
    pub control: ControlSection,
    /// Merged probes.
    pub probes: ProbeSection,
    /// FPGA part name, if any.
    pub device: Option<String>,
    /// Capture core instance name.
    pub ila_name: String,
    /// Control core instance name.
    pub vio_name: String,
}

/// Resolves a named target by merging global settings with target-specific overrides.
///
/// The names `sim` and `fpga` resolve even when not declared, as long as the
/// configuration declares no targets at all.
pub fn resolve_target(
    config: &ProjectConfig,
    target_name: &str,
) -> Result<ResolvedTarget, ConfigError> {
    let implicit;
    let target = match config.targets.get(target_name) {
        Some(target) => target,
        None if config.targets.is_empty() && IMPLICIT_TARGETS.contains(&target_name) => {
            implicit = TargetConfig::default();
            &implicit
        }
        None => return Err(ConfigError::UnknownTarget(target_name.to_string())),
    };

    let kind = target.kind.unwrap_or(if target_name == "sim" {
        TargetKind::Sim
    } else {
        TargetKind::Fpga
    });

    let emulation = merge_emulation(&config.emulation, target);
    let emulation = validate_emulation(&format!("targets.{target_name}"), &emulation)?;

    let mut clocks = config.clocks.clone();
    append(&mut clocks.inputs, &target.clocks.inputs);
    append(&mut clocks.derived, &target.clocks.derived);
    append(&mut clocks.independent, &target.clocks.independent);
    if clocks.inputs.is_empty() {
        clocks.inputs.push(SignalRecord {
            name: "ext_clk".to_string(),
            width: 1,
            path: None,
            exponent: None,
        });
    }

    let mut control = config.control.clone();
    append(&mut control.digital_inputs, &target.control.digital_inputs);
    append(&mut control.digital_outputs, &target.control.digital_outputs);
    append(&mut control.analog_inputs, &target.control.analog_inputs);
    append(&mut control.analog_outputs, &target.control.analog_outputs);

    let mut probes = config.probes.clone();
    append(&mut probes.digital, &target.probes.digital);
    append(&mut probes.analog, &target.probes.analog);

    Ok(ResolvedTarget {
        name: target_name.to_string(),
        kind,
        top: config.project.top.clone(),
        dut_module: config.project.dut_module.clone(),
        dut_instance: config.project.dut_instance.clone(),
        includes: config.project.includes.clone(),
        emulation,
        clocks,
        control,
        probes,
        device: target.device.clone(),
        ila_name: target.ila_name.clone().unwrap_or_else(|| "ila_0".to_string()),
        vio_name: target.vio_name.clone().unwrap_or_else(|| "vio_0".to_string()),
    })
}

/// Resolves every target of the project, keyed and ordered by name.
pub fn resolve_all(
    config: &ProjectConfig,
) -> Result<BTreeMap<String, ResolvedTarget>, ConfigError> {
    let names: Vec<&str> = if config.targets.is_empty() {
        IMPLICIT_TARGETS.to_vec()
    } else {
        config.targets.keys().map(String::as_str).collect()
    };
    names
        .into_iter()
        .map(|name| Ok((name.to_string(), resolve_target(config, name)?)))
        .collect()
}

fn append<T: Clone>(base: &mut Vec<T>, overlay: &[T]) {
    base.extend(overlay.iter().cloned());
}

fn merge_emulation(global: &EmulationConfig, target: &TargetConfig) -> EmulationConfig {
    let o = &target.emulation;
    EmulationConfig {
        dt: o.dt.unwrap_or(global.dt),
        dt_width: o.dt_width.unwrap_or(global.dt_width),
        dt_exponent: o.dt_exponent.unwrap_or(global.dt_exponent),
        time_width: o.time_width.unwrap_or(global.time_width),
        dec_bits: o.dec_bits.unwrap_or(global.dec_bits),
        ila_depth: o.ila_depth.unwrap_or(global.ila_depth),
        tstop: o.tstop.unwrap_or(global.tstop),
        jtag_freq: o.jtag_freq.clone().unwrap_or_else(|| global.jtag_freq.clone()),
        vcd_file: o.vcd_file.clone().unwrap_or_else(|| global.vcd_file.clone()),
    }
}

pub(crate) fn validate_emulation(
    prefix: &str,
    emu: &EmulationConfig,
) -> Result<EmulationSettings, ConfigError> {
    let field = |name: &str| format!("{prefix}.{name}");

    for (name, value) in [("dt", emu.dt), ("tstop", emu.tstop)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::invalid(
                field(name),
                format!("{value} is not a positive finite time"),
            ));
        }
    }
    for (name, value) in [
        ("dt_width", emu.dt_width),
        ("time_width", emu.time_width),
        ("dec_bits", emu.dec_bits),
    ] {
        if !(1..=64).contains(&value) {
            return Err(ConfigError::invalid(
                field(name),
                format!("{value} is outside 1..=64"),
            ));
        }
    }
    if emu.time_width < emu.dt_width {
        return Err(ConfigError::invalid(
            field("time_width"),
            format!(
                "{} is narrower than dt_width {}",
                emu.time_width, emu.dt_width
            ),
        ));
    }

    let dt_format = TimeFormat::new(emu.dt_width, emu.dt_exponent)
        .map_err(|e| ConfigError::invalid(field("dt_exponent"), e.to_string()))?;
    let time_format = TimeFormat::new(emu.time_width, emu.dt_exponent)
        .map_err(|e| ConfigError::invalid(field("dt_exponent"), e.to_string()))?;
    let jtag_freq: Frequency = emu
        .jtag_freq
        .parse()
        .map_err(|e: chrona_common::ParseFrequencyError| {
            ConfigError::invalid(field("jtag_freq"), e.to_string())
        })?;

    Ok(EmulationSettings {
        dt: emu.dt,
        dt_format,
        time_format,
        dec_bits: emu.dec_bits,
        ila_depth: emu.ila_depth,
        tstop: emu.tstop,
        jtag_freq,
        vcd_file: emu.vcd_file.clone(),
    })
}
