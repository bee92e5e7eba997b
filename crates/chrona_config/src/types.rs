//! Configuration types deserialized from `chrona.toml`.
//!
//! Every table rejects unknown keys so a misspelled attachment such as
//! `gated_clk_reqq` is reported instead of being silently ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `chrona.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata and naming of the generated module.
    pub project: ProjectMeta,
    /// Global emulation parameters shared by every target.
    #[serde(default)]
    pub emulation: EmulationConfig,
    /// Clock declarations.
    #[serde(default)]
    pub clocks: ClockSection,
    /// Control signals exchanged with the design-under-test.
    #[serde(default)]
    pub control: ControlSection,
    /// Signals exposed for capture.
    #[serde(default)]
    pub probes: ProbeSection,
    /// Named targets. When empty, the implicit `sim` and `fpga` targets exist.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Project metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Name of the generated harness module.
    #[serde(default = "default_top")]
    pub top: String,
    /// Module name of the design-under-test wrapper.
    #[serde(default = "default_dut_module")]
    pub dut_module: String,
    /// Instance name of the design-under-test; every absolute path starts here.
    #[serde(default = "default_dut_instance")]
    pub dut_instance: String,
    /// Header files emitted as `` `include `` lines ahead of the module.
    #[serde(default)]
    pub includes: Vec<String>,
}

fn default_top() -> String {
    "top".to_string()
}

fn default_dut_module() -> String {
    "tb".to_string()
}

fn default_dut_instance() -> String {
    "tb_i".to_string()
}

/// Numeric emulation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmulationConfig {
    /// Fixed time step in seconds, used when no clock domain requests its own step.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Bit width of time-step values.
    #[serde(default = "default_dt_width")]
    pub dt_width: u32,
    /// Power-of-two exponent of one time unit.
    #[serde(default = "default_dt_exponent")]
    pub dt_exponent: i32,
    /// Bit width of the accumulated simulated time.
    #[serde(default = "default_time_width")]
    pub time_width: u32,
    /// Bit width of the decimation threshold control.
    #[serde(default = "default_dec_bits")]
    pub dec_bits: u32,
    /// Depth of the on-chip capture buffer in samples.
    #[serde(default = "default_ila_depth")]
    pub ila_depth: u32,
    /// Simulated stop time in seconds.
    #[serde(default = "default_tstop")]
    pub tstop: f64,
    /// JTAG clock used by the hardware programming collaborator (e.g. `"15MHz"`).
    #[serde(default = "default_jtag_freq")]
    pub jtag_freq: String,
    /// Waveform dump file used in simulation mode.
    #[serde(default = "default_vcd_file")]
    pub vcd_file: String,
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            dt_width: default_dt_width(),
            dt_exponent: default_dt_exponent(),
            time_width: default_time_width(),
            dec_bits: default_dec_bits(),
            ila_depth: default_ila_depth(),
            tstop: default_tstop(),
            jtag_freq: default_jtag_freq(),
            vcd_file: default_vcd_file(),
        }
    }
}

fn default_dt() -> f64 {
    0.1e-6
}

fn default_dt_width() -> u32 {
    27
}

fn default_dt_exponent() -> i32 {
    -46
}

fn default_time_width() -> u32 {
    39
}

fn default_dec_bits() -> u32 {
    24
}

fn default_ila_depth() -> u32 {
    4096
}

fn default_tstop() -> f64 {
    10e-6
}

fn default_jtag_freq() -> String {
    "15MHz".to_string()
}

fn default_vcd_file() -> String {
    "waves.vcd".to_string()
}

/// Per-target overrides of [`EmulationConfig`]. Absent fields inherit the global value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmulationOverrides {
    /// Overrides [`EmulationConfig::dt`].
    pub dt: Option<f64>,
    /// Overrides [`EmulationConfig::dt_width`].
    pub dt_width: Option<u32>,
    /// Overrides [`EmulationConfig::dt_exponent`].
    pub dt_exponent: Option<i32>,
    /// Overrides [`EmulationConfig::time_width`].
    pub time_width: Option<u32>,
    /// Overrides [`EmulationConfig::dec_bits`].
    pub dec_bits: Option<u32>,
    /// Overrides [`EmulationConfig::ila_depth`].
    pub ila_depth: Option<u32>,
    /// Overrides [`EmulationConfig::tstop`].
    pub tstop: Option<f64>,
    /// Overrides [`EmulationConfig::jtag_freq`].
    pub jtag_freq: Option<String>,
    /// Overrides [`EmulationConfig::vcd_file`].
    pub vcd_file: Option<String>,
}

/// A plain signal record: clock input, independent clock, control value or probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalRecord {
    /// Signal name, unique within the generated module.
    pub name: String,
    /// Bit width.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Absolute hierarchical path into the design-under-test.
    #[serde(default)]
    pub path: Option<String>,
    /// Fixed-point exponent, meaningful for analog signals only.
    #[serde(default)]
    pub exponent: Option<i32>,
}

fn default_width() -> u32 {
    1
}

/// A clock domain derived from the master emulation clock.
///
/// Each attachment is an optional absolute path. `gated_clk_req` and
/// `gated_clk` must be given together.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedClockRecord {
    /// Domain name.
    pub name: String,
    /// Path the domain's requested time step is read from.
    #[serde(default)]
    pub dt_req: Option<String>,
    /// Path the arbitrated time step is forwarded to.
    #[serde(default)]
    pub emu_dt: Option<String>,
    /// Path the master emulation clock is forwarded to.
    #[serde(default)]
    pub emu_clk: Option<String>,
    /// Path the emulation reset is forwarded to.
    #[serde(default)]
    pub emu_rst: Option<String>,
    /// Path the gate-enable request is read from.
    #[serde(default)]
    pub gated_clk_req: Option<String>,
    /// Path the gated clock is driven onto.
    #[serde(default)]
    pub gated_clk: Option<String>,
}

/// Clock declarations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockSection {
    /// Externally supplied clocks; the first drives the clock generator.
    /// Defaults to a single `ext_clk` when no target declares any.
    #[serde(default)]
    pub inputs: Vec<SignalRecord>,
    /// Derived clock domains.
    #[serde(default)]
    pub derived: Vec<DerivedClockRecord>,
    /// Free-running clocks produced by the clock generator for the design-under-test.
    #[serde(default)]
    pub independent: Vec<SignalRecord>,
}

/// Control signals, grouped by value domain and direction.
///
/// Inputs flow from the control fabric into the design-under-test; outputs
/// flow from the design-under-test back to the control fabric.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlSection {
    /// Digital values driven into the design.
    #[serde(default)]
    pub digital_inputs: Vec<SignalRecord>,
    /// Digital values read from the design.
    #[serde(default)]
    pub digital_outputs: Vec<SignalRecord>,
    /// Fixed-point values driven into the design.
    #[serde(default)]
    pub analog_inputs: Vec<SignalRecord>,
    /// Fixed-point values read from the design.
    #[serde(default)]
    pub analog_outputs: Vec<SignalRecord>,
}

/// Probe signals exposed to the capture fabric.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    /// Digital probes.
    #[serde(default)]
    pub digital: Vec<SignalRecord>,
    /// Fixed-point probes.
    #[serde(default)]
    pub analog: Vec<SignalRecord>,
}

/// Whether a target runs in a logic simulator or on an FPGA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Logic simulation on a host CPU.
    Sim,
    /// Hardware emulation on an FPGA.
    Fpga,
}

/// Configuration of one named target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Target kind; inferred from the name when absent (`sim` is a simulation
    /// target, anything else an FPGA target).
    #[serde(default)]
    pub kind: Option<TargetKind>,
    /// Short FPGA part name used to select the hardware device.
    #[serde(default)]
    pub device: Option<String>,
    /// Instance name of the capture core.
    #[serde(default)]
    pub ila_name: Option<String>,
    /// Instance name of the control core.
    #[serde(default)]
    pub vio_name: Option<String>,
    /// Overrides of the global emulation parameters.
    #[serde(default)]
    pub emulation: EmulationOverrides,
    /// Target-local clocks, appended after the global ones.
    #[serde(default)]
    pub clocks: ClockSection,
    /// Target-local control signals, appended after the global ones.
    #[serde(default)]
    pub control: ControlSection,
    /// Target-local probes, appended after the global ones.
    #[serde(default)]
    pub probes: ProbeSection,
}
