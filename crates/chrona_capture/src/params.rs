//! The capture parameter record handed to the hardware-programming step.

use crate::error::CaptureError;
use crate::window::{capture_window, check_dec_bits, encode_trigger};
use chrona_config::ResolvedTarget;
use chrona_structure::{Signal, StructureConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A requested observation interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaptureRequest {
    /// Start of the interval in seconds; also the trigger time.
    pub start_time: f64,
    /// End of the interval in seconds. Defaults to the target's stop time.
    pub stop_time: Option<f64>,
}

/// One probe as seen by the capture core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeEntry {
    /// Probe name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Fixed-point exponent of analog and time probes.
    pub exponent: Option<i32>,
    /// Whether the value is signed.
    pub signed: bool,
}

impl From<&Signal> for ProbeEntry {
    fn from(signal: &Signal) -> Self {
        Self {
            name: signal.name().to_string(),
            width: signal.width(),
            exponent: signal.exponent(),
            signed: signal.is_signed(),
        }
    }
}

/// Everything needed to configure one capture run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureParams {
    /// Target the parameters were computed for.
    pub target: String,
    /// Decimation ratio written to the threshold control, `>= 2`.
    pub decimation_ratio: u64,
    /// Samples per buffer half.
    pub window_count: u32,
    /// Encoded start time, `<width>'u<bits>`.
    pub start_time_encoded: String,
    /// Trigger comparison applied to the time probe.
    pub trigger_compare_value: String,
    /// Whether the ratio was raised to the hardware minimum.
    pub clamped: bool,
    /// FPGA part, if configured.
    pub device: Option<String>,
    /// Capture core instance.
    pub ila_name: String,
    /// Control core instance.
    pub vio_name: String,
    /// Name of the time probe the trigger compares against.
    pub time_probe: String,
    /// Name of the decimation threshold control.
    pub dec_thr: String,
    /// JTAG clock in hertz.
    pub jtag_freq_hz: f64,
    /// Captured probes in capture order.
    pub probes: Vec<ProbeEntry>,
}

impl CaptureParams {
    /// Computes the parameters for capturing `request` on `target`.
    pub fn for_target(
        target: &ResolvedTarget,
        structure: &StructureConfig,
        request: &CaptureRequest,
    ) -> Result<Self, CaptureError> {
        let emu = &target.emulation;
        let stop_time = request.stop_time.unwrap_or(emu.tstop);
        let window = capture_window(request.start_time, stop_time, emu.dt, emu.ila_depth)?;
        check_dec_bits(&window, emu.dec_bits)?;
        let trigger = encode_trigger(request.start_time, &emu.time_format)?;

        info!(
            target_name = %target.name,
            window_count = window.window_count,
            decimation_ratio = window.decimation_ratio,
            jtag_freq = %emu.jtag_freq,
            %trigger,
            "capture sized"
        );

        Ok(Self {
            target: target.name.clone(),
            decimation_ratio: window.decimation_ratio,
            window_count: window.window_count,
            start_time_encoded: trigger.to_string(),
            trigger_compare_value: format!("gt{trigger}"),
            clamped: window.clamped,
            device: target.device.clone(),
            ila_name: target.ila_name.clone(),
            vio_name: target.vio_name.clone(),
            time_probe: structure.time_probe().name().to_string(),
            dec_thr: structure.dec_thr_ctrl().name().to_string(),
            jtag_freq_hz: emu.jtag_freq.hz(),
            probes: structure.probes().map(ProbeEntry::from).collect(),
        })
    }
}
