//! Capture window calculator.
//!
//! The capture buffer of `ila_depth` samples is split into two halves, so one
//! window holds `ila_depth / 2` samples. The decimation ratio spreads the
//! requested interval over one window:
//!
//! ```text
//! ratio = round(((stop - start) / dt) / window_count) - 1,   ratio >= 2
//! ```
//!
//! The hardware decimation counter is off by one relative to the logical
//! ratio, hence the `- 1`; the capture primitive rejects ratios below two.

use crate::error::CaptureError;
use chrona_common::{FixedLiteral, TimeFormat};
use tracing::warn;

/// Smallest decimation ratio the capture hardware accepts.
pub const MIN_DECIMATION_RATIO: u64 = 2;

/// Smallest supported buffer depth.
pub const MIN_ILA_DEPTH: u32 = 4;

/// Result of sizing one capture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    /// Samples per buffer half.
    pub window_count: u32,
    /// Decimation ratio after clamping, always `>= 2`.
    pub decimation_ratio: u64,
    /// Ratio as computed, before clamping.
    pub raw_ratio: i64,
    /// `true` if the raw ratio was raised to the minimum.
    pub clamped: bool,
}

/// Computes the window count and decimation ratio for capturing
/// `[start_time, stop_time]` at time step `dt` into `ila_depth` samples.
///
/// Rounding is half to even.
pub fn capture_window(
    start_time: f64,
    stop_time: f64,
    dt: f64,
    ila_depth: u32,
) -> Result<CaptureWindow, CaptureError> {
    if !start_time.is_finite() || !stop_time.is_finite() || stop_time <= start_time {
        return Err(CaptureError::EmptyInterval {
            start: start_time,
            stop: stop_time,
        });
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(CaptureError::InvalidTimeStep(dt));
    }
    if ila_depth < MIN_ILA_DEPTH {
        return Err(CaptureError::InvalidDepth {
            depth: ila_depth,
            min: MIN_ILA_DEPTH,
        });
    }

    let window_count = ila_depth / 2;
    let quotient = ((stop_time - start_time) / dt) / f64::from(window_count);
    // i64::MAX as f64 is exactly 2^63
    if !quotient.is_finite() || quotient < 0.0 || quotient >= i64::MAX as f64 {
        return Err(CaptureError::InvalidQuotient(quotient));
    }

    let raw_ratio = quotient.round_ties_even() as i64 - 1;
    let clamped = raw_ratio < MIN_DECIMATION_RATIO as i64;
    let decimation_ratio = if clamped {
        MIN_DECIMATION_RATIO
    } else {
        raw_ratio as u64
    };
    if clamped {
        warn!(
            raw_ratio,
            decimation_ratio, window_count, "decimation ratio clamped to hardware minimum"
        );
    }

    Ok(CaptureWindow {
        window_count,
        decimation_ratio,
        raw_ratio,
        clamped,
    })
}

/// Checks that the ratio fits the `dec_bits`-wide threshold control.
pub fn check_dec_bits(window: &CaptureWindow, dec_bits: u32) -> Result<(), CaptureError> {
    let fits = dec_bits >= 64 || window.decimation_ratio < (1u64 << dec_bits);
    if fits {
        Ok(())
    } else {
        Err(CaptureError::RatioOutOfRange {
            ratio: window.decimation_ratio,
            dec_bits,
        })
    }
}

/// Encodes the trigger time compared against the time probe.
pub fn encode_trigger(start_time: f64, format: &TimeFormat) -> Result<FixedLiteral, CaptureError> {
    Ok(format.literal(start_time)?)
}
