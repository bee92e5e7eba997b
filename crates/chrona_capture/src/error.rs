//! Errors raised while sizing a capture run.

use chrona_common::FixedPointError;

/// Errors that can occur while computing capture parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    /// The stop time does not lie after the start time.
    #[error("capture interval is empty: stop time {stop} is not after start time {start}")]
    EmptyInterval {
        /// Requested start time in seconds.
        start: f64,
        /// Requested stop time in seconds.
        stop: f64,
    },

    /// The time step is zero, negative or not finite.
    #[error("time step {0} is not a positive finite value")]
    InvalidTimeStep(f64),

    /// The buffer is too shallow to split into two windows of at least two samples.
    #[error("capture depth {depth} is below the minimum of {min}")]
    InvalidDepth {
        /// Configured depth.
        depth: u32,
        /// Smallest accepted depth.
        min: u32,
    },

    /// The samples-per-window quotient is not finite or is negative.
    #[error("decimation quotient {0} is not a finite non-negative value")]
    InvalidQuotient(f64),

    /// The decimation ratio does not fit the decimation threshold control.
    #[error("decimation ratio {ratio} does not fit in {dec_bits} bits")]
    RatioOutOfRange {
        /// The computed ratio.
        ratio: u64,
        /// Width of the threshold control.
        dec_bits: u32,
    },

    /// The trigger time does not fit the time encoding.
    #[error("cannot encode trigger time: {0}")]
    Trigger(#[from] FixedPointError),
}
