//! Sizing of hardware capture runs.
//!
//! The on-chip capture buffer holds a fixed number of samples. Given an
//! observation interval and the global time step, [`capture_window`] picks the
//! decimation ratio that spreads the interval over one half of the buffer.
//! [`CaptureParams`] packages the result with the encoded trigger time and
//! the identifiers the hardware-programming step needs.

#![warn(missing_docs)]

pub mod error;
pub mod params;
pub mod window;

pub use error::CaptureError;
pub use params::{CaptureParams, CaptureRequest, ProbeEntry};
pub use window::{
    capture_window, check_dec_bits, encode_trigger, CaptureWindow, MIN_DECIMATION_RATIO,
    MIN_ILA_DEPTH,
};
