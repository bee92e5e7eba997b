//! Shared foundational types used across the Chrona emulation harness generator.
//!
//! This crate provides the fixed-point time encoding shared by the time
//! arbitration model and the capture calculator, frequency values parsed from
//! project configuration, and content fingerprints for generated artifacts.

#![warn(missing_docs)]

pub mod fixed_point;
pub mod frequency;
pub mod hash;

pub use fixed_point::{FixedLiteral, FixedPointError, TimeFormat};
pub use frequency::{Frequency, ParseFrequencyError};
pub use hash::ArtifactHash;
