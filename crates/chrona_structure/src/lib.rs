//! Typed signal model and per-target structure configuration.
//!
//! A [`StructureConfig`] is built once per target from its resolved project
//! configuration. Building validates names, widths, attachment pairing and
//! every absolute-path binding, so later stages can render without failing on
//! structural problems. [`TimeArbitration`] is derived from it on demand and
//! sizes the time-step request vector and the clock gating network.

#![warn(missing_docs)]

pub mod arbitration;
pub mod binding;
pub mod error;
pub mod path;
pub mod signal;
pub mod structure;

pub use arbitration::{DtRequest, GateRequest, ReductionRule, TimeArbitration};
pub use binding::{collect_bindings, validate_bindings, Access, Binding, Site};
pub use error::{BindingError, StructureError};
pub use path::{HierPath, PathError};
pub use signal::{
    ClockGating, DerivedClock, Direction, ProbeKind, Role, Signal, SignalKind, ValueKind,
};
pub use structure::{
    StructureBuilder, StructureConfig, DEC_THR_NAME, RESERVED_NAMES, RESET_NAME, TIME_PROBE_NAME,
};
