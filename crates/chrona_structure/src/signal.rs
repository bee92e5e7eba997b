//! Typed descriptors for every wire the generator reasons about.
//!
//! A [`Signal`] is a read-only value: name, bit width, optional absolute path
//! binding, and a [`SignalKind`] tag. Code that treats signal kinds
//! differently matches on the tag exhaustively.

use crate::path::HierPath;
use std::fmt;

/// The role collection a signal is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Externally supplied clocks.
    ClkI,
    /// Clock domains derived from the master emulation clock.
    ClkDerived,
    /// Outputs of the clock gating network.
    ClkGated,
    /// Free-running clocks produced by the clock generator.
    ClkIndependent,
    /// Fixed-point values driven into the design.
    AnalogCtrlInputs,
    /// Fixed-point values read from the design.
    AnalogCtrlOutputs,
    /// Digital values driven into the design.
    DigitalCtrlInputs,
    /// Digital values read from the design.
    DigitalCtrlOutputs,
    /// Fixed-point probes.
    AnalogProbes,
    /// Digital probes.
    DigitalProbes,
    /// The distinguished simulated-time probe.
    TimeProbe,
    /// Decimation threshold control.
    DecThrCtrl,
    /// Emulation reset control.
    ResetCtrl,
}

impl Role {
    /// Returns the configuration name of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::ClkI => "clk_i",
            Role::ClkDerived => "clk_derived",
            Role::ClkGated => "clk_gated",
            Role::ClkIndependent => "clk_independent",
            Role::AnalogCtrlInputs => "analog_ctrl_inputs",
            Role::AnalogCtrlOutputs => "analog_ctrl_outputs",
            Role::DigitalCtrlInputs => "digital_ctrl_inputs",
            Role::DigitalCtrlOutputs => "digital_ctrl_outputs",
            Role::AnalogProbes => "analog_probes",
            Role::DigitalProbes => "digital_probes",
            Role::TimeProbe => "time_probe",
            Role::DecThrCtrl => "dec_thr_ctrl",
            Role::ResetCtrl => "reset_ctrl",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a control signal, seen from the design-under-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Driven by the control fabric into the design.
    Input,
    /// Read by the control fabric from the design.
    Output,
}

/// Value domain of a control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Plain bit vector.
    Digital,
    /// Signed fixed-point value with one unit = `2^exponent`.
    Analog {
        /// Fixed-point exponent.
        exponent: i32,
    },
}

/// Kind of a probe signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Plain bit vector.
    Digital,
    /// Signed fixed-point value.
    Analog {
        /// Fixed-point exponent.
        exponent: i32,
    },
    /// The accumulated simulated time, encoded at the time-step exponent.
    Time {
        /// Fixed-point exponent.
        exponent: i32,
    },
}

/// Gate-enable request and gated clock output of one derived domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockGating {
    /// Path the gate-enable request is read from.
    pub request: HierPath,
    /// Path the gated clock is driven onto.
    pub gated: HierPath,
}

/// Attachment points of a derived clock domain. All are independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedClock {
    /// Source of the domain's requested time step.
    pub dt_req: Option<HierPath>,
    /// Destination of the arbitrated time step.
    pub emu_dt: Option<HierPath>,
    /// Destination of the forwarded master clock.
    pub emu_clk: Option<HierPath>,
    /// Destination of the forwarded reset.
    pub emu_rst: Option<HierPath>,
    /// Clock gating pair.
    pub gating: Option<ClockGating>,
}

impl DerivedClock {
    /// Returns `true` if the domain requests its own time step.
    pub fn requests_dt(&self) -> bool {
        self.dt_req.is_some()
    }

    /// Returns `true` if the domain is clocked through the gating network.
    pub fn is_gated(&self) -> bool {
        self.gating.is_some()
    }
}

/// The closed set of signal variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    /// An externally supplied clock.
    ClockInput,
    /// A domain derived from the master clock.
    ClockDerived(DerivedClock),
    /// Output of the gating network, consumed by exactly one derived domain.
    ClockGated {
        /// Name of the consuming derived domain.
        domain: String,
    },
    /// A value exchanged between the control fabric and the design.
    Control {
        /// Digital or fixed-point.
        value: ValueKind,
        /// Flow direction relative to the design.
        direction: Direction,
    },
    /// A value exposed for capture.
    Probe(ProbeKind),
}

/// A named, sized wire with an optional absolute binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    name: String,
    width: u32,
    abs_path: Option<HierPath>,
    kind: SignalKind,
}

impl Signal {
    /// Creates an unbound signal. Names and widths are validated when the
    /// signal is added to a [`StructureBuilder`](crate::StructureBuilder).
    pub fn new(name: impl Into<String>, width: u32, kind: SignalKind) -> Self {
        Self {
            name: name.into(),
            width,
            abs_path: None,
            kind,
        }
    }

    /// Creates a one-bit external clock input.
    pub fn clock_input(name: impl Into<String>) -> Self {
        Self::new(name, 1, SignalKind::ClockInput)
    }

    /// Creates a derived clock domain.
    pub fn clock_derived(name: impl Into<String>, attachments: DerivedClock) -> Self {
        Self::new(name, 1, SignalKind::ClockDerived(attachments))
    }

    /// Creates the gated clock consumed by `domain`, named `<domain>_gated`.
    pub fn clock_gated(domain: &str) -> Self {
        Self::new(
            format!("{domain}_gated"),
            1,
            SignalKind::ClockGated {
                domain: domain.to_string(),
            },
        )
    }

    /// Creates a control signal.
    pub fn control(
        name: impl Into<String>,
        width: u32,
        value: ValueKind,
        direction: Direction,
    ) -> Self {
        Self::new(name, width, SignalKind::Control { value, direction })
    }

    /// Creates a probe signal.
    pub fn probe(name: impl Into<String>, width: u32, kind: ProbeKind) -> Self {
        Self::new(name, width, SignalKind::Probe(kind))
    }

    /// Binds the signal to an absolute path, consuming the unbound value.
    pub fn with_abs_path(mut self, path: HierPath) -> Self {
        self.abs_path = Some(path);
        self
    }

    /// Returns the signal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the absolute binding, if any.
    pub fn abs_path(&self) -> Option<&HierPath> {
        self.abs_path.as_ref()
    }

    /// Returns the variant tag.
    pub fn kind(&self) -> &SignalKind {
        &self.kind
    }

    /// Returns the derived clock attachments if this is a derived domain.
    pub fn as_derived(&self) -> Option<&DerivedClock> {
        match &self.kind {
            SignalKind::ClockDerived(derived) => Some(derived),
            _ => None,
        }
    }

    /// Returns `true` if the value is a signed fixed-point quantity.
    pub fn is_signed(&self) -> bool {
        match self.kind {
            SignalKind::Control {
                value: ValueKind::Analog { .. },
                ..
            }
            | SignalKind::Probe(ProbeKind::Analog { .. } | ProbeKind::Time { .. }) => true,
            SignalKind::Control {
                value: ValueKind::Digital,
                ..
            }
            | SignalKind::Probe(ProbeKind::Digital)
            | SignalKind::ClockInput
            | SignalKind::ClockDerived(_)
            | SignalKind::ClockGated { .. } => false,
        }
    }

    /// Returns the fixed-point exponent of analog and time signals.
    pub fn exponent(&self) -> Option<i32> {
        match self.kind {
            SignalKind::Control {
                value: ValueKind::Analog { exponent },
                ..
            }
            | SignalKind::Probe(ProbeKind::Analog { exponent } | ProbeKind::Time { exponent }) => {
                Some(exponent)
            }
            _ => None,
        }
    }
}
