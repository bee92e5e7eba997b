//! The validated per-target signal collections.

use crate::binding::validate_bindings;
use crate::error::StructureError;
use crate::path::{is_identifier, HierPath};
use crate::signal::{
    ClockGating, DerivedClock, Direction, ProbeKind, Role, Signal, SignalKind, ValueKind,
};
use chrona_common::TimeFormat;
use chrona_config::{DerivedClockRecord, ResolvedTarget, SignalRecord};
use std::collections::HashMap;
use tracing::debug;

/// Names declared by the generated module itself: nets, local parameters
/// and instances.
pub const RESERVED_NAMES: &[&str] = &[
    "emu_clk",
    "emu_clk_2x",
    "emu_rst",
    "emu_dec_thr",
    "emu_dt",
    "emu_time",
    "emu_time_probe",
    "dt_req",
    "clk_vals",
    "clks",
    "dbg_hub_clk",
    "emu_dt_fixed",
    "emu_clk_unbuf",
    "buf_emu_clk",
    "n_dt",
    "n_clks",
    "clk_gen_i",
    "gen_emu_clks_i",
    "sim_ctrl_gen_i",
    "trace_port_gen_i",
    "time_manager_i",
];

/// Name of the reset control.
pub const RESET_NAME: &str = "emu_rst";
/// Name of the decimation threshold control.
pub const DEC_THR_NAME: &str = "emu_dec_thr";
/// Name of the time probe.
pub const TIME_PROBE_NAME: &str = "emu_time_probe";

const MAX_SIGNAL_WIDTH: u32 = 64;

/// The aggregate, validated signal set of one target.
///
/// Every role is present, possibly empty. Collections keep declaration order.
/// The value is immutable once built; consumers borrow it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureConfig {
    dut_instance: String,
    clk_i: Vec<Signal>,
    clk_derived: Vec<Signal>,
    clk_gated: Vec<Signal>,
    clk_independent: Vec<Signal>,
    analog_ctrl_inputs: Vec<Signal>,
    analog_ctrl_outputs: Vec<Signal>,
    digital_ctrl_inputs: Vec<Signal>,
    digital_ctrl_outputs: Vec<Signal>,
    analog_probes: Vec<Signal>,
    digital_probes: Vec<Signal>,
    time_probe: Signal,
    dec_thr_ctrl: Signal,
    reset_ctrl: Signal,
}

impl StructureConfig {
    /// Builds the structure of a resolved target.
    ///
    /// Records are converted role by role in declaration order. Each derived
    /// clock with a gating pair also contributes a `<name>_gated` clock.
    pub fn from_target(target: &ResolvedTarget) -> Result<Self, StructureError> {
        let emu = &target.emulation;
        let mut builder =
            StructureBuilder::new(&target.dut_instance, emu.time_format, emu.dec_bits);

        for record in &target.clocks.inputs {
            builder.add(Role::ClkI, clock_from_record(Role::ClkI, record)?)?;
        }
        for record in &target.clocks.derived {
            let derived = derived_from_record(record)?;
            let gated = derived.is_gated();
            builder.add(Role::ClkDerived, Signal::clock_derived(&record.name, derived))?;
            if gated {
                builder.add(Role::ClkGated, Signal::clock_gated(&record.name))?;
            }
        }
        for record in &target.clocks.independent {
            builder.add(
                Role::ClkIndependent,
                clock_from_record(Role::ClkIndependent, record)?,
            )?;
        }

        let control = &target.control;
        let groups: [(Role, &[SignalRecord]); 4] = [
            (Role::AnalogCtrlInputs, control.analog_inputs.as_slice()),
            (Role::AnalogCtrlOutputs, control.analog_outputs.as_slice()),
            (Role::DigitalCtrlInputs, control.digital_inputs.as_slice()),
            (Role::DigitalCtrlOutputs, control.digital_outputs.as_slice()),
        ];
        for (role, records) in groups {
            for record in records {
                builder.add(role, control_from_record(role, record)?)?;
            }
        }

        for record in &target.probes.analog {
            builder.add(
                Role::AnalogProbes,
                probe_from_record(Role::AnalogProbes, record)?,
            )?;
        }
        for record in &target.probes.digital {
            builder.add(
                Role::DigitalProbes,
                probe_from_record(Role::DigitalProbes, record)?,
            )?;
        }

        let config = builder.build()?;
        debug!(
            target_name = %target.name,
            clk_i = config.clk_i.len(),
            clk_derived = config.clk_derived.len(),
            clk_gated = config.clk_gated.len(),
            controls = config.controls().count(),
            probes = config.probes().count(),
            "structure built"
        );
        Ok(config)
    }

    /// Returns the design-under-test instance every binding starts from.
    pub fn dut_instance(&self) -> &str {
        &self.dut_instance
    }

    /// Externally supplied clocks.
    pub fn clk_i(&self) -> &[Signal] {
        &self.clk_i
    }

    /// Derived clock domains.
    pub fn clk_derived(&self) -> &[Signal] {
        &self.clk_derived
    }

    /// Gated clocks, one per gated derived domain.
    pub fn clk_gated(&self) -> &[Signal] {
        &self.clk_gated
    }

    /// Free-running clocks from the clock generator.
    pub fn clk_independent(&self) -> &[Signal] {
        &self.clk_independent
    }

    /// The time probe.
    pub fn time_probe(&self) -> &Signal {
        &self.time_probe
    }

    /// The decimation threshold control.
    pub fn dec_thr_ctrl(&self) -> &Signal {
        &self.dec_thr_ctrl
    }

    /// The reset control.
    pub fn reset_ctrl(&self) -> &Signal {
        &self.reset_ctrl
    }

    /// Control inputs: user inputs (analog, then digital), then the
    /// decimation threshold and the reset.
    pub fn control_inputs(&self) -> impl Iterator<Item = &Signal> {
        self.analog_ctrl_inputs
            .iter()
            .chain(&self.digital_ctrl_inputs)
            .chain([&self.dec_thr_ctrl, &self.reset_ctrl])
    }

    /// Control outputs: analog, then digital.
    pub fn control_outputs(&self) -> impl Iterator<Item = &Signal> {
        self.analog_ctrl_outputs
            .iter()
            .chain(&self.digital_ctrl_outputs)
    }

    /// Every control signal: user controls in role order, then the fixed ones.
    pub fn controls(&self) -> impl Iterator<Item = &Signal> {
        self.analog_ctrl_inputs
            .iter()
            .chain(&self.analog_ctrl_outputs)
            .chain(&self.digital_ctrl_inputs)
            .chain(&self.digital_ctrl_outputs)
            .chain([&self.dec_thr_ctrl, &self.reset_ctrl])
    }

    /// Every probe: digital, analog, then the time probe.
    pub fn probes(&self) -> impl Iterator<Item = &Signal> {
        self.digital_probes
            .iter()
            .chain(&self.analog_probes)
            .chain(std::iter::once(&self.time_probe))
    }
}

/// Incremental, validating construction of a [`StructureConfig`].
///
/// The fixed signals (`emu_rst`, `emu_dec_thr`, `emu_time_probe`) are created
/// by the builder; user signals are added per role and checked on insertion.
#[derive(Debug)]
pub struct StructureBuilder {
    config: StructureConfig,
    names: HashMap<String, Role>,
}

impl StructureBuilder {
    /// Starts an empty structure bound below `dut_instance`.
    pub fn new(dut_instance: &str, time_format: TimeFormat, dec_bits: u32) -> Self {
        let config = StructureConfig {
            dut_instance: dut_instance.to_string(),
            clk_i: Vec::new(),
            clk_derived: Vec::new(),
            clk_gated: Vec::new(),
            clk_independent: Vec::new(),
            analog_ctrl_inputs: Vec::new(),
            analog_ctrl_outputs: Vec::new(),
            digital_ctrl_inputs: Vec::new(),
            digital_ctrl_outputs: Vec::new(),
            analog_probes: Vec::new(),
            digital_probes: Vec::new(),
            time_probe: Signal::probe(
                TIME_PROBE_NAME,
                time_format.width(),
                ProbeKind::Time {
                    exponent: time_format.exponent(),
                },
            ),
            dec_thr_ctrl: Signal::control(
                DEC_THR_NAME,
                dec_bits,
                ValueKind::Digital,
                Direction::Input,
            ),
            reset_ctrl: Signal::control(RESET_NAME, 1, ValueKind::Digital, Direction::Input),
        };
        Self {
            config,
            names: HashMap::new(),
        }
    }

    /// Adds a user signal to `role` after checking its name, width, kind and
    /// uniqueness across the whole module.
    pub fn add(&mut self, role: Role, signal: Signal) -> Result<&mut Self, StructureError> {
        let name = signal.name().to_string();
        if !is_identifier(&name) {
            return Err(StructureError::InvalidName { name, role });
        }
        if RESERVED_NAMES.contains(&name.as_str()) || name == self.config.dut_instance {
            return Err(StructureError::ReservedName { name, role });
        }
        if !role_accepts(role, signal.kind()) {
            return Err(StructureError::KindMismatch { name, role });
        }
        let is_clock = matches!(
            signal.kind(),
            SignalKind::ClockInput | SignalKind::ClockDerived(_) | SignalKind::ClockGated { .. }
        );
        let width = signal.width();
        if width == 0 || width > MAX_SIGNAL_WIDTH || (is_clock && width != 1) {
            return Err(StructureError::InvalidWidth { name, role, width });
        }
        if is_clock && signal.abs_path().is_some() {
            return Err(StructureError::UnexpectedPath { name, role });
        }
        if let Some(&previous) = self.names.get(&name) {
            return Err(StructureError::DuplicateSignal {
                name,
                role,
                previous,
            });
        }

        let Some(collection) = self.collection_mut(role) else {
            return Err(StructureError::KindMismatch { name, role });
        };
        collection.push(signal);
        self.names.insert(name, role);
        Ok(self)
    }

    /// Checks the fixed signals and every path binding, then freezes the structure.
    pub fn build(self) -> Result<StructureConfig, StructureError> {
        let dec_thr = &self.config.dec_thr_ctrl;
        if dec_thr.width() == 0 || dec_thr.width() > MAX_SIGNAL_WIDTH {
            return Err(StructureError::InvalidWidth {
                name: dec_thr.name().to_string(),
                role: Role::DecThrCtrl,
                width: dec_thr.width(),
            });
        }
        validate_bindings(&self.config)?;
        Ok(self.config)
    }

    fn collection_mut(&mut self, role: Role) -> Option<&mut Vec<Signal>> {
        let c = &mut self.config;
        let collection = match role {
            Role::ClkI => &mut c.clk_i,
            Role::ClkDerived => &mut c.clk_derived,
            Role::ClkGated => &mut c.clk_gated,
            Role::ClkIndependent => &mut c.clk_independent,
            Role::AnalogCtrlInputs => &mut c.analog_ctrl_inputs,
            Role::AnalogCtrlOutputs => &mut c.analog_ctrl_outputs,
            Role::DigitalCtrlInputs => &mut c.digital_ctrl_inputs,
            Role::DigitalCtrlOutputs => &mut c.digital_ctrl_outputs,
            Role::AnalogProbes => &mut c.analog_probes,
            Role::DigitalProbes => &mut c.digital_probes,
            Role::TimeProbe | Role::DecThrCtrl | Role::ResetCtrl => return None,
        };
        Some(collection)
    }
}

fn role_accepts(role: Role, kind: &SignalKind) -> bool {
    use SignalKind as K;
    match role {
        Role::ClkI | Role::ClkIndependent => matches!(kind, K::ClockInput),
        Role::ClkDerived => matches!(kind, K::ClockDerived(_)),
        Role::ClkGated => matches!(kind, K::ClockGated { .. }),
        Role::AnalogCtrlInputs => matches!(
            kind,
            K::Control {
                value: ValueKind::Analog { .. },
                direction: Direction::Input
            }
        ),
        Role::AnalogCtrlOutputs => matches!(
            kind,
            K::Control {
                value: ValueKind::Analog { .. },
                direction: Direction::Output
            }
        ),
        Role::DigitalCtrlInputs => matches!(
            kind,
            K::Control {
                value: ValueKind::Digital,
                direction: Direction::Input
            }
        ),
        Role::DigitalCtrlOutputs => matches!(
            kind,
            K::Control {
                value: ValueKind::Digital,
                direction: Direction::Output
            }
        ),
        Role::AnalogProbes => matches!(kind, K::Probe(ProbeKind::Analog { .. })),
        Role::DigitalProbes => matches!(kind, K::Probe(ProbeKind::Digital)),
        Role::TimeProbe | Role::DecThrCtrl | Role::ResetCtrl => false,
    }
}

fn parse_path(signal: &str, role: Role, text: &str) -> Result<HierPath, StructureError> {
    HierPath::parse(text).map_err(|source| StructureError::InvalidPath {
        signal: signal.to_string(),
        role,
        source,
    })
}

fn clock_from_record(role: Role, record: &SignalRecord) -> Result<Signal, StructureError> {
    if record.path.is_some() {
        return Err(StructureError::UnexpectedPath {
            name: record.name.clone(),
            role,
        });
    }
    if record.exponent.is_some() {
        return Err(StructureError::UnexpectedExponent {
            name: record.name.clone(),
            role,
        });
    }
    Ok(Signal::new(&record.name, record.width, SignalKind::ClockInput))
}

fn derived_from_record(record: &DerivedClockRecord) -> Result<DerivedClock, StructureError> {
    let role = Role::ClkDerived;
    let attach = |text: &Option<String>| {
        text.as_deref()
            .map(|t| parse_path(&record.name, role, t))
            .transpose()
    };

    let gating = match (&record.gated_clk_req, &record.gated_clk) {
        (Some(request), Some(gated)) => Some(ClockGating {
            request: parse_path(&record.name, role, request)?,
            gated: parse_path(&record.name, role, gated)?,
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(StructureError::UnpairedGating {
                clock: record.name.clone(),
                present: "gated_clk_req",
                missing: "gated_clk",
            })
        }
        (None, Some(_)) => {
            return Err(StructureError::UnpairedGating {
                clock: record.name.clone(),
                present: "gated_clk",
                missing: "gated_clk_req",
            })
        }
    };

    Ok(DerivedClock {
        dt_req: attach(&record.dt_req)?,
        emu_dt: attach(&record.emu_dt)?,
        emu_clk: attach(&record.emu_clk)?,
        emu_rst: attach(&record.emu_rst)?,
        gating,
    })
}

/// Resolves the exponent rule shared by controls and probes: analog roles
/// require one, digital roles reject one.
fn exponent_for(
    role: Role,
    record: &SignalRecord,
    analog: bool,
) -> Result<Option<i32>, StructureError> {
    match (analog, record.exponent) {
        (true, Some(exponent)) => Ok(Some(exponent)),
        (true, None) => Err(StructureError::MissingExponent {
            name: record.name.clone(),
            role,
        }),
        (false, None) => Ok(None),
        (false, Some(_)) => Err(StructureError::UnexpectedExponent {
            name: record.name.clone(),
            role,
        }),
    }
}

fn bind(signal: Signal, role: Role, record: &SignalRecord) -> Result<Signal, StructureError> {
    match &record.path {
        Some(text) => Ok(signal.with_abs_path(parse_path(&record.name, role, text)?)),
        None => Ok(signal),
    }
}

fn control_from_record(role: Role, record: &SignalRecord) -> Result<Signal, StructureError> {
    let analog = matches!(role, Role::AnalogCtrlInputs | Role::AnalogCtrlOutputs);
    let direction = match role {
        Role::AnalogCtrlInputs | Role::DigitalCtrlInputs => Direction::Input,
        _ => Direction::Output,
    };
    let value = match exponent_for(role, record, analog)? {
        Some(exponent) => ValueKind::Analog { exponent },
        None => ValueKind::Digital,
    };
    bind(
        Signal::control(&record.name, record.width, value, direction),
        role,
        record,
    )
}

fn probe_from_record(role: Role, record: &SignalRecord) -> Result<Signal, StructureError> {
    let kind = match exponent_for(role, record, role == Role::AnalogProbes)? {
        Some(exponent) => ProbeKind::Analog { exponent },
        None => ProbeKind::Digital,
    };
    bind(Signal::probe(&record.name, record.width, kind), role, record)
}
