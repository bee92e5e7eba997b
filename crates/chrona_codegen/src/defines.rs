//! Macros the generated module expects from its build environment.

use chrona_config::{ResolvedTarget, TargetKind};
use std::fmt;

/// One `` `define `` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    /// Macro name.
    pub name: &'static str,
    /// Macro body; `None` for a flag.
    pub value: Option<String>,
}

impl Define {
    fn value(name: &'static str, value: impl ToString) -> Self {
        Self {
            name,
            value: Some(value.to_string()),
        }
    }

    fn flag(name: &'static str) -> Self {
        Self { name, value: None }
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "`define {} {value}", self.name),
            None => write!(f, "`define {}", self.name),
        }
    }
}

/// Returns the macro set of `target` in a stable order.
///
/// Clock, reset and decimation-threshold macros point into the generated
/// module by hierarchical name. Simulation targets additionally get the
/// simulation-mode flag, the stop time and the waveform file.
pub fn harness_defines(target: &ResolvedTarget) -> Vec<Define> {
    let top = &target.top;
    let emu = &target.emulation;
    let mut defines = vec![
        Define::value("CLK_MSDSL", format!("{top}.emu_clk")),
        Define::value("RST_MSDSL", format!("{top}.emu_rst")),
        Define::value("DEC_THR_MSDSL", format!("{top}.emu_dec_thr")),
        Define::value("DT_WIDTH", emu.dt_format.width()),
        Define::value("DT_EXPONENT", emu.dt_format.exponent()),
        Define::value("TIME_WIDTH", emu.time_format.width()),
        Define::value("DEC_BITS_MSDSL", emu.dec_bits),
    ];
    if target.kind == TargetKind::Sim {
        defines.push(Define::flag("SIMULATION_MODE_MSDSL"));
        defines.push(Define::value("TSTOP_MSDSL", format!("{:e}", emu.tstop)));
        defines.push(Define::value("VCD_FILE_MSDSL", &emu.vcd_file));
    }
    defines
}

/// Renders a defines header, one macro per line.
pub fn render_defines(defines: &[Define]) -> String {
    let mut out = String::from("// harness defines\n");
    for define in defines {
        out.push_str(&define.to_string());
        out.push('\n');
    }
    out
}
