//! Absolute-path bindings between generated signals and the design-under-test.
//!
//! Every bound path is either a read source (the generated module samples
//! it) or a write target (the generated module drives it). A path may be
//! bound once per module.

use crate::error::BindingError;
use crate::path::HierPath;
use crate::signal::{Direction, SignalKind};
use crate::structure::StructureConfig;
use std::collections::HashMap;

/// Whether the generated module reads or drives a bound path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// `assign <local> = <path>;`
    Read,
    /// `assign <path> = <local>;`
    Write,
}

/// Section of the generated module a binding is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    /// Derived clock attachments.
    DerivedClock,
    /// Control fabric.
    Control,
    /// Probe fabric.
    Probe,
}

/// One path binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<'a> {
    /// The bound path inside the design-under-test.
    pub path: &'a HierPath,
    /// Read or write.
    pub access: Access,
    /// Generated-side expression, e.g. `emu_dt` or `dt_req[1]`.
    pub local: String,
    /// Declaring signal.
    pub signal: &'a str,
    /// Attachment name for derived clock bindings.
    pub attachment: Option<&'static str>,
    /// Rendering section.
    pub site: Site,
}

impl Binding<'_> {
    /// Declaring signal, qualified with the attachment for derived clocks.
    pub fn owner(&self) -> String {
        match self.attachment {
            Some(attachment) => format!("{}.{attachment}", self.signal),
            None => self.signal.to_string(),
        }
    }

    /// Renders the continuous assignment for this binding.
    pub fn to_assign(&self) -> String {
        match self.access {
            Access::Read => format!("assign {} = {};", self.local, self.path),
            Access::Write => format!("assign {} = {};", self.path, self.local),
        }
    }
}

/// Collects every binding of `config` in rendering order: derived clock
/// attachments, control inputs, control outputs, probes.
///
/// `dt_req` and `clk_vals` indices count requesting domains in declaration
/// order, matching [`TimeArbitration`](crate::TimeArbitration).
pub fn collect_bindings(config: &StructureConfig) -> Vec<Binding<'_>> {
    let mut out = Vec::new();
    let mut n_dt = 0usize;
    let mut n_clks = 0usize;

    for clock in config.clk_derived() {
        let Some(derived) = clock.as_derived() else {
            continue;
        };
        let name = clock.name();
        let forwards = [
            (&derived.emu_dt, "emu_dt"),
            (&derived.emu_clk, "emu_clk"),
            (&derived.emu_rst, "emu_rst"),
        ];
        for (path, attachment) in forwards {
            if let Some(path) = path {
                let local = attachment.to_string();
                out.push(derived_binding(path, Access::Write, local, name, attachment));
            }
        }
        if let Some(path) = &derived.dt_req {
            let local = format!("dt_req[{n_dt}]");
            out.push(derived_binding(path, Access::Read, local, name, "dt_req"));
            n_dt += 1;
        }
        if let Some(gating) = &derived.gating {
            let request = format!("clk_vals[{n_clks}]");
            let gated = format!("{name}_gated");
            out.push(derived_binding(
                &gating.request,
                Access::Read,
                request,
                name,
                "gated_clk_req",
            ));
            out.push(derived_binding(
                &gating.gated,
                Access::Write,
                gated,
                name,
                "gated_clk",
            ));
            n_clks += 1;
        }
    }

    for signal in config.control_inputs().chain(config.control_outputs()) {
        let (Some(path), SignalKind::Control { direction, .. }) = (signal.abs_path(), signal.kind())
        else {
            continue;
        };
        let access = match direction {
            Direction::Input => Access::Write,
            Direction::Output => Access::Read,
        };
        out.push(Binding {
            path,
            access,
            local: signal.name().to_string(),
            signal: signal.name(),
            attachment: None,
            site: Site::Control,
        });
    }

    for signal in config.probes() {
        if let Some(path) = signal.abs_path() {
            out.push(Binding {
                path,
                access: Access::Read,
                local: signal.name().to_string(),
                signal: signal.name(),
                attachment: None,
                site: Site::Probe,
            });
        }
    }

    out
}

fn derived_binding<'a>(
    path: &'a HierPath,
    access: Access,
    local: String,
    signal: &'a str,
    attachment: &'static str,
) -> Binding<'a> {
    Binding {
        path,
        access,
        local,
        signal,
        attachment: Some(attachment),
        site: Site::DerivedClock,
    }
}

/// Checks that every binding starts at the design-under-test instance and
/// that no path is bound twice. The first offending binding in rendering
/// order is reported.
pub fn validate_bindings(config: &StructureConfig) -> Result<(), BindingError> {
    let mut seen: HashMap<&HierPath, (Access, String)> = HashMap::new();
    for binding in collect_bindings(config) {
        let owner = binding.owner();
        if binding.path.scope() != config.dut_instance() {
            return Err(BindingError::Dangling {
                path: binding.path.to_string(),
                signal: owner,
                expected_scope: config.dut_instance().to_string(),
            });
        }
        if let Some((access, first)) = seen.get(binding.path) {
            let path = binding.path.to_string();
            return Err(match (access, binding.access) {
                (Access::Read, Access::Write) => BindingError::Conflict {
                    path,
                    reader: first.clone(),
                    writer: owner,
                },
                (Access::Write, Access::Read) => BindingError::Conflict {
                    path,
                    reader: owner,
                    writer: first.clone(),
                },
                _ => BindingError::DuplicateBinding {
                    path,
                    first: first.clone(),
                    second: owner,
                },
            });
        }
        seen.insert(binding.path, (binding.access, owner));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;
    use chrona_config::{load_config_from_str, resolve_target};

    fn build(toml: &str) -> Result<StructureConfig, StructureError> {
        let text = format!("[project]\nname = \"t\"\n{toml}");
        let config = load_config_from_str(&text).unwrap();
        StructureConfig::from_target(&resolve_target(&config, "fpga").unwrap())
    }

    fn binding_err(toml: &str) -> BindingError {
        match build(toml) {
            Err(StructureError::Binding(err)) => err,
            other => panic!("expected binding error, got {other:?}"),
        }
    }

    const THREE_DOMAINS: &str = r#"
[[clocks.derived]]
name = "clk_a"
dt_req = "tb_i.a.dt_req"
emu_dt = "tb_i.a.emu_dt"
emu_clk = "tb_i.a.emu_clk"
gated_clk_req = "tb_i.a.clk_en"
gated_clk = "tb_i.a.clk"

[[clocks.derived]]
name = "clk_b"
dt_req = "tb_i.b.dt_req"
emu_rst = "tb_i.b.emu_rst"

[[clocks.derived]]
name = "clk_c"
gated_clk_req = "tb_i.c.clk_en"
gated_clk = "tb_i.c.clk"
"#;

    #[test]
    fn derived_bindings_indexed_in_declaration_order() {
        let config = build(THREE_DOMAINS).unwrap();
        let assigns: Vec<String> = collect_bindings(&config)
            .iter()
            .filter(|b| b.site == Site::DerivedClock)
            .map(Binding::to_assign)
            .collect();
        assert_eq!(
            assigns,
            vec![
                "assign tb_i.a.emu_dt = emu_dt;",
                "assign tb_i.a.emu_clk = emu_clk;",
                "assign dt_req[0] = tb_i.a.dt_req;",
                "assign clk_vals[0] = tb_i.a.clk_en;",
                "assign tb_i.a.clk = clk_a_gated;",
                "assign tb_i.b.emu_rst = emu_rst;",
                "assign dt_req[1] = tb_i.b.dt_req;",
                "assign clk_vals[1] = tb_i.c.clk_en;",
                "assign tb_i.c.clk = clk_c_gated;",
            ]
        );
    }

    #[test]
    fn control_and_probe_directions() {
        let config = build(
            r#"
[[control.digital_inputs]]
name = "en"
path = "tb_i.en"

[[control.digital_outputs]]
name = "done"
path = "tb_i.done"

[[probes.digital]]
name = "state"
path = "tb_i.fsm.state"

[[probes.digital]]
name = "local_only"
"#,
        )
        .unwrap();
        let bindings = collect_bindings(&config);
        let assigns: Vec<String> = bindings.iter().map(Binding::to_assign).collect();
        assert_eq!(
            assigns,
            vec![
                "assign tb_i.en = en;",
                "assign done = tb_i.done;",
                "assign state = tb_i.fsm.state;",
            ]
        );
        assert_eq!(bindings[0].site, Site::Control);
        assert_eq!(bindings[2].site, Site::Probe);
    }

    #[test]
    fn read_and_write_of_one_path_conflict() {
        let err = binding_err(
            r#"
[[control.digital_inputs]]
name = "drv"
path = "tb_i.x"

[[probes.digital]]
name = "mon"
path = "tb_i.x"
"#,
        );
        assert_eq!(
            err,
            BindingError::Conflict {
                path: "tb_i.x".to_string(),
                reader: "mon".to_string(),
                writer: "drv".to_string(),
            }
        );
    }

    #[test]
    fn double_read_is_duplicate() {
        let err = binding_err(
            r#"
[[probes.digital]]
name = "p1"
path = "tb_i.x"

[[probes.digital]]
name = "p2"
path = "tb_i.x"
"#,
        );
        assert_eq!(
            err,
            BindingError::DuplicateBinding {
                path: "tb_i.x".to_string(),
                first: "p1".to_string(),
                second: "p2".to_string(),
            }
        );
    }

    #[test]
    fn gating_pair_on_one_path_conflicts() {
        let err = binding_err(
            r#"
[[clocks.derived]]
name = "clk_a"
gated_clk_req = "tb_i.a.clk"
gated_clk = "tb_i.a.clk"
"#,
        );
        assert!(matches!(err, BindingError::Conflict { ref reader, .. } if reader == "clk_a.gated_clk_req"));
    }

    #[test]
    fn path_outside_dut_is_dangling() {
        let err = binding_err("[[probes.analog]]\nname = \"v\"\nexponent = -8\npath = \"other_i.v\"\n");
        assert_eq!(
            err,
            BindingError::Dangling {
                path: "other_i.v".to_string(),
                signal: "v".to_string(),
                expected_scope: "tb_i".to_string(),
            }
        );
    }

    #[test]
    fn custom_dut_instance_scopes_paths() {
        let toml = "[project]\nname = \"t\"\ndut_instance = \"dut\"\n\n[[probes.digital]]\nname = \"p\"\npath = \"dut.p\"\n";
        let config = load_config_from_str(toml).unwrap();
        let structure = StructureConfig::from_target(&resolve_target(&config, "sim").unwrap());
        assert!(structure.is_ok());
    }
}
