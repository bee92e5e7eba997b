//! Assembly of the generated top module.
//!
//! Sections are written in a fixed order:
//!
//! 1. preamble (timescale, includes) and interface
//! 2. control, probe and clock declarations
//! 3. design-under-test instance
//! 4. derived clock assignments
//! 5. control fabric instance and its path bindings
//! 6. probe fabric instance and its path bindings
//! 7. clock generation network
//! 8. time arbitration network, or the fixed-step accumulator
//! 9. reset and decimation markers, simulation control
//!
//! Every collection is walked in declaration order.

use crate::error::CodegenError;
use crate::sv::{ModuleInst, SvWriter};
use chrona_config::ResolvedTarget;
use chrona_structure::{collect_bindings, Binding, Site, StructureConfig, TimeArbitration};
use tracing::debug;

const SIM_GUARD: &str = "SIMULATION_MODE_MSDSL";
const DT_TYPE: &str = "logic signed [((`DT_WIDTH)-1):0]";
const TIME_TYPE: &str = "logic signed [((`TIME_WIDTH)-1):0]";

/// Renders one target's top module from its structure.
pub struct ModuleAssembler<'a> {
    target: &'a ResolvedTarget,
    structure: &'a StructureConfig,
    arbitration: TimeArbitration<'a>,
    bindings: Vec<Binding<'a>>,
}

impl<'a> ModuleAssembler<'a> {
    /// Derives the arbitration model and bindings of `structure`.
    pub fn new(target: &'a ResolvedTarget, structure: &'a StructureConfig) -> Self {
        Self {
            target,
            structure,
            arbitration: TimeArbitration::from_structure(structure),
            bindings: collect_bindings(structure),
        }
    }

    /// The arbitration model the module is rendered with.
    pub fn arbitration(&self) -> &TimeArbitration<'a> {
        &self.arbitration
    }

    /// Renders the complete module text.
    pub fn render(&self) -> Result<String, CodegenError> {
        let mut w = SvWriter::new();
        self.write_interface(&mut w);
        self.write_control_decls(&mut w);
        self.write_probe_decls(&mut w);
        self.write_clock_decls(&mut w);
        self.write_dut(&mut w);
        self.write_derived_assigns(&mut w);
        self.write_control_fabric(&mut w);
        self.write_probe_fabric(&mut w);
        self.write_clock_network(&mut w);
        self.write_time_network(&mut w)?;
        self.write_markers(&mut w);
        self.write_sim_control(&mut w);

        let text = w.into_string();
        debug!(
            target_name = %self.target.name,
            bytes = text.len(),
            n_dt = self.arbitration.n_dt(),
            n_clks = self.arbitration.n_clks(),
            "module assembled"
        );
        Ok(text)
    }

    fn bindings_at(&self, site: Site) -> impl Iterator<Item = &Binding<'a>> {
        self.bindings.iter().filter(move |b| b.site == site)
    }

    fn write_interface(&self, w: &mut SvWriter) {
        let top = &self.target.top;
        w.line("`timescale 1ns/1ps");
        w.blank();
        if !self.target.includes.is_empty() {
            for include in &self.target.includes {
                w.line(format!("`include \"{include}\""));
            }
            w.blank();
        }
        w.line("`default_nettype none");
        w.blank();

        w.line(format!("`ifndef {SIM_GUARD}"));
        w.line(format!("module {top} ("));
        w.indent();
        let inputs = self.structure.clk_i();
        for (i, clock) in inputs.iter().enumerate() {
            let sep = if i + 1 < inputs.len() { "," } else { "" };
            w.line(format!("input wire logic {}{sep}", clock.name()));
        }
        w.dedent();
        w.line(");");
        w.line("`else");
        w.line(format!("module {top} ("));
        w.line(");");
        w.line(format!("`endif // `ifndef {SIM_GUARD}"));
        w.blank();
    }

    fn write_control_decls(&self, w: &mut SvWriter) {
        w.comment("control signals");
        for signal in self.structure.controls() {
            w.declare(signal);
        }
        w.blank();
    }

    fn write_probe_decls(&self, w: &mut SvWriter) {
        w.comment("probe signals");
        for signal in self.structure.probes() {
            w.declare(signal);
        }
        w.blank();
    }

    fn write_clock_decls(&self, w: &mut SvWriter) {
        w.comment("external clocks are driven by the testbench in simulation");
        w.line(format!("`ifdef {SIM_GUARD}"));
        w.indent();
        for clock in self.structure.clk_i() {
            w.declare(clock);
        }
        w.dedent();
        w.line(format!("`endif // `ifdef {SIM_GUARD}"));
        w.blank();

        w.comment("emulation clocks");
        w.line("logic emu_clk, emu_clk_2x;");
        w.line("logic dbg_hub_clk;");
        for clock in self
            .structure
            .clk_independent()
            .iter()
            .chain(self.structure.clk_gated())
        {
            w.declare(clock);
        }
        w.blank();

        w.comment("emulation time");
        w.line(format!("{DT_TYPE} emu_dt;"));
        w.line(format!("{TIME_TYPE} emu_time;"));
        if !self.arbitration.is_single_rate() {
            w.line(format!("localparam integer n_dt = {};", self.arbitration.n_dt()));
            w.line(format!("{DT_TYPE} dt_req [n_dt];"));
        }
        w.blank();

        if self.arbitration.has_gating() {
            w.comment("clock gating network");
            w.line(format!(
                "localparam integer n_clks = {};",
                self.arbitration.n_clks()
            ));
            w.line("logic clk_vals [n_clks];");
            w.line("logic clks [n_clks];");
            w.blank();
        }
    }

    fn write_dut(&self, w: &mut SvWriter) {
        w.comment("design-under-test");
        ModuleInst::new(&self.target.dut_module, &self.target.dut_instance)
            .same_name_ports(self.structure.clk_independent())
            .render(w);
        w.blank();
    }

    fn write_derived_assigns(&self, w: &mut SvWriter) {
        for clock in self.structure.clk_derived() {
            w.comment(format!("derived clock: {}", clock.name()));
            for binding in self
                .bindings_at(Site::DerivedClock)
                .filter(|b| b.signal == clock.name())
            {
                w.line(binding.to_assign());
            }
            w.blank();
        }
    }

    fn write_control_fabric(&self, w: &mut SvWriter) {
        w.comment("control fabric");
        ModuleInst::new("sim_ctrl_gen", "sim_ctrl_gen_i")
            .same_name_ports(self.structure.control_outputs())
            .same_name_ports(self.structure.control_inputs())
            .port("emu_clk", "emu_clk")
            .render(w);
        write_bindings(w, self.bindings_at(Site::Control));
        w.blank();
    }

    fn write_probe_fabric(&self, w: &mut SvWriter) {
        w.comment("probe fabric");
        ModuleInst::new("trace_port_gen", "trace_port_gen_i")
            .same_name_ports(self.structure.probes())
            .port("emu_clk", "emu_clk")
            .render(w);
        write_bindings(w, self.bindings_at(Site::Probe));
        w.line(format!(
            "assign {} = emu_time;",
            self.structure.time_probe().name()
        ));
        w.blank();
    }

    fn write_clock_network(&self, w: &mut SvWriter) {
        w.comment("clock generator");
        ModuleInst::new("clk_gen", "clk_gen_i")
            .same_name_ports(self.structure.clk_i())
            .port("emu_clk_2x", "emu_clk_2x")
            .port("dbg_hub_clk", "dbg_hub_clk")
            .same_name_ports(self.structure.clk_independent())
            .render(w);
        w.blank();

        if self.arbitration.has_gating() {
            w.comment("master and gated emulation clocks");
            ModuleInst::new("gen_emu_clks", "gen_emu_clks_i")
                .param("n", "n_clks")
                .port("emu_clk_2x", "emu_clk_2x")
                .port("emu_clk", "emu_clk")
                .port("clk_vals", "clk_vals")
                .port("clks", "clks")
                .render(w);
            for request in self.arbitration.gate_requests() {
                w.line(format!(
                    "assign {} = clks[{}];",
                    request.gated_clock, request.index
                ));
            }
        } else {
            w.comment("master emulation clock");
            w.line("logic emu_clk_unbuf = 0;");
            w.line("always @(posedge emu_clk_2x) begin");
            w.indent();
            w.line("emu_clk_unbuf <= ~emu_clk_unbuf;");
            w.dedent();
            w.line("end");
            w.line(format!("`ifndef {SIM_GUARD}"));
            w.indent();
            w.line("BUFG buf_emu_clk (.I(emu_clk_unbuf), .O(emu_clk));");
            w.dedent();
            w.line("`else");
            w.indent();
            w.line("assign emu_clk = emu_clk_unbuf;");
            w.dedent();
            w.line(format!("`endif // `ifndef {SIM_GUARD}"));
        }
        w.blank();
    }

    fn write_time_network(&self, w: &mut SvWriter) -> Result<(), CodegenError> {
        if self.arbitration.is_single_rate() {
            let emu = &self.target.emulation;
            let literal = emu
                .dt_format
                .literal(emu.dt)
                .map_err(|source| CodegenError::Encoding {
                    name: "emu_dt_fixed",
                    source,
                })?;
            w.comment("fixed time step");
            w.line(format!(
                "localparam {DT_TYPE} emu_dt_fixed = {};",
                literal.to_sv_signed()
            ));
            w.line("assign emu_dt = emu_dt_fixed;");
            w.line("always @(posedge emu_clk) begin");
            w.indent();
            w.line("if (emu_rst) begin");
            w.indent();
            w.line("emu_time <= '0;");
            w.dedent();
            w.line("end else begin");
            w.indent();
            w.line("emu_time <= emu_time + emu_dt;");
            w.dedent();
            w.line("end");
            w.dedent();
            w.line("end");
        } else {
            w.comment(format!("time manager: {}", self.arbitration.rule().describe()));
            ModuleInst::new("time_manager", "time_manager_i")
                .param("n", "n_dt")
                .param("width", "`DT_WIDTH")
                .param("time_width", "`TIME_WIDTH")
                .port("dt_req", "dt_req")
                .port("emu_dt", "emu_dt")
                .port("emu_clk", "emu_clk")
                .port("emu_rst", "emu_rst")
                .port("emu_time", "emu_time")
                .render(w);
        }
        w.blank();
        Ok(())
    }

    fn write_markers(&self, w: &mut SvWriter) {
        w.comment("reset and decimation probes");
        w.line("`MAKE_RESET_PROBE;");
        w.line("`MAKE_DEC_PROBE;");
        w.blank();
    }

    fn write_sim_control(&self, w: &mut SvWriter) {
        w.comment("simulation control");
        w.line(format!("`ifdef {SIM_GUARD}"));
        w.indent();
        w.line("initial begin");
        w.indent();
        w.line("#((`TSTOP_MSDSL)*1s);");
        w.line("$finish;");
        w.dedent();
        w.line("end");
        w.blank();
        w.line("`define ADD_QUOTES_TO_MACRO(macro) `\"macro`\"");
        w.line("initial begin");
        w.indent();
        w.line("$dumpfile(`ADD_QUOTES_TO_MACRO(`VCD_FILE_MSDSL));");
        w.line("$dumpvars(0);");
        w.dedent();
        w.line("end");
        w.dedent();
        w.line(format!("`endif // `ifdef {SIM_GUARD}"));
        w.blank();
        w.line("endmodule");
        w.blank();
        w.line("`default_nettype wire");
    }
}

fn write_bindings<'b, 'a: 'b>(w: &mut SvWriter, bindings: impl Iterator<Item = &'b Binding<'a>>) {
    for binding in bindings {
        w.line(binding.to_assign());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrona_config::{load_config_from_str, resolve_target};

    fn render(toml: &str, target: &str) -> String {
        let text = format!("[project]\nname = \"t\"\n{toml}");
        let config = load_config_from_str(&text).unwrap();
        let resolved = resolve_target(&config, target).unwrap();
        let structure = StructureConfig::from_target(&resolved).unwrap();
        ModuleAssembler::new(&resolved, &structure).render().unwrap()
    }

    fn position(text: &str, needle: &str) -> usize {
        text.find(needle)
            .unwrap_or_else(|| panic!("missing {needle:?} in:\n{text}"))
    }

    const MULTI_RATE: &str = r#"
[[clocks.derived]]
name = "clk_a"
dt_req = "tb_i.a.dt_req"
emu_dt = "tb_i.a.emu_dt"
emu_clk = "tb_i.a.emu_clk"
emu_rst = "tb_i.a.emu_rst"

[[clocks.derived]]
name = "clk_b"
dt_req = "tb_i.b.dt_req"
gated_clk_req = "tb_i.b.clk_en"
gated_clk = "tb_i.b.clk"

[[clocks.independent]]
name = "clk_fast"

[[control.analog_inputs]]
name = "v_in"
width = 16
exponent = -12
path = "tb_i.v_in"

[[control.digital_outputs]]
name = "done"
path = "tb_i.done"

[[probes.analog]]
name = "v_out"
width = 18
exponent = -14
path = "tb_i.filter_i.v_out"
"#;

    #[test]
    fn sections_in_fixed_order() {
        let text = render(MULTI_RATE, "fpga");
        let order = [
            "`timescale 1ns/1ps",
            "`ifndef SIMULATION_MODE_MSDSL",
            "// control signals",
            "// probe signals",
            "// emulation clocks",
            "// design-under-test",
            "// derived clock: clk_a",
            "// control fabric",
            "// probe fabric",
            "// clock generator",
            "// time manager",
            "`MAKE_RESET_PROBE;",
            "`MAKE_DEC_PROBE;",
            "// simulation control",
            "endmodule",
            "`default_nettype wire",
        ];
        let positions: Vec<usize> = order.iter().map(|n| position(&text, n)).collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]), "{positions:?}");
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render(MULTI_RATE, "fpga"), render(MULTI_RATE, "fpga"));
    }

    #[test]
    fn multi_rate_instantiates_time_manager() {
        let text = render(MULTI_RATE, "fpga");
        assert!(text.contains("localparam integer n_dt = 2;"));
        assert!(text.contains("logic signed [((`DT_WIDTH)-1):0] dt_req [n_dt];"));
        assert!(text.contains("time_manager #(\n    .n(n_dt),"));
        assert!(text.contains("assign dt_req[0] = tb_i.a.dt_req;"));
        assert!(text.contains("assign dt_req[1] = tb_i.b.dt_req;"));
        assert!(!text.contains("emu_dt_fixed"));
    }

    #[test]
    fn gating_network_wired() {
        let text = render(MULTI_RATE, "fpga");
        assert!(text.contains("localparam integer n_clks = 1;"));
        assert!(text.contains("gen_emu_clks #("));
        assert!(text.contains("logic clk_b_gated;"));
        assert!(text.contains("assign clk_b_gated = clks[0];"));
        assert!(text.contains("assign clk_vals[0] = tb_i.b.clk_en;"));
        assert!(text.contains("assign tb_i.b.clk = clk_b_gated;"));
        assert!(!text.contains("BUFG"));
    }

    #[test]
    fn path_bindings_rendered() {
        let text = render(MULTI_RATE, "fpga");
        assert!(text.contains("assign tb_i.v_in = v_in;"));
        assert!(text.contains("assign done = tb_i.done;"));
        assert!(text.contains("assign v_out = tb_i.filter_i.v_out;"));
        assert!(text.contains("assign emu_time_probe = emu_time;"));
        assert!(text.contains("assign tb_i.a.emu_rst = emu_rst;"));
    }

    #[test]
    fn declarations_carry_width_and_sign() {
        let text = render(MULTI_RATE, "fpga");
        assert!(text.contains("logic signed [15:0] v_in;"));
        assert!(text.contains("logic done;"));
        assert!(text.contains("logic [23:0] emu_dec_thr;"));
        assert!(text.contains("logic emu_rst;"));
        assert!(text.contains("logic signed [38:0] emu_time_probe;"));
    }

    #[test]
    fn independent_clocks_reach_dut_and_generator() {
        let text = render(MULTI_RATE, "fpga");
        assert!(text.contains("tb tb_i (\n    .clk_fast(clk_fast)\n);"));
        assert!(text.contains("    .dbg_hub_clk(dbg_hub_clk),\n    .clk_fast(clk_fast)\n);"));
    }

    #[test]
    fn single_rate_uses_fixed_step() {
        let text = render("", "fpga");
        assert!(!text.contains("time_manager"));
        assert!(!text.contains("n_dt"));
        assert!(text.contains(
            "localparam logic signed [((`DT_WIDTH)-1):0] emu_dt_fixed = 27'sd7036874;"
        ));
        assert!(text.contains("emu_time <= emu_time + emu_dt;"));
        assert!(text.contains("BUFG buf_emu_clk (.I(emu_clk_unbuf), .O(emu_clk));"));
    }

    #[test]
    fn interface_lists_clock_inputs() {
        let text = render("", "fpga");
        assert!(text.contains("module top (\n    input wire logic ext_clk\n);"));
        assert!(text.contains("`ifdef SIMULATION_MODE_MSDSL\n    logic ext_clk;\n`endif"));
    }

    #[test]
    fn includes_precede_module() {
        let toml = "[project]\nname = \"t\"\nincludes = [\"svreal.sv\", \"msdsl.sv\"]\n";
        let config = load_config_from_str(toml).unwrap();
        let resolved = resolve_target(&config, "sim").unwrap();
        let structure = StructureConfig::from_target(&resolved).unwrap();
        let text = ModuleAssembler::new(&resolved, &structure).render().unwrap();
        assert!(position(&text, "`include \"svreal.sv\"") < position(&text, "`include \"msdsl.sv\""));
        assert!(position(&text, "`include \"msdsl.sv\"") < position(&text, "module top"));
    }

    #[test]
    fn unencodable_fixed_step_is_range_error() {
        let toml = "[emulation]\ndt = 1.0\ndt_width = 8\ntime_width = 8\n";
        let text = format!("[project]\nname = \"t\"\n{toml}");
        let config = load_config_from_str(&text).unwrap();
        let resolved = resolve_target(&config, "fpga").unwrap();
        let structure = StructureConfig::from_target(&resolved).unwrap();
        let err = ModuleAssembler::new(&resolved, &structure)
            .render()
            .unwrap_err();
        assert!(matches!(err, CodegenError::Encoding { name: "emu_dt_fixed", .. }));
    }
}
