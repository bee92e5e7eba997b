//! Full flows from project TOML to rendered module and capture parameters.

use chrona_capture::CaptureRequest;
use chrona_common::TimeFormat;
use chrona_conformance::{load_project, ordered_offsets, run_flow, run_target};
use chrona_config::TargetKind;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Two requesting domains, one of them gated, a third domain that is only
/// gated, and a user signal of every role.
const BUCK_CONVERTER: &str = r#"
[emulation]
dt = 1e-9
tstop = 100e-6
ila_depth = 2048

[[clocks.derived]]
name = "clk_ctrl"
dt_req = "tb_i.ctrl.dt_req"
emu_dt = "tb_i.ctrl.emu_dt"
emu_clk = "tb_i.ctrl.emu_clk"
emu_rst = "tb_i.ctrl.emu_rst"
gated_clk_req = "tb_i.ctrl.clk_en"
gated_clk = "tb_i.ctrl.clk"

[[clocks.derived]]
name = "clk_plant"
dt_req = "tb_i.plant.dt_req"
emu_clk = "tb_i.plant.emu_clk"

[[clocks.derived]]
name = "clk_pwm"
gated_clk_req = "tb_i.pwm.clk_en"
gated_clk = "tb_i.pwm.clk"

[[clocks.independent]]
name = "clk_adc"

[[control.analog_inputs]]
name = "v_ref"
width = 18
exponent = -14
path = "tb_i.ctrl.v_ref"

[[control.analog_outputs]]
name = "i_load"
width = 18
exponent = -12
path = "tb_i.plant.i_load"

[[control.digital_inputs]]
name = "enable"
path = "tb_i.ctrl.enable"

[[control.digital_outputs]]
name = "fault"
path = "tb_i.ctrl.fault"

[[probes.analog]]
name = "v_out"
width = 20
exponent = -16
path = "tb_i.plant.v_out"

[[probes.digital]]
name = "pwm_state"
width = 2
path = "tb_i.pwm.state"

[targets.sim]

[targets.zcu]
device = "xczu9eg"
ila_name = "ila_buck"

[targets.zcu.emulation]
ila_depth = 8192
jtag_freq = "30MHz"
"#;

/// No derived clocks at all.
const SINGLE_RATE: &str = r#"
[emulation]
dt = 50e-9
tstop = 1e-3

[[probes.digital]]
name = "count"
width = 16
path = "tb_i.counter.value"
"#;

// ---------------------------------------------------------------------------
// Arbitration sizing
// ---------------------------------------------------------------------------

#[test]
fn arbitration_counts_requesting_and_gated_domains() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let arb = flow.arbitration();
    assert_eq!(arb.n_dt(), 2);
    assert_eq!(arb.n_clks(), 2);

    let domains: Vec<_> = arb.dt_requests().iter().map(|r| r.domain).collect();
    assert_eq!(domains, vec!["clk_ctrl", "clk_plant"]);
    let gated: Vec<_> = arb.gate_requests().iter().map(|r| r.domain).collect();
    assert_eq!(gated, vec!["clk_ctrl", "clk_pwm"]);
}

#[test]
fn single_rate_project_omits_arbitration() {
    let flow = run_flow(SINGLE_RATE, "fpga").unwrap();
    let arb = flow.arbitration();
    assert_eq!(arb.n_dt(), 0);
    assert_eq!(arb.n_clks(), 0);

    let text = flow.top_sv();
    assert!(!text.contains("time_manager"));
    assert!(!text.contains("dt_req"));
    assert!(!text.contains("gen_emu_clks"));
    // 50e-9 * 2^46 = 3518437.2088832
    assert!(text.contains("localparam logic signed [((`DT_WIDTH)-1):0] emu_dt_fixed = 27'sd3518437;"));
    assert!(text.contains("BUFG buf_emu_clk"));
}

// ---------------------------------------------------------------------------
// Rendered module
// ---------------------------------------------------------------------------

#[test]
fn module_sections_in_order() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let offsets = ordered_offsets(
        flow.top_sv(),
        &[
            "module top (",
            "logic signed [17:0] v_ref;",
            "logic [1:0] pwm_state;",
            "logic emu_clk, emu_clk_2x;",
            "tb tb_i (",
            "// derived clock: clk_ctrl",
            "// derived clock: clk_plant",
            "// derived clock: clk_pwm",
            "sim_ctrl_gen_i (",
            "trace_port_gen_i (",
            "clk_gen_i (",
            "gen_emu_clks_i (",
            "time_manager_i (",
            "`MAKE_RESET_PROBE;",
            "`MAKE_DEC_PROBE;",
            "endmodule",
        ],
    );
    assert!(offsets.is_some(), "sections out of order:\n{}", flow.top_sv());
}

#[test]
fn derived_clock_bindings() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let text = flow.top_sv();
    let expected = [
        "assign tb_i.ctrl.emu_dt = emu_dt;",
        "assign tb_i.ctrl.emu_clk = emu_clk;",
        "assign tb_i.ctrl.emu_rst = emu_rst;",
        "assign dt_req[0] = tb_i.ctrl.dt_req;",
        "assign clk_vals[0] = tb_i.ctrl.clk_en;",
        "assign tb_i.ctrl.clk = clk_ctrl_gated;",
        "assign tb_i.plant.emu_clk = emu_clk;",
        "assign dt_req[1] = tb_i.plant.dt_req;",
        "assign clk_vals[1] = tb_i.pwm.clk_en;",
        "assign tb_i.pwm.clk = clk_pwm_gated;",
    ];
    assert!(
        ordered_offsets(text, &expected).is_some(),
        "derived clock bindings missing or reordered:\n{text}"
    );
    assert!(text.contains("assign clk_ctrl_gated = clks[0];"));
    assert!(text.contains("assign clk_pwm_gated = clks[1];"));
    assert!(text.contains("localparam integer n_dt = 2;"));
    assert!(text.contains("localparam integer n_clks = 2;"));
}

#[test]
fn control_and_probe_bindings() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let text = flow.top_sv();
    // inputs are driven into the design, outputs and probes are sampled
    assert!(text.contains("assign tb_i.ctrl.v_ref = v_ref;"));
    assert!(text.contains("assign tb_i.ctrl.enable = enable;"));
    assert!(text.contains("assign i_load = tb_i.plant.i_load;"));
    assert!(text.contains("assign fault = tb_i.ctrl.fault;"));
    assert!(text.contains("assign v_out = tb_i.plant.v_out;"));
    assert!(text.contains("assign pwm_state = tb_i.pwm.state;"));
    assert!(text.contains("assign emu_time_probe = emu_time;"));
}

#[test]
fn independent_clock_reaches_generator_and_dut() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let text = flow.top_sv();
    let dut = text.find("tb tb_i (").unwrap();
    let gen = text.find("clk_gen clk_gen_i (").unwrap();
    assert!(text[dut..].contains(".clk_adc(clk_adc)"));
    assert!(text[gen..].contains(".clk_adc(clk_adc)"));
    assert!(text.contains("input wire logic ext_clk"));
}

#[test]
fn sim_and_fpga_targets_share_the_module_text() {
    let config = load_project(BUCK_CONVERTER).unwrap();
    let request = CaptureRequest::default();
    let sim = run_target(&config, "sim", &request).unwrap();
    let zcu = run_target(&config, "zcu", &request).unwrap();
    assert_eq!(sim.target.kind, TargetKind::Sim);
    assert_eq!(zcu.target.kind, TargetKind::Fpga);
    assert_eq!(sim.top_sv(), zcu.top_sv());
    assert!(sim.generated.defines_svh.contains("`define SIMULATION_MODE_MSDSL\n"));
    assert!(!zcu.generated.defines_svh.contains("SIMULATION_MODE_MSDSL"));
}

// ---------------------------------------------------------------------------
// Capture parameters
// ---------------------------------------------------------------------------

#[test]
fn capture_uses_target_overrides() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let capture = &flow.capture;
    // 100e-6 / 1e-9 = 100000 steps over 4096 slots = 24.41 -> 24 - 1
    assert_eq!(capture.window_count, 4096);
    assert_eq!(capture.decimation_ratio, 23);
    assert!(!capture.clamped);
    assert_eq!(capture.device.as_deref(), Some("xczu9eg"));
    assert_eq!(capture.ila_name, "ila_buck");
    assert_eq!(capture.jtag_freq_hz, 30e6);
}

#[test]
fn capture_probe_list_matches_module() {
    let flow = run_flow(BUCK_CONVERTER, "zcu").unwrap();
    let names: Vec<_> = flow.capture.probes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["pwm_state", "v_out", "emu_time_probe"]);
    for name in names {
        assert!(flow.top_sv().contains(&format!(".{name}({name})")));
    }
}

#[test]
fn trigger_decodes_to_start_time() {
    let config = load_project(BUCK_CONVERTER).unwrap();
    let request = CaptureRequest {
        start_time: 25e-6,
        stop_time: Some(75e-6),
    };
    let flow = run_target(&config, "zcu", &request).unwrap();
    let format = TimeFormat::new(39, -46).unwrap();
    let encoded = format.encode(25e-6).unwrap();
    assert_eq!(flow.capture.start_time_encoded, format!("39'u{encoded}"));
    assert!((format.decode(encoded) - 25e-6).abs() <= format.resolution());
    assert_eq!(
        flow.capture.trigger_compare_value,
        format!("gt{}", flow.capture.start_time_encoded)
    );
}

#[test]
fn short_interval_clamps_decimation() {
    let config = load_project(SINGLE_RATE).unwrap();
    let request = CaptureRequest {
        start_time: 0.0,
        stop_time: Some(1e-6),
    };
    let flow = run_target(&config, "fpga", &request).unwrap();
    assert_eq!(flow.capture.decimation_ratio, 2);
    assert!(flow.capture.clamped);
}

#[test]
fn capture_record_serializes() {
    let flow = run_flow(SINGLE_RATE, "fpga").unwrap();
    let json = serde_json::to_value(&flow.capture).unwrap();
    assert_eq!(json["window_count"], 2048);
    assert_eq!(json["ila_name"], "ila_0");
    assert_eq!(json["vio_name"], "vio_0");
    assert_eq!(json["time_probe"], "emu_time_probe");
    assert!(json["device"].is_null());
}
