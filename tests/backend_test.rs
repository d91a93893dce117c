// SPDX-License-Identifier: Apache-2.0

//! Both node backends must build the same tree from the same source.

use pretty_assertions::assert_eq;
use test_case::test_case;
use vlpt::pt::dump::PtDumper;
use vlpt::pt::*;
use vlpt::{BackendKind, PtMgr, PtMgrOptions};

const DESIGN: &str = r#"`timescale 1ns / 1ps
`celldefine
(* keep = 1 *)
module top #(parameter W = 8, parameter [3:0] D = 4'd3) (
  input wire clk,
  input [W-1:0] din,
  output reg [W-1:0] dout,
  output valid
);
  localparam integer N = 4;
  wire [W-1:0] tmp;
  wire #(1, 2) delayed = din;
  reg [7:0] mem [0:N-1];
  integer i;
  event ev;
  genvar g;

  assign (strong0, weak1) valid = |dout;
  and #3 g0 (tmp[0], din[0], din[1]);
  sub #(.P(W)) u0 (.a(din), .b(tmp), .c());
  sub u1 (din, , tmp);
  defparam u1.P = 3;

  always @(posedge clk or negedge valid) begin : seq
    reg [3:0] cnt;
    if (din == 0)
      dout <= #1 {W{1'b0}};
    else begin
      dout <= din + mem[i][3:0];
      -> ev;
    end
    case (din[1:0])
      2'b00, 2'b01: cnt = cnt + 1;
      default: ;
    endcase
    for (i = 0; i < N; i = i + 1) mem[i] = 0;
  end

  initial begin
    #10 $display("done %d", dout);
    wait (valid) disable seq;
  end

  function [7:0] inc;
    input [7:0] x;
    inc = x + 1;
  endfunction

  task pulse(input integer n);
    repeat (n) @(posedge clk);
  endtask

  generate
    for (g = 0; g < 2; g = g + 1) begin : gen_l
      wire w = din[g];
    end
    if (W > 4) begin : wide
      assign tmp[1] = inc(din);
    end else begin
      assign tmp[1] = 1'b0;
    end
    case (D)
      3: assign tmp[2] = 1'b1;
      default: ;
    endcase
  endgenerate

  specify
    specparam tRise = 2;
    (clk => dout) = (1, 2);
    if (valid) (din *> dout) = tRise;
  endspecify
endmodule
`endcelldefine

primitive mux (out, sel, a, b);
  output out;
  input sel, a, b;
  table
    0 0 ? : 0;
    0 1 ? : 1;
    1 ? 0 : 0;
    1 ? 1 : 1;
  endtable
endprimitive

primitive dff (q, d, clk);
  output reg q;
  input d, clk;
  initial q = 1'b0;
  table
    0 (01) : ? : 0;
    1 (01) : ? : 1;
    ? (1?) : ? : -;
    * ? : ? : -;
  endtable
endprimitive
"#;

fn build(backend: BackendKind) -> PtMgr {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mgr = PtMgr::new(PtMgrOptions { backend });
    let ok = mgr.read_str("design.v", DESIGN);
    assert!(ok, "{:#?}", mgr.msg_mgr().diagnostics());
    mgr
}

fn each_view_equal<T: PartialEq + std::fmt::Debug>(
    count: usize,
    a: impl Fn(u32) -> T,
    b: impl Fn(u32) -> T,
) {
    for raw in 0..count as u32 {
        assert_eq!(a(raw), b(raw), "node {}", raw);
    }
}

/// Compares every node of each listed kind between two stores.
macro_rules! all_views_equal {
    ($counts:expr, $s:expr, $c:expr, $(($field:ident, $view:ident, $id:ident)),+ $(,)?) => {
        $(
            each_view_equal($counts.$field, |i| $s.$view($id(i)), |i| $c.$view($id(i)));
        )+
    };
}

#[test]
fn test_backends_build_identical_trees() {
    let spt = build(BackendKind::Straightforward);
    let cpt = build(BackendKind::Compact);
    let (s, c): (&dyn PtStore, &dyn PtStore) = (spt.store(), cpt.store());

    let counts = s.node_counts();
    assert_eq!(counts, c.node_counts());
    assert_eq!(counts.modules, 1);
    assert_eq!(counts.udps, 2);

    assert_eq!(spt.module_list(), cpt.module_list());
    assert_eq!(spt.udp_list(), cpt.udp_list());
    assert_eq!(spt.def_names(), cpt.def_names());

    all_views_equal!(
        counts,
        s,
        c,
        (modules, module, ModuleId),
        (udps, udp, UdpId),
        (udp_entries, udp_entry, UdpEntryId),
        (udp_values, udp_value, UdpValueId),
        (ports, port, PortId),
        (io_heads, io_head, IOHeadId),
        (io_items, io_item, IOItemId),
        (decl_heads, decl_head, DeclHeadId),
        (decl_items, decl_item, DeclItemId),
        (ranges, range, RangeId),
        (items, item, ItemId),
        (def_params, def_param, DefParamId),
        (cont_assigns, cont_assign, ContAssignId),
        (insts, inst, InstId),
        (connections, connection, ConnectionId),
        (gen_case_items, gen_case_item, GenCaseItemId),
        (path_decls, path_decl, PathDeclId),
        (path_delays, path_delay, PathDelayId),
        (stmts, stmt, StmtId),
        (case_items, case_item, CaseItemId),
        (exprs, expr, ExprId),
        (controls, control, ControlId),
        (delays, delay, DelayId),
        (strengths, strength, StrengthId),
        (attr_insts, attr_inst, AttrInstId),
        (attr_specs, attr_spec, AttrSpecId),
        (name_branches, name_branch, NameBranchId),
    );

    assert_eq!(spt.dump(), cpt.dump());
}

#[test]
fn test_compact_backend_uses_less_memory() {
    let spt = build(BackendKind::Straightforward);
    let cpt = build(BackendKind::Compact);
    assert!(
        cpt.store().memory_usage() < spt.store().memory_usage(),
        "compact {} vs straightforward {}",
        cpt.store().memory_usage(),
        spt.store().memory_usage()
    );
}

#[test]
fn test_design_shape() {
    let mgr = build(BackendKind::default());
    let store = mgr.store();
    let top = store.module(mgr.find_module("top").unwrap());
    assert!(top.is_cell);
    assert_eq!((top.time_unit, top.time_precision), (-9, -12));
    assert_eq!(top.paramport_array.len(), 2);
    assert_eq!(top.port_array.len(), 4);
    assert!(top.explicit_name);
    assert_eq!(mgr.def_names(), vec!["sub"]);

    let dff = store.udp(mgr.find_udp("dff").unwrap());
    assert!(dff.is_seq);
    assert!(dff.init_value.is_some());
    assert_eq!(dff.entry_array.len(), 4);
    let mux = store.udp(mgr.find_udp("mux").unwrap());
    assert!(!mux.is_seq);
    assert_eq!(mux.port_array.len(), 4);
}

#[test_case(BackendKind::Straightforward; "straightforward")]
#[test_case(BackendKind::Compact; "compact")]
fn test_udp_header_initial_value(backend: BackendKind) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mgr = PtMgr::new(PtMgrOptions { backend });
    let ok = mgr.read_str(
        "latch.v",
        r#"
primitive latch (output reg q = 1'b1, input en, input d);
  table
    1 0 : ? : 0;
    1 1 : ? : 1;
    0 ? : ? : -;
  endtable
endprimitive
"#,
    );
    assert!(ok, "{:#?}", mgr.msg_mgr().diagnostics());
    let store = mgr.store();
    let udp = store.udp(mgr.find_udp("latch").unwrap());
    assert!(udp.is_seq);
    assert_eq!(udp.port_array.len(), 3);
    let init = udp.init_value.expect("header initial value");
    assert_eq!(PtDumper::new(store).expr(init), "1'b1");
}
