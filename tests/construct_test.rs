// SPDX-License-Identifier: Apache-2.0

//! Module items, statements, compiler directives and error recovery.

use pretty_assertions::assert_eq;
use test_case::test_case;
use vlpt::pt::types::{DelayMode, NetType, UnconnDrive};
use vlpt::pt::{DeclHeadId, ItemKind, ModuleId, PtArray, PtStore};
use vlpt::{BackendKind, PtMgr, PtMgrOptions, Severity};

fn read(src: &str) -> (PtMgr, bool) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mgr = PtMgr::new(PtMgrOptions::default());
    let ok = mgr.read_str("test.v", src);
    (mgr, ok)
}

fn decl_names(store: &dyn PtStore, heads: PtArray<DeclHeadId>) -> Vec<String> {
    let arrays = store.arrays();
    arrays
        .iter(heads)
        .flat_map(|h| arrays.iter(store.decl_head(h).item_array))
        .map(|i| store.resolve(store.decl_item(i).name).to_string())
        .collect()
}

fn item_kinds(store: &dyn PtStore, module: ModuleId) -> Vec<&'static str> {
    store
        .arrays()
        .iter(store.module(module).item_array)
        .map(|i| store.item(i).kind.type_name())
        .collect()
}

#[test_case(BackendKind::Straightforward; "straightforward")]
#[test_case(BackendKind::Compact; "compact")]
fn test_generate_blocks_keep_their_declarations(backend: BackendKind) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mgr = PtMgr::new(PtMgrOptions { backend });
    let ok = mgr.read_str(
        "gen.v",
        r#"
module m;
  wire top_w;
  generate
    begin : b1
      wire b1_w;
    end
    begin : b2
      wire b2_w;
      reg b2_r;
    end
  endgenerate
endmodule
"#,
    );
    assert!(ok, "{:?}", mgr.msg_mgr().diagnostics());
    let store = mgr.store();
    let id = mgr.find_module("m").unwrap();
    let m = store.module(id);
    assert_eq!(decl_names(store, m.declhead_array), vec!["top_w"]);

    let items = store.arrays().to_vec(m.item_array);
    assert_eq!(items.len(), 1);
    let ItemKind::Generate {
        declhead_array,
        item_array,
    } = store.item(items[0]).kind
    else {
        panic!("expected a generate region");
    };
    assert!(declhead_array.is_empty());

    let blocks: Vec<(String, Vec<String>)> = store
        .arrays()
        .iter(item_array)
        .map(|i| match store.item(i).kind {
            ItemKind::GenBlock {
                name,
                declhead_array,
                ..
            } => (
                store.resolve(name.unwrap()).to_string(),
                decl_names(store, declhead_array),
            ),
            other => panic!("unexpected item {:?}", other),
        })
        .collect();
    assert_eq!(
        blocks,
        vec![
            ("b1".to_string(), vec!["b1_w".to_string()]),
            (
                "b2".to_string(),
                vec!["b2_w".to_string(), "b2_r".to_string()]
            ),
        ]
    );
}

#[test]
fn test_directives_reach_module_flags() {
    let (mgr, ok) = read(
        r#"`timescale 10us / 100ns
`default_nettype wand
`unconnected_drive pull1
`default_decay_time 50
`delay_mode_unit
`suppress_faults
`enable_portfaults
module a; endmodule
`resetall
module b; endmodule
"#,
    );
    assert!(ok, "{:?}", mgr.msg_mgr().diagnostics());
    let store = mgr.store();
    let a = store.module(mgr.find_module("a").unwrap());
    assert_eq!((a.time_unit, a.time_precision), (-5, -7));
    assert_eq!(a.net_type, NetType::Wand);
    assert_eq!(a.unconn, UnconnDrive::Pull1);
    assert_eq!(a.decay_time, 50);
    assert_eq!(a.delay_mode, DelayMode::Unit);
    assert!(a.suppress_faults);
    assert!(a.portfaults);

    let b = store.module(mgr.find_module("b").unwrap());
    assert_eq!(b.net_type, NetType::Wire);
    assert_eq!(b.decay_time, -1);
    assert!(!b.portfaults);
}

#[test]
fn test_syntax_error_does_not_stop_later_items() {
    let (mgr, ok) = read(
        r#"
module m;
  wire a;
  assign = ;
  wire b;
endmodule
module n; endmodule
"#,
    );
    assert!(!ok);
    assert_eq!(mgr.error_count(), 1);
    let d = &mgr.msg_mgr().diagnostics()[0];
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.code, "PARS");
    assert_eq!(d.region.span().start.lineno, 4);

    let store = mgr.store();
    let m = store.module(mgr.find_module("m").unwrap());
    assert_eq!(decl_names(store, m.declhead_array), vec!["a", "b"]);
    assert!(mgr.find_module("n").is_some());
}

#[test]
fn test_function_body_restrictions() {
    let (mgr, ok) = read(
        r#"
module m;
  function f;
    input x;
    begin
      #1 f = x;
      if (x) f = 0;
    end
  endfunction
endmodule
"#,
    );
    assert!(!ok);
    let errors = mgr
        .msg_mgr()
        .find("delay control statement cannot be used in function declaration.");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].region.span().start.lineno, 6);
    assert_eq!(item_kinds(mgr.store(), mgr.find_module("m").unwrap()), vec!["Function"]);
}

#[test]
fn test_duplicate_default_labels() {
    let (mgr, ok) = read(
        r#"
module m;
  reg r;
  always case (r)
    default: r = 0;
    1'b1: r = 1;
    default: r = 1;
  endcase
endmodule
"#,
    );
    assert!(!ok);
    let errors = mgr.msg_mgr().find("more than one 'default' labels.");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].region.span().start.lineno, 7);
}

#[test]
fn test_hierarchical_name_in_parameter_value() {
    let (mgr, ok) = read("module m; parameter P = top.u.Q; endmodule");
    assert!(!ok);
    assert_eq!(
        mgr.msg_mgr()
            .find("hierarchical name cannot be used in a constant expression.")
            .len(),
        1
    );
}

#[test]
fn test_generate_for_variables_must_match() {
    let (mgr, ok) = read(
        r#"
module m;
  genvar i, j;
  generate
    for (i = 0; i < 4; j = j + 1) begin : l
    end
  endgenerate
endmodule
"#,
    );
    assert!(!ok);
    assert_eq!(
        mgr.msg_mgr()
            .find("variable of the increment statement (j) does not match the variable of the initial statement (i).")
            .len(),
        1
    );
}

#[test]
fn test_mixed_connections() {
    let (mgr, ok) = read("module m; sub u0 (a, .b(c)); endmodule");
    assert!(!ok);
    assert_eq!(
        mgr.msg_mgr()
            .find("ordered and named connections cannot be mixed.")
            .len(),
        1
    );
    assert_eq!(mgr.def_names(), vec!["sub"]);
    assert_eq!(item_kinds(mgr.store(), mgr.find_module("m").unwrap()), vec!["MuInst"]);
}

#[test]
fn test_unnamed_block_declarations() {
    let (mgr, ok) = read(
        r#"
module m;
  initial begin
    reg t;
  end
  initial begin : named
    reg t;
  end
endmodule
"#,
    );
    assert!(!ok);
    let errors = mgr
        .msg_mgr()
        .find("declarations are only allowed in a named block.");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].region.span().start.lineno, 4);
    assert!(mgr.find_module("m").is_some());
}

#[test]
fn test_timing_checks_are_skipped_with_a_warning() {
    let (mgr, ok) = read(
        r#"
module m(d, clk);
  input d, clk;
  specify
    $setup(d, posedge clk, 2);
    (clk => d) = (1, 2, 3, 4);
  endspecify
endmodule
"#,
    );
    assert!(!ok);
    let msgs = mgr.msg_mgr();
    assert_eq!(msgs.warning_count(), 1);
    assert_eq!(msgs.find("timing check $setup is not supported; skipped.").len(), 1);
    assert_eq!(
        msgs.find("a path delay takes 1, 2, 3, 6 or 12 values, not 4.").len(),
        1
    );
}

#[test]
fn test_udp_table_checks() {
    let (mgr, ok) = read(
        r#"
primitive p (o, a, b);
  output o;
  input a, b;
  table
    0 0 : 0;
    1 : 1;
    1 1 : ? : 1;
  endtable
endprimitive
"#,
    );
    assert!(!ok);
    let msgs = mgr.msg_mgr();
    assert_eq!(
        msgs.find("table entry has 1 input values, but the primitive has 2 inputs.")
            .len(),
        1
    );
    assert_eq!(
        msgs.find("table entry of a combinational primitive cannot have a current-state field.")
            .len(),
        1
    );
    let udp = mgr.store().udp(mgr.find_udp("p").unwrap());
    assert_eq!(udp.entry_array.len(), 3);
}
