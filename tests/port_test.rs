// SPDX-License-Identifier: Apache-2.0

//! Port lists, IO declarations and their reconciliation.

use pretty_assertions::assert_eq;
use test_case::test_case;
use vlpt::pt::{Direction, PtStore};
use vlpt::{BackendKind, PtMgr, PtMgrOptions};

fn read(backend: BackendKind, src: &str) -> (PtMgr, bool) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mgr = PtMgr::new(PtMgrOptions { backend });
    let ok = mgr.read_str("test.v", src);
    (mgr, ok)
}

fn port_names(store: &dyn PtStore, module: vlpt::pt::ModuleId) -> Vec<String> {
    let m = store.module(module);
    store
        .arrays()
        .iter(m.port_array)
        .map(|p| match store.port(p).ext_name {
            Some(name) => store.resolve(name).to_string(),
            None => "<none>".to_string(),
        })
        .collect()
}

#[test_case(BackendKind::Straightforward; "straightforward")]
#[test_case(BackendKind::Compact; "compact")]
fn test_plain_ports_reconcile(backend: BackendKind) {
    let (mgr, ok) = read(backend, "module m(a,b); input a; output b; endmodule");
    assert!(ok, "{:?}", mgr.msg_mgr().diagnostics());
    assert_eq!(mgr.error_count(), 0);
    assert_eq!(mgr.module_list().len(), 1);

    let store = mgr.store();
    let id = mgr.find_module("m").unwrap();
    let m = store.module(id);
    assert_eq!(m.port_array.len(), 2);
    assert_eq!(m.iodecl_num, 2);
    assert!(m.explicit_name);

    let dirs: Vec<Direction> = store
        .arrays()
        .iter(m.port_array)
        .flat_map(|p| store.arrays().to_vec(store.port(p).dir_array))
        .collect();
    assert_eq!(dirs, vec![Direction::Input, Direction::Output]);
}

#[test_case(BackendKind::Straightforward; "straightforward")]
#[test_case(BackendKind::Compact; "compact")]
fn test_redefined_io_still_registers_module(backend: BackendKind) {
    let (mgr, ok) = read(backend, "module m(a); input a; input a; endmodule");
    assert!(!ok);
    let redefined = mgr.msg_mgr().find("redefined");
    assert_eq!(redefined.len(), 1);
    assert_eq!(redefined[0].code, "PORT");
    assert_eq!(redefined[0].region.span().start.lineno, 1);

    let id = mgr.find_module("m").expect("best-effort module registered");
    assert_eq!(mgr.store().module(id).iodecl_num, 2);
}

#[test]
fn test_port_without_io_declaration() {
    let (mgr, ok) = read(BackendKind::default(), "module m(a); output a; endmodule");
    assert!(ok);
    assert!(mgr.msg_mgr().diagnostics().is_empty());

    let (mgr, ok) = read(BackendKind::default(), "module m(a); endmodule");
    assert!(!ok);
    let errors = mgr.msg_mgr().find("is not defined in the port list");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("\"a\""));

    let id = mgr.find_module("m").unwrap();
    let store = mgr.store();
    let port = store.port(store.arrays().to_vec(store.module(id).port_array)[0]);
    assert_eq!(
        store.arrays().to_vec(port.dir_array),
        vec![Direction::NoDirection]
    );
}

#[test]
fn test_io_declaration_without_port() {
    let (mgr, ok) = read(
        BackendKind::default(),
        "module m(a);\n  input a;\n  output b, c;\nendmodule\n",
    );
    assert!(!ok);
    let msgs: Vec<&str> = mgr
        .msg_mgr()
        .diagnostics()
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(
        msgs,
        vec![
            "\"b\" is declared as output, but it does not appear in the port list.",
            "\"c\" is declared as output, but it does not appear in the port list.",
        ]
    );
    assert_eq!(mgr.msg_mgr().diagnostics()[0].region.span().start.lineno, 3);
}

#[test_case(BackendKind::Straightforward; "straightforward")]
#[test_case(BackendKind::Compact; "compact")]
fn test_ansi_ports_follow_io_items(backend: BackendKind) {
    let (mgr, ok) = read(
        backend,
        "module m(input wire [3:0] a, b, output reg y = 1'b0, inout z); endmodule",
    );
    assert!(ok, "{:?}", mgr.msg_mgr().diagnostics());
    let store = mgr.store();
    let id = mgr.find_module("m").unwrap();
    assert_eq!(port_names(store, id), vec!["a", "b", "y", "z"]);

    let m = store.module(id);
    assert_eq!(m.iohead_array.len(), 3);
    assert_eq!(m.iodecl_num, 4);
    assert!(m.explicit_name);
    let dirs: Vec<Direction> = store
        .arrays()
        .iter(m.port_array)
        .map(|p| store.arrays().to_vec(store.port(p).dir_array)[0])
        .collect();
    assert_eq!(
        dirs,
        vec![
            Direction::Input,
            Direction::Input,
            Direction::Output,
            Direction::Inout
        ]
    );
}

#[test]
fn test_ansi_ports_reject_body_io() {
    let (mgr, ok) = read(
        BackendKind::default(),
        "module m(input a); output b; endmodule",
    );
    assert!(!ok);
    assert_eq!(
        mgr.msg_mgr()
            .find("IO declarations are not allowed when the port list declares the ports.")
            .len(),
        1
    );
    assert!(mgr.find_module("m").is_some());
}

#[test]
fn test_named_and_empty_ports() {
    let (mgr, ok) = read(
        BackendKind::default(),
        "module m(.x(a), , .y(), {c, d}); input a, c; output d; endmodule",
    );
    assert!(ok, "{:?}", mgr.msg_mgr().diagnostics());
    let store = mgr.store();
    let id = mgr.find_module("m").unwrap();
    assert_eq!(port_names(store, id), vec!["x", "<none>", "y", "<none>"]);
    assert!(!store.module(id).explicit_name);

    let ports = store.arrays().to_vec(store.module(id).port_array);
    assert_eq!(store.port(ports[1]).portref, None);
    assert_eq!(store.port(ports[2]).portref_array.len(), 0);
    assert_eq!(store.port(ports[3]).portref_array.len(), 2);
}

#[test]
fn test_output_reg_initial_value_only() {
    let (mgr, ok) = read(
        BackendKind::default(),
        "module m(a, q); input a = 1; output reg q = 0; endmodule",
    );
    assert!(!ok);
    assert_eq!(
        mgr.msg_mgr()
            .find("only an output reg can have an initial value.")
            .len(),
        1
    );
}
