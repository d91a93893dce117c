// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use vlpt::{PtMgr, PtMgrOptions, Severity};

#[test]
fn test_read_file() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut file = tempfile::Builder::new()
        .suffix(".v")
        .tempfile()
        .unwrap();
    writeln!(file, "module from_file(a, y);").unwrap();
    writeln!(file, "  input a;").unwrap();
    writeln!(file, "  output y;").unwrap();
    writeln!(file, "  assign y = ~a;").unwrap();
    writeln!(file, "endmodule").unwrap();
    file.flush().unwrap();

    let mut mgr = PtMgr::new(PtMgrOptions::default());
    assert!(mgr.read_file(file.path()).unwrap());
    let id = mgr.find_module("from_file").unwrap();
    let fr = mgr.store().module(id).fr;
    assert_eq!(
        mgr.file_name(fr.file),
        Some(file.path().display().to_string().as_str())
    );
    assert_eq!(fr.span().start.lineno, 1);
    assert_eq!(fr.span().limit.lineno, 5);
}

#[test]
fn test_read_missing_file() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.v");

    let mut mgr = PtMgr::new(PtMgrOptions::default());
    let err = mgr.read_file(&path).unwrap_err();
    let expected = format!("{} : No such file.", path.display());
    assert_eq!(err.0, expected);

    let diags = mgr.msg_mgr().diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Failure);
    assert_eq!(diags[0].code, "VLPARSER");
    assert_eq!(diags[0].message, expected);
    assert_eq!(mgr.error_count(), 1);
    assert!(mgr.module_list().is_empty());
}

#[test]
fn test_read_latin1_file() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut file = tempfile::Builder::new()
        .suffix(".v")
        .tempfile()
        .unwrap();
    file.write_all(b"// caf\xe9 au lait\nmodule latin1(a);\n  input a;\nendmodule\n")
        .unwrap();
    file.flush().unwrap();

    let mut mgr = PtMgr::new(PtMgrOptions::default());
    assert!(mgr.read_file(file.path()).unwrap(), "{:?}", mgr.msg_mgr().diagnostics());
    assert_eq!(mgr.error_count(), 0);
    let id = mgr.find_module("latin1").unwrap();
    assert_eq!(mgr.store().module(id).fr.span().start.lineno, 2);
}
