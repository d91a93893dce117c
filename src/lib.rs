// SPDX-License-Identifier: Apache-2.0

//! Builds immutable parse trees from Verilog-HDL source text.
//!
//! ```no_run
//! use vlpt::{PtMgr, PtMgrOptions};
//!
//! let mut mgr = PtMgr::new(PtMgrOptions::default());
//! let ok = mgr.read_str("top.v", "module top(a); input a; endmodule");
//! assert!(ok);
//! let top = mgr.find_module("top").unwrap();
//! println!("{}", vlpt::pt::dump::dump_module(mgr.store(), top));
//! ```

pub mod file_region;
pub mod msg;
pub mod parser;
pub mod pt;
pub mod pt_mgr;
pub mod scanner;
pub mod token;
pub mod vlpt_error;

pub use file_region::{FileId, FileRegion, Pos, Span};
pub use msg::{Diagnostic, MsgHandler, MsgMgr, Severity};
pub use parser::{PResult, Parser, SyntaxError};
pub use pt::{new_backend, BackendKind, PtBackend, PtFactory, PtStore};
pub use pt_mgr::{ModuleRegistry, PtMgr, PtMgrOptions, PtRegistry};
pub use vlpt_error::VlptError;
