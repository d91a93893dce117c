// SPDX-License-Identifier: Apache-2.0

//! Parsing session: owns the node backend, the diagnostics, the registry of
//! parsed units and the table of source names.

use std::collections::HashSet;
use std::path::Path;

use crate::file_region::{FileId, FileRegion, FileTable, Pos, Span};
use crate::msg::{code, MsgHandler, MsgMgr, Severity};
use crate::parser::Parser;
use crate::pt::dump::{dump_module, dump_udp};
use crate::pt::{new_backend, BackendKind, ModuleId, PtBackend, PtStore, StrId, UdpId};
use crate::scanner::TokenScanner;
use crate::vlpt_error::VlptError;

/// Receives every unit the parser completes and every definition name used
/// by an instantiation.
pub trait PtRegistry {
    fn register_module(&mut self, id: ModuleId);
    fn register_udp(&mut self, id: UdpId);
    fn register_default_name(&mut self, name: StrId);
}

/// Registry that records units in parse order and definition names once.
#[derive(Debug, Default, Clone)]
pub struct ModuleRegistry {
    modules: Vec<ModuleId>,
    udps: Vec<UdpId>,
    def_names: Vec<StrId>,
    seen_def_names: HashSet<StrId>,
}

impl ModuleRegistry {
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn udps(&self) -> &[UdpId] {
        &self.udps
    }

    /// Instantiated definition names in first-use order.
    pub fn def_names(&self) -> &[StrId] {
        &self.def_names
    }
}

impl PtRegistry for ModuleRegistry {
    fn register_module(&mut self, id: ModuleId) {
        self.modules.push(id);
    }

    fn register_udp(&mut self, id: UdpId) {
        self.udps.push(id);
    }

    fn register_default_name(&mut self, name: StrId) {
        if self.seen_def_names.insert(name) {
            self.def_names.push(name);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PtMgrOptions {
    pub backend: BackendKind,
}

pub struct PtMgr {
    backend: Box<dyn PtBackend>,
    msg_mgr: MsgMgr,
    registry: ModuleRegistry,
    files: FileTable,
}

impl PtMgr {
    pub fn new(options: PtMgrOptions) -> Self {
        log::debug!("PtMgr::new: backend {}", options.backend);
        PtMgr {
            backend: new_backend(options.backend),
            msg_mgr: MsgMgr::new(),
            registry: ModuleRegistry::default(),
            files: FileTable::default(),
        }
    }

    /// Parses `text` as the source unit `name`. Returns `true` when the unit
    /// produced no errors.
    pub fn read_str(&mut self, name: &str, text: &str) -> bool {
        let file = self.files.add(name);
        let scanner = TokenScanner::from_str(file, text);
        self.parse(name, scanner)
    }

    /// Parses the file at `path`. A file that cannot be opened or read is
    /// reported as a failure and returned as an error.
    pub fn read_file(&mut self, path: &Path) -> Result<bool, VlptError> {
        let name = path.display().to_string();
        let file = self.files.add(&name);
        let at = Pos::new(1, 1);
        let region = FileRegion::new(file, Span::new(at, at));
        let opened = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) => {
                log::debug!("read_file: {}: {}", name, e);
                let message = format!("{} : No such file.", name);
                self.msg_mgr
                    .report(region, Severity::Failure, code::VLPARSER, &message);
                return Err(VlptError(message));
            }
        };
        let scanner = match TokenScanner::from_reader(file, std::io::BufReader::new(opened)) {
            Ok(scanner) => scanner,
            Err(e) => {
                let message = format!("{} : read error: {}", name, e);
                self.msg_mgr
                    .report(region, Severity::Failure, code::VLPARSER, &message);
                return Err(VlptError(message));
            }
        };
        Ok(self.parse(&name, scanner))
    }

    fn parse(&mut self, name: &str, scanner: TokenScanner) -> bool {
        log::trace!("parsing {}", name);
        let mut parser = Parser::new(
            scanner,
            self.backend.as_mut(),
            &mut self.msg_mgr,
            &mut self.registry,
        );
        let ok = parser.parse_source();
        let errors = parser.error_count();
        log::debug!(
            "{}: {} error(s); {} module(s), {} primitive(s) registered so far",
            name,
            errors,
            self.registry.modules().len(),
            self.registry.udps().len()
        );
        ok
    }

    pub fn store(&self) -> &dyn PtStore {
        self.backend.as_store()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn module_list(&self) -> &[ModuleId] {
        self.registry.modules()
    }

    pub fn udp_list(&self) -> &[UdpId] {
        self.registry.udps()
    }

    /// The most recently registered module called `name`.
    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        let sym = self.backend.lookup(name)?;
        self.registry
            .modules()
            .iter()
            .rev()
            .copied()
            .find(|&id| self.backend.module(id).name == sym)
    }

    pub fn find_udp(&self, name: &str) -> Option<UdpId> {
        let sym = self.backend.lookup(name)?;
        self.registry
            .udps()
            .iter()
            .rev()
            .copied()
            .find(|&id| self.backend.udp(id).name == sym)
    }

    /// Definition names used by instantiations, resolved to text.
    pub fn def_names(&self) -> Vec<&str> {
        self.registry
            .def_names()
            .iter()
            .map(|&sym| self.backend.resolve(sym))
            .collect()
    }

    pub fn msg_mgr(&self) -> &MsgMgr {
        &self.msg_mgr
    }

    pub fn error_count(&self) -> usize {
        self.msg_mgr.error_count()
    }

    pub fn file_name(&self, id: FileId) -> Option<&str> {
        self.files.name(id)
    }

    pub fn describe(&self, region: FileRegion) -> String {
        self.files.describe(region)
    }

    /// Indented rendering of every registered module and primitive.
    pub fn dump(&self) -> String {
        let store = self.store();
        let mut out = String::new();
        for &id in self.registry.udps() {
            out.push_str(&dump_udp(store, id));
        }
        for &id in self.registry.modules() {
            out.push_str(&dump_module(store, id));
        }
        out
    }
}

impl Default for PtMgr {
    fn default() -> Self {
        PtMgr::new(PtMgrOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_are_deduplicated() {
        let mut mgr = PtMgr::default();
        assert!(mgr.read_str(
            "top.v",
            "module top; sub u0(); sub u1(); leaf u2(); sub u3(); endmodule"
        ));
        assert_eq!(mgr.def_names(), vec!["sub", "leaf"]);
    }

    #[test]
    fn test_find_module_and_file_name() {
        let mut mgr = PtMgr::new(PtMgrOptions {
            backend: BackendKind::Straightforward,
        });
        assert!(mgr.read_str("a.v", "module a; endmodule"));
        assert!(mgr.read_str("b.v", "module b; endmodule"));
        let b = mgr.find_module("b").expect("b registered");
        let fr = mgr.store().module(b).fr;
        assert_eq!(mgr.file_name(fr.file), Some("b.v"));
        assert_eq!(mgr.find_module("c"), None);
        assert_eq!(mgr.backend_kind(), BackendKind::Straightforward);
    }
}
