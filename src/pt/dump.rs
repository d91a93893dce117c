// SPDX-License-Identifier: Apache-2.0

//! Indented text rendering of registered modules and UDPs.
//!
//! Expressions are printed inline in Verilog-like syntax; every other node
//! gets its own line. The output only depends on the values read back from a
//! `PtStore`, so two backends holding the same tree render identically.

use std::fmt::Write;

use crate::file_region::FileRegion;

use super::factory::PtStore;
use super::ids::*;
use super::nodes::*;
use super::types::*;
use super::StrId;

pub struct PtDumper<'a> {
    store: &'a dyn PtStore,
    out: String,
    indent: usize,
    show_regions: bool,
}

pub fn dump_module(store: &dyn PtStore, id: ModuleId) -> String {
    let mut d = PtDumper::new(store);
    d.module(id);
    d.finish()
}

pub fn dump_udp(store: &dyn PtStore, id: UdpId) -> String {
    let mut d = PtDumper::new(store);
    d.udp(id);
    d.finish()
}

fn region_text(fr: FileRegion) -> String {
    format!("@{}", fr.to_human_string())
}

impl<'a> PtDumper<'a> {
    pub fn new(store: &'a dyn PtStore) -> Self {
        PtDumper {
            store,
            out: String::new(),
            indent: 0,
            show_regions: true,
        }
    }

    pub fn with_regions(mut self, show: bool) -> Self {
        self.show_regions = show;
        self
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn name(&self, sym: StrId) -> &'a str {
        self.store.resolve(sym)
    }

    fn line(&mut self, text: &str, fr: Option<FileRegion>) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        if let (true, Some(fr)) = (self.show_regions, fr) {
            write!(self.out, " {}", region_text(fr)).expect("write to String");
        }
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn attrs(&mut self, target: PtNodeRef) {
        let Some(array) = self.store.attr_insts(target) else {
            return;
        };
        let arrays = self.store.arrays();
        for inst in arrays.iter(array) {
            let specs: Vec<String> = arrays
                .iter(self.store.attr_inst(inst).attrspec_array)
                .map(|spec_id| {
                    let spec = self.store.attr_spec(spec_id);
                    match spec.expr {
                        Some(e) => format!("{} = {}", self.name(spec.name), self.expr(e)),
                        None => self.name(spec.name).to_string(),
                    }
                })
                .collect();
            self.line(&format!("(* {} *)", specs.join(", ")), None);
        }
    }

    pub fn module(&mut self, id: ModuleId) {
        let m = self.store.module(id);
        self.attrs(PtNodeRef::Module(id));
        self.line(&format!("Module {}", self.name(m.name)), Some(m.fr));
        self.nested(|d| {
            let mut flags = Vec::new();
            if m.is_macro {
                flags.push("macromodule");
            }
            if m.is_cell {
                flags.push("cell");
            }
            if m.is_protected {
                flags.push("protected");
            }
            if m.explicit_name {
                flags.push("explicit_name");
            }
            if m.portfaults {
                flags.push("portfaults");
            }
            if m.suppress_faults {
                flags.push("suppress_faults");
            }
            if !flags.is_empty() {
                d.line(&format!("flags: {}", flags.join(" ")), None);
            }
            if m.time_unit != TIME_UNSPECIFIED {
                d.line(
                    &format!("timescale: {} / {}", m.time_unit, m.time_precision),
                    None,
                );
            }
            d.line(
                &format!(
                    "defaults: nettype={} unconn={:?} delay_mode={:?} decay_time={}",
                    m.net_type.as_str(),
                    m.unconn,
                    m.delay_mode,
                    m.decay_time
                ),
                None,
            );
            d.line(&format!("iodecl_num: {}", m.iodecl_num), None);
            let arrays = d.store.arrays();
            for head in arrays.iter(m.paramport_array) {
                d.line("ParamPort", None);
                d.nested(|d| d.decl_head(head));
            }
            for port in arrays.iter(m.port_array) {
                d.port(port);
            }
            d.io_heads(m.iohead_array);
            d.decl_heads(m.declhead_array);
            d.items(m.item_array);
        });
    }

    pub fn udp(&mut self, id: UdpId) {
        let u = self.store.udp(id);
        self.attrs(PtNodeRef::Udp(id));
        let kind = if u.is_seq { "sequential" } else { "combinational" };
        self.line(
            &format!("Udp {} ({})", self.name(u.name), kind),
            Some(u.fr),
        );
        self.nested(|d| {
            let arrays = d.store.arrays();
            for port in arrays.iter(u.port_array) {
                d.port(port);
            }
            d.io_heads(u.iohead_array);
            if let Some(init) = u.init_value {
                d.line(&format!("initial = {}", d.expr(init)), None);
            }
            for entry_id in arrays.iter(u.entry_array) {
                let entry = d.store.udp_entry(entry_id);
                let inputs: Vec<String> = arrays
                    .iter(entry.input_array)
                    .map(|v| d.udp_value(v))
                    .collect();
                let mut text = format!("Entry {} :", inputs.join(" "));
                if let Some(cur) = entry.current {
                    write!(text, " {} :", d.udp_value(cur)).expect("write to String");
                }
                write!(text, " {}", d.udp_value(entry.output)).expect("write to String");
                d.line(&text, Some(entry.fr));
            }
        });
    }

    fn udp_value(&self, id: UdpValueId) -> String {
        match self.store.udp_value(id).symbol {
            UdpSymbol::Single(c) => (c as char).to_string(),
            UdpSymbol::Edge(a, b) => format!("({}{})", a as char, b as char),
        }
    }

    fn port(&mut self, id: PortId) {
        let p = self.store.port(id);
        let arrays = self.store.arrays();
        let refs: Vec<String> = arrays
            .iter(p.portref_array)
            .zip(arrays.iter(p.dir_array))
            .map(|(e, dir)| format!("{}:{}", self.expr(e), dir.as_str()))
            .collect();
        let ext = p.ext_name.map_or("", |n| self.name(n));
        self.line(&format!("Port {} ({})", ext, refs.join(", ")), Some(p.fr));
    }

    fn range_text(&self, range: Option<RangeBounds>) -> String {
        match range {
            Some(r) => format!(" [{}:{}]", self.expr(r.left), self.expr(r.right)),
            None => String::new(),
        }
    }

    fn strength_text(&self, strength: Option<StrengthId>) -> String {
        let Some(id) = strength else {
            return String::new();
        };
        match self.store.strength(id).spec {
            StrengthSpec::Drive(a, b) => format!(" ({}, {})", a.as_str(), b.as_str()),
            StrengthSpec::Single(a) => format!(" ({})", a.as_str()),
        }
    }

    fn delay_text(&self, delay: Option<DelayId>) -> String {
        let Some(id) = delay else {
            return String::new();
        };
        let values: Vec<String> = self
            .store
            .arrays()
            .iter(self.store.delay(id).value_array)
            .map(|e| self.expr(e))
            .collect();
        format!(" #({})", values.join(", "))
    }

    fn io_heads(&mut self, array: PtArray<IOHeadId>) {
        for head in self.store.arrays().iter(array) {
            self.io_head(head);
        }
    }

    fn io_head(&mut self, id: IOHeadId) {
        let h = self.store.io_head(id);
        self.attrs(PtNodeRef::IOHead(id));
        let aux = match h.aux {
            IOAux::None => String::new(),
            IOAux::Reg => " reg".to_string(),
            IOAux::Net(t) => format!(" {}", t.as_str()),
            IOAux::Var(t) => format!(" {}", t.as_str()),
        };
        let text = format!(
            "IOHead {}{}{}{}{}{}",
            h.dir.as_str(),
            aux,
            if h.signed { " signed" } else { "" },
            self.range_text(h.range),
            self.strength_text(h.strength),
            self.delay_text(h.delay)
        );
        self.line(&text, Some(h.fr));
        self.nested(|d| {
            for item_id in d.store.arrays().iter(h.item_array) {
                let item = d.store.io_item(item_id);
                let text = match item.init_value {
                    Some(e) => format!("IOItem {} = {}", d.name(item.name), d.expr(e)),
                    None => format!("IOItem {}", d.name(item.name)),
                };
                d.line(&text, Some(item.fr));
            }
        });
    }

    fn decl_heads(&mut self, array: PtArray<DeclHeadId>) {
        for head in self.store.arrays().iter(array) {
            self.decl_head(head);
        }
    }

    fn decl_head(&mut self, id: DeclHeadId) {
        let h = self.store.decl_head(id);
        self.attrs(PtNodeRef::DeclHead(id));
        let mut text = format!("DeclHead {}", h.decl_type.as_str());
        if let Some(t) = h.net_type {
            write!(text, " {}", t.as_str()).expect("write to String");
        }
        if let Some(t) = h.var_type {
            write!(text, " {}", t.as_str()).expect("write to String");
        }
        match h.vs_type {
            VsType::None => {}
            VsType::Vectored => text.push_str(" vectored"),
            VsType::Scalared => text.push_str(" scalared"),
        }
        if h.signed {
            text.push_str(" signed");
        }
        text.push_str(&self.range_text(h.range));
        text.push_str(&self.strength_text(h.strength));
        text.push_str(&self.delay_text(h.delay));
        self.line(&text, Some(h.fr));
        self.nested(|d| {
            let arrays = d.store.arrays();
            for item_id in arrays.iter(h.item_array) {
                let item = d.store.decl_item(item_id);
                let mut text = format!("DeclItem {}", d.name(item.name));
                for r in arrays.iter(item.range_array) {
                    let r = d.store.range(r);
                    write!(text, " [{}:{}]", d.expr(r.left), d.expr(r.right))
                        .expect("write to String");
                }
                if let Some(e) = item.init_value {
                    write!(text, " = {}", d.expr(e)).expect("write to String");
                }
                d.line(&text, Some(item.fr));
            }
        });
    }

    fn items(&mut self, array: PtArray<ItemId>) {
        for item in self.store.arrays().iter(array) {
            self.item(item);
        }
    }

    fn scope(&mut self, declheads: PtArray<DeclHeadId>, items: PtArray<ItemId>) {
        self.decl_heads(declheads);
        self.items(items);
    }

    fn item(&mut self, id: ItemId) {
        let item = self.store.item(id);
        self.attrs(PtNodeRef::Item(id));
        let fr = Some(item.fr);
        let arrays = self.store.arrays();
        match item.kind {
            ItemKind::DefParam { defparam_array } => {
                self.line("DefParam", fr);
                self.nested(|d| {
                    for dp in arrays.iter(defparam_array) {
                        let dp = d.store.def_param(dp);
                        let lhs = d.hier_text(dp.namebranch_array, dp.name);
                        d.line(&format!("{} = {}", lhs, d.expr(dp.value)), Some(dp.fr));
                    }
                });
            }
            ItemKind::ContAssign {
                strength,
                delay,
                contassign_array,
            } => {
                let text = format!(
                    "ContAssign{}{}",
                    self.strength_text(strength),
                    self.delay_text(delay)
                );
                self.line(&text, fr);
                self.nested(|d| {
                    for ca in arrays.iter(contassign_array) {
                        let ca = d.store.cont_assign(ca);
                        d.line(
                            &format!("{} = {}", d.expr(ca.lhs), d.expr(ca.rhs)),
                            Some(ca.fr),
                        );
                    }
                });
            }
            ItemKind::Initial { body } => {
                self.line("Initial", fr);
                self.nested(|d| d.stmt(body));
            }
            ItemKind::Always { body } => {
                self.line("Always", fr);
                self.nested(|d| d.stmt(body));
            }
            ItemKind::Task {
                name,
                automatic,
                iohead_array,
                declhead_array,
                body,
            } => {
                let auto = if automatic { " automatic" } else { "" };
                self.line(&format!("Task{} {}", auto, self.name(name)), fr);
                self.nested(|d| {
                    d.io_heads(iohead_array);
                    d.decl_heads(declhead_array);
                    d.stmt(body);
                });
            }
            ItemKind::Function {
                name,
                automatic,
                signed,
                range,
                var_type,
                iohead_array,
                declhead_array,
                body,
            } => {
                let mut text = String::from("Function");
                if automatic {
                    text.push_str(" automatic");
                }
                if signed {
                    text.push_str(" signed");
                }
                text.push_str(&self.range_text(range));
                if let Some(t) = var_type {
                    write!(text, " {}", t.as_str()).expect("write to String");
                }
                write!(text, " {}", self.name(name)).expect("write to String");
                self.line(&text, fr);
                self.nested(|d| {
                    d.io_heads(iohead_array);
                    d.decl_heads(declhead_array);
                    d.stmt(body);
                });
            }
            ItemKind::GateInst {
                gate,
                strength,
                delay,
                inst_array,
            } => {
                let text = format!(
                    "GateInst {}{}{}",
                    gate.as_str(),
                    self.strength_text(strength),
                    self.delay_text(delay)
                );
                self.line(&text, fr);
                self.nested(|d| d.insts(inst_array));
            }
            ItemKind::MuInst {
                def_name,
                strength,
                delay,
                paramcon_array,
                inst_array,
            } => {
                let mut text = format!(
                    "MuInst {}{}{}",
                    self.name(def_name),
                    self.strength_text(strength),
                    self.delay_text(delay)
                );
                if !paramcon_array.is_empty() {
                    write!(text, " #({})", self.connections(paramcon_array))
                        .expect("write to String");
                }
                self.line(&text, fr);
                self.nested(|d| d.insts(inst_array));
            }
            ItemKind::Generate {
                declhead_array,
                item_array,
            } => {
                self.line("Generate", fr);
                self.nested(|d| d.scope(declhead_array, item_array));
            }
            ItemKind::GenBlock {
                name,
                declhead_array,
                item_array,
            } => {
                let text = match name {
                    Some(n) => format!("GenBlock {}", self.name(n)),
                    None => "GenBlock".to_string(),
                };
                self.line(&text, fr);
                self.nested(|d| d.scope(declhead_array, item_array));
            }
            ItemKind::GenIf {
                cond,
                then_declhead_array,
                then_item_array,
                has_else,
                else_declhead_array,
                else_item_array,
            } => {
                self.line(&format!("GenIf {}", self.expr(cond)), fr);
                self.nested(|d| {
                    d.line("then", None);
                    d.nested(|d| d.scope(then_declhead_array, then_item_array));
                    if has_else {
                        d.line("else", None);
                        d.nested(|d| d.scope(else_declhead_array, else_item_array));
                    }
                });
            }
            ItemKind::GenCase {
                expr,
                caseitem_array,
            } => {
                self.line(&format!("GenCase {}", self.expr(expr)), fr);
                self.nested(|d| {
                    for ci in arrays.iter(caseitem_array) {
                        let ci = d.store.gen_case_item(ci);
                        let label = d.labels(ci.label_array);
                        d.line(&format!("{}:", label), Some(ci.fr));
                        d.nested(|d| d.scope(ci.declhead_array, ci.item_array));
                    }
                });
            }
            ItemKind::GenFor {
                loop_var,
                init_expr,
                cond,
                next_expr,
                block_name,
                declhead_array,
                item_array,
            } => {
                let var = self.name(loop_var);
                let block = block_name.map_or("", |n| self.name(n));
                let text = format!(
                    "GenFor ({} = {}; {}; {} = {}) {}",
                    var,
                    self.expr(init_expr),
                    self.expr(cond),
                    var,
                    self.expr(next_expr),
                    block
                );
                self.line(&text, fr);
                self.nested(|d| d.scope(declhead_array, item_array));
            }
            ItemKind::SpecItem {
                spec_type,
                terminal_array,
            } => {
                let terms: Vec<String> = arrays
                    .iter(terminal_array)
                    .map(|e| self.expr(e))
                    .collect();
                self.line(
                    &format!("SpecItem {:?} {}", spec_type, terms.join(", ")),
                    fr,
                );
            }
            ItemKind::SpecPath {
                path_type,
                cond,
                path_decl,
            } => {
                let mut text = format!("SpecPath {:?}", path_type);
                if let Some(c) = cond {
                    write!(text, " ({})", self.expr(c)).expect("write to String");
                }
                self.line(&text, fr);
                self.nested(|d| d.path_decl(path_decl));
            }
        }
    }

    fn path_decl(&mut self, id: PathDeclId) {
        let p = self.store.path_decl(id);
        let arrays = self.store.arrays();
        let list = |a: PtArray<ExprId>| -> String {
            arrays
                .iter(a)
                .map(|e| self.expr(e))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let pol = |p: Polarity| match p {
            Polarity::Unknown => "",
            Polarity::Positive => "+",
            Polarity::Negative => "-",
        };
        let edge = match p.edge {
            PathEdge::NoEdge => "",
            PathEdge::Posedge => "posedge ",
            PathEdge::Negedge => "negedge ",
        };
        let arrow = match p.path_type {
            PathType::Parallel => "=>",
            PathType::Full => "*>",
        };
        let outputs = match p.expr {
            Some(e) => format!("({} {}: {})", list(p.output_array), pol(p.output_pol), self.expr(e)),
            None => format!("{}{}", pol(p.output_pol), list(p.output_array)),
        };
        let delays = list(self.store.path_delay(p.path_delay).value_array);
        let text = format!(
            "PathDecl ({}{} {}{} {}) = ({})",
            edge,
            list(p.input_array),
            pol(p.input_pol),
            arrow,
            outputs,
            delays
        );
        self.line(&text, Some(p.fr));
    }

    fn connections(&self, array: PtArray<ConnectionId>) -> String {
        self.store
            .arrays()
            .iter(array)
            .map(|c| {
                let c = self.store.connection(c);
                let e = c.expr.map_or(String::new(), |e| self.expr(e));
                match c.name {
                    Some(n) => format!(".{}({})", self.name(n), e),
                    None => e,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insts(&mut self, array: PtArray<InstId>) {
        for inst_id in self.store.arrays().iter(array) {
            let inst = self.store.inst(inst_id);
            let name = inst.name.map_or("", |n| self.name(n));
            let text = format!(
                "Inst {}{} ({})",
                name,
                self.range_text(inst.range),
                self.connections(inst.port_array)
            );
            self.line(&text, Some(inst.fr));
        }
    }

    fn labels(&self, array: PtArray<ExprId>) -> String {
        if array.is_empty() {
            return "default".to_string();
        }
        self.store
            .arrays()
            .iter(array)
            .map(|e| self.expr(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn control_text(&self, id: ControlId) -> String {
        let c = self.store.control(id);
        let events = |a: PtArray<ExprId>| -> String {
            if a.is_empty() {
                "@*".to_string()
            } else {
                let list: Vec<String> =
                    self.store.arrays().iter(a).map(|e| self.expr(e)).collect();
                format!("@({})", list.join(" or "))
            }
        };
        match c.kind {
            ControlKind::Delay { value } => format!("#{}", self.expr(value)),
            ControlKind::Event { event_array } => events(event_array),
            ControlKind::Repeat { rep, event_array } => {
                format!("repeat ({}) {}", self.expr(rep), events(event_array))
            }
        }
    }

    fn args_text(&self, array: PtArray<ExprId>) -> String {
        self.store
            .arrays()
            .iter(array)
            .map(|e| self.expr(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn stmt(&mut self, id: StmtId) {
        let s = self.store.stmt(id);
        self.attrs(PtNodeRef::Stmt(id));
        let fr = Some(s.fr);
        let arrays = self.store.arrays();
        match s.kind {
            StmtKind::Disable {
                namebranch_array,
                name,
            } => {
                let text = format!("Disable {}", self.hier_text(namebranch_array, name));
                self.line(&text, fr);
            }
            StmtKind::Enable {
                namebranch_array,
                name,
                arg_array,
            } => {
                let text = format!(
                    "Enable {}({})",
                    self.hier_text(namebranch_array, name),
                    self.args_text(arg_array)
                );
                self.line(&text, fr);
            }
            StmtKind::SysEnable { name, arg_array } => {
                let text = format!("SysEnable {}({})", self.name(name), self.args_text(arg_array));
                self.line(&text, fr);
            }
            StmtKind::DelayControl { control, body }
            | StmtKind::EventControl { control, body } => {
                self.line(&format!("Control {}", self.control_text(control)), fr);
                self.nested(|d| d.stmt(body));
            }
            StmtKind::Wait { cond, body } => {
                self.line(&format!("Wait {}", self.expr(cond)), fr);
                self.nested(|d| d.stmt(body));
            }
            StmtKind::Assign { lhs, rhs, control } | StmtKind::NbAssign { lhs, rhs, control } => {
                let op = if matches!(s.kind, StmtKind::Assign { .. }) {
                    "="
                } else {
                    "<="
                };
                let ctrl = control.map_or(String::new(), |c| format!("{} ", self.control_text(c)));
                let text = format!("Assign {} {} {}{}", self.expr(lhs), op, ctrl, self.expr(rhs));
                self.line(&text, fr);
            }
            StmtKind::Event { event } => {
                self.line(&format!("Trigger {}", self.expr(event)), fr);
            }
            StmtKind::Null => self.line("Null", fr),
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                self.line(&format!("If {}", self.expr(cond)), fr);
                self.nested(|d| {
                    d.stmt(then_body);
                    if let Some(e) = else_body {
                        d.line("else", None);
                        d.stmt(e);
                    }
                });
            }
            StmtKind::Case {
                case_type,
                expr,
                caseitem_array,
            } => {
                self.line(&format!("{} {}", case_type.as_str(), self.expr(expr)), fr);
                self.nested(|d| {
                    for ci in arrays.iter(caseitem_array) {
                        let ci = d.store.case_item(ci);
                        d.line(&format!("{}:", d.labels(ci.label_array)), Some(ci.fr));
                        d.nested(|d| d.stmt(ci.body));
                    }
                });
            }
            StmtKind::Forever { body } => {
                self.line("Forever", fr);
                self.nested(|d| d.stmt(body));
            }
            StmtKind::Repeat { expr, body } => {
                self.line(&format!("Repeat {}", self.expr(expr)), fr);
                self.nested(|d| d.stmt(body));
            }
            StmtKind::While { cond, body } => {
                self.line(&format!("While {}", self.expr(cond)), fr);
                self.nested(|d| d.stmt(body));
            }
            StmtKind::For {
                init,
                cond,
                next,
                body,
            } => {
                self.line(&format!("For {}", self.expr(cond)), fr);
                self.nested(|d| {
                    d.stmt(init);
                    d.stmt(next);
                    d.stmt(body);
                });
            }
            StmtKind::PcAssign { lhs, rhs } => {
                let text = format!("PcAssign {} = {}", self.expr(lhs), self.expr(rhs));
                self.line(&text, fr);
            }
            StmtKind::Deassign { lhs } => {
                self.line(&format!("Deassign {}", self.expr(lhs)), fr);
            }
            StmtKind::Force { lhs, rhs } => {
                let text = format!("Force {} = {}", self.expr(lhs), self.expr(rhs));
                self.line(&text, fr);
            }
            StmtKind::Release { lhs } => {
                self.line(&format!("Release {}", self.expr(lhs)), fr);
            }
            StmtKind::ParBlock {
                name,
                declhead_array,
                stmt_array,
            }
            | StmtKind::SeqBlock {
                name,
                declhead_array,
                stmt_array,
            } => {
                let kind = if matches!(s.kind, StmtKind::ParBlock { .. }) {
                    "ParBlock"
                } else {
                    "SeqBlock"
                };
                let text = match name {
                    Some(n) => format!("{} {}", kind, self.name(n)),
                    None => kind.to_string(),
                };
                self.line(&text, fr);
                self.nested(|d| {
                    d.decl_heads(declhead_array);
                    for st in arrays.iter(stmt_array) {
                        d.stmt(st);
                    }
                });
            }
        }
    }

    fn hier_text(&self, branches: PtArray<NameBranchId>, name: StrId) -> String {
        let mut text = String::new();
        for b in self.store.arrays().iter(branches) {
            let b = self.store.name_branch(b);
            text.push_str(self.name(b.name));
            if let Some(i) = b.index {
                write!(text, "[{}]", i).expect("write to String");
            }
            text.push('.');
        }
        text.push_str(self.name(name));
        text
    }

    /// Inline rendering of an expression tree.
    pub fn expr(&self, id: ExprId) -> String {
        let e = self.store.expr(id);
        let arrays = self.store.arrays();
        match e.kind {
            ExprKind::Opr { op, operand_array } => {
                let ops: Vec<String> = arrays.iter(operand_array).map(|o| self.expr(o)).collect();
                match (op, ops.as_slice()) {
                    (OpType::Posedge | OpType::Negedge, [a]) => format!("{} {}", op.as_str(), a),
                    (_, [a]) => format!("({}{})", op.as_str(), a),
                    (OpType::Condition, [c, a, b]) => format!("({} ? {} : {})", c, a, b),
                    (_, [a, b]) => format!("({} {} {})", a, op.as_str(), b),
                    _ => format!("{}<{}>", op.as_str(), ops.join(", ")),
                }
            }
            ExprKind::Concat { operand_array } => {
                format!("{{{}}}", self.args_text(operand_array))
            }
            ExprKind::MultiConcat { operand_array } => {
                let ops: Vec<String> = arrays.iter(operand_array).map(|o| self.expr(o)).collect();
                match ops.split_first() {
                    Some((rep, rest)) => format!("{{{}{{{}}}}}", rep, rest.join(", ")),
                    None => "{}".to_string(),
                }
            }
            ExprKind::MinTypMax { min, typ, max } => format!(
                "({}:{}:{})",
                self.expr(min),
                self.expr(typ),
                self.expr(max)
            ),
            ExprKind::Primary {
                namebranch_array,
                name,
                index_array,
                select,
                ..
            } => {
                let mut text = self.hier_text(namebranch_array, name);
                for i in arrays.iter(index_array) {
                    write!(text, "[{}]", self.expr(i)).expect("write to String");
                }
                if let Some(sel) = select {
                    let sep = match sel.mode {
                        RangeMode::Const => ":",
                        RangeMode::Plus => "+:",
                        RangeMode::Minus => "-:",
                    };
                    write!(text, "[{}{}{}]", self.expr(sel.left), sep, self.expr(sel.right))
                        .expect("write to String");
                }
                text
            }
            ExprKind::FuncCall {
                namebranch_array,
                name,
                arg_array,
            } => format!(
                "{}({})",
                self.hier_text(namebranch_array, name),
                self.args_text(arg_array)
            ),
            ExprKind::SysFuncCall { name, arg_array } => {
                if arg_array.is_empty() {
                    self.name(name).to_string()
                } else {
                    format!("{}({})", self.name(name), self.args_text(arg_array))
                }
            }
            ExprKind::UintConst { value } => value.to_string(),
            ExprKind::BasedConst {
                size,
                signed,
                radix,
                digits,
            } => format!(
                "{}'{}{}{}",
                size.map_or(String::new(), |s| s.to_string()),
                if signed { "s" } else { "" },
                radix.as_char(),
                self.name(digits)
            ),
            ExprKind::RealConst { value } => format!("{:?}", value),
            ExprKind::StringConst { value } => format!("\"{}\"", self.name(value)),
        }
    }
}
