// SPDX-License-Identifier: Apache-2.0

//! Source units: modules and UDPs, their port lists and the reconciliation
//! of ports against IO declarations.

use std::collections::{HashMap, HashSet};

use crate::file_region::{FileRegion, Span};
use crate::pt::{
    AttrInstId, Direction, ExprId, ExprKind, IOAux, IOHeadId, ModuleSpec, PortId, PtArray,
    PtExpr, PtNodeRef, PtPort, PtUdp, PtUdpEntry, PtUdpValue, StrId, UdpEntryId,
    UdpSymbol, UdpValueId,
};
use crate::token::{Keyword, TokenPayload};

use super::context::FrameKind;
use super::decl::direction_of;
use super::item::ItemCtx;
use super::{PResult, Parser};

/// Port of a port list whose directions are not known until the body's IO
/// declarations have been read.
#[derive(Debug)]
struct PendingPort {
    fr: FileRegion,
    ext_name: Option<StrId>,
    portref: Option<ExprId>,
    refs: Vec<PortRef>,
}

#[derive(Debug, Clone, Copy)]
struct PortRef {
    expr: ExprId,
    name: StrId,
    fr: FileRegion,
}

#[derive(Debug)]
enum PortList {
    /// Ports declared in the header; one port per IO item.
    Ansi,
    Plain(Vec<PendingPort>),
}

#[derive(Debug)]
struct UdpBody {
    ports: PortList,
    is_seq: bool,
    init_value: Option<ExprId>,
    entry_array: PtArray<UdpEntryId>,
}

impl<'a> Parser<'a> {
    /// Parses every module and UDP in the source. Returns `true` when no
    /// error was reported.
    pub fn parse_source(&mut self) -> bool {
        let errors_before = self.error_count;
        loop {
            match self.parse_description() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.report_syntax(e);
                    if let Err(e) = self.recover_description() {
                        self.report_syntax(e);
                        break;
                    }
                }
            }
        }
        self.flush_scan_diags();
        assert_eq!(self.frame_depth(), 0, "build-context frames left open");
        self.error_count == errors_before
    }

    fn parse_description(&mut self) -> PResult<bool> {
        let attrs = self.parse_attrs()?;
        match self.peek_kw()? {
            Some(Keyword::Module | Keyword::Macromodule) => {
                self.parse_module(attrs)?;
                Ok(true)
            }
            Some(Keyword::Primitive) => {
                self.parse_udp(attrs)?;
                Ok(true)
            }
            _ if attrs.is_empty() && self.at_eof()? => Ok(false),
            _ => Err(self.unexpected("'module' or 'primitive'")),
        }
    }

    /// Skips to the next source unit.
    fn recover_description(&mut self) -> PResult<()> {
        loop {
            match self.peek_kw()? {
                Some(Keyword::Module | Keyword::Macromodule | Keyword::Primitive) => return Ok(()),
                Some(Keyword::Endmodule | Keyword::Endprimitive) => {
                    self.pop()?;
                    return Ok(());
                }
                _ => {}
            }
            if self.at_eof()? {
                return Ok(());
            }
            self.pop()?;
        }
    }

    fn parse_module(&mut self, attrs: PtArray<AttrInstId>) -> PResult<()> {
        let start = self.start_pos()?;
        let is_macro = self.pop()?.is_keyword(Keyword::Macromodule);
        let directives = *self.scanner.directives();
        let (name, _) = self.expect_ident()?;
        log::trace!("parse_module: {}", self.backend.resolve(name));

        let (result, frame) = self.with_frame(FrameKind::Module, |p| p.parse_module_body());
        let ports = result?;
        let port_array = self.finish_ports(ports, &frame.io_heads);
        let explicit_name = self
            .backend
            .arrays()
            .iter(port_array)
            .all(|port| self.backend.port(port).ext_name.is_some());

        let spec = ModuleSpec {
            fr: self.close(start),
            name,
            is_macro,
            is_cell: directives.cell_define,
            is_protected: directives.protected,
            time_unit: directives.time_unit,
            time_precision: directives.time_precision,
            net_type: directives.default_nettype,
            unconn: directives.unconn_drive,
            delay_mode: directives.delay_mode,
            decay_time: directives.decay_time,
            explicit_name,
            portfaults: directives.portfaults,
            suppress_faults: directives.suppress_faults,
            config: None,
            library: None,
            cell: None,
            paramport_array: self.alloc(&frame.paramport_heads),
            port_array,
            iohead_array: self.alloc(&frame.io_heads),
            declhead_array: self.alloc(&frame.decl_heads),
            item_array: self.alloc(&frame.items),
        };
        let id = self.backend.new_module(spec);
        if !attrs.is_empty() {
            self.backend.reg_attrinst(PtNodeRef::Module(id), attrs);
        }
        self.registry.register_module(id);
        log::debug!(
            "module {} registered: {} ports, {} items",
            self.backend.resolve(name),
            port_array.len(),
            frame.items.len()
        );
        Ok(())
    }

    fn parse_module_body(&mut self) -> PResult<PortList> {
        if self.at(&TokenPayload::Hash)? {
            self.parse_param_port_list()?;
        }
        let ports = self.parse_header_ports()?;
        self.expect(TokenPayload::Semi)?;
        self.parse_item_list(&[Keyword::Endmodule], ItemCtx::MODULE)?;
        self.expect_kw(Keyword::Endmodule)?;
        Ok(ports)
    }

    /// `( ... )` after a module or UDP name, in either style.
    fn parse_header_ports(&mut self) -> PResult<PortList> {
        if self.try_pop(&TokenPayload::OParen)?.is_none() {
            return Ok(PortList::Plain(Vec::new()));
        }
        if self.try_pop(&TokenPayload::CParen)?.is_some() {
            return Ok(PortList::Plain(Vec::new()));
        }
        let ansi = self.at(&TokenPayload::AttrStart)?
            || self.peek_kw()?.and_then(direction_of).is_some();
        if !ansi {
            let ports = self.parse_port_list()?;
            self.expect(TokenPayload::CParen)?;
            return Ok(PortList::Plain(ports));
        }
        self.frame().ansi_ports = true;
        loop {
            let attrs = self.parse_attrs()?;
            self.parse_io_decl(attrs, true)?;
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::CParen)?;
        Ok(PortList::Ansi)
    }

    fn parse_port_list(&mut self) -> PResult<Vec<PendingPort>> {
        let mut ports = Vec::new();
        loop {
            let start = self.start_pos()?;
            let port = if self.try_pop(&TokenPayload::Dot)?.is_some() {
                let (ext_name, _) = self.expect_ident()?;
                self.expect(TokenPayload::OParen)?;
                let (portref, refs) = if self.at(&TokenPayload::CParen)? {
                    (None, Vec::new())
                } else {
                    let (portref, refs) = self.parse_port_expr()?;
                    (Some(portref), refs)
                };
                self.expect(TokenPayload::CParen)?;
                PendingPort {
                    fr: self.close(start),
                    ext_name: Some(ext_name),
                    portref,
                    refs,
                }
            } else if self.at(&TokenPayload::Comma)? || self.at(&TokenPayload::CParen)? {
                PendingPort {
                    fr: self.region(Span::new(start, start)),
                    ext_name: None,
                    portref: None,
                    refs: Vec::new(),
                }
            } else {
                let (portref, refs) = self.parse_port_expr()?;
                // A bare identifier names the port implicitly.
                let ext_name = self.backend.expr(portref).kind.simple_name();
                PendingPort {
                    fr: self.close(start),
                    ext_name,
                    portref: Some(portref),
                    refs,
                }
            };
            ports.push(port);
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                return Ok(ports);
            }
        }
    }

    /// A port reference or a concatenation of port references.
    fn parse_port_expr(&mut self) -> PResult<(ExprId, Vec<PortRef>)> {
        if !self.at(&TokenPayload::OBrace)? {
            let r = self.parse_port_ref()?;
            return Ok((r.expr, vec![r]));
        }
        let start = self.start_pos()?;
        self.pop()?;
        let mut refs = Vec::new();
        loop {
            refs.push(self.parse_port_ref()?);
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::CBrace)?;
        let exprs: Vec<ExprId> = refs.iter().map(|r| r.expr).collect();
        let operand_array = self.alloc(&exprs);
        let concat = self.new_expr_at(start, ExprKind::Concat { operand_array });
        Ok((concat, refs))
    }

    fn parse_port_ref(&mut self) -> PResult<PortRef> {
        let start = self.start_pos()?;
        let (name, _) = self.expect_ident()?;
        let expr = self.finish_primary(start, PtArray::empty(), name)?;
        Ok(PortRef {
            expr,
            name,
            fr: self.close(start),
        })
    }

    /// Every IO item of `heads` in declaration order.
    fn collect_io(&self, heads: &[IOHeadId]) -> Vec<(StrId, Direction, FileRegion)> {
        let mut io = Vec::new();
        for &head_id in heads {
            let head = self.backend.io_head(head_id);
            for item_id in self.backend.arrays().iter(head.item_array) {
                let item = self.backend.io_item(item_id);
                io.push((item.name, head.dir, item.fr));
            }
        }
        io
    }

    fn finish_ports(&mut self, ports: PortList, io_heads: &[IOHeadId]) -> PtArray<PortId> {
        match ports {
            PortList::Ansi => self.synthesize_ports(io_heads),
            PortList::Plain(pending) => self.reconcile_ports(pending, io_heads),
        }
    }

    /// One port per IO item, named after it.
    fn synthesize_ports(&mut self, io_heads: &[IOHeadId]) -> PtArray<PortId> {
        let mut ports = Vec::new();
        for (name, dir, fr) in self.collect_io(io_heads) {
            let expr = self.backend.new_expr(PtExpr {
                fr,
                kind: ExprKind::Primary {
                    is_const: false,
                    namebranch_array: PtArray::empty(),
                    name,
                    index_array: PtArray::empty(),
                    select: None,
                },
            });
            let portref_array = self.alloc(&[expr]);
            let dir_array = self.alloc(&[dir]);
            ports.push(self.backend.new_port(PtPort {
                fr,
                ext_name: Some(name),
                portref: Some(expr),
                portref_array,
                dir_array,
            }));
        }
        self.alloc(&ports)
    }

    /// Gives every port reference the direction of its IO declaration and
    /// reports references without a declaration and declarations that no
    /// port refers to.
    fn reconcile_ports(
        &mut self,
        pending: Vec<PendingPort>,
        io_heads: &[IOHeadId],
    ) -> PtArray<PortId> {
        let io = self.collect_io(io_heads);
        let mut dirs: HashMap<StrId, Direction> = HashMap::new();
        for (name, dir, _) in &io {
            dirs.entry(*name).or_insert(*dir);
        }

        let mut referenced: HashSet<StrId> = HashSet::new();
        let mut ports = Vec::with_capacity(pending.len());
        for port in pending {
            let mut port_dirs = Vec::with_capacity(port.refs.len());
            for r in &port.refs {
                referenced.insert(r.name);
                match dirs.get(&r.name) {
                    Some(dir) => port_dirs.push(*dir),
                    None => {
                        let text = self.backend.resolve(r.name).to_string();
                        self.port_error(
                            r.fr,
                            &format!("\"{}\" is not defined in the port list.", text),
                        );
                        port_dirs.push(Direction::NoDirection);
                    }
                }
            }
            let exprs: Vec<ExprId> = port.refs.iter().map(|r| r.expr).collect();
            let portref_array = self.alloc(&exprs);
            let dir_array = self.alloc(&port_dirs);
            ports.push(self.backend.new_port(PtPort {
                fr: port.fr,
                ext_name: port.ext_name,
                portref: port.portref,
                portref_array,
                dir_array,
            }));
        }

        let mut reported: HashSet<StrId> = HashSet::new();
        for (name, dir, fr) in io {
            if referenced.contains(&name) || !reported.insert(name) {
                continue;
            }
            let text = self.backend.resolve(name).to_string();
            self.port_error(
                fr,
                &format!(
                    "\"{}\" is declared as {}, but it does not appear in the port list.",
                    text,
                    dir.as_str()
                ),
            );
        }
        self.alloc(&ports)
    }

    // -- UDPs

    fn parse_udp(&mut self, attrs: PtArray<AttrInstId>) -> PResult<()> {
        let start = self.start_pos()?;
        self.expect_kw(Keyword::Primitive)?;
        let (name, _) = self.expect_ident()?;
        log::trace!("parse_udp: {}", self.backend.resolve(name));

        let (result, frame) = self.with_frame(FrameKind::Udp, |p| p.parse_udp_body());
        let body = match result {
            Ok(body) => body,
            Err(e) => {
                self.scanner.set_udp_table_mode(false);
                return Err(e);
            }
        };
        let port_array = self.finish_ports(body.ports, &frame.io_heads);
        let outputs = self
            .collect_io(&frame.io_heads)
            .iter()
            .filter(|(_, dir, _)| *dir == Direction::Output)
            .count();
        let fr = self.close(start);
        if outputs != 1 {
            self.port_error(fr, "a primitive must have exactly one output.");
        }
        let udp = PtUdp {
            fr,
            name,
            is_seq: body.is_seq,
            port_array,
            iohead_array: self.alloc(&frame.io_heads),
            init_value: body.init_value,
            entry_array: body.entry_array,
        };
        let id = self.backend.new_udp(udp);
        if !attrs.is_empty() {
            self.backend.reg_attrinst(PtNodeRef::Udp(id), attrs);
        }
        self.registry.register_udp(id);
        Ok(())
    }

    fn parse_udp_body(&mut self) -> PResult<UdpBody> {
        let ports = self.parse_header_ports()?;
        self.expect(TokenPayload::Semi)?;

        let mut is_seq = false;
        let mut init_value = None;
        loop {
            match self.peek_kw()? {
                Some(kw) if direction_of(kw).is_some() => {
                    self.parse_io_decl(PtArray::empty(), false)?;
                }
                Some(Keyword::Reg) => {
                    self.pop()?;
                    self.expect_ident()?;
                    self.expect(TokenPayload::Semi)?;
                    is_seq = true;
                }
                Some(Keyword::Initial) => {
                    self.pop()?;
                    self.expect_ident()?;
                    self.expect(TokenPayload::Equals)?;
                    init_value = Some(self.parse_expr()?);
                    self.expect(TokenPayload::Semi)?;
                }
                _ => break,
            }
        }

        let heads = self.frame().io_heads.clone();
        is_seq |= heads
            .iter()
            .any(|&h| self.backend.io_head(h).aux == IOAux::Reg);
        // `output reg q = v` in the header stands in for an initial statement.
        if init_value.is_none() {
            init_value = heads
                .iter()
                .map(|&h| self.backend.io_head(h))
                .filter(|head| head.dir == Direction::Output)
                .flat_map(|head| self.backend.arrays().iter(head.item_array))
                .find_map(|i| self.backend.io_item(i).init_value);
        }
        let inputs = self
            .collect_io(&heads)
            .iter()
            .filter(|(_, dir, _)| *dir == Direction::Input)
            .count();

        self.expect_kw(Keyword::Table)?;
        self.scanner.set_udp_table_mode(true);
        let entries = self.parse_udp_table(is_seq, inputs);
        self.scanner.set_udp_table_mode(false);
        let entry_array = entries?;
        self.expect_kw(Keyword::Endprimitive)?;
        Ok(UdpBody {
            ports,
            is_seq,
            init_value,
            entry_array,
        })
    }

    /// Rows up to and including `endtable`.
    fn parse_udp_table(&mut self, is_seq: bool, inputs: usize) -> PResult<PtArray<UdpEntryId>> {
        let mut entries = Vec::new();
        while self.try_pop_kw(Keyword::Endtable)?.is_none() {
            let start = self.start_pos()?;
            let mut values = Vec::new();
            while !self.at(&TokenPayload::Colon)? {
                values.push(self.parse_udp_value()?);
            }
            self.pop()?;
            let second = self.parse_udp_value()?;
            let (current, output) = if self.try_pop(&TokenPayload::Colon)?.is_some() {
                (Some(second), self.parse_udp_value()?)
            } else {
                (None, second)
            };
            self.expect(TokenPayload::Semi)?;
            let fr = self.close(start);
            if current.is_some() != is_seq {
                let msg = if is_seq {
                    "table entry of a sequential primitive needs a current-state field."
                } else {
                    "table entry of a combinational primitive cannot have a current-state field."
                };
                self.error(fr, msg);
            }
            if values.len() != inputs {
                self.error(
                    fr,
                    &format!(
                        "table entry has {} input values, but the primitive has {} inputs.",
                        values.len(),
                        inputs
                    ),
                );
            }
            let input_array = self.alloc(&values);
            entries.push(self.backend.new_udp_entry(PtUdpEntry {
                fr,
                input_array,
                current,
                output,
            }));
        }
        Ok(self.alloc(&entries))
    }

    fn expect_udp_symbol(&mut self) -> PResult<u8> {
        match self.peek_payload()? {
            Some(TokenPayload::UdpSymbol(c)) => {
                let c = *c;
                self.pop()?;
                Ok(c)
            }
            _ => Err(self.unexpected("table symbol")),
        }
    }

    /// `0`, `?`, `r`, ... or a parenthesized edge such as `(01)`.
    fn parse_udp_value(&mut self) -> PResult<UdpValueId> {
        let start = self.start_pos()?;
        let symbol = if self.try_pop(&TokenPayload::OParen)?.is_some() {
            let from = self.expect_udp_symbol()?;
            let to = self.expect_udp_symbol()?;
            self.expect(TokenPayload::CParen)?;
            UdpSymbol::Edge(from, to)
        } else {
            UdpSymbol::Single(self.expect_udp_symbol()?)
        };
        let fr = self.close(start);
        Ok(self.backend.new_udp_value(PtUdpValue { fr, symbol }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_region::FileId;
    use crate::msg::MsgMgr;
    use crate::pt::{new_backend, BackendKind};
    use crate::pt_mgr::ModuleRegistry;
    use crate::scanner::TokenScanner;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> (Box<dyn crate::pt::PtBackend>, MsgMgr, ModuleRegistry, bool) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut backend = new_backend(BackendKind::Straightforward);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        let ok = {
            let scanner = TokenScanner::from_str(FileId(0), src);
            let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);
            parser.parse_source()
        };
        (backend, msgs, registry, ok)
    }

    #[test]
    fn test_implicit_port_names() {
        let (backend, msgs, registry, ok) =
            parse("module m(a, b[1:0], {c, d}, .e(f)); input a, c, d, f; input [3:0] b; endmodule");
        assert!(ok, "{:?}", msgs.diagnostics());
        let store = backend.as_store();
        let module = store.module(registry.modules()[0]);
        let names: Vec<Option<String>> = store
            .arrays()
            .iter(module.port_array)
            .map(|p| store.port(p).ext_name.map(|n| store.resolve(n).to_string()))
            .collect();
        assert_eq!(
            names,
            vec![Some("a".to_string()), None, None, Some("e".to_string())]
        );
        assert!(!module.explicit_name);
    }

    #[test]
    fn test_concat_port_directions() {
        let (backend, msgs, registry, ok) =
            parse("module m({x, y}); input x; output y; endmodule");
        assert!(ok, "{:?}", msgs.diagnostics());
        let store = backend.as_store();
        let module = store.module(registry.modules()[0]);
        let port = store.port(store.arrays().to_vec(module.port_array)[0]);
        assert_eq!(
            store.arrays().to_vec(port.dir_array),
            vec![Direction::Input, Direction::Output]
        );
        assert_eq!(port.portref_array.len(), 2);
    }

    #[test]
    fn test_recovers_at_next_module() {
        let (_backend, msgs, registry, ok) =
            parse("module bad(; endmodule\nmodule good; endmodule\n");
        assert!(!ok);
        assert_eq!(registry.modules().len(), 1);
        assert!(msgs.error_count() >= 1);
    }
}
