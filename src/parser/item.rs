// SPDX-License-Identifier: Apache-2.0

//! Module items: continuous assigns, processes, tasks and functions,
//! instantiations, generate constructs and specify blocks.

use crate::file_region::{Pos, Span};
use crate::pt::{
    AttrInstId, ConnectionId, ExprId, GateType, ItemId, ItemKind, PathDeclId, PathEdge, PathType,
    Polarity, PtArray, PtConnection, PtContAssign, PtDefParam, PtGenCaseItem, PtInst, PtItem,
    PtNodeRef, PtPathDecl, PtPathDelay, SpecItemType, SpecPathType, StmtId,
};
use crate::token::{Keyword, TokenPayload};

use super::context::FrameKind;
use super::decl::{direction_of, is_decl_keyword};
use super::{PResult, Parser, SyntaxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemCtx {
    pub(crate) in_generate: bool,
}

impl ItemCtx {
    pub(crate) const MODULE: ItemCtx = ItemCtx { in_generate: false };
    pub(crate) const GENERATE: ItemCtx = ItemCtx { in_generate: true };
}

fn gate_type_of(kw: Keyword) -> Option<GateType> {
    let g = match kw {
        Keyword::And => GateType::And,
        Keyword::Nand => GateType::Nand,
        Keyword::Or => GateType::Or,
        Keyword::Nor => GateType::Nor,
        Keyword::Xor => GateType::Xor,
        Keyword::Xnor => GateType::Xnor,
        Keyword::Buf => GateType::Buf,
        Keyword::Not => GateType::Not,
        Keyword::Bufif0 => GateType::Bufif0,
        Keyword::Bufif1 => GateType::Bufif1,
        Keyword::Notif0 => GateType::Notif0,
        Keyword::Notif1 => GateType::Notif1,
        Keyword::Nmos => GateType::Nmos,
        Keyword::Pmos => GateType::Pmos,
        Keyword::Rnmos => GateType::Rnmos,
        Keyword::Rpmos => GateType::Rpmos,
        Keyword::Cmos => GateType::Cmos,
        Keyword::Rcmos => GateType::Rcmos,
        Keyword::Tran => GateType::Tran,
        Keyword::Rtran => GateType::Rtran,
        Keyword::Tranif0 => GateType::Tranif0,
        Keyword::Tranif1 => GateType::Tranif1,
        Keyword::Rtranif0 => GateType::Rtranif0,
        Keyword::Rtranif1 => GateType::Rtranif1,
        Keyword::Pullup => GateType::Pullup,
        Keyword::Pulldown => GateType::Pulldown,
        _ => return None,
    };
    Some(g)
}

/// Keywords at which item-level error recovery stops skipping.
fn is_item_start(kw: Keyword) -> bool {
    is_decl_keyword(kw)
        || direction_of(kw).is_some()
        || gate_type_of(kw).is_some()
        || matches!(
            kw,
            Keyword::Defparam
                | Keyword::Assign
                | Keyword::Initial
                | Keyword::Always
                | Keyword::Task
                | Keyword::Function
                | Keyword::Generate
                | Keyword::Specify
                | Keyword::End
                | Keyword::Endcase
                | Keyword::Endgenerate
                | Keyword::Endspecify
                | Keyword::Endmodule
                | Keyword::Endprimitive
                | Keyword::Endtask
                | Keyword::Endfunction
                | Keyword::Module
                | Keyword::Macromodule
                | Keyword::Primitive
        )
}

fn is_unit_start(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Module | Keyword::Macromodule | Keyword::Primitive
    )
}

impl<'a> Parser<'a> {
    fn add_item(&mut self, start: Pos, kind: ItemKind, attrs: PtArray<AttrInstId>) -> ItemId {
        let fr = self.close(start);
        let id = self.backend.new_item(PtItem { fr, kind });
        if !attrs.is_empty() {
            self.backend.reg_attrinst(PtNodeRef::Item(id), attrs);
        }
        self.frame().items.push(id);
        id
    }

    /// Parses items into the current frame until one of `ends` (left
    /// unconsumed). A failing item is reported and skipped.
    pub(crate) fn parse_item_list(&mut self, ends: &[Keyword], ctx: ItemCtx) -> PResult<()> {
        loop {
            match self.peek_kw()? {
                Some(kw) if ends.contains(&kw) || is_unit_start(kw) => return Ok(()),
                _ => {}
            }
            if self.at_eof()? {
                let expected = ends
                    .first()
                    .map_or("end of construct".to_string(), |kw| format!("'{}'", kw.as_str()));
                return Err(self.unexpected(&expected));
            }
            let before = self.consumed;
            if let Err(e) = self.parse_module_item(ctx) {
                self.report_syntax(e);
                self.recover_item(before)?;
            }
        }
    }

    /// Skips to just past the next `;` or up to the next item keyword.
    pub(crate) fn recover_item(&mut self, before: usize) -> PResult<()> {
        if self.consumed == before && !self.at_eof()? {
            self.pop()?;
        }
        loop {
            match self.peek_payload()? {
                None => return Ok(()),
                Some(TokenPayload::Semi) => {
                    self.pop()?;
                    return Ok(());
                }
                Some(TokenPayload::Keyword(kw)) if is_item_start(*kw) => return Ok(()),
                _ => {
                    self.pop()?;
                }
            }
        }
    }

    pub(crate) fn parse_module_item(&mut self, ctx: ItemCtx) -> PResult<()> {
        let attrs = self.parse_attrs()?;
        let start = self.start_pos()?;
        let tok = self.peek_cloned("module item")?;
        let region = self.region(tok.span);
        let kw = match tok.payload {
            TokenPayload::Identifier(_) => return self.parse_mu_inst(start, attrs),
            TokenPayload::Semi if ctx.in_generate => {
                self.pop()?;
                return Ok(());
            }
            TokenPayload::Keyword(kw) => kw,
            _ => return Err(self.unexpected("module item")),
        };

        if direction_of(kw).is_some() {
            if ctx.in_generate {
                return Err(SyntaxError::new(
                    "IO declaration is not allowed in a generate construct.",
                    region,
                ));
            }
            return self.parse_io_decl(attrs, false);
        }
        if is_decl_keyword(kw) {
            return self.parse_decl(attrs);
        }
        if let Some(gate) = gate_type_of(kw) {
            return self.parse_gate_inst(start, gate, attrs);
        }
        match kw {
            Keyword::Defparam => self.parse_defparam(start, attrs),
            Keyword::Assign => self.parse_cont_assign(start, attrs),
            Keyword::Initial | Keyword::Always => {
                self.pop()?;
                let body = self.parse_stmt()?;
                let kind = if kw == Keyword::Initial {
                    ItemKind::Initial { body }
                } else {
                    ItemKind::Always { body }
                };
                self.add_item(start, kind, attrs);
                Ok(())
            }
            Keyword::Task => self.parse_task(start, attrs),
            Keyword::Function => self.parse_function(start, attrs),
            Keyword::Generate if !ctx.in_generate => self.parse_generate(start, attrs),
            Keyword::Specify if !ctx.in_generate => self.parse_specify(),
            Keyword::Begin if ctx.in_generate => self.parse_gen_block(start, attrs),
            Keyword::If if ctx.in_generate => self.parse_gen_if(start, attrs),
            Keyword::Case if ctx.in_generate => self.parse_gen_case(start, attrs),
            Keyword::For if ctx.in_generate => self.parse_gen_for(start, attrs),
            Keyword::Generate | Keyword::Specify => Err(SyntaxError::new(
                format!("'{}' is not allowed in a generate construct.", kw.as_str()),
                region,
            )),
            Keyword::Begin | Keyword::If | Keyword::Case | Keyword::For => Err(SyntaxError::new(
                format!(
                    "'{}' at module level must be inside a generate region.",
                    kw.as_str()
                ),
                region,
            )),
            _ => Err(self.unexpected("module item")),
        }
    }

    fn parse_defparam(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Defparam)?;
        let mut list = Vec::new();
        loop {
            let dstart = self.start_pos()?;
            let (namebranch_array, name) = self.parse_hier_ident()?;
            self.expect(TokenPayload::Equals)?;
            self.const_depth += 1;
            let value = self.parse_mintypmax();
            self.const_depth -= 1;
            let value = value?;
            let fr = self.close(dstart);
            list.push(self.backend.new_def_param(PtDefParam {
                fr,
                namebranch_array,
                name,
                value,
            }));
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::Semi)?;
        let defparam_array = self.alloc(&list);
        self.add_item(start, ItemKind::DefParam { defparam_array }, attrs);
        Ok(())
    }

    fn parse_cont_assign(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Assign)?;
        let strength = self.parse_opt_strength()?;
        let delay = self.parse_opt_delay()?;
        let mut list = Vec::new();
        loop {
            let cstart = self.start_pos()?;
            let lhs = self.parse_lvalue()?;
            self.expect(TokenPayload::Equals)?;
            let rhs = self.parse_expr()?;
            let fr = self.close(cstart);
            list.push(self.backend.new_cont_assign(PtContAssign { fr, lhs, rhs }));
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::Semi)?;
        let contassign_array = self.alloc(&list);
        self.add_item(
            start,
            ItemKind::ContAssign {
                strength,
                delay,
                contassign_array,
            },
            attrs,
        );
        Ok(())
    }

    /// Header ports, declarations and the single body statement of a task
    /// or function, up to and including `end`.
    fn parse_tf_body(&mut self, end: Keyword) -> PResult<StmtId> {
        if self.try_pop(&TokenPayload::OParen)?.is_some() {
            if !self.at(&TokenPayload::CParen)? {
                loop {
                    let attrs = self.parse_attrs()?;
                    self.parse_io_decl(attrs, true)?;
                    if self.try_pop(&TokenPayload::Comma)?.is_none() {
                        break;
                    }
                }
            }
            self.expect(TokenPayload::CParen)?;
        }
        self.expect(TokenPayload::Semi)?;
        while let Some(kw) = self.peek_kw()? {
            if direction_of(kw).is_some() {
                self.parse_io_decl(PtArray::empty(), false)?;
            } else if is_decl_keyword(kw) {
                self.parse_decl(PtArray::empty())?;
            } else {
                break;
            }
        }
        let body = self.parse_stmt()?;
        self.expect_kw(end)?;
        Ok(body)
    }

    fn parse_task(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Task)?;
        let automatic = self.try_pop_kw(Keyword::Automatic)?.is_some();
        let (name, _) = self.expect_ident()?;
        let (result, frame) =
            self.with_frame(FrameKind::TaskFunc, |p| p.parse_tf_body(Keyword::Endtask));
        let body = match result {
            Ok(body) => body,
            Err(e) => return self.recover_block(e, None, Keyword::Endtask),
        };
        let iohead_array = self.alloc(&frame.io_heads);
        let declhead_array = self.alloc(&frame.decl_heads);
        self.add_item(
            start,
            ItemKind::Task {
                name,
                automatic,
                iohead_array,
                declhead_array,
                body,
            },
            attrs,
        );
        Ok(())
    }

    fn parse_function(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Function)?;
        let automatic = self.try_pop_kw(Keyword::Automatic)?.is_some();
        let (signed, range, var_type) = self.parse_function_type()?;
        let (name, _) = self.expect_ident()?;
        let (result, frame) =
            self.with_frame(FrameKind::TaskFunc, |p| p.parse_tf_body(Keyword::Endfunction));
        let body = match result {
            Ok(body) => body,
            Err(e) => return self.recover_block(e, None, Keyword::Endfunction),
        };
        self.check_function_stmt(body);
        let iohead_array = self.alloc(&frame.io_heads);
        let declhead_array = self.alloc(&frame.decl_heads);
        self.add_item(
            start,
            ItemKind::Function {
                name,
                automatic,
                signed,
                range,
                var_type,
                iohead_array,
                declhead_array,
                body,
            },
            attrs,
        );
        Ok(())
    }

    fn parse_gate_inst(
        &mut self,
        start: Pos,
        gate: GateType,
        attrs: PtArray<AttrInstId>,
    ) -> PResult<()> {
        self.pop()?;
        let strength = self.parse_opt_strength()?;
        let delay = self.parse_opt_delay()?;
        let mut insts = Vec::new();
        loop {
            let istart = self.start_pos()?;
            let (name, range) = self.parse_inst_name()?;
            self.expect(TokenPayload::OParen)?;
            let mut terminals = Vec::new();
            loop {
                let cstart = self.start_pos()?;
                let expr = self.parse_expr()?;
                let fr = self.close(cstart);
                terminals.push(self.backend.new_connection(PtConnection {
                    fr,
                    name: None,
                    expr: Some(expr),
                }));
                if self.try_pop(&TokenPayload::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenPayload::CParen)?;
            let port_array = self.alloc(&terminals);
            let fr = self.close(istart);
            insts.push(self.backend.new_inst(PtInst {
                fr,
                name,
                range,
                port_array,
            }));
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::Semi)?;
        let inst_array = self.alloc(&insts);
        self.add_item(
            start,
            ItemKind::GateInst {
                gate,
                strength,
                delay,
                inst_array,
            },
            attrs,
        );
        Ok(())
    }

    fn parse_inst_name(&mut self) -> PResult<(Option<crate::pt::StrId>, Option<crate::pt::RangeBounds>)> {
        if !self.at_ident()? {
            return Ok((None, None));
        }
        let (name, _) = self.expect_ident()?;
        let range = self.parse_opt_range()?;
        Ok((Some(name), range))
    }

    /// Module or UDP instantiation; the definition name is recorded with
    /// the registry so unresolved names can be looked up later.
    fn parse_mu_inst(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        let (def_name, _) = self.expect_ident()?;
        self.registry.register_default_name(def_name);
        let strength = self.parse_opt_strength()?;
        let (delay, paramcon_array) = if self.at(&TokenPayload::Hash)? {
            if self.at_nth(1, &TokenPayload::OParen)? {
                self.pop()?;
                (None, self.parse_connection_list()?)
            } else {
                (self.parse_opt_delay()?, PtArray::empty())
            }
        } else {
            (None, PtArray::empty())
        };
        let mut insts = Vec::new();
        loop {
            let istart = self.start_pos()?;
            let (name, range) = self.parse_inst_name()?;
            let port_array = self.parse_connection_list()?;
            let fr = self.close(istart);
            insts.push(self.backend.new_inst(PtInst {
                fr,
                name,
                range,
                port_array,
            }));
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::Semi)?;
        let inst_array = self.alloc(&insts);
        self.add_item(
            start,
            ItemKind::MuInst {
                def_name,
                strength,
                delay,
                paramcon_array,
                inst_array,
            },
            attrs,
        );
        Ok(())
    }

    /// `( a, , b )` or `( .x(a), .y() )`; `()` is an empty list.
    fn parse_connection_list(&mut self) -> PResult<PtArray<ConnectionId>> {
        let list_start = self.start_pos()?;
        self.expect(TokenPayload::OParen)?;
        let mut conns = Vec::new();
        if self.try_pop(&TokenPayload::CParen)?.is_some() {
            return Ok(PtArray::empty());
        }
        let mut named = 0usize;
        loop {
            let cstart = self.start_pos()?;
            let con = if self.try_pop(&TokenPayload::Dot)?.is_some() {
                named += 1;
                let (name, _) = self.expect_ident()?;
                self.expect(TokenPayload::OParen)?;
                let expr = if self.at(&TokenPayload::CParen)? {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenPayload::CParen)?;
                PtConnection {
                    fr: self.close(cstart),
                    name: Some(name),
                    expr,
                }
            } else if self.at(&TokenPayload::Comma)? || self.at(&TokenPayload::CParen)? {
                PtConnection {
                    fr: self.region(Span::new(cstart, cstart)),
                    name: None,
                    expr: None,
                }
            } else {
                let expr = self.parse_expr()?;
                PtConnection {
                    fr: self.close(cstart),
                    name: None,
                    expr: Some(expr),
                }
            };
            conns.push(self.backend.new_connection(con));
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::CParen)?;
        if named != 0 && named != conns.len() {
            let fr = self.close(list_start);
            self.error(fr, "ordered and named connections cannot be mixed.");
        }
        Ok(self.alloc(&conns))
    }

    // -- Generate constructs

    fn parse_generate(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Generate)?;
        let (result, frame) = self.with_frame(FrameKind::Generate, |p| {
            p.parse_item_list(&[Keyword::Endgenerate], ItemCtx::GENERATE)?;
            p.expect_kw(Keyword::Endgenerate)?;
            Ok(())
        });
        result?;
        let declhead_array = self.alloc(&frame.decl_heads);
        let item_array = self.alloc(&frame.items);
        self.add_item(
            start,
            ItemKind::Generate {
                declhead_array,
                item_array,
            },
            attrs,
        );
        Ok(())
    }

    /// Items up to and including `end`.
    fn parse_gen_items_to_end(&mut self) -> PResult<()> {
        self.parse_item_list(&[Keyword::End], ItemCtx::GENERATE)?;
        self.expect_kw(Keyword::End)?;
        Ok(())
    }

    fn parse_gen_block(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Begin)?;
        let name = if self.try_pop(&TokenPayload::Colon)?.is_some() {
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        let (result, frame) =
            self.with_frame(FrameKind::GenBlock, |p| p.parse_gen_items_to_end());
        result?;
        let declhead_array = self.alloc(&frame.decl_heads);
        let item_array = self.alloc(&frame.items);
        self.add_item(
            start,
            ItemKind::GenBlock {
                name,
                declhead_array,
                item_array,
            },
            attrs,
        );
        Ok(())
    }

    fn parse_gen_cond(&mut self) -> PResult<ExprId> {
        self.expect(TokenPayload::OParen)?;
        let cond = self.parse_const_expr()?;
        self.expect(TokenPayload::CParen)?;
        Ok(cond)
    }

    fn parse_gen_if(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::If)?;
        let cond = self.parse_gen_cond()?;
        let (result, then_frame) = self.with_frame(FrameKind::GenIfThen, |p| {
            p.parse_module_item(ItemCtx::GENERATE)
        });
        result?;
        let else_frame = if self.try_pop_kw(Keyword::Else)?.is_some() {
            let (result, frame) = self.with_frame(FrameKind::GenIfElse, |p| {
                p.parse_module_item(ItemCtx::GENERATE)
            });
            result?;
            Some(frame)
        } else {
            None
        };
        let then_declhead_array = self.alloc(&then_frame.decl_heads);
        let then_item_array = self.alloc(&then_frame.items);
        let (else_declhead_array, else_item_array) = match &else_frame {
            Some(frame) => (self.alloc(&frame.decl_heads), self.alloc(&frame.items)),
            None => (PtArray::empty(), PtArray::empty()),
        };
        self.add_item(
            start,
            ItemKind::GenIf {
                cond,
                then_declhead_array,
                then_item_array,
                has_else: else_frame.is_some(),
                else_declhead_array,
                else_item_array,
            },
            attrs,
        );
        Ok(())
    }

    fn parse_gen_case(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::Case)?;
        let expr = self.parse_gen_cond()?;
        let mut items = Vec::new();
        let mut default_seen = false;
        while self.try_pop_kw(Keyword::Endcase)?.is_none() {
            let cstart = self.start_pos()?;
            let mut labels = Vec::new();
            if self.try_pop_kw(Keyword::Default)?.is_some() {
                self.try_pop(&TokenPayload::Colon)?;
                if default_seen {
                    let fr = self.close(cstart);
                    self.error(fr, "more than one 'default' labels.");
                }
                default_seen = true;
            } else {
                loop {
                    labels.push(self.parse_const_expr()?);
                    if self.try_pop(&TokenPayload::Comma)?.is_none() {
                        break;
                    }
                }
                self.expect(TokenPayload::Colon)?;
            }
            let (result, frame) = self.with_frame(FrameKind::GenCaseItem, |p| {
                p.parse_module_item(ItemCtx::GENERATE)
            });
            result?;
            let label_array = self.alloc(&labels);
            let declhead_array = self.alloc(&frame.decl_heads);
            let item_array = self.alloc(&frame.items);
            let fr = self.close(cstart);
            items.push(self.backend.new_gen_case_item(PtGenCaseItem {
                fr,
                label_array,
                declhead_array,
                item_array,
            }));
        }
        let caseitem_array = self.alloc(&items);
        self.add_item(
            start,
            ItemKind::GenCase {
                expr,
                caseitem_array,
            },
            attrs,
        );
        Ok(())
    }

    fn parse_gen_for(&mut self, start: Pos, attrs: PtArray<AttrInstId>) -> PResult<()> {
        self.expect_kw(Keyword::For)?;
        self.expect(TokenPayload::OParen)?;
        let (loop_var, _) = self.expect_ident()?;
        self.expect(TokenPayload::Equals)?;
        let init_expr = self.parse_const_expr()?;
        self.expect(TokenPayload::Semi)?;
        let cond = self.parse_const_expr()?;
        self.expect(TokenPayload::Semi)?;
        let (next_var, next_region) = self.expect_ident()?;
        self.expect(TokenPayload::Equals)?;
        let next_expr = self.parse_const_expr()?;
        self.expect(TokenPayload::CParen)?;
        if next_var != loop_var {
            let next_text = self.backend.resolve(next_var).to_string();
            let init_text = self.backend.resolve(loop_var).to_string();
            self.error(
                next_region,
                &format!(
                    "variable of the increment statement ({}) does not match the variable of the initial statement ({}).",
                    next_text, init_text
                ),
            );
        }
        let (result, frame) = self.with_frame(FrameKind::GenFor, |p| {
            p.expect_kw(Keyword::Begin)?;
            let name = if p.try_pop(&TokenPayload::Colon)?.is_some() {
                Some(p.expect_ident()?.0)
            } else {
                None
            };
            p.parse_gen_items_to_end()?;
            Ok(name)
        });
        let block_name = result?;
        let declhead_array = self.alloc(&frame.decl_heads);
        let item_array = self.alloc(&frame.items);
        self.add_item(
            start,
            ItemKind::GenFor {
                loop_var,
                init_expr,
                cond,
                next_expr,
                block_name,
                declhead_array,
                item_array,
            },
            attrs,
        );
        Ok(())
    }

    // -- Specify blocks

    fn parse_specify(&mut self) -> PResult<()> {
        self.expect_kw(Keyword::Specify)?;
        while self.try_pop_kw(Keyword::Endspecify)?.is_none() {
            if self.at_eof()? {
                return Err(self.unexpected("'endspecify'"));
            }
            let before = self.consumed;
            if let Err(e) = self.parse_specify_item() {
                self.report_syntax(e);
                self.recover_item(before)?;
                match self.peek_kw()? {
                    Some(Keyword::Endmodule) => return Err(self.unexpected("'endspecify'")),
                    Some(kw) if is_unit_start(kw) => return Err(self.unexpected("'endspecify'")),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn parse_terminal_list(&mut self) -> PResult<Vec<ExprId>> {
        let mut terms = Vec::new();
        loop {
            terms.push(self.parse_lvalue()?);
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                return Ok(terms);
            }
        }
    }

    fn parse_specify_item(&mut self) -> PResult<()> {
        let start = self.start_pos()?;
        let tok = self.peek_cloned("specify item")?;
        let region = self.region(tok.span);
        let spec_type = match &tok.payload {
            TokenPayload::Keyword(Keyword::Specparam) => return self.parse_decl(PtArray::empty()),
            TokenPayload::Keyword(Keyword::PulsestyleOnevent) => Some(SpecItemType::PulsestyleOnEvent),
            TokenPayload::Keyword(Keyword::PulsestyleOndetect) => {
                Some(SpecItemType::PulsestyleOnDetect)
            }
            TokenPayload::Keyword(Keyword::Showcancelled) => Some(SpecItemType::ShowCancelled),
            TokenPayload::Keyword(Keyword::Noshowcancelled) => Some(SpecItemType::NoShowCancelled),
            _ => None,
        };
        if let Some(spec_type) = spec_type {
            self.pop()?;
            let terms = self.parse_terminal_list()?;
            self.expect(TokenPayload::Semi)?;
            let terminal_array = self.alloc(&terms);
            self.add_item(
                start,
                ItemKind::SpecItem {
                    spec_type,
                    terminal_array,
                },
                PtArray::empty(),
            );
            return Ok(());
        }

        let (path_type, cond) = match &tok.payload {
            TokenPayload::Keyword(Keyword::If) => {
                self.pop()?;
                self.expect(TokenPayload::OParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenPayload::CParen)?;
                (SpecPathType::If, Some(cond))
            }
            TokenPayload::Keyword(Keyword::Ifnone) => {
                self.pop()?;
                (SpecPathType::IfNone, None)
            }
            TokenPayload::OParen => (SpecPathType::Plain, None),
            TokenPayload::SysIdentifier(name) => {
                self.warning(
                    region,
                    &format!("timing check {} is not supported; skipped.", name),
                );
                while self.try_pop(&TokenPayload::Semi)?.is_none() {
                    self.pop()?;
                }
                return Ok(());
            }
            _ => return Err(self.unexpected("specify item")),
        };
        let path_decl = self.parse_path_decl()?;
        self.add_item(
            start,
            ItemKind::SpecPath {
                path_type,
                cond,
                path_decl,
            },
            PtArray::empty(),
        );
        Ok(())
    }

    fn parse_polarity(&mut self) -> PResult<Polarity> {
        let arrow_next = matches!(
            self.peek_nth(1)?.map(|t| &t.payload),
            Some(TokenPayload::ParallelPath | TokenPayload::FullPath)
        );
        if !arrow_next {
            return Ok(Polarity::Unknown);
        }
        if self.try_pop(&TokenPayload::Plus)?.is_some() {
            Ok(Polarity::Positive)
        } else if self.try_pop(&TokenPayload::Minus)?.is_some() {
            Ok(Polarity::Negative)
        } else {
            Ok(Polarity::Unknown)
        }
    }

    /// `( [edge] inputs [pol] =>|*> outputs ) = delay ;`
    fn parse_path_decl(&mut self) -> PResult<PathDeclId> {
        let start = self.start_pos()?;
        self.expect(TokenPayload::OParen)?;
        let edge = if self.try_pop_kw(Keyword::Posedge)?.is_some() {
            PathEdge::Posedge
        } else if self.try_pop_kw(Keyword::Negedge)?.is_some() {
            PathEdge::Negedge
        } else {
            PathEdge::NoEdge
        };
        let inputs = self.parse_terminal_list()?;
        let input_pol = self.parse_polarity()?;
        let path_type = if self.try_pop(&TokenPayload::ParallelPath)?.is_some() {
            PathType::Parallel
        } else if self.try_pop(&TokenPayload::FullPath)?.is_some() {
            PathType::Full
        } else {
            return Err(self.unexpected("'=>' or '*>'"));
        };
        let (outputs, output_pol, expr) = if self.try_pop(&TokenPayload::OParen)?.is_some() {
            let outputs = self.parse_terminal_list()?;
            let pol = if self.try_pop(&TokenPayload::PlusColon)?.is_some() {
                Polarity::Positive
            } else if self.try_pop(&TokenPayload::MinusColon)?.is_some() {
                Polarity::Negative
            } else {
                self.expect(TokenPayload::Colon)?;
                Polarity::Unknown
            };
            let data = self.parse_expr()?;
            self.expect(TokenPayload::CParen)?;
            (outputs, pol, Some(data))
        } else {
            (self.parse_terminal_list()?, Polarity::Unknown, None)
        };
        self.expect(TokenPayload::CParen)?;
        self.expect(TokenPayload::Equals)?;

        let dstart = self.start_pos()?;
        let mut values = Vec::new();
        if self.try_pop(&TokenPayload::OParen)?.is_some() {
            loop {
                values.push(self.parse_mintypmax()?);
                if self.try_pop(&TokenPayload::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenPayload::CParen)?;
        } else {
            values.push(self.parse_mintypmax()?);
        }
        let delay_fr = self.close(dstart);
        if ![1, 2, 3, 6, 12].contains(&values.len()) {
            self.error(
                delay_fr,
                &format!(
                    "a path delay takes 1, 2, 3, 6 or 12 values, not {}.",
                    values.len()
                ),
            );
        }
        self.expect(TokenPayload::Semi)?;
        let value_array = self.alloc(&values);
        let path_delay = self.backend.new_path_delay(PtPathDelay {
            fr: delay_fr,
            value_array,
        });
        let input_array = self.alloc(&inputs);
        let output_array = self.alloc(&outputs);
        let fr = self.close(start);
        Ok(self.backend.new_path_decl(PtPathDecl {
            fr,
            edge,
            input_array,
            input_pol,
            path_type,
            output_array,
            output_pol,
            expr,
            path_delay,
        }))
    }
}
