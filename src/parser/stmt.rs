// SPDX-License-Identifier: Apache-2.0

//! Procedural statements and timing controls.

use crate::file_region::{Pos, Span};
use crate::pt::{
    CaseItemId, CaseType, ControlId, ControlKind, ExprId, ExprKind, OpType, PtArray, PtCaseItem,
    PtControl, PtNodeRef, PtStmt, StmtId, StmtKind,
};
use crate::token::{Keyword, TokenPayload};

use super::context::FrameKind;
use super::{PResult, Parser, SyntaxError};

impl<'a> Parser<'a> {
    fn new_stmt_at(&mut self, start: Pos, kind: StmtKind) -> StmtId {
        let fr = self.close(start);
        self.backend.new_stmt(PtStmt { fr, kind })
    }

    /// Statement or null statement, with any leading attributes.
    pub(crate) fn parse_stmt(&mut self) -> PResult<StmtId> {
        let attrs = self.parse_attrs()?;
        let start = self.start_pos()?;
        let kind = self.parse_stmt_kind()?;
        let id = self.new_stmt_at(start, kind);
        if !attrs.is_empty() {
            self.backend.reg_attrinst(PtNodeRef::Stmt(id), attrs);
        }
        Ok(id)
    }

    fn parse_paren_expr(&mut self) -> PResult<ExprId> {
        self.expect(TokenPayload::OParen)?;
        let e = self.parse_expr()?;
        self.expect(TokenPayload::CParen)?;
        Ok(e)
    }

    fn parse_stmt_kind(&mut self) -> PResult<StmtKind> {
        let tok = self.peek_cloned("statement")?;
        let kw = match &tok.payload {
            TokenPayload::Semi => {
                self.pop()?;
                return Ok(StmtKind::Null);
            }
            TokenPayload::Hash => {
                let control = self.parse_delay_control()?;
                let body = self.parse_stmt()?;
                return Ok(StmtKind::DelayControl { control, body });
            }
            TokenPayload::At => {
                let control = self.parse_event_control()?;
                let body = self.parse_stmt()?;
                return Ok(StmtKind::EventControl { control, body });
            }
            TokenPayload::Arrow => {
                self.pop()?;
                let event = self.parse_lvalue()?;
                self.expect(TokenPayload::Semi)?;
                return Ok(StmtKind::Event { event });
            }
            TokenPayload::SysIdentifier(s) => {
                self.pop()?;
                let name = self.backend.new_string(s);
                let arg_array = if self.at(&TokenPayload::OParen)? {
                    self.parse_call_args()?
                } else {
                    PtArray::empty()
                };
                self.expect(TokenPayload::Semi)?;
                return Ok(StmtKind::SysEnable { name, arg_array });
            }
            TokenPayload::Identifier(_) | TokenPayload::OBrace => {
                return self.parse_assign_or_enable();
            }
            TokenPayload::Keyword(kw) => *kw,
            _ => return Err(self.unexpected("statement")),
        };

        match kw {
            Keyword::Begin => self.parse_block(true),
            Keyword::Fork => self.parse_block(false),
            Keyword::If => {
                self.pop()?;
                let cond = self.parse_paren_expr()?;
                let then_body = self.parse_stmt()?;
                let else_body = if self.try_pop_kw(Keyword::Else)?.is_some() {
                    Some(self.parse_stmt()?)
                } else {
                    None
                };
                Ok(StmtKind::If {
                    cond,
                    then_body,
                    else_body,
                })
            }
            Keyword::Case | Keyword::Casex | Keyword::Casez => {
                self.pop()?;
                let case_type = match kw {
                    Keyword::Casex => CaseType::CaseX,
                    Keyword::Casez => CaseType::CaseZ,
                    _ => CaseType::Case,
                };
                let expr = self.parse_paren_expr()?;
                let caseitem_array = self.parse_case_items()?;
                Ok(StmtKind::Case {
                    case_type,
                    expr,
                    caseitem_array,
                })
            }
            Keyword::Forever => {
                self.pop()?;
                let body = self.parse_stmt()?;
                Ok(StmtKind::Forever { body })
            }
            Keyword::Repeat => {
                self.pop()?;
                let expr = self.parse_paren_expr()?;
                let body = self.parse_stmt()?;
                Ok(StmtKind::Repeat { expr, body })
            }
            Keyword::While => {
                self.pop()?;
                let cond = self.parse_paren_expr()?;
                let body = self.parse_stmt()?;
                Ok(StmtKind::While { cond, body })
            }
            Keyword::For => {
                self.pop()?;
                self.expect(TokenPayload::OParen)?;
                let init = self.parse_plain_assign()?;
                self.expect(TokenPayload::Semi)?;
                let cond = self.parse_expr()?;
                self.expect(TokenPayload::Semi)?;
                let next = self.parse_plain_assign()?;
                self.expect(TokenPayload::CParen)?;
                let body = self.parse_stmt()?;
                Ok(StmtKind::For {
                    init,
                    cond,
                    next,
                    body,
                })
            }
            Keyword::Wait => {
                self.pop()?;
                let cond = self.parse_paren_expr()?;
                let body = self.parse_stmt()?;
                Ok(StmtKind::Wait { cond, body })
            }
            Keyword::Disable => {
                self.pop()?;
                let (namebranch_array, name) = self.parse_hier_ident()?;
                self.expect(TokenPayload::Semi)?;
                Ok(StmtKind::Disable {
                    namebranch_array,
                    name,
                })
            }
            Keyword::Assign | Keyword::Force => {
                self.pop()?;
                let lhs = self.parse_lvalue()?;
                self.expect(TokenPayload::Equals)?;
                let rhs = self.parse_expr()?;
                self.expect(TokenPayload::Semi)?;
                Ok(if kw == Keyword::Assign {
                    StmtKind::PcAssign { lhs, rhs }
                } else {
                    StmtKind::Force { lhs, rhs }
                })
            }
            Keyword::Deassign | Keyword::Release => {
                self.pop()?;
                let lhs = self.parse_lvalue()?;
                self.expect(TokenPayload::Semi)?;
                Ok(if kw == Keyword::Deassign {
                    StmtKind::Deassign { lhs }
                } else {
                    StmtKind::Release { lhs }
                })
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `lvalue = expr` inside a `for` header.
    fn parse_plain_assign(&mut self) -> PResult<StmtId> {
        let start = self.start_pos()?;
        let lhs = self.parse_lvalue()?;
        self.expect(TokenPayload::Equals)?;
        let rhs = self.parse_expr()?;
        Ok(self.new_stmt_at(
            start,
            StmtKind::Assign {
                lhs,
                rhs,
                control: None,
            },
        ))
    }

    /// Task enable (`name;`, `name(args);`) or blocking/nonblocking
    /// assignment with an optional intra-assignment control.
    fn parse_assign_or_enable(&mut self) -> PResult<StmtKind> {
        let start = self.start_pos()?;
        let lhs = if self.at(&TokenPayload::OBrace)? {
            self.parse_lvalue()?
        } else {
            let (namebranch_array, name) = self.parse_hier_ident()?;
            if self.at(&TokenPayload::Semi)? || self.at(&TokenPayload::OParen)? {
                let arg_array = if self.at(&TokenPayload::OParen)? {
                    self.parse_call_args()?
                } else {
                    PtArray::empty()
                };
                self.expect(TokenPayload::Semi)?;
                return Ok(StmtKind::Enable {
                    namebranch_array,
                    name,
                    arg_array,
                });
            }
            self.finish_primary(start, namebranch_array, name)?
        };
        let blocking = if self.try_pop(&TokenPayload::Equals)?.is_some() {
            true
        } else if self.try_pop(&TokenPayload::Le)?.is_some() {
            false
        } else {
            return Err(self.unexpected("'=' or '<='"));
        };
        let control = match self.peek_payload()? {
            Some(TokenPayload::Hash) => Some(self.parse_delay_control()?),
            Some(TokenPayload::At) => Some(self.parse_event_control()?),
            Some(TokenPayload::Keyword(Keyword::Repeat)) => Some(self.parse_repeat_control()?),
            _ => None,
        };
        let rhs = self.parse_expr()?;
        self.expect(TokenPayload::Semi)?;
        Ok(if blocking {
            StmtKind::Assign { lhs, rhs, control }
        } else {
            StmtKind::NbAssign { lhs, rhs, control }
        })
    }

    /// `#value` or `#(mintypmax)`.
    pub(crate) fn parse_delay_control(&mut self) -> PResult<ControlId> {
        let start = self.start_pos()?;
        self.expect(TokenPayload::Hash)?;
        let value = self.parse_primary()?;
        let fr = self.close(start);
        Ok(self.backend.new_control(PtControl {
            fr,
            kind: ControlKind::Delay { value },
        }))
    }

    /// `@name`, `@*`, `@(*)` or `@(ev or ev, ...)`.
    pub(crate) fn parse_event_control(&mut self) -> PResult<ControlId> {
        let start = self.start_pos()?;
        let event_array = self.parse_event_list()?;
        let fr = self.close(start);
        Ok(self.backend.new_control(PtControl {
            fr,
            kind: ControlKind::Event { event_array },
        }))
    }

    fn parse_repeat_control(&mut self) -> PResult<ControlId> {
        let start = self.start_pos()?;
        self.expect_kw(Keyword::Repeat)?;
        let rep = self.parse_paren_expr()?;
        let event_array = self.parse_event_list()?;
        let fr = self.close(start);
        Ok(self.backend.new_control(PtControl {
            fr,
            kind: ControlKind::Repeat { rep, event_array },
        }))
    }

    fn parse_event_list(&mut self) -> PResult<PtArray<ExprId>> {
        self.expect(TokenPayload::At)?;
        if self.try_pop(&TokenPayload::Star)?.is_some() {
            return Ok(PtArray::empty());
        }
        if self.try_pop(&TokenPayload::OParen)?.is_none() {
            let e = self.parse_lvalue()?;
            return Ok(self.alloc(&[e]));
        }
        if self.at(&TokenPayload::Star)? && self.at_nth(1, &TokenPayload::CParen)? {
            self.pop()?;
            self.pop()?;
            return Ok(PtArray::empty());
        }
        let mut events = Vec::new();
        loop {
            events.push(self.parse_event_expr()?);
            if self.try_pop_kw(Keyword::Or)?.is_none() && self.try_pop(&TokenPayload::Comma)?.is_none()
            {
                break;
            }
        }
        self.expect(TokenPayload::CParen)?;
        Ok(self.alloc(&events))
    }

    fn parse_event_expr(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        let op = match self.peek_kw()? {
            Some(Keyword::Posedge) => Some(OpType::Posedge),
            Some(Keyword::Negedge) => Some(OpType::Negedge),
            _ => None,
        };
        let Some(op) = op else {
            return self.parse_expr();
        };
        self.pop()?;
        let operand = self.parse_expr()?;
        let operand_array = self.alloc(&[operand]);
        Ok(self.new_expr_at(
            start,
            ExprKind::Opr {
                op,
                operand_array,
            },
        ))
    }

    fn parse_case_items(&mut self) -> PResult<PtArray<CaseItemId>> {
        let mut items = Vec::new();
        let mut default_seen = false;
        while self.try_pop_kw(Keyword::Endcase)?.is_none() {
            let start = self.start_pos()?;
            let mut labels = Vec::new();
            if self.try_pop_kw(Keyword::Default)?.is_some() {
                self.try_pop(&TokenPayload::Colon)?;
                if default_seen {
                    let fr = self.close(start);
                    self.error(fr, "more than one 'default' labels.");
                }
                default_seen = true;
            } else {
                loop {
                    labels.push(self.parse_expr()?);
                    if self.try_pop(&TokenPayload::Comma)?.is_none() {
                        break;
                    }
                }
                self.expect(TokenPayload::Colon)?;
            }
            let body = self.parse_stmt()?;
            let label_array = self.alloc(&labels);
            let fr = self.close(start);
            items.push(self.backend.new_case_item(PtCaseItem {
                fr,
                label_array,
                body,
            }));
        }
        Ok(self.alloc(&items))
    }

    /// `begin [: name] ... end` or `fork [: name] ... join`. Only named
    /// blocks may declare variables; they get their own frame.
    fn parse_block(&mut self, seq: bool) -> PResult<StmtKind> {
        self.pop()?;
        let end = if seq { Keyword::End } else { Keyword::Join };
        let (name, declhead_array, stmt_array) =
            if self.try_pop(&TokenPayload::Colon)?.is_some() {
                let (name, _) = self.expect_ident()?;
                let (result, frame) =
                    self.with_frame(FrameKind::NamedBlock, |p| p.parse_block_body(end, true));
                let stmts = result?;
                let decls = self.alloc(&frame.decl_heads);
                (Some(name), decls, stmts)
            } else {
                (None, PtArray::empty(), self.parse_block_body(end, false)?)
            };
        Ok(if seq {
            StmtKind::SeqBlock {
                name,
                declhead_array,
                stmt_array,
            }
        } else {
            StmtKind::ParBlock {
                name,
                declhead_array,
                stmt_array,
            }
        })
    }

    fn parse_block_body(&mut self, end: Keyword, named: bool) -> PResult<PtArray<StmtId>> {
        while let Some(kw) = self.peek_kw()? {
            if !super::decl::is_decl_keyword(kw) {
                break;
            }
            if !named {
                let start = self.start_pos()?;
                let region = self.region(Span::new(start, start));
                return Err(SyntaxError::new(
                    "declarations are only allowed in a named block.",
                    region,
                ));
            }
            self.parse_decl(PtArray::empty())?;
        }
        let mut stmts = Vec::new();
        while self.try_pop_kw(end)?.is_none() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(self.alloc(&stmts))
    }

    /// Checks that a function body contains only statements allowed in a
    /// function; reports each offending statement.
    pub(crate) fn check_function_stmt(&mut self, id: StmtId) -> bool {
        let stmt = self.backend.stmt(id);
        let children: Vec<StmtId> = match stmt.kind {
            StmtKind::Disable { .. } | StmtKind::SysEnable { .. } | StmtKind::Null => Vec::new(),
            StmtKind::Assign { control: None, .. } => Vec::new(),
            StmtKind::If {
                then_body,
                else_body,
                ..
            } => std::iter::once(then_body).chain(else_body).collect(),
            StmtKind::Case { caseitem_array, .. } => self
                .backend
                .arrays()
                .iter(caseitem_array)
                .map(|ci| self.backend.case_item(ci).body)
                .collect(),
            StmtKind::Forever { body }
            | StmtKind::Repeat { body, .. }
            | StmtKind::While { body, .. } => vec![body],
            StmtKind::For {
                init, next, body, ..
            } => vec![init, next, body],
            StmtKind::SeqBlock { stmt_array, .. } => self.backend.arrays().to_vec(stmt_array),
            other => {
                let text = format!("{} cannot be used in function declaration.", other.stmt_name());
                self.error(stmt.fr, &text);
                return false;
            }
        };
        let mut ok = true;
        for child in children {
            ok &= self.check_function_stmt(child);
        }
        ok
    }
}
