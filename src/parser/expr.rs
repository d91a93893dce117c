// SPDX-License-Identifier: Apache-2.0

//! Expressions, hierarchical names, ranges, delays and strengths.

use crate::file_region::Pos;
use crate::pt::{
    DelayId, ExprId, ExprKind, HierName, NameBranchId, OpType, PartSelect, PtArray, PtDelay,
    PtExpr, PtStrength, RangeBounds, RangeMode, StrId, StrengthId, StrengthSpec, StrengthVal,
};
use crate::token::TokenPayload;

use super::{PResult, Parser};

/// Binary operator and its binding power; larger binds tighter.
fn binary_op(p: &TokenPayload) -> Option<(OpType, u8)> {
    let r = match p {
        TokenPayload::PipePipe => (OpType::LogOr, 1),
        TokenPayload::AmpAmp => (OpType::LogAnd, 2),
        TokenPayload::Pipe => (OpType::BitOr, 3),
        TokenPayload::Caret => (OpType::BitXor, 4),
        TokenPayload::TildeCaret => (OpType::BitXnor, 4),
        TokenPayload::Amp => (OpType::BitAnd, 5),
        TokenPayload::EqEq => (OpType::Eq, 6),
        TokenPayload::BangEq => (OpType::Neq, 6),
        TokenPayload::EqEqEq => (OpType::CaseEq, 6),
        TokenPayload::BangEqEq => (OpType::CaseNeq, 6),
        TokenPayload::Lt => (OpType::Lt, 7),
        TokenPayload::Le => (OpType::Le, 7),
        TokenPayload::Gt => (OpType::Gt, 7),
        TokenPayload::Ge => (OpType::Ge, 7),
        TokenPayload::Shl => (OpType::LShift, 8),
        TokenPayload::Shr => (OpType::RShift, 8),
        TokenPayload::AShl => (OpType::ArithLShift, 8),
        TokenPayload::AShr => (OpType::ArithRShift, 8),
        TokenPayload::Plus => (OpType::Add, 9),
        TokenPayload::Minus => (OpType::Sub, 9),
        TokenPayload::Star => (OpType::Mult, 10),
        TokenPayload::Slash => (OpType::Div, 10),
        TokenPayload::Percent => (OpType::Mod, 10),
        TokenPayload::Power => (OpType::Power, 11),
        _ => return None,
    };
    Some(r)
}

fn unary_op(p: &TokenPayload) -> Option<OpType> {
    let op = match p {
        TokenPayload::Plus => OpType::Plus,
        TokenPayload::Minus => OpType::Minus,
        TokenPayload::Bang => OpType::Not,
        TokenPayload::Tilde => OpType::BitNeg,
        TokenPayload::Amp => OpType::UnaryAnd,
        TokenPayload::TildeAmp => OpType::UnaryNand,
        TokenPayload::Pipe => OpType::UnaryOr,
        TokenPayload::TildePipe => OpType::UnaryNor,
        TokenPayload::Caret => OpType::UnaryXor,
        TokenPayload::TildeCaret => OpType::UnaryXnor,
        _ => return None,
    };
    Some(op)
}

pub(crate) fn strength_value(p: &TokenPayload) -> Option<StrengthVal> {
    match p {
        TokenPayload::Keyword(kw) => StrengthVal::from_keyword(kw.as_str()),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn new_expr_at(&mut self, start: Pos, kind: ExprKind) -> ExprId {
        let fr = self.close(start);
        self.backend.new_expr(PtExpr { fr, kind })
    }

    fn new_opr(&mut self, start: Pos, op: OpType, operands: &[ExprId]) -> ExprId {
        debug_assert_eq!(operands.len(), op.operand_count());
        let operand_array = self.alloc(operands);
        self.new_expr_at(
            start,
            ExprKind::Opr {
                op,
                operand_array,
            },
        )
    }

    pub(crate) fn parse_expr(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        let cond = self.parse_binary(0)?;
        if self.try_pop(&TokenPayload::Question)?.is_none() {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenPayload::Colon)?;
        let else_expr = self.parse_expr()?;
        Ok(self.new_opr(start, OpType::Condition, &[cond, then_expr, else_expr]))
    }

    /// Expression whose primaries must be constant.
    pub(crate) fn parse_const_expr(&mut self) -> PResult<ExprId> {
        self.const_depth += 1;
        let result = self.parse_expr();
        self.const_depth -= 1;
        result
    }

    /// `expr` or `min:typ:max`.
    pub(crate) fn parse_mintypmax(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        let min = self.parse_expr()?;
        if self.try_pop(&TokenPayload::Colon)?.is_none() {
            return Ok(min);
        }
        let typ = self.parse_expr()?;
        self.expect(TokenPayload::Colon)?;
        let max = self.parse_expr()?;
        Ok(self.new_expr_at(start, ExprKind::MinTypMax { min, typ, max }))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<ExprId> {
        let start = self.start_pos()?;
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((op, prec)) = self.peek_payload()?.and_then(binary_op) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.pop()?;
            let rhs = self.parse_binary(prec + 1)?;
            lhs = self.new_opr(start, op, &[lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        if let Some(op) = self.peek_payload()?.and_then(unary_op) {
            self.pop()?;
            let operand = self.parse_unary()?;
            return Ok(self.new_opr(start, op, &[operand]));
        }
        self.parse_primary()
    }

    pub(crate) fn parse_primary(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        let tok = self.peek_cloned("expression")?;
        let kind = match tok.payload {
            TokenPayload::UnsignedInt(value) => {
                self.pop()?;
                ExprKind::UintConst { value }
            }
            TokenPayload::BasedNumber {
                size,
                signed,
                radix,
                digits,
            } => {
                self.pop()?;
                let digits = self.backend.new_string(&digits);
                ExprKind::BasedConst {
                    size,
                    signed,
                    radix,
                    digits,
                }
            }
            TokenPayload::Real(value) => {
                self.pop()?;
                ExprKind::RealConst { value }
            }
            TokenPayload::Str(s) => {
                self.pop()?;
                ExprKind::StringConst {
                    value: self.backend.new_string(&s),
                }
            }
            TokenPayload::SysIdentifier(s) => {
                self.pop()?;
                let name = self.backend.new_string(&s);
                let arg_array = if self.at(&TokenPayload::OParen)? {
                    self.parse_call_args()?
                } else {
                    PtArray::empty()
                };
                ExprKind::SysFuncCall { name, arg_array }
            }
            TokenPayload::Identifier(_) => return self.parse_name_expr(),
            TokenPayload::OBrace => return self.parse_concat(),
            TokenPayload::OParen => {
                self.pop()?;
                let e = self.parse_mintypmax()?;
                self.expect(TokenPayload::CParen)?;
                return Ok(e);
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(self.new_expr_at(start, kind))
    }

    /// `( expr, ... )`; the parentheses are required.
    pub(crate) fn parse_call_args(&mut self) -> PResult<PtArray<ExprId>> {
        self.expect(TokenPayload::OParen)?;
        let mut args = Vec::new();
        if self.try_pop(&TokenPayload::CParen)?.is_none() {
            loop {
                args.push(self.parse_expr()?);
                if self.try_pop(&TokenPayload::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenPayload::CParen)?;
        }
        Ok(self.alloc(&args))
    }

    fn parse_concat(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        self.expect(TokenPayload::OBrace)?;
        let first = self.parse_expr()?;
        if self.at(&TokenPayload::OBrace)? {
            // {count{a, b}}
            self.pop()?;
            let mut operands = vec![first];
            loop {
                operands.push(self.parse_expr()?);
                if self.try_pop(&TokenPayload::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenPayload::CBrace)?;
            self.expect(TokenPayload::CBrace)?;
            let operand_array = self.alloc(&operands);
            return Ok(self.new_expr_at(start, ExprKind::MultiConcat { operand_array }));
        }
        let mut operands = vec![first];
        while self.try_pop(&TokenPayload::Comma)?.is_some() {
            operands.push(self.parse_expr()?);
        }
        self.expect(TokenPayload::CBrace)?;
        let operand_array = self.alloc(&operands);
        Ok(self.new_expr_at(start, ExprKind::Concat { operand_array }))
    }

    /// True when the upcoming `[n].` is a branch index of a hierarchical
    /// name rather than a bit-select.
    fn at_branch_index(&mut self) -> PResult<bool> {
        Ok(self.at(&TokenPayload::OBrack)?
            && matches!(
                self.peek_nth(1)?.map(|t| &t.payload),
                Some(TokenPayload::UnsignedInt(_))
            )
            && self.at_nth(2, &TokenPayload::CBrack)?
            && self.at_nth(3, &TokenPayload::Dot)?)
    }

    /// `a`, `a.b.c` or `a[1].b`; returns the branches and the tail name.
    pub(crate) fn parse_hier_ident(&mut self) -> PResult<(PtArray<NameBranchId>, StrId)> {
        let (head, _) = self.expect_ident()?;
        let mut hier: Option<HierName> = None;
        let mut tail = head;
        let mut index: Option<i32> = None;
        loop {
            if self.at(&TokenPayload::Dot)? {
                self.pop()?;
                let (name, _) = self.expect_ident()?;
                match hier.as_mut() {
                    None => hier = Some(HierName::new(tail, index, name)),
                    Some(h) => h.add(index, name),
                }
                tail = name;
                index = None;
            } else if self.at_branch_index()? {
                self.pop()?;
                let tok = self.pop()?;
                if let TokenPayload::UnsignedInt(n) = tok.payload {
                    match i32::try_from(n) {
                        Ok(v) => index = Some(v),
                        Err(_) => {
                            let fr = self.region(tok.span);
                            self.error(fr, &format!("branch index {} is out of range.", n));
                        }
                    }
                }
                self.pop()?;
            } else {
                break;
            }
        }
        match hier {
            Some(h) => Ok(h.extract(&mut *self.backend)),
            None => Ok((PtArray::empty(), tail)),
        }
    }

    /// Identifier reference, possibly hierarchical, selected or called.
    pub(crate) fn parse_name_expr(&mut self) -> PResult<ExprId> {
        let start = self.start_pos()?;
        let (namebranch_array, name) = self.parse_hier_ident()?;
        if self.at(&TokenPayload::OParen)? {
            let arg_array = self.parse_call_args()?;
            return Ok(self.new_expr_at(
                start,
                ExprKind::FuncCall {
                    namebranch_array,
                    name,
                    arg_array,
                },
            ));
        }
        self.finish_primary(start, namebranch_array, name)
    }

    /// Parses the bit and part selects following an already-read name.
    pub(crate) fn finish_primary(
        &mut self,
        start: Pos,
        namebranch_array: PtArray<NameBranchId>,
        name: StrId,
    ) -> PResult<ExprId> {
        let mut indices = Vec::new();
        let mut select = None;
        while self.at(&TokenPayload::OBrack)? {
            if select.is_some() {
                return Err(self.unexpected("end of a part-selected name"));
            }
            self.pop()?;
            let left = self.parse_expr()?;
            let mode = if self.try_pop(&TokenPayload::Colon)?.is_some() {
                Some(RangeMode::Const)
            } else if self.try_pop(&TokenPayload::PlusColon)?.is_some() {
                Some(RangeMode::Plus)
            } else if self.try_pop(&TokenPayload::MinusColon)?.is_some() {
                Some(RangeMode::Minus)
            } else {
                None
            };
            match mode {
                Some(mode) => {
                    let right = self.parse_expr()?;
                    select = Some(PartSelect { mode, left, right });
                }
                None => indices.push(left),
            }
            self.expect(TokenPayload::CBrack)?;
        }
        let is_const = self.const_depth > 0;
        let index_array = self.alloc(&indices);
        let id = self.new_expr_at(
            start,
            ExprKind::Primary {
                is_const,
                namebranch_array,
                name,
                index_array,
                select,
            },
        );
        if is_const && !namebranch_array.is_empty() {
            let fr = self.close(start);
            self.error(fr, "hierarchical name cannot be used in a constant expression.");
        }
        Ok(id)
    }

    /// Target of an assignment: a name with selects or a concatenation.
    pub(crate) fn parse_lvalue(&mut self) -> PResult<ExprId> {
        if self.at(&TokenPayload::OBrace)? {
            return self.parse_concat();
        }
        let start = self.start_pos()?;
        let (namebranch_array, name) = self.parse_hier_ident()?;
        self.finish_primary(start, namebranch_array, name)
    }

    /// `[msb:lsb]` with constant bounds.
    pub(crate) fn parse_range(&mut self) -> PResult<RangeBounds> {
        self.expect(TokenPayload::OBrack)?;
        let left = self.parse_const_expr()?;
        self.expect(TokenPayload::Colon)?;
        let right = self.parse_const_expr()?;
        self.expect(TokenPayload::CBrack)?;
        Ok(RangeBounds { left, right })
    }

    pub(crate) fn parse_opt_range(&mut self) -> PResult<Option<RangeBounds>> {
        if self.at(&TokenPayload::OBrack)? {
            Ok(Some(self.parse_range()?))
        } else {
            Ok(None)
        }
    }

    /// `#value` or `#(v1, v2, v3)` on nets, gates and continuous assigns.
    pub(crate) fn parse_opt_delay(&mut self) -> PResult<Option<DelayId>> {
        let start = self.start_pos()?;
        if self.try_pop(&TokenPayload::Hash)?.is_none() {
            return Ok(None);
        }
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
            values.push(self.parse_primary()?);
        }
        let fr = self.close(start);
        if values.len() > 3 {
            self.error(fr, "a delay takes at most three values.");
            values.truncate(3);
        }
        let value_array = self.alloc(&values);
        Ok(Some(self.backend.new_delay(PtDelay { fr, value_array })))
    }

    /// True when the next `(` opens a strength specification.
    pub(crate) fn at_strength(&mut self) -> PResult<bool> {
        Ok(self.at(&TokenPayload::OParen)?
            && self.peek_nth(1)?.map(|t| &t.payload).and_then(strength_value).is_some())
    }

    /// `(strength0, strength1)`, `(charge)` or `(pull)`.
    pub(crate) fn parse_opt_strength(&mut self) -> PResult<Option<StrengthId>> {
        if !self.at_strength()? {
            return Ok(None);
        }
        let start = self.start_pos()?;
        self.pop()?;
        let first = self.parse_strength_value()?;
        let spec = if self.try_pop(&TokenPayload::Comma)?.is_some() {
            let second = self.parse_strength_value()?;
            StrengthSpec::Drive(first, second)
        } else {
            StrengthSpec::Single(first)
        };
        self.expect(TokenPayload::CParen)?;
        let fr = self.close(start);
        if let StrengthSpec::Drive(a, b) = spec {
            let bad = a.is_charge()
                || b.is_charge()
                || a.is_drive0() == b.is_drive0()
                || (matches!(a, StrengthVal::HighZ0 | StrengthVal::HighZ1)
                    && matches!(b, StrengthVal::HighZ0 | StrengthVal::HighZ1));
            if bad {
                self.error(
                    fr,
                    &format!("illegal drive strength ({}, {}).", a.as_str(), b.as_str()),
                );
            }
        }
        Ok(Some(self.backend.new_strength(PtStrength { fr, spec })))
    }

    fn parse_strength_value(&mut self) -> PResult<StrengthVal> {
        match self.peek_payload()?.and_then(strength_value) {
            Some(v) => {
                self.pop()?;
                Ok(v)
            }
            None => Err(self.unexpected("strength")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_region::FileId;
    use crate::msg::MsgMgr;
    use crate::pt::dump::PtDumper;
    use crate::pt::{new_backend, BackendKind};
    use crate::pt_mgr::ModuleRegistry;
    use crate::scanner::TokenScanner;
    use test_case::test_case;

    fn render(src: &str) -> String {
        let mut backend = new_backend(BackendKind::Compact);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        let id = {
            let scanner = TokenScanner::from_str(FileId(0), src);
            let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);
            parser.parse_expr().expect("expression should parse")
        };
        assert_eq!(msgs.error_count(), 0, "{:?}", msgs.diagnostics());
        PtDumper::new(backend.as_store()).expr(id)
    }

    #[test_case("a + b * c", "(a + (b * c))"; "mult binds tighter")]
    #[test_case("a - b - c", "((a - b) - c)"; "left associative")]
    #[test_case("a || b && c", "(a || (b && c))"; "logical precedence")]
    #[test_case("s ? a : b ? c : d", "(s ? a : (b ? c : d))"; "conditional nests right")]
    #[test_case("~&x | y", "((~&x) | y)"; "reduction operator")]
    #[test_case("{2{a, b}}", "{2{a, b}}"; "multi concat")]
    #[test_case("top.u[3].sig[7:0]", "top.u[3].sig[7:0]"; "hierarchical part select")]
    #[test_case("mem[i][j+:4]", "mem[i][j+:4]"; "indexed part select")]
    #[test_case("f(a, 8'hff)", "f(a, 8'hff)"; "function call")]
    fn test_expression_shapes(src: &str, want: &str) {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(render(src), want);
    }

    #[test]
    fn test_branch_index_vs_bit_select() {
        let mut backend = new_backend(BackendKind::Straightforward);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        let id = {
            let scanner = TokenScanner::from_str(FileId(0), "a[1].b[2]");
            let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);
            parser.parse_expr().unwrap()
        };
        let store = backend.as_store();
        match store.expr(id).kind {
            ExprKind::Primary {
                namebranch_array,
                name,
                index_array,
                ..
            } => {
                assert_eq!(store.resolve(name), "b");
                let branches = store.arrays().to_vec(namebranch_array);
                assert_eq!(branches.len(), 1);
                let branch = store.name_branch(branches[0]);
                assert_eq!(store.resolve(branch.name), "a");
                assert_eq!(branch.index, Some(1));
                assert_eq!(index_array.len(), 1);
            }
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn test_branch_index_out_of_range() {
        let mut backend = new_backend(BackendKind::Straightforward);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        let id = {
            let scanner = TokenScanner::from_str(FileId(0), "a[3000000000].b");
            let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);
            parser.parse_expr().unwrap()
        };
        assert_eq!(msgs.find("branch index 3000000000 is out of range.").len(), 1);
        let store = backend.as_store();
        let ExprKind::Primary {
            namebranch_array, ..
        } = store.expr(id).kind
        else {
            panic!("expected a primary");
        };
        let branches = store.arrays().to_vec(namebranch_array);
        assert_eq!(store.name_branch(branches[0]).index, None);
    }

    #[test]
    fn test_hierarchical_name_in_constant_expression() {
        let mut backend = new_backend(BackendKind::Compact);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        {
            let scanner = TokenScanner::from_str(FileId(0), "top.p + 1");
            let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);
            parser.parse_const_expr().unwrap();
        }
        assert_eq!(msgs.find("constant expression").len(), 1);
    }
}
