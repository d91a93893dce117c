// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent parser that drives tokens through the Verilog grammar
//! and freezes each finished construct through the node factory.
//!
//! Per-construct lists (IO heads, declarations, items, ...) live in a stack
//! of `BuildContext` frames; see `context.rs`.

mod context;
mod decl;
mod expr;
mod item;
mod module;
mod stmt;

use std::fmt;

use crate::file_region::{FileId, FileRegion, Pos, Span};
use crate::msg::{code, MsgHandler, Severity};
use crate::pt::{AttrInstId, AttrSpecId, PoolElem, PtArray, PtAttrInst, PtAttrSpec, PtBackend};
use crate::pt_mgr::PtRegistry;
use crate::scanner::{ScanError, TokenScanner};
use crate::token::{Keyword, Token, TokenPayload};

use self::context::BuildContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub region: FileRegion,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, region: FileRegion) -> Self {
        SyntaxError {
            message: message.into(),
            region,
        }
    }

    fn from_scan(file: FileId, e: ScanError) -> Self {
        SyntaxError::new(e.message, FileRegion::new(file, e.span))
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.message, self.region)
    }
}

impl std::error::Error for SyntaxError {}

pub type PResult<T> = Result<T, SyntaxError>;

pub struct Parser<'a> {
    scanner: TokenScanner,
    backend: &'a mut dyn PtBackend,
    msgs: &'a mut dyn MsgHandler,
    registry: &'a mut dyn PtRegistry,
    frames: Vec<BuildContext>,
    /// Non-zero while parsing a constant expression.
    const_depth: u32,
    file: FileId,
    last_limit: Pos,
    consumed: usize,
    error_count: usize,
}

impl<'a> Parser<'a> {
    pub fn new(
        scanner: TokenScanner,
        backend: &'a mut dyn PtBackend,
        msgs: &'a mut dyn MsgHandler,
        registry: &'a mut dyn PtRegistry,
    ) -> Self {
        let file = scanner.file();
        Parser {
            scanner,
            backend,
            msgs,
            registry,
            frames: Vec::new(),
            const_depth: 0,
            file,
            last_limit: Pos::new(1, 1),
            consumed: 0,
            error_count: 0,
        }
    }

    /// Number of errors this parser reported.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    // -- Token access

    fn peek(&mut self) -> PResult<Option<&Token>> {
        let file = self.file;
        self.scanner
            .peekt()
            .map_err(|e| SyntaxError::from_scan(file, e))
    }

    fn peek_nth(&mut self, n: usize) -> PResult<Option<&Token>> {
        let file = self.file;
        self.scanner
            .peek_nth(n)
            .map_err(|e| SyntaxError::from_scan(file, e))
    }

    fn peek_payload(&mut self) -> PResult<Option<&TokenPayload>> {
        Ok(self.peek()?.map(|t| &t.payload))
    }

    /// Clone of the next token, or an error naming `expected` at end of file.
    fn peek_cloned(&mut self, expected: &str) -> PResult<Token> {
        match self.peek()? {
            Some(tok) => Ok(tok.clone()),
            None => Err(self.unexpected(expected)),
        }
    }

    fn at(&mut self, p: &TokenPayload) -> PResult<bool> {
        Ok(self.peek_payload()? == Some(p))
    }

    fn at_nth(&mut self, n: usize, p: &TokenPayload) -> PResult<bool> {
        Ok(self.peek_nth(n)?.map(|t| &t.payload) == Some(p))
    }

    fn peek_kw(&mut self) -> PResult<Option<Keyword>> {
        match self.peek_payload()? {
            Some(TokenPayload::Keyword(kw)) => Ok(Some(*kw)),
            _ => Ok(None),
        }
    }

    fn at_ident(&mut self) -> PResult<bool> {
        Ok(matches!(self.peek_payload()?, Some(TokenPayload::Identifier(_))))
    }

    fn at_eof(&mut self) -> PResult<bool> {
        Ok(self.peek()?.is_none())
    }

    fn flush_scan_diags(&mut self) {
        for d in self.scanner.take_diags() {
            let region = FileRegion::new(self.file, d.span);
            self.report(region, d.severity, code::DIRECTIVE, &d.message);
        }
    }

    fn pop(&mut self) -> PResult<Token> {
        let file = self.file;
        let tok = self
            .scanner
            .popt()
            .map_err(|e| SyntaxError::from_scan(file, e))?;
        self.flush_scan_diags();
        match tok {
            Some(tok) => {
                self.last_limit = tok.span.limit;
                self.consumed += 1;
                Ok(tok)
            }
            None => Err(SyntaxError::new("unexpected end of file", self.here())),
        }
    }

    fn try_pop(&mut self, p: &TokenPayload) -> PResult<Option<FileRegion>> {
        if self.at(p)? {
            let tok = self.pop()?;
            Ok(Some(self.region(tok.span)))
        } else {
            Ok(None)
        }
    }

    fn try_pop_kw(&mut self, kw: Keyword) -> PResult<Option<FileRegion>> {
        self.try_pop(&TokenPayload::Keyword(kw))
    }

    fn expect(&mut self, p: TokenPayload) -> PResult<FileRegion> {
        match self.try_pop(&p)? {
            Some(region) => Ok(region),
            None => Err(self.unexpected(&format!("'{}'", p))),
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> PResult<FileRegion> {
        self.expect(TokenPayload::Keyword(kw))
    }

    fn expect_ident(&mut self) -> PResult<(crate::pt::StrId, FileRegion)> {
        if !self.at_ident()? {
            return Err(self.unexpected("identifier"));
        }
        let tok = self.pop()?;
        let region = self.region(tok.span);
        match tok.payload {
            TokenPayload::Identifier(s) => Ok((self.backend.new_string(&s), region)),
            _ => Err(SyntaxError::new("syntax error: expected identifier", region)),
        }
    }

    fn unexpected(&mut self, expected: &str) -> SyntaxError {
        let file = self.file;
        match self.peek() {
            Ok(Some(tok)) => SyntaxError::new(
                format!("syntax error: expected {}, found '{}'", expected, tok.payload),
                FileRegion::new(file, tok.span),
            ),
            Ok(None) => SyntaxError::new(
                format!("syntax error: expected {}, found end of file", expected),
                self.here(),
            ),
            Err(e) => e,
        }
    }

    // -- Regions

    fn region(&self, span: Span) -> FileRegion {
        FileRegion::new(self.file, span)
    }

    fn here(&self) -> FileRegion {
        let pos = self.scanner.pos();
        self.region(Span::new(pos, pos))
    }

    /// Start position of the next token.
    fn start_pos(&mut self) -> PResult<Pos> {
        match self.peek()? {
            Some(tok) => Ok(tok.span.start),
            None => Ok(self.scanner.pos()),
        }
    }

    /// Region from `start` to the end of the last consumed token.
    fn close(&self, start: Pos) -> FileRegion {
        let limit = if self.last_limit < start {
            start
        } else {
            self.last_limit
        };
        self.region(Span::new(start, limit))
    }

    // -- Diagnostics

    fn report(&mut self, region: FileRegion, severity: Severity, code: &str, message: &str) {
        match severity {
            Severity::Failure | Severity::Error => {
                self.error_count += 1;
                let line = self
                    .scanner
                    .line_text(region.start.lineno)
                    .unwrap_or_else(|| "<line unavailable>".to_string());
                let col = (region.start.colno as usize).saturating_sub(1);
                log::error!("{}: {} @ {}", code, message, region.to_human_string());
                log::error!("{}", line);
                log::error!("{}^", " ".repeat(col));
            }
            Severity::Warning => {
                log::warn!("{}: {} @ {}", code, message, region.to_human_string());
            }
            Severity::Info | Severity::Debug => {}
        }
        self.msgs.report(region, severity, code, message);
    }

    fn error(&mut self, region: FileRegion, message: &str) {
        self.report(region, Severity::Error, code::PARS, message);
    }

    fn port_error(&mut self, region: FileRegion, message: &str) {
        self.report(region, Severity::Error, code::PORT, message);
    }

    fn warning(&mut self, region: FileRegion, message: &str) {
        self.report(region, Severity::Warning, code::PARS, message);
    }

    fn report_syntax(&mut self, e: SyntaxError) {
        self.error(e.region, &e.message);
    }

    // -- Recovery

    /// Skips tokens until `end` has been consumed. `open` keywords nest.
    /// Stops early, without consuming, at the boundary of a module or UDP.
    fn skip_past(&mut self, open: Option<Keyword>, end: Keyword) -> PResult<()> {
        let mut depth = 0usize;
        loop {
            if matches!(
                self.peek_kw()?,
                Some(
                    Keyword::Endmodule
                        | Keyword::Endprimitive
                        | Keyword::Module
                        | Keyword::Macromodule
                        | Keyword::Primitive
                )
            ) {
                return Ok(());
            }
            let tok = self.pop()?;
            match tok.payload {
                TokenPayload::Keyword(kw) if Some(kw) == open => depth += 1,
                TokenPayload::Keyword(kw) if kw == end => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    /// Reports `e` and skips the rest of a block construct ending in `end`.
    fn recover_block(
        &mut self,
        e: SyntaxError,
        open: Option<Keyword>,
        end: Keyword,
    ) -> PResult<()> {
        self.report_syntax(e);
        self.skip_past(open, end)
    }

    // -- Arrays and attributes

    fn alloc<T: PoolElem>(&mut self, items: &[T]) -> PtArray<T> {
        self.backend.arrays_mut().alloc(items)
    }

    /// `(* name [= expr], ... *)` instances preceding a construct.
    fn parse_attrs(&mut self) -> PResult<PtArray<AttrInstId>> {
        let mut insts = Vec::new();
        while self.try_pop(&TokenPayload::AttrStart)?.is_some() {
            let mut specs: Vec<AttrSpecId> = Vec::new();
            loop {
                let start = self.start_pos()?;
                let (name, _) = self.expect_ident()?;
                let expr = if self.try_pop(&TokenPayload::Equals)?.is_some() {
                    Some(self.parse_const_expr()?)
                } else {
                    None
                };
                let fr = self.close(start);
                specs.push(self.backend.new_attr_spec(PtAttrSpec { fr, name, expr }));
                if self.try_pop(&TokenPayload::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenPayload::AttrEnd)?;
            let attrspec_array = self.alloc(&specs);
            insts.push(self.backend.new_attr_inst(PtAttrInst { attrspec_array }));
        }
        Ok(self.alloc(&insts))
    }
}
