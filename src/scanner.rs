// SPDX-License-Identifier: Apache-2.0

//! Token scanner for Verilog-HDL source text.
//!
//! The whole source unit is held in memory. Comments and whitespace are
//! skipped, the state-setting compiler directives (`` `timescale``,
//! `` `celldefine``, `` `default_nettype``, ...) update `CompileDirectives`,
//! and everything else is returned as `Token`s with one-based line/column
//! spans. Any number of tokens can be peeked.

use std::collections::VecDeque;
use std::io::Read;

use crate::file_region::{FileId, Pos, Span};
use crate::msg::Severity;
use crate::pt::types::{DelayMode, NetType, Radix, UnconnDrive, TIME_UNSPECIFIED};
use crate::token::{Keyword, Token, TokenPayload};

#[derive(Debug)]
pub struct ScanError {
    pub message: String,
    pub span: Span,
}

/// Non-fatal problem found while reading a compiler directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDiag {
    pub span: Span,
    pub severity: Severity,
    pub message: String,
}

/// Directive state in effect at the current scan position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompileDirectives {
    /// Powers of ten relative to one second; `TIME_UNSPECIFIED` until set.
    pub time_unit: i8,
    pub time_precision: i8,
    pub cell_define: bool,
    pub protected: bool,
    pub default_nettype: NetType,
    pub unconn_drive: UnconnDrive,
    /// `-1` stands for `infinite`.
    pub decay_time: i32,
    pub delay_mode: DelayMode,
    pub suppress_faults: bool,
    pub portfaults: bool,
}

impl Default for CompileDirectives {
    fn default() -> Self {
        CompileDirectives {
            time_unit: TIME_UNSPECIFIED,
            time_precision: TIME_UNSPECIFIED,
            cell_define: false,
            protected: false,
            default_nettype: NetType::Wire,
            unconn_drive: UnconnDrive::HighZ,
            decay_time: -1,
            delay_mode: DelayMode::None,
            suppress_faults: false,
            portfaults: false,
        }
    }
}

/// Parses one `<1|10|100><s|ms|us|ns|ps|fs>` time literal.
fn parse_time_literal(text: &str) -> Option<i8> {
    let text = text.trim();
    let digits_end = text.find(|c: char| !c.is_ascii_digit())?;
    let mag = match &text[..digits_end] {
        "1" => 0,
        "10" => 1,
        "100" => 2,
        _ => return None,
    };
    let unit = match text[digits_end..].trim() {
        "s" => 0,
        "ms" => -3,
        "us" => -6,
        "ns" => -9,
        "ps" => -12,
        "fs" => -15,
        _ => return None,
    };
    Some(mag + unit)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_based_digit(b: u8) -> bool {
    b.is_ascii_hexdigit() || matches!(b, b'x' | b'X' | b'z' | b'Z' | b'?' | b'_')
}

pub struct TokenScanner {
    file: FileId,
    text: Vec<u8>,
    offset: usize,
    pos: Pos,
    /// Peeked tokens with the byte offset each one starts at.
    lookahead: VecDeque<(Token, usize, Pos)>,
    udp_table_mode: bool,
    directives: CompileDirectives,
    diags: Vec<ScanDiag>,
}

impl TokenScanner {
    pub fn from_str(file: FileId, input: &str) -> Self {
        Self::from_bytes(file, input.as_bytes().to_vec())
    }

    /// Source text need not be UTF-8; bytes outside ASCII are only
    /// meaningful inside comments and strings.
    pub fn from_bytes(file: FileId, text: Vec<u8>) -> Self {
        TokenScanner {
            file,
            text,
            offset: 0,
            pos: Pos::new(1, 1),
            lookahead: VecDeque::new(),
            udp_table_mode: false,
            directives: CompileDirectives::default(),
            diags: Vec::new(),
        }
    }

    pub fn from_reader<R: Read>(file: FileId, mut reader: R) -> std::io::Result<Self> {
        let mut text = Vec::new();
        reader.read_to_end(&mut text)?;
        Ok(Self::from_bytes(file, text))
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn directives(&self) -> &CompileDirectives {
        &self.directives
    }

    /// Directive diagnostics collected since the last call.
    pub fn take_diags(&mut self) -> Vec<ScanDiag> {
        std::mem::take(&mut self.diags)
    }

    /// Text of line `lineno` (one-based), used for error context.
    pub fn line_text(&self, lineno: u32) -> Option<String> {
        String::from_utf8_lossy(&self.text)
            .lines()
            .nth((lineno as usize).checked_sub(1)?)
            .map(|s| s.to_string())
    }

    /// Switches between ordinary tokens and UDP table symbols. Already
    /// peeked tokens are rescanned under the new mode.
    pub fn set_udp_table_mode(&mut self, on: bool) {
        if self.udp_table_mode == on {
            return;
        }
        if let Some((_, offset, pos)) = self.lookahead.front() {
            self.offset = *offset;
            self.pos = *pos;
            self.lookahead.clear();
        }
        self.udp_table_mode = on;
    }

    fn fill(&mut self, n: usize) -> Result<(), ScanError> {
        while self.lookahead.len() <= n {
            self.skip_trivia()?;
            let offset = self.offset;
            let pos = self.pos;
            match self.next_token()? {
                Some(tok) => self.lookahead.push_back((tok, offset, pos)),
                None => break,
            }
        }
        Ok(())
    }

    pub fn peekt(&mut self) -> Result<Option<&Token>, ScanError> {
        self.peek_nth(0)
    }

    /// Peeks `n` tokens past the next one (`peek_nth(0) == peekt()`).
    pub fn peek_nth(&mut self, n: usize) -> Result<Option<&Token>, ScanError> {
        self.fill(n)?;
        Ok(self.lookahead.get(n).map(|(tok, _, _)| tok))
    }

    pub fn popt(&mut self) -> Result<Option<Token>, ScanError> {
        self.fill(0)?;
        Ok(self.lookahead.pop_front().map(|(tok, _, _)| tok))
    }

    fn peekb(&self) -> Option<u8> {
        self.text.get(self.offset).copied()
    }

    fn peekb_at(&self, n: usize) -> Option<u8> {
        self.text.get(self.offset + n).copied()
    }

    fn popb(&mut self) -> Option<u8> {
        let b = self.peekb()?;
        self.offset += 1;
        if b == b'\n' {
            self.pos.lineno += 1;
            self.pos.colno = 1;
        } else {
            self.pos.colno += 1;
        }
        Some(b)
    }

    fn error_with_context(&self, msg: &str, span: Span) -> ScanError {
        let line = self
            .line_text(span.start.lineno)
            .unwrap_or_else(|| "<line unavailable>".to_string());
        let col = (span.start.colno as usize).saturating_sub(1);
        log::error!("ScanError: {} @ {}", msg, span.to_human_string());
        log::error!("{}", line);
        log::error!("{}^", " ".repeat(col));
        ScanError {
            message: msg.to_string(),
            span,
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ScanError> {
        loop {
            match (self.peekb(), self.peekb_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => {
                    self.popb();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(b) = self.popb() {
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    self.popb();
                    self.popb();
                    loop {
                        match (self.peekb(), self.peekb_at(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.popb();
                                self.popb();
                                break;
                            }
                            (Some(_), _) => {
                                self.popb();
                            }
                            (None, _) => {
                                return Err(self.error_with_context(
                                    "unterminated block comment",
                                    Span::new(start, self.pos),
                                ));
                            }
                        }
                    }
                }
                (Some(b'`'), _) => self.directive()?,
                _ => return Ok(()),
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let mut s = String::new();
        while let Some(b) = self.peekb() {
            if !pred(b) {
                break;
            }
            s.push(b as char);
            self.popb();
        }
        s
    }

    fn rest_of_line(&mut self) -> String {
        let mut s = String::new();
        while let Some(b) = self.peekb() {
            if b == b'\n' {
                break;
            }
            s.push(b as char);
            self.popb();
        }
        match s.find("//") {
            Some(i) => s[..i].to_string(),
            None => s,
        }
    }

    fn diag(&mut self, span: Span, severity: Severity, message: String) {
        log::warn!("{} @ {}", message, span.to_human_string());
        self.diags.push(ScanDiag {
            span,
            severity,
            message,
        });
    }

    fn directive(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        self.popb();
        let word = self.take_while(is_ident_char);
        let span = Span::new(start, self.pos);
        log::trace!("TokenScanner: directive `{}", word);
        let d = &mut self.directives;
        match word.as_str() {
            "celldefine" => d.cell_define = true,
            "endcelldefine" => d.cell_define = false,
            "protect" => d.protected = true,
            "endprotect" => d.protected = false,
            "nounconnected_drive" => d.unconn_drive = UnconnDrive::HighZ,
            "delay_mode_distributed" => d.delay_mode = DelayMode::Distributed,
            "delay_mode_path" => d.delay_mode = DelayMode::Path,
            "delay_mode_unit" => d.delay_mode = DelayMode::Unit,
            "delay_mode_zero" => d.delay_mode = DelayMode::Zero,
            "suppress_faults" => d.suppress_faults = true,
            "nosuppress_faults" => d.suppress_faults = false,
            "enable_portfaults" => d.portfaults = true,
            "disable_portfaults" => d.portfaults = false,
            "resetall" => *d = CompileDirectives::default(),
            "timescale" => {
                let arg = self.rest_of_line();
                let parsed = arg.split_once('/').and_then(|(unit, prec)| {
                    Some((parse_time_literal(unit)?, parse_time_literal(prec)?))
                });
                match parsed {
                    Some((unit, prec)) if prec <= unit => {
                        self.directives.time_unit = unit;
                        self.directives.time_precision = prec;
                    }
                    _ => self.diag(
                        span,
                        Severity::Error,
                        format!("illegal `timescale argument: {}", arg.trim()),
                    ),
                }
            }
            "default_nettype" => {
                let arg = self.rest_of_line();
                let net_type = match arg.trim() {
                    "wire" => Some(NetType::Wire),
                    "tri" => Some(NetType::Tri),
                    "tri0" => Some(NetType::Tri0),
                    "tri1" => Some(NetType::Tri1),
                    "wand" => Some(NetType::Wand),
                    "triand" => Some(NetType::Triand),
                    "wor" => Some(NetType::Wor),
                    "trior" => Some(NetType::Trior),
                    "trireg" => Some(NetType::Trireg),
                    "none" => Some(NetType::None),
                    _ => None,
                };
                match net_type {
                    Some(t) => self.directives.default_nettype = t,
                    None => self.diag(
                        span,
                        Severity::Error,
                        format!("illegal `default_nettype argument: {}", arg.trim()),
                    ),
                }
            }
            "unconnected_drive" => {
                let arg = self.rest_of_line();
                match arg.trim() {
                    "pull0" => self.directives.unconn_drive = UnconnDrive::Pull0,
                    "pull1" => self.directives.unconn_drive = UnconnDrive::Pull1,
                    other => self.diag(
                        span,
                        Severity::Error,
                        format!("illegal `unconnected_drive argument: {}", other),
                    ),
                }
            }
            "default_decay_time" => {
                let arg = self.rest_of_line();
                let arg = arg.trim();
                if arg == "infinite" {
                    self.directives.decay_time = -1;
                } else {
                    match arg.parse::<i32>() {
                        Ok(v) if v >= 0 => self.directives.decay_time = v,
                        _ => self.diag(
                            span,
                            Severity::Error,
                            format!("illegal `default_decay_time argument: {}", arg),
                        ),
                    }
                }
            }
            _ => {
                self.rest_of_line();
                self.diag(
                    span,
                    Severity::Error,
                    format!("unsupported compiler directive: `{}", word),
                );
            }
        }
        Ok(())
    }

    fn token(&self, payload: TokenPayload, start: Pos) -> Token {
        Token {
            payload,
            span: Span::new(start, self.pos),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        let start = self.pos;
        let b = match self.peekb() {
            Some(b) => b,
            None => return Ok(None),
        };
        if self.udp_table_mode {
            return self.next_table_token(b, start).map(Some);
        }
        if is_ident_start(b) {
            let ident = self.take_while(is_ident_char);
            let payload = match Keyword::from_str(&ident) {
                Some(kw) => TokenPayload::Keyword(kw),
                None => TokenPayload::Identifier(ident),
            };
            return Ok(Some(self.token(payload, start)));
        }
        if b == b'\\' {
            self.popb();
            let ident = self.take_while(|c| !c.is_ascii_whitespace());
            if ident.is_empty() {
                return Err(self.error_with_context(
                    "empty escaped identifier",
                    Span::new(start, self.pos),
                ));
            }
            return Ok(Some(self.token(TokenPayload::Identifier(ident), start)));
        }
        if b == b'$' {
            self.popb();
            let name = self.take_while(is_ident_char);
            if name.is_empty() {
                return Err(self.error_with_context(
                    "expected system task or function name after '$'",
                    Span::new(start, self.pos),
                ));
            }
            return Ok(Some(
                self.token(TokenPayload::SysIdentifier(format!("${}", name)), start),
            ));
        }
        if b.is_ascii_digit() {
            return self.number(start).map(Some);
        }
        if b == b'\'' {
            let payload = self.based_number(None, start)?;
            return Ok(Some(self.token(payload, start)));
        }
        if b == b'"' {
            return self.string(start).map(Some);
        }
        self.operator(b, start).map(Some)
    }

    fn next_table_token(&mut self, b: u8, start: Pos) -> Result<Token, ScanError> {
        if is_ident_start(b) {
            let rest = &self.text[self.offset..];
            if rest.starts_with(b"endtable")
                && !rest.get(8).copied().is_some_and(is_ident_char)
            {
                for _ in 0..8 {
                    self.popb();
                }
                return Ok(self.token(TokenPayload::Keyword(Keyword::Endtable), start));
            }
        }
        self.popb();
        let payload = match b {
            b'(' => TokenPayload::OParen,
            b')' => TokenPayload::CParen,
            b':' => TokenPayload::Colon,
            b';' => TokenPayload::Semi,
            b'0' | b'1' | b'?' | b'*' | b'-' => TokenPayload::UdpSymbol(b),
            b'x' | b'X' | b'b' | b'B' | b'r' | b'R' | b'f' | b'F' | b'p' | b'P' | b'n'
            | b'N' => TokenPayload::UdpSymbol(b.to_ascii_lowercase()),
            _ => {
                return Err(self.error_with_context(
                    &format!("illegal character '{}' in UDP table", b as char),
                    Span::new(start, self.pos),
                ))
            }
        };
        Ok(self.token(payload, start))
    }

    fn number(&mut self, start: Pos) -> Result<Token, ScanError> {
        let digits = self.take_while(|c| c.is_ascii_digit() || c == b'_');
        let is_real = match (self.peekb(), self.peekb_at(1)) {
            (Some(b'.'), Some(d)) if d.is_ascii_digit() => true,
            (Some(b'e' | b'E'), _) => true,
            _ => false,
        };
        if is_real {
            let mut text = digits.replace('_', "");
            if self.peekb() == Some(b'.') {
                self.popb();
                text.push('.');
                text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == b'_').replace('_', ""));
            }
            if let Some(b'e' | b'E') = self.peekb() {
                self.popb();
                text.push('e');
                if let Some(sign @ (b'+' | b'-')) = self.peekb() {
                    self.popb();
                    text.push(sign as char);
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
            return match text.parse::<f64>() {
                Ok(v) => Ok(self.token(TokenPayload::Real(v), start)),
                Err(_) => Err(self.error_with_context(
                    &format!("malformed real number: {}", text),
                    Span::new(start, self.pos),
                )),
            };
        }
        let digits = digits.replace('_', "");
        // A size may be separated from its base by whitespace.
        let mut n = 0;
        while self.peekb_at(n).is_some_and(|c| c == b' ' || c == b'\t') {
            n += 1;
        }
        if self.peekb_at(n) == Some(b'\'') {
            for _ in 0..n {
                self.popb();
            }
            let size = match digits.parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => {
                    return Err(self.error_with_context(
                        &format!("illegal size of a based number: {}", digits),
                        Span::new(start, self.pos),
                    ))
                }
            };
            let payload = self.based_number(Some(size), start)?;
            return Ok(self.token(payload, start));
        }
        let payload = match digits.parse::<u32>() {
            Ok(v) => TokenPayload::UnsignedInt(v),
            Err(_) => TokenPayload::BasedNumber {
                size: None,
                signed: true,
                radix: Radix::Decimal,
                digits,
            },
        };
        Ok(self.token(payload, start))
    }

    fn based_number(&mut self, size: Option<u32>, start: Pos) -> Result<TokenPayload, ScanError> {
        assert_eq!(self.popb(), Some(b'\''));
        let signed = matches!(self.peekb(), Some(b's' | b'S'));
        if signed {
            self.popb();
        }
        let radix = match self.popb() {
            Some(b'b' | b'B') => Radix::Binary,
            Some(b'o' | b'O') => Radix::Octal,
            Some(b'd' | b'D') => Radix::Decimal,
            Some(b'h' | b'H') => Radix::Hex,
            _ => {
                return Err(self.error_with_context(
                    "expected base specifier (b, o, d or h) after '",
                    Span::new(start, self.pos),
                ))
            }
        };
        while self.peekb().is_some_and(|c| c == b' ' || c == b'\t') {
            self.popb();
        }
        let digits = self.take_while(is_based_digit).replace('_', "");
        if digits.is_empty() {
            return Err(self.error_with_context(
                "missing digits in based number",
                Span::new(start, self.pos),
            ));
        }
        let legal = digits.bytes().all(|c| match radix {
            Radix::Binary => matches!(c, b'0' | b'1' | b'x' | b'X' | b'z' | b'Z' | b'?'),
            Radix::Octal => matches!(c, b'0'..=b'7' | b'x' | b'X' | b'z' | b'Z' | b'?'),
            Radix::Decimal => {
                c.is_ascii_digit() || (digits.len() == 1 && matches!(c, b'x' | b'X' | b'z' | b'Z' | b'?'))
            }
            Radix::Hex => true,
        });
        if !legal {
            return Err(self.error_with_context(
                &format!("illegal digit in '{} number: {}", radix.as_char(), digits),
                Span::new(start, self.pos),
            ));
        }
        Ok(TokenPayload::BasedNumber {
            size,
            signed,
            radix,
            digits,
        })
    }

    fn string(&mut self, start: Pos) -> Result<Token, ScanError> {
        self.popb();
        let mut s = String::new();
        loop {
            match self.popb() {
                Some(b'"') => break,
                Some(b'\\') => match self.popb() {
                    Some(b'n') => s.push('\n'),
                    Some(b't') => s.push('\t'),
                    Some(b'\\') => s.push('\\'),
                    Some(b'"') => s.push('"'),
                    Some(d @ b'0'..=b'7') => {
                        let mut v = (d - b'0') as u32;
                        for _ in 0..2 {
                            match self.peekb() {
                                Some(d @ b'0'..=b'7') => {
                                    self.popb();
                                    v = v * 8 + (d - b'0') as u32;
                                }
                                _ => break,
                            }
                        }
                        s.push(char::from_u32(v).unwrap_or('?'));
                    }
                    Some(c) => s.push(c as char),
                    None => break,
                },
                Some(b'\n') | None => {
                    return Err(self.error_with_context(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ))
                }
                Some(c) => s.push(c as char),
            }
        }
        Ok(self.token(TokenPayload::Str(s), start))
    }

    fn operator(&mut self, b: u8, start: Pos) -> Result<Token, ScanError> {
        let b1 = self.peekb_at(1);
        let b2 = self.peekb_at(2);
        let (payload, len) = match (b, b1, b2) {
            (b'(', Some(b'*'), Some(b')')) => (TokenPayload::OParen, 1),
            (b'(', Some(b'*'), _) => (TokenPayload::AttrStart, 2),
            (b'(', _, _) => (TokenPayload::OParen, 1),
            (b')', _, _) => (TokenPayload::CParen, 1),
            (b'[', _, _) => (TokenPayload::OBrack, 1),
            (b']', _, _) => (TokenPayload::CBrack, 1),
            (b'{', _, _) => (TokenPayload::OBrace, 1),
            (b'}', _, _) => (TokenPayload::CBrace, 1),
            (b':', _, _) => (TokenPayload::Colon, 1),
            (b';', _, _) => (TokenPayload::Semi, 1),
            (b',', _, _) => (TokenPayload::Comma, 1),
            (b'.', _, _) => (TokenPayload::Dot, 1),
            (b'#', _, _) => (TokenPayload::Hash, 1),
            (b'@', _, _) => (TokenPayload::At, 1),
            (b'?', _, _) => (TokenPayload::Question, 1),
            (b'+', Some(b':'), _) => (TokenPayload::PlusColon, 2),
            (b'+', _, _) => (TokenPayload::Plus, 1),
            (b'-', Some(b':'), _) => (TokenPayload::MinusColon, 2),
            (b'-', Some(b'>'), _) => (TokenPayload::Arrow, 2),
            (b'-', _, _) => (TokenPayload::Minus, 1),
            (b'*', Some(b'*'), _) => (TokenPayload::Power, 2),
            (b'*', Some(b'>'), _) => (TokenPayload::FullPath, 2),
            // `@(*)`
            (b'*', Some(b')'), _) if self.offset > 0 && self.text[self.offset - 1] == b'(' => {
                (TokenPayload::Star, 1)
            }
            (b'*', Some(b')'), _) => (TokenPayload::AttrEnd, 2),
            (b'*', _, _) => (TokenPayload::Star, 1),
            (b'/', _, _) => (TokenPayload::Slash, 1),
            (b'%', _, _) => (TokenPayload::Percent, 1),
            (b'=', Some(b'='), Some(b'=')) => (TokenPayload::EqEqEq, 3),
            (b'=', Some(b'='), _) => (TokenPayload::EqEq, 2),
            (b'=', Some(b'>'), _) => (TokenPayload::ParallelPath, 2),
            (b'=', _, _) => (TokenPayload::Equals, 1),
            (b'!', Some(b'='), Some(b'=')) => (TokenPayload::BangEqEq, 3),
            (b'!', Some(b'='), _) => (TokenPayload::BangEq, 2),
            (b'!', _, _) => (TokenPayload::Bang, 1),
            (b'~', Some(b'&'), _) => (TokenPayload::TildeAmp, 2),
            (b'~', Some(b'|'), _) => (TokenPayload::TildePipe, 2),
            (b'~', Some(b'^'), _) => (TokenPayload::TildeCaret, 2),
            (b'~', _, _) => (TokenPayload::Tilde, 1),
            (b'^', Some(b'~'), _) => (TokenPayload::TildeCaret, 2),
            (b'^', _, _) => (TokenPayload::Caret, 1),
            (b'&', Some(b'&'), _) => (TokenPayload::AmpAmp, 2),
            (b'&', _, _) => (TokenPayload::Amp, 1),
            (b'|', Some(b'|'), _) => (TokenPayload::PipePipe, 2),
            (b'|', _, _) => (TokenPayload::Pipe, 1),
            (b'<', Some(b'<'), Some(b'<')) => (TokenPayload::AShl, 3),
            (b'<', Some(b'<'), _) => (TokenPayload::Shl, 2),
            (b'<', Some(b'='), _) => (TokenPayload::Le, 2),
            (b'<', _, _) => (TokenPayload::Lt, 1),
            (b'>', Some(b'>'), Some(b'>')) => (TokenPayload::AShr, 3),
            (b'>', Some(b'>'), _) => (TokenPayload::Shr, 2),
            (b'>', Some(b'='), _) => (TokenPayload::Ge, 2),
            (b'>', _, _) => (TokenPayload::Gt, 1),
            _ => {
                self.popb();
                return Err(self.error_with_context(
                    &format!("unexpected character '{}'", b as char),
                    Span::new(start, self.pos),
                ));
            }
        };
        for _ in 0..len {
            self.popb();
        }
        Ok(self.token(payload, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(text: &str) -> Vec<TokenPayload> {
        let mut scanner = TokenScanner::from_str(FileId(0), text);
        let mut out = Vec::new();
        while let Some(tok) = scanner.popt().unwrap() {
            out.push(tok.payload);
        }
        out
    }

    #[test]
    fn test_scan_module_header_with_comments() {
        let got = payloads("module m(a, b); // trailing\n/* block\n comment */ endmodule");
        assert_eq!(
            got,
            vec![
                TokenPayload::Keyword(Keyword::Module),
                TokenPayload::Identifier("m".to_string()),
                TokenPayload::OParen,
                TokenPayload::Identifier("a".to_string()),
                TokenPayload::Comma,
                TokenPayload::Identifier("b".to_string()),
                TokenPayload::CParen,
                TokenPayload::Semi,
                TokenPayload::Keyword(Keyword::Endmodule),
            ]
        );
    }

    #[test]
    fn test_scan_numbers() {
        let got = payloads("42 8'hFf 4 'b10_1x 'sd7 1.5e3 99999999999");
        assert_eq!(got[0], TokenPayload::UnsignedInt(42));
        assert_eq!(
            got[1],
            TokenPayload::BasedNumber {
                size: Some(8),
                signed: false,
                radix: Radix::Hex,
                digits: "Ff".to_string()
            }
        );
        assert_eq!(
            got[2],
            TokenPayload::BasedNumber {
                size: Some(4),
                signed: false,
                radix: Radix::Binary,
                digits: "101x".to_string()
            }
        );
        assert_eq!(
            got[3],
            TokenPayload::BasedNumber {
                size: None,
                signed: true,
                radix: Radix::Decimal,
                digits: "7".to_string()
            }
        );
        assert_eq!(got[4], TokenPayload::Real(1500.0));
        assert!(matches!(
            got[5],
            TokenPayload::BasedNumber {
                size: None,
                radix: Radix::Decimal,
                ..
            }
        ));
    }

    #[test]
    fn test_scan_operators_longest_match() {
        let got = payloads("a <<< b !== c ~^ d ^~ e -> f (* g *) @(*)");
        assert!(got.contains(&TokenPayload::AShl));
        assert!(got.contains(&TokenPayload::BangEqEq));
        assert_eq!(
            got.iter()
                .filter(|p| **p == TokenPayload::TildeCaret)
                .count(),
            2
        );
        assert!(got.contains(&TokenPayload::Arrow));
        assert!(got.contains(&TokenPayload::AttrStart));
        assert!(got.contains(&TokenPayload::AttrEnd));
        assert_eq!(
            &got[got.len() - 4..],
            &[
                TokenPayload::At,
                TokenPayload::OParen,
                TokenPayload::Star,
                TokenPayload::CParen
            ]
        );
    }

    #[test]
    fn test_directives_update_state() {
        let mut scanner = TokenScanner::from_str(
            FileId(0),
            "`timescale 10ns / 1ps\n`celldefine\n`default_nettype none\n`define X 1\nmodule",
        );
        let tok = scanner.popt().unwrap().unwrap();
        assert!(tok.is_keyword(Keyword::Module));
        assert_eq!(tok.span.start, Pos::new(5, 1));
        let d = scanner.directives();
        assert_eq!(d.time_unit, -8);
        assert_eq!(d.time_precision, -12);
        assert!(d.cell_define);
        assert_eq!(d.default_nettype, NetType::None);
        let diags = scanner.take_diags();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unsupported compiler directive"));
    }

    #[test]
    fn test_udp_table_mode_rescans_lookahead() {
        let mut scanner = TokenScanner::from_str(FileId(0), "table 0 1 : x ; (01) endtable");
        assert!(scanner.popt().unwrap().unwrap().is_keyword(Keyword::Table));
        // Peeked as an ordinary number before the mode switch.
        assert_eq!(
            scanner.peekt().unwrap().map(|t| t.payload.clone()),
            Some(TokenPayload::UnsignedInt(0))
        );
        scanner.set_udp_table_mode(true);
        let mut got = Vec::new();
        while let Some(tok) = scanner.popt().unwrap() {
            if tok.is_keyword(Keyword::Endtable) {
                break;
            }
            got.push(tok.payload);
        }
        assert_eq!(
            got,
            vec![
                TokenPayload::UdpSymbol(b'0'),
                TokenPayload::UdpSymbol(b'1'),
                TokenPayload::Colon,
                TokenPayload::UdpSymbol(b'x'),
                TokenPayload::Semi,
                TokenPayload::OParen,
                TokenPayload::UdpSymbol(b'0'),
                TokenPayload::UdpSymbol(b'1'),
                TokenPayload::CParen,
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        let mut scanner = TokenScanner::from_str(FileId(0), "module /* oops");
        assert!(scanner.popt().unwrap().is_some());
        let err = scanner.popt().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }
}
