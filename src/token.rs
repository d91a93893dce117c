// SPDX-License-Identifier: Apache-2.0

//! Tokens produced by `TokenScanner`.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::file_region::{Pos, Span};
use crate::pt::types::Radix;

macro_rules! keywords {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant),+
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),+
                }
            }
        }
    };
}

keywords! {
    Always => "always",
    And => "and",
    Assign => "assign",
    Automatic => "automatic",
    Begin => "begin",
    Buf => "buf",
    Bufif0 => "bufif0",
    Bufif1 => "bufif1",
    Case => "case",
    Casex => "casex",
    Casez => "casez",
    Cmos => "cmos",
    Deassign => "deassign",
    Default => "default",
    Defparam => "defparam",
    Disable => "disable",
    Edge => "edge",
    Else => "else",
    End => "end",
    Endcase => "endcase",
    Endfunction => "endfunction",
    Endgenerate => "endgenerate",
    Endmodule => "endmodule",
    Endprimitive => "endprimitive",
    Endspecify => "endspecify",
    Endtable => "endtable",
    Endtask => "endtask",
    Event => "event",
    For => "for",
    Force => "force",
    Forever => "forever",
    Fork => "fork",
    Function => "function",
    Generate => "generate",
    Genvar => "genvar",
    Highz0 => "highz0",
    Highz1 => "highz1",
    If => "if",
    Ifnone => "ifnone",
    Initial => "initial",
    Inout => "inout",
    Input => "input",
    Integer => "integer",
    Join => "join",
    Large => "large",
    Localparam => "localparam",
    Macromodule => "macromodule",
    Medium => "medium",
    Module => "module",
    Nand => "nand",
    Negedge => "negedge",
    Nmos => "nmos",
    Nor => "nor",
    Noshowcancelled => "noshowcancelled",
    Not => "not",
    Notif0 => "notif0",
    Notif1 => "notif1",
    Or => "or",
    Output => "output",
    Parameter => "parameter",
    Pmos => "pmos",
    Posedge => "posedge",
    Primitive => "primitive",
    Pull0 => "pull0",
    Pull1 => "pull1",
    Pulldown => "pulldown",
    Pullup => "pullup",
    PulsestyleOndetect => "pulsestyle_ondetect",
    PulsestyleOnevent => "pulsestyle_onevent",
    Rcmos => "rcmos",
    Real => "real",
    Realtime => "realtime",
    Reg => "reg",
    Release => "release",
    Repeat => "repeat",
    Rnmos => "rnmos",
    Rpmos => "rpmos",
    Rtran => "rtran",
    Rtranif0 => "rtranif0",
    Rtranif1 => "rtranif1",
    Scalared => "scalared",
    Showcancelled => "showcancelled",
    Signed => "signed",
    Small => "small",
    Specify => "specify",
    Specparam => "specparam",
    Strong0 => "strong0",
    Strong1 => "strong1",
    Supply0 => "supply0",
    Supply1 => "supply1",
    Table => "table",
    Task => "task",
    Time => "time",
    Tran => "tran",
    Tranif0 => "tranif0",
    Tranif1 => "tranif1",
    Tri => "tri",
    Tri0 => "tri0",
    Tri1 => "tri1",
    Triand => "triand",
    Trior => "trior",
    Trireg => "trireg",
    Vectored => "vectored",
    Wait => "wait",
    Wand => "wand",
    Weak0 => "weak0",
    Weak1 => "weak1",
    While => "while",
    Wire => "wire",
    Wor => "wor",
    Xnor => "xnor",
    Xor => "xor",
}

static KEYWORDS: Lazy<HashMap<&'static str, Keyword>> =
    Lazy::new(|| Keyword::ALL.iter().map(|kw| (kw.as_str(), *kw)).collect());

impl Keyword {
    pub fn from_str(s: &str) -> Option<Self> {
        KEYWORDS.get(s).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenPayload {
    Identifier(String),
    /// `$display`, `$time`, ...; the text includes the leading `$`.
    SysIdentifier(String),
    Keyword(Keyword),
    /// Unsized decimal number that fits in 32 bits.
    UnsignedInt(u32),
    /// Sized or based number; also unsized decimals too wide for `u32`.
    BasedNumber {
        size: Option<u32>,
        signed: bool,
        radix: Radix,
        digits: String,
    },
    Real(f64),
    Str(String),
    /// Level or edge symbol inside a UDP table (`0 1 x ? b r f p n * -`).
    UdpSymbol(u8),

    OParen,
    CParen,
    OBrack,
    CBrack,
    OBrace,
    CBrace,
    Colon,
    Semi,
    Comma,
    Dot,
    Hash,
    At,
    Question,
    Equals,
    PlusColon,
    MinusColon,
    /// `(*`
    AttrStart,
    /// `*)`
    AttrEnd,
    /// `->`
    Arrow,
    /// `=>`
    ParallelPath,
    /// `*>`
    FullPath,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Bang,
    Tilde,
    Amp,
    TildeAmp,
    Pipe,
    TildePipe,
    Caret,
    TildeCaret,
    EqEq,
    BangEq,
    EqEqEq,
    BangEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    AShl,
    AShr,
}

impl fmt::Display for TokenPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenPayload::Identifier(s) | TokenPayload::SysIdentifier(s) => {
                return write!(f, "{}", s)
            }
            TokenPayload::Keyword(kw) => kw.as_str(),
            TokenPayload::UnsignedInt(v) => return write!(f, "{}", v),
            TokenPayload::BasedNumber {
                size,
                signed,
                radix,
                digits,
            } => {
                if let Some(size) = size {
                    write!(f, "{}", size)?;
                }
                return write!(
                    f,
                    "'{}{}{}",
                    if *signed { "s" } else { "" },
                    radix.as_char(),
                    digits
                );
            }
            TokenPayload::Real(v) => return write!(f, "{:?}", v),
            TokenPayload::Str(s) => return write!(f, "\"{}\"", s),
            TokenPayload::UdpSymbol(c) => return write!(f, "{}", *c as char),
            TokenPayload::OParen => "(",
            TokenPayload::CParen => ")",
            TokenPayload::OBrack => "[",
            TokenPayload::CBrack => "]",
            TokenPayload::OBrace => "{",
            TokenPayload::CBrace => "}",
            TokenPayload::Colon => ":",
            TokenPayload::Semi => ";",
            TokenPayload::Comma => ",",
            TokenPayload::Dot => ".",
            TokenPayload::Hash => "#",
            TokenPayload::At => "@",
            TokenPayload::Question => "?",
            TokenPayload::Equals => "=",
            TokenPayload::PlusColon => "+:",
            TokenPayload::MinusColon => "-:",
            TokenPayload::AttrStart => "(*",
            TokenPayload::AttrEnd => "*)",
            TokenPayload::Arrow => "->",
            TokenPayload::ParallelPath => "=>",
            TokenPayload::FullPath => "*>",
            TokenPayload::Plus => "+",
            TokenPayload::Minus => "-",
            TokenPayload::Star => "*",
            TokenPayload::Slash => "/",
            TokenPayload::Percent => "%",
            TokenPayload::Power => "**",
            TokenPayload::Bang => "!",
            TokenPayload::Tilde => "~",
            TokenPayload::Amp => "&",
            TokenPayload::TildeAmp => "~&",
            TokenPayload::Pipe => "|",
            TokenPayload::TildePipe => "~|",
            TokenPayload::Caret => "^",
            TokenPayload::TildeCaret => "~^",
            TokenPayload::EqEq => "==",
            TokenPayload::BangEq => "!=",
            TokenPayload::EqEqEq => "===",
            TokenPayload::BangEqEq => "!==",
            TokenPayload::Lt => "<",
            TokenPayload::Le => "<=",
            TokenPayload::Gt => ">",
            TokenPayload::Ge => ">=",
            TokenPayload::AmpAmp => "&&",
            TokenPayload::PipePipe => "||",
            TokenPayload::Shl => "<<",
            TokenPayload::Shr => ">>",
            TokenPayload::AShl => "<<<",
            TokenPayload::AShr => ">>>",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub payload: TokenPayload,
    pub span: Span,
}

impl Token {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.payload == TokenPayload::Keyword(kw)
    }

    pub fn start(&self) -> Pos {
        self.span.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::from_str("endmodule"), Some(Keyword::Endmodule));
        assert_eq!(
            Keyword::from_str("pulsestyle_onevent"),
            Some(Keyword::PulsestyleOnevent)
        );
        assert_eq!(Keyword::from_str("Module"), None);
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(*kw));
        }
    }

    #[test]
    fn test_payload_display() {
        let num = TokenPayload::BasedNumber {
            size: Some(8),
            signed: true,
            radix: Radix::Hex,
            digits: "ff".to_string(),
        };
        assert_eq!(num.to_string(), "8'shff");
        assert_eq!(TokenPayload::AShr.to_string(), ">>>");
        assert_eq!(TokenPayload::Keyword(Keyword::Casez).to_string(), "casez");
    }
}
