// SPDX-License-Identifier: Apache-2.0

//! Small enumerations carried by parse-tree nodes.
//!
//! Every enumeration here can be packed into a few bits of a node's flag word
//! (see `PackBits`); the compact backend relies on that.

/// Conversion between a small enumeration and its bit-field encoding.
pub trait PackBits: Copy {
    /// Number of bits needed for every value of the type.
    const WIDTH: u32;
    fn to_bits(self) -> u32;
    fn from_bits(bits: u32) -> Self;
}

macro_rules! small_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl PackBits for $name {
            const WIDTH: u32 = u32::BITS - ((Self::ALL.len() as u32) - 1).leading_zeros();

            fn to_bits(self) -> u32 {
                self as u32
            }

            fn from_bits(bits: u32) -> Self {
                Self::ALL[bits as usize]
            }
        }
    };
}

small_enum! {
    /// Direction of an IO declaration or of a port reference.
    pub enum Direction {
        NoDirection,
        Input,
        Output,
        Inout,
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::NoDirection => "none",
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        }
    }
}

small_enum! {
    pub enum NetType {
        Wire,
        Tri,
        Tri0,
        Tri1,
        Wand,
        Triand,
        Wor,
        Trior,
        Trireg,
        Supply0,
        Supply1,
        /// `` `default_nettype none``
        None,
    }
}

impl NetType {
    pub fn as_str(self) -> &'static str {
        match self {
            NetType::Wire => "wire",
            NetType::Tri => "tri",
            NetType::Tri0 => "tri0",
            NetType::Tri1 => "tri1",
            NetType::Wand => "wand",
            NetType::Triand => "triand",
            NetType::Wor => "wor",
            NetType::Trior => "trior",
            NetType::Trireg => "trireg",
            NetType::Supply0 => "supply0",
            NetType::Supply1 => "supply1",
            NetType::None => "none",
        }
    }
}

small_enum! {
    pub enum VarType {
        Integer,
        Real,
        Time,
        Realtime,
    }
}

impl VarType {
    pub fn as_str(self) -> &'static str {
        match self {
            VarType::Integer => "integer",
            VarType::Real => "real",
            VarType::Time => "time",
            VarType::Realtime => "realtime",
        }
    }
}

small_enum! {
    pub enum VsType {
        None,
        Vectored,
        Scalared,
    }
}

small_enum! {
    pub enum DeclType {
        Param,
        LocalParam,
        SpecParam,
        Event,
        Genvar,
        Var,
        Reg,
        Net,
    }
}

impl DeclType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclType::Param => "parameter",
            DeclType::LocalParam => "localparam",
            DeclType::SpecParam => "specparam",
            DeclType::Event => "event",
            DeclType::Genvar => "genvar",
            DeclType::Var => "variable",
            DeclType::Reg => "reg",
            DeclType::Net => "net",
        }
    }
}

small_enum! {
    pub enum UnconnDrive {
        HighZ,
        Pull0,
        Pull1,
    }
}

small_enum! {
    pub enum DelayMode {
        None,
        Path,
        Distributed,
        Unit,
        Zero,
    }
}

small_enum! {
    pub enum StrengthVal {
        Supply0,
        Strong0,
        Pull0,
        Weak0,
        HighZ0,
        Supply1,
        Strong1,
        Pull1,
        Weak1,
        HighZ1,
        Large,
        Medium,
        Small,
    }
}

impl StrengthVal {
    pub fn from_keyword(s: &str) -> Option<Self> {
        let v = match s {
            "supply0" => StrengthVal::Supply0,
            "strong0" => StrengthVal::Strong0,
            "pull0" => StrengthVal::Pull0,
            "weak0" => StrengthVal::Weak0,
            "highz0" => StrengthVal::HighZ0,
            "supply1" => StrengthVal::Supply1,
            "strong1" => StrengthVal::Strong1,
            "pull1" => StrengthVal::Pull1,
            "weak1" => StrengthVal::Weak1,
            "highz1" => StrengthVal::HighZ1,
            "large" => StrengthVal::Large,
            "medium" => StrengthVal::Medium,
            "small" => StrengthVal::Small,
            _ => return None,
        };
        Some(v)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrengthVal::Supply0 => "supply0",
            StrengthVal::Strong0 => "strong0",
            StrengthVal::Pull0 => "pull0",
            StrengthVal::Weak0 => "weak0",
            StrengthVal::HighZ0 => "highz0",
            StrengthVal::Supply1 => "supply1",
            StrengthVal::Strong1 => "strong1",
            StrengthVal::Pull1 => "pull1",
            StrengthVal::Weak1 => "weak1",
            StrengthVal::HighZ1 => "highz1",
            StrengthVal::Large => "large",
            StrengthVal::Medium => "medium",
            StrengthVal::Small => "small",
        }
    }

    pub fn is_charge(self) -> bool {
        matches!(
            self,
            StrengthVal::Large | StrengthVal::Medium | StrengthVal::Small
        )
    }

    /// True for strengths that drive a 0 value.
    pub fn is_drive0(self) -> bool {
        matches!(
            self,
            StrengthVal::Supply0
                | StrengthVal::Strong0
                | StrengthVal::Pull0
                | StrengthVal::Weak0
                | StrengthVal::HighZ0
        )
    }
}

small_enum! {
    pub enum OpType {
        // unary
        Plus,
        Minus,
        Not,
        BitNeg,
        UnaryAnd,
        UnaryNand,
        UnaryOr,
        UnaryNor,
        UnaryXor,
        UnaryXnor,
        Posedge,
        Negedge,
        // binary
        Add,
        Sub,
        Mult,
        Div,
        Mod,
        Power,
        Eq,
        Neq,
        CaseEq,
        CaseNeq,
        Lt,
        Le,
        Gt,
        Ge,
        LogAnd,
        LogOr,
        BitAnd,
        BitOr,
        BitXor,
        BitXnor,
        LShift,
        RShift,
        ArithLShift,
        ArithRShift,
        // ternary
        Condition,
    }
}

impl OpType {
    pub fn as_str(self) -> &'static str {
        match self {
            OpType::Plus | OpType::Add => "+",
            OpType::Minus | OpType::Sub => "-",
            OpType::Not => "!",
            OpType::BitNeg => "~",
            OpType::UnaryAnd | OpType::BitAnd => "&",
            OpType::UnaryNand => "~&",
            OpType::UnaryOr | OpType::BitOr => "|",
            OpType::UnaryNor => "~|",
            OpType::UnaryXor | OpType::BitXor => "^",
            OpType::UnaryXnor | OpType::BitXnor => "~^",
            OpType::Posedge => "posedge",
            OpType::Negedge => "negedge",
            OpType::Mult => "*",
            OpType::Div => "/",
            OpType::Mod => "%",
            OpType::Power => "**",
            OpType::Eq => "==",
            OpType::Neq => "!=",
            OpType::CaseEq => "===",
            OpType::CaseNeq => "!==",
            OpType::Lt => "<",
            OpType::Le => "<=",
            OpType::Gt => ">",
            OpType::Ge => ">=",
            OpType::LogAnd => "&&",
            OpType::LogOr => "||",
            OpType::LShift => "<<",
            OpType::RShift => ">>",
            OpType::ArithLShift => "<<<",
            OpType::ArithRShift => ">>>",
            OpType::Condition => "?:",
        }
    }

    pub fn operand_count(self) -> usize {
        match self {
            OpType::Plus
            | OpType::Minus
            | OpType::Not
            | OpType::BitNeg
            | OpType::UnaryAnd
            | OpType::UnaryNand
            | OpType::UnaryOr
            | OpType::UnaryNor
            | OpType::UnaryXor
            | OpType::UnaryXnor
            | OpType::Posedge
            | OpType::Negedge => 1,
            OpType::Condition => 3,
            _ => 2,
        }
    }
}

small_enum! {
    pub enum RangeMode {
        /// `[a:b]`
        Const,
        /// `[a+:b]`
        Plus,
        /// `[a-:b]`
        Minus,
    }
}

small_enum! {
    pub enum Radix {
        Binary,
        Octal,
        Decimal,
        Hex,
    }
}

impl Radix {
    pub fn as_char(self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Octal => 'o',
            Radix::Decimal => 'd',
            Radix::Hex => 'h',
        }
    }
}

small_enum! {
    pub enum CaseType {
        Case,
        CaseX,
        CaseZ,
    }
}

impl CaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseType::Case => "case",
            CaseType::CaseX => "casex",
            CaseType::CaseZ => "casez",
        }
    }
}

small_enum! {
    pub enum GateType {
        And,
        Nand,
        Or,
        Nor,
        Xor,
        Xnor,
        Buf,
        Not,
        Bufif0,
        Bufif1,
        Notif0,
        Notif1,
        Nmos,
        Pmos,
        Rnmos,
        Rpmos,
        Cmos,
        Rcmos,
        Tran,
        Rtran,
        Tranif0,
        Tranif1,
        Rtranif0,
        Rtranif1,
        Pullup,
        Pulldown,
    }
}

impl GateType {
    pub fn as_str(self) -> &'static str {
        match self {
            GateType::And => "and",
            GateType::Nand => "nand",
            GateType::Or => "or",
            GateType::Nor => "nor",
            GateType::Xor => "xor",
            GateType::Xnor => "xnor",
            GateType::Buf => "buf",
            GateType::Not => "not",
            GateType::Bufif0 => "bufif0",
            GateType::Bufif1 => "bufif1",
            GateType::Notif0 => "notif0",
            GateType::Notif1 => "notif1",
            GateType::Nmos => "nmos",
            GateType::Pmos => "pmos",
            GateType::Rnmos => "rnmos",
            GateType::Rpmos => "rpmos",
            GateType::Cmos => "cmos",
            GateType::Rcmos => "rcmos",
            GateType::Tran => "tran",
            GateType::Rtran => "rtran",
            GateType::Tranif0 => "tranif0",
            GateType::Tranif1 => "tranif1",
            GateType::Rtranif0 => "rtranif0",
            GateType::Rtranif1 => "rtranif1",
            GateType::Pullup => "pullup",
            GateType::Pulldown => "pulldown",
        }
    }
}

small_enum! {
    pub enum SpecItemType {
        PulsestyleOnEvent,
        PulsestyleOnDetect,
        ShowCancelled,
        NoShowCancelled,
    }
}

small_enum! {
    pub enum SpecPathType {
        Plain,
        If,
        IfNone,
    }
}

small_enum! {
    pub enum PathEdge {
        NoEdge,
        Posedge,
        Negedge,
    }
}

small_enum! {
    pub enum Polarity {
        Unknown,
        Positive,
        Negative,
    }
}

small_enum! {
    /// `=>` is parallel, `*>` is full.
    pub enum PathType {
        Parallel,
        Full,
    }
}

/// Sentinel for an unspecified time unit or precision.
pub const TIME_UNSPECIFIED: i8 = -16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_width_covers_all_values() {
        assert_eq!(Direction::WIDTH, 2);
        assert_eq!(NetType::WIDTH, 4);
        assert_eq!(OpType::WIDTH, 6);
        assert_eq!(GateType::WIDTH, 5);
        assert_eq!(DeclType::WIDTH, 3);
        for op in OpType::ALL {
            assert_eq!(OpType::from_bits(op.to_bits()), *op);
            assert!(op.to_bits() < (1 << OpType::WIDTH));
        }
    }

    #[test]
    fn test_strength_keywords() {
        assert_eq!(StrengthVal::from_keyword("weak1"), Some(StrengthVal::Weak1));
        assert!(StrengthVal::from_keyword("small").unwrap().is_charge());
        assert!(StrengthVal::Strong0.is_drive0());
        assert_eq!(StrengthVal::from_keyword("wire"), None);
    }
}
