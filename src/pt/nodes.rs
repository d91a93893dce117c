// SPDX-License-Identifier: Apache-2.0

//! Parse-tree node records.
//!
//! These are the values handed to the factory when a node is built and the
//! values returned by the store when it is read back. Children are referenced
//! by index; sequences are `PtArray` views into the shared pool.

use crate::file_region::FileRegion;

use super::ids::*;
use super::types::*;
use super::StrId;

/// Module header fields that are fixed once the module is parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleSpec {
    pub fr: FileRegion,
    pub name: StrId,
    pub is_macro: bool,
    pub is_cell: bool,
    pub is_protected: bool,
    pub time_unit: i8,
    pub time_precision: i8,
    pub net_type: NetType,
    pub unconn: UnconnDrive,
    pub delay_mode: DelayMode,
    pub decay_time: i32,
    pub explicit_name: bool,
    pub portfaults: bool,
    pub suppress_faults: bool,
    pub config: Option<StrId>,
    pub library: Option<StrId>,
    pub cell: Option<StrId>,
    pub paramport_array: PtArray<DeclHeadId>,
    pub port_array: PtArray<PortId>,
    pub iohead_array: PtArray<IOHeadId>,
    pub declhead_array: PtArray<DeclHeadId>,
    pub item_array: PtArray<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtModule {
    pub spec: ModuleSpec,
    /// Sum of the item counts of every IO head.
    pub iodecl_num: u32,
}

impl std::ops::Deref for PtModule {
    type Target = ModuleSpec;

    fn deref(&self) -> &ModuleSpec {
        &self.spec
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtUdp {
    pub fr: FileRegion,
    pub name: StrId,
    pub is_seq: bool,
    pub port_array: PtArray<PortId>,
    pub iohead_array: PtArray<IOHeadId>,
    pub init_value: Option<ExprId>,
    pub entry_array: PtArray<UdpEntryId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtUdpEntry {
    pub fr: FileRegion,
    pub input_array: PtArray<UdpValueId>,
    /// Present only in sequential tables.
    pub current: Option<UdpValueId>,
    pub output: UdpValueId,
}

/// A level symbol (`0`, `1`, `x`, `?`, `b`, `-`, ...), an edge abbreviation
/// (`r`, `f`, `p`, `n`, `*`) or a parenthesized edge such as `(01)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UdpSymbol {
    Single(u8),
    Edge(u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtUdpValue {
    pub fr: FileRegion,
    pub symbol: UdpSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtPort {
    pub fr: FileRegion,
    pub ext_name: Option<StrId>,
    /// The whole port expression: a primary or a concatenation of primaries.
    pub portref: Option<ExprId>,
    pub portref_array: PtArray<ExprId>,
    /// One direction per element of `portref_array`.
    pub dir_array: PtArray<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IOAux {
    None,
    Reg,
    Net(NetType),
    Var(VarType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IOHeadSpec {
    pub fr: FileRegion,
    pub dir: Direction,
    pub aux: IOAux,
    pub signed: bool,
    pub range: Option<RangeBounds>,
    pub strength: Option<StrengthId>,
    pub delay: Option<DelayId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtIOHead {
    pub spec: IOHeadSpec,
    pub item_array: PtArray<IOItemId>,
}

impl std::ops::Deref for PtIOHead {
    type Target = IOHeadSpec;

    fn deref(&self) -> &IOHeadSpec {
        &self.spec
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtIOItem {
    pub fr: FileRegion,
    pub name: StrId,
    pub init_value: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclHeadSpec {
    pub fr: FileRegion,
    pub decl_type: DeclType,
    pub signed: bool,
    pub range: Option<RangeBounds>,
    pub var_type: Option<VarType>,
    pub net_type: Option<NetType>,
    pub vs_type: VsType,
    pub strength: Option<StrengthId>,
    pub delay: Option<DelayId>,
}

impl DeclHeadSpec {
    /// A head of `decl_type` with every optional field left empty.
    pub fn plain(fr: FileRegion, decl_type: DeclType) -> Self {
        DeclHeadSpec {
            fr,
            decl_type,
            signed: false,
            range: None,
            var_type: None,
            net_type: None,
            vs_type: VsType::None,
            strength: None,
            delay: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtDeclHead {
    pub spec: DeclHeadSpec,
    pub item_array: PtArray<DeclItemId>,
}

impl std::ops::Deref for PtDeclHead {
    type Target = DeclHeadSpec;

    fn deref(&self) -> &DeclHeadSpec {
        &self.spec
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtDeclItem {
    pub fr: FileRegion,
    pub name: StrId,
    pub init_value: Option<ExprId>,
    /// Unpacked dimensions of an array declaration.
    pub range_array: PtArray<RangeId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtRange {
    pub fr: FileRegion,
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtItem {
    pub fr: FileRegion,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemKind {
    DefParam {
        defparam_array: PtArray<DefParamId>,
    },
    ContAssign {
        strength: Option<StrengthId>,
        delay: Option<DelayId>,
        contassign_array: PtArray<ContAssignId>,
    },
    Initial {
        body: StmtId,
    },
    Always {
        body: StmtId,
    },
    Task {
        name: StrId,
        automatic: bool,
        iohead_array: PtArray<IOHeadId>,
        declhead_array: PtArray<DeclHeadId>,
        body: StmtId,
    },
    Function {
        name: StrId,
        automatic: bool,
        signed: bool,
        range: Option<RangeBounds>,
        var_type: Option<VarType>,
        iohead_array: PtArray<IOHeadId>,
        declhead_array: PtArray<DeclHeadId>,
        body: StmtId,
    },
    GateInst {
        gate: GateType,
        strength: Option<StrengthId>,
        delay: Option<DelayId>,
        inst_array: PtArray<InstId>,
    },
    /// Module or UDP instantiation; which one is decided at elaboration.
    MuInst {
        def_name: StrId,
        strength: Option<StrengthId>,
        delay: Option<DelayId>,
        paramcon_array: PtArray<ConnectionId>,
        inst_array: PtArray<InstId>,
    },
    Generate {
        declhead_array: PtArray<DeclHeadId>,
        item_array: PtArray<ItemId>,
    },
    GenBlock {
        name: Option<StrId>,
        declhead_array: PtArray<DeclHeadId>,
        item_array: PtArray<ItemId>,
    },
    GenIf {
        cond: ExprId,
        then_declhead_array: PtArray<DeclHeadId>,
        then_item_array: PtArray<ItemId>,
        has_else: bool,
        else_declhead_array: PtArray<DeclHeadId>,
        else_item_array: PtArray<ItemId>,
    },
    GenCase {
        expr: ExprId,
        caseitem_array: PtArray<GenCaseItemId>,
    },
    GenFor {
        loop_var: StrId,
        init_expr: ExprId,
        cond: ExprId,
        next_expr: ExprId,
        block_name: Option<StrId>,
        declhead_array: PtArray<DeclHeadId>,
        item_array: PtArray<ItemId>,
    },
    SpecItem {
        spec_type: SpecItemType,
        terminal_array: PtArray<ExprId>,
    },
    SpecPath {
        path_type: SpecPathType,
        cond: Option<ExprId>,
        path_decl: PathDeclId,
    },
}

impl ItemKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::DefParam { .. } => "DefParam",
            ItemKind::ContAssign { .. } => "ContAssign",
            ItemKind::Initial { .. } => "Initial",
            ItemKind::Always { .. } => "Always",
            ItemKind::Task { .. } => "Task",
            ItemKind::Function { .. } => "Function",
            ItemKind::GateInst { .. } => "GateInst",
            ItemKind::MuInst { .. } => "MuInst",
            ItemKind::Generate { .. } => "Generate",
            ItemKind::GenBlock { .. } => "GenBlock",
            ItemKind::GenIf { .. } => "GenIf",
            ItemKind::GenCase { .. } => "GenCase",
            ItemKind::GenFor { .. } => "GenFor",
            ItemKind::SpecItem { .. } => "SpecItem",
            ItemKind::SpecPath { .. } => "SpecPath",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtDefParam {
    pub fr: FileRegion,
    pub namebranch_array: PtArray<NameBranchId>,
    pub name: StrId,
    pub value: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtContAssign {
    pub fr: FileRegion,
    pub lhs: ExprId,
    pub rhs: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtInst {
    pub fr: FileRegion,
    pub name: Option<StrId>,
    pub range: Option<RangeBounds>,
    pub port_array: PtArray<ConnectionId>,
}

/// Ordered (`name == None`) or named (`.name(expr)`) connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtConnection {
    pub fr: FileRegion,
    pub name: Option<StrId>,
    pub expr: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtGenCaseItem {
    pub fr: FileRegion,
    /// Empty for the `default` item.
    pub label_array: PtArray<ExprId>,
    pub declhead_array: PtArray<DeclHeadId>,
    pub item_array: PtArray<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtPathDecl {
    pub fr: FileRegion,
    pub edge: PathEdge,
    pub input_array: PtArray<ExprId>,
    pub input_pol: Polarity,
    pub path_type: PathType,
    pub output_array: PtArray<ExprId>,
    pub output_pol: Polarity,
    /// Data source expression of an edge-sensitive path.
    pub expr: Option<ExprId>,
    pub path_delay: PathDelayId,
}

/// Path delay with 1, 2, 3, 6 or 12 values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtPathDelay {
    pub fr: FileRegion,
    pub value_array: PtArray<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtStmt {
    pub fr: FileRegion,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StmtKind {
    Disable {
        namebranch_array: PtArray<NameBranchId>,
        name: StrId,
    },
    Enable {
        namebranch_array: PtArray<NameBranchId>,
        name: StrId,
        arg_array: PtArray<ExprId>,
    },
    SysEnable {
        name: StrId,
        arg_array: PtArray<ExprId>,
    },
    DelayControl {
        control: ControlId,
        body: StmtId,
    },
    EventControl {
        control: ControlId,
        body: StmtId,
    },
    Wait {
        cond: ExprId,
        body: StmtId,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
        control: Option<ControlId>,
    },
    NbAssign {
        lhs: ExprId,
        rhs: ExprId,
        control: Option<ControlId>,
    },
    /// `-> event;`
    Event {
        event: ExprId,
    },
    Null,
    If {
        cond: ExprId,
        then_body: StmtId,
        else_body: Option<StmtId>,
    },
    Case {
        case_type: CaseType,
        expr: ExprId,
        caseitem_array: PtArray<CaseItemId>,
    },
    Forever {
        body: StmtId,
    },
    Repeat {
        expr: ExprId,
        body: StmtId,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    For {
        init: StmtId,
        cond: ExprId,
        next: StmtId,
        body: StmtId,
    },
    PcAssign {
        lhs: ExprId,
        rhs: ExprId,
    },
    Deassign {
        lhs: ExprId,
    },
    Force {
        lhs: ExprId,
        rhs: ExprId,
    },
    Release {
        lhs: ExprId,
    },
    ParBlock {
        name: Option<StrId>,
        declhead_array: PtArray<DeclHeadId>,
        stmt_array: PtArray<StmtId>,
    },
    SeqBlock {
        name: Option<StrId>,
        declhead_array: PtArray<DeclHeadId>,
        stmt_array: PtArray<StmtId>,
    },
}

impl StmtKind {
    /// Human readable statement name used in diagnostics.
    pub fn stmt_name(&self) -> &'static str {
        match self {
            StmtKind::Disable { .. } => "disable statement",
            StmtKind::Enable { .. } => "task enable statement",
            StmtKind::SysEnable { .. } => "system task enable statement",
            StmtKind::DelayControl { .. } => "delay control statement",
            StmtKind::EventControl { .. } => "event control statement",
            StmtKind::Wait { .. } => "wait statement",
            StmtKind::Assign { .. } => "assignment",
            StmtKind::NbAssign { .. } => "nonblocking assignment",
            StmtKind::Event { .. } => "event statement",
            StmtKind::Null => "null statement",
            StmtKind::If { .. } => "if statement",
            StmtKind::Case { .. } => "case statement",
            StmtKind::Forever { .. } => "forever statement",
            StmtKind::Repeat { .. } => "repeat statement",
            StmtKind::While { .. } => "while statement",
            StmtKind::For { .. } => "for statement",
            StmtKind::PcAssign { .. } => "procedural continuous assignment",
            StmtKind::Deassign { .. } => "deassign statement",
            StmtKind::Force { .. } => "force statement",
            StmtKind::Release { .. } => "release statement",
            StmtKind::ParBlock { .. } => "parallel block",
            StmtKind::SeqBlock { .. } => "sequential block",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtCaseItem {
    pub fr: FileRegion,
    /// Empty for the `default` item.
    pub label_array: PtArray<ExprId>,
    pub body: StmtId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtControl {
    pub fr: FileRegion,
    pub kind: ControlKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    /// `#value`
    Delay { value: ExprId },
    /// `@(...)`; an empty list means `@*`.
    Event { event_array: PtArray<ExprId> },
    /// `repeat (rep) @(...)`
    Repeat {
        rep: ExprId,
        event_array: PtArray<ExprId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtDelay {
    pub fr: FileRegion,
    /// One to three values.
    pub value_array: PtArray<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthSpec {
    Drive(StrengthVal, StrengthVal),
    /// Charge strength or a single pull strength.
    Single(StrengthVal),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtStrength {
    pub fr: FileRegion,
    pub spec: StrengthSpec,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtAttrInst {
    pub attrspec_array: PtArray<AttrSpecId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtAttrSpec {
    pub fr: FileRegion,
    pub name: StrId,
    pub expr: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtNameBranch {
    pub name: StrId,
    pub index: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtExpr {
    pub fr: FileRegion,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartSelect {
    pub mode: RangeMode,
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprKind {
    /// Unary, binary and ternary operators.
    Opr {
        op: OpType,
        operand_array: PtArray<ExprId>,
    },
    Concat {
        operand_array: PtArray<ExprId>,
    },
    /// The first operand is the repeat count.
    MultiConcat {
        operand_array: PtArray<ExprId>,
    },
    MinTypMax {
        min: ExprId,
        typ: ExprId,
        max: ExprId,
    },
    Primary {
        is_const: bool,
        namebranch_array: PtArray<NameBranchId>,
        name: StrId,
        index_array: PtArray<ExprId>,
        select: Option<PartSelect>,
    },
    FuncCall {
        namebranch_array: PtArray<NameBranchId>,
        name: StrId,
        arg_array: PtArray<ExprId>,
    },
    SysFuncCall {
        name: StrId,
        arg_array: PtArray<ExprId>,
    },
    /// Plain unsized decimal number.
    UintConst {
        value: u32,
    },
    BasedConst {
        size: Option<u32>,
        signed: bool,
        radix: Radix,
        digits: StrId,
    },
    RealConst {
        value: f64,
    },
    StringConst {
        value: StrId,
    },
}

impl ExprKind {
    /// A plain, non-hierarchical, unselected identifier reference.
    pub fn simple_name(&self) -> Option<StrId> {
        match self {
            ExprKind::Primary {
                namebranch_array,
                name,
                index_array,
                select: None,
                ..
            } if namebranch_array.is_empty() && index_array.is_empty() => Some(*name),
            _ => None,
        }
    }
}

/// Node that attribute instances can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PtNodeRef {
    Module(ModuleId),
    Udp(UdpId),
    IOHead(IOHeadId),
    DeclHead(DeclHeadId),
    Item(ItemId),
    Stmt(StmtId),
}

/// Number of nodes of each kind held by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCounts {
    pub modules: usize,
    pub udps: usize,
    pub udp_entries: usize,
    pub udp_values: usize,
    pub ports: usize,
    pub io_heads: usize,
    pub io_items: usize,
    pub decl_heads: usize,
    pub decl_items: usize,
    pub ranges: usize,
    pub items: usize,
    pub def_params: usize,
    pub cont_assigns: usize,
    pub insts: usize,
    pub connections: usize,
    pub gen_case_items: usize,
    pub path_decls: usize,
    pub path_delays: usize,
    pub stmts: usize,
    pub case_items: usize,
    pub exprs: usize,
    pub controls: usize,
    pub delays: usize,
    pub strengths: usize,
    pub attr_insts: usize,
    pub attr_specs: usize,
    pub name_branches: usize,
}
