// SPDX-License-Identifier: Apache-2.0

//! Construction and read-back contracts shared by the node-storage backends.
//!
//! The parser only ever talks to `dyn PtBackend`; which layout sits behind it
//! is decided once by `new_backend`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::cpt::CptBackend;
use super::ids::*;
use super::nodes::*;
use super::spt::SptBackend;
use super::StrId;

/// Head whose element array has not been attached yet.
///
/// Produced by `PtFactory::new_io_head`/`new_decl_head` and consumed by the
/// matching `attach_*` call, so a head can be completed only once.
#[must_use = "a pending head must be completed with attach_io_items/attach_decl_items"]
#[derive(Debug)]
pub struct PendingHead<T> {
    id: T,
}

impl<T: Copy> PendingHead<T> {
    pub(crate) fn new(id: T) -> Self {
        PendingHead { id }
    }

    pub(crate) fn into_id(self) -> T {
        self.id
    }
}

/// Pure construction operations, one per node kind.
pub trait PtFactory {
    /// Interns `text` in this backend's string table.
    fn new_string(&mut self, text: &str) -> StrId;
    fn arrays_mut(&mut self) -> &mut ArrayPool;

    fn new_module(&mut self, spec: ModuleSpec) -> ModuleId;
    fn new_udp(&mut self, udp: PtUdp) -> UdpId;
    fn new_udp_entry(&mut self, entry: PtUdpEntry) -> UdpEntryId;
    fn new_udp_value(&mut self, value: PtUdpValue) -> UdpValueId;
    fn new_port(&mut self, port: PtPort) -> PortId;
    fn new_io_head(&mut self, spec: IOHeadSpec) -> PendingHead<IOHeadId>;
    fn attach_io_items(
        &mut self,
        head: PendingHead<IOHeadId>,
        items: PtArray<IOItemId>,
    ) -> IOHeadId;
    fn new_io_item(&mut self, item: PtIOItem) -> IOItemId;
    fn new_decl_head(&mut self, spec: DeclHeadSpec) -> PendingHead<DeclHeadId>;
    fn attach_decl_items(
        &mut self,
        head: PendingHead<DeclHeadId>,
        items: PtArray<DeclItemId>,
    ) -> DeclHeadId;
    fn new_decl_item(&mut self, item: PtDeclItem) -> DeclItemId;
    fn new_range(&mut self, range: PtRange) -> RangeId;
    fn new_item(&mut self, item: PtItem) -> ItemId;
    fn new_def_param(&mut self, def_param: PtDefParam) -> DefParamId;
    fn new_cont_assign(&mut self, cont_assign: PtContAssign) -> ContAssignId;
    fn new_inst(&mut self, inst: PtInst) -> InstId;
    fn new_connection(&mut self, con: PtConnection) -> ConnectionId;
    fn new_gen_case_item(&mut self, item: PtGenCaseItem) -> GenCaseItemId;
    fn new_path_decl(&mut self, path_decl: PtPathDecl) -> PathDeclId;
    fn new_path_delay(&mut self, path_delay: PtPathDelay) -> PathDelayId;
    fn new_stmt(&mut self, stmt: PtStmt) -> StmtId;
    fn new_case_item(&mut self, item: PtCaseItem) -> CaseItemId;
    fn new_expr(&mut self, expr: PtExpr) -> ExprId;
    fn new_control(&mut self, control: PtControl) -> ControlId;
    fn new_delay(&mut self, delay: PtDelay) -> DelayId;
    fn new_strength(&mut self, strength: PtStrength) -> StrengthId;
    fn new_attr_inst(&mut self, attr: PtAttrInst) -> AttrInstId;
    fn new_attr_spec(&mut self, spec: PtAttrSpec) -> AttrSpecId;
    fn new_name_branch(&mut self, branch: PtNameBranch) -> NameBranchId;

    /// Attaches attribute instances to an already-built node.
    fn reg_attrinst(&mut self, target: PtNodeRef, attrs: PtArray<AttrInstId>);
}

/// Read-back side of a backend. Every accessor returns the same record that
/// was handed to the factory (heads with their attached arrays).
pub trait PtStore {
    fn resolve(&self, sym: StrId) -> &str;
    /// Looks up an already-interned string.
    fn lookup(&self, text: &str) -> Option<StrId>;
    fn arrays(&self) -> &ArrayPool;

    fn module(&self, id: ModuleId) -> PtModule;
    fn udp(&self, id: UdpId) -> PtUdp;
    fn udp_entry(&self, id: UdpEntryId) -> PtUdpEntry;
    fn udp_value(&self, id: UdpValueId) -> PtUdpValue;
    fn port(&self, id: PortId) -> PtPort;
    fn io_head(&self, id: IOHeadId) -> PtIOHead;
    fn io_item(&self, id: IOItemId) -> PtIOItem;
    fn decl_head(&self, id: DeclHeadId) -> PtDeclHead;
    fn decl_item(&self, id: DeclItemId) -> PtDeclItem;
    fn range(&self, id: RangeId) -> PtRange;
    fn item(&self, id: ItemId) -> PtItem;
    fn def_param(&self, id: DefParamId) -> PtDefParam;
    fn cont_assign(&self, id: ContAssignId) -> PtContAssign;
    fn inst(&self, id: InstId) -> PtInst;
    fn connection(&self, id: ConnectionId) -> PtConnection;
    fn gen_case_item(&self, id: GenCaseItemId) -> PtGenCaseItem;
    fn path_decl(&self, id: PathDeclId) -> PtPathDecl;
    fn path_delay(&self, id: PathDelayId) -> PtPathDelay;
    fn stmt(&self, id: StmtId) -> PtStmt;
    fn case_item(&self, id: CaseItemId) -> PtCaseItem;
    fn expr(&self, id: ExprId) -> PtExpr;
    fn control(&self, id: ControlId) -> PtControl;
    fn delay(&self, id: DelayId) -> PtDelay;
    fn strength(&self, id: StrengthId) -> PtStrength;
    fn attr_inst(&self, id: AttrInstId) -> PtAttrInst;
    fn attr_spec(&self, id: AttrSpecId) -> PtAttrSpec;
    fn name_branch(&self, id: NameBranchId) -> PtNameBranch;

    /// Function declared directly in `module`'s item list.
    fn find_function(&self, module: ModuleId, name: &str) -> Option<ItemId>;
    fn attr_insts(&self, target: PtNodeRef) -> Option<PtArray<AttrInstId>>;
    fn node_counts(&self) -> NodeCounts;
    /// Bytes used by node storage, strings excluded.
    fn memory_usage(&self) -> usize;
}

pub trait PtBackend: PtFactory + PtStore {
    fn kind(&self) -> BackendKind;
    fn as_store(&self) -> &dyn PtStore;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// Every record stored as-is.
    Straightforward,
    /// Records packed into word sequences with a shared flag word.
    #[default]
    Compact,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Straightforward => write!(f, "straightforward"),
            BackendKind::Compact => write!(f, "compact"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "straightforward" | "spt" => Ok(BackendKind::Straightforward),
            "compact" | "cpt" => Ok(BackendKind::Compact),
            _ => Err(format!("unknown backend kind: {:?}", s)),
        }
    }
}

pub fn new_backend(kind: BackendKind) -> Box<dyn PtBackend> {
    match kind {
        BackendKind::Straightforward => Box::new(SptBackend::new()),
        BackendKind::Compact => Box::new(CptBackend::new()),
    }
}

/// Attribute instances keyed by the node they decorate.
#[derive(Debug, Default, Clone)]
pub(crate) struct AttrTable {
    map: HashMap<PtNodeRef, PtArray<AttrInstId>>,
}

impl AttrTable {
    pub(crate) fn insert(&mut self, target: PtNodeRef, attrs: PtArray<AttrInstId>) {
        let prev = self.map.insert(target, attrs);
        assert!(prev.is_none(), "attributes registered twice for {:?}", target);
    }

    pub(crate) fn get(&self, target: PtNodeRef) -> Option<PtArray<AttrInstId>> {
        self.map.get(&target).copied()
    }
}

/// Per-module function lookup tables.
#[derive(Debug, Default, Clone)]
pub(crate) struct FuncTable {
    map: HashMap<(ModuleId, StrId), ItemId>,
}

impl FuncTable {
    pub(crate) fn get(&self, module: ModuleId, name: StrId) -> Option<ItemId> {
        self.map.get(&(module, name)).copied()
    }
}

/// Computes the derived module fields (IO declaration count and function
/// table) from already-built children. Shared by both backends.
pub(crate) fn summarize_module(
    store: &dyn PtStore,
    spec: &ModuleSpec,
    id: ModuleId,
    funcs: &mut FuncTable,
) -> u32 {
    let arrays = store.arrays();
    let iodecl_num = arrays
        .iter(spec.iohead_array)
        .map(|head| store.io_head(head).item_array.len() as u32)
        .sum();
    for item_id in arrays.iter(spec.item_array) {
        if let ItemKind::Function { name, .. } = store.item(item_id).kind {
            funcs.map.entry((id, name)).or_insert(item_id);
        }
    }
    iodecl_num
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!(
            "straightforward".parse::<BackendKind>(),
            Ok(BackendKind::Straightforward)
        );
        assert_eq!("cpt".parse::<BackendKind>(), Ok(BackendKind::Compact));
        assert!("fast".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::default().to_string(), "compact");
    }

    #[test]
    fn test_new_backend_reports_kind() {
        for kind in [BackendKind::Straightforward, BackendKind::Compact] {
            let backend = new_backend(kind);
            assert_eq!(backend.kind(), kind);
            assert_eq!(backend.node_counts(), NodeCounts::default());
        }
    }
}
