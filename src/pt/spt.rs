// SPDX-License-Identifier: Apache-2.0

//! Straightforward backend: every node record is stored unchanged in a
//! per-kind vector.

use string_interner::backend::StringBackend;
use string_interner::symbol::SymbolU32;
use string_interner::StringInterner;

use super::factory::*;
use super::ids::*;
use super::nodes::*;
use super::StrId;

pub struct SptBackend {
    interner: StringInterner<StringBackend<SymbolU32>>,
    arrays: ArrayPool,
    modules: Vec<PtModule>,
    udps: Vec<PtUdp>,
    udp_entries: Vec<PtUdpEntry>,
    udp_values: Vec<PtUdpValue>,
    ports: Vec<PtPort>,
    io_heads: Vec<PtIOHead>,
    io_heads_attached: Vec<bool>,
    io_items: Vec<PtIOItem>,
    decl_heads: Vec<PtDeclHead>,
    decl_heads_attached: Vec<bool>,
    decl_items: Vec<PtDeclItem>,
    ranges: Vec<PtRange>,
    items: Vec<PtItem>,
    def_params: Vec<PtDefParam>,
    cont_assigns: Vec<PtContAssign>,
    insts: Vec<PtInst>,
    connections: Vec<PtConnection>,
    gen_case_items: Vec<PtGenCaseItem>,
    path_decls: Vec<PtPathDecl>,
    path_delays: Vec<PtPathDelay>,
    stmts: Vec<PtStmt>,
    case_items: Vec<PtCaseItem>,
    exprs: Vec<PtExpr>,
    controls: Vec<PtControl>,
    delays: Vec<PtDelay>,
    strengths: Vec<PtStrength>,
    attr_insts: Vec<PtAttrInst>,
    attr_specs: Vec<PtAttrSpec>,
    name_branches: Vec<PtNameBranch>,
    attrs: AttrTable,
    funcs: FuncTable,
}

fn push<T>(v: &mut Vec<T>, node: T) -> u32 {
    let id = v.len() as u32;
    v.push(node);
    id
}

fn bytes_of<T>(v: &[T]) -> usize {
    v.len() * std::mem::size_of::<T>()
}

impl SptBackend {
    pub fn new() -> Self {
        SptBackend {
            interner: StringInterner::new(),
            arrays: ArrayPool::new(),
            modules: Vec::new(),
            udps: Vec::new(),
            udp_entries: Vec::new(),
            udp_values: Vec::new(),
            ports: Vec::new(),
            io_heads: Vec::new(),
            io_heads_attached: Vec::new(),
            io_items: Vec::new(),
            decl_heads: Vec::new(),
            decl_heads_attached: Vec::new(),
            decl_items: Vec::new(),
            ranges: Vec::new(),
            items: Vec::new(),
            def_params: Vec::new(),
            cont_assigns: Vec::new(),
            insts: Vec::new(),
            connections: Vec::new(),
            gen_case_items: Vec::new(),
            path_decls: Vec::new(),
            path_delays: Vec::new(),
            stmts: Vec::new(),
            case_items: Vec::new(),
            exprs: Vec::new(),
            controls: Vec::new(),
            delays: Vec::new(),
            strengths: Vec::new(),
            attr_insts: Vec::new(),
            attr_specs: Vec::new(),
            name_branches: Vec::new(),
            attrs: AttrTable::default(),
            funcs: FuncTable::default(),
        }
    }
}

impl Default for SptBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PtFactory for SptBackend {
    fn new_string(&mut self, text: &str) -> StrId {
        self.interner.get_or_intern(text)
    }

    fn arrays_mut(&mut self) -> &mut ArrayPool {
        &mut self.arrays
    }

    fn new_module(&mut self, spec: ModuleSpec) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        let mut funcs = std::mem::take(&mut self.funcs);
        let iodecl_num = summarize_module(&*self, &spec, id, &mut funcs);
        self.funcs = funcs;
        self.modules.push(PtModule { spec, iodecl_num });
        id
    }

    fn new_udp(&mut self, udp: PtUdp) -> UdpId {
        UdpId(push(&mut self.udps, udp))
    }

    fn new_udp_entry(&mut self, entry: PtUdpEntry) -> UdpEntryId {
        UdpEntryId(push(&mut self.udp_entries, entry))
    }

    fn new_udp_value(&mut self, value: PtUdpValue) -> UdpValueId {
        UdpValueId(push(&mut self.udp_values, value))
    }

    fn new_port(&mut self, port: PtPort) -> PortId {
        PortId(push(&mut self.ports, port))
    }

    fn new_io_head(&mut self, spec: IOHeadSpec) -> PendingHead<IOHeadId> {
        let id = IOHeadId(push(
            &mut self.io_heads,
            PtIOHead {
                spec,
                item_array: PtArray::empty(),
            },
        ));
        self.io_heads_attached.push(false);
        PendingHead::new(id)
    }

    fn attach_io_items(
        &mut self,
        head: PendingHead<IOHeadId>,
        items: PtArray<IOItemId>,
    ) -> IOHeadId {
        let id = head.into_id();
        let attached = &mut self.io_heads_attached[id.index()];
        assert!(!*attached, "io head {:?} attached twice", id);
        *attached = true;
        self.io_heads[id.index()].item_array = items;
        id
    }

    fn new_io_item(&mut self, item: PtIOItem) -> IOItemId {
        IOItemId(push(&mut self.io_items, item))
    }

    fn new_decl_head(&mut self, spec: DeclHeadSpec) -> PendingHead<DeclHeadId> {
        let id = DeclHeadId(push(
            &mut self.decl_heads,
            PtDeclHead {
                spec,
                item_array: PtArray::empty(),
            },
        ));
        self.decl_heads_attached.push(false);
        PendingHead::new(id)
    }

    fn attach_decl_items(
        &mut self,
        head: PendingHead<DeclHeadId>,
        items: PtArray<DeclItemId>,
    ) -> DeclHeadId {
        let id = head.into_id();
        let attached = &mut self.decl_heads_attached[id.index()];
        assert!(!*attached, "decl head {:?} attached twice", id);
        *attached = true;
        self.decl_heads[id.index()].item_array = items;
        id
    }

    fn new_decl_item(&mut self, item: PtDeclItem) -> DeclItemId {
        DeclItemId(push(&mut self.decl_items, item))
    }

    fn new_range(&mut self, range: PtRange) -> RangeId {
        RangeId(push(&mut self.ranges, range))
    }

    fn new_item(&mut self, item: PtItem) -> ItemId {
        ItemId(push(&mut self.items, item))
    }

    fn new_def_param(&mut self, def_param: PtDefParam) -> DefParamId {
        DefParamId(push(&mut self.def_params, def_param))
    }

    fn new_cont_assign(&mut self, cont_assign: PtContAssign) -> ContAssignId {
        ContAssignId(push(&mut self.cont_assigns, cont_assign))
    }

    fn new_inst(&mut self, inst: PtInst) -> InstId {
        InstId(push(&mut self.insts, inst))
    }

    fn new_connection(&mut self, con: PtConnection) -> ConnectionId {
        ConnectionId(push(&mut self.connections, con))
    }

    fn new_gen_case_item(&mut self, item: PtGenCaseItem) -> GenCaseItemId {
        GenCaseItemId(push(&mut self.gen_case_items, item))
    }

    fn new_path_decl(&mut self, path_decl: PtPathDecl) -> PathDeclId {
        PathDeclId(push(&mut self.path_decls, path_decl))
    }

    fn new_path_delay(&mut self, path_delay: PtPathDelay) -> PathDelayId {
        PathDelayId(push(&mut self.path_delays, path_delay))
    }

    fn new_stmt(&mut self, stmt: PtStmt) -> StmtId {
        StmtId(push(&mut self.stmts, stmt))
    }

    fn new_case_item(&mut self, item: PtCaseItem) -> CaseItemId {
        CaseItemId(push(&mut self.case_items, item))
    }

    fn new_expr(&mut self, expr: PtExpr) -> ExprId {
        ExprId(push(&mut self.exprs, expr))
    }

    fn new_control(&mut self, control: PtControl) -> ControlId {
        ControlId(push(&mut self.controls, control))
    }

    fn new_delay(&mut self, delay: PtDelay) -> DelayId {
        DelayId(push(&mut self.delays, delay))
    }

    fn new_strength(&mut self, strength: PtStrength) -> StrengthId {
        StrengthId(push(&mut self.strengths, strength))
    }

    fn new_attr_inst(&mut self, attr: PtAttrInst) -> AttrInstId {
        AttrInstId(push(&mut self.attr_insts, attr))
    }

    fn new_attr_spec(&mut self, spec: PtAttrSpec) -> AttrSpecId {
        AttrSpecId(push(&mut self.attr_specs, spec))
    }

    fn new_name_branch(&mut self, branch: PtNameBranch) -> NameBranchId {
        NameBranchId(push(&mut self.name_branches, branch))
    }

    fn reg_attrinst(&mut self, target: PtNodeRef, attrs: PtArray<AttrInstId>) {
        self.attrs.insert(target, attrs);
    }
}

impl PtStore for SptBackend {
    fn resolve(&self, sym: StrId) -> &str {
        self.interner
            .resolve(sym)
            .expect("symbol was interned by this backend")
    }

    fn lookup(&self, text: &str) -> Option<StrId> {
        self.interner.get(text)
    }

    fn arrays(&self) -> &ArrayPool {
        &self.arrays
    }

    fn module(&self, id: ModuleId) -> PtModule {
        self.modules[id.index()]
    }

    fn udp(&self, id: UdpId) -> PtUdp {
        self.udps[id.index()]
    }

    fn udp_entry(&self, id: UdpEntryId) -> PtUdpEntry {
        self.udp_entries[id.index()]
    }

    fn udp_value(&self, id: UdpValueId) -> PtUdpValue {
        self.udp_values[id.index()]
    }

    fn port(&self, id: PortId) -> PtPort {
        self.ports[id.index()]
    }

    fn io_head(&self, id: IOHeadId) -> PtIOHead {
        self.io_heads[id.index()]
    }

    fn io_item(&self, id: IOItemId) -> PtIOItem {
        self.io_items[id.index()]
    }

    fn decl_head(&self, id: DeclHeadId) -> PtDeclHead {
        self.decl_heads[id.index()]
    }

    fn decl_item(&self, id: DeclItemId) -> PtDeclItem {
        self.decl_items[id.index()]
    }

    fn range(&self, id: RangeId) -> PtRange {
        self.ranges[id.index()]
    }

    fn item(&self, id: ItemId) -> PtItem {
        self.items[id.index()]
    }

    fn def_param(&self, id: DefParamId) -> PtDefParam {
        self.def_params[id.index()]
    }

    fn cont_assign(&self, id: ContAssignId) -> PtContAssign {
        self.cont_assigns[id.index()]
    }

    fn inst(&self, id: InstId) -> PtInst {
        self.insts[id.index()]
    }

    fn connection(&self, id: ConnectionId) -> PtConnection {
        self.connections[id.index()]
    }

    fn gen_case_item(&self, id: GenCaseItemId) -> PtGenCaseItem {
        self.gen_case_items[id.index()]
    }

    fn path_decl(&self, id: PathDeclId) -> PtPathDecl {
        self.path_decls[id.index()]
    }

    fn path_delay(&self, id: PathDelayId) -> PtPathDelay {
        self.path_delays[id.index()]
    }

    fn stmt(&self, id: StmtId) -> PtStmt {
        self.stmts[id.index()]
    }

    fn case_item(&self, id: CaseItemId) -> PtCaseItem {
        self.case_items[id.index()]
    }

    fn expr(&self, id: ExprId) -> PtExpr {
        self.exprs[id.index()]
    }

    fn control(&self, id: ControlId) -> PtControl {
        self.controls[id.index()]
    }

    fn delay(&self, id: DelayId) -> PtDelay {
        self.delays[id.index()]
    }

    fn strength(&self, id: StrengthId) -> PtStrength {
        self.strengths[id.index()]
    }

    fn attr_inst(&self, id: AttrInstId) -> PtAttrInst {
        self.attr_insts[id.index()]
    }

    fn attr_spec(&self, id: AttrSpecId) -> PtAttrSpec {
        self.attr_specs[id.index()]
    }

    fn name_branch(&self, id: NameBranchId) -> PtNameBranch {
        self.name_branches[id.index()]
    }

    fn find_function(&self, module: ModuleId, name: &str) -> Option<ItemId> {
        let sym = self.interner.get(name)?;
        self.funcs.get(module, sym)
    }

    fn attr_insts(&self, target: PtNodeRef) -> Option<PtArray<AttrInstId>> {
        self.attrs.get(target)
    }

    fn node_counts(&self) -> NodeCounts {
        NodeCounts {
            modules: self.modules.len(),
            udps: self.udps.len(),
            udp_entries: self.udp_entries.len(),
            udp_values: self.udp_values.len(),
            ports: self.ports.len(),
            io_heads: self.io_heads.len(),
            io_items: self.io_items.len(),
            decl_heads: self.decl_heads.len(),
            decl_items: self.decl_items.len(),
            ranges: self.ranges.len(),
            items: self.items.len(),
            def_params: self.def_params.len(),
            cont_assigns: self.cont_assigns.len(),
            insts: self.insts.len(),
            connections: self.connections.len(),
            gen_case_items: self.gen_case_items.len(),
            path_decls: self.path_decls.len(),
            path_delays: self.path_delays.len(),
            stmts: self.stmts.len(),
            case_items: self.case_items.len(),
            exprs: self.exprs.len(),
            controls: self.controls.len(),
            delays: self.delays.len(),
            strengths: self.strengths.len(),
            attr_insts: self.attr_insts.len(),
            attr_specs: self.attr_specs.len(),
            name_branches: self.name_branches.len(),
        }
    }

    fn memory_usage(&self) -> usize {
        self.arrays.memory_usage()
            + bytes_of(&self.modules)
            + bytes_of(&self.udps)
            + bytes_of(&self.udp_entries)
            + bytes_of(&self.udp_values)
            + bytes_of(&self.ports)
            + bytes_of(&self.io_heads)
            + bytes_of(&self.io_heads_attached)
            + bytes_of(&self.io_items)
            + bytes_of(&self.decl_heads)
            + bytes_of(&self.decl_heads_attached)
            + bytes_of(&self.decl_items)
            + bytes_of(&self.ranges)
            + bytes_of(&self.items)
            + bytes_of(&self.def_params)
            + bytes_of(&self.cont_assigns)
            + bytes_of(&self.insts)
            + bytes_of(&self.connections)
            + bytes_of(&self.gen_case_items)
            + bytes_of(&self.path_decls)
            + bytes_of(&self.path_delays)
            + bytes_of(&self.stmts)
            + bytes_of(&self.case_items)
            + bytes_of(&self.exprs)
            + bytes_of(&self.controls)
            + bytes_of(&self.delays)
            + bytes_of(&self.strengths)
            + bytes_of(&self.attr_insts)
            + bytes_of(&self.attr_specs)
            + bytes_of(&self.name_branches)
    }
}

impl PtBackend for SptBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Straightforward
    }

    fn as_store(&self) -> &dyn PtStore {
        self
    }
}
