// SPDX-License-Identifier: Apache-2.0

//! Compact backend: each node is packed into a short run of `u32` words.
//!
//! Word 0 of every node is a bit-field holding the node's variant tag, its
//! boolean flags, its small enumerations and one presence bit per optional
//! field or non-empty array. The following words hold only the fields that
//! are present. Reads decode back to the same records the factory received.

use string_interner::backend::StringBackend;
use string_interner::symbol::SymbolU32;
use string_interner::{StringInterner, Symbol};

use crate::file_region::{FileId, FileRegion, Pos};

use super::factory::*;
use super::ids::*;
use super::nodes::*;
use super::types::*;
use super::StrId;

/// Set in word 0 of a head once its element array is attached.
const ATTACHED_BIT: u32 = 1 << 31;
/// Marks a region stored in the six-word form.
const WIDE_REGION: u32 = 1 << 31;
/// Word offset (from word 0) of a head's element array start.
const HEAD_ARRAY_OFFSET: usize = 1;

fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

#[derive(Default)]
struct Packer {
    flags: u32,
    nbits: u32,
    words: Vec<u32>,
}

impl Packer {
    fn new() -> Self {
        Self::default()
    }

    fn bits(&mut self, value: u32, width: u32) {
        debug_assert!(value <= mask(width), "{} does not fit in {} bits", value, width);
        assert!(self.nbits + width <= 31, "node flag word overflow");
        self.flags |= value << self.nbits;
        self.nbits += width;
    }

    fn flag(&mut self, b: bool) {
        self.bits(b as u32, 1);
    }

    fn enum_val<E: PackBits>(&mut self, e: E) {
        self.bits(e.to_bits(), E::WIDTH);
    }

    fn opt_enum<E: PackBits>(&mut self, e: Option<E>) {
        self.flag(e.is_some());
        if let Some(e) = e {
            self.enum_val(e);
        }
    }

    fn word(&mut self, w: u32) {
        self.words.push(w);
    }

    fn id<T: PoolElem>(&mut self, id: T) {
        self.word(id.to_raw());
    }

    fn opt_id<T: PoolElem>(&mut self, id: Option<T>) {
        self.flag(id.is_some());
        if let Some(id) = id {
            self.id(id);
        }
    }

    fn sym(&mut self, sym: StrId) {
        self.word(sym.to_usize() as u32);
    }

    fn opt_sym(&mut self, sym: Option<StrId>) {
        self.flag(sym.is_some());
        if let Some(sym) = sym {
            self.sym(sym);
        }
    }

    fn array<T>(&mut self, a: PtArray<T>) {
        self.flag(!a.is_empty());
        if !a.is_empty() {
            self.full_array(a);
        }
    }

    fn full_array<T>(&mut self, a: PtArray<T>) {
        self.word(a.start());
        self.word(a.len() as u32);
    }

    fn opt_range(&mut self, range: Option<RangeBounds>) {
        self.flag(range.is_some());
        if let Some(r) = range {
            self.id(r.left);
            self.id(r.right);
        }
    }

    fn region(&mut self, fr: FileRegion) {
        let narrow = fr.file.0 < (1 << 15)
            && fr.limit.lineno >= fr.start.lineno
            && fr.limit.lineno - fr.start.lineno < (1 << 16)
            && fr.start.colno < (1 << 16)
            && fr.limit.colno < (1 << 16);
        if narrow {
            self.word((fr.file.0 << 16) | (fr.limit.lineno - fr.start.lineno));
            self.word(fr.start.lineno);
            self.word((fr.start.colno << 16) | fr.limit.colno);
        } else {
            self.word(WIDE_REGION);
            self.word(fr.file.0);
            self.word(fr.start.lineno);
            self.word(fr.start.colno);
            self.word(fr.limit.lineno);
            self.word(fr.limit.colno);
        }
    }
}

struct Unpacker<'a> {
    flags: u32,
    nbits: u32,
    words: &'a [u32],
    pos: usize,
}

impl<'a> Unpacker<'a> {
    fn new(node: &'a [u32]) -> Self {
        Unpacker {
            flags: node[0],
            nbits: 0,
            words: &node[1..],
            pos: 0,
        }
    }

    fn bits(&mut self, width: u32) -> u32 {
        let v = (self.flags >> self.nbits) & mask(width);
        self.nbits += width;
        v
    }

    fn flag(&mut self) -> bool {
        self.bits(1) != 0
    }

    fn enum_val<E: PackBits>(&mut self) -> E {
        E::from_bits(self.bits(E::WIDTH))
    }

    fn opt_enum<E: PackBits>(&mut self) -> Option<E> {
        if self.flag() {
            Some(self.enum_val())
        } else {
            None
        }
    }

    fn word(&mut self) -> u32 {
        let w = self.words[self.pos];
        self.pos += 1;
        w
    }

    fn id<T: PoolElem>(&mut self) -> T {
        T::from_raw(self.word())
    }

    fn opt_id<T: PoolElem>(&mut self) -> Option<T> {
        if self.flag() {
            Some(self.id())
        } else {
            None
        }
    }

    fn sym(&mut self) -> StrId {
        SymbolU32::try_from_usize(self.word() as usize).expect("packed symbol is in range")
    }

    fn opt_sym(&mut self) -> Option<StrId> {
        if self.flag() {
            Some(self.sym())
        } else {
            None
        }
    }

    fn array<T>(&mut self) -> PtArray<T> {
        if self.flag() {
            self.full_array()
        } else {
            PtArray::empty()
        }
    }

    fn full_array<T>(&mut self) -> PtArray<T> {
        let start = self.word();
        let len = self.word();
        if len == 0 {
            PtArray::empty()
        } else {
            PtArray::from_parts(start, len)
        }
    }

    fn opt_range(&mut self) -> Option<RangeBounds> {
        if self.flag() {
            let left = self.id();
            let right = self.id();
            Some(RangeBounds { left, right })
        } else {
            None
        }
    }

    fn region(&mut self) -> FileRegion {
        let w0 = self.word();
        if w0 & WIDE_REGION != 0 {
            let file = FileId(self.word());
            let start = Pos::new(self.word(), self.word());
            let limit = Pos::new(self.word(), self.word());
            FileRegion { file, start, limit }
        } else {
            let file = FileId(w0 >> 16);
            let line_delta = w0 & 0xFFFF;
            let start_line = self.word();
            let cols = self.word();
            FileRegion {
                file,
                start: Pos::new(start_line, cols >> 16),
                limit: Pos::new(start_line + line_delta, cols & 0xFFFF),
            }
        }
    }
}

/// Packed nodes of one kind: concatenated words plus the start of each node.
#[derive(Default)]
struct PackedTable {
    words: Vec<u32>,
    starts: Vec<u32>,
}

impl PackedTable {
    fn push(&mut self, packer: Packer) -> u32 {
        let id = self.starts.len() as u32;
        self.starts.push(self.words.len() as u32);
        self.words.push(packer.flags);
        self.words.extend(packer.words);
        id
    }

    fn node(&self, id: u32) -> &[u32] {
        let start = self.starts[id as usize] as usize;
        let end = self
            .starts
            .get(id as usize + 1)
            .map_or(self.words.len(), |s| *s as usize);
        &self.words[start..end]
    }

    fn get(&self, id: u32) -> Unpacker<'_> {
        Unpacker::new(self.node(id))
    }

    /// Completes a head built with its element array left empty.
    fn attach<T>(&mut self, id: u32, items: PtArray<T>) {
        let start = self.starts[id as usize] as usize;
        assert!(
            self.words[start] & ATTACHED_BIT == 0,
            "head {} attached twice",
            id
        );
        self.words[start] |= ATTACHED_BIT;
        self.words[start + HEAD_ARRAY_OFFSET] = items.start();
        self.words[start + HEAD_ARRAY_OFFSET + 1] = items.len() as u32;
    }

    fn len(&self) -> usize {
        self.starts.len()
    }

    fn memory_usage(&self) -> usize {
        (self.words.len() + self.starts.len()) * std::mem::size_of::<u32>()
    }
}

fn pack_module(p: &mut Packer, m: &PtModule) {
    p.flag(m.is_macro);
    p.flag(m.is_cell);
    p.flag(m.is_protected);
    p.bits((m.time_unit as i32 + 16) as u32, 5);
    p.bits((m.time_precision as i32 + 16) as u32, 5);
    p.enum_val(m.net_type);
    p.enum_val(m.unconn);
    p.enum_val(m.delay_mode);
    p.flag(m.explicit_name);
    p.flag(m.portfaults);
    p.flag(m.suppress_faults);
    p.region(m.fr);
    p.sym(m.name);
    p.word(m.decay_time as u32);
    p.opt_sym(m.config);
    p.opt_sym(m.library);
    p.opt_sym(m.cell);
    p.full_array(m.paramport_array);
    p.full_array(m.port_array);
    p.full_array(m.iohead_array);
    p.full_array(m.declhead_array);
    p.full_array(m.item_array);
    p.word(m.iodecl_num);
}

fn unpack_module(mut u: Unpacker) -> PtModule {
    let is_macro = u.flag();
    let is_cell = u.flag();
    let is_protected = u.flag();
    let time_unit = (u.bits(5) as i32 - 16) as i8;
    let time_precision = (u.bits(5) as i32 - 16) as i8;
    let net_type = u.enum_val();
    let unconn = u.enum_val();
    let delay_mode = u.enum_val();
    let explicit_name = u.flag();
    let portfaults = u.flag();
    let suppress_faults = u.flag();
    let spec = ModuleSpec {
        fr: u.region(),
        name: u.sym(),
        is_macro,
        is_cell,
        is_protected,
        time_unit,
        time_precision,
        net_type,
        unconn,
        delay_mode,
        decay_time: u.word() as i32,
        explicit_name,
        portfaults,
        suppress_faults,
        config: u.opt_sym(),
        library: u.opt_sym(),
        cell: u.opt_sym(),
        paramport_array: u.full_array(),
        port_array: u.full_array(),
        iohead_array: u.full_array(),
        declhead_array: u.full_array(),
        item_array: u.full_array(),
    };
    PtModule {
        spec,
        iodecl_num: u.word(),
    }
}

fn pack_udp(p: &mut Packer, n: &PtUdp) {
    p.flag(n.is_seq);
    p.region(n.fr);
    p.sym(n.name);
    p.array(n.port_array);
    p.array(n.iohead_array);
    p.opt_id(n.init_value);
    p.array(n.entry_array);
}

fn unpack_udp(mut u: Unpacker) -> PtUdp {
    let is_seq = u.flag();
    PtUdp {
        fr: u.region(),
        name: u.sym(),
        is_seq,
        port_array: u.array(),
        iohead_array: u.array(),
        init_value: u.opt_id(),
        entry_array: u.array(),
    }
}

fn pack_udp_entry(p: &mut Packer, n: &PtUdpEntry) {
    p.region(n.fr);
    p.array(n.input_array);
    p.opt_id(n.current);
    p.id(n.output);
}

fn unpack_udp_entry(mut u: Unpacker) -> PtUdpEntry {
    PtUdpEntry {
        fr: u.region(),
        input_array: u.array(),
        current: u.opt_id(),
        output: u.id(),
    }
}

fn pack_udp_value(p: &mut Packer, n: &PtUdpValue) {
    match n.symbol {
        UdpSymbol::Single(c) => {
            p.flag(false);
            p.bits(c as u32, 8);
        }
        UdpSymbol::Edge(a, b) => {
            p.flag(true);
            p.bits(a as u32, 8);
            p.bits(b as u32, 8);
        }
    }
    p.region(n.fr);
}

fn unpack_udp_value(mut u: Unpacker) -> PtUdpValue {
    let symbol = if u.flag() {
        let a = u.bits(8) as u8;
        let b = u.bits(8) as u8;
        UdpSymbol::Edge(a, b)
    } else {
        UdpSymbol::Single(u.bits(8) as u8)
    };
    PtUdpValue {
        fr: u.region(),
        symbol,
    }
}

fn pack_port(p: &mut Packer, n: &PtPort) {
    p.region(n.fr);
    p.opt_sym(n.ext_name);
    p.opt_id(n.portref);
    p.array(n.portref_array);
    p.array(n.dir_array);
}

fn unpack_port(mut u: Unpacker) -> PtPort {
    PtPort {
        fr: u.region(),
        ext_name: u.opt_sym(),
        portref: u.opt_id(),
        portref_array: u.array(),
        dir_array: u.array(),
    }
}

fn pack_io_aux(p: &mut Packer, aux: IOAux) {
    match aux {
        IOAux::None => p.bits(0, 2),
        IOAux::Reg => p.bits(1, 2),
        IOAux::Net(t) => {
            p.bits(2, 2);
            p.enum_val(t);
        }
        IOAux::Var(t) => {
            p.bits(3, 2);
            p.enum_val(t);
        }
    }
}

fn unpack_io_aux(u: &mut Unpacker) -> IOAux {
    match u.bits(2) {
        0 => IOAux::None,
        1 => IOAux::Reg,
        2 => IOAux::Net(u.enum_val()),
        _ => IOAux::Var(u.enum_val()),
    }
}

fn pack_io_head(p: &mut Packer, n: &IOHeadSpec) {
    // Element array first so that attach can patch it in place.
    p.full_array::<IOItemId>(PtArray::empty());
    p.enum_val(n.dir);
    pack_io_aux(p, n.aux);
    p.flag(n.signed);
    p.region(n.fr);
    p.opt_range(n.range);
    p.opt_id(n.strength);
    p.opt_id(n.delay);
}

fn unpack_io_head(mut u: Unpacker) -> PtIOHead {
    let item_array = u.full_array();
    let dir = u.enum_val();
    let aux = unpack_io_aux(&mut u);
    let signed = u.flag();
    let spec = IOHeadSpec {
        fr: u.region(),
        dir,
        aux,
        signed,
        range: u.opt_range(),
        strength: u.opt_id(),
        delay: u.opt_id(),
    };
    PtIOHead { spec, item_array }
}

fn pack_io_item(p: &mut Packer, n: &PtIOItem) {
    p.region(n.fr);
    p.sym(n.name);
    p.opt_id(n.init_value);
}

fn unpack_io_item(mut u: Unpacker) -> PtIOItem {
    PtIOItem {
        fr: u.region(),
        name: u.sym(),
        init_value: u.opt_id(),
    }
}

fn pack_decl_head(p: &mut Packer, n: &DeclHeadSpec) {
    p.full_array::<DeclItemId>(PtArray::empty());
    p.enum_val(n.decl_type);
    p.flag(n.signed);
    p.opt_enum(n.var_type);
    p.opt_enum(n.net_type);
    p.enum_val(n.vs_type);
    p.region(n.fr);
    p.opt_range(n.range);
    p.opt_id(n.strength);
    p.opt_id(n.delay);
}

fn unpack_decl_head(mut u: Unpacker) -> PtDeclHead {
    let item_array = u.full_array();
    let decl_type = u.enum_val();
    let signed = u.flag();
    let var_type = u.opt_enum();
    let net_type = u.opt_enum();
    let vs_type = u.enum_val();
    let spec = DeclHeadSpec {
        fr: u.region(),
        decl_type,
        signed,
        range: u.opt_range(),
        var_type,
        net_type,
        vs_type,
        strength: u.opt_id(),
        delay: u.opt_id(),
    };
    PtDeclHead { spec, item_array }
}

fn pack_decl_item(p: &mut Packer, n: &PtDeclItem) {
    p.region(n.fr);
    p.sym(n.name);
    p.opt_id(n.init_value);
    p.array(n.range_array);
}

fn unpack_decl_item(mut u: Unpacker) -> PtDeclItem {
    PtDeclItem {
        fr: u.region(),
        name: u.sym(),
        init_value: u.opt_id(),
        range_array: u.array(),
    }
}

fn pack_range(p: &mut Packer, n: &PtRange) {
    p.region(n.fr);
    p.id(n.left);
    p.id(n.right);
}

fn unpack_range(mut u: Unpacker) -> PtRange {
    PtRange {
        fr: u.region(),
        left: u.id(),
        right: u.id(),
    }
}

fn pack_item(p: &mut Packer, n: &PtItem) {
    p.region(n.fr);
    match n.kind {
        ItemKind::DefParam { defparam_array } => {
            p.bits(0, 4);
            p.array(defparam_array);
        }
        ItemKind::ContAssign {
            strength,
            delay,
            contassign_array,
        } => {
            p.bits(1, 4);
            p.opt_id(strength);
            p.opt_id(delay);
            p.array(contassign_array);
        }
        ItemKind::Initial { body } => {
            p.bits(2, 4);
            p.id(body);
        }
        ItemKind::Always { body } => {
            p.bits(3, 4);
            p.id(body);
        }
        ItemKind::Task {
            name,
            automatic,
            iohead_array,
            declhead_array,
            body,
        } => {
            p.bits(4, 4);
            p.sym(name);
            p.flag(automatic);
            p.array(iohead_array);
            p.array(declhead_array);
            p.id(body);
        }
        ItemKind::Function {
            name,
            automatic,
            signed,
            range,
            var_type,
            iohead_array,
            declhead_array,
            body,
        } => {
            p.bits(5, 4);
            p.sym(name);
            p.flag(automatic);
            p.flag(signed);
            p.opt_range(range);
            p.opt_enum(var_type);
            p.array(iohead_array);
            p.array(declhead_array);
            p.id(body);
        }
        ItemKind::GateInst {
            gate,
            strength,
            delay,
            inst_array,
        } => {
            p.bits(6, 4);
            p.enum_val(gate);
            p.opt_id(strength);
            p.opt_id(delay);
            p.array(inst_array);
        }
        ItemKind::MuInst {
            def_name,
            strength,
            delay,
            paramcon_array,
            inst_array,
        } => {
            p.bits(7, 4);
            p.sym(def_name);
            p.opt_id(strength);
            p.opt_id(delay);
            p.array(paramcon_array);
            p.array(inst_array);
        }
        ItemKind::Generate {
            declhead_array,
            item_array,
        } => {
            p.bits(8, 4);
            p.array(declhead_array);
            p.array(item_array);
        }
        ItemKind::GenBlock {
            name,
            declhead_array,
            item_array,
        } => {
            p.bits(9, 4);
            p.opt_sym(name);
            p.array(declhead_array);
            p.array(item_array);
        }
        ItemKind::GenIf {
            cond,
            then_declhead_array,
            then_item_array,
            has_else,
            else_declhead_array,
            else_item_array,
        } => {
            p.bits(10, 4);
            p.id(cond);
            p.array(then_declhead_array);
            p.array(then_item_array);
            p.flag(has_else);
            p.array(else_declhead_array);
            p.array(else_item_array);
        }
        ItemKind::GenCase {
            expr,
            caseitem_array,
        } => {
            p.bits(11, 4);
            p.id(expr);
            p.array(caseitem_array);
        }
        ItemKind::GenFor {
            loop_var,
            init_expr,
            cond,
            next_expr,
            block_name,
            declhead_array,
            item_array,
        } => {
            p.bits(12, 4);
            p.sym(loop_var);
            p.id(init_expr);
            p.id(cond);
            p.id(next_expr);
            p.opt_sym(block_name);
            p.array(declhead_array);
            p.array(item_array);
        }
        ItemKind::SpecItem {
            spec_type,
            terminal_array,
        } => {
            p.bits(13, 4);
            p.enum_val(spec_type);
            p.array(terminal_array);
        }
        ItemKind::SpecPath {
            path_type,
            cond,
            path_decl,
        } => {
            p.bits(14, 4);
            p.enum_val(path_type);
            p.opt_id(cond);
            p.id(path_decl);
        }
    }
}

fn unpack_item(mut u: Unpacker) -> PtItem {
    let fr = u.region();
    let kind = match u.bits(4) {
        0 => ItemKind::DefParam {
            defparam_array: u.array(),
        },
        1 => ItemKind::ContAssign {
            strength: u.opt_id(),
            delay: u.opt_id(),
            contassign_array: u.array(),
        },
        2 => ItemKind::Initial { body: u.id() },
        3 => ItemKind::Always { body: u.id() },
        4 => ItemKind::Task {
            name: u.sym(),
            automatic: u.flag(),
            iohead_array: u.array(),
            declhead_array: u.array(),
            body: u.id(),
        },
        5 => ItemKind::Function {
            name: u.sym(),
            automatic: u.flag(),
            signed: u.flag(),
            range: u.opt_range(),
            var_type: u.opt_enum(),
            iohead_array: u.array(),
            declhead_array: u.array(),
            body: u.id(),
        },
        6 => ItemKind::GateInst {
            gate: u.enum_val(),
            strength: u.opt_id(),
            delay: u.opt_id(),
            inst_array: u.array(),
        },
        7 => ItemKind::MuInst {
            def_name: u.sym(),
            strength: u.opt_id(),
            delay: u.opt_id(),
            paramcon_array: u.array(),
            inst_array: u.array(),
        },
        8 => ItemKind::Generate {
            declhead_array: u.array(),
            item_array: u.array(),
        },
        9 => ItemKind::GenBlock {
            name: u.opt_sym(),
            declhead_array: u.array(),
            item_array: u.array(),
        },
        10 => ItemKind::GenIf {
            cond: u.id(),
            then_declhead_array: u.array(),
            then_item_array: u.array(),
            has_else: u.flag(),
            else_declhead_array: u.array(),
            else_item_array: u.array(),
        },
        11 => ItemKind::GenCase {
            expr: u.id(),
            caseitem_array: u.array(),
        },
        12 => ItemKind::GenFor {
            loop_var: u.sym(),
            init_expr: u.id(),
            cond: u.id(),
            next_expr: u.id(),
            block_name: u.opt_sym(),
            declhead_array: u.array(),
            item_array: u.array(),
        },
        13 => ItemKind::SpecItem {
            spec_type: u.enum_val(),
            terminal_array: u.array(),
        },
        14 => ItemKind::SpecPath {
            path_type: u.enum_val(),
            cond: u.opt_id(),
            path_decl: u.id(),
        },
        tag => panic!("corrupt item tag {}", tag),
    };
    PtItem { fr, kind }
}

fn pack_def_param(p: &mut Packer, n: &PtDefParam) {
    p.region(n.fr);
    p.array(n.namebranch_array);
    p.sym(n.name);
    p.id(n.value);
}

fn unpack_def_param(mut u: Unpacker) -> PtDefParam {
    PtDefParam {
        fr: u.region(),
        namebranch_array: u.array(),
        name: u.sym(),
        value: u.id(),
    }
}

fn pack_cont_assign(p: &mut Packer, n: &PtContAssign) {
    p.region(n.fr);
    p.id(n.lhs);
    p.id(n.rhs);
}

fn unpack_cont_assign(mut u: Unpacker) -> PtContAssign {
    PtContAssign {
        fr: u.region(),
        lhs: u.id(),
        rhs: u.id(),
    }
}

fn pack_inst(p: &mut Packer, n: &PtInst) {
    p.region(n.fr);
    p.opt_sym(n.name);
    p.opt_range(n.range);
    p.array(n.port_array);
}

fn unpack_inst(mut u: Unpacker) -> PtInst {
    PtInst {
        fr: u.region(),
        name: u.opt_sym(),
        range: u.opt_range(),
        port_array: u.array(),
    }
}

fn pack_connection(p: &mut Packer, n: &PtConnection) {
    p.region(n.fr);
    p.opt_sym(n.name);
    p.opt_id(n.expr);
}

fn unpack_connection(mut u: Unpacker) -> PtConnection {
    PtConnection {
        fr: u.region(),
        name: u.opt_sym(),
        expr: u.opt_id(),
    }
}

fn pack_gen_case_item(p: &mut Packer, n: &PtGenCaseItem) {
    p.region(n.fr);
    p.array(n.label_array);
    p.array(n.declhead_array);
    p.array(n.item_array);
}

fn unpack_gen_case_item(mut u: Unpacker) -> PtGenCaseItem {
    PtGenCaseItem {
        fr: u.region(),
        label_array: u.array(),
        declhead_array: u.array(),
        item_array: u.array(),
    }
}

fn pack_path_decl(p: &mut Packer, n: &PtPathDecl) {
    p.region(n.fr);
    p.enum_val(n.edge);
    p.array(n.input_array);
    p.enum_val(n.input_pol);
    p.enum_val(n.path_type);
    p.array(n.output_array);
    p.enum_val(n.output_pol);
    p.opt_id(n.expr);
    p.id(n.path_delay);
}

fn unpack_path_decl(mut u: Unpacker) -> PtPathDecl {
    PtPathDecl {
        fr: u.region(),
        edge: u.enum_val(),
        input_array: u.array(),
        input_pol: u.enum_val(),
        path_type: u.enum_val(),
        output_array: u.array(),
        output_pol: u.enum_val(),
        expr: u.opt_id(),
        path_delay: u.id(),
    }
}

fn pack_path_delay(p: &mut Packer, n: &PtPathDelay) {
    p.region(n.fr);
    p.array(n.value_array);
}

fn unpack_path_delay(mut u: Unpacker) -> PtPathDelay {
    PtPathDelay {
        fr: u.region(),
        value_array: u.array(),
    }
}

fn pack_stmt(p: &mut Packer, n: &PtStmt) {
    p.region(n.fr);
    match n.kind {
        StmtKind::Disable {
            namebranch_array,
            name,
        } => {
            p.bits(0, 5);
            p.array(namebranch_array);
            p.sym(name);
        }
        StmtKind::Enable {
            namebranch_array,
            name,
            arg_array,
        } => {
            p.bits(1, 5);
            p.array(namebranch_array);
            p.sym(name);
            p.array(arg_array);
        }
        StmtKind::SysEnable { name, arg_array } => {
            p.bits(2, 5);
            p.sym(name);
            p.array(arg_array);
        }
        StmtKind::DelayControl { control, body } => {
            p.bits(3, 5);
            p.id(control);
            p.id(body);
        }
        StmtKind::EventControl { control, body } => {
            p.bits(4, 5);
            p.id(control);
            p.id(body);
        }
        StmtKind::Wait { cond, body } => {
            p.bits(5, 5);
            p.id(cond);
            p.id(body);
        }
        StmtKind::Assign { lhs, rhs, control } => {
            p.bits(6, 5);
            p.id(lhs);
            p.id(rhs);
            p.opt_id(control);
        }
        StmtKind::NbAssign { lhs, rhs, control } => {
            p.bits(7, 5);
            p.id(lhs);
            p.id(rhs);
            p.opt_id(control);
        }
        StmtKind::Event { event } => {
            p.bits(8, 5);
            p.id(event);
        }
        StmtKind::Null => p.bits(9, 5),
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            p.bits(10, 5);
            p.id(cond);
            p.id(then_body);
            p.opt_id(else_body);
        }
        StmtKind::Case {
            case_type,
            expr,
            caseitem_array,
        } => {
            p.bits(11, 5);
            p.enum_val(case_type);
            p.id(expr);
            p.array(caseitem_array);
        }
        StmtKind::Forever { body } => {
            p.bits(12, 5);
            p.id(body);
        }
        StmtKind::Repeat { expr, body } => {
            p.bits(13, 5);
            p.id(expr);
            p.id(body);
        }
        StmtKind::While { cond, body } => {
            p.bits(14, 5);
            p.id(cond);
            p.id(body);
        }
        StmtKind::For {
            init,
            cond,
            next,
            body,
        } => {
            p.bits(15, 5);
            p.id(init);
            p.id(cond);
            p.id(next);
            p.id(body);
        }
        StmtKind::PcAssign { lhs, rhs } => {
            p.bits(16, 5);
            p.id(lhs);
            p.id(rhs);
        }
        StmtKind::Deassign { lhs } => {
            p.bits(17, 5);
            p.id(lhs);
        }
        StmtKind::Force { lhs, rhs } => {
            p.bits(18, 5);
            p.id(lhs);
            p.id(rhs);
        }
        StmtKind::Release { lhs } => {
            p.bits(19, 5);
            p.id(lhs);
        }
        StmtKind::ParBlock {
            name,
            declhead_array,
            stmt_array,
        } => {
            p.bits(20, 5);
            p.opt_sym(name);
            p.array(declhead_array);
            p.array(stmt_array);
        }
        StmtKind::SeqBlock {
            name,
            declhead_array,
            stmt_array,
        } => {
            p.bits(21, 5);
            p.opt_sym(name);
            p.array(declhead_array);
            p.array(stmt_array);
        }
    }
}

fn unpack_stmt(mut u: Unpacker) -> PtStmt {
    let fr = u.region();
    let kind = match u.bits(5) {
        0 => StmtKind::Disable {
            namebranch_array: u.array(),
            name: u.sym(),
        },
        1 => StmtKind::Enable {
            namebranch_array: u.array(),
            name: u.sym(),
            arg_array: u.array(),
        },
        2 => StmtKind::SysEnable {
            name: u.sym(),
            arg_array: u.array(),
        },
        3 => StmtKind::DelayControl {
            control: u.id(),
            body: u.id(),
        },
        4 => StmtKind::EventControl {
            control: u.id(),
            body: u.id(),
        },
        5 => StmtKind::Wait {
            cond: u.id(),
            body: u.id(),
        },
        6 => StmtKind::Assign {
            lhs: u.id(),
            rhs: u.id(),
            control: u.opt_id(),
        },
        7 => StmtKind::NbAssign {
            lhs: u.id(),
            rhs: u.id(),
            control: u.opt_id(),
        },
        8 => StmtKind::Event { event: u.id() },
        9 => StmtKind::Null,
        10 => StmtKind::If {
            cond: u.id(),
            then_body: u.id(),
            else_body: u.opt_id(),
        },
        11 => StmtKind::Case {
            case_type: u.enum_val(),
            expr: u.id(),
            caseitem_array: u.array(),
        },
        12 => StmtKind::Forever { body: u.id() },
        13 => StmtKind::Repeat {
            expr: u.id(),
            body: u.id(),
        },
        14 => StmtKind::While {
            cond: u.id(),
            body: u.id(),
        },
        15 => StmtKind::For {
            init: u.id(),
            cond: u.id(),
            next: u.id(),
            body: u.id(),
        },
        16 => StmtKind::PcAssign {
            lhs: u.id(),
            rhs: u.id(),
        },
        17 => StmtKind::Deassign { lhs: u.id() },
        18 => StmtKind::Force {
            lhs: u.id(),
            rhs: u.id(),
        },
        19 => StmtKind::Release { lhs: u.id() },
        20 => StmtKind::ParBlock {
            name: u.opt_sym(),
            declhead_array: u.array(),
            stmt_array: u.array(),
        },
        21 => StmtKind::SeqBlock {
            name: u.opt_sym(),
            declhead_array: u.array(),
            stmt_array: u.array(),
        },
        tag => panic!("corrupt statement tag {}", tag),
    };
    PtStmt { fr, kind }
}

fn pack_case_item(p: &mut Packer, n: &PtCaseItem) {
    p.region(n.fr);
    p.array(n.label_array);
    p.id(n.body);
}

fn unpack_case_item(mut u: Unpacker) -> PtCaseItem {
    PtCaseItem {
        fr: u.region(),
        label_array: u.array(),
        body: u.id(),
    }
}

fn pack_expr(p: &mut Packer, n: &PtExpr) {
    p.region(n.fr);
    match n.kind {
        ExprKind::Opr { op, operand_array } => {
            p.bits(0, 4);
            p.enum_val(op);
            p.array(operand_array);
        }
        ExprKind::Concat { operand_array } => {
            p.bits(1, 4);
            p.array(operand_array);
        }
        ExprKind::MultiConcat { operand_array } => {
            p.bits(2, 4);
            p.array(operand_array);
        }
        ExprKind::MinTypMax { min, typ, max } => {
            p.bits(3, 4);
            p.id(min);
            p.id(typ);
            p.id(max);
        }
        ExprKind::Primary {
            is_const,
            namebranch_array,
            name,
            index_array,
            select,
        } => {
            p.bits(4, 4);
            p.flag(is_const);
            p.array(namebranch_array);
            p.sym(name);
            p.array(index_array);
            p.flag(select.is_some());
            if let Some(sel) = select {
                p.enum_val(sel.mode);
                p.id(sel.left);
                p.id(sel.right);
            }
        }
        ExprKind::FuncCall {
            namebranch_array,
            name,
            arg_array,
        } => {
            p.bits(5, 4);
            p.array(namebranch_array);
            p.sym(name);
            p.array(arg_array);
        }
        ExprKind::SysFuncCall { name, arg_array } => {
            p.bits(6, 4);
            p.sym(name);
            p.array(arg_array);
        }
        ExprKind::UintConst { value } => {
            p.bits(7, 4);
            p.word(value);
        }
        ExprKind::BasedConst {
            size,
            signed,
            radix,
            digits,
        } => {
            p.bits(8, 4);
            p.flag(size.is_some());
            if let Some(size) = size {
                p.word(size);
            }
            p.flag(signed);
            p.enum_val(radix);
            p.sym(digits);
        }
        ExprKind::RealConst { value } => {
            p.bits(9, 4);
            let bits = value.to_bits();
            p.word(bits as u32);
            p.word((bits >> 32) as u32);
        }
        ExprKind::StringConst { value } => {
            p.bits(10, 4);
            p.sym(value);
        }
    }
}

fn unpack_expr(mut u: Unpacker) -> PtExpr {
    let fr = u.region();
    let kind = match u.bits(4) {
        0 => ExprKind::Opr {
            op: u.enum_val(),
            operand_array: u.array(),
        },
        1 => ExprKind::Concat {
            operand_array: u.array(),
        },
        2 => ExprKind::MultiConcat {
            operand_array: u.array(),
        },
        3 => ExprKind::MinTypMax {
            min: u.id(),
            typ: u.id(),
            max: u.id(),
        },
        4 => {
            let is_const = u.flag();
            let namebranch_array = u.array();
            let name = u.sym();
            let index_array = u.array();
            let select = if u.flag() {
                Some(PartSelect {
                    mode: u.enum_val(),
                    left: u.id(),
                    right: u.id(),
                })
            } else {
                None
            };
            ExprKind::Primary {
                is_const,
                namebranch_array,
                name,
                index_array,
                select,
            }
        }
        5 => ExprKind::FuncCall {
            namebranch_array: u.array(),
            name: u.sym(),
            arg_array: u.array(),
        },
        6 => ExprKind::SysFuncCall {
            name: u.sym(),
            arg_array: u.array(),
        },
        7 => ExprKind::UintConst { value: u.word() },
        8 => {
            let size = if u.flag() { Some(u.word()) } else { None };
            ExprKind::BasedConst {
                size,
                signed: u.flag(),
                radix: u.enum_val(),
                digits: u.sym(),
            }
        }
        9 => {
            let lo = u.word() as u64;
            let hi = u.word() as u64;
            ExprKind::RealConst {
                value: f64::from_bits((hi << 32) | lo),
            }
        }
        10 => ExprKind::StringConst { value: u.sym() },
        tag => panic!("corrupt expression tag {}", tag),
    };
    PtExpr { fr, kind }
}

fn pack_control(p: &mut Packer, n: &PtControl) {
    p.region(n.fr);
    match n.kind {
        ControlKind::Delay { value } => {
            p.bits(0, 2);
            p.id(value);
        }
        ControlKind::Event { event_array } => {
            p.bits(1, 2);
            p.array(event_array);
        }
        ControlKind::Repeat { rep, event_array } => {
            p.bits(2, 2);
            p.id(rep);
            p.array(event_array);
        }
    }
}

fn unpack_control(mut u: Unpacker) -> PtControl {
    let fr = u.region();
    let kind = match u.bits(2) {
        0 => ControlKind::Delay { value: u.id() },
        1 => ControlKind::Event {
            event_array: u.array(),
        },
        _ => ControlKind::Repeat {
            rep: u.id(),
            event_array: u.array(),
        },
    };
    PtControl { fr, kind }
}

fn pack_delay(p: &mut Packer, n: &PtDelay) {
    p.region(n.fr);
    p.array(n.value_array);
}

fn unpack_delay(mut u: Unpacker) -> PtDelay {
    PtDelay {
        fr: u.region(),
        value_array: u.array(),
    }
}

fn pack_strength(p: &mut Packer, n: &PtStrength) {
    p.region(n.fr);
    match n.spec {
        StrengthSpec::Drive(v0, v1) => {
            p.flag(true);
            p.enum_val(v0);
            p.enum_val(v1);
        }
        StrengthSpec::Single(v) => {
            p.flag(false);
            p.enum_val(v);
        }
    }
}

fn unpack_strength(mut u: Unpacker) -> PtStrength {
    let fr = u.region();
    let spec = if u.flag() {
        let v0 = u.enum_val();
        let v1 = u.enum_val();
        StrengthSpec::Drive(v0, v1)
    } else {
        StrengthSpec::Single(u.enum_val())
    };
    PtStrength { fr, spec }
}

fn pack_attr_spec(p: &mut Packer, n: &PtAttrSpec) {
    p.region(n.fr);
    p.sym(n.name);
    p.opt_id(n.expr);
}

fn unpack_attr_spec(mut u: Unpacker) -> PtAttrSpec {
    PtAttrSpec {
        fr: u.region(),
        name: u.sym(),
        expr: u.opt_id(),
    }
}

fn pack_name_branch(p: &mut Packer, n: &PtNameBranch) {
    p.sym(n.name);
    p.flag(n.index.is_some());
    if let Some(index) = n.index {
        p.word(index as u32);
    }
}

fn unpack_name_branch(mut u: Unpacker) -> PtNameBranch {
    let name = u.sym();
    let index = if u.flag() {
        Some(u.word() as i32)
    } else {
        None
    };
    PtNameBranch { name, index }
}

pub struct CptBackend {
    interner: StringInterner<StringBackend<SymbolU32>>,
    arrays: ArrayPool,
    modules: PackedTable,
    udps: PackedTable,
    udp_entries: PackedTable,
    udp_values: PackedTable,
    ports: PackedTable,
    io_heads: PackedTable,
    io_items: PackedTable,
    decl_heads: PackedTable,
    decl_items: PackedTable,
    ranges: PackedTable,
    items: PackedTable,
    def_params: PackedTable,
    cont_assigns: PackedTable,
    insts: PackedTable,
    connections: PackedTable,
    gen_case_items: PackedTable,
    path_decls: PackedTable,
    path_delays: PackedTable,
    stmts: PackedTable,
    case_items: PackedTable,
    exprs: PackedTable,
    controls: PackedTable,
    delays: PackedTable,
    strengths: PackedTable,
    attr_insts: PackedTable,
    attr_specs: PackedTable,
    name_branches: PackedTable,
    attrs: AttrTable,
    funcs: FuncTable,
}

fn packed<N>(node: &N, pack: fn(&mut Packer, &N)) -> Packer {
    let mut p = Packer::new();
    pack(&mut p, node);
    p
}

impl CptBackend {
    pub fn new() -> Self {
        CptBackend {
            interner: StringInterner::new(),
            arrays: ArrayPool::new(),
            modules: PackedTable::default(),
            udps: PackedTable::default(),
            udp_entries: PackedTable::default(),
            udp_values: PackedTable::default(),
            ports: PackedTable::default(),
            io_heads: PackedTable::default(),
            io_items: PackedTable::default(),
            decl_heads: PackedTable::default(),
            decl_items: PackedTable::default(),
            ranges: PackedTable::default(),
            items: PackedTable::default(),
            def_params: PackedTable::default(),
            cont_assigns: PackedTable::default(),
            insts: PackedTable::default(),
            connections: PackedTable::default(),
            gen_case_items: PackedTable::default(),
            path_decls: PackedTable::default(),
            path_delays: PackedTable::default(),
            stmts: PackedTable::default(),
            case_items: PackedTable::default(),
            exprs: PackedTable::default(),
            controls: PackedTable::default(),
            delays: PackedTable::default(),
            strengths: PackedTable::default(),
            attr_insts: PackedTable::default(),
            attr_specs: PackedTable::default(),
            name_branches: PackedTable::default(),
            attrs: AttrTable::default(),
            funcs: FuncTable::default(),
        }
    }

    fn tables(&self) -> [&PackedTable; 27] {
        [
            &self.modules,
            &self.udps,
            &self.udp_entries,
            &self.udp_values,
            &self.ports,
            &self.io_heads,
            &self.io_items,
            &self.decl_heads,
            &self.decl_items,
            &self.ranges,
            &self.items,
            &self.def_params,
            &self.cont_assigns,
            &self.insts,
            &self.connections,
            &self.gen_case_items,
            &self.path_decls,
            &self.path_delays,
            &self.stmts,
            &self.case_items,
            &self.exprs,
            &self.controls,
            &self.delays,
            &self.strengths,
            &self.attr_insts,
            &self.attr_specs,
            &self.name_branches,
        ]
    }
}

impl Default for CptBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PtFactory for CptBackend {
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
        let module = PtModule { spec, iodecl_num };
        ModuleId(self.modules.push(packed(&module, pack_module)))
    }

    fn new_udp(&mut self, udp: PtUdp) -> UdpId {
        UdpId(self.udps.push(packed(&udp, pack_udp)))
    }

    fn new_udp_entry(&mut self, entry: PtUdpEntry) -> UdpEntryId {
        UdpEntryId(self.udp_entries.push(packed(&entry, pack_udp_entry)))
    }

    fn new_udp_value(&mut self, value: PtUdpValue) -> UdpValueId {
        UdpValueId(self.udp_values.push(packed(&value, pack_udp_value)))
    }

    fn new_port(&mut self, port: PtPort) -> PortId {
        PortId(self.ports.push(packed(&port, pack_port)))
    }

    fn new_io_head(&mut self, spec: IOHeadSpec) -> PendingHead<IOHeadId> {
        PendingHead::new(IOHeadId(self.io_heads.push(packed(&spec, pack_io_head))))
    }

    fn attach_io_items(
        &mut self,
        head: PendingHead<IOHeadId>,
        items: PtArray<IOItemId>,
    ) -> IOHeadId {
        let id = head.into_id();
        self.io_heads.attach(id.0, items);
        id
    }

    fn new_io_item(&mut self, item: PtIOItem) -> IOItemId {
        IOItemId(self.io_items.push(packed(&item, pack_io_item)))
    }

    fn new_decl_head(&mut self, spec: DeclHeadSpec) -> PendingHead<DeclHeadId> {
        PendingHead::new(DeclHeadId(
            self.decl_heads.push(packed(&spec, pack_decl_head)),
        ))
    }

    fn attach_decl_items(
        &mut self,
        head: PendingHead<DeclHeadId>,
        items: PtArray<DeclItemId>,
    ) -> DeclHeadId {
        let id = head.into_id();
        self.decl_heads.attach(id.0, items);
        id
    }

    fn new_decl_item(&mut self, item: PtDeclItem) -> DeclItemId {
        DeclItemId(self.decl_items.push(packed(&item, pack_decl_item)))
    }

    fn new_range(&mut self, range: PtRange) -> RangeId {
        RangeId(self.ranges.push(packed(&range, pack_range)))
    }

    fn new_item(&mut self, item: PtItem) -> ItemId {
        ItemId(self.items.push(packed(&item, pack_item)))
    }

    fn new_def_param(&mut self, def_param: PtDefParam) -> DefParamId {
        DefParamId(self.def_params.push(packed(&def_param, pack_def_param)))
    }

    fn new_cont_assign(&mut self, cont_assign: PtContAssign) -> ContAssignId {
        ContAssignId(self.cont_assigns.push(packed(&cont_assign, pack_cont_assign)))
    }

    fn new_inst(&mut self, inst: PtInst) -> InstId {
        InstId(self.insts.push(packed(&inst, pack_inst)))
    }

    fn new_connection(&mut self, con: PtConnection) -> ConnectionId {
        ConnectionId(self.connections.push(packed(&con, pack_connection)))
    }

    fn new_gen_case_item(&mut self, item: PtGenCaseItem) -> GenCaseItemId {
        GenCaseItemId(self.gen_case_items.push(packed(&item, pack_gen_case_item)))
    }

    fn new_path_decl(&mut self, path_decl: PtPathDecl) -> PathDeclId {
        PathDeclId(self.path_decls.push(packed(&path_decl, pack_path_decl)))
    }

    fn new_path_delay(&mut self, path_delay: PtPathDelay) -> PathDelayId {
        PathDelayId(self.path_delays.push(packed(&path_delay, pack_path_delay)))
    }

    fn new_stmt(&mut self, stmt: PtStmt) -> StmtId {
        StmtId(self.stmts.push(packed(&stmt, pack_stmt)))
    }

    fn new_case_item(&mut self, item: PtCaseItem) -> CaseItemId {
        CaseItemId(self.case_items.push(packed(&item, pack_case_item)))
    }

    fn new_expr(&mut self, expr: PtExpr) -> ExprId {
        ExprId(self.exprs.push(packed(&expr, pack_expr)))
    }

    fn new_control(&mut self, control: PtControl) -> ControlId {
        ControlId(self.controls.push(packed(&control, pack_control)))
    }

    fn new_delay(&mut self, delay: PtDelay) -> DelayId {
        DelayId(self.delays.push(packed(&delay, pack_delay)))
    }

    fn new_strength(&mut self, strength: PtStrength) -> StrengthId {
        StrengthId(self.strengths.push(packed(&strength, pack_strength)))
    }

    fn new_attr_inst(&mut self, attr: PtAttrInst) -> AttrInstId {
        let mut p = Packer::new();
        p.full_array(attr.attrspec_array);
        AttrInstId(self.attr_insts.push(p))
    }

    fn new_attr_spec(&mut self, spec: PtAttrSpec) -> AttrSpecId {
        AttrSpecId(self.attr_specs.push(packed(&spec, pack_attr_spec)))
    }

    fn new_name_branch(&mut self, branch: PtNameBranch) -> NameBranchId {
        NameBranchId(self.name_branches.push(packed(&branch, pack_name_branch)))
    }

    fn reg_attrinst(&mut self, target: PtNodeRef, attrs: PtArray<AttrInstId>) {
        self.attrs.insert(target, attrs);
    }
}

impl PtStore for CptBackend {
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
        unpack_module(self.modules.get(id.0))
    }

    fn udp(&self, id: UdpId) -> PtUdp {
        unpack_udp(self.udps.get(id.0))
    }

    fn udp_entry(&self, id: UdpEntryId) -> PtUdpEntry {
        unpack_udp_entry(self.udp_entries.get(id.0))
    }

    fn udp_value(&self, id: UdpValueId) -> PtUdpValue {
        unpack_udp_value(self.udp_values.get(id.0))
    }

    fn port(&self, id: PortId) -> PtPort {
        unpack_port(self.ports.get(id.0))
    }

    fn io_head(&self, id: IOHeadId) -> PtIOHead {
        unpack_io_head(self.io_heads.get(id.0))
    }

    fn io_item(&self, id: IOItemId) -> PtIOItem {
        unpack_io_item(self.io_items.get(id.0))
    }

    fn decl_head(&self, id: DeclHeadId) -> PtDeclHead {
        unpack_decl_head(self.decl_heads.get(id.0))
    }

    fn decl_item(&self, id: DeclItemId) -> PtDeclItem {
        unpack_decl_item(self.decl_items.get(id.0))
    }

    fn range(&self, id: RangeId) -> PtRange {
        unpack_range(self.ranges.get(id.0))
    }

    fn item(&self, id: ItemId) -> PtItem {
        unpack_item(self.items.get(id.0))
    }

    fn def_param(&self, id: DefParamId) -> PtDefParam {
        unpack_def_param(self.def_params.get(id.0))
    }

    fn cont_assign(&self, id: ContAssignId) -> PtContAssign {
        unpack_cont_assign(self.cont_assigns.get(id.0))
    }

    fn inst(&self, id: InstId) -> PtInst {
        unpack_inst(self.insts.get(id.0))
    }

    fn connection(&self, id: ConnectionId) -> PtConnection {
        unpack_connection(self.connections.get(id.0))
    }

    fn gen_case_item(&self, id: GenCaseItemId) -> PtGenCaseItem {
        unpack_gen_case_item(self.gen_case_items.get(id.0))
    }

    fn path_decl(&self, id: PathDeclId) -> PtPathDecl {
        unpack_path_decl(self.path_decls.get(id.0))
    }

    fn path_delay(&self, id: PathDelayId) -> PtPathDelay {
        unpack_path_delay(self.path_delays.get(id.0))
    }

    fn stmt(&self, id: StmtId) -> PtStmt {
        unpack_stmt(self.stmts.get(id.0))
    }

    fn case_item(&self, id: CaseItemId) -> PtCaseItem {
        unpack_case_item(self.case_items.get(id.0))
    }

    fn expr(&self, id: ExprId) -> PtExpr {
        unpack_expr(self.exprs.get(id.0))
    }

    fn control(&self, id: ControlId) -> PtControl {
        unpack_control(self.controls.get(id.0))
    }

    fn delay(&self, id: DelayId) -> PtDelay {
        unpack_delay(self.delays.get(id.0))
    }

    fn strength(&self, id: StrengthId) -> PtStrength {
        unpack_strength(self.strengths.get(id.0))
    }

    fn attr_inst(&self, id: AttrInstId) -> PtAttrInst {
        PtAttrInst {
            attrspec_array: self.attr_insts.get(id.0).full_array(),
        }
    }

    fn attr_spec(&self, id: AttrSpecId) -> PtAttrSpec {
        unpack_attr_spec(self.attr_specs.get(id.0))
    }

    fn name_branch(&self, id: NameBranchId) -> PtNameBranch {
        unpack_name_branch(self.name_branches.get(id.0))
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
            + self
                .tables()
                .iter()
                .map(|t| t.memory_usage())
                .sum::<usize>()
    }
}

impl PtBackend for CptBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Compact
    }

    fn as_store(&self) -> &dyn PtStore {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_region::Span;

    fn region(l0: u32, c0: u32, l1: u32, c1: u32) -> FileRegion {
        FileRegion::new(FileId(3), Span::new(Pos::new(l0, c0), Pos::new(l1, c1)))
    }

    fn roundtrip_region(fr: FileRegion) -> (FileRegion, usize) {
        let mut p = Packer::new();
        p.region(fr);
        let nwords = p.words.len();
        let mut table = PackedTable::default();
        let id = table.push(p);
        (table.get(id).region(), nwords)
    }

    #[test]
    fn test_narrow_region_uses_three_words() {
        let fr = region(12, 3, 14, 80);
        let (back, nwords) = roundtrip_region(fr);
        assert_eq!(back, fr);
        assert_eq!(nwords, 3);
    }

    #[test]
    fn test_wide_region_keeps_exact_positions() {
        let fr = region(5, 70_000, 5, 70_010);
        let (back, nwords) = roundtrip_region(fr);
        assert_eq!(back, fr);
        assert_eq!(nwords, 6);
    }

    #[test]
    fn test_attach_patches_head_once() {
        let mut backend = CptBackend::new();
        let fr = region(1, 1, 1, 10);
        let pending = backend.new_io_head(IOHeadSpec {
            fr,
            dir: Direction::Output,
            aux: IOAux::Net(NetType::Wand),
            signed: true,
            range: None,
            strength: None,
            delay: None,
        });
        let name = backend.new_string("q");
        let item = backend.new_io_item(PtIOItem {
            fr,
            name,
            init_value: None,
        });
        let items = backend.arrays_mut().alloc(&[item]);
        let head = backend.attach_io_items(pending, items);
        let view = backend.io_head(head);
        assert_eq!(view.item_array, items);
        assert_eq!(view.dir, Direction::Output);
        assert_eq!(view.aux, IOAux::Net(NetType::Wand));
        assert!(view.signed);
    }

    #[test]
    #[should_panic(expected = "attached twice")]
    fn test_table_attach_twice_panics() {
        let mut table = PackedTable::default();
        let id = table.push(packed(
            &DeclHeadSpec::plain(region(1, 1, 1, 2), DeclType::Reg),
            pack_decl_head,
        ));
        table.attach::<DeclItemId>(id, PtArray::from_parts(0, 1));
        table.attach::<DeclItemId>(id, PtArray::from_parts(0, 1));
    }

    #[test]
    fn test_real_and_negative_index_survive_packing() {
        let mut backend = CptBackend::new();
        let fr = region(2, 1, 2, 6);
        let e = backend.new_expr(PtExpr {
            fr,
            kind: ExprKind::RealConst { value: -1.25e-7 },
        });
        assert_eq!(
            backend.expr(e).kind,
            ExprKind::RealConst { value: -1.25e-7 }
        );
        let name = backend.new_string("blk");
        let nb = backend.new_name_branch(PtNameBranch {
            name,
            index: Some(-3),
        });
        assert_eq!(backend.name_branch(nb).index, Some(-3));
    }
}
