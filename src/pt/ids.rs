// SPDX-License-Identifier: Apache-2.0

//! Typed node indices and the shared array pool.

use std::fmt;
use std::marker::PhantomData;

use super::types::{Direction, PackBits};

/// A value that can live in the array pool as one `u32`.
pub trait PoolElem: Copy {
    fn to_raw(self) -> u32;
    fn from_raw(raw: u32) -> Self;
}

macro_rules! node_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);

            impl $name {
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }

            impl PoolElem for $name {
                fn to_raw(self) -> u32 {
                    self.0
                }

                fn from_raw(raw: u32) -> Self {
                    $name(raw)
                }
            }
        )+
    };
}

node_id!(
    ModuleId,
    UdpId,
    UdpEntryId,
    UdpValueId,
    PortId,
    IOHeadId,
    IOItemId,
    DeclHeadId,
    DeclItemId,
    RangeId,
    /// Index of a module item (including task/function and generate items).
    ItemId,
    DefParamId,
    ContAssignId,
    InstId,
    ConnectionId,
    GenCaseItemId,
    PathDeclId,
    PathDelayId,
    StmtId,
    CaseItemId,
    ExprId,
    ControlId,
    DelayId,
    StrengthId,
    AttrInstId,
    AttrSpecId,
    NameBranchId,
);

impl PoolElem for Direction {
    fn to_raw(self) -> u32 {
        self.to_bits()
    }

    fn from_raw(raw: u32) -> Self {
        Direction::from_bits(raw)
    }
}

/// Fixed-length, ordered view into the array pool.
pub struct PtArray<T> {
    start: u32,
    len: u32,
    _elem: PhantomData<fn() -> T>,
}

impl<T> PtArray<T> {
    pub fn empty() -> Self {
        Self::from_parts(0, 0)
    }

    pub(crate) fn from_parts(start: u32, len: u32) -> Self {
        PtArray {
            start,
            len,
            _elem: PhantomData,
        }
    }

    pub(crate) fn start(&self) -> u32 {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Clone for PtArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PtArray<T> {}

impl<T> PartialEq for PtArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<T> Eq for PtArray<T> {}

impl<T> Default for PtArray<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for PtArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PtArray[{}; {}]", self.start, self.len)
    }
}

/// Append-only storage behind every `PtArray`.
#[derive(Debug, Default, Clone)]
pub struct ArrayPool {
    elems: Vec<u32>,
}

impl ArrayPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc<T: PoolElem>(&mut self, items: &[T]) -> PtArray<T> {
        if items.is_empty() {
            return PtArray::empty();
        }
        let start = self.elems.len() as u32;
        self.elems.extend(items.iter().map(|item| item.to_raw()));
        PtArray::from_parts(start, items.len() as u32)
    }

    pub fn get<T: PoolElem>(&self, array: PtArray<T>, index: usize) -> T {
        assert!(
            index < array.len(),
            "array index {} out of range {}",
            index,
            array.len()
        );
        T::from_raw(self.elems[array.start as usize + index])
    }

    pub fn iter<T: PoolElem>(&self, array: PtArray<T>) -> impl Iterator<Item = T> + '_ {
        let start = array.start as usize;
        self.elems[start..start + array.len()]
            .iter()
            .map(|raw| T::from_raw(*raw))
    }

    pub fn to_vec<T: PoolElem>(&self, array: PtArray<T>) -> Vec<T> {
        self.iter(array).collect()
    }

    pub fn memory_usage(&self) -> usize {
        self.elems.len() * std::mem::size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_preserves_order_and_length() {
        let mut pool = ArrayPool::new();
        let a = pool.alloc(&[ExprId(4), ExprId(1), ExprId(9)]);
        let b = pool.alloc(&[Direction::Input, Direction::Inout]);
        assert_eq!(a.len(), 3);
        assert_eq!(pool.to_vec(a), vec![ExprId(4), ExprId(1), ExprId(9)]);
        assert_eq!(pool.get(b, 1), Direction::Inout);
        assert_eq!(pool.memory_usage(), 5 * 4);
    }

    #[test]
    fn test_empty_arrays_compare_equal() {
        let mut pool = ArrayPool::new();
        let _ = pool.alloc(&[StmtId(0)]);
        let empty: PtArray<StmtId> = pool.alloc(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty, PtArray::empty());
        assert_eq!(pool.iter(empty).count(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_past_end_panics() {
        let mut pool = ArrayPool::new();
        let a = pool.alloc(&[ItemId(0)]);
        let _ = pool.get(a, 1);
    }
}
