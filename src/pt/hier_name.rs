// SPDX-License-Identifier: Apache-2.0

//! Builder for dotted, optionally indexed names such as `top.u[2].sig`.

use super::factory::PtFactory;
use super::ids::{NameBranchId, PtArray};
use super::nodes::PtNameBranch;
use super::StrId;

/// Path accumulated left to right while the tail identifier is still
/// unknown. `extract` consumes the value, so it can be read only once.
#[derive(Debug, PartialEq, Eq)]
pub struct HierName {
    branches: Vec<(StrId, Option<i32>)>,
    tail: StrId,
}

impl HierName {
    /// `head[index].tail`
    pub fn new(head: StrId, index: Option<i32>, tail: StrId) -> Self {
        HierName {
            branches: vec![(head, index)],
            tail,
        }
    }

    /// Turns the pending tail into a branch carrying `index` and makes `name`
    /// the new tail.
    pub fn add(&mut self, index: Option<i32>, name: StrId) {
        let prev = std::mem::replace(&mut self.tail, name);
        self.branches.push((prev, index));
    }

    pub fn branch_num(&self) -> usize {
        self.branches.len()
    }

    pub fn tail(&self) -> StrId {
        self.tail
    }

    /// Builds the NameBranch nodes in textual order and returns them with
    /// the tail name.
    pub fn extract<F: PtFactory + ?Sized>(
        self,
        factory: &mut F,
    ) -> (PtArray<NameBranchId>, StrId) {
        let ids: Vec<NameBranchId> = self
            .branches
            .into_iter()
            .map(|(name, index)| factory.new_name_branch(PtNameBranch { name, index }))
            .collect();
        (factory.arrays_mut().alloc(&ids), self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pt::factory::{new_backend, BackendKind};

    #[test]
    fn test_extract_preserves_textual_order() {
        let mut backend = new_backend(BackendKind::Compact);
        let h1 = backend.new_string("h1");
        let h2 = backend.new_string("h2");
        let h3 = backend.new_string("h3");
        let tail = backend.new_string("sig");

        let mut name = HierName::new(h1, None, h2);
        name.add(Some(2), h3);
        name.add(None, tail);
        assert_eq!(name.branch_num(), 3);

        let (branches, got_tail) = name.extract(backend.as_mut());
        assert_eq!(got_tail, tail);
        let store = backend.as_store();
        let got: Vec<(String, Option<i32>)> = store
            .arrays()
            .iter(branches)
            .map(|id| {
                let b = store.name_branch(id);
                (store.resolve(b.name).to_string(), b.index)
            })
            .collect();
        assert_eq!(
            got,
            vec![
                ("h1".to_string(), None),
                ("h2".to_string(), Some(2)),
                ("h3".to_string(), None),
            ]
        );
    }
}
