// SPDX-License-Identifier: Apache-2.0

//! Build-context frames.
//!
//! Each construct that owns declaration or item lists pushes a frame on
//! entry and pops it on exit; whatever the construct's body appended is
//! returned to the caller to be frozen into arrays.

use std::collections::HashMap;

use crate::file_region::FileRegion;
use crate::pt::{DeclHeadId, IOHeadId, ItemId, StrId};

use super::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Module,
    Udp,
    TaskFunc,
    Generate,
    GenBlock,
    GenIfThen,
    GenIfElse,
    GenCaseItem,
    GenFor,
    NamedBlock,
}

impl FrameKind {
    /// Frames whose body may declare IO.
    pub(crate) fn allows_io(self) -> bool {
        matches!(self, FrameKind::Module | FrameKind::Udp | FrameKind::TaskFunc)
    }

    /// Frames whose body may declare nets and genvars.
    pub(crate) fn allows_nets(self) -> bool {
        !matches!(self, FrameKind::TaskFunc | FrameKind::NamedBlock | FrameKind::Udp)
    }
}

#[derive(Debug)]
pub(crate) struct BuildContext {
    pub(crate) kind: FrameKind,
    pub(crate) io_heads: Vec<IOHeadId>,
    pub(crate) decl_heads: Vec<DeclHeadId>,
    pub(crate) paramport_heads: Vec<DeclHeadId>,
    pub(crate) items: Vec<ItemId>,
    /// First declaration of each IO name, for redefinition checks.
    pub(crate) io_names: HashMap<StrId, FileRegion>,
    /// Set when the header already declared the ports (2001 style).
    pub(crate) ansi_ports: bool,
}

impl BuildContext {
    fn new(kind: FrameKind) -> Self {
        BuildContext {
            kind,
            io_heads: Vec::new(),
            decl_heads: Vec::new(),
            paramport_heads: Vec::new(),
            items: Vec::new(),
            io_names: HashMap::new(),
            ansi_ports: false,
        }
    }
}

impl<'a> Parser<'a> {
    /// Runs `f` inside a fresh frame of `kind`. The frame is popped whether
    /// or not `f` succeeds.
    pub(crate) fn with_frame<T>(
        &mut self,
        kind: FrameKind,
        f: impl FnOnce(&mut Self) -> super::PResult<T>,
    ) -> (super::PResult<T>, BuildContext) {
        let depth = self.frames.len();
        log::trace!("enter {:?} frame at depth {}", kind, depth);
        self.frames.push(BuildContext::new(kind));
        let result = f(self);
        assert_eq!(
            self.frames.len(),
            depth + 1,
            "unbalanced build-context frames in {:?}",
            kind
        );
        let frame = self
            .frames
            .pop()
            .expect("frame pushed above is still on the stack");
        log::trace!("leave {:?} frame at depth {}", kind, depth);
        (result, frame)
    }

    pub(crate) fn frame(&mut self) -> &mut BuildContext {
        self.frames
            .last_mut()
            .expect("construct parsed outside of any build context")
    }

    pub(crate) fn frame_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub(crate) fn frame_depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_region::FileId;
    use crate::msg::MsgMgr;
    use crate::pt::{new_backend, BackendKind, ItemId};
    use crate::pt_mgr::ModuleRegistry;
    use crate::scanner::TokenScanner;

    #[test]
    fn test_frames_are_isolated_and_balanced() {
        let mut backend = new_backend(BackendKind::Straightforward);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        let scanner = TokenScanner::from_str(FileId(0), "");
        let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);

        let (result, outer) = parser.with_frame(FrameKind::Module, |p| {
            p.frame().items.push(ItemId(1));
            let (inner_result, inner) = p.with_frame(FrameKind::GenBlock, |p| {
                p.frame().items.push(ItemId(2));
                assert_eq!(p.frame_depth(), 2);
                Ok(())
            });
            assert!(inner_result.is_ok());
            assert_eq!(inner.items, vec![ItemId(2)]);
            p.frame().items.push(ItemId(3));
            Ok(p.frame_kind())
        });
        assert_eq!(result, Ok(Some(FrameKind::Module)));
        assert_eq!(outer.items, vec![ItemId(1), ItemId(3)]);
        assert_eq!(parser.frame_depth(), 0);
    }

    #[test]
    fn test_frame_popped_on_error() {
        let mut backend = new_backend(BackendKind::Compact);
        let mut msgs = MsgMgr::new();
        let mut registry = ModuleRegistry::default();
        let scanner = TokenScanner::from_str(FileId(0), "");
        let mut parser = Parser::new(scanner, backend.as_mut(), &mut msgs, &mut registry);

        let (result, frame) = parser.with_frame(FrameKind::TaskFunc, |p| {
            p.frame().items.push(ItemId(7));
            let region = p.here();
            Err::<(), _>(super::super::SyntaxError::new("boom", region))
        });
        assert!(result.is_err());
        assert_eq!(frame.items, vec![ItemId(7)]);
        assert_eq!(parser.frame_depth(), 0);
    }
}
