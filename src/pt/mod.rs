// SPDX-License-Identifier: Apache-2.0

//! Parse-tree nodes, the factory contract and its two storage backends.

mod cpt;
pub mod dump;
pub mod factory;
pub mod hier_name;
pub mod ids;
pub mod nodes;
mod spt;
pub mod types;

use string_interner::symbol::SymbolU32;

/// Interned identifier or literal text.
pub type StrId = SymbolU32;

pub use cpt::CptBackend;
pub use factory::{new_backend, BackendKind, PendingHead, PtBackend, PtFactory, PtStore};
pub use hier_name::HierName;
pub use ids::*;
pub use nodes::*;
pub use spt::SptBackend;
pub use types::*;
