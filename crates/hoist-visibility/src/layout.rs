//! Declaration placement before or after a pending relocation.
//!
//! The symbol table always describes the program as it is on disk. When a
//! member type is about to become a top-level type, visibility thresholds
//! must be computed against where declarations *will* live: the moved type
//! loses its owner and, together with everything nested in it, moves to a
//! new unit in the destination package. `Layout` answers placement queries
//! under that overlay without touching the symbol table.

use hoist_common::UnitId;
use hoist_model::{SymbolId, SymbolTable};

/// The unit a declaration lives in under a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    Existing(UnitId),
    /// The unit that will be created for the moved type.
    Relocated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingMove {
    ty: SymbolId,
    package: String,
}

#[derive(Clone, Debug)]
pub struct Layout<'a> {
    symbols: &'a SymbolTable,
    pending: Option<PendingMove>,
}

impl<'a> Layout<'a> {
    /// The program as declared.
    #[must_use]
    pub const fn current(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            pending: None,
        }
    }

    /// The program after `ty` is moved to top level in `package`.
    #[must_use]
    pub fn after_move(symbols: &'a SymbolTable, ty: SymbolId, package: impl Into<String>) -> Self {
        Self {
            symbols,
            pending: Some(PendingMove {
                ty,
                package: package.into(),
            }),
        }
    }

    #[must_use]
    pub const fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    #[must_use]
    pub fn moved_type(&self) -> Option<SymbolId> {
        self.pending.as_ref().map(|p| p.ty)
    }

    /// Whether `id` travels with the moved type.
    #[must_use]
    pub fn is_relocated(&self, id: SymbolId) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| self.symbols.is_within(id, p.ty))
    }

    #[must_use]
    pub fn owner(&self, id: SymbolId) -> Option<SymbolId> {
        if self.moved_type() == Some(id) {
            return None;
        }
        self.symbols.declaring_type(id)
    }

    /// Owners of `id` under the layout, nearest first.
    #[must_use]
    pub fn enclosing_chain(&self, id: SymbolId) -> Vec<SymbolId> {
        std::iter::successors(self.owner(id), |&t| self.owner(t)).collect()
    }

    #[must_use]
    pub fn top_level_of(&self, id: SymbolId) -> SymbolId {
        self.enclosing_chain(id).last().copied().unwrap_or(id)
    }

    /// `id` itself or nested at any depth inside `ancestor`, under the layout.
    #[must_use]
    pub fn is_within(&self, id: SymbolId, ancestor: SymbolId) -> bool {
        id == ancestor || self.enclosing_chain(id).contains(&ancestor)
    }

    #[must_use]
    pub fn package(&self, id: SymbolId) -> &str {
        match &self.pending {
            Some(p) if self.symbols.is_within(id, p.ty) => &p.package,
            _ => &self.symbols[id].package,
        }
    }

    /// `None` for declarations without source.
    #[must_use]
    pub fn placement(&self, id: SymbolId) -> Option<Placement> {
        if self.is_relocated(id) {
            return Some(Placement::Relocated);
        }
        self.symbols[id].decl.map(|d| Placement::Existing(d.unit))
    }

    #[must_use]
    pub fn same_unit(&self, a: SymbolId, b: SymbolId) -> bool {
        match (self.placement(a), self.placement(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/layout_tests.rs"]
mod layout_tests;
