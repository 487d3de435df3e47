//! Symbol model and syntax tree for the hoist refactoring engine.
//!
//! This crate defines what the refactoring core reads:
//! - `SymbolTable` / `Symbol` - declarations, addressed by `SymbolId`
//! - `Tree` / `NodeKind` - the syntax tree of one unit, addressed by `NodeIndex`
//! - `Binding` - what a name node resolves to
//! - `Program`, `ReferenceSearch`, `HierarchyProvider`, `ChangeApplier` -
//!   the host collaborators

pub mod binding;
pub mod program;
pub mod symbols;
pub mod tree;
pub mod unit;
pub mod visibility;

pub use binding::Binding;
pub use program::{
    ChangeApplier, HierarchyProvider, Program, Reference, ReferenceFilter, ReferenceKind,
    ReferenceKinds, ReferenceSearch, SearchScope, Staticness, TypeHierarchy, Workspace,
    reference_kind,
};
pub use symbols::{DeclRef, Symbol, SymbolId, SymbolKind, SymbolTable, TypeKind};
pub use tree::{
    CallKind, Delimited, MethodDecl, ModifierKeyword, Modifiers, Node, NodeIndex, NodeKind, Tree,
    TypeDecl,
};
pub use unit::SourceUnit;
pub use visibility::{ModifierFlags, Visibility};
