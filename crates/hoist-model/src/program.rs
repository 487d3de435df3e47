//! Interfaces the refactoring core consumes.
//!
//! Parsing, name resolution, workspace-wide search, type hierarchy
//! computation and change application are owned by the host. The core
//! only sees these traits; `hoist-frontend` provides an in-memory
//! implementation.

use crate::binding::Binding;
use crate::symbols::{SymbolId, SymbolTable};
use crate::tree::{NodeIndex, NodeKind, Tree};
use crate::unit::SourceUnit;
use bitflags::bitflags;
use hoist_common::{ApplyError, CancellationToken, Cancelled, Change, Location, TextEdit, UnitId};
use indexmap::IndexMap;
use serde::Serialize;

/// Read access to parsed and bound source units.
pub trait Program {
    fn symbols(&self) -> &SymbolTable;

    /// All units, in a stable order.
    fn units(&self) -> Vec<UnitId>;

    fn unit(&self, id: UnitId) -> Option<&SourceUnit>;

    fn tree(&self, id: UnitId) -> Option<&Tree>;

    /// Resolution of a name, type reference, `this` or invocation node.
    fn resolve_binding(&self, unit: UnitId, node: NodeIndex) -> Option<&Binding>;

    /// Symbol declared by a declaration node.
    fn declared_symbol(&self, unit: UnitId, node: NodeIndex) -> Option<SymbolId> {
        self.symbols().by_decl(unit, node)
    }

    /// Bundle `edits` against `unit` into a change. `None` for unknown units.
    fn create_text_edit(&self, unit: UnitId, edits: Vec<TextEdit>) -> Option<Change> {
        let source = self.unit(unit)?;
        Some(Change::Edit {
            unit,
            path: source.path.clone(),
            edits,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    Read,
    Write,
    /// Compound assignment or increment: both a read and a write.
    ReadWrite,
    Invoke,
    TypeReference,
    Import,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ReferenceKinds: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const INVOKE = 1 << 2;
        const TYPE_REFERENCE = 1 << 3;
        const IMPORT = 1 << 4;
    }
}

impl ReferenceKind {
    #[must_use]
    pub const fn flags(self) -> ReferenceKinds {
        match self {
            ReferenceKind::Read => ReferenceKinds::READ,
            ReferenceKind::Write => ReferenceKinds::WRITE,
            ReferenceKind::ReadWrite => ReferenceKinds::READ.union(ReferenceKinds::WRITE),
            ReferenceKind::Invoke => ReferenceKinds::INVOKE,
            ReferenceKind::TypeReference => ReferenceKinds::TYPE_REFERENCE,
            ReferenceKind::Import => ReferenceKinds::IMPORT,
        }
    }

    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, ReferenceKind::Write | ReferenceKind::ReadWrite)
    }
}

/// How the name-bearing `node` uses what it denotes. `None` for nodes
/// that carry no name.
#[must_use]
pub fn reference_kind(tree: &Tree, node: NodeIndex, target_is_type: bool) -> Option<ReferenceKind> {
    let kind = match tree.kind(node)? {
        NodeKind::SimpleName { .. } | NodeKind::FieldAccess { .. } if target_is_type => {
            ReferenceKind::TypeReference
        }
        NodeKind::SimpleName { .. } | NodeKind::FieldAccess { .. } => access_kind(tree, node),
        NodeKind::MethodCall { .. }
        | NodeKind::MethodRef { .. }
        | NodeKind::New { .. }
        | NodeKind::ConstructorCall { .. } => ReferenceKind::Invoke,
        NodeKind::TypeRef { .. } => {
            let in_import = tree
                .ancestors(node)
                .any(|a| matches!(tree.kind(a), Some(NodeKind::Import { .. })));
            if in_import {
                ReferenceKind::Import
            } else {
                ReferenceKind::TypeReference
            }
        }
        _ => return None,
    };
    Some(kind)
}

/// Read, write or both, from the position of a variable access.
fn access_kind(tree: &Tree, node: NodeIndex) -> ReferenceKind {
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        match tree.kind(parent) {
            Some(NodeKind::Paren { .. }) => current = parent,
            Some(NodeKind::Assign { target, op, .. }) if *target == current => {
                return if op == "=" {
                    ReferenceKind::Write
                } else {
                    ReferenceKind::ReadWrite
                };
            }
            Some(NodeKind::Unary { op, .. }) if op == "++" || op == "--" => {
                return ReferenceKind::ReadWrite;
            }
            _ => break,
        }
    }
    ReferenceKind::Read
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Staticness {
    #[default]
    Any,
    /// Accessed through a type name or from a static context.
    StaticOnly,
    /// Accessed through an instance.
    InstanceOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceFilter {
    pub kinds: ReferenceKinds,
    pub staticness: Staticness,
}

impl ReferenceFilter {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kinds: ReferenceKinds::all(),
            staticness: Staticness::Any,
        }
    }

    #[must_use]
    pub fn matches(&self, reference: &Reference) -> bool {
        let kind_ok = self.kinds.intersects(reference.kind.flags());
        let static_ok = match self.staticness {
            Staticness::Any => true,
            Staticness::StaticOnly => reference.is_static_access,
            Staticness::InstanceOnly => !reference.is_static_access,
        };
        kind_ok && static_ok
    }
}

impl Default for ReferenceFilter {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchScope {
    #[default]
    Workspace,
    Units(Vec<UnitId>),
    Package(String),
}

/// One syntactic occurrence of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// The binding node (name, access, invocation or type reference).
    pub node: NodeIndex,
    /// The name token of the occurrence.
    pub location: Location,
    pub kind: ReferenceKind,
    pub is_static_access: bool,
}

/// Workspace-wide reference search. May be slow; honours cancellation.
pub trait ReferenceSearch {
    fn find_references(
        &self,
        symbol: SymbolId,
        scope: &SearchScope,
        filter: &ReferenceFilter,
        cancel: &CancellationToken,
    ) -> Result<IndexMap<UnitId, Vec<Reference>>, Cancelled>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TypeHierarchy {
    pub supertypes: Vec<SymbolId>,
    pub subtypes: Vec<SymbolId>,
}

pub trait HierarchyProvider {
    fn type_hierarchy(
        &self,
        ty: SymbolId,
        cancel: &CancellationToken,
    ) -> Result<TypeHierarchy, Cancelled>;
}

/// Transactional application of a change set.
pub trait ChangeApplier {
    /// Apply all changes or none of them.
    fn apply_changes(&mut self, changes: &[Change]) -> Result<(), ApplyError>;
}

/// Everything the refactoring core needs from its host.
pub trait Workspace: Program + ReferenceSearch + HierarchyProvider {}

impl<T: Program + ReferenceSearch + HierarchyProvider> Workspace for T {}
