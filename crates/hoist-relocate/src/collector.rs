//! Enclosing-access collector.
//!
//! Walks the moved declaration and records every place where its code
//! depends on the types that lexically enclose it: members reached by
//! simple name, `Outer.this`, member types named without a qualifier and
//! creations of inner member types. These sites stop resolving once the
//! declaration leaves its enclosing type.

use crate::context::{Abort, RelocationContext, Stage};
use crate::plan::EnclosingLink;
use hoist_common::{Location, UnitId};
use hoist_model::{Binding, NodeIndex, NodeKind, Program, SymbolId, Tree, TypeKind};
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AccessKind {
    /// An instance field or method of an enclosing type, by simple name.
    InstanceMember { member: SymbolId, holder: SymbolId },
    /// A static field or method of an enclosing type, by simple name.
    StaticMember { member: SymbolId, holder: SymbolId },
    /// A member type of an enclosing type, by simple name.
    MemberType { ty: SymbolId, holder: SymbolId },
    /// `Outer.this`.
    QualifiedThis { ty: SymbolId },
    /// `new Sibling()` where `Sibling` is an inner member type of an
    /// enclosing type.
    InnerCreation { ty: SymbolId, holder: SymbolId },
}

impl AccessKind {
    /// Whether the access goes through an enclosing instance.
    #[must_use]
    pub const fn needs_instance(self) -> bool {
        matches!(
            self,
            AccessKind::InstanceMember { .. }
                | AccessKind::QualifiedThis { .. }
                | AccessKind::InnerCreation { .. }
        )
    }

    /// The enclosing type the access is resolved through.
    #[must_use]
    pub const fn holder(self) -> SymbolId {
        match self {
            AccessKind::InstanceMember { holder, .. }
            | AccessKind::StaticMember { holder, .. }
            | AccessKind::MemberType { holder, .. }
            | AccessKind::InnerCreation { holder, .. } => holder,
            AccessKind::QualifiedThis { ty } => ty,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnclosingAccess {
    /// The name node; the `new` expression for `InnerCreation`, the
    /// `this` expression for `QualifiedThis`.
    pub node: NodeIndex,
    /// The name token.
    pub location: Location,
    pub kind: AccessKind,
}

pub struct EnclosingAccessCollector<'a> {
    program: &'a dyn Program,
    moved: SymbolId,
}

impl std::fmt::Debug for EnclosingAccessCollector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnclosingAccessCollector")
            .field("moved", &self.moved)
            .finish_non_exhaustive()
    }
}

impl<'a> EnclosingAccessCollector<'a> {
    #[must_use]
    pub fn new(program: &'a dyn Program, moved: SymbolId) -> Self {
        Self { program, moved }
    }

    /// Accesses in source order. Empty for types without source.
    #[must_use]
    pub fn collect(&self) -> Vec<EnclosingAccess> {
        let symbols = self.program.symbols();
        let Some(decl) = symbols.get(self.moved).and_then(|s| s.decl) else {
            return Vec::new();
        };
        let Some(tree) = self.program.tree(decl.unit) else {
            return Vec::new();
        };
        let mut accesses = Vec::new();
        for node in tree.descendants(decl.node) {
            let Some((node, kind)) = self.classify(tree, decl.unit, node) else {
                continue;
            };
            let span = match tree.kind(node) {
                Some(NodeKind::This { .. }) => tree.span(node),
                _ => tree.name_span(node).unwrap_or_else(|| tree.span(node)),
            };
            trace!(?kind, ?span, "enclosing access");
            accesses.push(EnclosingAccess {
                node,
                location: Location::new(decl.unit, span),
                kind,
            });
        }
        accesses.sort_by_key(|a| a.location.span.start);
        accesses
    }

    fn classify(&self, tree: &Tree, unit: UnitId, node: NodeIndex) -> Option<(NodeIndex, AccessKind)> {
        let symbols = self.program.symbols();
        match tree.kind(node)? {
            NodeKind::This { qualifier: Some(q) } => {
                let ty = self.program.resolve_binding(unit, *q)?.symbol()?;
                self.is_outside(ty)
                    .then_some((node, AccessKind::QualifiedThis { ty }))
            }
            NodeKind::SimpleName { .. }
            | NodeKind::MethodCall { receiver: None, .. }
            | NodeKind::TypeRef { qualifier: None, .. } => {
                let (member, holder, all_static) = match self.program.resolve_binding(unit, node)? {
                    Binding::Member { symbol, holder } => (*symbol, *holder, symbols.is_static(*symbol)),
                    Binding::Ambiguous(candidates) if matches!(tree.kind(node), Some(NodeKind::MethodCall { .. })) => {
                        let first = *candidates.first()?;
                        let holder = self.call_holder(tree, unit, node, &symbols[first].name)?;
                        (first, holder, candidates.iter().all(|&c| symbols.is_static(c)))
                    }
                    _ => return None,
                };
                if !self.is_outside(holder) || !self.is_outside(member) {
                    return None;
                }
                if !symbols[member].is_type() {
                    let kind = if all_static {
                        AccessKind::StaticMember { member, holder }
                    } else {
                        AccessKind::InstanceMember { member, holder }
                    };
                    return Some((node, kind));
                }
                if let Some(creation) = self.inner_creation(tree, node, member) {
                    return Some((creation, AccessKind::InnerCreation { ty: member, holder }));
                }
                Some((node, AccessKind::MemberType { ty: member, holder }))
            }
            _ => None,
        }
    }

    /// The `new` expression creating inner class `ty` through `node`, its
    /// unqualified type name.
    fn inner_creation(&self, tree: &Tree, node: NodeIndex, ty: SymbolId) -> Option<NodeIndex> {
        let symbols = self.program.symbols();
        let parent = tree.parent(node)?;
        match tree.kind(parent)? {
            NodeKind::New { outer: None, ty: created, .. }
                if *created == node
                    && symbols[ty].type_kind() == Some(TypeKind::Class)
                    && !symbols.is_static(ty) =>
            {
                Some(parent)
            }
            _ => None,
        }
    }

    /// First lexically enclosing type that declares or inherits a method
    /// named `name`.
    fn call_holder(&self, tree: &Tree, unit: UnitId, node: NodeIndex, name: &str) -> Option<SymbolId> {
        let symbols = self.program.symbols();
        tree.ancestors(node)
            .filter(|&a| matches!(tree.kind(a), Some(NodeKind::TypeDecl(_))))
            .filter_map(|a| self.program.declared_symbol(unit, a))
            .find(|&ty| !symbols.lookup_methods(ty, name).is_empty())
    }

    fn is_outside(&self, id: SymbolId) -> bool {
        !self.program.symbols().is_within(id, self.moved)
    }
}

impl RelocationContext<'_> {
    /// Collect enclosing accesses and decide whether the move needs the
    /// enclosing instance.
    pub(crate) fn analyze(mut self) -> Result<Self, Abort> {
        self.enter(Stage::Analyze)?;
        let symbols = self.symbols();
        self.accesses = EnclosingAccessCollector::new(self.workspace, self.moved).collect();
        self.link = if symbols.is_static(self.moved) {
            EnclosingLink::Unavailable
        } else if self.accesses.iter().any(|a| a.kind.needs_instance()) {
            EnclosingLink::Mandatory
        } else {
            EnclosingLink::Optional
        };
        debug!(
            accesses = self.accesses.len(),
            link = ?self.link,
            "enclosing accesses collected"
        );
        Ok(self)
    }
}

#[cfg(test)]
#[path = "../tests/collector_tests.rs"]
mod collector_tests;
