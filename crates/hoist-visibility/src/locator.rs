//! Reference Locator: produces reference edges for the analyzer.
//!
//! An edge connects the innermost declaration enclosing a reference site
//! (a member, a type, or the unit itself for imports) with what the site
//! refers to. Incoming edges come from the host's reference search;
//! outgoing edges come from walking the declaration's own subtree and
//! reading the bindings the host resolved there.

use hoist_common::{CancellationToken, Cancelled, Location, UnitId};
use hoist_model::{
    Binding, NodeIndex, NodeKind, ReferenceFilter, ReferenceKind, SearchScope, SymbolId, Tree,
    Workspace, reference_kind,
};
use serde::Serialize;
use tracing::{debug, trace};

/// The declaration a reference is written in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ReferencingScope {
    Type(SymbolId),
    Member(SymbolId),
    /// Outside every type declaration, e.g. an import.
    Unit(UnitId),
    /// A whole package; used when the site's declaration is irrelevant.
    Package(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EdgeTarget {
    Resolved(SymbolId),
    /// Several overloads match the site.
    Ambiguous(Vec<SymbolId>),
    /// The name at the site could not be bound.
    Unresolved(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReferenceEdge {
    pub scope: ReferencingScope,
    pub target: EdgeTarget,
    pub location: Location,
    pub kind: ReferenceKind,
    pub node: NodeIndex,
}

pub struct ReferenceLocator<'a> {
    workspace: &'a dyn Workspace,
    cancel: &'a CancellationToken,
}

impl<'a> ReferenceLocator<'a> {
    #[must_use]
    pub fn new(workspace: &'a dyn Workspace, cancel: &'a CancellationToken) -> Self {
        Self { workspace, cancel }
    }

    /// Innermost declaration enclosing `node`.
    #[must_use]
    pub fn scope_at(&self, unit: UnitId, node: NodeIndex) -> ReferencingScope {
        let symbols = self.workspace.symbols();
        let Some(tree) = self.workspace.tree(unit) else {
            return ReferencingScope::Unit(unit);
        };
        for ancestor in tree.ancestors(node) {
            let declared = match tree.kind(ancestor) {
                Some(NodeKind::Fragment { .. } | NodeKind::Method(_) | NodeKind::EnumConstant { .. }) => {
                    symbols.by_decl(unit, ancestor).map(ReferencingScope::Member)
                }
                Some(NodeKind::Field { fragments, .. }) => fragments
                    .first()
                    .and_then(|f| symbols.by_decl(unit, *f))
                    .map(ReferencingScope::Member),
                Some(NodeKind::TypeDecl(_)) => symbols.by_decl(unit, ancestor).map(ReferencingScope::Type),
                _ => None,
            };
            if let Some(scope) = declared {
                return scope;
            }
        }
        ReferencingScope::Unit(unit)
    }

    /// Every site in `scope` that refers to `target`.
    pub fn incoming(&self, target: SymbolId, scope: &SearchScope) -> Result<Vec<ReferenceEdge>, Cancelled> {
        let found = self
            .workspace
            .find_references(target, scope, &ReferenceFilter::all(), self.cancel)?;
        let mut edges = Vec::new();
        for (unit, references) in found {
            self.cancel.check()?;
            for reference in references {
                let edge_target = match self.workspace.resolve_binding(unit, reference.node) {
                    Some(Binding::Ambiguous(candidates)) => EdgeTarget::Ambiguous(candidates.clone()),
                    _ => EdgeTarget::Resolved(target),
                };
                edges.push(ReferenceEdge {
                    scope: self.scope_at(unit, reference.node),
                    target: edge_target,
                    location: reference.location,
                    kind: reference.kind,
                    node: reference.node,
                });
            }
        }
        debug!(target = target.0, edges = edges.len(), "located incoming references");
        Ok(edges)
    }

    /// Every reference written inside the declaration of `source`, except
    /// references to `source` itself or to declarations nested in it.
    pub fn outgoing(&self, source: SymbolId) -> Result<Vec<ReferenceEdge>, Cancelled> {
        let symbols = self.workspace.symbols();
        let Some(decl) = symbols[source].decl else {
            return Ok(Vec::new());
        };
        let Some(tree) = self.workspace.tree(decl.unit) else {
            return Ok(Vec::new());
        };
        self.cancel.check()?;

        let roots: Vec<NodeIndex> = match (tree.kind(decl.node), decl.fragment) {
            (Some(NodeKind::Field { ty, .. }), Some(fragment)) => vec![*ty, fragment],
            _ => tree.children(decl.node).into_iter().collect(),
        };
        let mut edges = Vec::new();
        for root in roots {
            for node in tree.descendants(root) {
                if let Some(edge) = self.outgoing_edge(tree, decl.unit, node, source) {
                    edges.push(edge);
                }
            }
        }
        debug!(source = source.0, edges = edges.len(), "located outgoing references");
        Ok(edges)
    }

    fn outgoing_edge(
        &self,
        tree: &Tree,
        unit: UnitId,
        node: NodeIndex,
        source: SymbolId,
    ) -> Option<ReferenceEdge> {
        let symbols = self.workspace.symbols();
        let span = tree.name_span(node)?;
        let target = match self.workspace.resolve_binding(unit, node) {
            Some(Binding::Symbol(id) | Binding::Member { symbol: id, .. }) => {
                if symbols.is_within(*id, source) {
                    return None;
                }
                EdgeTarget::Resolved(*id)
            }
            Some(Binding::Ambiguous(candidates)) => EdgeTarget::Ambiguous(candidates.clone()),
            Some(Binding::Variable | Binding::TypeParameter | Binding::Package(_)) => return None,
            None => EdgeTarget::Unresolved(unresolved_name(tree, node)?),
        };
        let target_is_type = matches!(&target, EdgeTarget::Resolved(id) if symbols[*id].is_type());
        let kind = reference_kind(tree, node, target_is_type)?;
        trace!(node = node.0, ?target, "outgoing edge");
        Some(ReferenceEdge {
            scope: self.scope_at(unit, node),
            target,
            location: Location::new(unit, span),
            kind,
            node,
        })
    }
}

/// The name of an unbound node worth reporting: bare names, unqualified
/// calls and type references outside imports.
fn unresolved_name(tree: &Tree, node: NodeIndex) -> Option<String> {
    let parent = tree.parent(node).and_then(|p| tree.kind(p));
    match tree.kind(node)? {
        NodeKind::SimpleName { name } if !matches!(parent, Some(NodeKind::Lambda { .. })) => {
            Some(name.clone())
        }
        NodeKind::MethodCall {
            receiver: None,
            name,
            ..
        } => Some(name.clone()),
        NodeKind::TypeRef { name, .. } => {
            let in_import = tree
                .ancestors(node)
                .any(|a| matches!(tree.kind(a), Some(NodeKind::Import { .. })));
            (!in_import).then(|| name.clone())
        }
        _ => None,
    }
}

impl std::fmt::Debug for ReferenceLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceLocator").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/locator_tests.rs"]
mod locator_tests;
