//! Member Visibility Adjustor.
//!
//! Collects reference edges in the requested directions, asks the
//! analyzer for each distinct `(scope, target)` pair, and folds the
//! results into an [`AdjustmentMap`]. Nothing is edited while edges are
//! being discovered: the map is only turned into status entries (and,
//! through [`crate::rewrite`], into edits) once every edge has been seen,
//! so a wider requirement found late always wins over a narrower one
//! found early.

use crate::analyzer::VisibilityAnalyzer;
use crate::hierarchy::HierarchyCache;
use crate::layout::Layout;
use crate::locator::{EdgeTarget, ReferenceEdge, ReferenceLocator, ReferencingScope};
use crate::rewrite::accessor_edits;
use bitflags::bitflags;
use hoist_common::messages::diagnostic_messages;
use hoist_common::{
    CancellationToken, Cancelled, Location, RefactoringConfig, RefactoringStatus, Severity,
    StatusEntry, format_message,
};
use hoist_model::{
    NodeIndex, ReferenceKind, SearchScope, SymbolId, SymbolKind, SymbolTable, Visibility, Workspace,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, instrument, warn};

bitflags! {
    /// Which reference edges of a declaration to analyse.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        /// Sites elsewhere that refer to the declaration.
        const INCOMING = 1 << 0;
        /// Declarations the declaration's own body refers to.
        const OUTGOING = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityAdjustment {
    pub target: SymbolId,
    pub current: Visibility,
    pub required: Visibility,
    /// False when the keyword cannot or need not be written: implicitly
    /// public interface members and declarations without source.
    pub needs_rewriting: bool,
    pub rationale: StatusEntry,
}

/// At most one live adjustment per target; merging keeps the wider one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdjustmentMap {
    entries: IndexMap<SymbolId, VisibilityAdjustment>,
}

impl AdjustmentMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `adjustment`; returns true if the map changed.
    pub fn merge(&mut self, adjustment: VisibilityAdjustment) -> bool {
        match self.entries.get_mut(&adjustment.target) {
            Some(existing) if existing.required >= adjustment.required => false,
            Some(existing) => {
                *existing = adjustment;
                true
            }
            None => {
                self.entries.insert(adjustment.target, adjustment);
                true
            }
        }
    }

    pub fn extend(&mut self, other: AdjustmentMap) {
        for adjustment in other.entries.into_values() {
            self.merge(adjustment);
        }
    }

    #[must_use]
    pub fn get(&self, target: SymbolId) -> Option<&VisibilityAdjustment> {
        self.entries.get(&target)
    }

    #[must_use]
    pub fn required(&self, target: SymbolId) -> Option<Visibility> {
        self.get(target).map(|a| a.required)
    }

    pub fn remove(&mut self, target: SymbolId) -> Option<VisibilityAdjustment> {
        self.entries.shift_remove(&target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisibilityAdjustment> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for AdjustmentMap {
    type Item = VisibilityAdjustment;
    type IntoIter = indexmap::map::IntoValues<SymbolId, VisibilityAdjustment>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// A field access that will call an accessor instead of widening the field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorSubstitution {
    pub location: Location,
    pub node: NodeIndex,
    pub field: SymbolId,
    pub accessor: SymbolId,
    pub kind: AccessorKind,
}

/// Outcome of a visibility adjustment pass.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VisibilityReport {
    pub adjustments: AdjustmentMap,
    pub substitutions: Vec<AccessorSubstitution>,
    pub status: RefactoringStatus,
}

pub struct MemberVisibilityAdjustor<'a> {
    workspace: &'a dyn Workspace,
    config: &'a RefactoringConfig,
    cancel: &'a CancellationToken,
    layout: Layout<'a>,
    hierarchy: HierarchyCache<'a>,
    adjustments: AdjustmentMap,
    substitutions: Vec<AccessorSubstitution>,
    low_confidence: RefactoringStatus,
    analysed: FxHashSet<(ReferencingScope, SymbolId)>,
    reported: FxHashSet<Location>,
}

impl<'a> MemberVisibilityAdjustor<'a> {
    /// An adjustor evaluating thresholds against the program as declared.
    #[must_use]
    pub fn new(
        workspace: &'a dyn Workspace,
        config: &'a RefactoringConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self::with_layout(workspace, config, cancel, Layout::current(workspace.symbols()))
    }

    #[must_use]
    pub fn with_layout(
        workspace: &'a dyn Workspace,
        config: &'a RefactoringConfig,
        cancel: &'a CancellationToken,
        layout: Layout<'a>,
    ) -> Self {
        Self {
            workspace,
            config,
            cancel,
            layout,
            hierarchy: HierarchyCache::new(workspace, cancel),
            adjustments: AdjustmentMap::new(),
            substitutions: Vec::new(),
            low_confidence: RefactoringStatus::new(),
            analysed: FxHashSet::default(),
            reported: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> &Layout<'a> {
        &self.layout
    }

    #[must_use]
    pub fn hierarchy(&self) -> &HierarchyCache<'a> {
        &self.hierarchy
    }

    /// Widen `target` for every site in `scope` that refers to it.
    #[instrument(level = "debug", skip(self))]
    pub fn adjust_incoming(&mut self, target: SymbolId, scope: &SearchScope) -> Result<(), Cancelled> {
        let edges = ReferenceLocator::new(self.workspace, self.cancel).incoming(target, scope)?;
        for edge in &edges {
            self.cancel.check()?;
            self.record_edge(edge, Directions::INCOMING)?;
        }
        Ok(())
    }

    /// Widen what the declaration of `source` refers to. With
    /// `scope_override`, every edge is evaluated from that scope instead
    /// of the innermost declaration around its site.
    #[instrument(level = "debug", skip(self))]
    pub fn adjust_outgoing(
        &mut self,
        source: SymbolId,
        scope_override: Option<&ReferencingScope>,
    ) -> Result<(), Cancelled> {
        let edges = ReferenceLocator::new(self.workspace, self.cancel).outgoing(source)?;
        for mut edge in edges {
            self.cancel.check()?;
            if let Some(scope) = scope_override {
                edge.scope = scope.clone();
            }
            self.record_edge(&edge, Directions::OUTGOING)?;
        }
        Ok(())
    }

    /// Fold one edge into the adjustment map.
    pub fn record_edge(&mut self, edge: &ReferenceEdge, direction: Directions) -> Result<(), Cancelled> {
        match &edge.target {
            EdgeTarget::Resolved(target) => {
                if direction.contains(Directions::OUTGOING) && self.substitute_accessor(edge, *target)? {
                    return Ok(());
                }
                self.require(&edge.scope, *target, edge.location)
            }
            EdgeTarget::Ambiguous(candidates) => {
                if self.reported.insert(edge.location) {
                    let symbols = self.workspace.symbols();
                    let name = candidates
                        .first()
                        .map(|c| symbols[*c].name.clone())
                        .unwrap_or_default();
                    warn!(name = %name, candidates = candidates.len(), "ambiguous reference");
                    self.low_confidence.add_message(
                        &diagnostic_messages::AMBIGUOUS_REFERENCE,
                        &[&name, &candidates.len().to_string()],
                        Some(edge.location),
                    );
                }
                for candidate in candidates {
                    self.require_visibility(*candidate, Visibility::Public, edge.location);
                }
                Ok(())
            }
            EdgeTarget::Unresolved(name) => {
                if self.reported.insert(edge.location) {
                    warn!(name = %name, "unresolved reference");
                    self.low_confidence.add_message(
                        &diagnostic_messages::UNRESOLVED_REFERENCE,
                        &[name],
                        Some(edge.location),
                    );
                }
                Ok(())
            }
        }
    }

    /// Require `target`, and every enclosing type of it that does not
    /// also enclose `scope`, to be visible from `scope`.
    pub fn require(&mut self, scope: &ReferencingScope, target: SymbolId, site: Location) -> Result<(), Cancelled> {
        if !self.analysed.insert((scope.clone(), target)) {
            return Ok(());
        }
        let mut required = Vec::new();
        {
            let analyzer = VisibilityAnalyzer::new(self.workspace, &self.layout, &self.hierarchy);
            required.push((target, analyzer.threshold(scope, target)?));
            for ty in self.layout.enclosing_chain(target) {
                if self.scope_within(scope, ty) {
                    break;
                }
                required.push((ty, analyzer.threshold(scope, ty)?));
            }
        }
        for (id, visibility) in required {
            self.require_visibility(id, visibility, site);
        }
        Ok(())
    }

    /// Record that `target` must be at least `required`. A declaration
    /// already visible enough is left alone.
    pub fn require_visibility(&mut self, target: SymbolId, required: Visibility, site: Location) {
        let workspace = self.workspace;
        let symbols = workspace.symbols();
        let symbol = &symbols[target];
        let declared = Visibility::from_flags(symbol.flags);
        if declared.is_at_least(required) {
            return;
        }
        if symbols.is_interface_member(target) {
            let rationale = self.implicit_rationale(target);
            self.adjustments.merge(VisibilityAdjustment {
                target,
                current: Visibility::Public,
                required,
                needs_rewriting: false,
                rationale,
            });
            return;
        }
        let name = display_name(symbols, target);
        let binary = symbol.is_binary();
        let rationale = if binary {
            StatusEntry {
                severity: self.config.severities.failure,
                code: diagnostic_messages::BINARY_MEMBER.code,
                message: format_message(
                    diagnostic_messages::BINARY_MEMBER.message,
                    &[&name, required.label()],
                ),
                location: Some(site),
            }
        } else {
            StatusEntry {
                severity: self.config.severities.visibility_change,
                code: diagnostic_messages::VISIBILITY_CHANGED.code,
                message: format_message(
                    diagnostic_messages::VISIBILITY_CHANGED.message,
                    &[&name, declared.label(), required.label()],
                ),
                location: self.declaration_location(target).or(Some(site)),
            }
        };
        if self.adjustments.merge(VisibilityAdjustment {
            target,
            current: declared,
            required,
            needs_rewriting: !binary,
            rationale,
        }) {
            debug!(target = target.0, current = %declared, %required, "visibility adjustment");
        }
    }

    /// Route an outgoing field access through an existing accessor when
    /// the configuration prefers it and the field would need widening.
    fn substitute_accessor(&mut self, edge: &ReferenceEdge, field: SymbolId) -> Result<bool, Cancelled> {
        let workspace = self.workspace;
        let symbols = workspace.symbols();
        if symbols[field].kind != SymbolKind::Field || symbols[field].is_binary() {
            return Ok(false);
        }
        let preference = self.config.accessor_preference;
        let kind = match edge.kind {
            ReferenceKind::Read if preference.uses_getters() => AccessorKind::Getter,
            ReferenceKind::Write if preference.uses_setters() => AccessorKind::Setter,
            _ => return Ok(false),
        };
        let required = {
            let analyzer = VisibilityAnalyzer::new(self.workspace, &self.layout, &self.hierarchy);
            analyzer.threshold(&edge.scope, field)?
        };
        if symbols.visibility(field).is_at_least(required) {
            return Ok(false);
        }
        let Some(accessor) = self.find_accessor(field, kind) else {
            return Ok(false);
        };
        if edge.scope == ReferencingScope::Member(accessor) {
            return Ok(false);
        }
        let Some(tree) = workspace.tree(edge.location.unit) else {
            return Ok(false);
        };
        if accessor_edits(tree, edge.node, kind, &symbols[accessor].name).is_none() {
            return Ok(false);
        }
        debug!(field = field.0, accessor = accessor.0, ?kind, "accessor substitution");
        self.substitutions.push(AccessorSubstitution {
            location: edge.location,
            node: edge.node,
            field,
            accessor,
            kind,
        });
        self.require(&edge.scope, accessor, edge.location)?;
        Ok(true)
    }

    /// `getX`/`isX` without parameters, or `setX` with one, declared next
    /// to the field with the same staticness.
    #[must_use]
    pub fn find_accessor(&self, field: SymbolId, kind: AccessorKind) -> Option<SymbolId> {
        let symbols = self.workspace.symbols();
        let owner = symbols[field].owner?;
        let base = capitalize(self.config.naming.strip_field_affixes(&symbols[field].name));
        let (names, arity) = match kind {
            AccessorKind::Getter => (vec![format!("get{base}"), format!("is{base}")], 0),
            AccessorKind::Setter => (vec![format!("set{base}")], 1),
        };
        let is_static = symbols.is_static(field);
        names.iter().find_map(|name| {
            symbols.methods(owner).find(|m| {
                let method = &symbols[*m];
                method.name == *name
                    && method.params.len() == arity
                    && symbols.is_static(*m) == is_static
            })
        })
    }

    fn scope_within(&self, scope: &ReferencingScope, ty: SymbolId) -> bool {
        match scope {
            ReferencingScope::Type(id) | ReferencingScope::Member(id) => self.layout.is_within(*id, ty),
            ReferencingScope::Unit(_) | ReferencingScope::Package(_) => false,
        }
    }

    fn declaration_location(&self, target: SymbolId) -> Option<Location> {
        let decl = self.workspace.symbols()[target].decl?;
        let tree = self.workspace.tree(decl.unit)?;
        let span = tree.decl_name_span(decl.fragment.unwrap_or(decl.node))?;
        Some(Location::new(decl.unit, span))
    }

    fn implicit_rationale(&self, target: SymbolId) -> StatusEntry {
        let symbols = self.workspace.symbols();
        let owner = symbols[target]
            .owner
            .map(|o| symbols.type_path(o))
            .unwrap_or_default();
        StatusEntry {
            severity: Severity::Info,
            code: diagnostic_messages::VISIBILITY_IMPLICIT.code,
            message: format_message(
                diagnostic_messages::VISIBILITY_IMPLICIT.message,
                &[&display_name(symbols, target), &owner],
            ),
            location: self.declaration_location(target),
        }
    }

    /// Produce the merged adjustments and their status entries.
    #[must_use]
    pub fn finish(self) -> VisibilityReport {
        let symbols = self.workspace.symbols();
        let mut status = RefactoringStatus::new();
        for adjustment in self.adjustments.iter() {
            status.add(adjustment.rationale.clone());
        }
        for substitution in &self.substitutions {
            status.add_message(
                &diagnostic_messages::ACCESSOR_SUBSTITUTED,
                &[
                    &symbols[substitution.field].name,
                    &format!("{}()", symbols[substitution.accessor].name),
                ],
                Some(substitution.location),
            );
        }
        status.merge(self.low_confidence);
        debug!(
            adjustments = self.adjustments.len(),
            substitutions = self.substitutions.len(),
            hierarchies = self.hierarchy.computed(),
            "finished visibility adjustment"
        );
        VisibilityReport {
            adjustments: self.adjustments,
            substitutions: self.substitutions,
            status,
        }
    }
}

impl std::fmt::Debug for MemberVisibilityAdjustor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberVisibilityAdjustor")
            .field("adjustments", &self.adjustments.len())
            .field("substitutions", &self.substitutions.len())
            .finish_non_exhaustive()
    }
}

/// Adjust the visibility of `symbol` and what it depends on, in place.
///
/// Incoming edges are evaluated from the declaration around each site;
/// outgoing edges from the package of `symbol`.
pub fn adjust_visibility(
    workspace: &dyn Workspace,
    config: &RefactoringConfig,
    cancel: &CancellationToken,
    symbol: SymbolId,
    directions: Directions,
) -> Result<VisibilityReport, Cancelled> {
    let mut adjustor = MemberVisibilityAdjustor::new(workspace, config, cancel);
    if directions.contains(Directions::INCOMING) {
        adjustor.adjust_incoming(symbol, &SearchScope::Workspace)?;
    }
    if directions.contains(Directions::OUTGOING) {
        let package = ReferencingScope::Package(workspace.symbols()[symbol].package.clone());
        adjustor.adjust_outgoing(symbol, Some(&package))?;
    }
    Ok(adjustor.finish())
}

/// `Outer.Inner` for types, `Outer.member` for members.
#[must_use]
pub fn display_name(symbols: &SymbolTable, id: SymbolId) -> String {
    let symbol = &symbols[id];
    match (symbol.is_type(), symbol.owner) {
        (false, Some(owner)) => format!("{}.{}", symbols.type_path(owner), symbol.name),
        _ => symbols.type_path(id),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../tests/adjustor_tests.rs"]
mod adjustor_tests;
