//! Names that change meaning when the type moves.
//!
//! Inside the moved declaration, members of enclosing types lose their
//! implicit scope and are reached through the new field or the type name.
//! Outside it, references to the moved type drop their enclosing
//! qualifier, gain an import where needed and take the type arguments the
//! moved type inherited from its enclosing types.

use crate::collector::AccessKind;
use crate::context::{Abort, RelocationContext, Stage};
use crate::emit::line_extent;
use hoist_common::messages::diagnostic_messages;
use hoist_common::{Span, TextEdit, UnitId};
use hoist_model::{
    Binding, NodeIndex, NodeKind, ReferenceFilter, SearchScope, SourceUnit, SymbolId, Tree,
};
use hoist_visibility::display_name;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

impl<'a> RelocationContext<'a> {
    pub(crate) fn qualify(mut self) -> Result<Self, Abort> {
        self.enter(Stage::Qualify)?;
        self.qualify_enclosing_accesses();
        self.rewrite_type_references()?;
        self.collect_new_unit_imports();
        debug!(
            qualifiers = self.introduced_qualifiers.len(),
            imports = self.new_unit_imports.len(),
            "references qualified"
        );
        Ok(self)
    }

    // =========================================================================
    // Inside the moved declaration
    // =========================================================================

    fn qualify_enclosing_accesses(&mut self) {
        let accesses = std::mem::take(&mut self.accesses);
        let symbols = self.symbols();
        let tree = self.tree;
        for access in &accesses {
            let holder = access.kind.holder();
            let start = access.location.span.start;
            match access.kind {
                AccessKind::StaticMember { .. } | AccessKind::MemberType { .. } => {
                    let prefix = format!("{}.", symbols.type_path(holder));
                    self.rewrites.push(self.unit, TextEdit::insert(start, prefix));
                    self.introduce_qualifier(holder, access.location);
                }
                _ if holder != self.enclosing || !self.link_created() => {
                    self.status.add_message(
                        &diagnostic_messages::UNREACHABLE_OUTER_INSTANCE,
                        &[&display_name(symbols, holder), &display_name(symbols, self.moved)],
                        Some(access.location),
                    );
                }
                AccessKind::InstanceMember { .. } => {
                    let prefix = format!("{}.", self.field_access(access.node));
                    self.rewrites.push(self.unit, TextEdit::insert(start, prefix));
                }
                AccessKind::QualifiedThis { .. } => {
                    let replacement = self.field_access(access.node);
                    self.rewrites
                        .push(self.unit, TextEdit::replace(tree.span(access.node), replacement));
                }
                AccessKind::InnerCreation { .. } => {
                    let prefix = format!("{}.", self.field_access(access.node));
                    self.rewrites
                        .push(self.unit, TextEdit::insert(tree.span(access.node).start, prefix));
                }
            }
        }
        self.accesses = accesses;
    }

    // =========================================================================
    // References to the moved type
    // =========================================================================

    fn rewrite_type_references(&mut self) -> Result<(), Abort> {
        let workspace = self.workspace;
        let found = workspace.find_references(
            self.moved,
            &SearchScope::Workspace,
            &ReferenceFilter::all(),
            self.cancel,
        )?;
        let mut imported: FxHashSet<UnitId> = FxHashSet::default();
        let mut needs_import: IndexSet<UnitId> = IndexSet::new();

        for (unit, references) in found {
            self.cancel.check()?;
            let (Some(tree), Some(source)) = (workspace.tree(unit), workspace.unit(unit)) else {
                continue;
            };
            for reference in references {
                let node = reference.node;
                match tree.kind(node) {
                    Some(NodeKind::TypeRef { .. }) => {
                        if let Some(import) = enclosing_import(tree, node) {
                            if self.rewrite_import(source, tree, import, node) {
                                imported.insert(unit);
                            }
                            continue;
                        }
                        self.rewrite_type_ref(source, tree, node);
                    }
                    Some(NodeKind::FieldAccess { name_span, .. }) => {
                        let span = Span::new(tree.span(node).start, name_span.end);
                        let name = self.moved_name();
                        self.rewrites.push(unit, TextEdit::replace(span, name));
                    }
                    Some(NodeKind::SimpleName { .. }) => {}
                    _ => continue,
                }
                trace!(unit = unit.0, ?node, "reference to moved type");
                if !self.in_moved(unit, tree.span(node)) && source.package != self.destination {
                    needs_import.insert(unit);
                }
            }
        }

        if self.destination.is_empty() {
            return Ok(());
        }
        let import = format!("{}.{}", self.destination, self.moved_name());
        for unit in needs_import {
            if !imported.contains(&unit) {
                self.rewrites.add_import(unit, import.clone());
            }
        }
        Ok(())
    }

    /// Rewrite an import naming the moved type. Returns whether the unit
    /// now imports the moved type under its new name.
    fn rewrite_import(&mut self, source: &SourceUnit, tree: &Tree, import: NodeIndex, node: NodeIndex) -> bool {
        let Some(NodeKind::Import {
            is_static,
            on_demand,
            name,
        }) = tree.kind(import)
        else {
            return false;
        };
        let unit = source.id;
        let new_name = if self.destination.is_empty() {
            self.moved_name().to_string()
        } else {
            format!("{}.{}", self.destination, self.moved_name())
        };
        let single_type = *name == node && !is_static && !on_demand;
        if single_type && (source.package == self.destination || self.destination.is_empty()) {
            let span = line_extent(&source.text, tree.span(import));
            self.rewrites.push(unit, TextEdit::delete(span));
            return false;
        }
        let Some(name_end) = tree.name_span(node).map(|s| s.end) else {
            return false;
        };
        let span = Span::new(tree.span(node).start, name_end);
        self.rewrites.push(unit, TextEdit::replace(span, new_name));
        single_type
    }

    /// Drop the enclosing qualifier of a type reference and adjust its type
    /// arguments to the inherited type parameters.
    fn rewrite_type_ref(&mut self, source: &SourceUnit, tree: &Tree, node: NodeIndex) {
        let Some(NodeKind::TypeRef {
            qualifier,
            name_span,
            args,
            ..
        }) = tree.kind(node)
        else {
            return;
        };
        let unit = source.id;
        let text = source.text.as_str();
        let inherited = self.inherited_args(unit, tree, node, *qualifier, text);

        if qualifier.is_some() {
            let end = args.as_ref().map_or(name_span.end, |a| a.close + 1);
            let own: Option<Vec<String>> = args.as_ref().map(|a| {
                a.items
                    .iter()
                    .map(|&item| tree.span(item).slice(text).to_string())
                    .collect()
            });
            let replacement = format!("{}{}", self.moved_name(), self.arguments_text(inherited, own));
            self.rewrites
                .push(unit, TextEdit::replace(Span::new(tree.span(node).start, end), replacement));
            return;
        }

        let Some(inherited) = inherited else {
            return;
        };
        let edit = match args {
            Some(own) if own.is_empty() => None,
            Some(own) => Some(TextEdit::insert(own.inner_start(), format!("{}, ", inherited.join(", ")))),
            None if self.symbols()[self.moved].type_params.is_empty() => {
                Some(TextEdit::insert(name_span.end, format!("<{}>", inherited.join(", "))))
            }
            None => None,
        };
        if let Some(edit) = edit {
            self.rewrites.push(unit, edit);
        }
    }

    /// Arguments for the inherited type parameters at a reference, or
    /// `None` where the reference stays raw.
    ///
    /// A qualified reference carries them on its qualifiers
    /// (`Outer<String>.Inner`). An unqualified one inside an instance
    /// context of the enclosing type used the enclosing parameters
    /// implicitly, so it gets their names.
    fn inherited_args(
        &self,
        unit: UnitId,
        tree: &Tree,
        node: NodeIndex,
        qualifier: Option<NodeIndex>,
        text: &str,
    ) -> Option<Vec<String>> {
        if self.inherited_params.is_empty() {
            return None;
        }
        if qualifier.is_none() {
            return self.in_generic_scope(unit, tree, node).then(|| {
                self.inherited_params
                    .iter()
                    .map(|p| p.name.clone())
                    .collect()
            });
        }
        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut current = qualifier;
        while let Some(q) = current {
            let Some(NodeKind::TypeRef { qualifier, args, .. }) = tree.kind(q) else {
                break;
            };
            if let Some(args) = args {
                levels.push(
                    args.items
                        .iter()
                        .map(|&item| tree.span(item).slice(text).to_string())
                        .collect(),
                );
            }
            current = *qualifier;
        }
        levels.reverse();
        let mut collected: Vec<String> = levels.into_iter().flatten().collect();
        if collected.is_empty() {
            return None;
        }
        collected.truncate(self.inherited_params.len());
        let missing = &self.inherited_params[collected.len()..];
        collected.extend(missing.iter().map(|p| p.name.clone()));
        Some(collected)
    }

    fn in_generic_scope(&self, unit: UnitId, tree: &Tree, node: NodeIndex) -> bool {
        let Some(decl) = self.symbols()[self.enclosing].decl else {
            return false;
        };
        decl.unit == unit
            && tree.is_ancestor(decl.node, node)
            && !self.in_static_context(tree, node, decl.node)
    }

    fn arguments_text(&self, inherited: Option<Vec<String>>, own: Option<Vec<String>>) -> String {
        let own_params = !self.symbols()[self.moved].type_params.is_empty();
        match (inherited, own) {
            (_, Some(own)) if own.is_empty() => "<>".to_string(),
            (Some(inherited), Some(own)) => format!("<{}>", [inherited, own].concat().join(", ")),
            (Some(inherited), None) if !own_params => format!("<{}>", inherited.join(", ")),
            (None, Some(own)) => format!("<{}>", own.join(", ")),
            _ => String::new(),
        }
    }

    // =========================================================================
    // Imports of the new unit
    // =========================================================================

    /// Imports the moved declaration needs once it no longer sees the
    /// enclosing unit's imports and scopes.
    fn collect_new_unit_imports(&mut self) {
        let workspace = self.workspace;
        let symbols = self.symbols();
        let tree = self.tree;
        for node in tree.descendants(self.decl_node) {
            let static_import_site = match tree.kind(node) {
                Some(NodeKind::TypeRef { qualifier: None, .. }) => false,
                Some(NodeKind::SimpleName { .. }) => !is_switch_label(tree, node),
                Some(NodeKind::MethodCall { receiver: None, .. }) => true,
                _ => continue,
            };
            let Some(Binding::Symbol(id)) = workspace.resolve_binding(self.unit, node) else {
                continue;
            };
            if symbols[*id].is_type() {
                self.import_type(*id);
            } else if static_import_site {
                self.import_static(*id);
            }
        }
        let holders: Vec<SymbolId> = self.introduced_qualifiers.iter().map(|(ty, _)| *ty).collect();
        for holder in holders {
            self.import_type(symbols.top_level_of(holder));
        }
    }

    fn import_type(&mut self, ty: SymbolId) {
        let symbols = self.symbols();
        let symbol = &symbols[ty];
        if symbols.is_within(ty, self.moved) || symbol.is_local || symbol.package.is_empty() {
            return;
        }
        let top_level = symbol.owner.is_none();
        if top_level && (symbol.package == self.destination || symbol.package == "java.lang") {
            return;
        }
        self.new_unit_imports.insert(symbols.qualified_name(ty));
    }

    fn import_static(&mut self, member: SymbolId) {
        let symbols = self.symbols();
        let Some(owner) = symbols[member].owner else {
            return;
        };
        if symbols.is_within(owner, self.moved) || !symbols.is_static(member) {
            return;
        }
        self.new_unit_imports.insert(format!(
            "static {}.{}",
            symbols.qualified_name(owner),
            symbols[member].name
        ));
    }
}

fn enclosing_import(tree: &Tree, node: NodeIndex) -> Option<NodeIndex> {
    tree.ancestors(node)
        .find(|&a| matches!(tree.kind(a), Some(NodeKind::Import { .. })))
}

fn is_switch_label(tree: &Tree, node: NodeIndex) -> bool {
    tree.parent(node).is_some_and(
        |p| matches!(tree.kind(p), Some(NodeKind::SwitchCase { labels, .. }) if labels.contains(&node)),
    )
}

#[cfg(test)]
#[path = "../tests/qualify_tests.rs"]
mod qualify_tests;
