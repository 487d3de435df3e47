//! State threaded through the relocation stages.
//!
//! A move runs as `analyze -> plan -> qualify -> widen`, each stage taking
//! the context by value and handing it to the next. The stages live next
//! to the code they drive (`collector`, `link`, `qualify`, `widen`); this
//! module owns the shared state and the lexical queries they all need.

use crate::collector::EnclosingAccess;
use crate::emit::UnitRewrites;
use crate::plan::{EnclosingLink, InheritedParam, MoveOptions, RelocationPlan, SynthesizedField};
use hoist_common::messages::diagnostic_messages;
use hoist_common::{
    CancellationToken, Cancelled, Location, NestedThisPolicy, RefactoringConfig,
    RefactoringStatus, Span, UnitId,
};
use hoist_model::{
    ModifierFlags, NodeIndex, NodeKind, SymbolId, SymbolTable, Tree, Visibility, Workspace,
};
use hoist_visibility::{AccessorSubstitution, AdjustmentMap, ReferenceEdge, display_name};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Analyze,
    Plan,
    Qualify,
    Widen,
    Emit,
}

/// Why a stage stopped the move.
#[derive(Clone, Debug)]
pub(crate) enum Abort {
    Cancelled,
    Fatal(RefactoringStatus),
}

impl From<Cancelled> for Abort {
    fn from(_: Cancelled) -> Self {
        Abort::Cancelled
    }
}

impl Abort {
    pub(crate) fn fatal(
        message: &hoist_common::DiagnosticMessage,
        args: &[&str],
        location: Option<Location>,
    ) -> Self {
        Abort::Fatal(RefactoringStatus::from_message(message, args, location))
    }

    /// Fold the abort into the status gathered so far.
    pub(crate) fn into_status(self, mut status: RefactoringStatus) -> RefactoringStatus {
        match self {
            Abort::Cancelled => status.add_message(&diagnostic_messages::CANCELLED, &[], None),
            Abort::Fatal(fatal) => status.merge(fatal),
        }
        status
    }
}

pub(crate) struct RelocationContext<'a> {
    pub(crate) workspace: &'a dyn Workspace,
    pub(crate) config: &'a RefactoringConfig,
    pub(crate) cancel: &'a CancellationToken,
    pub(crate) options: MoveOptions,
    pub(crate) stage: Stage,

    pub(crate) moved: SymbolId,
    pub(crate) enclosing: SymbolId,
    pub(crate) unit: UnitId,
    pub(crate) decl_node: NodeIndex,
    pub(crate) tree: &'a Tree,
    pub(crate) text: &'a str,
    pub(crate) destination: String,
    pub(crate) new_unit_path: PathBuf,

    pub(crate) accesses: Vec<EnclosingAccess>,
    pub(crate) link: EnclosingLink,
    pub(crate) field: Option<SynthesizedField>,
    pub(crate) parameter_name: String,
    pub(crate) inherited_params: Vec<InheritedParam>,
    /// Types the moved code names explicitly after the move, with the
    /// site that made them necessary.
    pub(crate) introduced_qualifiers: Vec<(SymbolId, Location)>,
    pub(crate) rewrites: UnitRewrites,
    pub(crate) new_unit_imports: BTreeSet<String>,

    pub(crate) escaping: Vec<ReferenceEdge>,
    pub(crate) adjustments: AdjustmentMap,
    pub(crate) substitutions: Vec<AccessorSubstitution>,
    pub(crate) top_level_visibility: Visibility,
    pub(crate) status: RefactoringStatus,
}

impl std::fmt::Debug for RelocationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelocationContext")
            .field("stage", &self.stage)
            .field("moved", &self.moved)
            .field("destination", &self.destination)
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}

impl<'a> RelocationContext<'a> {
    /// Validate the target and set up an empty context.
    ///
    /// Fails for anything that cannot be moved at all: non-types, library
    /// types, local and anonymous types, top-level types, and moves whose
    /// destination already holds a type or unit of the same name.
    pub(crate) fn new(
        workspace: &'a dyn Workspace,
        config: &'a RefactoringConfig,
        cancel: &'a CancellationToken,
        moved: SymbolId,
        options: MoveOptions,
    ) -> Result<Self, Abort> {
        let symbols = workspace.symbols();
        let Some(symbol) = symbols.get(moved) else {
            return Err(Abort::fatal(
                &diagnostic_messages::MOVE_TARGET_NOT_A_TYPE,
                &[&format!("#{}", moved.0)],
                None,
            ));
        };
        let display = display_name(symbols, moved);
        if !symbol.is_type() {
            return Err(Abort::fatal(&diagnostic_messages::MOVE_TARGET_NOT_A_TYPE, &[&display], None));
        }
        let Some(decl) = symbol.decl else {
            return Err(Abort::fatal(&diagnostic_messages::MOVE_TARGET_IS_BINARY, &[&display], None));
        };
        let location = workspace
            .tree(decl.unit)
            .and_then(|t| t.decl_name_span(decl.node))
            .map(|span| Location::new(decl.unit, span));
        let chain = symbols.enclosing_chain(moved);
        if symbol.is_local || chain.iter().any(|&ty| symbols[ty].is_local) {
            return Err(Abort::fatal(&diagnostic_messages::MOVE_TARGET_IS_LOCAL, &[&display], location));
        }
        let Some(&enclosing) = chain.first() else {
            return Err(Abort::fatal(&diagnostic_messages::MOVE_TARGET_IS_TOP_LEVEL, &[&display], location));
        };
        let (Some(tree), Some(source)) = (workspace.tree(decl.unit), workspace.unit(decl.unit)) else {
            return Err(Abort::fatal(&diagnostic_messages::MOVE_TARGET_IS_BINARY, &[&display], None));
        };

        let destination = options
            .destination_package
            .clone()
            .unwrap_or_else(|| symbol.package.clone());
        if let Some(existing) = symbols.find_top_level(&destination, &symbol.name) {
            debug!(existing = %symbols.qualified_name(existing), "destination already declares the name");
            return Err(Abort::fatal(
                &diagnostic_messages::TYPE_NAME_COLLISION,
                &[&symbol.name, &destination],
                location,
            ));
        }
        let new_unit_path = source.sibling_path(&destination, &symbol.name);
        let path_taken = workspace
            .units()
            .into_iter()
            .filter_map(|id| workspace.unit(id))
            .any(|unit| unit.path == new_unit_path);
        if path_taken {
            return Err(Abort::fatal(
                &diagnostic_messages::UNIT_ALREADY_EXISTS,
                &[&new_unit_path.display().to_string()],
                location,
            ));
        }

        Ok(Self {
            workspace,
            config,
            cancel,
            options,
            stage: Stage::Analyze,
            moved,
            enclosing,
            unit: decl.unit,
            decl_node: decl.node,
            tree,
            text: &source.text,
            destination,
            new_unit_path,
            accesses: Vec::new(),
            link: EnclosingLink::Unavailable,
            field: None,
            parameter_name: String::new(),
            inherited_params: Vec::new(),
            introduced_qualifiers: Vec::new(),
            rewrites: UnitRewrites::default(),
            new_unit_imports: BTreeSet::new(),
            escaping: Vec::new(),
            adjustments: AdjustmentMap::new(),
            substitutions: Vec::new(),
            top_level_visibility: Visibility::PackageDefault,
            status: RefactoringStatus::new(),
        })
    }

    pub(crate) fn enter(&mut self, stage: Stage) -> Result<(), Cancelled> {
        debug!(?stage, moved = %self.moved_name(), "relocation stage");
        self.stage = stage;
        self.cancel.check()
    }

    pub(crate) fn into_plan(self) -> RelocationPlan {
        let symbols = self.symbols();
        let mut imports: Vec<String> = self
            .new_unit_imports
            .iter()
            .filter(|i| !i.starts_with("static "))
            .cloned()
            .collect();
        imports.extend(self.new_unit_imports.iter().filter(|i| i.starts_with("static ")).cloned());
        RelocationPlan {
            moved_type: self.moved,
            enclosing_type: self.enclosing,
            type_name: symbols[self.moved].name.clone(),
            destination_package: self.destination,
            new_unit_path: self.new_unit_path,
            link: self.link,
            synthesize_constructor: self.field.is_some() && symbols.constructors(self.moved).next().is_none(),
            enclosing_field: self.field,
            constructor_parameter_name: self.parameter_name,
            inherited_params: self.inherited_params,
            top_level_visibility: self.top_level_visibility,
            escaping_references: self.escaping,
            adjustments: self.adjustments,
            substitutions: self.substitutions,
            status: self.status,
            unit: self.unit,
            decl_node: self.decl_node,
            rewrites: self.rewrites,
            new_unit_imports: imports,
        }
    }

    // =========================================================================
    // Shared queries
    // =========================================================================

    pub(crate) fn symbols(&self) -> &'a SymbolTable {
        self.workspace.symbols()
    }

    pub(crate) fn moved_name(&self) -> &'a str {
        &self.symbols()[self.moved].name
    }

    pub(crate) fn moved_span(&self) -> Span {
        self.tree.span(self.decl_node)
    }

    /// Whether `span` of `unit` lies inside the moved declaration.
    pub(crate) fn in_moved(&self, unit: UnitId, span: Span) -> bool {
        unit == self.unit && self.moved_span().contains_span(span)
    }

    pub(crate) fn link_created(&self) -> bool {
        self.field.is_some()
    }

    /// Remember that the moved code now names `ty` explicitly.
    pub(crate) fn introduce_qualifier(&mut self, ty: SymbolId, location: Location) {
        if !self.introduced_qualifiers.iter().any(|(t, _)| *t == ty) {
            self.introduced_qualifiers.push((ty, location));
        }
    }

    /// Expression reaching the enclosing instance from `site`, a node of
    /// the moved declaration.
    pub(crate) fn field_access(&self, site: NodeIndex) -> String {
        let Some(field) = &self.field else {
            return String::new();
        };
        let innermost = innermost_type_decl(self.tree, site);
        if innermost != Some(self.decl_node) {
            return match self.config.nested_this_policy {
                NestedThisPolicy::QualifyWithMovedType => {
                    format!("{}.this.{}", self.moved_name(), field.name)
                }
                NestedThisPolicy::UnqualifiedField => field.name.clone(),
            };
        }
        if self.config.use_this_qualifier || self.is_shadowed(site, &field.name) {
            format!("this.{}", field.name)
        } else {
            field.name.clone()
        }
    }

    /// Whether a parameter or local named `name` is declared in the member
    /// of the moved type that contains `site`.
    fn is_shadowed(&self, site: NodeIndex, name: &str) -> bool {
        let tree = self.tree;
        let member = std::iter::once(site)
            .chain(tree.ancestors(site))
            .find(|&n| tree.parent(n) == Some(self.decl_node));
        let Some(member) = member else {
            return false;
        };
        tree.descendants(member).into_iter().any(|n| match tree.kind(n) {
            Some(NodeKind::Parameter { name: declared, .. }) => declared == name,
            Some(NodeKind::Fragment { name: declared, .. }) => {
                declared == name
                    && tree
                        .parent(n)
                        .is_some_and(|p| matches!(tree.kind(p), Some(NodeKind::LocalVariable { .. })))
            }
            Some(NodeKind::SimpleName { name: declared }) => {
                declared == name
                    && tree
                        .parent(n)
                        .is_some_and(|p| matches!(tree.kind(p), Some(NodeKind::Lambda { params, .. }) if params.contains(&n)))
            }
            _ => false,
        })
    }

    /// Whether a static member, static initializer or static type sits
    /// between `node` and its ancestor `upto`.
    pub(crate) fn in_static_context(&self, tree: &Tree, node: NodeIndex, upto: NodeIndex) -> bool {
        let symbols = self.symbols();
        for ancestor in tree.ancestors(node) {
            if ancestor == upto {
                return false;
            }
            let is_static = match tree.kind(ancestor) {
                Some(NodeKind::Method(decl)) => decl.modifiers.flags.contains(ModifierFlags::STATIC),
                Some(NodeKind::Field { modifiers, .. }) => modifiers.flags.contains(ModifierFlags::STATIC),
                Some(NodeKind::Initializer { is_static, .. }) => *is_static,
                Some(NodeKind::TypeDecl(_)) => symbols
                    .by_decl(tree.unit, ancestor)
                    .is_some_and(|ty| symbols.is_static(ty)),
                _ => false,
            };
            if is_static {
                return true;
            }
        }
        false
    }
}

/// Nearest enclosing type declaration of `node`, including `node` itself.
pub(crate) fn innermost_type_decl(tree: &Tree, node: NodeIndex) -> Option<NodeIndex> {
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .find(|&n| matches!(tree.kind(n), Some(NodeKind::TypeDecl(_))))
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod context_tests;
