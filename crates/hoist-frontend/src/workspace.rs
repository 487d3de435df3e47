//! In-memory host for the refactoring core.
//!
//! `InMemoryWorkspace` owns the source units, their trees and the bound
//! symbol table, and implements every collaborator trait from
//! `hoist_model::program`. Any change to a unit rebinds the whole program,
//! so symbol ids are only valid until the next change.

use crate::ParseError;
use crate::binder::bind_program;
use crate::parser::parse;
use crate::resolver::declared_package;
use hoist_common::{
    ApplyError, CancellationToken, Cancelled, Change, Location, TextEdit, UnitId, apply_text_edits,
};
use hoist_model::{
    Binding, ChangeApplier, HierarchyProvider, NodeIndex, NodeKind, Program, Reference,
    ReferenceFilter, ReferenceSearch, SearchScope, SourceUnit, SymbolId, SymbolTable, Tree,
    TypeHierarchy, reference_kind,
};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("failed to parse '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Default)]
pub struct InMemoryWorkspace {
    units: Vec<SourceUnit>,
    trees: Vec<Tree>,
    bindings: Vec<Vec<Option<Binding>>>,
    symbols: SymbolTable,
}

impl InMemoryWorkspace {
    #[must_use]
    pub fn new() -> Self {
        let mut workspace = Self::default();
        workspace.rebind();
        workspace
    }

    /// Parse and bind `(path, text)` pairs as one program.
    pub fn from_sources<P, S>(sources: impl IntoIterator<Item = (P, S)>) -> Result<Self, WorkspaceError>
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let mut workspace = Self::default();
        for (path, text) in sources {
            workspace.push_unit(path.into(), text.into())?;
        }
        workspace.rebind();
        Ok(workspace)
    }

    /// Add one unit and rebind the program.
    pub fn add_unit(
        &mut self,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Result<UnitId, WorkspaceError> {
        let id = self.push_unit(path.into(), text.into())?;
        self.rebind();
        Ok(id)
    }

    fn push_unit(&mut self, path: PathBuf, text: String) -> Result<UnitId, WorkspaceError> {
        let id = UnitId(self.units.len() as u32);
        let tree = parse(id, &text).map_err(|source| WorkspaceError::Parse {
            path: path.clone(),
            source,
        })?;
        self.units.push(SourceUnit {
            id,
            path,
            package: declared_package(&tree),
            text,
        });
        self.trees.push(tree);
        Ok(id)
    }

    fn rebind(&mut self) {
        let pairs: Vec<(&SourceUnit, &Tree)> = self.units.iter().zip(self.trees.iter()).collect();
        let bound = bind_program(&pairs);
        self.symbols = bound.symbols;
        self.bindings = bound.bindings;
        debug!(units = self.units.len(), "rebound workspace");
    }

    #[must_use]
    pub fn unit_by_path(&self, path: &Path) -> Option<UnitId> {
        self.units.iter().find(|u| u.path == path).map(|u| u.id)
    }

    #[must_use]
    pub fn text(&self, unit: UnitId) -> Option<&str> {
        self.unit(unit).map(|u| u.text.as_str())
    }

    /// A source or library type by qualified name, e.g. `p.Outer.Inner`.
    #[must_use]
    pub fn find_type(&self, qualified: &str) -> Option<SymbolId> {
        let segments: Vec<&str> = qualified.split('.').collect();
        (0..segments.len()).find_map(|split| {
            let package = segments[..split].join(".");
            let top = self.symbols.find_top_level(&package, segments[split])?;
            segments[split + 1..].iter().try_fold(top, |ty, name| {
                self.symbols
                    .member_types(ty)
                    .find(|m| self.symbols[*m].name == *name)
            })
        })
    }

    /// A member by `p.Outer#name`; the first declared member of that name.
    #[must_use]
    pub fn find_member(&self, qualified: &str) -> Option<SymbolId> {
        let (ty, name) = qualified.split_once('#')?;
        let ty = self.find_type(ty)?;
        self.symbols
            .members(ty)
            .iter()
            .copied()
            .find(|m| self.symbols[*m].name == name)
    }

    /// A type or member, by either form of qualified name.
    #[must_use]
    pub fn find_symbol(&self, qualified: &str) -> Option<SymbolId> {
        if qualified.contains('#') {
            self.find_member(qualified)
        } else {
            self.find_type(qualified)
        }
    }

    fn units_in(&self, scope: &SearchScope) -> Vec<UnitId> {
        match scope {
            SearchScope::Workspace => self.units(),
            SearchScope::Units(units) => units
                .iter()
                .copied()
                .filter(|u| self.unit(*u).is_some())
                .collect(),
            SearchScope::Package(package) => self
                .units
                .iter()
                .filter(|u| &u.package == package)
                .map(|u| u.id)
                .collect(),
        }
    }

    /// Describe the occurrence at `node`, or `None` when `node` does not
    /// carry a name.
    fn reference_at(&self, unit: UnitId, node: NodeIndex, target: SymbolId) -> Option<Reference> {
        let tree = self.tree(unit)?;
        let span = tree.name_span(node)?;
        let kind = reference_kind(tree, node, self.symbols[target].is_type())?;
        let is_static_access = match (tree.kind(node), tree.receiver(node)) {
            (Some(NodeKind::New { .. } | NodeKind::ConstructorCall { .. }), _) => false,
            (_, Some(receiver)) => {
                matches!(
                    tree.kind(receiver),
                    Some(NodeKind::SimpleName { .. } | NodeKind::FieldAccess { .. } | NodeKind::TypeRef { .. })
                ) && self
                    .resolve_binding(unit, receiver)
                    .and_then(Binding::symbol)
                    .is_some_and(|s| self.symbols[s].is_type())
            }
            (_, None) => self.symbols[target].is_type() || self.symbols.is_static(target),
        };
        Some(Reference {
            node,
            location: Location::new(unit, span),
            kind,
            is_static_access,
        })
    }
}

impl Program for InMemoryWorkspace {
    fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn units(&self) -> Vec<UnitId> {
        self.units.iter().map(|u| u.id).collect()
    }

    fn unit(&self, id: UnitId) -> Option<&SourceUnit> {
        self.units.get(id.0 as usize)
    }

    fn tree(&self, id: UnitId) -> Option<&Tree> {
        self.trees.get(id.0 as usize)
    }

    fn resolve_binding(&self, unit: UnitId, node: NodeIndex) -> Option<&Binding> {
        self.bindings
            .get(unit.0 as usize)?
            .get(node.0 as usize)?
            .as_ref()
    }
}

impl ReferenceSearch for InMemoryWorkspace {
    fn find_references(
        &self,
        symbol: SymbolId,
        scope: &SearchScope,
        filter: &ReferenceFilter,
        cancel: &CancellationToken,
    ) -> Result<IndexMap<UnitId, Vec<Reference>>, Cancelled> {
        let mut found: IndexMap<UnitId, Vec<Reference>> = IndexMap::new();
        for unit in self.units_in(scope) {
            cancel.check()?;
            let Some(bindings) = self.bindings.get(unit.0 as usize) else {
                continue;
            };
            let references: Vec<Reference> = bindings
                .iter()
                .enumerate()
                .filter(|(_, b)| b.as_ref().is_some_and(|b| b.refers_to(symbol)))
                .filter_map(|(i, _)| self.reference_at(unit, NodeIndex(i as u32), symbol))
                .filter(|r| filter.matches(r))
                .collect();
            if !references.is_empty() {
                found.insert(unit, references);
            }
        }
        trace!(
            symbol = symbol.0,
            units = found.len(),
            "found references"
        );
        Ok(found)
    }
}

impl HierarchyProvider for InMemoryWorkspace {
    fn type_hierarchy(
        &self,
        ty: SymbolId,
        cancel: &CancellationToken,
    ) -> Result<TypeHierarchy, Cancelled> {
        cancel.check()?;
        let supertypes = self.symbols.all_supertypes(ty);
        let mut subtypes = Vec::new();
        for symbol in self.symbols.iter() {
            if symbol.id != ty
                && symbol.is_type()
                && !symbol.is_binary()
                && self.symbols.is_subtype(symbol.id, ty)
            {
                subtypes.push(symbol.id);
            }
        }
        cancel.check()?;
        Ok(TypeHierarchy {
            supertypes,
            subtypes,
        })
    }
}

impl ChangeApplier for InMemoryWorkspace {
    fn apply_changes(&mut self, changes: &[Change]) -> Result<(), ApplyError> {
        let mut edits: IndexMap<UnitId, Vec<TextEdit>> = IndexMap::new();
        let mut creates: Vec<(PathBuf, String)> = Vec::new();
        for change in changes {
            match change {
                Change::Edit {
                    unit,
                    edits: unit_edits,
                    ..
                } => {
                    if self.unit(*unit).is_none() {
                        return Err(ApplyError::UnknownUnit(*unit));
                    }
                    edits.entry(*unit).or_default().extend(unit_edits.iter().cloned());
                }
                Change::Create { path, contents } => {
                    if self.unit_by_path(path).is_some() || creates.iter().any(|(p, _)| p == path)
                    {
                        return Err(ApplyError::AlreadyExists(path.clone()));
                    }
                    creates.push((path.clone(), contents.clone()));
                }
            }
        }

        // Compute and re-parse everything before touching any unit.
        let mut updated: Vec<(UnitId, String, Tree)> = Vec::new();
        for (unit, unit_edits) in &edits {
            let source = &self.units[unit.0 as usize];
            let text = apply_text_edits(&source.text, unit_edits)?;
            let tree = parse(*unit, &text).map_err(|e| {
                ApplyError::Rejected(format!("{}: {e}", source.path.display()))
            })?;
            updated.push((*unit, text, tree));
        }
        let mut created: Vec<(PathBuf, String, Tree)> = Vec::new();
        for (i, (path, contents)) in creates.into_iter().enumerate() {
            let id = UnitId((self.units.len() + i) as u32);
            let tree = parse(id, &contents)
                .map_err(|e| ApplyError::Rejected(format!("{}: {e}", path.display())))?;
            created.push((path, contents, tree));
        }

        for (unit, text, tree) in updated {
            let source = &mut self.units[unit.0 as usize];
            source.package = declared_package(&tree);
            source.text = text;
            self.trees[unit.0 as usize] = tree;
        }
        for (path, text, tree) in created {
            let id = tree.unit;
            self.units.push(SourceUnit {
                id,
                path,
                package: declared_package(&tree),
                text,
            });
            self.trees.push(tree);
        }
        debug!(changes = changes.len(), "applied changes");
        self.rebind();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/workspace_tests.rs"]
mod workspace_tests;
