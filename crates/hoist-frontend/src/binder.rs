//! Builds the symbol table and the per-unit bindings of a program.
//!
//! Binding runs in phases over all units, since declarations in one unit
//! are visible in every other:
//!
//! 1. declare every type and member, including local and anonymous types;
//! 2. resolve `extends`/`implements` clauses (twice, so member types
//!    inherited through a supertype resolved in the first round are found);
//! 3. resolve the declared types of fields and method results;
//! 4. resolve every name in every body.

use crate::library::declare_library;
use crate::resolver::{Meaning, Resolver, declared_package};
use hoist_model::{
    Binding, DeclRef, ModifierFlags, NodeIndex, NodeKind, SourceUnit, Symbol, SymbolId, SymbolKind,
    SymbolTable, Tree, TypeKind,
};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Result of binding a program.
#[derive(Debug, Default)]
pub struct BoundProgram {
    pub symbols: SymbolTable,
    /// Bindings per unit, in input order, indexed by node.
    pub bindings: Vec<Vec<Option<Binding>>>,
}

struct BinderState {
    symbols: SymbolTable,
    object: SymbolId,
    anonymous_counts: FxHashMap<SymbolId, u32>,
}

/// Bind `units` together with the predeclared library types.
#[must_use]
pub fn bind_program(units: &[(&SourceUnit, &Tree)]) -> BoundProgram {
    let mut symbols = SymbolTable::new();
    let object = declare_library(&mut symbols);
    let mut state = BinderState {
        symbols,
        object,
        anonymous_counts: FxHashMap::default(),
    };

    for (unit, tree) in units {
        let package = declared_package(tree);
        for &top in tree.top_level_types() {
            state.declare_type(unit, tree, top, None, false, &package);
        }
    }
    for _ in 0..2 {
        for (_, tree) in units {
            state.resolve_headers(tree);
        }
    }
    for (_, tree) in units {
        state.resolve_value_types(tree);
    }

    let bindings = units
        .iter()
        .map(|(_, tree)| Resolver::new(&state.symbols, tree).resolve_all())
        .collect();
    debug!(
        units = units.len(),
        symbols = state.symbols.len(),
        "bound program"
    );
    BoundProgram {
        symbols: state.symbols,
        bindings,
    }
}

impl BinderState {
    // =========================================================================
    // Declarations
    // =========================================================================

    fn declare_type(
        &mut self,
        unit: &SourceUnit,
        tree: &Tree,
        node: NodeIndex,
        owner: Option<SymbolId>,
        is_local: bool,
        package: &str,
    ) -> Option<SymbolId> {
        let decl = tree.type_decl(node)?;
        let name = if decl.kind == TypeKind::Anonymous {
            let owner_id = owner.unwrap_or(self.object);
            let count = self.anonymous_counts.entry(owner_id).or_insert(0);
            *count += 1;
            format!("{}${}", self.symbols[owner_id].name, count)
        } else {
            decl.name.clone()
        };
        let mut symbol = Symbol::new(name, SymbolKind::Type(decl.kind), package);
        symbol.flags = decl.modifiers.flags;
        symbol.owner = owner;
        symbol.is_local = is_local;
        symbol.decl = Some(DeclRef {
            unit: unit.id,
            node,
            fragment: None,
        });
        symbol.type_params = type_param_names(tree, decl.type_params.as_ref());
        let id = self.symbols.add(symbol);

        for &item in &decl.body.items {
            self.declare_member(unit, tree, item, id, package);
        }
        Some(id)
    }

    fn declare_member(
        &mut self,
        unit: &SourceUnit,
        tree: &Tree,
        item: NodeIndex,
        owner: SymbolId,
        package: &str,
    ) {
        match tree.kind(item) {
            Some(NodeKind::Field {
                modifiers,
                ty,
                fragments,
            }) => {
                let ty_text = tree.span(*ty).slice(&unit.text);
                for &fragment in fragments {
                    let Some(NodeKind::Fragment {
                        name, dims, init, ..
                    }) = tree.kind(fragment)
                    else {
                        continue;
                    };
                    let mut symbol = Symbol::new(name.as_str(), SymbolKind::Field, package);
                    symbol.flags = modifiers.flags;
                    symbol.type_text = Some(format!("{ty_text}{}", "[]".repeat(usize::from(*dims))));
                    symbol.owner = Some(owner);
                    symbol.decl = Some(DeclRef {
                        unit: unit.id,
                        node: item,
                        fragment: Some(fragment),
                    });
                    self.symbols.add(symbol);
                    if let Some(init) = init {
                        self.declare_local_types(unit, tree, *init, owner, package);
                    }
                }
            }
            Some(NodeKind::Method(decl)) => {
                let kind = if decl.is_constructor() {
                    SymbolKind::Constructor
                } else {
                    SymbolKind::Method
                };
                let mut symbol = Symbol::new(decl.name.as_str(), kind, package);
                symbol.flags = decl.modifiers.flags;
                symbol.owner = Some(owner);
                symbol.decl = Some(DeclRef {
                    unit: unit.id,
                    node: item,
                    fragment: None,
                });
                symbol.type_params = type_param_names(tree, decl.type_params.as_ref());
                symbol.type_text = decl
                    .return_type
                    .map(|ty| tree.span(ty).slice(&unit.text).to_string());
                for &param in &decl.params.items {
                    if let Some(NodeKind::Parameter { ty, varargs, .. }) = tree.kind(param) {
                        let text = tree.span(*ty).slice(&unit.text);
                        symbol.params.push(if *varargs {
                            format!("{text}...")
                        } else {
                            text.to_string()
                        });
                        symbol.varargs = *varargs;
                    }
                }
                self.symbols.add(symbol);
                for root in decl.body.iter().chain(decl.default_value.iter()) {
                    self.declare_local_types(unit, tree, *root, owner, package);
                }
            }
            Some(NodeKind::Initializer { body, .. }) => {
                self.declare_local_types(unit, tree, *body, owner, package);
            }
            Some(NodeKind::TypeDecl(_)) => {
                self.declare_type(unit, tree, item, Some(owner), false, package);
            }
            Some(NodeKind::EnumConstant { name, args, body, .. }) => {
                let mut symbol = Symbol::new(name.as_str(), SymbolKind::Field, package);
                symbol.flags = ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL;
                symbol.owner = Some(owner);
                symbol.value_type = Some(owner);
                symbol.decl = Some(DeclRef {
                    unit: unit.id,
                    node: item,
                    fragment: None,
                });
                self.symbols.add(symbol);
                for &arg in args.iter().flat_map(|a| a.items.iter()) {
                    self.declare_local_types(unit, tree, arg, owner, package);
                }
                if let Some(body) = body {
                    self.declare_type(unit, tree, *body, Some(owner), true, package);
                }
            }
            _ => {}
        }
    }

    /// Declare local and anonymous types found under `root`, owned by the
    /// type whose code contains them.
    fn declare_local_types(
        &mut self,
        unit: &SourceUnit,
        tree: &Tree,
        root: NodeIndex,
        owner: SymbolId,
        package: &str,
    ) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if matches!(tree.kind(node), Some(NodeKind::TypeDecl(_))) {
                self.declare_type(unit, tree, node, Some(owner), true, package);
                continue;
            }
            stack.extend(tree.children(node).into_iter().rev());
        }
    }

    // =========================================================================
    // Headers and member types
    // =========================================================================

    fn resolve_headers(&mut self, tree: &Tree) {
        let mut updates: Vec<(SymbolId, Option<SymbolId>, Vec<SymbolId>)> = Vec::new();
        {
            let mut resolver = Resolver::new(&self.symbols, tree);
            for node in tree.indices() {
                let Some(NodeKind::TypeDecl(decl)) = tree.kind(node) else {
                    continue;
                };
                let Some(id) = self.symbols.by_decl(tree.unit, node) else {
                    continue;
                };
                let extends: Vec<SymbolId> = decl
                    .extends
                    .iter()
                    .filter_map(|t| resolver.resolve_type_ref(*t))
                    .collect();
                let implements: Vec<SymbolId> = decl
                    .implements
                    .iter()
                    .filter_map(|t| resolver.resolve_type_ref(*t))
                    .collect();
                let (superclass, interfaces) = match decl.kind {
                    TypeKind::Class => (
                        Some(extends.first().copied().unwrap_or(self.object)),
                        implements,
                    ),
                    TypeKind::Enum => (Some(self.object), implements),
                    TypeKind::Interface | TypeKind::Annotation => (None, extends),
                    TypeKind::Anonymous => self.anonymous_supertypes(tree, node, &mut resolver, id),
                };
                updates.push((id, superclass.filter(|s| *s != id), interfaces));
            }
        }
        for (id, superclass, interfaces) in updates {
            if let Some(symbol) = self.symbols.get_mut(id) {
                symbol.superclass = superclass;
                symbol.interfaces = interfaces;
            }
        }
    }

    fn anonymous_supertypes(
        &self,
        tree: &Tree,
        node: NodeIndex,
        resolver: &mut Resolver<'_>,
        id: SymbolId,
    ) -> (Option<SymbolId>, Vec<SymbolId>) {
        let parent = tree.parent(node);
        let base = match parent.and_then(|p| tree.kind(p)) {
            Some(NodeKind::New { .. }) => match parent.map(|p| resolver.meaning(p)) {
                Some(Meaning::Value(Some(base))) => Some(base),
                _ => None,
            },
            Some(NodeKind::EnumConstant { .. }) => self.symbols[id].owner,
            _ => None,
        };
        match base {
            Some(base) if self.symbols[base].type_kind() == Some(TypeKind::Interface) => {
                (Some(self.object), vec![base])
            }
            Some(base) => (Some(base), Vec::new()),
            None => (Some(self.object), Vec::new()),
        }
    }

    // =========================================================================
    // Field and method types
    // =========================================================================

    fn resolve_value_types(&mut self, tree: &Tree) {
        let mut updates: Vec<(SymbolId, SymbolId)> = Vec::new();
        {
            let mut resolver = Resolver::new(&self.symbols, tree);
            for symbol in self.symbols.iter() {
                let Some(decl) = symbol.decl else {
                    continue;
                };
                if decl.unit != tree.unit {
                    continue;
                }
                let ty = match (symbol.kind, tree.kind(decl.node)) {
                    (SymbolKind::Field, Some(NodeKind::Field { ty, .. })) => {
                        let array = decl.fragment.is_some_and(|f| {
                            matches!(tree.kind(f), Some(NodeKind::Fragment { dims: 1.., .. }))
                        });
                        (!array).then_some(*ty)
                    }
                    (SymbolKind::Method, Some(NodeKind::Method(method))) => method.return_type,
                    _ => None,
                };
                let Some(ty) = ty else {
                    continue;
                };
                if matches!(tree.kind(ty), Some(NodeKind::TypeRef { dims: 0, .. }))
                    && let Some(value) = resolver.resolve_type_ref(ty)
                {
                    updates.push((symbol.id, value));
                }
            }
        }
        for (id, value) in updates {
            if let Some(symbol) = self.symbols.get_mut(id) {
                symbol.value_type = Some(value);
            }
        }
    }
}

fn type_param_names(tree: &Tree, params: Option<&hoist_model::Delimited>) -> Vec<String> {
    params
        .map(|params| {
            params
                .items
                .iter()
                .filter_map(|p| match tree.kind(*p) {
                    Some(NodeKind::TypeParam { name, .. }) => Some(name.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/binder_tests.rs"]
mod binder_tests;
