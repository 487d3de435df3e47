//! Name resolution for one unit.
//!
//! Scopes are not materialized. A name is resolved by walking the
//! ancestors of its node, nearest first: block-local declarations,
//! parameters, then the members (declared and inherited) of each
//! lexically enclosing type. Whatever remains is looked up in the unit,
//! its imports, its package and `java.lang`, in that order.
//!
//! Every resolved name, type reference and invocation node gets a
//! [`Binding`]. Members found through an enclosing type rather than a
//! qualifier are recorded as [`Binding::Member`] so callers can tell
//! which enclosing instance or scope the name depends on.

use hoist_model::{
    Binding, CallKind, NodeIndex, NodeKind, SymbolId, SymbolKind, SymbolTable, Tree, TypeKind,
};
use rustc_hash::FxHashSet;

/// What an expression denotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Meaning {
    /// A value, with its class type when known.
    Value(Option<SymbolId>),
    Type(SymbolId),
    Package(String),
    Unknown,
}

/// Result of a lexical variable lookup.
enum Lexical {
    /// A local or parameter, with its declared type node.
    Local(Option<NodeIndex>),
    Field { symbol: SymbolId, holder: SymbolId },
}

/// Static type of a call argument, as far as one unit tells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArgType {
    Primitive(&'static str),
    Class(SymbolId),
    Null,
    Unknown,
}

/// How well an argument fits a declared parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Fit {
    No,
    /// Applicable by widening or boxing, or not decidable here.
    Loose,
    Exact,
}

enum TypeHit {
    Type {
        symbol: SymbolId,
        holder: Option<SymbolId>,
    },
    Parameter,
}

#[derive(Default)]
struct Imports {
    /// `(simple name, dotted name)` of single-type imports.
    single: Vec<(String, String)>,
    on_demand: Vec<String>,
    /// `(member name, dotted type name)` of single static imports.
    static_single: Vec<(String, String)>,
    static_on_demand: Vec<String>,
}

pub struct Resolver<'a> {
    symbols: &'a SymbolTable,
    tree: &'a Tree,
    package: String,
    imports: Imports,
    header_nodes: FxHashSet<NodeIndex>,
    bindings: Vec<Option<Binding>>,
    meanings: Vec<Option<Meaning>>,
    types: Vec<Option<Option<SymbolId>>>,
}

/// Package declared by `tree`, empty for the default package.
#[must_use]
pub fn declared_package(tree: &Tree) -> String {
    match tree.package_decl().and_then(|p| tree.kind(p)) {
        Some(NodeKind::PackageDecl { name }) => tree.dotted_name(*name),
        _ => String::new(),
    }
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(symbols: &'a SymbolTable, tree: &'a Tree) -> Self {
        let mut resolver = Self {
            symbols,
            tree,
            package: declared_package(tree),
            imports: Imports::default(),
            header_nodes: FxHashSet::default(),
            bindings: vec![None; tree.len()],
            meanings: vec![None; tree.len()],
            types: vec![None; tree.len()],
        };
        resolver.resolve_header();
        resolver
    }

    /// Resolve every node of the unit and return the bindings, indexed by
    /// node.
    #[must_use]
    pub fn resolve_all(mut self) -> Vec<Option<Binding>> {
        let tree = self.tree;
        for idx in tree.descendants(tree.root) {
            if self.header_nodes.contains(&idx) {
                continue;
            }
            match tree.kind(idx) {
                Some(NodeKind::TypeRef { .. }) => {
                    self.resolve_type_ref(idx);
                }
                Some(NodeKind::ConstructorCall { .. }) => self.resolve_constructor_call(idx),
                Some(
                    NodeKind::SimpleName { .. }
                    | NodeKind::FieldAccess { .. }
                    | NodeKind::MethodCall { .. }
                    | NodeKind::New { .. }
                    | NodeKind::MethodRef { .. },
                ) => {
                    self.meaning(idx);
                }
                _ => {}
            }
        }
        self.bindings
    }

    fn bind(&mut self, node: NodeIndex, binding: Binding) {
        if let Some(slot) = self.bindings.get_mut(node.0 as usize) {
            *slot = Some(binding);
        }
    }

    fn binding(&self, node: NodeIndex) -> Option<&Binding> {
        self.bindings.get(node.0 as usize).and_then(Option::as_ref)
    }

    // =========================================================================
    // Package and imports
    // =========================================================================

    fn resolve_header(&mut self) {
        let tree = self.tree;
        let mut header = Vec::new();
        header.extend(tree.package_decl());
        header.extend(tree.imports().iter().copied());
        for node in header {
            self.header_nodes.extend(tree.descendants(node));
            match tree.kind(node) {
                Some(NodeKind::PackageDecl { name }) => {
                    let name = *name;
                    self.bind(name, Binding::Package(tree.dotted_name(name)));
                }
                Some(&NodeKind::Import {
                    is_static,
                    on_demand,
                    name,
                }) => self.resolve_import(is_static, on_demand, name),
                _ => {}
            }
        }
    }

    fn resolve_import(&mut self, is_static: bool, on_demand: bool, name: NodeIndex) {
        let tree = self.tree;
        let dotted = tree.dotted_name(name);
        match (is_static, on_demand) {
            (false, false) => {
                self.bind_name_chain(name);
                let simple = dotted.rsplit('.').next().unwrap_or_default().to_string();
                self.imports.single.push((simple, dotted));
            }
            (false, true) => {
                self.bind_name_chain(name);
                self.imports.on_demand.push(dotted);
            }
            (true, false) => {
                let Some(NodeKind::TypeRef {
                    qualifier: Some(qualifier),
                    name: member,
                    ..
                }) = tree.kind(name)
                else {
                    return;
                };
                let owner = self.bind_name_chain(*qualifier);
                if let Some(owner) = owner {
                    if let Some(field) = self.symbols.lookup_field(owner, member) {
                        self.bind(name, Binding::Symbol(field));
                    } else {
                        let methods = self.symbols.lookup_methods(owner, member);
                        match methods.as_slice() {
                            [] => {}
                            [single] => self.bind(name, Binding::Symbol(*single)),
                            _ => self.bind(name, Binding::Ambiguous(methods)),
                        }
                    }
                }
                let owner_name = tree.dotted_name(*qualifier);
                self.imports.static_single.push((member.clone(), owner_name));
            }
            (true, true) => {
                self.bind_name_chain(name);
                self.imports.static_on_demand.push(dotted);
            }
        }
    }

    /// Bind each segment of a dotted name to the type or package it
    /// denotes. Returns the type of the whole name.
    fn bind_name_chain(&mut self, node: NodeIndex) -> Option<SymbolId> {
        let tree = self.tree;
        let Some(NodeKind::TypeRef {
            qualifier, name, ..
        }) = tree.kind(node)
        else {
            return None;
        };
        let found = match qualifier {
            None => self.symbols.find_top_level("", name),
            Some(q) => match self.bind_name_chain(*q) {
                Some(outer) => self.symbols.lookup_member_type(outer, name),
                None => self.symbols.find_top_level(&tree.dotted_name(*q), name),
            },
        };
        match found {
            Some(ty) => self.bind(node, Binding::Symbol(ty)),
            None => {
                let dotted = tree.dotted_name(node);
                if self.symbols.has_package_prefix(&dotted) {
                    self.bind(node, Binding::Package(dotted));
                }
            }
        }
        found
    }

    /// A type given by its dotted name, such as `p.Outer.Inner`.
    fn resolve_qualified_type(&self, dotted: &str) -> Option<SymbolId> {
        let segments: Vec<&str> = dotted.split('.').collect();
        for split in 0..segments.len() {
            let package = segments[..split].join(".");
            let Some(mut ty) = self.symbols.find_top_level(&package, segments[split]) else {
                continue;
            };
            let mut complete = true;
            for member in &segments[split + 1..] {
                match self.symbols.lookup_member_type(ty, member) {
                    Some(next) => ty = next,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                return Some(ty);
            }
        }
        None
    }

    // =========================================================================
    // Lexical lookup
    // =========================================================================

    /// The type declaration `node` is lexically inside of.
    fn enclosing_type(&self, node: NodeIndex) -> Option<SymbolId> {
        self.tree.ancestors(node).find_map(|a| match self.tree.kind(a) {
            Some(NodeKind::TypeDecl(_)) => self.symbols.by_decl(self.tree.unit, a),
            _ => None,
        })
    }

    fn local_type_node(&self, stmt: NodeIndex, name: &str) -> Option<NodeIndex> {
        match self.tree.kind(stmt) {
            Some(NodeKind::LocalVariable {
                ty, fragments, ..
            }) => fragments
                .iter()
                .any(|f| fragment_name(self.tree, *f) == Some(name))
                .then_some(*ty),
            _ => None,
        }
    }

    fn lookup_variable(&self, node: NodeIndex, name: &str) -> Option<Lexical> {
        let tree = self.tree;
        let mut child = node;
        for anc in tree.ancestors(node) {
            match tree.kind(anc) {
                Some(
                    NodeKind::Block { statements }
                    | NodeKind::SwitchCase { statements, .. },
                ) => {
                    for &stmt in statements {
                        if stmt == child {
                            break;
                        }
                        if let Some(ty) = self.local_type_node(stmt, name) {
                            return Some(Lexical::Local(Some(ty)));
                        }
                    }
                }
                Some(NodeKind::Switch { cases, .. }) => {
                    for &case in cases {
                        if case == child {
                            break;
                        }
                        if let Some(NodeKind::SwitchCase { statements, .. }) = tree.kind(case) {
                            for &stmt in statements {
                                if let Some(ty) = self.local_type_node(stmt, name) {
                                    return Some(Lexical::Local(Some(ty)));
                                }
                            }
                        }
                    }
                }
                Some(NodeKind::LocalVariable { ty, fragments, .. }) => {
                    for &fragment in fragments {
                        if fragment == child {
                            break;
                        }
                        if fragment_name(tree, fragment) == Some(name) {
                            return Some(Lexical::Local(Some(*ty)));
                        }
                    }
                }
                Some(
                    NodeKind::For { init: decls, .. }
                    | NodeKind::Try {
                        resources: decls, ..
                    },
                ) => {
                    for &decl in decls {
                        if decl == child {
                            break;
                        }
                        if let Some(ty) = self.local_type_node(decl, name) {
                            return Some(Lexical::Local(Some(ty)));
                        }
                    }
                }
                Some(
                    NodeKind::ForEach { var: param, .. } | NodeKind::Catch { param, .. },
                ) => {
                    if *param != child
                        && let Some(NodeKind::Parameter { name: n, ty, .. }) = tree.kind(*param)
                        && n == name
                    {
                        return Some(Lexical::Local(Some(*ty)));
                    }
                }
                Some(NodeKind::Lambda { params, .. }) => {
                    for &param in params {
                        match tree.kind(param) {
                            Some(NodeKind::Parameter { name: n, ty, .. }) if n == name => {
                                return Some(Lexical::Local(Some(*ty)));
                            }
                            Some(NodeKind::SimpleName { name: n }) if n == name => {
                                return Some(Lexical::Local(None));
                            }
                            _ => {}
                        }
                    }
                }
                Some(NodeKind::Method(decl)) => {
                    for &param in &decl.params.items {
                        if let Some(NodeKind::Parameter { name: n, ty, .. }) = tree.kind(param)
                            && n == name
                        {
                            return Some(Lexical::Local(Some(*ty)));
                        }
                    }
                }
                Some(NodeKind::TypeDecl(_)) => {
                    if let Some(ty) = self.symbols.by_decl(tree.unit, anc)
                        && let Some(field) = self.symbols.lookup_field(ty, name)
                    {
                        return Some(Lexical::Field {
                            symbol: field,
                            holder: ty,
                        });
                    }
                }
                _ => {}
            }
            child = anc;
        }
        None
    }

    fn lookup_type_name(&self, node: NodeIndex, name: &str) -> Option<TypeHit> {
        let tree = self.tree;
        let mut child = node;
        for anc in tree.ancestors(node) {
            match tree.kind(anc) {
                Some(
                    NodeKind::Block { statements }
                    | NodeKind::SwitchCase { statements, .. },
                ) => {
                    for &stmt in statements {
                        if let Some(NodeKind::TypeDecl(decl)) = tree.kind(stmt)
                            && decl.name == name
                            && let Some(symbol) = self.symbols.by_decl(tree.unit, stmt)
                        {
                            return Some(TypeHit::Type {
                                symbol,
                                holder: None,
                            });
                        }
                        if stmt == child {
                            break;
                        }
                    }
                }
                Some(NodeKind::Method(decl)) => {
                    if has_type_param(tree, decl.type_params.as_ref(), name) {
                        return Some(TypeHit::Parameter);
                    }
                }
                Some(NodeKind::TypeDecl(decl)) => {
                    if has_type_param(tree, decl.type_params.as_ref(), name) {
                        return Some(TypeHit::Parameter);
                    }
                    let Some(ty) = self.symbols.by_decl(tree.unit, anc) else {
                        child = anc;
                        continue;
                    };
                    if decl.kind != TypeKind::Anonymous && decl.name == name {
                        return Some(TypeHit::Type {
                            symbol: ty,
                            holder: None,
                        });
                    }
                    if let Some(member) = self.symbols.lookup_member_type(ty, name) {
                        return Some(TypeHit::Type {
                            symbol: member,
                            holder: Some(ty),
                        });
                    }
                }
                _ => {}
            }
            child = anc;
        }
        self.lookup_unit_type(name).map(|symbol| TypeHit::Type {
            symbol,
            holder: None,
        })
    }

    /// Top-level lookup: this unit, single-type imports, the package,
    /// on-demand imports, `java.lang`.
    fn lookup_unit_type(&self, name: &str) -> Option<SymbolId> {
        let tree = self.tree;
        for &top in tree.top_level_types() {
            if tree.type_decl(top).is_some_and(|d| d.name == name)
                && let Some(symbol) = self.symbols.by_decl(tree.unit, top)
            {
                return Some(symbol);
            }
        }
        for (simple, dotted) in &self.imports.single {
            if simple == name
                && let Some(symbol) = self.resolve_qualified_type(dotted)
            {
                return Some(symbol);
            }
        }
        if let Some(symbol) = self.symbols.find_top_level(&self.package, name) {
            return Some(symbol);
        }
        for prefix in &self.imports.on_demand {
            if let Some(symbol) = self.symbols.find_top_level(prefix, name) {
                return Some(symbol);
            }
            if let Some(owner) = self.resolve_qualified_type(prefix)
                && let Some(member) = self.symbols.lookup_member_type(owner, name)
            {
                return Some(member);
            }
        }
        self.symbols.find_top_level("java.lang", name)
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Resolve a type reference node, recording its binding.
    pub fn resolve_type_ref(&mut self, node: NodeIndex) -> Option<SymbolId> {
        if let Some(Some(cached)) = self.types.get(node.0 as usize) {
            return *cached;
        }
        let resolved = self.compute_type_ref(node);
        if let Some(slot) = self.types.get_mut(node.0 as usize) {
            *slot = Some(resolved);
        }
        resolved
    }

    fn compute_type_ref(&mut self, node: NodeIndex) -> Option<SymbolId> {
        let tree = self.tree;
        let Some(NodeKind::TypeRef {
            qualifier, name, ..
        }) = tree.kind(node)
        else {
            return None;
        };
        match qualifier {
            None => match self.lookup_type_name(node, name) {
                Some(TypeHit::Type { symbol, holder }) => {
                    let binding = match holder {
                        Some(holder) => Binding::Member { symbol, holder },
                        None => Binding::Symbol(symbol),
                    };
                    self.bind(node, binding);
                    Some(symbol)
                }
                Some(TypeHit::Parameter) => {
                    self.bind(node, Binding::TypeParameter);
                    None
                }
                None => {
                    if self.symbols.has_package_prefix(name) {
                        self.bind(node, Binding::Package(name.clone()));
                    }
                    None
                }
            },
            Some(q) => {
                let q = *q;
                let found = match self.resolve_type_ref(q) {
                    Some(outer) => self.symbols.lookup_member_type(outer, name),
                    None => match self.binding(q) {
                        Some(Binding::Package(package)) => {
                            let package = package.clone();
                            self.symbols.find_top_level(&package, name)
                        }
                        _ => None,
                    },
                };
                match found {
                    Some(symbol) => self.bind(node, Binding::Symbol(symbol)),
                    None => {
                        let dotted = tree.dotted_name(node);
                        if matches!(self.binding(q), Some(Binding::Package(_)))
                            && self.symbols.has_package_prefix(&dotted)
                        {
                            self.bind(node, Binding::Package(dotted));
                        }
                    }
                }
                found
            }
        }
    }

    /// Class type of a declared variable type, `None` for primitives,
    /// arrays and type parameters.
    fn value_type_of(&mut self, ty: NodeIndex) -> Option<SymbolId> {
        match self.tree.kind(ty) {
            Some(NodeKind::TypeRef { dims: 0, .. }) => self.resolve_type_ref(ty),
            _ => None,
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Meaning of an expression node, binding it and the nodes it depends on.
    pub fn meaning(&mut self, node: NodeIndex) -> Meaning {
        if let Some(Some(cached)) = self.meanings.get(node.0 as usize) {
            return cached.clone();
        }
        let meaning = self.compute_meaning(node);
        if let Some(slot) = self.meanings.get_mut(node.0 as usize) {
            *slot = Some(meaning.clone());
        }
        meaning
    }

    fn compute_meaning(&mut self, node: NodeIndex) -> Meaning {
        let tree = self.tree;
        let Some(kind) = tree.kind(node) else {
            return Meaning::Unknown;
        };
        match kind {
            NodeKind::SimpleName { name } => self.resolve_simple_name(node, name),
            NodeKind::FieldAccess { receiver, name, .. } => {
                let receiver = self.meaning(*receiver);
                self.resolve_member_access(node, receiver, name)
            }
            NodeKind::MethodCall {
                receiver,
                name,
                args,
                ..
            } => self.resolve_method_call(node, *receiver, name, &args.items),
            NodeKind::This { qualifier } => match qualifier {
                Some(q) => Meaning::Value(self.resolve_type_ref(*q)),
                None => Meaning::Value(self.enclosing_type(node)),
            },
            NodeKind::Super { qualifier } => {
                let base = match qualifier {
                    Some(q) => self.resolve_type_ref(*q),
                    None => self.enclosing_type(node),
                };
                let superclass = base.and_then(|ty| {
                    if self.symbols[ty].type_kind() == Some(TypeKind::Interface) {
                        Some(ty)
                    } else {
                        self.symbols[ty].superclass
                    }
                });
                Meaning::Value(superclass)
            }
            NodeKind::New {
                outer, ty, args, ..
            } => self.resolve_creation(node, *outer, *ty, &args.items),
            NodeKind::MethodRef { receiver, name, .. } => {
                let owner = match self.meaning(*receiver) {
                    Meaning::Value(Some(ty)) | Meaning::Type(ty) => Some(ty),
                    _ => match tree.kind(*receiver) {
                        Some(NodeKind::TypeRef { .. }) => self.resolve_type_ref(*receiver),
                        _ => None,
                    },
                };
                if let Some(owner) = owner {
                    let candidates = if name == "new" {
                        self.symbols.constructors(owner).collect()
                    } else {
                        self.symbols.lookup_methods(owner, name)
                    };
                    self.bind_candidates(node, candidates, None);
                }
                Meaning::Value(None)
            }
            NodeKind::Paren { expr } => self.meaning(*expr),
            NodeKind::Cast { ty, .. } => Meaning::Value(self.value_type_of(*ty)),
            NodeKind::Assign { target, .. } => self.meaning(*target),
            NodeKind::Conditional { then_expr, .. } => self.meaning(*then_expr),
            NodeKind::Literal { text } if text.starts_with('"') => {
                Meaning::Value(self.symbols.find_top_level("java.lang", "String"))
            }
            NodeKind::TypeRef { .. } => match self.resolve_type_ref(node) {
                Some(ty) => Meaning::Type(ty),
                None => Meaning::Unknown,
            },
            _ => Meaning::Value(None),
        }
    }

    fn resolve_simple_name(&mut self, node: NodeIndex, name: &str) -> Meaning {
        let tree = self.tree;
        if let Some(parent) = tree.parent(node) {
            match tree.kind(parent) {
                Some(NodeKind::Lambda { params, .. }) if params.contains(&node) => {
                    self.bind(node, Binding::Variable);
                    return Meaning::Value(None);
                }
                Some(NodeKind::SwitchCase { labels, .. }) if labels.contains(&node) => {
                    if let Some(constant) = self.switch_enum_constant(parent, name) {
                        self.bind(node, Binding::Symbol(constant));
                        return Meaning::Value(self.symbols[constant].value_type);
                    }
                }
                _ => {}
            }
        }

        match self.lookup_variable(node, name) {
            Some(Lexical::Local(ty)) => {
                self.bind(node, Binding::Variable);
                let value = ty.and_then(|ty| self.value_type_of(ty));
                return Meaning::Value(value);
            }
            Some(Lexical::Field { symbol, holder }) => {
                self.bind(node, Binding::Member { symbol, holder });
                return Meaning::Value(self.symbols[symbol].value_type);
            }
            None => {}
        }

        if let Some(field) = self.static_import_field(name) {
            self.bind(node, Binding::Symbol(field));
            return Meaning::Value(self.symbols[field].value_type);
        }

        match self.lookup_type_name(node, name) {
            Some(TypeHit::Type { symbol, holder }) => {
                let binding = match holder {
                    Some(holder) => Binding::Member { symbol, holder },
                    None => Binding::Symbol(symbol),
                };
                self.bind(node, binding);
                return Meaning::Type(symbol);
            }
            Some(TypeHit::Parameter) => {
                self.bind(node, Binding::TypeParameter);
                return Meaning::Unknown;
            }
            None => {}
        }

        if self.symbols.has_package_prefix(name) {
            self.bind(node, Binding::Package(name.to_string()));
            return Meaning::Package(name.to_string());
        }
        Meaning::Unknown
    }

    /// Enum constant named by a `case` label of a switch over an enum.
    fn switch_enum_constant(&mut self, case: NodeIndex, name: &str) -> Option<SymbolId> {
        let tree = self.tree;
        let switch = tree.parent(case)?;
        let Some(NodeKind::Switch { selector, .. }) = tree.kind(switch) else {
            return None;
        };
        let Meaning::Value(Some(ty)) = self.meaning(*selector) else {
            return None;
        };
        self.symbols.lookup_field(ty, name)
    }

    fn static_import_field(&self, name: &str) -> Option<SymbolId> {
        let single = self
            .imports
            .static_single
            .iter()
            .filter(|(member, _)| member == name)
            .map(|(_, owner)| owner);
        single
            .chain(self.imports.static_on_demand.iter())
            .filter_map(|owner| self.resolve_qualified_type(owner))
            .find_map(|owner| self.symbols.lookup_field(owner, name))
    }

    fn static_import_methods(&self, name: &str) -> Vec<SymbolId> {
        let single = self
            .imports
            .static_single
            .iter()
            .filter(|(member, _)| member == name)
            .map(|(_, owner)| owner);
        single
            .chain(self.imports.static_on_demand.iter())
            .filter_map(|owner| self.resolve_qualified_type(owner))
            .map(|owner| self.symbols.lookup_methods(owner, name))
            .find(|methods| !methods.is_empty())
            .unwrap_or_default()
    }

    fn resolve_member_access(&mut self, node: NodeIndex, receiver: Meaning, name: &str) -> Meaning {
        match receiver {
            Meaning::Value(Some(ty)) => match self.symbols.lookup_field(ty, name) {
                Some(field) => {
                    self.bind(node, Binding::Symbol(field));
                    Meaning::Value(self.symbols[field].value_type)
                }
                None => Meaning::Unknown,
            },
            Meaning::Type(ty) => {
                if let Some(field) = self.symbols.lookup_field(ty, name) {
                    self.bind(node, Binding::Symbol(field));
                    Meaning::Value(self.symbols[field].value_type)
                } else if let Some(member) = self.symbols.lookup_member_type(ty, name) {
                    self.bind(node, Binding::Symbol(member));
                    Meaning::Type(member)
                } else {
                    Meaning::Unknown
                }
            }
            Meaning::Package(package) => {
                if let Some(ty) = self.symbols.find_top_level(&package, name) {
                    self.bind(node, Binding::Symbol(ty));
                    return Meaning::Type(ty);
                }
                let qualified = format!("{package}.{name}");
                if self.symbols.has_package_prefix(&qualified) {
                    self.bind(node, Binding::Package(qualified.clone()));
                    return Meaning::Package(qualified);
                }
                Meaning::Unknown
            }
            Meaning::Value(None) | Meaning::Unknown => Meaning::Unknown,
        }
    }

    fn resolve_method_call(
        &mut self,
        node: NodeIndex,
        receiver: Option<NodeIndex>,
        name: &str,
        args: &[NodeIndex],
    ) -> Meaning {
        let (candidates, holder) = match receiver {
            None => {
                let tree = self.tree;
                let mut found = (Vec::new(), None);
                for anc in tree.ancestors(node) {
                    if let Some(NodeKind::TypeDecl(_)) = tree.kind(anc)
                        && let Some(ty) = self.symbols.by_decl(tree.unit, anc)
                    {
                        let methods = self.symbols.lookup_methods(ty, name);
                        if !methods.is_empty() {
                            found = (methods, Some(ty));
                            break;
                        }
                    }
                }
                if found.0.is_empty() {
                    found = (self.static_import_methods(name), None);
                }
                found
            }
            Some(receiver) => match self.meaning(receiver) {
                Meaning::Value(Some(ty)) | Meaning::Type(ty) => {
                    (self.symbols.lookup_methods(ty, name), None)
                }
                _ => (Vec::new(), None),
            },
        };
        let chosen = self.select_overloads(candidates, args);
        let value = match chosen.as_slice() {
            [single] => self.symbols[*single].value_type,
            _ => None,
        };
        self.bind_candidates(node, chosen, holder);
        Meaning::Value(value)
    }

    fn bind_candidates(&mut self, node: NodeIndex, candidates: Vec<SymbolId>, holder: Option<SymbolId>) {
        match (candidates.as_slice(), holder) {
            ([], _) => {}
            ([single], Some(holder)) => self.bind(
                node,
                Binding::Member {
                    symbol: *single,
                    holder,
                },
            ),
            ([single], None) => self.bind(node, Binding::Symbol(*single)),
            _ => self.bind(node, Binding::Ambiguous(candidates)),
        }
    }

    fn resolve_creation(
        &mut self,
        node: NodeIndex,
        outer: Option<NodeIndex>,
        ty: NodeIndex,
        args: &[NodeIndex],
    ) -> Meaning {
        let created = match outer {
            Some(outer) => {
                let owner = match self.meaning(outer) {
                    Meaning::Value(Some(owner)) => Some(owner),
                    _ => None,
                };
                let tree = self.tree;
                let member = match (owner, tree.kind(ty)) {
                    (Some(owner), Some(NodeKind::TypeRef { name, .. })) => {
                        self.symbols.lookup_member_type(owner, name)
                    }
                    _ => None,
                };
                if let Some(slot) = self.types.get_mut(ty.0 as usize) {
                    *slot = Some(member);
                }
                if let Some(member) = member {
                    self.bind(ty, Binding::Symbol(member));
                }
                member
            }
            None => self.resolve_type_ref(ty),
        };
        let Some(created) = created else {
            return Meaning::Value(None);
        };
        self.bind_constructor(node, created, args);
        Meaning::Value(Some(created))
    }

    /// Bind an instance creation or constructor call to the matching
    /// constructors of `ty`, or to `ty` itself when it declares none.
    fn bind_constructor(&mut self, node: NodeIndex, ty: SymbolId, args: &[NodeIndex]) {
        let ctors: Vec<SymbolId> = self.symbols.constructors(ty).collect();
        if ctors.is_empty() {
            self.bind(node, Binding::Symbol(ty));
            return;
        }
        let chosen = self.select_overloads(ctors, args);
        self.bind_candidates(node, chosen, None);
    }

    fn resolve_constructor_call(&mut self, node: NodeIndex) {
        let tree = self.tree;
        let Some(NodeKind::ConstructorCall { kind, args, .. }) = tree.kind(node) else {
            return;
        };
        let Some(current) = self.enclosing_type(node) else {
            return;
        };
        let target = match kind {
            CallKind::This => Some(current),
            CallKind::Super => self.symbols[current].superclass,
        };
        if let Some(target) = target {
            self.bind_constructor(node, target, &args.items);
        }
    }

    // =========================================================================
    // Overloads
    // =========================================================================

    /// Narrow `candidates` to the overloads a call with `args` can reach.
    ///
    /// Arity goes first, then argument types where this unit knows them.
    /// Exact matches win over widening or boxing. A call whose arguments
    /// do not decide keeps every applicable candidate.
    fn select_overloads(&mut self, candidates: Vec<SymbolId>, args: &[NodeIndex]) -> Vec<SymbolId> {
        let by_arity: Vec<SymbolId> = candidates
            .iter()
            .copied()
            .filter(|m| self.symbols[*m].accepts_arity(args.len()))
            .collect();
        if by_arity.len() < 2 {
            return if by_arity.is_empty() { candidates } else { by_arity };
        }
        let arg_types: Vec<ArgType> = args.iter().map(|&arg| self.arg_type(arg)).collect();
        let fits: Vec<(SymbolId, Fit)> = by_arity
            .iter()
            .map(|&m| (m, self.call_fit(m, &arg_types)))
            .collect();
        let applicable: Vec<(SymbolId, Fit)> =
            fits.into_iter().filter(|(_, fit)| *fit != Fit::No).collect();
        if applicable.is_empty() {
            return by_arity;
        }
        let exact: Vec<SymbolId> = applicable
            .iter()
            .filter(|(_, fit)| *fit == Fit::Exact)
            .map(|(m, _)| *m)
            .collect();
        if exact.is_empty() {
            applicable.into_iter().map(|(m, _)| m).collect()
        } else {
            exact
        }
    }

    fn arg_type(&mut self, arg: NodeIndex) -> ArgType {
        let tree = self.tree;
        match tree.kind(arg) {
            Some(NodeKind::Literal { text }) if text.starts_with('"') => self
                .symbols
                .find_top_level("java.lang", "String")
                .map_or(ArgType::Unknown, ArgType::Class),
            Some(NodeKind::Literal { text }) => literal_type(text),
            Some(NodeKind::Paren { expr }) => self.arg_type(*expr),
            Some(NodeKind::Unary {
                op,
                operand,
                prefix: true,
            }) if matches!(op.as_str(), "-" | "+")
                && matches!(tree.kind(*operand), Some(NodeKind::Literal { .. })) =>
            {
                self.arg_type(*operand)
            }
            Some(NodeKind::Cast { ty, .. }) => self.declared_type(*ty),
            Some(NodeKind::SimpleName { name }) => match self.lookup_variable(arg, name) {
                Some(Lexical::Local(Some(ty))) => self.declared_type(ty),
                _ => self.value_type_arg(arg),
            },
            _ => self.value_type_arg(arg),
        }
    }

    /// Type of a field read, method result or other value expression.
    fn value_type_arg(&mut self, arg: NodeIndex) -> ArgType {
        let meaning = self.meaning(arg);
        if let Some(symbol) = self.binding(arg).and_then(Binding::symbol)
            && matches!(self.symbols[symbol].kind, SymbolKind::Field | SymbolKind::Method)
            && let Some(kind) = self.symbols[symbol].type_text.as_deref().and_then(primitive)
        {
            return ArgType::Primitive(kind);
        }
        match meaning {
            Meaning::Value(Some(ty)) => ArgType::Class(ty),
            _ => ArgType::Unknown,
        }
    }

    fn declared_type(&mut self, ty: NodeIndex) -> ArgType {
        match self.tree.kind(ty) {
            Some(NodeKind::PrimitiveType { name, dims: 0 }) => {
                primitive(name).map_or(ArgType::Unknown, ArgType::Primitive)
            }
            Some(NodeKind::TypeRef { dims: 0, .. }) => self
                .resolve_type_ref(ty)
                .map_or(ArgType::Unknown, ArgType::Class),
            _ => ArgType::Unknown,
        }
    }

    /// Weakest fit over every argument of a call to `method`.
    fn call_fit(&self, method: SymbolId, args: &[ArgType]) -> Fit {
        let symbol = &self.symbols[method];
        if symbol.varargs {
            return Fit::Loose;
        }
        symbol
            .params
            .iter()
            .zip(args)
            .map(|(param, arg)| self.param_fit(method, param, *arg))
            .min()
            .unwrap_or(Fit::Exact)
    }

    fn param_fit(&self, method: SymbolId, param: &str, arg: ArgType) -> Fit {
        let param = param.split('<').next().unwrap_or(param).trim();
        if param.contains('[') {
            return match arg {
                ArgType::Primitive(_) => Fit::No,
                ArgType::Null | ArgType::Class(_) | ArgType::Unknown => Fit::Loose,
            };
        }
        let simple = param.rsplit('.').next().unwrap_or(param);
        match (primitive(param), arg) {
            (_, ArgType::Unknown) => Fit::Loose,
            (Some(expected), ArgType::Primitive(actual)) => {
                if expected == actual {
                    Fit::Exact
                } else if widens(actual, expected) {
                    Fit::Loose
                } else {
                    Fit::No
                }
            }
            (Some(_), ArgType::Null) => Fit::No,
            (Some(expected), ArgType::Class(class)) => {
                let symbol = &self.symbols[class];
                if symbol.package == "java.lang" && symbol.name == boxed(expected) {
                    Fit::Loose
                } else {
                    Fit::No
                }
            }
            (None, _) if self.is_type_param(method, simple) => Fit::Loose,
            (None, ArgType::Null) => Fit::Loose,
            (None, ArgType::Primitive(actual)) => {
                let boxes = [boxed(actual), "Object", "Comparable", "Serializable"];
                let numeric = !matches!(actual, "boolean" | "char") && simple == "Number";
                if numeric || boxes.contains(&simple) {
                    Fit::Loose
                } else {
                    Fit::No
                }
            }
            (None, ArgType::Class(class)) => self.class_fit(class, simple),
        }
    }

    /// Fit of a value of class type `class` for a parameter whose type
    /// has the simple name `simple`.
    fn class_fit(&self, class: SymbolId, simple: &str) -> Fit {
        if self.symbols[class].name == simple {
            return Fit::Exact;
        }
        if simple == "Object" {
            return Fit::Loose;
        }
        let mut seen = FxHashSet::default();
        let mut pending = vec![class];
        let mut complete = true;
        while let Some(ty) = pending.pop() {
            if !seen.insert(ty) {
                continue;
            }
            let symbol = &self.symbols[ty];
            if ty != class && symbol.name == simple {
                return Fit::Loose;
            }
            complete &= !symbol.is_binary();
            pending.extend(symbol.superclass);
            pending.extend(symbol.interfaces.iter().copied());
        }
        // Library hierarchies are partial.
        if complete { Fit::No } else { Fit::Loose }
    }

    fn is_type_param(&self, method: SymbolId, name: &str) -> bool {
        let mut current = Some(method);
        while let Some(id) = current {
            let symbol = &self.symbols[id];
            if symbol.type_params.iter().any(|p| p == name) {
                return true;
            }
            current = symbol.owner;
        }
        false
    }
}

fn primitive(name: &str) -> Option<&'static str> {
    ["boolean", "byte", "short", "char", "int", "long", "float", "double"]
        .into_iter()
        .find(|p| *p == name)
}

fn boxed(primitive: &str) -> &'static str {
    match primitive {
        "boolean" => "Boolean",
        "byte" => "Byte",
        "short" => "Short",
        "char" => "Character",
        "int" => "Integer",
        "long" => "Long",
        "float" => "Float",
        _ => "Double",
    }
}

/// Whether a widening primitive conversion takes `from` to `to`.
fn widens(from: &str, to: &str) -> bool {
    let targets: &[&str] = match from {
        "byte" => &["short", "int", "long", "float", "double"],
        "short" | "char" => &["int", "long", "float", "double"],
        "int" => &["long", "float", "double"],
        "long" => &["float", "double"],
        "float" => &["double"],
        _ => &[],
    };
    targets.contains(&to)
}

/// Type of a non-string literal.
fn literal_type(text: &str) -> ArgType {
    match text {
        "null" => return ArgType::Null,
        "true" | "false" => return ArgType::Primitive("boolean"),
        _ => {}
    }
    if text.starts_with('\'') {
        return ArgType::Primitive("char");
    }
    if !text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return ArgType::Unknown;
    }
    let lower = text.to_ascii_lowercase();
    let hex = lower.starts_with("0x");
    let kind = if lower.ends_with('l') {
        "long"
    } else if hex {
        "int"
    } else if lower.ends_with('f') {
        "float"
    } else if lower.ends_with('d') || lower.contains(['.', 'e']) {
        "double"
    } else {
        "int"
    };
    ArgType::Primitive(kind)
}

fn fragment_name(tree: &Tree, fragment: NodeIndex) -> Option<&str> {
    match tree.kind(fragment) {
        Some(NodeKind::Fragment { name, .. }) => Some(name),
        _ => None,
    }
}

fn has_type_param(tree: &Tree, params: Option<&hoist_model::Delimited>, name: &str) -> bool {
    params.is_some_and(|params| {
        params.items.iter().any(|p| {
            matches!(tree.kind(*p), Some(NodeKind::TypeParam { name: n, .. }) if n == name)
        })
    })
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod resolver_tests;
