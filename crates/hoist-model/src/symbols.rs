//! Symbol model: declarations of types, fields, methods and constructors.
//!
//! Symbols are stored in an arena and addressed by [`SymbolId`]. Owner,
//! supertype and member relations are ids into the same arena, so cyclic
//! hierarchies need no shared ownership. A table is a snapshot: it is
//! rebuilt whenever the program is re-parsed.

use crate::tree::NodeIndex;
use crate::visibility::{ModifierFlags, Visibility};
use hoist_common::UnitId;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Index of a symbol in its [`SymbolTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Anonymous,
}

impl TypeKind {
    /// Members of these types are implicitly public.
    #[must_use]
    pub const fn has_public_members(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class | TypeKind::Anonymous => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Type(TypeKind),
    Field,
    Method,
    Constructor,
}

impl SymbolKind {
    #[must_use]
    pub const fn is_type(self) -> bool {
        matches!(self, SymbolKind::Type(_))
    }
}

/// Where a symbol is declared in source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DeclRef {
    pub unit: UnitId,
    pub node: NodeIndex,
    /// The fragment node for fields declared as `int a, b;`.
    pub fragment: Option<NodeIndex>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub flags: ModifierFlags,
    /// Declaring type; `None` for top-level types.
    pub owner: Option<SymbolId>,
    pub package: String,
    /// `None` for symbols without source (library types).
    pub decl: Option<DeclRef>,
    /// Local and anonymous types.
    pub is_local: bool,
    pub type_params: Vec<String>,
    /// Parameter type texts, for display and arity.
    pub params: Vec<String>,
    pub varargs: bool,
    pub superclass: Option<SymbolId>,
    pub interfaces: Vec<SymbolId>,
    /// Class type of a field, or the return type of a method.
    pub value_type: Option<SymbolId>,
    /// Declared type text of a field or method result, `int[]` style.
    pub type_text: Option<String>,
}

impl Symbol {
    /// A new symbol with everything but identity left empty.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SymbolKind, package: impl Into<String>) -> Self {
        Self {
            id: SymbolId(u32::MAX),
            name: name.into(),
            kind,
            flags: ModifierFlags::empty(),
            owner: None,
            package: package.into(),
            decl: None,
            is_local: false,
            type_params: Vec::new(),
            params: Vec::new(),
            varargs: false,
            superclass: None,
            interfaces: Vec::new(),
            value_type: None,
            type_text: None,
        }
    }

    #[must_use]
    pub const fn type_kind(&self) -> Option<TypeKind> {
        match self.kind {
            SymbolKind::Type(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_type(&self) -> bool {
        self.kind.is_type()
    }

    #[must_use]
    pub const fn is_binary(&self) -> bool {
        self.decl.is_none()
    }

    /// Whether a call with `arity` arguments can target this method.
    #[must_use]
    pub fn accepts_arity(&self, arity: usize) -> bool {
        if self.varargs {
            arity + 1 >= self.params.len()
        } else {
            arity == self.params.len()
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    members: Vec<Vec<SymbolId>>,
    #[serde(skip)]
    top_level: IndexMap<(String, String), SymbolId>,
    #[serde(skip)]
    by_decl: FxHashMap<(UnitId, NodeIndex), SymbolId>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol and register it with its owner.
    ///
    /// Local types are not registered as members of the type that
    /// lexically encloses them.
    pub fn add(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        symbol.id = id;
        match symbol.owner {
            Some(owner) if !symbol.is_local => {
                if let Some(list) = self.members.get_mut(owner.0 as usize) {
                    list.push(id);
                }
            }
            None if symbol.is_type() => {
                self.top_level
                    .entry((symbol.package.clone(), symbol.name.clone()))
                    .or_insert(id);
            }
            _ => {}
        }
        if let Some(decl) = symbol.decl {
            self.by_decl
                .insert((decl.unit, decl.fragment.unwrap_or(decl.node)), id);
        }
        self.symbols.push(symbol);
        self.members.push(Vec::new());
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Symbol declared by the node (or fragment node) at `(unit, node)`.
    #[must_use]
    pub fn by_decl(&self, unit: UnitId, node: NodeIndex) -> Option<SymbolId> {
        self.by_decl.get(&(unit, node)).copied()
    }

    /// Declared members, in declaration order.
    #[must_use]
    pub fn members(&self, id: SymbolId) -> &[SymbolId] {
        self.members
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn members_of_kind(
        &self,
        id: SymbolId,
        kind: SymbolKind,
    ) -> impl Iterator<Item = SymbolId> + '_ {
        self.members(id)
            .iter()
            .copied()
            .filter(move |m| self[*m].kind == kind)
    }

    pub fn fields(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.members_of_kind(id, SymbolKind::Field)
    }

    pub fn methods(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.members_of_kind(id, SymbolKind::Method)
    }

    pub fn constructors(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.members_of_kind(id, SymbolKind::Constructor)
    }

    pub fn member_types(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.members(id)
            .iter()
            .copied()
            .filter(move |m| self[*m].is_type())
    }

    #[must_use]
    pub fn declaring_type(&self, id: SymbolId) -> Option<SymbolId> {
        self.get(id).and_then(|s| s.owner)
    }

    /// Owners of `id`, nearest first.
    #[must_use]
    pub fn enclosing_chain(&self, id: SymbolId) -> Vec<SymbolId> {
        std::iter::successors(self.declaring_type(id), |&t| self.declaring_type(t)).collect()
    }

    /// The outermost type containing `id` (or `id` itself).
    #[must_use]
    pub fn top_level_of(&self, id: SymbolId) -> SymbolId {
        self.enclosing_chain(id).last().copied().unwrap_or(id)
    }

    /// True if `ancestor` is a strict owner of `id`.
    #[must_use]
    pub fn is_nested_in(&self, id: SymbolId, ancestor: SymbolId) -> bool {
        self.enclosing_chain(id).contains(&ancestor)
    }

    /// `id` itself or nested at any depth inside `ancestor`.
    #[must_use]
    pub fn is_within(&self, id: SymbolId, ancestor: SymbolId) -> bool {
        id == ancestor || self.is_nested_in(id, ancestor)
    }

    /// Type names from the top-level type down, e.g. `Outer.Inner`.
    #[must_use]
    pub fn type_path(&self, id: SymbolId) -> String {
        let mut names: Vec<&str> = self
            .enclosing_chain(id)
            .iter()
            .filter(|t| self[**t].is_type())
            .map(|t| self[*t].name.as_str())
            .collect();
        names.reverse();
        names.push(self[id].name.as_str());
        names.join(".")
    }

    /// Package-qualified name, e.g. `p.Outer.Inner`.
    #[must_use]
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let symbol = &self[id];
        let path = if symbol.is_type() {
            self.type_path(id)
        } else {
            match symbol.owner {
                Some(owner) => format!("{}#{}", self.type_path(owner), symbol.name),
                None => symbol.name.clone(),
            }
        };
        if symbol.package.is_empty() {
            path
        } else {
            format!("{}.{}", symbol.package, path)
        }
    }

    #[must_use]
    pub fn find_top_level(&self, package: &str, name: &str) -> Option<SymbolId> {
        self.top_level
            .get(&(package.to_string(), name.to_string()))
            .copied()
    }

    pub fn top_level_in(&self, package: &str) -> impl Iterator<Item = SymbolId> + '_ {
        let package = package.to_string();
        self.top_level
            .iter()
            .filter(move |((pkg, _), _)| *pkg == package)
            .map(|(_, id)| *id)
    }

    /// Whether any top-level type lives in `package` or a sub-package.
    #[must_use]
    pub fn has_package_prefix(&self, prefix: &str) -> bool {
        self.top_level.keys().any(|(pkg, _)| {
            pkg == prefix
                || (pkg.starts_with(prefix) && pkg.as_bytes().get(prefix.len()) == Some(&b'.'))
        })
    }

    /// Declared or implied `static`.
    #[must_use]
    pub fn is_static(&self, id: SymbolId) -> bool {
        let symbol = &self[id];
        if symbol.flags.contains(ModifierFlags::STATIC) {
            return true;
        }
        let owner_kind = symbol.owner.and_then(|o| self[o].type_kind());
        match symbol.kind {
            SymbolKind::Type(kind) => {
                symbol.owner.is_some()
                    && !symbol.is_local
                    && (matches!(
                        kind,
                        TypeKind::Interface | TypeKind::Enum | TypeKind::Annotation
                    ) || owner_kind.is_some_and(TypeKind::has_public_members))
            }
            SymbolKind::Field => owner_kind.is_some_and(TypeKind::has_public_members),
            SymbolKind::Method | SymbolKind::Constructor => false,
        }
    }

    /// Effective visibility, accounting for implicitly public interface
    /// and annotation members.
    #[must_use]
    pub fn visibility(&self, id: SymbolId) -> Visibility {
        let symbol = &self[id];
        let in_interface = symbol
            .owner
            .and_then(|o| self[o].type_kind())
            .is_some_and(TypeKind::has_public_members);
        if in_interface {
            Visibility::Public
        } else {
            Visibility::from_flags(symbol.flags)
        }
    }

    /// True if the member is declared directly in an interface or
    /// annotation type.
    #[must_use]
    pub fn is_interface_member(&self, id: SymbolId) -> bool {
        self[id]
            .owner
            .and_then(|o| self[o].type_kind())
            .is_some_and(TypeKind::has_public_members)
    }

    /// Direct supertypes: superclass first, then interfaces.
    #[must_use]
    pub fn direct_supertypes(&self, id: SymbolId) -> Vec<SymbolId> {
        let symbol = &self[id];
        symbol
            .superclass
            .iter()
            .chain(symbol.interfaces.iter())
            .copied()
            .collect()
    }

    /// All supertypes, breadth-first, without duplicates.
    #[must_use]
    pub fn all_supertypes(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut out: Vec<SymbolId> = Vec::new();
        let mut queue = self.direct_supertypes(id);
        while !queue.is_empty() {
            let current = queue.remove(0);
            if current == id || out.contains(&current) {
                continue;
            }
            out.push(current);
            queue.extend(self.direct_supertypes(current));
        }
        out
    }

    /// `id` itself followed by all its supertypes.
    #[must_use]
    pub fn self_and_supertypes(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut out = vec![id];
        out.extend(self.all_supertypes(id));
        out
    }

    /// Field named `name` declared in `ty` or inherited by it.
    #[must_use]
    pub fn lookup_field(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.self_and_supertypes(ty)
            .into_iter()
            .find_map(|t| self.fields(t).find(|f| self[*f].name == name))
    }

    /// Methods named `name` from the nearest type in the hierarchy of `ty`
    /// that declares any.
    #[must_use]
    pub fn lookup_methods(&self, ty: SymbolId, name: &str) -> Vec<SymbolId> {
        for t in self.self_and_supertypes(ty) {
            let found: Vec<SymbolId> = self.methods(t).filter(|m| self[*m].name == name).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Member type named `name` declared in `ty` or inherited by it.
    #[must_use]
    pub fn lookup_member_type(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.self_and_supertypes(ty)
            .into_iter()
            .find_map(|t| self.member_types(t).find(|m| self[*m].name == name))
    }

    /// Whether `sub` is `sup` or a subtype of it.
    #[must_use]
    pub fn is_subtype(&self, sub: SymbolId, sup: SymbolId) -> bool {
        sub == sup || self.all_supertypes(sub).contains(&sup)
    }
}

impl std::ops::Index<SymbolId> for SymbolTable {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }
}

#[cfg(test)]
#[path = "../tests/symbols_tests.rs"]
mod symbols_tests;
