use super::*;
use hoist_common::UnitId;

fn class(table: &mut SymbolTable, name: &str, owner: Option<SymbolId>) -> SymbolId {
    let mut symbol = Symbol::new(name, SymbolKind::Type(TypeKind::Class), "p");
    symbol.owner = owner;
    table.add(symbol)
}

fn member(table: &mut SymbolTable, name: &str, kind: SymbolKind, owner: SymbolId) -> SymbolId {
    let mut symbol = Symbol::new(name, kind, "p");
    symbol.owner = Some(owner);
    table.add(symbol)
}

#[test]
fn test_containment_chain_and_paths() {
    let mut table = SymbolTable::new();
    let outer = class(&mut table, "Outer", None);
    let mid = class(&mut table, "Mid", Some(outer));
    let inner = class(&mut table, "Inner", Some(mid));
    let field = member(&mut table, "x", SymbolKind::Field, inner);

    assert_eq!(table.enclosing_chain(inner), vec![mid, outer]);
    assert_eq!(table.top_level_of(field), outer);
    assert!(table.is_nested_in(field, mid));
    assert!(!table.is_nested_in(outer, inner));
    assert_eq!(table.type_path(inner), "Outer.Mid.Inner");
    assert_eq!(table.qualified_name(inner), "p.Outer.Mid.Inner");
    assert_eq!(table.qualified_name(field), "p.Outer.Mid.Inner#x");
    assert_eq!(table.find_top_level("p", "Outer"), Some(outer));
    assert_eq!(table.find_top_level("p", "Inner"), None);
    assert!(table.has_package_prefix("p"));
    assert!(!table.has_package_prefix("q"));
}

#[test]
fn test_local_types_are_not_members() {
    let mut table = SymbolTable::new();
    let outer = class(&mut table, "Outer", None);
    let mut local = Symbol::new("Local", SymbolKind::Type(TypeKind::Class), "p");
    local.owner = Some(outer);
    local.is_local = true;
    let local = table.add(local);

    assert!(table.members(outer).is_empty());
    assert_eq!(table.declaring_type(local), Some(outer));
}

#[test]
fn test_interface_members_are_implicitly_public_and_static() {
    let mut table = SymbolTable::new();
    let iface = table.add(Symbol::new(
        "Shape",
        SymbolKind::Type(TypeKind::Interface),
        "p",
    ));
    let constant = member(&mut table, "SIDES", SymbolKind::Field, iface);
    let nested = class(&mut table, "Impl", Some(iface));

    assert_eq!(table.visibility(constant), Visibility::Public);
    assert!(table.is_interface_member(constant));
    assert!(table.is_static(constant));
    assert!(table.is_static(nested), "member classes of interfaces are static");
}

#[test]
fn test_inherited_member_lookup() {
    let mut table = SymbolTable::new();
    let base = class(&mut table, "Base", None);
    let field = member(&mut table, "count", SymbolKind::Field, base);
    let mut getter = Symbol::new("getCount", SymbolKind::Method, "p");
    getter.owner = Some(base);
    let getter = table.add(getter);
    let derived = class(&mut table, "Derived", None);
    if let Some(symbol) = table.get_mut(derived) {
        symbol.superclass = Some(base);
    }

    assert_eq!(table.lookup_field(derived, "count"), Some(field));
    assert_eq!(table.lookup_methods(derived, "getCount"), vec![getter]);
    assert!(table.is_subtype(derived, base));
    assert!(!table.is_subtype(base, derived));
    assert_eq!(table.all_supertypes(derived), vec![base]);
}

#[test]
fn test_supertype_cycles_terminate() {
    let mut table = SymbolTable::new();
    let a = class(&mut table, "A", None);
    let b = class(&mut table, "B", None);
    table.get_mut(a).unwrap().superclass = Some(b);
    table.get_mut(b).unwrap().superclass = Some(a);

    assert_eq!(table.all_supertypes(a), vec![b]);
    assert_eq!(table.lookup_field(a, "missing"), None);
}

#[test]
fn test_varargs_arity() {
    let mut method = Symbol::new("log", SymbolKind::Method, "p");
    method.params = vec!["String".to_string(), "Object...".to_string()];
    method.varargs = true;
    assert!(method.accepts_arity(1));
    assert!(method.accepts_arity(4));
    assert!(!method.accepts_arity(0));
}

#[test]
fn test_lookup_by_declaration() {
    let mut table = SymbolTable::new();
    let mut symbol = Symbol::new("Outer", SymbolKind::Type(TypeKind::Class), "p");
    symbol.decl = Some(DeclRef {
        unit: UnitId(0),
        node: NodeIndex(7),
        fragment: None,
    });
    let id = table.add(symbol);
    assert_eq!(table.by_decl(UnitId(0), NodeIndex(7)), Some(id));
    assert_eq!(table.by_decl(UnitId(1), NodeIndex(7)), None);
}
