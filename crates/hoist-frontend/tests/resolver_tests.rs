use super::*;
use crate::InMemoryWorkspace;
use hoist_common::UnitId;
use hoist_model::Program;

const OUTER: &str = "package p;

import java.util.List;

public class Outer {
    int count;
    static int total;

    int size() { return count; }

    class Inner {
        int count;
        int read(int k) {
            int local = k;
            return count + Outer.this.count + total + size() + local;
        }
    }

    static class Nested {
        List<String> names;
    }
}
";

fn workspace(sources: &[(&str, &str)]) -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources(sources.iter().copied())
        .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

/// Binding of the `nth` name-bearing node of `unit` named `name`.
fn binding_of<'a>(ws: &'a InMemoryWorkspace, unit: UnitId, name: &str, nth: usize) -> Option<&'a Binding> {
    let tree = ws.tree(unit)?;
    let node = tree
        .indices()
        .filter(|n| match tree.kind(*n) {
            Some(
                NodeKind::SimpleName { name: n }
                | NodeKind::MethodCall { name: n, .. }
                | NodeKind::FieldAccess { name: n, .. }
                | NodeKind::TypeRef { name: n, .. },
            ) => n == name,
            _ => false,
        })
        .nth(nth)?;
    ws.resolve_binding(unit, node)
}

#[test]
fn test_resolve_shadowing_field_in_nested_type() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let inner = ws.find_type("p.Outer.Inner").expect("Inner");
    let inner_count = ws.find_member("p.Outer.Inner#count").expect("Inner.count");
    // `count` in `return count + ...` is the first bare use inside Inner.
    let binding = binding_of(&ws, UnitId(0), "count", 1).expect("bound");
    assert_eq!(
        binding,
        &Binding::Member {
            symbol: inner_count,
            holder: inner
        }
    );
}

#[test]
fn test_resolve_enclosing_members_record_holder() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let outer = ws.find_type("p.Outer").expect("Outer");
    let total = ws.find_member("p.Outer#total").expect("total");
    let size = ws.find_member("p.Outer#size").expect("size");

    let binding = binding_of(&ws, UnitId(0), "total", 0).expect("total bound");
    assert_eq!(binding.symbol(), Some(total));
    assert_eq!(binding.holder(), Some(outer));

    let call = binding_of(&ws, UnitId(0), "size", 0).expect("size() bound");
    assert_eq!(call.symbol(), Some(size));
    assert_eq!(call.holder(), Some(outer), "found through the enclosing type");
}

#[test]
fn test_resolve_qualified_this_field() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let outer_count = ws.find_member("p.Outer#count").expect("count");
    let binding = binding_of(&ws, UnitId(0), "count", 2).expect("bound");
    assert_eq!(binding, &Binding::Symbol(outer_count));
}

#[test]
fn test_resolve_locals_and_parameters() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    assert_eq!(binding_of(&ws, UnitId(0), "local", 0), Some(&Binding::Variable));
    assert_eq!(binding_of(&ws, UnitId(0), "k", 0), Some(&Binding::Variable));
}

#[test]
fn test_resolve_imported_and_implicit_types() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let list = ws.find_type("java.util.List").expect("List");
    let string = ws.find_type("java.lang.String").expect("String");
    // Index 0 is the import itself.
    assert_eq!(binding_of(&ws, UnitId(0), "List", 1), Some(&Binding::Symbol(list)));
    assert_eq!(binding_of(&ws, UnitId(0), "String", 0), Some(&Binding::Symbol(string)));
}

#[test]
fn test_resolve_cross_unit_member_type_and_creation() {
    let user = "package q;

import p.Outer;

class User {
    void f(Outer o) {
        Outer.Inner i = o.new Inner();
        Outer.Nested n = new Outer.Nested();
    }
}
";
    let ws = workspace(&[("src/p/Outer.java", OUTER), ("src/q/User.java", user)]);
    let inner = ws.find_type("p.Outer.Inner").expect("Inner");
    let nested = ws.find_type("p.Outer.Nested").expect("Nested");
    assert_eq!(
        binding_of(&ws, UnitId(1), "Inner", 0),
        Some(&Binding::Symbol(inner))
    );
    assert_eq!(
        binding_of(&ws, UnitId(1), "Nested", 1).and_then(Binding::symbol),
        Some(nested),
        "creation type of new Outer.Nested()"
    );
    // `o.new Inner()` resolves `Inner` through the outer instance.
    assert_eq!(binding_of(&ws, UnitId(1), "Inner", 1), Some(&Binding::Symbol(inner)));
}

#[test]
fn test_resolve_overloads_by_arity() {
    let text = "class A {
    void m() {}
    void m(int x) {}
    void m(int x, int y) {}
    void call() { m(1); m(1, 2); }
}
";
    let ws = workspace(&[("A.java", text)]);
    let tree = ws.tree(UnitId(0)).expect("tree");
    let calls: Vec<NodeIndex> = tree
        .indices()
        .filter(|n| matches!(tree.kind(*n), Some(NodeKind::MethodCall { .. })))
        .collect();
    let one = ws.resolve_binding(UnitId(0), calls[0]).and_then(Binding::symbol).expect("m(1)");
    let two = ws.resolve_binding(UnitId(0), calls[1]).and_then(Binding::symbol).expect("m(1, 2)");
    assert_eq!(ws.symbols()[one].params.len(), 1);
    assert_eq!(ws.symbols()[two].params.len(), 2);
}

#[test]
fn test_resolve_overloads_by_argument_type() {
    let text = "class A {
    long total;
    A(int n) {}
    A(String s) {}
    void f(int x) {}
    void f(String s) {}
    void g(long x) {}
    void g(Object o) {}
    void call(String name) {
        int n = 2;
        f(1);
        f(\"one\");
        f(name);
        f(n);
        g(total);
        f(unknown);
        new A(-3);
        new A(name);
    }
}
";
    let ws = workspace(&[("A.java", text)]);
    let unit = UnitId(0);
    let tree = ws.tree(unit).expect("tree");
    let param_of = |node: NodeIndex| {
        let target = ws.resolve_binding(unit, node).and_then(Binding::symbol).expect("one target");
        ws.symbols()[target].params.join(", ")
    };
    let calls: Vec<NodeIndex> = tree
        .indices()
        .filter(|n| matches!(tree.kind(*n), Some(NodeKind::MethodCall { .. })))
        .collect();
    let targets: Vec<String> = calls[..5].iter().map(|&c| param_of(c)).collect();
    assert_eq!(targets, ["int", "String", "String", "int", "long"]);
    assert!(
        matches!(ws.resolve_binding(unit, calls[5]), Some(Binding::Ambiguous(c)) if c.len() == 2),
        "undecidable call keeps both overloads"
    );

    let creations: Vec<NodeIndex> = tree
        .indices()
        .filter(|n| matches!(tree.kind(*n), Some(NodeKind::New { .. })))
        .collect();
    assert_eq!(param_of(creations[0]), "int");
    assert_eq!(param_of(creations[1]), "String");
}

#[test]
fn test_resolve_static_import_and_unresolved_name() {
    let text = "import static java.lang.Math.max;

class A {
    int f() { return max(1, 2) + missing; }
}
";
    let ws = workspace(&[("A.java", text)]);
    let math = ws.find_type("java.lang.Math").expect("Math");
    let max = binding_of(&ws, UnitId(0), "max", 1)
        .and_then(Binding::symbol)
        .expect("max bound");
    assert_eq!(ws.symbols()[max].owner, Some(math));
    assert_eq!(binding_of(&ws, UnitId(0), "missing", 0), None);
}

#[test]
fn test_declared_package() {
    let ws = workspace(&[("src/p/Outer.java", OUTER), ("B.java", "class B {}")]);
    assert_eq!(declared_package(ws.tree(UnitId(0)).expect("tree")), "p");
    assert_eq!(declared_package(ws.tree(UnitId(1)).expect("tree")), "");
}
