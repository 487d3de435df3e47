use super::*;
use hoist_model::{CallKind, ModifierFlags, TypeKind};

fn parse_ok(text: &str) -> Tree {
    parse(UnitId(0), text).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

fn find(tree: &Tree, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeIndex> {
    tree.descendants(tree.root)
        .into_iter()
        .filter(|n| tree.kind(*n).is_some_and(&pred))
        .collect()
}

const OUTER: &str = "package p;

import java.util.List;
import static java.lang.Math.*;

public class Outer<T> extends Base implements Runnable {
    private int count = 0, limit;
    static final String NAME = \"outer\";

    public Outer(int count) {
        this.count = count;
    }

    class Inner {
        int read() { return count + limit; }
    }

    public void run() {
        Inner i = this.new Inner();
        List<List<T>> nested = null;
        for (int k = 0; k < 10; k++) { count += k >> 1; }
        for (String s : names()) { System.out.println(s); }
    }

    List<String> names() { return null; }
}
";

#[test]
fn test_parse_package_and_imports() {
    let tree = parse_ok(OUTER);
    let package = tree.package_decl().expect("package");
    let NodeKind::PackageDecl { name } = tree.kind(package).unwrap() else {
        panic!("not a package decl");
    };
    assert_eq!(tree.dotted_name(*name), "p");

    let imports = tree.imports();
    assert_eq!(imports.len(), 2);
    let NodeKind::Import {
        is_static,
        on_demand,
        name,
    } = tree.kind(imports[1]).unwrap()
    else {
        panic!("not an import");
    };
    assert!(*is_static && *on_demand);
    assert_eq!(tree.dotted_name(*name), "java.lang.Math");
}

#[test]
fn test_parse_class_header_and_members() {
    let tree = parse_ok(OUTER);
    let outer = tree.top_level_types()[0];
    let decl = tree.type_decl(outer).expect("type decl");
    assert_eq!(decl.name, "Outer");
    assert_eq!(decl.kind, TypeKind::Class);
    assert!(decl.modifiers.flags.contains(ModifierFlags::PUBLIC));
    assert_eq!(decl.type_params.as_ref().map(|tp| tp.items.len()), Some(1));
    assert_eq!(decl.extends.len(), 1);
    assert_eq!(decl.implements.len(), 1);
    assert_eq!(decl.body.items.len(), 6, "two fields, ctor, Inner, run, names");
    assert_eq!(
        &OUTER[tree.span(outer).start as usize..tree.span(outer).start as usize + 6],
        "public"
    );
    assert!(OUTER[..tree.span(outer).end as usize].ends_with('}'));
}

#[test]
fn test_parse_field_fragments() {
    let tree = parse_ok(OUTER);
    let fields = find(&tree, |k| matches!(k, NodeKind::Field { .. }));
    let NodeKind::Field { fragments, modifiers, .. } = tree.kind(fields[0]).unwrap() else {
        unreachable!();
    };
    assert_eq!(fragments.len(), 2);
    assert!(modifiers.flags.contains(ModifierFlags::PRIVATE));
    let names: Vec<&str> = fragments
        .iter()
        .map(|f| match tree.kind(*f) {
            Some(NodeKind::Fragment { name, .. }) => name.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(names, vec!["count", "limit"]);
}

#[test]
fn test_parse_constructor_and_inner_creation() {
    let tree = parse_ok(OUTER);
    let ctors: Vec<NodeIndex> = find(&tree, |k| matches!(k, NodeKind::Method(m) if m.is_constructor()));
    assert_eq!(ctors.len(), 1);

    let news = find(&tree, |k| matches!(k, NodeKind::New { outer: Some(_), .. }));
    assert_eq!(news.len(), 1, "this.new Inner()");
    let NodeKind::New { outer: Some(outer), .. } = tree.kind(news[0]).unwrap() else {
        unreachable!();
    };
    assert!(matches!(tree.kind(*outer), Some(NodeKind::This { qualifier: None })));
}

#[test]
fn test_parse_nested_generics_and_shift() {
    let tree = parse_ok(OUTER);
    let shifts = find(&tree, |k| matches!(k, NodeKind::Binary { op, .. } if op == ">>"));
    assert_eq!(shifts.len(), 1);
    let compound = find(&tree, |k| matches!(k, NodeKind::Assign { op, .. } if op == "+="));
    assert_eq!(compound.len(), 1);
    let foreach = find(&tree, |k| matches!(k, NodeKind::ForEach { .. }));
    assert_eq!(foreach.len(), 1);
}

#[test]
fn test_parse_qualified_this_and_super_call() {
    let text = "class A { class B extends C.D { B(C c) { c.super(); A.this.x = 1; } } int x; }";
    let tree = parse_ok(text);
    let calls = find(&tree, |k| {
        matches!(
            k,
            NodeKind::ConstructorCall {
                kind: CallKind::Super,
                qualifier: Some(_),
                ..
            }
        )
    });
    assert_eq!(calls.len(), 1);

    let this = find(&tree, |k| matches!(k, NodeKind::This { qualifier: Some(_) }));
    assert_eq!(this.len(), 1);
    let NodeKind::This { qualifier: Some(q) } = tree.kind(this[0]).unwrap() else {
        unreachable!();
    };
    assert!(matches!(tree.kind(*q), Some(NodeKind::TypeRef { name, .. }) if name == "A"));
    assert_eq!(tree.span(this[0]).slice(text), "A.this");
}

#[test]
fn test_parse_enum_with_constants_and_members() {
    let text = "enum Color { RED, GREEN(1) { int f() { return 2; } }; private int v; Color() {} Color(int v) { this.v = v; } }";
    let tree = parse_ok(text);
    let constants = find(&tree, |k| matches!(k, NodeKind::EnumConstant { .. }));
    assert_eq!(constants.len(), 2);
    let anonymous = find(&tree, |k| matches!(k, NodeKind::TypeDecl(d) if d.kind == TypeKind::Anonymous));
    assert_eq!(anonymous.len(), 1);
    let ctors = find(&tree, |k| matches!(k, NodeKind::Method(m) if m.is_constructor()));
    assert_eq!(ctors.len(), 2);
}

#[test]
fn test_parse_statements() {
    let text = "class S {
        void f(int[] xs, String... rest) throws Exception {
            label: while (true) { break label; }
            do { xs[0]--; } while (xs[0] > 0);
            switch (xs.length) { case 1: case 2: return; default: break; }
            try (java.io.Reader r = open()) { } catch (IllegalStateException | RuntimeException e) { } finally { }
            synchronized (this) { assert xs != null : \"xs\"; }
            Runnable r = () -> { };
            java.util.function.Function<String, Integer> g = s -> s.length();
            Object o = (Object) xs;
            Class<?> c = int[].class;
            int[][] grid = new int[3][];
            int[] ys = new int[] { 1, 2 };
            boolean b = o instanceof String && xs.length >= 2;
            int m = b ? 1 : 2;
            class Local { }
        }
    }";
    let tree = parse_ok(text);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Labeled { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::DoWhile { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::SwitchCase { .. })).len(), 3);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Try { resources, .. } if resources.len() == 1)).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Synchronized { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Assert { message: Some(_), .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Lambda { .. })).len(), 2);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Cast { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::ClassLiteral { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::NewArray { .. })).len(), 2);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::InstanceOf { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Conditional { .. })).len(), 1);
    assert_eq!(find(&tree, |k| matches!(k, NodeKind::Binary { op, .. } if op == ">=")).len(), 1);
    let local = find(&tree, |k| matches!(k, NodeKind::TypeDecl(d) if d.name == "Local"));
    assert_eq!(local.len(), 1);
    let parent = tree.parent(local[0]).expect("parent");
    assert!(matches!(tree.kind(parent), Some(NodeKind::Block { .. })));
}

#[test]
fn test_parse_parents_are_linked() {
    let tree = parse_ok(OUTER);
    for idx in tree.indices() {
        if idx == tree.root {
            continue;
        }
        let reachable = tree.descendants(tree.root).contains(&idx);
        if reachable {
            assert!(tree.parent(idx).is_some(), "node {idx:?} has no parent");
        }
    }
}

#[test]
fn test_parse_error_reports_offset() {
    let err = parse(UnitId(0), "class A { int x = ; }").expect_err("should fail");
    assert_eq!(err.offset, 18);
}

#[test]
fn test_parse_annotations_are_recorded() {
    let text = "@Deprecated public class A { @Override public String toString() { return \"\"; } }";
    let tree = parse_ok(text);
    let decl = tree.type_decl(tree.top_level_types()[0]).expect("type");
    assert_eq!(decl.modifiers.annotations.len(), 1);
    assert_eq!(tree.span(tree.top_level_types()[0]).start, 0);
}

#[test]
fn test_local_declaration_span_includes_semicolon() {
    let text = "class A { void m() { int x = 1, y; x++; } }";
    let tree = parse_ok(text);
    let locals = find(&tree, |k| matches!(k, NodeKind::LocalVariable { .. }));
    assert_eq!(locals.len(), 1);
    assert_eq!(tree.span(locals[0]).slice(text), "int x = 1, y;");
}
