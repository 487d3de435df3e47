use super::*;
use hoist_frontend::InMemoryWorkspace;

const OUTER: &str = "package p;

public class Outer {
    int x;
    static int count;
    static void log() {}
    void touch() {}
    class Sibling {}
    static class Helper {}

    class Inner {
        int own;
        void run() {
            x++;
            count++;
            log();
            touch();
            Outer.this.touch();
            Sibling s = new Sibling();
            Helper h = null;
            own++;
            helper();
        }
        void helper() {}
    }

    static class Quiet {
        void run() { count++; }
    }
}
";

fn workspace(sources: &[(&str, &str)]) -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources(sources.iter().copied())
        .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

fn find(ws: &InMemoryWorkspace, name: &str) -> SymbolId {
    ws.find_symbol(name).unwrap_or_else(|| panic!("{name} not found"))
}

fn text_at(access: &EnclosingAccess) -> &'static str {
    access.location.span.slice(OUTER)
}

#[test]
fn test_collects_every_kind_of_enclosing_access() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let inner = find(&ws, "p.Outer.Inner");
    let outer = find(&ws, "p.Outer");
    let accesses = EnclosingAccessCollector::new(&ws, inner).collect();

    let summary: Vec<(&str, &str)> = accesses
        .iter()
        .map(|a| {
            let kind = match a.kind {
                AccessKind::InstanceMember { .. } => "instance",
                AccessKind::StaticMember { .. } => "static",
                AccessKind::MemberType { .. } => "type",
                AccessKind::QualifiedThis { .. } => "this",
                AccessKind::InnerCreation { .. } => "creation",
            };
            (text_at(a), kind)
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("x", "instance"),
            ("count", "static"),
            ("log", "static"),
            ("touch", "instance"),
            ("Outer.this", "this"),
            ("Sibling", "type"),
            ("Sibling", "creation"),
            ("Helper", "type"),
        ]
    );
    assert!(accesses.iter().all(|a| a.kind.holder() == outer));
}

#[test]
fn test_own_members_are_not_enclosing_accesses() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let inner = find(&ws, "p.Outer.Inner");
    let accesses = EnclosingAccessCollector::new(&ws, inner).collect();
    assert!(!accesses.iter().any(|a| text_at(a) == "own" || text_at(a) == "helper"));
}

#[test]
fn test_needs_instance_only_for_instance_paths() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let inner = find(&ws, "p.Outer.Inner");
    let accesses = EnclosingAccessCollector::new(&ws, inner).collect();
    for access in &accesses {
        let expected = matches!(text_at(access), "x" | "touch" | "Outer.this")
            || matches!(access.kind, AccessKind::InnerCreation { .. });
        assert_eq!(access.kind.needs_instance(), expected, "{:?}", access.kind);
    }
}

#[test]
fn test_creation_access_points_at_new_expression() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let inner = find(&ws, "p.Outer.Inner");
    let tree = ws.tree(hoist_common::UnitId(0)).unwrap_or_else(|| panic!("tree"));
    let creation = EnclosingAccessCollector::new(&ws, inner)
        .collect()
        .into_iter()
        .find(|a| matches!(a.kind, AccessKind::InnerCreation { .. }))
        .unwrap_or_else(|| panic!("no creation access"));
    assert!(matches!(tree.kind(creation.node), Some(NodeKind::New { .. })));
    assert_eq!(tree.span(creation.node).slice(OUTER), "new Sibling()");
}

#[test]
fn test_static_type_only_sees_static_accesses() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let quiet = find(&ws, "p.Outer.Quiet");
    let accesses = EnclosingAccessCollector::new(&ws, quiet).collect();
    assert_eq!(accesses.len(), 1);
    assert!(matches!(accesses[0].kind, AccessKind::StaticMember { .. }));
    assert!(!accesses[0].kind.needs_instance());
}

#[test]
fn test_library_type_has_no_accesses() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let string = find(&ws, "java.lang.String");
    assert!(EnclosingAccessCollector::new(&ws, string).collect().is_empty());
}
