use super::*;
use hoist_common::{CancellationToken, UnitId};
use hoist_frontend::InMemoryWorkspace;

const OUTER: &str = "package p;

public class Outer {
    private int secret;
    int shared;
    protected int guarded;

    class Inner {
        int peek() { return secret + shared; }
    }

    static class Nested {}
}
";

const NEIGHBOR: &str = "package p;

class Neighbor {
    int look(Outer o) { return o.shared; }
}
";

const SUB: &str = "package q;

import p.Outer;

public class Sub extends Outer {
    int probe() { return guarded; }

    class Helper {
        int probe() { return guarded; }
    }
}
";

const STRANGER: &str = "package q;

class Stranger {}
";

fn workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources([
        ("src/p/Outer.java", OUTER),
        ("src/p/Neighbor.java", NEIGHBOR),
        ("src/q/Sub.java", SUB),
        ("src/q/Stranger.java", STRANGER),
    ])
    .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

fn find(ws: &InMemoryWorkspace, name: &str) -> SymbolId {
    ws.find_symbol(name).unwrap_or_else(|| panic!("{name} not found"))
}

fn threshold(ws: &InMemoryWorkspace, layout: &Layout<'_>, scope: &ReferencingScope, target: SymbolId) -> Visibility {
    let cancel = CancellationToken::new();
    let hierarchy = HierarchyCache::new(ws, &cancel);
    VisibilityAnalyzer::new(ws, layout, &hierarchy)
        .threshold(scope, target)
        .expect("not cancelled")
}

#[test]
fn test_threshold_same_top_level_type_is_private() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let peek = ReferencingScope::Member(find(&ws, "p.Outer.Inner#peek"));
    assert_eq!(threshold(&ws, &layout, &peek, find(&ws, "p.Outer#secret")), Visibility::Private);
    let nested = ReferencingScope::Type(find(&ws, "p.Outer.Nested"));
    assert_eq!(threshold(&ws, &layout, &nested, find(&ws, "p.Outer.Inner")), Visibility::Private);
}

#[test]
fn test_threshold_same_package_is_package_default() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let look = ReferencingScope::Member(find(&ws, "p.Neighbor#look"));
    assert_eq!(
        threshold(&ws, &layout, &look, find(&ws, "p.Outer#shared")),
        Visibility::PackageDefault
    );
}

#[test]
fn test_threshold_subclass_is_protected() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let guarded = find(&ws, "p.Outer#guarded");
    let probe = ReferencingScope::Member(find(&ws, "q.Sub#probe"));
    assert_eq!(threshold(&ws, &layout, &probe, guarded), Visibility::Protected);
    let nested_probe = ReferencingScope::Member(find(&ws, "q.Sub.Helper#probe"));
    assert_eq!(
        threshold(&ws, &layout, &nested_probe, guarded),
        Visibility::Protected,
        "code nested in a subclass"
    );
}

#[test]
fn test_threshold_unrelated_package_is_public() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let stranger = ReferencingScope::Type(find(&ws, "q.Stranger"));
    assert_eq!(threshold(&ws, &layout, &stranger, find(&ws, "p.Outer#guarded")), Visibility::Public);
    assert_eq!(threshold(&ws, &layout, &stranger, find(&ws, "p.Outer")), Visibility::Public);
}

#[test]
fn test_threshold_package_and_unit_scopes_skip_the_hierarchy() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let shared = find(&ws, "p.Outer#shared");
    let outer = find(&ws, "p.Outer");
    let cancel = CancellationToken::new();
    let hierarchy = HierarchyCache::new(&ws, &cancel);
    let analyzer = VisibilityAnalyzer::new(&ws, &layout, &hierarchy);

    let in_p = ReferencingScope::Package("p".to_string());
    let in_q = ReferencingScope::Package("q".to_string());
    assert_eq!(analyzer.threshold(&in_p, shared), Ok(Visibility::PackageDefault));
    assert_eq!(analyzer.threshold(&in_q, shared), Ok(Visibility::Public));
    assert_eq!(
        analyzer.threshold(&ReferencingScope::Unit(UnitId(1)), outer),
        Ok(Visibility::PackageDefault)
    );
    assert_eq!(analyzer.threshold(&ReferencingScope::Unit(UnitId(3)), outer), Ok(Visibility::Public));
    assert_eq!(hierarchy.computed(), 0);
}

#[test]
fn test_threshold_after_move_to_same_package() {
    let ws = workspace();
    let inner = find(&ws, "p.Outer.Inner");
    let layout = Layout::after_move(ws.symbols(), inner, "p");
    let peek = ReferencingScope::Member(find(&ws, "p.Outer.Inner#peek"));
    assert_eq!(
        threshold(&ws, &layout, &peek, find(&ws, "p.Outer#secret")),
        Visibility::PackageDefault,
        "a sibling unit in the same package"
    );
}

#[test]
fn test_threshold_after_move_to_other_package() {
    let ws = workspace();
    let inner = find(&ws, "p.Outer.Inner");
    let layout = Layout::after_move(ws.symbols(), inner, "r");
    let peek = ReferencingScope::Member(find(&ws, "p.Outer.Inner#peek"));
    assert_eq!(threshold(&ws, &layout, &peek, find(&ws, "p.Outer#shared")), Visibility::Public);
    let look = ReferencingScope::Member(find(&ws, "p.Neighbor#look"));
    assert_eq!(
        threshold(&ws, &layout, &look, inner),
        Visibility::Public,
        "the moved type is now top-level in another package"
    );
}

#[test]
fn test_threshold_reuses_cached_hierarchies() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let cancel = CancellationToken::new();
    let hierarchy = HierarchyCache::new(&ws, &cancel);
    let analyzer = VisibilityAnalyzer::new(&ws, &layout, &hierarchy);
    let probe = ReferencingScope::Member(find(&ws, "q.Sub#probe"));
    let guarded = find(&ws, "p.Outer#guarded");
    let shared = find(&ws, "p.Outer#shared");

    let first = analyzer.threshold(&probe, guarded);
    let second = analyzer.threshold(&probe, guarded);
    assert_eq!(first, second, "no flapping");
    let _ = analyzer.threshold(&probe, shared);
    assert_eq!(hierarchy.computed(), 1);
}

#[test]
fn test_threshold_cancelled_hierarchy() {
    let ws = workspace();
    let layout = Layout::current(ws.symbols());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let hierarchy = HierarchyCache::new(&ws, &cancel);
    let analyzer = VisibilityAnalyzer::new(&ws, &layout, &hierarchy);
    let stranger = ReferencingScope::Type(find(&ws, "q.Stranger"));
    assert_eq!(analyzer.threshold(&stranger, find(&ws, "p.Outer#guarded")), Err(Cancelled));
}
