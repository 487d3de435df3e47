use super::*;
use hoist_frontend::InMemoryWorkspace;
use hoist_model::Program;

const OUTER: &str = "package p;

public class Outer {
    int x;

    class Inner {
        int y;
        class Deep {}
    }
}
";

fn workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources([("src/p/Outer.java", OUTER)])
        .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

#[test]
fn test_current_layout_follows_declarations() {
    let ws = workspace();
    let outer = ws.find_type("p.Outer").expect("Outer");
    let inner = ws.find_type("p.Outer.Inner").expect("Inner");
    let deep = ws.find_type("p.Outer.Inner.Deep").expect("Deep");
    let x = ws.find_member("p.Outer#x").expect("x");

    let layout = Layout::current(ws.symbols());
    assert_eq!(layout.moved_type(), None);
    assert_eq!(layout.owner(inner), Some(outer));
    assert_eq!(layout.top_level_of(deep), outer);
    assert_eq!(layout.enclosing_chain(deep), vec![inner, outer]);
    assert_eq!(layout.placement(inner), Some(Placement::Existing(UnitId(0))));
    assert!(!layout.is_relocated(inner));
    assert!(layout.same_unit(x, deep));
}

#[test]
fn test_layout_after_move_detaches_moved_type() {
    let ws = workspace();
    let outer = ws.find_type("p.Outer").expect("Outer");
    let inner = ws.find_type("p.Outer.Inner").expect("Inner");
    let deep = ws.find_type("p.Outer.Inner.Deep").expect("Deep");
    let x = ws.find_member("p.Outer#x").expect("x");
    let y = ws.find_member("p.Outer.Inner#y").expect("y");

    let layout = Layout::after_move(ws.symbols(), inner, "q");
    assert_eq!(layout.owner(inner), None);
    assert_eq!(layout.owner(deep), Some(inner));
    assert_eq!(layout.top_level_of(deep), inner);
    assert_eq!(layout.enclosing_chain(deep), vec![inner]);
    assert!(layout.is_within(deep, inner));
    assert!(!layout.is_within(deep, outer));

    assert_eq!(layout.package(deep), "q");
    assert_eq!(layout.package(x), "p");
    assert_eq!(layout.placement(y), Some(Placement::Relocated));
    assert_eq!(layout.placement(x), Some(Placement::Existing(UnitId(0))));
    assert!(!layout.same_unit(x, y));
    assert!(layout.same_unit(y, deep));
}

#[test]
fn test_library_types_have_no_placement() {
    let ws = workspace();
    let outer = ws.find_type("p.Outer").expect("Outer");
    let object = ws.find_type("java.lang.Object").expect("Object");
    let layout = Layout::current(ws.symbols());
    assert_eq!(layout.placement(object), None);
    assert!(!layout.same_unit(object, outer));
}
