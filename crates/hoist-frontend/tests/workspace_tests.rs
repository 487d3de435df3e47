use super::*;
use hoist_model::{ReferenceKind, ReferenceKinds, Staticness};

const OUTER: &str = "package p;

public class Outer {
    int x;
    static int shared;

    void touch() {
        x = 1;
        x += 2;
        x++;
        int y = x;
        Outer.shared = y;
        new Outer().x = 3;
    }
}
";

const USER: &str = "package q;

import p.Outer;

class User extends Outer {
    int read(Outer o) { return o.x; }
}
";

fn workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources([("src/p/Outer.java", OUTER), ("src/q/User.java", USER)])
        .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

fn kinds_of(refs: &[Reference]) -> Vec<ReferenceKind> {
    refs.iter().map(|r| r.kind).collect()
}

#[test]
fn test_find_references_classifies_access_kinds() {
    let ws = workspace();
    let x = ws.find_member("p.Outer#x").expect("x");
    let found = ws
        .find_references(x, &SearchScope::Workspace, &ReferenceFilter::all(), &CancellationToken::new())
        .expect("not cancelled");
    assert_eq!(found.len(), 2, "declaring unit and user unit");
    let in_outer = &found[&UnitId(0)];
    assert_eq!(
        kinds_of(in_outer),
        vec![
            ReferenceKind::Write,
            ReferenceKind::ReadWrite,
            ReferenceKind::ReadWrite,
            ReferenceKind::Read,
            ReferenceKind::Write,
        ]
    );
    let first = in_outer[0].location.span;
    assert_eq!(first.slice(OUTER), "x");
    assert_eq!(kinds_of(&found[&UnitId(1)]), vec![ReferenceKind::Read]);
}

#[test]
fn test_find_references_filters_by_kind_scope_and_staticness() {
    let ws = workspace();
    let cancel = CancellationToken::new();
    let x = ws.find_member("p.Outer#x").expect("x");
    let writes = ReferenceFilter {
        kinds: ReferenceKinds::WRITE,
        staticness: Staticness::Any,
    };
    let found = ws
        .find_references(x, &SearchScope::Package("p".to_string()), &writes, &cancel)
        .expect("not cancelled");
    assert_eq!(found.len(), 1);
    assert_eq!(found[&UnitId(0)].len(), 4, "two writes and two read-writes");

    let shared = ws.find_member("p.Outer#shared").expect("shared");
    let static_only = ReferenceFilter {
        kinds: ReferenceKinds::all(),
        staticness: Staticness::StaticOnly,
    };
    let found = ws
        .find_references(shared, &SearchScope::Workspace, &static_only, &cancel)
        .expect("not cancelled");
    assert_eq!(found[&UnitId(0)].len(), 1, "Outer.shared");
}

#[test]
fn test_find_references_to_type_include_imports() {
    let ws = workspace();
    let outer = ws.find_type("p.Outer").expect("Outer");
    let found = ws
        .find_references(
            outer,
            &SearchScope::Units(vec![UnitId(1)]),
            &ReferenceFilter::all(),
            &CancellationToken::new(),
        )
        .expect("not cancelled");
    let kinds = kinds_of(&found[&UnitId(1)]);
    assert_eq!(
        kinds,
        vec![
            ReferenceKind::Import,
            ReferenceKind::TypeReference,
            ReferenceKind::TypeReference,
        ]
    );
}

#[test]
fn test_find_references_honours_cancellation() {
    let ws = workspace();
    let x = ws.find_member("p.Outer#x").expect("x");
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = ws.find_references(x, &SearchScope::Workspace, &ReferenceFilter::all(), &cancel);
    assert_eq!(result, Err(Cancelled));
}

#[test]
fn test_type_hierarchy_lists_source_subtypes() {
    let ws = workspace();
    let outer = ws.find_type("p.Outer").expect("Outer");
    let user = ws.find_type("q.User").expect("User");
    let object = ws.find_type("java.lang.Object").expect("Object");
    let hierarchy = ws
        .type_hierarchy(outer, &CancellationToken::new())
        .expect("not cancelled");
    assert_eq!(hierarchy.supertypes, vec![object]);
    assert_eq!(hierarchy.subtypes, vec![user]);
}

#[test]
fn test_apply_changes_edits_creates_and_rebinds() {
    let mut ws = workspace();
    let x_span = {
        let start = OUTER.find("int x;").expect("decl") as u32;
        hoist_common::Span::new(start, start)
    };
    let changes = vec![
        Change::Edit {
            unit: UnitId(0),
            path: PathBuf::from("src/p/Outer.java"),
            edits: vec![TextEdit::insert(x_span.start, "public ")],
        },
        Change::Create {
            path: PathBuf::from("src/p/Extra.java"),
            contents: "package p;\n\nclass Extra { Outer o; }\n".to_string(),
        },
    ];
    ws.apply_changes(&changes).expect("applied");

    assert!(ws.text(UnitId(0)).expect("text").contains("public int x;"));
    let extra = ws.unit_by_path(Path::new("src/p/Extra.java")).expect("created");
    assert_eq!(ws.unit(extra).map(|u| u.package.as_str()), Some("p"));
    let x = ws.find_member("p.Outer#x").expect("x");
    assert_eq!(ws.symbols().visibility(x), hoist_model::Visibility::Public);
    assert!(ws.find_type("p.Extra").is_some());
}

#[test]
fn test_apply_changes_is_all_or_nothing() {
    let mut ws = workspace();
    let before = ws.text(UnitId(0)).expect("text").to_string();
    let changes = vec![
        Change::Edit {
            unit: UnitId(0),
            path: PathBuf::from("src/p/Outer.java"),
            edits: vec![TextEdit::insert(0, "// header\n")],
        },
        Change::Edit {
            unit: UnitId(1),
            path: PathBuf::from("src/q/User.java"),
            edits: vec![
                TextEdit::replace(hoist_common::Span::new(0, 5), "a"),
                TextEdit::replace(hoist_common::Span::new(3, 8), "b"),
            ],
        },
    ];
    let err = ws.apply_changes(&changes).expect_err("overlap");
    assert!(matches!(err, ApplyError::Overlap { .. }));
    assert_eq!(ws.text(UnitId(0)), Some(before.as_str()), "first unit untouched");
}

#[test]
fn test_apply_changes_rejects_existing_path_and_bad_syntax() {
    let mut ws = workspace();
    let exists = ws.apply_changes(&[Change::Create {
        path: PathBuf::from("src/q/User.java"),
        contents: "package q; class User {}".to_string(),
    }]);
    assert!(matches!(exists, Err(ApplyError::AlreadyExists(_))));

    let broken = ws.apply_changes(&[Change::Edit {
        unit: UnitId(0),
        path: PathBuf::from("src/p/Outer.java"),
        edits: vec![TextEdit::insert(0, "class {")],
    }]);
    assert!(matches!(broken, Err(ApplyError::Rejected(_))));
    assert_eq!(ws.units().len(), 2);
}

#[test]
fn test_find_symbol_forms() {
    let ws = workspace();
    assert!(ws.find_symbol("p.Outer").is_some());
    assert!(ws.find_symbol("p.Outer#touch").is_some());
    assert!(ws.find_symbol("p.Missing").is_none());
    assert!(ws.find_symbol("p.Outer#missing").is_none());
}
