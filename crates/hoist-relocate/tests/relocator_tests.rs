use super::*;
use crate::plan::EnclosingLink;
use hoist_common::Change;
use hoist_common::messages::diagnostic_codes;
use hoist_frontend::InMemoryWorkspace;
use hoist_model::{ChangeApplier, Program, Visibility};
use std::path::Path;

const OUTER: &str = "package p;

public class Outer {
    private int x;

    class Inner {
        int read() { return x; }
    }

    Inner make() { return new Inner(); }
}
";

fn workspace(sources: &[(&str, &str)]) -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources(sources.iter().copied())
        .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

fn find(ws: &InMemoryWorkspace, name: &str) -> SymbolId {
    ws.find_symbol(name).unwrap_or_else(|| panic!("{name} not found"))
}

fn created<'c>(changes: &'c [Change], path: &str) -> &'c str {
    changes
        .iter()
        .find_map(|c| match c {
            Change::Create { path: p, contents } if p == Path::new(path) => Some(contents.as_str()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no unit created at {path}"))
}

#[test]
fn test_plan_reports_link_and_field() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let relocator = Relocator::new(&ws, &config, &cancel);
    let plan = relocator
        .plan_move(find(&ws, "p.Outer.Inner"), &MoveOptions::default())
        .unwrap_or_else(|s| panic!("plan failed: {s:?}"));

    assert_eq!(plan.type_name, "Inner");
    assert_eq!(plan.destination_package, "p");
    assert_eq!(plan.link, EnclosingLink::Mandatory);
    assert!(plan.is_field_mandatory());
    let field = plan.enclosing_field.as_ref().unwrap_or_else(|| panic!("no field"));
    assert_eq!((field.name.as_str(), field.type_text.as_str()), ("outer", "Outer"));
    assert!(field.is_final);
    assert_eq!(plan.top_level_visibility, Visibility::PackageDefault);
    let x = find(&ws, "p.Outer#x");
    assert_eq!(plan.adjustments.required(x), Some(Visibility::PackageDefault));
    assert!(!plan.status.has_fatal());
}

#[test]
fn test_move_rewrites_units_and_creates_new_one() {
    let mut ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let inner = find(&ws, "p.Outer.Inner");
    let outcome = Relocator::new(&ws, &config, &cancel)
        .move_to_top_level(inner, &MoveOptions::default())
        .unwrap_or_else(|s| panic!("move failed: {s:?}"));

    assert_eq!(outcome.changes.len(), 2);
    assert!(outcome.changes[1].is_create());
    assert_eq!(
        created(&outcome.changes, "src/p/Inner.java"),
        "package p;

class Inner {
    private final Outer outer;

    Inner(Outer outer) {
        this.outer = outer;
    }

    int read() { return outer.x; }
}
"
    );

    ws.apply_changes(&outcome.changes)
        .unwrap_or_else(|e| panic!("apply failed: {e}"));
    let outer = ws
        .unit_by_path(Path::new("src/p/Outer.java"))
        .and_then(|u| ws.text(u))
        .unwrap_or_else(|| panic!("Outer unit missing"));
    assert_eq!(
        outer,
        "package p;

public class Outer {
    int x;

    Inner make() { return new Inner(this); }
}
"
    );
    assert!(ws.find_type("p.Inner").is_some());
    assert!(ws.find_type("p.Outer.Inner").is_none());
}

#[test]
fn test_member_on_the_brace_line_keeps_its_indent() {
    let outer = "package p;

public class Outer {
    int x;

    class Inner { int g() { return x; } }
}
";
    let ws = workspace(&[("src/p/Outer.java", outer)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let outcome = Relocator::new(&ws, &config, &cancel)
        .move_to_top_level(find(&ws, "p.Outer.Inner"), &MoveOptions::default())
        .unwrap_or_else(|s| panic!("move failed: {s:?}"));
    let inner = created(&outcome.changes, "src/p/Inner.java");
    assert!(inner.contains("class Inner {\n    private final Outer outer;\n"), "{inner}");
    assert!(inner.contains("    }\n\n    int g() { return outer.x; } }"), "{inner}");
}

#[test]
fn test_only_the_called_overload_is_widened() {
    let outer = "package p;

public class Outer {
    private void f(int a) {}
    private void f(String s) {}

    static class Inner {
        void run(Outer o) { o.f(1); }
    }
}
";
    let ws = workspace(&[("src/p/Outer.java", outer)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let plan = Relocator::new(&ws, &config, &cancel)
        .plan_move(find(&ws, "p.Outer.Inner"), &MoveOptions::default())
        .unwrap_or_else(|s| panic!("plan failed: {s:?}"));

    let overload = |param: &str| {
        ws.symbols()
            .iter()
            .find(|s| s.name == "f" && s.params == [param])
            .map(|s| s.id)
            .unwrap_or_else(|| panic!("f({param}) not found"))
    };
    assert_eq!(
        plan.adjustments.required(overload("int")),
        Some(Visibility::PackageDefault)
    );
    assert_eq!(plan.adjustments.required(overload("String")), None);
}

#[test]
fn test_move_across_packages_imports_and_widens() {
    let outer = "package p;

public class Outer {
    public static class Entry {
        int key;
    }

    int first(Entry e) { return e.key; }
}
";
    let mut ws = workspace(&[("src/p/Outer.java", outer)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let options = MoveOptions {
        destination_package: Some("q".to_string()),
        ..MoveOptions::default()
    };
    let entry = find(&ws, "p.Outer.Entry");
    let outcome = Relocator::new(&ws, &config, &cancel)
        .move_to_top_level(entry, &options)
        .unwrap_or_else(|s| panic!("move failed: {s:?}"));

    assert_eq!(
        created(&outcome.changes, "src/q/Entry.java"),
        "package q;

public class Entry {
    public int key;
}
"
    );
    ws.apply_changes(&outcome.changes)
        .unwrap_or_else(|e| panic!("apply failed: {e}"));
    let text = ws.text(hoist_common::UnitId(0)).unwrap_or_else(|| panic!("unit 0"));
    assert!(text.starts_with("package p;\n\nimport q.Entry;\n\npublic class Outer {"), "{text}");
    assert!(text.contains("    int first(Entry e) { return e.key; }"), "{text}");
    assert!(ws.find_type("q.Entry").is_some());
}

#[test]
fn test_fatal_move_yields_no_changes() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let status = Relocator::new(&ws, &config, &cancel)
        .move_to_top_level(find(&ws, "p.Outer"), &MoveOptions::default())
        .err()
        .unwrap_or_else(|| panic!("top-level type moved"));
    assert!(status.has_fatal());
    assert!(status.has_code(diagnostic_codes::MOVE_TARGET_IS_TOP_LEVEL));
}

#[test]
fn test_commit_after_cancellation_is_refused() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let relocator = Relocator::new(&ws, &config, &cancel);
    let plan = relocator
        .plan_move(find(&ws, "p.Outer.Inner"), &MoveOptions::default())
        .unwrap_or_else(|s| panic!("plan failed: {s:?}"));
    cancel.cancel();
    let status = relocator.commit(&plan).err().unwrap_or_else(|| panic!("committed"));
    assert!(status.has_code(diagnostic_codes::CANCELLED));
}

#[test]
fn test_stale_plan_is_refused() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let plan = Relocator::new(&ws, &config, &cancel)
        .plan_move(find(&ws, "p.Outer.Inner"), &MoveOptions::default())
        .unwrap_or_else(|s| panic!("plan failed: {s:?}"));

    let edited = OUTER.replace("Inner", "Renamed");
    let other = workspace(&[("src/p/Outer.java", edited.as_str())]);
    let status = Relocator::new(&other, &config, &cancel)
        .commit(&plan)
        .err()
        .unwrap_or_else(|| panic!("stale plan committed"));
    assert!(status.has_code(diagnostic_codes::STALE_PLAN));
    assert!(status.has_fatal());
}

#[test]
fn test_adjust_visibility_for_incoming_references() {
    let a = "package p;

public class A {
    int count;
}
";
    let b = "package q;

import p.A;

class B {
    int read(A a) { return a.count; }
}
";
    let ws = workspace(&[("src/p/A.java", a), ("src/q/B.java", b)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let count = find(&ws, "p.A#count");
    let report = Relocator::new(&ws, &config, &cancel)
        .adjust_visibility(count, Directions::INCOMING)
        .unwrap_or_else(|s| panic!("adjust failed: {s:?}"));
    assert_eq!(report.adjustments.required(count), Some(Visibility::Public));

    cancel.cancel();
    let status = Relocator::new(&ws, &config, &cancel)
        .adjust_visibility(count, Directions::all())
        .err()
        .unwrap_or_else(|| panic!("cancelled adjustment ran"));
    assert!(status.has_code(diagnostic_codes::CANCELLED));
}
