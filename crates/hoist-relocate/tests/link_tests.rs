use super::*;
use crate::plan::MoveOptions;
use hoist_common::messages::diagnostic_codes;
use hoist_common::{CancellationToken, RefactoringConfig, Severity, apply_text_edits};
use hoist_frontend::InMemoryWorkspace;

const OUTER: &str = "package p;

public class Outer {
    int x;

    class Inner {
        int a;
        Inner() { this(0); }
        Inner(int a) {
            this.a = a;
        }
        Inner(String s, int outer) {
            super();
            a = outer;
        }
        int sum() { return x + a; }
    }

    Inner make() { return new Inner(); }
    Inner make(int a) { return new Inner(a); }
    static Inner orphan() { return new Inner(); }
}
";

const SIMPLE: &str = "package p;

public class Outer {
    int x;

    class Reader {
        int read() { return x; }
    }

    class Plain {
        int value() { return 1; }
    }

    static class Nested {
        int value() { return 2; }
    }

    class Lazy extends Reader {}

    Reader reader() { return new Reader(); }
    Plain plain() { return new Plain(); }
}
";

const USER: &str = "package q;

import p.Outer;

class User {
    Outer.Reader make(Outer o) {
        return o.new Reader();
    }
    Outer.Plain plain(Outer o) {
        return o.new Plain();
    }
}

class Sub extends Outer.Reader {
    Sub(Outer o) {
        o.super();
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

fn planned<'a>(
    ws: &'a InMemoryWorkspace,
    config: &'a RefactoringConfig,
    cancel: &'a CancellationToken,
    ty: &str,
    options: MoveOptions,
) -> Result<RelocationContext<'a>, Abort> {
    RelocationContext::new(ws, config, cancel, find(ws, ty), options)?
        .analyze()?
        .plan()
}

fn rewritten(ws: &InMemoryWorkspace, ctx: &RelocationContext<'_>, unit: u32) -> String {
    let text = ws.text(UnitId(unit)).unwrap_or_else(|| panic!("unit {unit}"));
    let edits = ctx.rewrites.settled(UnitId(unit), text);
    apply_text_edits(text, &edits).unwrap_or_else(|e| panic!("edits failed: {e}"))
}

fn ok(result: Result<RelocationContext<'_>, Abort>) -> RelocationContext<'_> {
    result.unwrap_or_else(|e| panic!("plan failed: {e:?}"))
}

#[test]
fn test_constructors_receive_enclosing_instance() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Inner", MoveOptions::default()));

    assert_eq!(ctx.link, EnclosingLink::Mandatory);
    let field = ctx.field.clone().unwrap_or_else(|| panic!("no field"));
    assert_eq!(field.name, "outer");
    assert_eq!(field.type_text, "Outer");
    assert!(field.is_final);
    assert_eq!(ctx.parameter_name, "outer1", "`outer` is taken by a constructor parameter");
    assert!(ctx.status.has_code(diagnostic_codes::PARAMETER_NAME_COLLISION));

    let text = rewritten(&ws, &ctx, 0);
    assert!(text.contains("Inner(Outer outer1) { this(outer1, 0); }"), "{text}");
    assert!(
        text.contains("Inner(Outer outer1, int a) {\n            outer = outer1;\n            this.a = a;"),
        "{text}"
    );
    assert!(
        text.contains("Inner(Outer outer1, String s, int outer) {\n            super();\n            this.outer = outer1;"),
        "{text}"
    );
}

#[test]
fn test_creation_sites_pass_lexical_instance() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Inner", MoveOptions::default()));

    let text = rewritten(&ws, &ctx, 0);
    assert!(text.contains("Inner make() { return new Inner(this); }"), "{text}");
    assert!(text.contains("Inner make(int a) { return new Inner(this, a); }"), "{text}");
    assert!(text.contains("static Inner orphan() { return new Inner(); }"), "{text}");
    let warnings: Vec<_> = ctx
        .status
        .entries_with_code(diagnostic_codes::NO_ENCLOSING_INSTANCE)
        .collect();
    assert_eq!(warnings.len(), 1, "the static factory has no instance");
    assert_eq!(warnings[0].severity, Severity::Warning);
}

#[test]
fn test_synthesized_constructor_planned_for_types_without_one() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Reader", MoveOptions::default()));
    assert_eq!(ctx.parameter_name, "outer");
    let plan = ctx.into_plan();
    assert!(plan.synthesize_constructor);
    assert!(plan.is_field_mandatory());
}

#[test]
fn test_optional_link_follows_options() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();

    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Plain", MoveOptions::default()));
    assert_eq!(ctx.link, EnclosingLink::Optional);
    assert!(ctx.field.is_some());
    assert!(rewritten(&ws, &ctx, 0).contains("return new Plain(this);"));

    let declined = MoveOptions {
        create_enclosing_field: false,
        ..MoveOptions::default()
    };
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Plain", declined));
    assert!(ctx.field.is_none());
    assert!(rewritten(&ws, &ctx, 0).contains("return new Plain();"));
    assert!(ctx.status.is_empty());
}

#[test]
fn test_mandatory_link_overrides_declined_field() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let declined = MoveOptions {
        create_enclosing_field: false,
        mark_field_final: false,
        ..MoveOptions::default()
    };
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Reader", declined));
    let field = ctx.field.clone().unwrap_or_else(|| panic!("field is mandatory"));
    assert!(!field.is_final);
    let info: Vec<_> = ctx
        .status
        .entries_with_code(diagnostic_codes::ENCLOSING_FIELD_MANDATORY)
        .collect();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].severity, Severity::Info);
}

#[test]
fn test_static_type_has_no_link() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Nested", MoveOptions::default()));
    assert_eq!(ctx.link, EnclosingLink::Unavailable);
    assert!(ctx.field.is_none());
    assert!(ctx.rewrites.units().is_empty());
}

#[test]
fn test_requested_field_names() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let named = |name: &str| MoveOptions {
        enclosing_field_name: Some(name.to_string()),
        ..MoveOptions::default()
    };

    match planned(&ws, &config, &cancel, "p.Outer.Inner", named("class")) {
        Err(Abort::Fatal(status)) => assert!(status.has_code(diagnostic_codes::INVALID_FIELD_NAME)),
        other => panic!("expected fatal, got {other:?}"),
    }

    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Inner", named("Enclosing")));
    assert_eq!(ctx.field.as_ref().map(|f| f.name.as_str()), Some("Enclosing"));
    assert!(ctx.status.has_code(diagnostic_codes::FIELD_NAME_NOT_LOWERCASE));

    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Inner", named("a")));
    assert_eq!(ctx.field.as_ref().map(|f| f.name.as_str()), Some("a1"));
    assert!(ctx.status.has_code(diagnostic_codes::FIELD_NAME_COLLISION));
}

#[test]
fn test_explicit_outer_instance_becomes_argument() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE), ("src/q/User.java", USER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Reader", MoveOptions::default()));

    let user = rewritten(&ws, &ctx, 1);
    assert!(user.contains("return new Reader(o);"), "{user}");
    assert!(user.contains("Sub(Outer o) {\n        super(o);"), "{user}");
    assert!(user.contains("return o.new Plain();"), "other types are untouched");
}

#[test]
fn test_explicit_outer_instance_dropped_without_link() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE), ("src/q/User.java", USER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let declined = MoveOptions {
        create_enclosing_field: false,
        ..MoveOptions::default()
    };
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Plain", declined));
    let user = rewritten(&ws, &ctx, 1);
    assert!(user.contains("return new Plain();"), "{user}");
}

#[test]
fn test_implicit_super_call_is_reported() {
    let ws = workspace(&[("src/p/Outer.java", SIMPLE), ("src/q/User.java", USER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = ok(planned(&ws, &config, &cancel, "p.Outer.Reader", MoveOptions::default()));
    let lazy: Vec<_> = ctx
        .status
        .entries_with_code(diagnostic_codes::IMPLICIT_SUPER_CALL)
        .collect();
    assert_eq!(lazy.len(), 1, "only Lazy relies on an implicit super()");
    assert!(lazy[0].message.contains("Outer.Lazy"));
}

#[test]
fn test_inherited_type_parameters_are_declared() {
    let text = "package p;

class Box<T extends Comparable<T>, U> {
    T first;

    class Cell<V> {
        T get() { return first; }
    }

    class Raw {
        U peek() { return null; }
    }
}
";
    let ws = workspace(&[("src/p/Box.java", text)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();

    let ctx = ok(planned(&ws, &config, &cancel, "p.Box.Cell", MoveOptions::default()));
    let names: Vec<&str> = ctx.inherited_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["T", "U"]);
    assert_eq!(ctx.inherited_params[0].declaration, "T extends Comparable<T>");
    assert_eq!(ctx.field.as_ref().map(|f| f.type_text.as_str()), Some("Box<T, U>"));
    assert!(rewritten(&ws, &ctx, 0).contains("class Cell<T extends Comparable<T>, U, V> {"));

    let ctx = ok(planned(&ws, &config, &cancel, "p.Box.Raw", MoveOptions::default()));
    assert!(rewritten(&ws, &ctx, 0).contains("class Raw<T extends Comparable<T>, U> {"));
}

#[test]
fn test_plan_stops_when_cancelled() {
    let ws = workspace(&[("src/p/Outer.java", OUTER)]);
    let config = RefactoringConfig::default();
    let cancel = CancellationToken::new();
    let ctx = RelocationContext::new(&ws, &config, &cancel, find(&ws, "p.Outer.Inner"), MoveOptions::default())
        .unwrap_or_else(|e| panic!("context failed: {e:?}"));
    cancel.cancel();
    assert!(matches!(ctx.plan(), Err(Abort::Cancelled)));
}
