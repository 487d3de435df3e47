use super::*;

fn apply(text: &str, edits: &[TextEdit]) -> String {
    apply_text_edits(text, edits).unwrap_or_else(|e| panic!("edits failed: {e}"))
}

fn span_of(text: &str, needle: &str) -> Span {
    let start = text.find(needle).unwrap_or_else(|| panic!("{needle} not found")) as u32;
    Span::new(start, start + needle.len() as u32)
}

#[test]
fn test_line_indent() {
    let text = "class A {\n    int x;\n\tint y;\n}";
    assert_eq!(line_indent(text, 0), "");
    assert_eq!(line_indent(text, span_of(text, "x").start), "    ");
    assert_eq!(line_indent(text, span_of(text, "y").start), "\t");
}

#[test]
fn test_line_extent_takes_whole_lines_only() {
    let text = "a;\n    import x;\nb; import y;\n";
    let own_line = line_extent(text, span_of(text, "import x;"));
    assert_eq!(own_line.slice(text), "    import x;\n");

    let shared = line_extent(text, span_of(text, "import y;"));
    assert_eq!(shared.slice(text), "import y;\n");

    let last = "a;\nimport z;";
    assert_eq!(line_extent(last, span_of(last, "import z;")).slice(last), "import z;");
}

#[test]
fn test_removal_span_swallows_blank_line_above() {
    let text = "class A {\n    int x;\n\n    class B {\n    }\n\n    int y;\n}\n";
    let decl = Span::new(span_of(text, "class B").start, span_of(text, "    }\n\n    int").start + 5);
    let removed = removal_span(text, decl);
    assert_eq!(apply(text, &[TextEdit::delete(removed)]), "class A {\n    int x;\n\n    int y;\n}\n");
}

#[test]
fn test_leading_doc_comment_travels() {
    let text = "class A {\n    /** Docs. */\n    class B {}\n    int x; /** trailing */ class C {}\n}";
    let b = span_of(text, "class B").start;
    assert_eq!(leading_doc_start(text, b), span_of(text, "/** Docs. */").start);
    let c = span_of(text, "class C").start;
    assert_eq!(leading_doc_start(text, c), c, "comment shares its line with code");
}

#[test]
fn test_deindent_strips_common_prefix() {
    let text = "class B {\n        int x;\n      int y;\n    }";
    assert_eq!(deindent(text, "    "), "class B {\n    int x;\n  int y;\n}");
    assert_eq!(deindent("a\n  b", ""), "a\n  b");
}

#[test]
fn test_with_trailing_space() {
    let text = "private  static class B";
    let span = with_trailing_space(text, span_of(text, "private"));
    assert_eq!(span.slice(text), "private  ");
}

#[test]
fn test_settled_drops_edits_in_claimed_spans() {
    let text = "f(o.new B());";
    let unit = UnitId(0);
    let outer = span_of(text, "o");
    let mut rewrites = UnitRewrites::default();
    rewrites.push(unit, TextEdit::insert(outer.start, "x."));
    rewrites.push(unit, TextEdit::delete(Span::new(outer.start, outer.end + 1)));
    rewrites.claim(unit, outer);
    assert_eq!(apply(text, &rewrites.settled(unit, text)), "f(new B());");
}

#[test]
fn test_settled_transfers_rewritten_source() {
    let text = "f(o.new B(1));";
    let unit = UnitId(0);
    let outer = span_of(text, "o");
    let args_start = span_of(text, "1").start;
    let mut rewrites = UnitRewrites::default();
    rewrites.push(unit, TextEdit::insert(outer.start, "this."));
    rewrites.push(unit, TextEdit::delete(Span::new(outer.start, outer.end + 1)));
    rewrites.transfer(unit, outer, args_start, ", ");
    assert_eq!(apply(text, &rewrites.settled(unit, text)), "f(new B(this.o, 1));");
}

#[test]
fn test_rewrites_track_units_and_imports() {
    let mut rewrites = UnitRewrites::default();
    rewrites.add_import(UnitId(2), "p.B".to_string());
    rewrites.add_import(UnitId(2), "p.B".to_string());
    rewrites.push(UnitId(1), TextEdit::insert(0, "x"));
    assert_eq!(rewrites.imports(UnitId(2)), ["p.B".to_string()]);
    assert!(rewrites.imports(UnitId(1)).is_empty());
    assert_eq!(rewrites.units(), vec![UnitId(1), UnitId(2)]);
}

#[test]
fn test_rebase_shifts_offsets() {
    let edit = TextEdit::replace(Span::new(10, 12), "y");
    assert_eq!(rebase(&edit, 4).span, Span::new(6, 8));
}

#[test]
fn test_apply_failed_carries_reason() {
    let status = apply_failed(&ApplyError::UnknownUnit(UnitId(9)));
    assert!(status.has_fatal());
    assert!(status.entries()[0].message.contains("unit#9"));
}
