use super::*;
use crate::adjustor::VisibilityAdjustment;
use hoist_common::{Severity, StatusEntry};
use hoist_frontend::InMemoryWorkspace;
use hoist_model::SymbolId;

const DECLS: &str = "package p;

public class Decls {
    private int x;
    @Deprecated static int z;
    private int a, b;
    protected int c, d;

    void run() {}
    <T> T id(T t) { return t; }

    static class Box {}
}
";

fn workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::from_sources([("src/p/Decls.java", DECLS)])
        .unwrap_or_else(|e| panic!("workspace failed: {e}"))
}

fn find(ws: &InMemoryWorkspace, name: &str) -> SymbolId {
    ws.find_symbol(name).unwrap_or_else(|| panic!("{name} not found"))
}

fn widen(ws: &InMemoryWorkspace, name: &str, required: Visibility) -> VisibilityAdjustment {
    let target = find(ws, name);
    VisibilityAdjustment {
        target,
        current: Visibility::from_flags(ws.symbols()[target].flags),
        required,
        needs_rewriting: true,
        rationale: StatusEntry {
            severity: Severity::Warning,
            code: 0,
            message: String::new(),
            location: None,
        },
    }
}

fn rewritten(ws: &InMemoryWorkspace, adjustments: &[VisibilityAdjustment]) -> (String, usize) {
    let mut map = AdjustmentMap::new();
    for adjustment in adjustments {
        map.merge(adjustment.clone());
    }
    let edits = declaration_edits(ws, &map, &RefactoringConfig::default());
    let unit_edits = edits.get(&UnitId(0)).cloned().unwrap_or_default();
    let text = apply_text_edits(DECLS, &unit_edits).expect("edits apply");
    (text, unit_edits.len())
}

#[test]
fn test_existing_keyword_is_replaced() {
    let ws = workspace();
    let (text, count) = rewritten(&ws, &[widen(&ws, "p.Decls#x", Visibility::Protected)]);
    assert!(text.contains("    protected int x;\n"));
    assert_eq!(count, 1);
}

#[test]
fn test_keyword_is_removed_for_package_default() {
    let ws = workspace();
    let (text, _) = rewritten(&ws, &[widen(&ws, "p.Decls#x", Visibility::PackageDefault)]);
    assert!(text.contains("\n    int x;\n"));
}

#[test]
fn test_keyword_goes_after_annotations_and_before_other_modifiers() {
    let ws = workspace();
    let (text, _) = rewritten(&ws, &[widen(&ws, "p.Decls#z", Visibility::Public)]);
    assert!(text.contains("@Deprecated public static int z;"));
}

#[test]
fn test_declarations_without_modifiers_use_their_start() {
    let ws = workspace();
    let (text, count) = rewritten(
        &ws,
        &[
            widen(&ws, "p.Decls#run", Visibility::Protected),
            widen(&ws, "p.Decls#id", Visibility::Public),
            widen(&ws, "p.Decls.Box", Visibility::Public),
        ],
    );
    assert_eq!(count, 3);
    assert!(text.contains("    protected void run() {}"));
    assert!(text.contains("    public <T> T id(T t)"));
    assert!(text.contains("    public static class Box {}"));
}

#[test]
fn test_fragments_of_one_field_coalesce_into_one_edit() {
    let ws = workspace();
    let (text, count) = rewritten(
        &ws,
        &[
            widen(&ws, "p.Decls#a", Visibility::Protected),
            widen(&ws, "p.Decls#b", Visibility::Protected),
        ],
    );
    assert_eq!(count, 1);
    assert!(text.contains("    protected int a, b;"));
}

#[test]
fn test_fragments_with_different_visibility_are_split() {
    let ws = workspace();
    let (text, count) = rewritten(&ws, &[widen(&ws, "p.Decls#a", Visibility::PackageDefault)]);
    assert_eq!(count, 1);
    assert!(text.contains("\n    int a;\n    private int b;\n"), "{text}");

    let (text, _) = rewritten(&ws, &[widen(&ws, "p.Decls#d", Visibility::Public)]);
    assert!(text.contains("\n    protected int c;\n    public int d;\n"), "{text}");
}

#[test]
fn test_non_rewriting_adjustments_produce_no_edits() {
    let ws = workspace();
    let mut adjustment = widen(&ws, "p.Decls#x", Visibility::Public);
    adjustment.needs_rewriting = false;
    let (text, count) = rewritten(&ws, &[adjustment]);
    assert_eq!(count, 0);
    assert_eq!(text, DECLS);
}

#[test]
fn test_keyword_edit_leaves_matching_keyword_alone() {
    let ws = workspace();
    let x = find(&ws, "p.Decls#x");
    let decl = ws.symbols()[x].decl.expect("declared");
    let tree = ws.tree(decl.unit).expect("tree");
    let Some(NodeKind::Field { modifiers, .. }) = tree.kind(decl.node) else {
        panic!("expected a field");
    };
    assert_eq!(keyword_edit(DECLS, modifiers, 0, Visibility::Private), None);
}

const ACCESS: &str = "package p;

class Access {
    int value;

    void sites(Access o) {
        int v = o.value;
        o.value = 3;
        o.value += 1;
        take(o.value = 4);
    }

    void take(int v) {}
}
";

fn value_accesses(tree: &Tree) -> Vec<NodeIndex> {
    tree.indices()
        .filter(|n| matches!(tree.kind(*n), Some(NodeKind::FieldAccess { name, .. }) if name == "value"))
        .collect()
}

#[test]
fn test_accessor_edits_for_reads_and_statement_writes() {
    let ws = InMemoryWorkspace::from_sources([("src/p/Access.java", ACCESS)])
        .unwrap_or_else(|e| panic!("workspace failed: {e}"));
    let tree = ws.tree(UnitId(0)).expect("tree");
    let sites = value_accesses(tree);
    assert_eq!(sites.len(), 4);

    let getter = accessor_edits(tree, sites[0], AccessorKind::Getter, "getValue").expect("getter");
    let text = apply_text_edits(ACCESS, &getter).expect("applies");
    assert!(text.contains("int v = o.getValue();"));

    let setter = accessor_edits(tree, sites[1], AccessorKind::Setter, "setValue").expect("setter");
    let text = apply_text_edits(ACCESS, &setter).expect("applies");
    assert!(text.contains("        o.setValue(3);\n"));
}

#[test]
fn test_setter_needs_plain_assignment_statement() {
    let ws = InMemoryWorkspace::from_sources([("src/p/Access.java", ACCESS)])
        .unwrap_or_else(|e| panic!("workspace failed: {e}"));
    let tree = ws.tree(UnitId(0)).expect("tree");
    let sites = value_accesses(tree);
    assert_eq!(accessor_edits(tree, sites[0], AccessorKind::Setter, "setValue"), None, "a read");
    assert_eq!(accessor_edits(tree, sites[2], AccessorKind::Setter, "setValue"), None, "compound");
    assert_eq!(accessor_edits(tree, sites[3], AccessorKind::Setter, "setValue"), None, "an argument");
}
