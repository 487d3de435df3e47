use super::*;

/// `x = this.y;` built by hand.
fn assignment_tree() -> (Tree, NodeIndex, NodeIndex) {
    let mut tree = Tree::new(UnitId(0));
    let x = tree.add(
        NodeKind::SimpleName {
            name: "x".to_string(),
        },
        Span::new(0, 1),
    );
    let this = tree.add(NodeKind::This { qualifier: None }, Span::new(4, 8));
    let access = tree.add(
        NodeKind::FieldAccess {
            receiver: this,
            name: "y".to_string(),
            name_span: Span::new(9, 10),
        },
        Span::new(4, 10),
    );
    let assign = tree.add(
        NodeKind::Assign {
            target: x,
            op: "=".to_string(),
            value: access,
        },
        Span::new(0, 10),
    );
    let stmt = tree.add(NodeKind::ExpressionStatement { expr: assign }, Span::new(0, 11));
    tree.finish(stmt);
    (tree, this, assign)
}

#[test]
fn test_finish_links_parents() {
    let (tree, this, assign) = assignment_tree();
    let chain: Vec<NodeIndex> = tree.ancestors(this).collect();
    assert_eq!(chain.len(), 3, "FieldAccess, Assign, ExpressionStatement");
    assert_eq!(chain[1], assign);
    assert_eq!(tree.parent(tree.root), None);
    assert!(tree.is_ancestor(assign, this));
    assert!(!tree.is_ancestor(this, assign));
}

#[test]
fn test_descendants_are_preorder() {
    let (tree, this, _) = assignment_tree();
    let order: Vec<u32> = tree.descendants(tree.root).iter().map(|n| n.0).collect();
    assert_eq!(order, vec![4, 3, 0, 2, this.0]);
}

#[test]
fn test_dotted_name_of_type_ref_chain() {
    let mut tree = Tree::new(UnitId(0));
    let p = tree.add(
        NodeKind::TypeRef {
            qualifier: None,
            name: "p".to_string(),
            name_span: Span::new(0, 1),
            args: None,
            dims: 0,
        },
        Span::new(0, 1),
    );
    let outer = tree.add(
        NodeKind::TypeRef {
            qualifier: Some(p),
            name: "Outer".to_string(),
            name_span: Span::new(2, 7),
            args: None,
            dims: 0,
        },
        Span::new(0, 7),
    );
    tree.finish(outer);
    assert_eq!(tree.dotted_name(outer), "p.Outer");
    assert_eq!(tree.dotted_name(p), "p");
}

#[test]
fn test_modifier_keyword_lookup() {
    let modifiers = Modifiers {
        flags: ModifierFlags::PRIVATE | ModifierFlags::STATIC,
        keywords: vec![
            ModifierKeyword {
                flag: ModifierFlags::PRIVATE,
                span: Span::new(4, 11),
            },
            ModifierKeyword {
                flag: ModifierFlags::STATIC,
                span: Span::new(12, 18),
            },
        ],
        annotations: Vec::new(),
    };
    assert_eq!(
        modifiers.keyword_span(ModifierFlags::STATIC),
        Some(Span::new(12, 18))
    );
    assert_eq!(modifiers.keyword_span(ModifierFlags::PUBLIC), None);
    assert_eq!(modifiers.first_keyword_start(), Some(4));
}
