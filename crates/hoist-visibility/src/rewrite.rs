//! Turns merged adjustments into declaration edits.
//!
//! All adjustments that land on one declaration node are coalesced into a
//! single edit, so two requirements on the same field never produce
//! overlapping edits. A multi-fragment field whose fragments end up with
//! different visibilities is split into one declaration per fragment.

use crate::adjustor::{AccessorKind, AccessorSubstitution, AdjustmentMap};
use hoist_common::{RefactoringConfig, Span, TextEdit, UnitId, apply_text_edits};
use hoist_model::{ModifierFlags, Modifiers, NodeIndex, NodeKind, Program, Tree, Visibility};
use indexmap::IndexMap;
use tracing::trace;

/// Edits writing the required visibility keyword on every adjusted
/// declaration, grouped by unit.
#[must_use]
pub fn declaration_edits(
    program: &dyn Program,
    adjustments: &AdjustmentMap,
    config: &RefactoringConfig,
) -> IndexMap<UnitId, Vec<TextEdit>> {
    let symbols = program.symbols();
    let mut by_node: IndexMap<(UnitId, NodeIndex), Visibility> = IndexMap::new();
    for adjustment in adjustments.iter().filter(|a| a.needs_rewriting) {
        let Some(decl) = symbols[adjustment.target].decl else {
            continue;
        };
        let slot = by_node
            .entry((decl.unit, decl.node))
            .or_insert(adjustment.required);
        *slot = slot.widen(adjustment.required);
    }

    let mut edits: IndexMap<UnitId, Vec<TextEdit>> = IndexMap::new();
    for ((unit, node), required) in by_node {
        let (Some(tree), Some(source)) = (program.tree(unit), program.unit(unit)) else {
            continue;
        };
        let text = source.text.as_str();
        let edit = match tree.kind(node) {
            Some(NodeKind::Field {
                modifiers,
                ty,
                fragments,
            }) => {
                let declared = Visibility::from_flags(modifiers.flags);
                let wanted: Vec<Visibility> = fragments
                    .iter()
                    .map(|f| {
                        symbols
                            .by_decl(unit, *f)
                            .and_then(|id| adjustments.get(id))
                            .filter(|a| a.needs_rewriting)
                            .map_or(declared, |a| a.required)
                    })
                    .collect();
                if wanted.windows(2).all(|w| w[0] == w[1]) {
                    keyword_edit(text, modifiers, tree.span(*ty).start, required)
                } else {
                    split_field(tree, text, node, modifiers, *ty, fragments, &wanted, config)
                }
            }
            Some(NodeKind::Method(decl)) => {
                let fallback = decl
                    .type_params
                    .as_ref()
                    .map(|tp| tp.open)
                    .or_else(|| decl.return_type.map(|t| tree.span(t).start))
                    .unwrap_or(decl.name_span.start);
                keyword_edit(text, &decl.modifiers, fallback, required)
            }
            Some(NodeKind::TypeDecl(decl)) => keyword_edit(text, &decl.modifiers, decl.keyword_span.start, required),
            _ => None,
        };
        if let Some(edit) = edit {
            trace!(unit = unit.0, node = node.0, %required, "declaration edit");
            edits.entry(unit).or_default().push(edit);
        }
    }
    edits
}

/// Replace, remove or insert the visibility keyword so that `modifiers`
/// declare `visibility`. `fallback` is where a keyword goes when the
/// declaration has no modifier keywords at all.
#[must_use]
pub fn keyword_edit(text: &str, modifiers: &Modifiers, fallback: u32, visibility: Visibility) -> Option<TextEdit> {
    let existing = modifiers
        .keywords
        .iter()
        .find(|k| ModifierFlags::VISIBILITY.intersects(k.flag));
    match (existing, visibility.keyword()) {
        (Some(existing), Some(keyword)) => {
            (existing.span.slice(text) != keyword).then(|| TextEdit::replace(existing.span, keyword))
        }
        (Some(existing), None) => {
            let rest = text.get(existing.span.end as usize..).unwrap_or("");
            let trailing = rest.len() - rest.trim_start().len();
            Some(TextEdit::delete(Span::new(
                existing.span.start,
                existing.span.end + trailing as u32,
            )))
        }
        (None, Some(keyword)) => Some(TextEdit::insert(
            modifiers.first_keyword_start().unwrap_or(fallback),
            format!("{keyword} "),
        )),
        (None, None) => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn split_field(
    tree: &Tree,
    text: &str,
    node: NodeIndex,
    modifiers: &Modifiers,
    ty: NodeIndex,
    fragments: &[NodeIndex],
    wanted: &[Visibility],
    config: &RefactoringConfig,
) -> Option<TextEdit> {
    let field = tree.span(node);
    let ty_start = tree.span(ty).start;
    let head = Span::new(field.start, ty_start).slice(text);
    let ty_text = tree.span(ty).slice(text);
    let separator = format!("{}{}", config.line_delimiter, line_indent(text, field.start));

    let mut declarations = Vec::with_capacity(fragments.len());
    for (fragment, visibility) in fragments.iter().zip(wanted) {
        let head = match keyword_edit(text, modifiers, ty_start, *visibility) {
            Some(edit) => {
                let rebased = TextEdit::replace(
                    Span::new(edit.span.start - field.start, edit.span.end - field.start),
                    edit.new_text,
                );
                apply_text_edits(head, &[rebased]).ok()?
            }
            None => head.to_string(),
        };
        declarations.push(format!("{head}{ty_text} {};", tree.span(*fragment).slice(text)));
    }
    Some(TextEdit::replace(field, declarations.join(&separator)))
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(text: &str, offset: u32) -> &str {
    let line_start = text
        .get(..offset as usize)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |i| i + 1);
    let line = text.get(line_start..).unwrap_or("");
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..indent_len]
}

/// Edits turning the field access at `node` into a call of `accessor`:
/// `o.x` becomes `o.getX()`, `o.x = v;` becomes `o.setX(v);`.
///
/// `None` when the site cannot take a call: a setter needs a plain
/// assignment used as a statement.
#[must_use]
pub fn accessor_edits(tree: &Tree, node: NodeIndex, kind: AccessorKind, accessor: &str) -> Option<Vec<TextEdit>> {
    let name = match tree.kind(node)? {
        NodeKind::SimpleName { .. } | NodeKind::FieldAccess { .. } => tree.name_span(node)?,
        _ => return None,
    };
    match kind {
        AccessorKind::Getter => Some(vec![TextEdit::replace(name, format!("{accessor}()"))]),
        AccessorKind::Setter => {
            let assign = tree.parent(node)?;
            let Some(NodeKind::Assign { target, op, value }) = tree.kind(assign) else {
                return None;
            };
            if *target != node || op != "=" {
                return None;
            }
            let statement = tree.parent(assign)?;
            if !matches!(tree.kind(statement), Some(NodeKind::ExpressionStatement { .. })) {
                return None;
            }
            let value = tree.span(*value);
            Some(vec![
                TextEdit::replace(Span::new(name.start, value.start), format!("{accessor}(")),
                TextEdit::insert(value.end, ")"),
            ])
        }
    }
}

/// Accessor edits for every substitution, grouped by unit.
#[must_use]
pub fn substitution_edits(
    program: &dyn Program,
    substitutions: &[AccessorSubstitution],
) -> IndexMap<UnitId, Vec<TextEdit>> {
    let symbols = program.symbols();
    let mut edits: IndexMap<UnitId, Vec<TextEdit>> = IndexMap::new();
    for substitution in substitutions {
        let unit = substitution.location.unit;
        let Some(tree) = program.tree(unit) else {
            continue;
        };
        let accessor = &symbols[substitution.accessor].name;
        if let Some(site) = accessor_edits(tree, substitution.node, substitution.kind, accessor) {
            edits.entry(unit).or_default().extend(site);
        }
    }
    edits
}

#[cfg(test)]
#[path = "../tests/rewrite_tests.rs"]
mod rewrite_tests;
