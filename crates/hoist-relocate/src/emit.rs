//! Edit Emitter.
//!
//! Turns a relocation plan into a change set: one text edit change per
//! affected unit and one unit creation for the moved declaration. Edits
//! that fall inside the moved declaration are rebased onto its text and
//! travel with it; everything else stays with its unit. Every edit list is
//! applied once in memory before it is handed out, so overlapping edits
//! surface as a fatal status instead of a broken change set.

use crate::plan::RelocationPlan;
use hoist_common::messages::diagnostic_messages;
use hoist_common::{
    ApplyError, Change, RefactoringConfig, RefactoringStatus, Span, TextEdit, UnitId,
    apply_text_edits,
};
use hoist_model::{ModifierFlags, NodeIndex, Tree, Visibility, Workspace};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// An edited span whose text, with the edits inside it, is copied to
/// another offset of the same unit.
#[derive(Clone, Debug)]
struct Transfer {
    source: Span,
    target: u32,
    suffix: String,
}

/// Edits collected per unit while a move is planned.
#[derive(Clone, Debug, Default)]
pub(crate) struct UnitRewrites {
    edits: IndexMap<UnitId, Vec<TextEdit>>,
    /// Spans whose own edits are discarded: the text there is removed.
    claimed: FxHashMap<UnitId, Vec<Span>>,
    transfers: FxHashMap<UnitId, Vec<Transfer>>,
    imports: IndexMap<UnitId, Vec<String>>,
}

impl UnitRewrites {
    pub(crate) fn push(&mut self, unit: UnitId, edit: TextEdit) {
        self.edits.entry(unit).or_default().push(edit);
    }

    pub(crate) fn extend(&mut self, unit: UnitId, edits: impl IntoIterator<Item = TextEdit>) {
        self.edits.entry(unit).or_default().extend(edits);
    }

    pub(crate) fn claim(&mut self, unit: UnitId, span: Span) {
        self.claimed.entry(unit).or_default().push(span);
    }

    /// Copy `source`, as rewritten, to `target` followed by `suffix`. The
    /// caller removes the original text.
    pub(crate) fn transfer(&mut self, unit: UnitId, source: Span, target: u32, suffix: &str) {
        self.claim(unit, source);
        self.transfers.entry(unit).or_default().push(Transfer {
            source,
            target,
            suffix: suffix.to_string(),
        });
    }

    pub(crate) fn add_import(&mut self, unit: UnitId, name: String) {
        let imports = self.imports.entry(unit).or_default();
        if !imports.contains(&name) {
            imports.push(name);
        }
    }

    pub(crate) fn imports(&self, unit: UnitId) -> &[String] {
        self.imports.get(&unit).map(Vec::as_slice).unwrap_or_default()
    }

    /// Units with edits or imports, in first-touched order.
    pub(crate) fn units(&self) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = self.edits.keys().copied().collect();
        for unit in self.imports.keys() {
            if !units.contains(unit) {
                units.push(*unit);
            }
        }
        units
    }

    /// Final edits of `unit`: claimed spans lose their inner edits, and
    /// transferred spans reappear at their targets with those edits applied.
    pub(crate) fn settled(&self, unit: UnitId, text: &str) -> Vec<TextEdit> {
        let all = self.edits.get(&unit).map(Vec::as_slice).unwrap_or_default();
        let claimed = self.claimed.get(&unit).map(Vec::as_slice).unwrap_or_default();
        let inside = |edit: &TextEdit, span: &Span| span.contains_span(edit.span);
        let mut settled: Vec<TextEdit> = all
            .iter()
            .filter(|e| !claimed.iter().any(|c| inside(e, c)))
            .cloned()
            .collect();
        for transfer in self.transfers.get(&unit).into_iter().flatten() {
            let nested: Vec<TextEdit> = all
                .iter()
                .filter(|e| inside(e, &transfer.source))
                .map(|e| rebase(e, transfer.source.start))
                .collect();
            let original = transfer.source.slice(text);
            let moved = apply_text_edits(original, &nested).unwrap_or_else(|_| original.to_string());
            settled.push(TextEdit::insert(
                transfer.target,
                format!("{moved}{}", transfer.suffix),
            ));
        }
        settled
    }
}

// =============================================================================
// Emitter
// =============================================================================

pub(crate) struct Emitter<'a> {
    workspace: &'a dyn Workspace,
    config: &'a RefactoringConfig,
    plan: &'a RelocationPlan,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(workspace: &'a dyn Workspace, config: &'a RefactoringConfig, plan: &'a RelocationPlan) -> Self {
        Self {
            workspace,
            config,
            plan,
        }
    }

    pub(crate) fn changes(&self) -> Result<Vec<Change>, RefactoringStatus> {
        let workspace = self.workspace;
        let plan = self.plan;
        let (Some(source), Some(tree)) = (workspace.unit(plan.unit), workspace.tree(plan.unit)) else {
            return Err(apply_failed(&ApplyError::UnknownUnit(plan.unit)));
        };
        let text = source.text.as_str();
        let decl_span = tree.span(plan.decl_node);
        let slice = Span::new(leading_doc_start(text, decl_span.start), decl_span.end);

        let mut units = plan.rewrites.units();
        if !units.contains(&plan.unit) {
            units.push(plan.unit);
        }
        units.sort();

        let mut changes = Vec::new();
        let mut declaration = String::new();
        for unit in units {
            let (Some(unit_source), Some(unit_tree)) = (workspace.unit(unit), workspace.tree(unit)) else {
                return Err(apply_failed(&ApplyError::UnknownUnit(unit)));
            };
            let mut edits = plan.rewrites.settled(unit, &unit_source.text);
            if unit == plan.unit {
                let (inside, outside): (Vec<TextEdit>, Vec<TextEdit>) =
                    edits.into_iter().partition(|e| slice.contains_span(e.span));
                declaration = self.relocated_declaration(tree, text, slice, inside)?;
                edits = outside;
                edits.push(TextEdit::delete(removal_span(text, slice)));
            }
            edits.extend(import_edit(
                unit_tree,
                plan.rewrites.imports(unit),
                &self.config.line_delimiter,
            ));
            if edits.is_empty() {
                continue;
            }
            apply_text_edits(&unit_source.text, &edits).map_err(|e| apply_failed(&e))?;
            trace!(unit = unit.0, edits = edits.len(), "unit edits verified");
            let change = workspace
                .create_text_edit(unit, edits)
                .ok_or_else(|| apply_failed(&ApplyError::UnknownUnit(unit)))?;
            changes.push(change);
        }

        changes.push(Change::Create {
            path: plan.new_unit_path.clone(),
            contents: self.new_unit_text(&declaration),
        });
        debug!(changes = changes.len(), path = %plan.new_unit_path.display(), "change set emitted");
        Ok(changes)
    }

    /// The moved declaration as it reads in the new unit.
    fn relocated_declaration(
        &self,
        tree: &Tree,
        text: &str,
        slice: Span,
        inside: Vec<TextEdit>,
    ) -> Result<String, RefactoringStatus> {
        let mut edits: Vec<TextEdit> = inside.iter().map(|e| rebase(e, slice.start)).collect();
        edits.extend(self.modifier_edits(tree, text).iter().map(|e| rebase(e, slice.start)));
        if let Some(members) = self.link_members(tree, text) {
            edits.push(rebase(&members, slice.start));
        }
        let rewritten = apply_text_edits(slice.slice(text), &edits).map_err(|e| apply_failed(&e))?;
        Ok(deindent(&rewritten, line_indent(text, slice.start)))
    }

    /// Drop `static`, `private` and `protected`; write `public` when the
    /// type ends up public.
    fn modifier_edits(&self, tree: &Tree, text: &str) -> Vec<TextEdit> {
        let Some(decl) = tree.type_decl(self.plan.decl_node) else {
            return Vec::new();
        };
        let public = self.plan.top_level_visibility == Visibility::Public;
        let dropped = ModifierFlags::STATIC | ModifierFlags::PRIVATE | ModifierFlags::PROTECTED;
        let mut edits: Vec<TextEdit> = decl
            .modifiers
            .keywords
            .iter()
            .filter(|k| k.flag.intersects(dropped) || (k.flag == ModifierFlags::PUBLIC && !public))
            .map(|k| TextEdit::delete(with_trailing_space(text, k.span)))
            .collect();
        if public && !decl.modifiers.flags.contains(ModifierFlags::PUBLIC) {
            let at = decl
                .modifiers
                .first_keyword_start()
                .unwrap_or(decl.keyword_span.start);
            edits.push(TextEdit::insert(at, "public "));
        }
        edits
    }

    /// The enclosing-instance field, and a constructor for types that had
    /// none, at the top of the type body.
    fn link_members(&self, tree: &Tree, text: &str) -> Option<TextEdit> {
        let plan = self.plan;
        let field = plan.enclosing_field.as_ref()?;
        let decl = tree.type_decl(plan.decl_node)?;
        let config = self.config;
        let nl = config.line_delimiter.as_str();
        let unit = config.indent_unit.as_str();
        let decl_indent = line_indent(text, tree.span(plan.decl_node).start);
        let body = &decl.body;
        let indent = member_indent(tree, text, body.open, body.items.first().copied())
            .unwrap_or_else(|| format!("{decl_indent}{unit}"));

        let mut lines = Vec::new();
        if config.generate_comments {
            lines.push(format!("{indent}/** The enclosing {} instance. */", field.type_text));
        }
        let modifier = if field.is_final { "final " } else { "" };
        lines.push(format!("{indent}private {modifier}{} {};", field.type_text, field.name));
        if plan.synthesize_constructor {
            let parameter = &plan.constructor_parameter_name;
            let assignment = if config.use_this_qualifier || field.name == *parameter {
                format!("this.{} = {parameter};", field.name)
            } else {
                format!("{} = {parameter};", field.name)
            };
            let visibility = plan
                .top_level_visibility
                .keyword()
                .map(|k| format!("{k} "))
                .unwrap_or_default();
            lines.push(String::new());
            if config.generate_comments {
                lines.push(format!("{indent}/** @param {parameter} the enclosing instance */"));
            }
            lines.push(format!(
                "{indent}{visibility}{}({} {parameter}) {{",
                plan.type_name, field.type_text
            ));
            lines.push(format!("{indent}{unit}{assignment}"));
            lines.push(format!("{indent}}}"));
        }
        let block = lines.join(nl);

        let inner = Span::new(body.open + 1, body.close);
        let contents = inner.slice(text);
        if contents.trim().is_empty() {
            return Some(TextEdit::replace(inner, format!("{nl}{block}{nl}{decl_indent}")));
        }
        let rest = contents.trim_start_matches([' ', '\t']);
        if rest.starts_with(['\n', '\r']) {
            Some(TextEdit::insert(body.open + 1, format!("{nl}{block}{nl}")))
        } else {
            // The first member shares the line of `{`; move it onto its own.
            let gap = Span::new(body.open + 1, body.open + 1 + (contents.len() - rest.len()) as u32);
            Some(TextEdit::replace(gap, format!("{nl}{block}{nl}{nl}{indent}")))
        }
    }

    fn new_unit_text(&self, declaration: &str) -> String {
        let nl = self.config.line_delimiter.as_str();
        let mut out = String::new();
        if !self.plan.destination_package.is_empty() {
            out.push_str(&format!("package {};{nl}{nl}", self.plan.destination_package));
        }
        if !self.plan.new_unit_imports.is_empty() {
            for import in &self.plan.new_unit_imports {
                out.push_str(&format!("import {import};{nl}"));
            }
            out.push_str(nl);
        }
        out.push_str(declaration);
        out.push_str(nl);
        out
    }
}

// =============================================================================
// Text helpers
// =============================================================================

pub(crate) fn apply_failed(error: &ApplyError) -> RefactoringStatus {
    RefactoringStatus::from_message(&diagnostic_messages::APPLY_FAILED, &[&error.to_string()], None)
}

fn rebase(edit: &TextEdit, origin: u32) -> TextEdit {
    TextEdit {
        span: Span::new(edit.span.start - origin, edit.span.end - origin),
        new_text: edit.new_text.clone(),
    }
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn line_indent(text: &str, offset: u32) -> &str {
    let offset = (offset as usize).min(text.len());
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Indentation of the first member when it sits on its own line.
fn member_indent(tree: &Tree, text: &str, open: u32, first: Option<NodeIndex>) -> Option<String> {
    let start = tree.span(first?).start;
    let between = text.get(open as usize..start as usize)?;
    between
        .contains('\n')
        .then(|| line_indent(text, start).to_string())
}

/// `span` widened to whole lines when nothing else shares them, including
/// the line break after it.
pub(crate) fn line_extent(text: &str, span: Span) -> Span {
    let mut start = span.start as usize;
    let mut end = span.end as usize;
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    if text[line_start..start].trim().is_empty() {
        start = line_start;
    }
    let rest = &text[end..];
    match rest.find('\n') {
        Some(i) if rest[..i].trim().is_empty() => end += i + 1,
        None if rest.trim().is_empty() => end = text.len(),
        _ => {}
    }
    Span::new(start as u32, end as u32)
}

/// Text removed from the original unit: the declaration's lines and one
/// blank line above them.
fn removal_span(text: &str, slice: Span) -> Span {
    let mut span = line_extent(text, slice);
    let start = span.start as usize;
    if start > 0 && text.as_bytes().get(start - 1) == Some(&b'\n') {
        let prev_start = text[..start - 1].rfind('\n').map_or(0, |i| i + 1);
        if prev_start > 0 && text[prev_start..start - 1].trim().is_empty() {
            span.start = prev_start as u32;
        }
    }
    span
}

/// Start of a `/** ... */` comment directly above `start`, or `start`.
fn leading_doc_start(text: &str, start: u32) -> u32 {
    let before = text[..start as usize].trim_end();
    if before.ends_with("*/")
        && let Some(open) = before.rfind("/**")
    {
        let line_start = before[..open].rfind('\n').map_or(0, |i| i + 1);
        if before[line_start..open].trim().is_empty() {
            return open as u32;
        }
    }
    start
}

fn with_trailing_space(text: &str, span: Span) -> Span {
    let rest = &text[span.end as usize..];
    let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    Span::new(span.start, span.end + width as u32)
}

/// Strip `indent` (or as much leading whitespace as a line has, if less)
/// from every line after the first.
fn deindent(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    let mut lines = text.split('\n');
    let mut out = String::with_capacity(text.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        let leading = line.len() - line.trim_start_matches([' ', '\t']).len();
        out.push_str(&line[leading.min(indent.len())..]);
    }
    out
}

fn import_edit(tree: &Tree, imports: &[String], nl: &str) -> Option<TextEdit> {
    if imports.is_empty() {
        return None;
    }
    let lines: Vec<String> = imports.iter().map(|i| format!("import {i};")).collect();
    if let Some(&last) = tree.imports().last() {
        let text: String = lines.iter().map(|l| format!("{nl}{l}")).collect();
        return Some(TextEdit::insert(tree.span(last).end, text));
    }
    if let Some(package) = tree.package_decl() {
        return Some(TextEdit::insert(
            tree.span(package).end,
            format!("{nl}{nl}{}", lines.join(nl)),
        ));
    }
    Some(TextEdit::insert(0, format!("{}{nl}{nl}", lines.join(nl))))
}

#[cfg(test)]
#[path = "../tests/emit_tests.rs"]
mod emit_tests;
