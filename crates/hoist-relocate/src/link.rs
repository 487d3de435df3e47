//! The enclosing-instance link.
//!
//! An inner type reaches its enclosing instance implicitly. At top level it
//! needs a field for it, a constructor parameter that fills the field, and
//! creation sites that pass the instance explicitly. Type parameters of
//! enclosing types that the inner type used implicitly become its own.

use crate::context::{Abort, RelocationContext, Stage, innermost_type_decl};
use crate::emit::line_indent;
use crate::naming;
use crate::plan::{EnclosingLink, InheritedParam, SynthesizedField};
use hoist_common::messages::diagnostic_messages;
use hoist_common::{Location, Span, TextEdit, UnitId};
use hoist_model::{
    CallKind, Delimited, MethodDecl, ModifierFlags, NodeIndex, NodeKind, ReferenceFilter,
    ReferenceKinds, SearchScope, Staticness, SymbolId, Tree, TypeKind,
};
use hoist_visibility::display_name;
use tracing::{debug, trace};

impl<'a> RelocationContext<'a> {
    /// Decide the link, then thread it through declarations and creations.
    pub(crate) fn plan(mut self) -> Result<Self, Abort> {
        self.enter(Stage::Plan)?;
        self.inherited_params = self.collect_inherited_params();
        self.declare_inherited_params();

        let create = match self.link {
            EnclosingLink::Mandatory => {
                if !self.options.create_enclosing_field {
                    let symbols = self.symbols();
                    let location = Some(self.moved_location());
                    self.status.add_message(
                        &diagnostic_messages::ENCLOSING_FIELD_MANDATORY,
                        &[
                            &display_name(symbols, self.moved),
                            &display_name(symbols, self.enclosing),
                        ],
                        location,
                    );
                }
                true
            }
            EnclosingLink::Optional => self.options.create_enclosing_field,
            EnclosingLink::Unavailable => false,
        };

        if create {
            let name = self.choose_field_name()?;
            self.parameter_name = self.choose_parameter_name(&name);
            self.field = Some(SynthesizedField {
                name,
                type_text: self.enclosing_type_text(),
                is_final: self.options.mark_field_final,
            });
            let location = self.moved_location();
            self.introduce_qualifier(self.enclosing, location);
            self.thread_constructors();
            self.warn_implicit_super_calls()?;
        }
        debug!(
            field = ?self.field.as_ref().map(|f| f.name.as_str()),
            parameter = %self.parameter_name,
            inherited = self.inherited_params.len(),
            "link planned"
        );
        self.rewrite_creations()?;
        Ok(self)
    }

    pub(crate) fn moved_location(&self) -> Location {
        let span = self
            .tree
            .decl_name_span(self.decl_node)
            .unwrap_or_else(|| self.moved_span());
        Location::new(self.unit, span)
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Type parameters of enclosing types visible in the moved type,
    /// outermost first. A static type sees none of its enclosing types'
    /// parameters; the moved type's own parameters shadow same-named ones.
    fn collect_inherited_params(&self) -> Vec<InheritedParam> {
        let symbols = self.symbols();
        if symbols.is_static(self.moved) {
            return Vec::new();
        }
        let mut groups = Vec::new();
        for ty in symbols.enclosing_chain(self.moved) {
            groups.push(self.declared_params(ty));
            if symbols.is_static(ty) {
                break;
            }
        }
        let own = &symbols[self.moved].type_params;
        let mut inherited: Vec<InheritedParam> = Vec::new();
        for param in groups.into_iter().rev().flatten() {
            if own.contains(&param.name) {
                continue;
            }
            inherited.retain(|p| p.name != param.name);
            inherited.push(param);
        }
        inherited
    }

    fn declared_params(&self, ty: SymbolId) -> Vec<InheritedParam> {
        let Some(decl) = self.symbols()[ty].decl else {
            return Vec::new();
        };
        let (Some(tree), Some(source)) = (self.workspace.tree(decl.unit), self.workspace.unit(decl.unit))
        else {
            return Vec::new();
        };
        let Some(type_params) = tree.type_decl(decl.node).and_then(|d| d.type_params.as_ref()) else {
            return Vec::new();
        };
        type_params
            .items
            .iter()
            .filter_map(|&p| match tree.kind(p) {
                Some(NodeKind::TypeParam { name, .. }) => Some(InheritedParam {
                    name: name.clone(),
                    declaration: tree.span(p).slice(&source.text).to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    fn declare_inherited_params(&mut self) {
        if self.inherited_params.is_empty() {
            return;
        }
        let Some(decl) = self.tree.type_decl(self.decl_node) else {
            return;
        };
        let list = self
            .inherited_params
            .iter()
            .map(|p| p.declaration.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let edit = match &decl.type_params {
            Some(existing) => TextEdit::insert(existing.inner_start(), format!("{list}, ")),
            None => TextEdit::insert(decl.name_span.end, format!("<{list}>")),
        };
        self.rewrites.push(self.unit, edit);
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// The enclosing type as the field declares it: `Outer` or `Outer<T>`.
    fn enclosing_type_text(&self) -> String {
        let symbols = self.symbols();
        let path = symbols.type_path(self.enclosing);
        let params = &symbols[self.enclosing].type_params;
        if params.is_empty() {
            path
        } else {
            format!("{path}<{}>", params.join(", "))
        }
    }

    fn choose_field_name(&mut self) -> Result<String, Abort> {
        let symbols = self.symbols();
        let moved = self.moved;
        let taken = |name: &str| symbols.fields(moved).any(|f| symbols[f].name == name);
        let location = Some(self.moved_location());

        let Some(requested) = self.options.enclosing_field_name.clone() else {
            let base = naming::base_name(&symbols[self.enclosing].name);
            return Ok(naming::unique_name(&self.config.naming.field_name(&base), taken));
        };
        if !naming::is_identifier(&requested) {
            return Err(Abort::fatal(
                &diagnostic_messages::INVALID_FIELD_NAME,
                &[&requested],
                location,
            ));
        }
        if !naming::starts_lowercase(&requested) {
            self.status
                .add_message(&diagnostic_messages::FIELD_NAME_NOT_LOWERCASE, &[&requested], location);
        }
        if !taken(&requested) {
            return Ok(requested);
        }
        let fallback = naming::unique_name(&requested, taken);
        self.status.add_message(
            &diagnostic_messages::FIELD_NAME_COLLISION,
            &[&requested, &display_name(symbols, moved), &fallback],
            location,
        );
        Ok(fallback)
    }

    fn choose_parameter_name(&mut self, field: &str) -> String {
        let config = self.config;
        let base = config
            .naming
            .parameter_name(config.naming.strip_field_affixes(field));
        let used = self.constructor_parameter_names();
        let name = naming::unique_name(&base, |n| used.iter().any(|u| u == n));
        if name != base && used.contains(&base) {
            let location = Some(self.moved_location());
            self.status.add_message(
                &diagnostic_messages::PARAMETER_NAME_COLLISION,
                &[&base, &display_name(self.symbols(), self.moved), &name],
                location,
            );
        }
        name
    }

    fn constructor_parameter_names(&self) -> Vec<String> {
        let symbols = self.symbols();
        let tree = self.tree;
        symbols
            .constructors(self.moved)
            .filter_map(|ctor| symbols[ctor].decl)
            .filter_map(|decl| tree.method_decl(decl.node))
            .flat_map(|method| parameter_names(tree, method))
            .collect()
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Add the enclosing-instance parameter to every constructor and assign
    /// it to the field. Constructors delegating through `this(..)` forward
    /// the parameter instead.
    fn thread_constructors(&mut self) {
        let Some(field) = self.field.clone() else {
            return;
        };
        let symbols = self.symbols();
        let tree = self.tree;
        let text = self.text;
        let nl = self.config.line_delimiter.clone();
        let parameter = self.parameter_name.clone();
        let declared = format!("{} {parameter}", field.type_text);

        let ctors: Vec<SymbolId> = symbols.constructors(self.moved).collect();
        for ctor in ctors {
            let Some(decl) = symbols[ctor].decl else {
                continue;
            };
            let Some(method) = tree.method_decl(decl.node) else {
                continue;
            };
            let inserted = if method.params.is_empty() {
                declared.clone()
            } else {
                format!("{declared}, ")
            };
            self.rewrites
                .push(self.unit, TextEdit::insert(method.params.inner_start(), inserted));

            let Some(body) = method.body else {
                continue;
            };
            let Some(NodeKind::Block { statements }) = tree.kind(body) else {
                continue;
            };
            let assignment = self.assignment(&field.name, &parameter, tree, method);
            let body_span = tree.span(body);
            let ctor_indent = line_indent(text, tree.span(decl.node).start);
            let edit = match statements.first().map(|&s| (s, tree.kind(s))) {
                Some((_, Some(NodeKind::ConstructorCall { kind: CallKind::This, args, .. }))) => {
                    let forwarded = if args.is_empty() {
                        parameter.clone()
                    } else {
                        format!("{parameter}, ")
                    };
                    TextEdit::insert(args.inner_start(), forwarded)
                }
                Some((call, Some(NodeKind::ConstructorCall { kind: CallKind::Super, .. }))) => {
                    let indent = line_indent(text, tree.span(call).start);
                    TextEdit::insert(tree.span(call).end, format!("{nl}{indent}{assignment}"))
                }
                Some((first, _)) => {
                    let first_start = tree.span(first).start;
                    let own_line = text
                        .get(body_span.start as usize..first_start as usize)
                        .is_some_and(|between| between.contains('\n'));
                    let indent = if own_line {
                        line_indent(text, first_start).to_string()
                    } else {
                        format!("{ctor_indent}{}", self.config.indent_unit)
                    };
                    TextEdit::insert(body_span.start + 1, format!("{nl}{indent}{assignment}"))
                }
                None => {
                    let inner = Span::new(body_span.start + 1, body_span.end.saturating_sub(1));
                    TextEdit::replace(
                        inner,
                        format!(
                            "{nl}{ctor_indent}{unit}{assignment}{nl}{ctor_indent}",
                            unit = self.config.indent_unit
                        ),
                    )
                }
            };
            trace!(ctor = ctor.0, "threading enclosing instance");
            self.rewrites.push(self.unit, edit);
        }
    }

    /// `this.f = p;` where the bare name would be ambiguous or the
    /// configuration asks for it, `f = p;` otherwise.
    fn assignment(&self, field: &str, parameter: &str, tree: &Tree, method: &MethodDecl) -> String {
        let shadowed = parameter_names(tree, method).iter().any(|n| n == field);
        if self.config.use_this_qualifier || field == parameter || shadowed {
            format!("this.{field} = {parameter};")
        } else {
            format!("{field} = {parameter};")
        }
    }

    /// Subclasses whose constructors call the moved type's constructor
    /// implicitly cannot be fixed by rewriting a call; report them.
    fn warn_implicit_super_calls(&mut self) -> Result<(), Abort> {
        let workspace = self.workspace;
        let symbols = self.symbols();
        let hierarchy = workspace.type_hierarchy(self.moved, self.cancel)?;
        for sub in hierarchy.subtypes {
            let symbol = &symbols[sub];
            if symbol.superclass != Some(self.moved) || symbol.type_kind() == Some(TypeKind::Anonymous) {
                continue;
            }
            let Some(decl) = symbol.decl else {
                continue;
            };
            let Some(tree) = workspace.tree(decl.unit) else {
                continue;
            };
            let ctors: Vec<SymbolId> = symbols.constructors(sub).collect();
            let mut implicit: Vec<Span> = Vec::new();
            if ctors.is_empty() {
                implicit.extend(tree.decl_name_span(decl.node));
            }
            for ctor in ctors {
                let Some(ctor_decl) = symbols[ctor].decl else {
                    continue;
                };
                let Some(method) = tree.method_decl(ctor_decl.node) else {
                    continue;
                };
                if !starts_with_constructor_call(tree, method) {
                    implicit.push(method.name_span);
                }
            }
            for span in implicit {
                self.status.add_message(
                    &diagnostic_messages::IMPLICIT_SUPER_CALL,
                    &[&display_name(symbols, sub), &display_name(symbols, self.enclosing)],
                    Some(Location::new(decl.unit, span)),
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // Creation sites
    // =========================================================================

    /// Rewrite `new Moved(..)` and `super(..)` calls reaching the moved
    /// type's constructors.
    ///
    /// An explicit outer instance (`o.new Moved()`, `o.super()`) always
    /// loses its prefix; with a link it becomes the first argument. Without
    /// one, the instance is looked up lexically from the site.
    fn rewrite_creations(&mut self) -> Result<(), Abort> {
        let workspace = self.workspace;
        let symbols = self.symbols();
        let mut targets: Vec<SymbolId> = symbols.constructors(self.moved).collect();
        if targets.is_empty() {
            targets.push(self.moved);
        }
        let filter = ReferenceFilter {
            kinds: ReferenceKinds::INVOKE,
            staticness: Staticness::Any,
        };
        let mut sites: Vec<(UnitId, NodeIndex)> = Vec::new();
        for target in targets {
            let found = workspace.find_references(target, &SearchScope::Workspace, &filter, self.cancel)?;
            for (unit, references) in found {
                for reference in references {
                    if !sites.contains(&(unit, reference.node)) {
                        sites.push((unit, reference.node));
                    }
                }
            }
        }

        for (unit, node) in sites {
            self.cancel.check()?;
            let Some(tree) = workspace.tree(unit) else {
                continue;
            };
            match tree.kind(node) {
                Some(NodeKind::New { outer, args, .. }) => {
                    self.rewrite_creation(unit, tree, node, *outer, args, false);
                }
                Some(NodeKind::ConstructorCall {
                    kind: CallKind::Super,
                    qualifier,
                    args,
                }) => self.rewrite_creation(unit, tree, node, *qualifier, args, true),
                _ => {}
            }
        }
        Ok(())
    }

    fn rewrite_creation(
        &mut self,
        unit: UnitId,
        tree: &'a Tree,
        node: NodeIndex,
        outer: Option<NodeIndex>,
        args: &Delimited,
        is_super: bool,
    ) {
        let Some(source) = self.workspace.unit(unit) else {
            return;
        };
        let text = source.text.as_str();

        if let Some(outer) = outer {
            let outer_span = tree.span(outer);
            let rest = text.get(outer_span.end as usize..).unwrap_or_default();
            let Some(dot) = rest.find('.') else {
                return;
            };
            let after_dot = &rest[dot + 1..];
            let end = outer_span.end as usize + dot + 1 + (after_dot.len() - after_dot.trim_start().len());
            self.rewrites
                .push(unit, TextEdit::delete(Span::new(outer_span.start, end as u32)));
            if self.link_created() {
                let suffix = if args.is_empty() { "" } else { ", " };
                self.rewrites.transfer(unit, outer_span, args.inner_start(), suffix);
            } else {
                self.rewrites.claim(unit, outer_span);
            }
            return;
        }
        if !self.link_created() {
            return;
        }
        match self.creation_instance(unit, tree, node, is_super) {
            Some(instance) => self.pass_instance(unit, args, instance),
            None => {
                let symbols = self.symbols();
                let span = tree.name_span(node).unwrap_or_else(|| tree.span(node));
                self.status.add_message(
                    &diagnostic_messages::NO_ENCLOSING_INSTANCE,
                    &[
                        &display_name(symbols, self.enclosing),
                        &display_name(symbols, self.moved),
                    ],
                    Some(Location::new(unit, span)),
                );
            }
        }
    }

    fn pass_instance(&mut self, unit: UnitId, args: &Delimited, instance: String) {
        let text = if args.is_empty() {
            instance
        } else {
            format!("{instance}, ")
        };
        self.rewrites.push(unit, TextEdit::insert(args.inner_start(), text));
    }

    /// Expression for the enclosing instance at a creation site without an
    /// explicit outer instance, or `None` when no instance is in scope.
    ///
    /// Inside the moved type this is the new field. Elsewhere the nearest
    /// lexically enclosing type that is a subtype of the enclosing type
    /// supplies `this` (or `Name.this`), as long as no static context lies
    /// in between. A `super(..)` call cannot use the instance under
    /// construction, so its search starts one type further out.
    fn creation_instance(&self, unit: UnitId, tree: &Tree, node: NodeIndex, is_super: bool) -> Option<String> {
        let symbols = self.symbols();
        if self.in_moved(unit, tree.span(node)) {
            if !is_super {
                return Some(self.field_access(node));
            }
            let subclass = innermost_type_decl(tree, node).and_then(|d| symbols.by_decl(unit, d))?;
            let field = self.field.as_ref()?;
            return (!symbols.is_static(subclass))
                .then(|| format!("{}.this.{}", self.moved_name(), field.name));
        }

        let mut blocked = false;
        let mut innermost = true;
        for ancestor in tree.ancestors(node) {
            match tree.kind(ancestor) {
                Some(NodeKind::Method(decl)) if decl.modifiers.flags.contains(ModifierFlags::STATIC) => {
                    blocked = true;
                }
                Some(NodeKind::Field { modifiers, .. }) if modifiers.flags.contains(ModifierFlags::STATIC) => {
                    blocked = true;
                }
                Some(NodeKind::Initializer { is_static: true, .. }) => blocked = true,
                Some(NodeKind::TypeDecl(decl)) => {
                    let Some(ty) = symbols.by_decl(unit, ancestor) else {
                        continue;
                    };
                    let usable = !blocked && !(innermost && is_super);
                    if usable && symbols.is_subtype(ty, self.enclosing) {
                        if innermost {
                            return Some("this".to_string());
                        }
                        if decl.kind == TypeKind::Anonymous {
                            return None;
                        }
                        return Some(format!("{}.this", decl.name));
                    }
                    innermost = false;
                    if symbols.is_static(ty) || symbols[ty].owner.is_none() {
                        blocked = true;
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn parameter_names(tree: &Tree, method: &MethodDecl) -> Vec<String> {
    method
        .params
        .items
        .iter()
        .filter_map(|&p| match tree.kind(p) {
            Some(NodeKind::Parameter { name, .. }) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn starts_with_constructor_call(tree: &Tree, method: &MethodDecl) -> bool {
    let Some(body) = method.body else {
        return false;
    };
    match tree.kind(body) {
        Some(NodeKind::Block { statements }) => statements
            .first()
            .is_some_and(|&s| matches!(tree.kind(s), Some(NodeKind::ConstructorCall { .. }))),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/link_tests.rs"]
mod link_tests;
