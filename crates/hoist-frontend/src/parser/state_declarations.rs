//! Compilation units, type declarations and members.

use super::ParserState;
use crate::ParseError;
use crate::scanner::TokenKind;
use hoist_common::Span;
use hoist_model::{
    Delimited, MethodDecl, ModifierFlags, ModifierKeyword, Modifiers, NodeIndex, NodeKind,
    TypeDecl, TypeKind,
};

impl<'a> ParserState<'a> {
    pub(super) fn parse_compilation_unit(&mut self) -> Result<NodeIndex, ParseError> {
        let mut package = None;
        let saved = self.pos;
        let annotations = self.parse_modifiers()?;
        if self.is_kw("package") {
            let start = annotations
                .annotations
                .first()
                .map_or(self.start(), |s| s.start);
            self.next();
            let name = self.parse_qualified_name()?;
            self.expect_op(";")?;
            package = Some(self.add(NodeKind::PackageDecl { name }, start));
        } else {
            self.pos = saved;
        }

        let mut imports = Vec::new();
        while self.is_kw("import") {
            let start = self.start();
            self.next();
            let is_static = self.eat_kw("static");
            let name = self.parse_qualified_name()?;
            let on_demand = if self.eat_op(".") {
                self.expect_op("*")?;
                true
            } else {
                false
            };
            self.expect_op(";")?;
            imports.push(self.add(
                NodeKind::Import {
                    is_static,
                    on_demand,
                    name,
                },
                start,
            ));
        }

        let mut types = Vec::new();
        while !self.at_eof() {
            if self.eat_op(";") {
                continue;
            }
            let start = self.start();
            let modifiers = self.parse_modifiers()?;
            types.push(self.parse_type_decl(modifiers, start)?);
        }

        let end = self.text.len() as u32;
        Ok(self.tree.add(
            NodeKind::CompilationUnit {
                package,
                imports,
                types,
            },
            Span::new(0, end),
        ))
    }

    /// Modifier keywords and annotations, in any order.
    pub(super) fn parse_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::default();
        loop {
            let token = self.token();
            if self.is_op("@") && !self.is_kw_at(1, "interface") {
                let start = token.start;
                self.next();
                self.parse_qualified_name()?;
                if self.is_op("(") {
                    self.skip_balanced("(", ")")?;
                }
                modifiers.annotations.push(Span::new(start, self.prev_end()));
            } else if token.kind == TokenKind::Keyword
                && let Some(flag) = ModifierFlags::from_keyword(self.token_text(token))
            {
                // `default` only counts as a modifier in front of a member.
                if flag == ModifierFlags::DEFAULT && self.is_op_at(1, ":") {
                    break;
                }
                self.next();
                modifiers.flags |= flag;
                modifiers.keywords.push(ModifierKeyword {
                    flag,
                    span: Span::new(token.start, token.end),
                });
            } else {
                break;
            }
        }
        Ok(modifiers)
    }

    /// Skip a bracketed token run, honouring nesting.
    pub(super) fn skip_balanced(&mut self, open: &str, close: &str) -> Result<(), ParseError> {
        self.expect_op(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_eof() {
                return Err(self.error(&format!("expected '{close}'")));
            }
            if self.is_op(open) {
                depth += 1;
            } else if self.is_op(close) {
                depth -= 1;
            }
            self.next();
        }
        Ok(())
    }

    pub(super) fn at_type_decl_keyword(&self) -> bool {
        self.is_kw("class")
            || self.is_kw("interface")
            || self.is_kw("enum")
            || (self.is_op("@") && self.is_kw_at(1, "interface"))
    }

    /// A class, interface, enum or annotation type declaration, after its
    /// modifiers.
    pub(super) fn parse_type_decl(
        &mut self,
        modifiers: Modifiers,
        start: u32,
    ) -> Result<NodeIndex, ParseError> {
        let keyword_start = self.start();
        let kind = if self.eat_kw("class") {
            TypeKind::Class
        } else if self.eat_kw("interface") {
            TypeKind::Interface
        } else if self.eat_kw("enum") {
            TypeKind::Enum
        } else if self.is_op("@") && self.is_kw_at(1, "interface") {
            self.next();
            self.next();
            TypeKind::Annotation
        } else {
            return Err(self.error("expected type declaration"));
        };
        let keyword_span = Span::new(keyword_start, self.prev_end());
        let (name, name_span) = self.expect_ident()?;
        let type_params = if self.is_op("<") {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        let extends = if self.eat_kw("extends") {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let implements = if self.eat_kw("implements") {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let body = self.parse_class_body(kind, &name)?;
        Ok(self.add(
            NodeKind::TypeDecl(Box::new(TypeDecl {
                modifiers,
                kind,
                keyword_span,
                name,
                name_span,
                type_params,
                extends,
                implements,
                body,
            })),
            start,
        ))
    }

    /// Body of an anonymous class or an enum constant, starting at `{`.
    pub(super) fn parse_anonymous_body(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let body = self.parse_class_body(TypeKind::Anonymous, "")?;
        Ok(self.add(
            NodeKind::TypeDecl(Box::new(TypeDecl {
                modifiers: Modifiers::default(),
                kind: TypeKind::Anonymous,
                keyword_span: Span::new(start, start + 1),
                name: String::new(),
                name_span: Span::at(start),
                type_params: None,
                extends: Vec::new(),
                implements: Vec::new(),
                body,
            })),
            start,
        ))
    }

    fn parse_class_body(&mut self, kind: TypeKind, type_name: &str) -> Result<Delimited, ParseError> {
        let open = self.expect_op("{")?.start;
        let mut items = Vec::new();
        if kind == TypeKind::Enum {
            self.parse_enum_constants(&mut items)?;
        }
        while !self.is_op("}") {
            if self.at_eof() {
                return Err(self.error("expected '}'"));
            }
            if self.eat_op(";") {
                continue;
            }
            items.push(self.parse_member(type_name)?);
        }
        let close = self.next().start;
        Ok(Delimited { open, close, items })
    }

    fn parse_enum_constants(&mut self, items: &mut Vec<NodeIndex>) -> Result<(), ParseError> {
        loop {
            let start = self.start();
            let saved = self.pos;
            self.parse_modifiers()?;
            let is_constant = self.is_ident()
                && ["(", "{", ",", ";", "}"]
                    .iter()
                    .any(|op| self.is_op_at(1, op));
            if !is_constant {
                self.pos = saved;
                break;
            }
            let (name, name_span) = self.expect_ident()?;
            let args = if self.is_op("(") {
                Some(self.parse_arguments()?)
            } else {
                None
            };
            let body = if self.is_op("{") {
                Some(self.parse_anonymous_body()?)
            } else {
                None
            };
            items.push(self.add(
                NodeKind::EnumConstant {
                    name,
                    name_span,
                    args,
                    body,
                },
                start,
            ));
            if !self.eat_op(",") {
                break;
            }
        }
        self.eat_op(";");
        Ok(())
    }

    fn parse_member(&mut self, type_name: &str) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        if self.is_op("{") {
            let body = self.parse_block()?;
            return Ok(self.add(
                NodeKind::Initializer {
                    is_static: false,
                    body,
                },
                start,
            ));
        }
        if self.is_kw("static") && self.is_op_at(1, "{") {
            self.next();
            let body = self.parse_block()?;
            return Ok(self.add(
                NodeKind::Initializer {
                    is_static: true,
                    body,
                },
                start,
            ));
        }

        let modifiers = self.parse_modifiers()?;
        if self.at_type_decl_keyword() {
            return self.parse_type_decl(modifiers, start);
        }
        let type_params = if self.is_op("<") {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        if self.is_ident() && self.current_text() == type_name && self.is_op_at(1, "(") {
            let (name, name_span) = self.expect_ident()?;
            return self.parse_method_rest(modifiers, type_params, None, name, name_span, start);
        }
        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_ident()?;
        if self.is_op("(") {
            return self.parse_method_rest(modifiers, type_params, Some(ty), name, name_span, start);
        }
        let fragments = self.parse_fragments(name, name_span)?;
        self.expect_op(";")?;
        Ok(self.add(
            NodeKind::Field {
                modifiers,
                ty,
                fragments,
            },
            start,
        ))
    }

    fn parse_method_rest(
        &mut self,
        modifiers: Modifiers,
        type_params: Option<Delimited>,
        return_type: Option<NodeIndex>,
        name: String,
        name_span: Span,
        start: u32,
    ) -> Result<NodeIndex, ParseError> {
        let params = self.parse_parameters()?;
        self.parse_dims();
        let throws = if self.eat_kw("throws") {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let default_value = if self.eat_kw("default") {
            Some(self.parse_variable_initializer()?)
        } else {
            None
        };
        let body = if self.is_op("{") {
            Some(self.parse_block()?)
        } else {
            self.expect_op(";")?;
            None
        };
        Ok(self.add(
            NodeKind::Method(Box::new(MethodDecl {
                modifiers,
                type_params,
                return_type,
                name,
                name_span,
                params,
                throws,
                body,
                default_value,
            })),
            start,
        ))
    }

    /// `(final int a, String... rest)`.
    fn parse_parameters(&mut self) -> Result<Delimited, ParseError> {
        let open = self.expect_op("(")?.start;
        let mut items = Vec::new();
        while !self.is_op(")") {
            items.push(self.parse_parameter()?);
            if !self.eat_op(",") {
                break;
            }
        }
        let close = self.expect_op(")")?.start;
        Ok(Delimited { open, close, items })
    }

    pub(super) fn parse_parameter(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let modifiers = self.parse_modifiers()?;
        let ty = self.parse_type()?;
        // Union types of multi-catch keep only their first alternative.
        while self.eat_op("|") {
            self.parse_type()?;
        }
        let varargs = self.eat_op("...");
        let (name, name_span) = self.expect_ident()?;
        self.parse_dims();
        Ok(self.add(
            NodeKind::Parameter {
                modifiers,
                ty,
                name,
                name_span,
                varargs,
            },
            start,
        ))
    }

    /// Declarators after the type of a field or local variable. The first
    /// name has already been consumed.
    pub(super) fn parse_fragments(
        &mut self,
        first_name: String,
        first_span: Span,
    ) -> Result<Vec<NodeIndex>, ParseError> {
        let mut fragments = vec![self.parse_fragment_rest(first_name, first_span)?];
        while self.eat_op(",") {
            let (name, name_span) = self.expect_ident()?;
            fragments.push(self.parse_fragment_rest(name, name_span)?);
        }
        Ok(fragments)
    }

    fn parse_fragment_rest(&mut self, name: String, name_span: Span) -> Result<NodeIndex, ParseError> {
        let dims = self.parse_dims();
        let init = if self.eat_op("=") {
            Some(self.parse_variable_initializer()?)
        } else {
            None
        };
        Ok(self.add(
            NodeKind::Fragment {
                name,
                name_span,
                dims,
                init,
            },
            name_span.start,
        ))
    }

    /// An expression or a `{...}` array initializer.
    pub(super) fn parse_variable_initializer(&mut self) -> Result<NodeIndex, ParseError> {
        if self.is_op("{") {
            self.parse_array_init()
        } else {
            self.parse_expression()
        }
    }

    pub(super) fn parse_array_init(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        self.expect_op("{")?;
        let mut items = Vec::new();
        while !self.is_op("}") {
            items.push(self.parse_variable_initializer()?);
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op("}")?;
        Ok(self.add(NodeKind::ArrayInit { items }, start))
    }
}
