//! Types, type arguments, type parameters and qualified names.

use super::ParserState;
use crate::ParseError;
use crate::scanner::{TokenKind, is_primitive};
use hoist_model::{Delimited, NodeIndex, NodeKind};

impl<'a> ParserState<'a> {
    /// `int[]`, `p.Outer<A>.Inner`, `List<? extends T>[]`.
    pub(super) fn parse_type(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        if self.token().kind == TokenKind::Keyword && is_primitive(self.current_text()) {
            let name = self.current_text().to_string();
            self.next();
            let dims = self.parse_dims();
            return Ok(self.add(NodeKind::PrimitiveType { name, dims }, start));
        }
        let mut qualifier = None;
        loop {
            let (name, name_span) = self.expect_ident()?;
            let args = if self.is_op("<") {
                Some(self.parse_type_args()?)
            } else {
                None
            };
            if self.is_op(".") && self.is_ident_at(1) {
                let node = self.add(
                    NodeKind::TypeRef {
                        qualifier,
                        name,
                        name_span,
                        args,
                        dims: 0,
                    },
                    start,
                );
                qualifier = Some(node);
                self.next();
                continue;
            }
            let dims = self.parse_dims();
            return Ok(self.add(
                NodeKind::TypeRef {
                    qualifier,
                    name,
                    name_span,
                    args,
                    dims,
                },
                start,
            ));
        }
    }

    /// Trailing `[]` pairs.
    pub(super) fn parse_dims(&mut self) -> u8 {
        let mut dims = 0u8;
        while self.is_op("[") && self.is_op_at(1, "]") {
            self.next();
            self.next();
            dims = dims.saturating_add(1);
        }
        dims
    }

    /// `<A, ? super B>`; empty for the diamond `<>`.
    pub(super) fn parse_type_args(&mut self) -> Result<Delimited, ParseError> {
        let open = self.expect_op("<")?.start;
        let mut items = Vec::new();
        while !self.is_op(">") {
            if self.is_op("?") {
                let start = self.start();
                self.next();
                let (bound, upper) = if self.eat_kw("extends") {
                    (Some(self.parse_type()?), true)
                } else if self.eat_kw("super") {
                    (Some(self.parse_type()?), false)
                } else {
                    (None, true)
                };
                items.push(self.add(NodeKind::Wildcard { bound, upper }, start));
            } else {
                items.push(self.parse_type()?);
            }
            if !self.eat_op(",") {
                break;
            }
        }
        let close = self.expect_op(">")?.start;
        Ok(Delimited { open, close, items })
    }

    /// `<T extends A & B, U>` on a type or method declaration.
    pub(super) fn parse_type_params(&mut self) -> Result<Delimited, ParseError> {
        let open = self.expect_op("<")?.start;
        let mut items = Vec::new();
        loop {
            self.parse_modifiers()?;
            let start = self.start();
            let (name, name_span) = self.expect_ident()?;
            let mut bounds = Vec::new();
            if self.eat_kw("extends") {
                bounds.push(self.parse_type()?);
                while self.eat_op("&") {
                    bounds.push(self.parse_type()?);
                }
            }
            items.push(self.add(
                NodeKind::TypeParam {
                    name,
                    name_span,
                    bounds,
                },
                start,
            ));
            if !self.eat_op(",") {
                break;
            }
        }
        let close = self.expect_op(">")?.start;
        Ok(Delimited { open, close, items })
    }

    /// Comma-separated types after `extends`, `implements` or `throws`.
    pub(super) fn parse_type_list(&mut self) -> Result<Vec<NodeIndex>, ParseError> {
        let mut types = vec![self.parse_type()?];
        while self.eat_op(",") {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    /// Dotted name without type arguments, as written in `package` and
    /// `import` declarations. Stops before `.*`.
    pub(super) fn parse_qualified_name(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let mut qualifier = None;
        loop {
            let (name, name_span) = self.expect_ident()?;
            let node = self.add(
                NodeKind::TypeRef {
                    qualifier,
                    name,
                    name_span,
                    args: None,
                    dims: 0,
                },
                start,
            );
            qualifier = Some(node);
            if self.is_op(".") && self.is_ident_at(1) {
                self.next();
            } else {
                return Ok(node);
            }
        }
    }

    // =========================================================================
    // Speculative scanning
    // =========================================================================

    /// Advance over a type without building nodes. Returns false if the
    /// tokens do not form a type; the caller restores the position.
    pub(super) fn skip_type(&mut self) -> bool {
        if self.token().kind == TokenKind::Keyword && is_primitive(self.current_text()) {
            self.next();
        } else if self.is_ident() {
            self.next();
            loop {
                if self.is_op("<") && !self.skip_type_args() {
                    return false;
                }
                if self.is_op(".") && self.is_ident_at(1) {
                    self.next();
                    self.next();
                } else {
                    break;
                }
            }
        } else {
            return false;
        }
        self.parse_dims();
        true
    }

    fn skip_type_args(&mut self) -> bool {
        self.next();
        if self.eat_op(">") {
            return true;
        }
        loop {
            if self.eat_op("?") {
                if (self.eat_kw("extends") || self.eat_kw("super")) && !self.skip_type() {
                    return false;
                }
            } else if !self.skip_type() {
                return false;
            }
            if self.eat_op(",") {
                continue;
            }
            return self.eat_op(">");
        }
    }

    /// Whether the statement at the cursor declares local variables:
    /// a type followed by a name and one of `=`, `;`, `,`, `[` or `:`.
    pub(super) fn looks_like_local_decl(&mut self) -> bool {
        let saved = self.pos;
        let result = self.skip_type()
            && self.is_ident()
            && ["=", ";", ",", "[", ":"]
                .iter()
                .any(|op| self.is_op_at(1, op));
        self.pos = saved;
        result
    }

    /// Whether a parenthesized cast starts at the cursor (`(Type) expr`).
    pub(super) fn looks_like_cast(&mut self) -> bool {
        let saved = self.pos;
        self.next();
        let primitive =
            self.token().kind == TokenKind::Keyword && is_primitive(self.current_text());
        let result = self.skip_type() && self.is_op(")") && {
            let after = self.peek_token(1);
            if primitive {
                true
            } else {
                let text = self.token_text(after);
                match after.kind {
                    TokenKind::Identifier
                    | TokenKind::StringLiteral
                    | TokenKind::CharLiteral
                    | TokenKind::IntLiteral
                    | TokenKind::FloatLiteral => true,
                    TokenKind::Keyword => {
                        matches!(text, "this" | "super" | "new" | "true" | "false" | "null")
                            || is_primitive(text)
                    }
                    TokenKind::Operator => matches!(text, "(" | "!" | "~"),
                    TokenKind::EndOfFile => false,
                }
            }
        };
        self.pos = saved;
        result
    }
}
