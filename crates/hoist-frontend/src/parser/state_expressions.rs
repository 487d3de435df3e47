//! Expressions, by precedence climbing.

use super::ParserState;
use crate::ParseError;
use crate::scanner::{TokenKind, is_primitive};
use hoist_common::Span;
use hoist_model::{Delimited, NodeIndex, NodeKind};

/// Binding power of binary operators; higher binds tighter.
fn binary_precedence(op: &str) -> Option<u8> {
    Some(match op {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | ">" | "<=" | ">=" => 7,
        "<<" | ">>" | ">>>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        _ => return None,
    })
}

const INSTANCEOF_PRECEDENCE: u8 = 7;

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

impl<'a> ParserState<'a> {
    pub(super) fn parse_expression(&mut self) -> Result<NodeIndex, ParseError> {
        if self.looks_like_lambda() {
            return self.parse_lambda();
        }
        let start = self.start();
        let target = self.parse_ternary()?;
        let (op, count) = self.operator_at_cursor();
        if ASSIGNMENT_OPERATORS.contains(&op.as_str()) {
            for _ in 0..count {
                self.next();
            }
            let value = self.parse_expression()?;
            return Ok(self.add(NodeKind::Assign { target, op, value }, start));
        }
        Ok(target)
    }

    /// The operator at the cursor and how many tokens it spans. Adjacent
    /// `>` tokens are joined here, since the scanner never merges them.
    fn operator_at_cursor(&self) -> (String, usize) {
        let token = self.token();
        if token.kind != TokenKind::Operator {
            return (String::new(), 0);
        }
        let text = self.token_text(token);
        if text != ">" {
            return (text.to_string(), 1);
        }
        let mut op = String::from(">");
        let mut count = 1;
        while count < 3 && self.is_op_at(count, ">") && self.is_adjacent(count) {
            op.push('>');
            count += 1;
        }
        if self.is_op_at(count, "=") && self.is_adjacent(count) {
            op.push('=');
            count += 1;
        }
        (op, count)
    }

    pub(super) fn parse_ternary(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let cond = self.parse_binary(1)?;
        if !self.eat_op("?") {
            return Ok(cond);
        }
        let then_expr = if self.looks_like_lambda() {
            self.parse_lambda()?
        } else {
            self.parse_ternary()?
        };
        self.expect_op(":")?;
        let else_expr = if self.looks_like_lambda() {
            self.parse_lambda()?
        } else {
            self.parse_ternary()?
        };
        Ok(self.add(
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            },
            start,
        ))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let mut left = self.parse_unary()?;
        loop {
            if self.is_kw("instanceof") {
                if INSTANCEOF_PRECEDENCE < min_precedence {
                    break;
                }
                self.next();
                self.eat_kw("final");
                let ty = self.parse_type()?;
                // Pattern variable of `x instanceof T t`.
                if self.is_ident() {
                    self.next();
                }
                left = self.add(NodeKind::InstanceOf { expr: left, ty }, start);
                continue;
            }
            let (op, count) = self.operator_at_cursor();
            let Some(precedence) = binary_precedence(&op) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            for _ in 0..count {
                self.next();
            }
            let right = self.parse_binary(precedence + 1)?;
            left = self.add(NodeKind::Binary { left, op, right }, start);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let token = self.token();
        if token.kind == TokenKind::Operator {
            let text = self.token_text(token);
            if matches!(text, "+" | "-" | "!" | "~" | "++" | "--") {
                self.next();
                let operand = self.parse_unary()?;
                return Ok(self.add(
                    NodeKind::Unary {
                        op: text.to_string(),
                        operand,
                        prefix: true,
                    },
                    start,
                ));
            }
            if text == "(" && self.looks_like_cast() {
                self.next();
                let ty = self.parse_type()?;
                while self.eat_op("&") {
                    self.parse_type()?;
                }
                self.expect_op(")")?;
                let expr = if self.looks_like_lambda() {
                    self.parse_lambda()?
                } else {
                    self.parse_unary()?
                };
                return Ok(self.add(NodeKind::Cast { ty, expr }, start));
            }
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary, start)
    }

    fn parse_primary(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let token = self.token();
        let text = self.token_text(token);
        match token.kind {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral => {
                self.next();
                Ok(self.add(
                    NodeKind::Literal {
                        text: text.to_string(),
                    },
                    start,
                ))
            }
            TokenKind::Keyword => match text {
                "true" | "false" | "null" => {
                    self.next();
                    Ok(self.add(
                        NodeKind::Literal {
                            text: text.to_string(),
                        },
                        start,
                    ))
                }
                "this" => {
                    self.next();
                    Ok(self.add(NodeKind::This { qualifier: None }, start))
                }
                "super" => {
                    self.next();
                    Ok(self.add(NodeKind::Super { qualifier: None }, start))
                }
                "new" => self.parse_new(None, start),
                _ if is_primitive(text) => {
                    let ty = self.parse_type()?;
                    self.expect_op(".")?;
                    self.expect_kw("class")?;
                    Ok(self.add(NodeKind::ClassLiteral { ty }, start))
                }
                _ => Err(self.error("expected expression")),
            },
            TokenKind::Identifier => {
                let (name, name_span) = self.expect_ident()?;
                if self.is_op("(") {
                    let args = self.parse_arguments()?;
                    return Ok(self.add(
                        NodeKind::MethodCall {
                            receiver: None,
                            name,
                            name_span,
                            args,
                        },
                        start,
                    ));
                }
                Ok(self.add(NodeKind::SimpleName { name }, start))
            }
            TokenKind::Operator if text == "(" => {
                self.next();
                let expr = self.parse_expression()?;
                self.expect_op(")")?;
                Ok(self.add(NodeKind::Paren { expr }, start))
            }
            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_postfix(&mut self, mut expr: NodeIndex, start: u32) -> Result<NodeIndex, ParseError> {
        loop {
            if self.stop_at == Some(self.pos) {
                break;
            }
            if self.is_op(".") {
                if self.is_kw_at(1, "new") {
                    self.next();
                    expr = self.parse_new(Some(expr), start)?;
                } else if self.is_kw_at(1, "this") {
                    self.next();
                    self.next();
                    let qualifier = self.expr_to_type_ref(expr, 0)?;
                    expr = self.add(
                        NodeKind::This {
                            qualifier: Some(qualifier),
                        },
                        start,
                    );
                } else if self.is_kw_at(1, "super") {
                    self.next();
                    self.next();
                    let qualifier = self.expr_to_type_ref(expr, 0)?;
                    expr = self.add(
                        NodeKind::Super {
                            qualifier: Some(qualifier),
                        },
                        start,
                    );
                } else if self.is_kw_at(1, "class") {
                    self.next();
                    self.next();
                    let ty = self.expr_to_type_ref(expr, 0)?;
                    expr = self.add(NodeKind::ClassLiteral { ty }, start);
                } else {
                    self.next();
                    if self.is_op("<") {
                        self.parse_type_args()?;
                    }
                    let (name, name_span) = self.expect_ident()?;
                    if self.is_op("(") {
                        let args = self.parse_arguments()?;
                        expr = self.add(
                            NodeKind::MethodCall {
                                receiver: Some(expr),
                                name,
                                name_span,
                                args,
                            },
                            start,
                        );
                    } else {
                        expr = self.add(
                            NodeKind::FieldAccess {
                                receiver: expr,
                                name,
                                name_span,
                            },
                            start,
                        );
                    }
                }
            } else if self.is_op("[") {
                if self.is_op_at(1, "]") {
                    // `String[].class`
                    let dims = self.parse_dims();
                    let ty = self.expr_to_type_ref(expr, dims)?;
                    self.expect_op(".")?;
                    self.expect_kw("class")?;
                    expr = self.add(NodeKind::ClassLiteral { ty }, start);
                } else {
                    self.next();
                    let index = self.parse_expression()?;
                    self.expect_op("]")?;
                    expr = self.add(NodeKind::ArrayAccess { array: expr, index }, start);
                }
            } else if self.is_op("++") || self.is_op("--") {
                let op = self.current_text().to_string();
                self.next();
                expr = self.add(
                    NodeKind::Unary {
                        op,
                        operand: expr,
                        prefix: false,
                    },
                    start,
                );
            } else if self.is_op("::") {
                self.next();
                let token = self.next();
                if !(token.kind == TokenKind::Identifier || self.token_text(token) == "new") {
                    return Err(ParseError::new(token.start, "expected method reference name"));
                }
                expr = self.add(
                    NodeKind::MethodRef {
                        receiver: expr,
                        name: self.token_text(token).to_string(),
                        name_span: Span::new(token.start, token.end),
                    },
                    start,
                );
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Re-read a name expression (`a.b.C`) as a type reference chain.
    fn expr_to_type_ref(&mut self, expr: NodeIndex, dims: u8) -> Result<NodeIndex, ParseError> {
        let span = self.tree.span(expr);
        let (qualifier, name, name_span) = match self.tree.kind(expr) {
            Some(NodeKind::SimpleName { name }) => (None, name.clone(), span),
            Some(NodeKind::FieldAccess {
                receiver,
                name,
                name_span,
            }) => (Some(*receiver), name.clone(), *name_span),
            Some(NodeKind::TypeRef { .. }) if dims == 0 => return Ok(expr),
            _ => return Err(ParseError::new(span.start, "expected type name")),
        };
        let qualifier = match qualifier {
            Some(receiver) => Some(self.expr_to_type_ref(receiver, 0)?),
            None => None,
        };
        Ok(self.tree.add(
            NodeKind::TypeRef {
                qualifier,
                name,
                name_span,
                args: None,
                dims,
            },
            Span::new(span.start, name_span.end),
        ))
    }

    /// `new T(args) { body }`, `new T[n][]`, `new T[] { ... }`. The cursor
    /// is at `new`; `outer` is the qualifying instance of `outer.new T()`.
    fn parse_new(&mut self, outer: Option<NodeIndex>, start: u32) -> Result<NodeIndex, ParseError> {
        self.expect_kw("new")?;
        if self.is_op("<") {
            self.parse_type_args()?;
        }
        self.parse_modifiers()?;
        let ty = self.parse_type()?;
        let ty_has_dims = matches!(
            self.tree.kind(ty),
            Some(NodeKind::TypeRef { dims: 1..=u8::MAX, .. } | NodeKind::PrimitiveType { dims: 1..=u8::MAX, .. })
        );
        if self.is_op("[") || ty_has_dims {
            let mut dims = Vec::new();
            while self.is_op("[") && !self.is_op_at(1, "]") {
                self.next();
                dims.push(self.parse_expression()?);
                self.expect_op("]")?;
            }
            self.parse_dims();
            let init = if self.is_op("{") {
                Some(self.parse_array_init()?)
            } else {
                None
            };
            return Ok(self.add(NodeKind::NewArray { ty, dims, init }, start));
        }
        let args = self.parse_arguments()?;
        let body = if self.is_op("{") {
            Some(self.parse_anonymous_body()?)
        } else {
            None
        };
        Ok(self.add(
            NodeKind::New {
                outer,
                ty,
                args,
                body,
            },
            start,
        ))
    }

    pub(super) fn parse_arguments(&mut self) -> Result<Delimited, ParseError> {
        let open = self.expect_op("(")?.start;
        let mut items = Vec::new();
        while !self.is_op(")") {
            items.push(self.parse_expression()?);
            if !self.eat_op(",") {
                break;
            }
        }
        let close = self.expect_op(")")?.start;
        Ok(Delimited { open, close, items })
    }

    // =========================================================================
    // Lambdas
    // =========================================================================

    fn looks_like_lambda(&self) -> bool {
        if self.is_ident() && self.is_op_at(1, "->") {
            return true;
        }
        if !self.is_op("(") {
            return false;
        }
        let mut depth = 0usize;
        for ahead in 0.. {
            let token = self.peek_token(ahead);
            if token.kind == TokenKind::EndOfFile {
                return false;
            }
            if self.is_op_at(ahead, "(") {
                depth += 1;
            } else if self.is_op_at(ahead, ")") {
                depth -= 1;
                if depth == 0 {
                    return self.is_op_at(ahead + 1, "->");
                }
            }
        }
        false
    }

    fn parse_lambda(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let mut params = Vec::new();
        if self.is_ident() {
            let (name, span) = self.expect_ident()?;
            params.push(self.tree.add(NodeKind::SimpleName { name }, span));
        } else {
            self.expect_op("(")?;
            while !self.is_op(")") {
                let implicit = self.is_ident() && (self.is_op_at(1, ",") || self.is_op_at(1, ")"));
                if implicit {
                    let (name, span) = self.expect_ident()?;
                    params.push(self.tree.add(NodeKind::SimpleName { name }, span));
                } else {
                    params.push(self.parse_parameter()?);
                }
                if !self.eat_op(",") {
                    break;
                }
            }
            self.expect_op(")")?;
        }
        self.expect_op("->")?;
        let body = if self.is_op("{") {
            self.parse_block()?
        } else {
            self.parse_expression()?
        };
        Ok(self.add(NodeKind::Lambda { params, body }, start))
    }
}
