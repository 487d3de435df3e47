//! Blocks and statements.

use super::ParserState;
use crate::ParseError;
use crate::scanner::TokenKind;
use hoist_model::{CallKind, NodeIndex, NodeKind};

impl<'a> ParserState<'a> {
    pub(super) fn parse_block(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        self.expect_op("{")?;
        let mut statements = Vec::new();
        while !self.is_op("}") {
            if self.at_eof() {
                return Err(self.error("expected '}'"));
            }
            statements.push(self.parse_statement()?);
        }
        self.next();
        Ok(self.add(NodeKind::Block { statements }, start))
    }

    pub(super) fn parse_statement(&mut self) -> Result<NodeIndex, ParseError> {
        let start = self.start();
        let token = self.token();
        if token.kind == TokenKind::Operator {
            if self.is_op("{") {
                return self.parse_block();
            }
            if self.eat_op(";") {
                return Ok(self.add(NodeKind::Empty, start));
            }
            if self.is_op("@") {
                return self.parse_declaration_statement(start);
            }
        }
        if token.kind == TokenKind::Identifier && self.is_op_at(1, ":") {
            let label = self.current_text().to_string();
            self.next();
            self.next();
            let body = self.parse_statement()?;
            return Ok(self.add(NodeKind::Labeled { label, body }, start));
        }
        if token.kind == TokenKind::Keyword {
            match self.token_text(token) {
                "if" => return self.parse_if(start),
                "while" => {
                    self.next();
                    let cond = self.parse_paren_condition()?;
                    let body = self.parse_statement()?;
                    return Ok(self.add(NodeKind::While { cond, body }, start));
                }
                "do" => {
                    self.next();
                    let body = self.parse_statement()?;
                    self.expect_kw("while")?;
                    let cond = self.parse_paren_condition()?;
                    self.expect_op(";")?;
                    return Ok(self.add(NodeKind::DoWhile { body, cond }, start));
                }
                "for" => return self.parse_for(start),
                "try" => return self.parse_try(start),
                "switch" => return self.parse_switch(start),
                "synchronized" if self.is_op_at(1, "(") => {
                    self.next();
                    let lock = self.parse_paren_condition()?;
                    let body = self.parse_block()?;
                    return Ok(self.add(NodeKind::Synchronized { lock, body }, start));
                }
                "return" => {
                    self.next();
                    let expr = if self.is_op(";") {
                        None
                    } else {
                        Some(self.parse_expression()?)
                    };
                    self.expect_op(";")?;
                    return Ok(self.add(NodeKind::Return { expr }, start));
                }
                "throw" => {
                    self.next();
                    let expr = self.parse_expression()?;
                    self.expect_op(";")?;
                    return Ok(self.add(NodeKind::Throw { expr }, start));
                }
                "assert" => {
                    self.next();
                    let cond = self.parse_expression()?;
                    let message = if self.eat_op(":") {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    self.expect_op(";")?;
                    return Ok(self.add(NodeKind::Assert { cond, message }, start));
                }
                "break" | "continue" => {
                    let keyword = self.token_text(token).to_string();
                    self.next();
                    if self.is_ident() {
                        self.next();
                    }
                    self.expect_op(";")?;
                    return Ok(self.add(NodeKind::Jump { keyword }, start));
                }
                "this" | "super" if self.is_op_at(1, "(") => {
                    let kind = if self.token_text(token) == "this" {
                        CallKind::This
                    } else {
                        CallKind::Super
                    };
                    self.next();
                    return self.parse_constructor_call_rest(kind, None, start);
                }
                "class" | "interface" | "enum" | "final" | "abstract" | "static" | "strictfp" => {
                    return self.parse_declaration_statement(start);
                }
                _ => {}
            }
        }
        if let Some(dot) = self.find_qualified_super_call() {
            self.stop_at = Some(dot);
            let qualifier = self.parse_expression();
            self.stop_at = None;
            let qualifier = qualifier?;
            self.expect_op(".")?;
            self.expect_kw("super")?;
            return self.parse_constructor_call_rest(CallKind::Super, Some(qualifier), start);
        }
        if self.looks_like_local_decl() {
            return self.parse_declaration_statement(start);
        }
        let expr = self.parse_expression()?;
        self.expect_op(";")?;
        Ok(self.add(NodeKind::ExpressionStatement { expr }, start))
    }

    /// Local class or local variable declaration, starting at its modifiers.
    fn parse_declaration_statement(&mut self, start: u32) -> Result<NodeIndex, ParseError> {
        let modifiers = self.parse_modifiers()?;
        if self.at_type_decl_keyword() {
            return self.parse_type_decl(modifiers, start);
        }
        let local = self.parse_local_variable_rest(modifiers, start)?;
        self.expect_op(";")?;
        // Include the semicolon in the statement span.
        let end = self.prev_end();
        if let Some(node) = self.tree.get_mut(local) {
            node.span.end = end;
        }
        Ok(local)
    }

    fn parse_local_variable_rest(
        &mut self,
        modifiers: hoist_model::Modifiers,
        start: u32,
    ) -> Result<NodeIndex, ParseError> {
        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_ident()?;
        let fragments = self.parse_fragments(name, name_span)?;
        Ok(self.add(
            NodeKind::LocalVariable {
                modifiers,
                ty,
                fragments,
            },
            start,
        ))
    }

    fn parse_constructor_call_rest(
        &mut self,
        kind: CallKind,
        qualifier: Option<NodeIndex>,
        start: u32,
    ) -> Result<NodeIndex, ParseError> {
        let args = self.parse_arguments()?;
        self.expect_op(";")?;
        Ok(self.add(
            NodeKind::ConstructorCall {
                kind,
                qualifier,
                args,
            },
            start,
        ))
    }

    /// Token index of the `.` in `expr.super(...)` when the statement at
    /// the cursor is a qualified superclass constructor call.
    fn find_qualified_super_call(&self) -> Option<usize> {
        let mut depth = 0usize;
        for index in self.pos..self.tokens.len() {
            let token = self.tokens[index];
            let text = self.token_text(token);
            match (token.kind, text) {
                (TokenKind::EndOfFile, _) => return None,
                (TokenKind::Operator, "(" | "[") => depth += 1,
                (TokenKind::Operator, ")" | "]") => depth = depth.checked_sub(1)?,
                (TokenKind::Operator, ";" | "{" | "}") if depth == 0 => return None,
                (TokenKind::Operator, ".") if depth == 0 => {
                    let is_super = self
                        .tokens
                        .get(index + 1)
                        .is_some_and(|t| self.token_text(*t) == "super");
                    let is_call = self
                        .tokens
                        .get(index + 2)
                        .is_some_and(|t| self.token_text(*t) == "(");
                    if is_super && is_call && index > self.pos {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn parse_paren_condition(&mut self) -> Result<NodeIndex, ParseError> {
        self.expect_op("(")?;
        let expr = self.parse_expression()?;
        self.expect_op(")")?;
        Ok(expr)
    }

    fn parse_if(&mut self, start: u32) -> Result<NodeIndex, ParseError> {
        self.next();
        let cond = self.parse_paren_condition()?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.eat_kw("else") {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(self.add(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            start,
        ))
    }

    fn parse_for(&mut self, start: u32) -> Result<NodeIndex, ParseError> {
        self.next();
        self.expect_op("(")?;
        if self.looks_like_foreach_header() {
            let var = self.parse_parameter()?;
            self.expect_op(":")?;
            let iterable = self.parse_expression()?;
            self.expect_op(")")?;
            let body = self.parse_statement()?;
            return Ok(self.add(
                NodeKind::ForEach {
                    var,
                    iterable,
                    body,
                },
                start,
            ));
        }

        let mut init = Vec::new();
        if !self.is_op(";") {
            let init_start = self.start();
            if self.is_kw("final") || self.is_op("@") || self.looks_like_local_decl() {
                let modifiers = self.parse_modifiers()?;
                init.push(self.parse_local_variable_rest(modifiers, init_start)?);
            } else {
                init = self.parse_expression_list()?;
            }
        }
        self.expect_op(";")?;
        let cond = if self.is_op(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_op(";")?;
        let update = if self.is_op(")") {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.expect_op(")")?;
        let body = self.parse_statement()?;
        Ok(self.add(
            NodeKind::For {
                init,
                cond,
                update,
                body,
            },
            start,
        ))
    }

    fn looks_like_foreach_header(&mut self) -> bool {
        let saved = self.pos;
        let result = self.parse_modifiers().is_ok()
            && self.skip_type()
            && self.is_ident()
            && self.is_op_at(1, ":");
        self.pos = saved;
        result
    }

    fn parse_expression_list(&mut self) -> Result<Vec<NodeIndex>, ParseError> {
        let mut exprs = vec![self.parse_expression()?];
        while self.eat_op(",") {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    fn parse_try(&mut self, start: u32) -> Result<NodeIndex, ParseError> {
        self.next();
        let mut resources = Vec::new();
        if self.eat_op("(") {
            while !self.is_op(")") {
                let resource_start = self.start();
                if self.is_kw("final") || self.is_op("@") || self.looks_like_local_decl() {
                    let modifiers = self.parse_modifiers()?;
                    resources.push(self.parse_local_variable_rest(modifiers, resource_start)?);
                } else {
                    resources.push(self.parse_expression()?);
                }
                if !self.eat_op(";") {
                    break;
                }
            }
            self.expect_op(")")?;
        }
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.is_kw("catch") {
            let catch_start = self.start();
            self.next();
            self.expect_op("(")?;
            let param = self.parse_parameter()?;
            self.expect_op(")")?;
            let catch_body = self.parse_block()?;
            catches.push(self.add(
                NodeKind::Catch {
                    param,
                    body: catch_body,
                },
                catch_start,
            ));
        }
        let finally = if self.eat_kw("finally") {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() && resources.is_empty() {
            return Err(self.error("expected 'catch' or 'finally'"));
        }
        Ok(self.add(
            NodeKind::Try {
                resources,
                body,
                catches,
                finally,
            },
            start,
        ))
    }

    fn parse_switch(&mut self, start: u32) -> Result<NodeIndex, ParseError> {
        self.next();
        let selector = self.parse_paren_condition()?;
        self.expect_op("{")?;
        let mut cases = Vec::new();
        while !self.is_op("}") {
            let case_start = self.start();
            let mut labels = Vec::new();
            if self.eat_kw("case") {
                labels.push(self.parse_ternary()?);
                while self.eat_op(",") {
                    labels.push(self.parse_ternary()?);
                }
            } else {
                self.expect_kw("default")?;
            }
            self.expect_op(":")?;
            let mut statements = Vec::new();
            while !self.is_kw("case") && !self.is_kw("default") && !self.is_op("}") {
                if self.at_eof() {
                    return Err(self.error("expected '}'"));
                }
                statements.push(self.parse_statement()?);
            }
            cases.push(self.add(NodeKind::SwitchCase { labels, statements }, case_start));
        }
        self.next();
        Ok(self.add(NodeKind::Switch { selector, cases }, start))
    }
}
