//! Recursive-descent parser producing a [`Tree`].
//!
//! The parser state is split across files the way the grammar splits:
//! declarations, statements, expressions and types. All of them share the
//! token cursor helpers defined here.

mod state_declarations;
mod state_expressions;
mod state_statements;
mod state_types;

use crate::ParseError;
use crate::scanner::{self, Token, TokenKind};
use hoist_common::{Span, UnitId};
use hoist_model::{NodeIndex, NodeKind, Tree};

pub struct ParserState<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    tree: Tree,
    /// Token index at which postfix expression parsing must stop; used to
    /// leave `outer.super(...)` to the statement parser.
    stop_at: Option<usize>,
}

/// Parse `text` as one compilation unit.
pub fn parse(unit: UnitId, text: &str) -> Result<Tree, ParseError> {
    let tokens = scanner::scan(text)?;
    let mut state = ParserState {
        text,
        tokens,
        pos: 0,
        tree: Tree::new(unit),
        stop_at: None,
    };
    let root = state.parse_compilation_unit()?;
    state.tree.finish(root);
    tracing::trace!(unit = unit.0, nodes = state.tree.len(), "parsed unit");
    Ok(state.tree)
}

impl<'a> ParserState<'a> {
    // =========================================================================
    // Token cursor
    // =========================================================================

    fn token(&self) -> Token {
        self.peek_token(0)
    }

    fn peek_token(&self, ahead: usize) -> Token {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens
            .get((self.pos + ahead).min(last))
            .copied()
            .unwrap_or(Token {
                kind: TokenKind::EndOfFile,
                start: self.text.len() as u32,
                end: self.text.len() as u32,
            })
    }

    fn token_text(&self, token: Token) -> &'a str {
        self.text
            .get(token.start as usize..token.end as usize)
            .unwrap_or("")
    }

    fn current_text(&self) -> &'a str {
        self.token_text(self.token())
    }

    fn next(&mut self) -> Token {
        let token = self.token();
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
        token
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.tokens.get(self.pos - 1).map(|t| t.end).unwrap_or(0)
        }
    }

    fn at_eof(&self) -> bool {
        self.token().kind == TokenKind::EndOfFile
    }

    fn is_op(&self, op: &str) -> bool {
        self.is_op_at(0, op)
    }

    fn is_op_at(&self, ahead: usize, op: &str) -> bool {
        let token = self.peek_token(ahead);
        token.kind == TokenKind::Operator && self.token_text(token) == op
    }

    fn is_kw(&self, kw: &str) -> bool {
        self.is_kw_at(0, kw)
    }

    fn is_kw_at(&self, ahead: usize, kw: &str) -> bool {
        let token = self.peek_token(ahead);
        token.kind == TokenKind::Keyword && self.token_text(token) == kw
    }

    fn is_ident(&self) -> bool {
        self.token().kind == TokenKind::Identifier
    }

    fn is_ident_at(&self, ahead: usize) -> bool {
        self.peek_token(ahead).kind == TokenKind::Identifier
    }

    /// True when the token `ahead` starts exactly where the previous one ends.
    fn is_adjacent(&self, ahead: usize) -> bool {
        ahead > 0 && self.peek_token(ahead).start == self.peek_token(ahead - 1).end
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.is_op(op) {
            self.next();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.is_kw(kw) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<Token, ParseError> {
        if self.is_op(op) {
            Ok(self.next())
        } else {
            Err(self.error(&format!("expected '{op}'")))
        }
    }

    fn expect_kw(&mut self, kw: &str) -> Result<Token, ParseError> {
        if self.is_kw(kw) {
            Ok(self.next())
        } else {
            Err(self.error(&format!("expected '{kw}'")))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        if self.is_ident() {
            let token = self.next();
            Ok((
                self.token_text(token).to_string(),
                Span::new(token.start, token.end),
            ))
        } else {
            Err(self.error("expected identifier"))
        }
    }

    fn error(&self, message: &str) -> ParseError {
        let token = self.token();
        let found = if token.kind == TokenKind::EndOfFile {
            "end of file".to_string()
        } else {
            format!("'{}'", self.token_text(token))
        };
        ParseError::new(token.start, format!("{message}, found {found}"))
    }

    fn add(&mut self, kind: NodeKind, start: u32) -> NodeIndex {
        let end = self.prev_end().max(start);
        self.tree.add(kind, Span::new(start, end))
    }

    fn start(&self) -> u32 {
        self.token().start
    }
}

#[cfg(test)]
#[path = "../../tests/parser_tests.rs"]
mod parser_tests;
