//! Tokenizer for the Java-like source language.
//!
//! The scanner turns the whole text into a token vector up front; the
//! parser then looks ahead freely by index. Whitespace and comments are
//! dropped. `>` is always scanned as a single token so nested type
//! arguments (`List<List<T>>`) need no splitting; the parser joins
//! adjacent `>` tokens back into shift and comparison operators.

use crate::ParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    Operator,
    EndOfFile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
}

pub const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Multi-character operators, longest first within each prefix.
const OPERATORS: &[&str] = &[
    "<<=", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", "<<", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=",
];

const SINGLE_CHAR_OPERATORS: &[u8] = b"(){}[];,.@=<>!~?:+-*/&|^%";

#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}

#[must_use]
pub fn is_primitive(word: &str) -> bool {
    PRIMITIVE_TYPES.contains(&word)
}

/// Whether `name` can be used as an identifier.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !is_keyword(name)
}

pub struct ScannerState<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ScannerState<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    /// Scan the whole text. The last token is always `EndOfFile`.
    pub fn scan_all(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let Some(&c) = self.bytes.get(self.pos) else {
                tokens.push(Token {
                    kind: TokenKind::EndOfFile,
                    start: start as u32,
                    end: start as u32,
                });
                return Ok(tokens);
            };
            let kind = if c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80 {
                self.scan_word()
            } else if c.is_ascii_digit()
                || (c == b'.' && self.peek(1).is_some_and(|d| d.is_ascii_digit()))
            {
                self.scan_number()
            } else if c == b'"' {
                self.scan_quoted(b'"')?;
                TokenKind::StringLiteral
            } else if c == b'\'' {
                self.scan_quoted(b'\'')?;
                TokenKind::CharLiteral
            } else {
                self.scan_operator()?
            };
            tokens.push(Token {
                kind,
                start: start as u32,
                end: self.pos as u32,
            });
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek(0) {
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else if c == b'/' && self.peek(1) == Some(b'/') {
                while let Some(c) = self.peek(0) {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if c == b'/' && self.peek(1) == Some(b'*') {
                let start = self.pos;
                self.pos += 2;
                loop {
                    match self.peek(0) {
                        Some(b'*') if self.peek(1) == Some(b'/') => {
                            self.pos += 2;
                            break;
                        }
                        Some(_) => self.pos += 1,
                        None => {
                            return Err(ParseError::new(start as u32, "unterminated comment"));
                        }
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn scan_word(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.text[self.pos..].chars().next() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if is_keyword(&self.text[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let mut kind = TokenKind::IntLiteral;
        if self.peek(0) == Some(b'0') && matches!(self.peek(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self
                .peek(0)
                .is_some_and(|c| c.is_ascii_hexdigit() || c == b'_')
            {
                self.pos += 1;
            }
        } else {
            while let Some(c) = self.peek(0) {
                match c {
                    b'0'..=b'9' | b'_' => self.pos += 1,
                    b'.' if kind == TokenKind::IntLiteral
                        && (self.peek(1).is_some_and(|d| d.is_ascii_digit())
                            || !self.peek(1).is_some_and(|d| d.is_ascii_alphabetic() || d == b'.')) =>
                    {
                        kind = TokenKind::FloatLiteral;
                        self.pos += 1;
                    }
                    b'e' | b'E' => {
                        kind = TokenKind::FloatLiteral;
                        self.pos += 1;
                        if matches!(self.peek(0), Some(b'+' | b'-')) {
                            self.pos += 1;
                        }
                    }
                    _ => break,
                }
            }
        }
        match self.peek(0) {
            Some(b'l' | b'L') => self.pos += 1,
            Some(b'f' | b'F' | b'd' | b'D') => {
                kind = TokenKind::FloatLiteral;
                self.pos += 1;
            }
            _ => {}
        }
        kind
    }

    fn scan_quoted(&mut self, quote: u8) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                Some(b'\\') => self.pos += 2,
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\n') | None => {
                    return Err(ParseError::new(start as u32, "unterminated literal"));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn scan_operator(&mut self) -> Result<TokenKind, ParseError> {
        let rest = &self.text[self.pos..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.pos += op.len();
            return Ok(TokenKind::Operator);
        }
        match self.peek(0) {
            Some(c) if SINGLE_CHAR_OPERATORS.contains(&c) => {
                self.pos += 1;
                Ok(TokenKind::Operator)
            }
            _ => Err(ParseError::new(self.pos as u32, "unexpected character")),
        }
    }
}

/// Tokenize `text`.
pub fn scan(text: &str) -> Result<Vec<Token>, ParseError> {
    ScannerState::new(text).scan_all()
}

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod scanner_tests;
