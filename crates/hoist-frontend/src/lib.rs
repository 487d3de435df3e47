//! Front end for the hoist refactoring engine.
//!
//! Scans, parses and binds Java-like sources into the `hoist-model`
//! representation, and provides [`InMemoryWorkspace`], a host that
//! implements every collaborator trait the refactoring core consumes.

pub mod binder;
pub mod library;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod workspace;

pub use parser::parse;
pub use scanner::{is_valid_identifier, scan};
pub use workspace::{InMemoryWorkspace, WorkspaceError};

/// A syntax error, reported at the offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: u32, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}
