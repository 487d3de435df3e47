//! Common types and utilities for the hoist refactoring engine.
//!
//! This crate provides foundational types used across the workspace:
//! - Source positions (`UnitId`, `Span`, `Location`)
//! - Refactoring outcome reporting (`RefactoringStatus`, `Severity`)
//! - Diagnostic message templates (`messages`)
//! - Text edits and their transactional application (`TextEdit`, `Change`)
//! - Cooperative cancellation (`CancellationToken`)
//! - Per-invocation configuration (`RefactoringConfig`)

pub mod cancel;
pub mod config;
pub mod edit;
pub mod messages;
pub mod span;
pub mod status;

pub use cancel::{CancellationToken, Cancelled};
pub use config::{
    AccessorPreference, ConfigError, NamingConfig, NestedThisPolicy, RefactoringConfig,
    SeverityConfig,
};
pub use edit::{ApplyError, Change, TextEdit, apply_text_edits};
pub use messages::{DiagnosticMessage, format_message};
pub use span::{Location, Span, UnitId};
pub use status::{RefactoringStatus, Severity, StatusEntry};
