//! Hoist: a visibility-aware refactoring engine for a Java-like language.
//!
//! The facade re-exports the workspace crates:
//!
//! - [`common`]: spans, refactoring status, text edits, configuration
//! - [`model`]: symbol model, syntax tree and collaborator traits
//! - [`frontend`]: reference parser, binder and in-memory workspace
//! - [`visibility`]: visibility threshold analysis and adjustment
//! - [`relocate`]: move a member type to top level

pub use hoist_common as common;
pub use hoist_frontend as frontend;
pub use hoist_model as model;
pub use hoist_relocate as relocate;
pub use hoist_visibility as visibility;

pub use hoist_common::{Change, RefactoringConfig, RefactoringStatus, Severity};
pub use hoist_relocate::{MoveOptions, RelocationPlan, Relocator};
pub use hoist_visibility::{Directions, MemberVisibilityAdjustor, VisibilityReport};
