//! Visibility analysis and adjustment for the hoist refactoring engine.
//!
//! - `locator` - reference edges into and out of a declaration
//! - `layout` - declaration placement, optionally after a pending move
//! - `hierarchy` - per-invocation type hierarchy cache
//! - `analyzer` - the visibility threshold of one edge
//! - `adjustor` - merging thresholds into per-declaration adjustments
//! - `rewrite` - adjustments and accessor substitutions as text edits

pub mod adjustor;
pub mod analyzer;
pub mod hierarchy;
pub mod layout;
pub mod locator;
pub mod rewrite;

pub use adjustor::{
    AccessorKind, AccessorSubstitution, AdjustmentMap, Directions, MemberVisibilityAdjustor,
    VisibilityAdjustment, VisibilityReport, adjust_visibility, display_name,
};
pub use analyzer::VisibilityAnalyzer;
pub use hierarchy::HierarchyCache;
pub use layout::{Layout, Placement};
pub use locator::{EdgeTarget, ReferenceEdge, ReferenceLocator, ReferencingScope};
pub use rewrite::{accessor_edits, declaration_edits, keyword_edit, substitution_edits};
