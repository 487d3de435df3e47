//! Text edits and change descriptions.
//!
//! The refactoring core never mutates source text. It describes every
//! modification as a [`Change`]: either a list of [`TextEdit`]s against the
//! original text of an existing unit, or the full contents of a new unit.
//! [`apply_text_edits`] is the single place where edits meet text; it
//! rejects overlapping and out-of-range edits instead of guessing.

use crate::span::{Span, UnitId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single text replacement, expressed against the original text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    /// The range to replace.
    pub span: Span,
    /// The new text.
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    pub fn insert(offset: u32, new_text: impl Into<String>) -> Self {
        Self::replace(Span::at(offset), new_text)
    }

    #[must_use]
    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// One unit-level modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    /// Edit an existing unit.
    Edit {
        unit: UnitId,
        path: PathBuf,
        edits: Vec<TextEdit>,
    },
    /// Create a new unit.
    Create { path: PathBuf, contents: String },
}

impl Change {
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Change::Edit { path, .. } | Change::Create { path, .. } => path,
        }
    }

    #[must_use]
    pub fn is_create(&self) -> bool {
        matches!(self, Change::Create { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("overlapping edits at {}..{} and {}..{}", .first.start, .first.end, .second.start, .second.end)]
    Overlap { first: Span, second: Span },
    #[error("edit at {}..{} is outside the text (length {len})", .span.start, .span.end)]
    StaleOffset { span: Span, len: u32 },
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("unit '{}' already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("change rejected: {0}")]
    Rejected(String),
}

/// Apply `edits` to `text`, all offsets referring to the original text.
///
/// Edits are ordered by start offset; edits with the same start keep their
/// relative order, so several insertions at one offset appear in the order
/// they were produced. An insertion may sit at the start or end of a
/// replaced range, but two ranges may not intersect.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Result<String, ApplyError> {
    let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.span.start, e.span.end));

    let mut prev: Option<Span> = None;
    for edit in &ordered {
        let span = edit.span;
        if span.start > span.end
            || span.end > len
            || !text.is_char_boundary(span.start as usize)
            || !text.is_char_boundary(span.end as usize)
        {
            return Err(ApplyError::StaleOffset { span, len });
        }
        if let Some(p) = prev {
            if span.start < p.end {
                return Err(ApplyError::Overlap {
                    first: p,
                    second: span,
                });
            }
        }
        prev = Some(span);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for edit in ordered {
        let start = edit.span.start as usize;
        out.push_str(&text[cursor..start]);
        out.push_str(&edit.new_text);
        cursor = edit.span.end as usize;
    }
    out.push_str(&text[cursor..]);
    tracing::trace!(edits = edits.len(), "applied text edits");
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/edit_tests.rs"]
mod edit_tests;
