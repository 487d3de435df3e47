//! Refactoring outcome reporting.
//!
//! A [`RefactoringStatus`] is an ordered list of entries. Analysis stages
//! keep appending to it instead of failing on the first problem; only
//! `Fatal` entries stop change production.

use crate::messages::{DiagnosticMessage, format_message};
use crate::span::Location;
use serde::{Deserialize, Serialize};

/// Severity of a status entry, ordered from least to most severe.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub severity: Severity,
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringStatus {
    entries: Vec<StatusEntry>,
}

impl RefactoringStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A status holding a single entry built from `message`.
    #[must_use]
    pub fn from_message(
        message: &DiagnosticMessage,
        args: &[&str],
        location: Option<Location>,
    ) -> Self {
        let mut status = Self::new();
        status.add_message(message, args, location);
        status
    }

    pub fn add(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    /// Append an entry with the template's default severity.
    pub fn add_message(
        &mut self,
        message: &DiagnosticMessage,
        args: &[&str],
        location: Option<Location>,
    ) {
        self.add_with_severity(message.severity, message, args, location);
    }

    /// Append an entry, overriding the template's default severity.
    pub fn add_with_severity(
        &mut self,
        severity: Severity,
        message: &DiagnosticMessage,
        args: &[&str],
        location: Option<Location>,
    ) {
        self.entries.push(StatusEntry {
            severity,
            code: message.code,
            message: format_message(message.message, args),
            location,
        });
    }

    pub fn merge(&mut self, other: RefactoringStatus) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|e| e.severity).max()
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.max_severity() == Some(Severity::Fatal)
    }

    /// True when any entry is `Error` or worse.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.max_severity().is_some_and(|s| s >= Severity::Error)
    }

    #[must_use]
    pub fn has_code(&self, code: u32) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    pub fn entries_with_code(&self, code: u32) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter().filter(move |e| e.code == code)
    }
}

#[cfg(test)]
#[path = "../tests/status_tests.rs"]
mod status_tests;
