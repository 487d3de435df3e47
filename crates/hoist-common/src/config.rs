//! Per-invocation refactoring configuration.
//!
//! A `RefactoringConfig` is built once by the caller (usually from a JSON
//! file) and passed by reference into every component that needs it.
//! Every field has a default, so an empty JSON object is a valid config.

use crate::status::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How outgoing field accesses that need widening are satisfied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessorPreference {
    /// Route reads through an existing getter.
    #[default]
    Getters,
    /// Route writes through an existing setter.
    Setters,
    /// Route reads through getters and writes through setters.
    Accessors,
    /// Always widen the field itself.
    FieldOnly,
}

impl AccessorPreference {
    #[must_use]
    pub const fn uses_getters(self) -> bool {
        matches!(self, AccessorPreference::Getters | AccessorPreference::Accessors)
    }

    #[must_use]
    pub const fn uses_setters(self) -> bool {
        matches!(self, AccessorPreference::Setters | AccessorPreference::Accessors)
    }
}

/// Severity assigned to each class of visibility diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    /// A declaration's visibility keyword will change.
    pub visibility_change: Severity,
    /// A required change cannot be made (e.g. the member has no source).
    pub failure: Severity,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            visibility_change: Severity::Warning,
            failure: Severity::Warning,
        }
    }
}

/// How an enclosing-instance access is written inside a type nested in
/// the moved type (anonymous, local or member type).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NestedThisPolicy {
    /// `Moved.this.field`: always names the moved type explicitly.
    #[default]
    QualifyWithMovedType,
    /// `field`: relies on lexical lookup reaching the moved type's field.
    UnqualifiedField,
}

/// Prefixes and suffixes applied to synthesized names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub field_prefixes: Vec<String>,
    pub field_suffixes: Vec<String>,
    pub parameter_prefixes: Vec<String>,
    pub parameter_suffixes: Vec<String>,
}

impl NamingConfig {
    /// Decorate `base` with the first configured field prefix and suffix.
    #[must_use]
    pub fn field_name(&self, base: &str) -> String {
        decorate(base, &self.field_prefixes, &self.field_suffixes)
    }

    #[must_use]
    pub fn parameter_name(&self, base: &str) -> String {
        decorate(base, &self.parameter_prefixes, &self.parameter_suffixes)
    }

    /// Strip any configured field affixes from `name`.
    #[must_use]
    pub fn strip_field_affixes<'a>(&self, name: &'a str) -> &'a str {
        let mut stripped = name;
        for prefix in &self.field_prefixes {
            if let Some(rest) = stripped.strip_prefix(prefix.as_str()) {
                if !rest.is_empty() {
                    stripped = rest;
                    break;
                }
            }
        }
        for suffix in &self.field_suffixes {
            if let Some(rest) = stripped.strip_suffix(suffix.as_str()) {
                if !rest.is_empty() {
                    stripped = rest;
                    break;
                }
            }
        }
        stripped
    }
}

fn decorate(base: &str, prefixes: &[String], suffixes: &[String]) -> String {
    let prefix = prefixes.first().map(String::as_str).unwrap_or("");
    let suffix = suffixes.first().map(String::as_str).unwrap_or("");
    if prefix.is_empty() {
        format!("{base}{suffix}")
    } else {
        // `outer` with prefix `f` becomes `fOuter`.
        let mut chars = base.chars();
        let capitalized: String = match chars.next() {
            Some(first) if prefix.chars().last().is_some_and(char::is_alphanumeric) => {
                first.to_uppercase().chain(chars).collect()
            }
            Some(first) => std::iter::once(first).chain(chars).collect(),
            None => String::new(),
        };
        format!("{prefix}{capitalized}{suffix}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefactoringConfig {
    pub accessor_preference: AccessorPreference,
    pub severities: SeverityConfig,
    /// Default for marking the synthesized enclosing-instance field `final`.
    pub mark_field_final: bool,
    /// Always write `this.field` for enclosing-instance access.
    pub use_this_qualifier: bool,
    pub nested_this_policy: NestedThisPolicy,
    pub naming: NamingConfig,
    pub indent_unit: String,
    pub line_delimiter: String,
    /// Emit doc comments on synthesized members.
    pub generate_comments: bool,
}

impl Default for RefactoringConfig {
    fn default() -> Self {
        Self {
            accessor_preference: AccessorPreference::default(),
            severities: SeverityConfig::default(),
            mark_field_final: true,
            use_this_qualifier: false,
            nested_this_policy: NestedThisPolicy::default(),
            naming: NamingConfig::default(),
            indent_unit: "    ".to_string(),
            line_delimiter: "\n".to_string(),
            generate_comments: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RefactoringConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded refactoring config");
        Ok(config)
    }
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
