use colored::Colorize;
use hoist_common::{Change, Location, RefactoringStatus, Severity, StatusEntry, apply_text_edits};
use hoist_model::Program;
use std::path::Path;

/// Lines of unchanged text shown around a change.
const CONTEXT_LINES: usize = 2;

/// Renders statuses and change sets against the workspace they came from.
pub struct Reporter<'a> {
    program: &'a dyn Program,
    color: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(program: &'a dyn Program, color: bool) -> Self {
        Reporter { program, color }
    }

    pub fn render_status(&self, status: &RefactoringStatus) -> String {
        status
            .entries()
            .iter()
            .map(|entry| self.format_entry(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `src/p/Outer.java:7:9 - error HOIST1004: message`
    pub fn format_entry(&self, entry: &StatusEntry) -> String {
        let severity = self.format_severity(entry.severity);
        let code = format!("HOIST{}", entry.code);
        let code = if self.color { code.dimmed().to_string() } else { code };
        match entry.location.and_then(|l| self.format_location(l)) {
            Some(location) => format!("{location} - {severity} {code}: {}", entry.message),
            None => format!("{severity} {code}: {}", entry.message),
        }
    }

    fn format_severity(&self, severity: Severity) -> String {
        let label = severity.label();
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Fatal | Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().to_string(),
            Severity::Info => label.cyan().to_string(),
        }
    }

    fn format_location(&self, location: Location) -> Option<String> {
        let unit = self.program.unit(location.unit)?;
        let (line, column) = line_column(&unit.text, location.span.start);
        let path = unit.path.display().to_string();
        let path = if self.color { path.cyan().to_string() } else { path };
        Some(format!("{path}:{line}:{column}"))
    }

    /// Unified preview of one change.
    pub fn render_change(&self, change: &Change) -> String {
        match change {
            Change::Edit { unit, path, edits } => {
                let Some(before) = self.program.unit(*unit).map(|u| u.text.as_str()) else {
                    return format!("{}: unknown unit", path.display());
                };
                match apply_text_edits(before, edits) {
                    Ok(after) => unified_preview(path, Some(before), &after, self.color),
                    Err(e) => format!("{}: {e}", path.display()),
                }
            }
            Change::Create { path, contents } => unified_preview(path, None, contents, self.color),
        }
    }
}

/// 1-based line and column of `offset`.
#[must_use]
pub fn line_column(text: &str, offset: u32) -> (usize, usize) {
    let offset = (offset as usize).min(text.len());
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// A single-hunk unified diff of `before` (absent for a new file) and `after`.
#[must_use]
pub fn unified_preview(path: &Path, before: Option<&str>, after: &str, color: bool) -> String {
    let old: Vec<&str> = before.map(|b| b.lines().collect()).unwrap_or_default();
    let new: Vec<&str> = after.lines().collect();
    if before.is_some() && old == new {
        return String::new();
    }
    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let start = prefix.saturating_sub(CONTEXT_LINES);
    let old_end = (old.len() - suffix + CONTEXT_LINES).min(old.len());
    let new_end = (new.len() - suffix + CONTEXT_LINES).min(new.len());

    let paint = |line: String, style: fn(&str) -> colored::ColoredString| {
        if color { style(&line).to_string() } else { line }
    };
    let display = path.display();
    let mut out = Vec::new();
    let from = if before.is_some() { display.to_string() } else { "/dev/null".to_string() };
    out.push(paint(format!("--- {from}"), |s| s.bold()));
    out.push(paint(format!("+++ {display}"), |s| s.bold()));
    out.push(paint(
        format!(
            "@@ -{} +{} @@",
            hunk_range(start, old_end - start),
            hunk_range(start, new_end - start)
        ),
        |s| s.cyan(),
    ));
    for line in &old[start..prefix] {
        out.push(format!(" {line}"));
    }
    for line in &old[prefix..old.len() - suffix] {
        out.push(paint(format!("-{line}"), |s| s.red()));
    }
    for line in &new[prefix..new.len() - suffix] {
        out.push(paint(format!("+{line}"), |s| s.green()));
    }
    for line in &old[old.len() - suffix..old_end] {
        out.push(format!(" {line}"));
    }
    out.join("\n")
}

fn hunk_range(start: usize, len: usize) -> String {
    if len == 0 {
        format!("{start},0")
    } else {
        format!("{},{len}", start + 1)
    }
}

#[cfg(test)]
#[path = "../tests/reporter_tests.rs"]
mod reporter_tests;
