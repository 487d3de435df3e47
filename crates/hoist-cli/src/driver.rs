//! Runs one `hoist` command over a source tree.

use crate::args::{CliArgs, Command, MoveArgs, OutputFormat, VisibilityArgs};
use crate::reporter::Reporter;
use anyhow::{Context, Result, bail};
use hoist_common::{CancellationToken, Change, RefactoringConfig, RefactoringStatus};
use hoist_frontend::InMemoryWorkspace;
use hoist_model::{ChangeApplier, Program, SymbolKind};
use hoist_relocate::Relocator;
use hoist_visibility::display_name;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// What a command printed, and whether it should fail the process.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub text: String,
    pub failed: bool,
    /// Files written by `move --write`.
    pub written: Vec<PathBuf>,
}

pub fn run(args: &CliArgs, color: bool) -> Result<CommandOutput> {
    let config = load_config(args.config.as_deref())?;
    match &args.command {
        Command::Move(move_args) => run_move(move_args, &config, args.format, color),
        Command::Visibility(visibility_args) => {
            run_visibility(visibility_args, &config, args.format, color)
        }
        Command::Symbols(sources) => {
            let workspace = load_workspace(&sources.root)?;
            list_symbols(&workspace, args.format)
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<RefactoringConfig> {
    match path {
        Some(path) => RefactoringConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RefactoringConfig::default()),
    }
}

/// `.java` files under `root`, in path order.
pub fn discover_sources(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("source root {} is not a directory", root.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "java") {
            files.push(path.to_path_buf());
        }
    }
    debug!(root = %root.display(), files = files.len(), "discovered sources");
    Ok(files)
}

pub fn load_workspace(root: &Path) -> Result<InMemoryWorkspace> {
    let mut sources = Vec::new();
    for path in discover_sources(root)? {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        sources.push((path, text));
    }
    InMemoryWorkspace::from_sources(sources).context("failed to load sources")
}

fn lookup(workspace: &InMemoryWorkspace, name: &str) -> Result<hoist_model::SymbolId> {
    workspace
        .find_symbol(name)
        .with_context(|| format!("no declaration named '{name}'"))
}

fn has_failure(status: &RefactoringStatus) -> bool {
    status.has_error() || status.has_fatal()
}

// =============================================================================
// move
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveReport<'a> {
    status: &'a RefactoringStatus,
    changes: &'a [Change],
    written: &'a [PathBuf],
}

fn run_move(
    args: &MoveArgs,
    config: &RefactoringConfig,
    format: OutputFormat,
    color: bool,
) -> Result<CommandOutput> {
    let mut workspace = load_workspace(&args.sources.root)?;
    let ty = lookup(&workspace, &args.ty)?;
    let cancel = CancellationToken::new();
    let options = args.options(config);

    let (status, changes, mut text) = {
        let relocator = Relocator::new(&workspace, config, &cancel);
        let reporter = Reporter::new(&workspace, color);
        match relocator.move_to_top_level(ty, &options) {
            Ok(outcome) => {
                let mut sections = Vec::new();
                if !outcome.status.is_empty() {
                    sections.push(reporter.render_status(&outcome.status));
                }
                sections.extend(outcome.changes.iter().map(|c| reporter.render_change(c)));
                (outcome.status, outcome.changes, sections.join("\n\n"))
            }
            Err(status) => {
                let text = reporter.render_status(&status);
                (status, Vec::new(), text)
            }
        }
    };

    let failed = has_failure(&status);
    let mut written = Vec::new();
    if args.write && !failed && !changes.is_empty() {
        written = write_changes(&mut workspace, &changes)?;
        info!(files = written.len(), "move written");
        for path in &written {
            text.push_str(&format!("\nwrote {}", path.display()));
        }
    }

    if format == OutputFormat::Json {
        text = serde_json::to_string_pretty(&MoveReport {
            status: &status,
            changes: &changes,
            written: &written,
        })?;
    }
    Ok(CommandOutput {
        text,
        failed,
        written,
    })
}

/// Apply `changes` to the workspace, then write every touched file.
///
/// The workspace rejects the whole set before anything is written if an
/// edit does not apply or a result does not parse.
pub fn write_changes(workspace: &mut InMemoryWorkspace, changes: &[Change]) -> Result<Vec<PathBuf>> {
    for change in changes {
        if change.is_create() && change.path().exists() {
            bail!("{} already exists", change.path().display());
        }
    }
    workspace
        .apply_changes(changes)
        .context("change set does not apply")?;

    let mut written = Vec::new();
    for change in changes {
        let path = change.path();
        let text = workspace
            .unit_by_path(path)
            .and_then(|unit| workspace.text(unit))
            .with_context(|| format!("{} missing after apply", path.display()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path.to_path_buf());
    }
    Ok(written)
}

// =============================================================================
// visibility
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdjustmentLine {
    symbol: String,
    current: &'static str,
    required: &'static str,
    rewritten: bool,
}

fn run_visibility(
    args: &VisibilityArgs,
    config: &RefactoringConfig,
    format: OutputFormat,
    color: bool,
) -> Result<CommandOutput> {
    let workspace = load_workspace(&args.sources.root)?;
    let symbol = lookup(&workspace, &args.symbol)?;
    let cancel = CancellationToken::new();
    let relocator = Relocator::new(&workspace, config, &cancel);
    let report = match relocator.adjust_visibility(symbol, args.directions()) {
        Ok(report) => report,
        Err(status) => {
            return Ok(CommandOutput {
                text: Reporter::new(&workspace, color).render_status(&status),
                failed: true,
                written: Vec::new(),
            });
        }
    };

    let symbols = workspace.symbols();
    let lines: Vec<AdjustmentLine> = report
        .adjustments
        .iter()
        .map(|a| AdjustmentLine {
            symbol: display_name(symbols, a.target),
            current: a.current.label(),
            required: a.required.label(),
            rewritten: a.needs_rewriting,
        })
        .collect();
    let failed = has_failure(&report.status);
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "adjustments": lines,
            "substitutions": report.substitutions.len(),
            "status": report.status,
        }))?,
        OutputFormat::Text => {
            let mut out: Vec<String> = lines
                .iter()
                .map(|l| format!("{}: {} -> {}", l.symbol, l.current, l.required))
                .collect();
            if out.is_empty() {
                out.push("no adjustments needed".to_string());
            }
            if !report.status.is_empty() {
                out.push(Reporter::new(&workspace, color).render_status(&report.status));
            }
            out.join("\n")
        }
    };
    Ok(CommandOutput {
        text,
        failed,
        written: Vec::new(),
    })
}

// =============================================================================
// symbols
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SymbolLine {
    name: String,
    kind: &'static str,
    visibility: &'static str,
}

pub fn list_symbols(workspace: &InMemoryWorkspace, format: OutputFormat) -> Result<CommandOutput> {
    let symbols = workspace.symbols();
    let lines: Vec<SymbolLine> = symbols
        .iter()
        .filter(|s| s.decl.is_some() && !s.is_local)
        .map(|s| SymbolLine {
            name: symbols.qualified_name(s.id),
            kind: match s.kind {
                SymbolKind::Type(kind) => kind.keyword(),
                SymbolKind::Field => "field",
                SymbolKind::Method => "method",
                SymbolKind::Constructor => "constructor",
            },
            visibility: symbols.visibility(s.id).label(),
        })
        .collect();
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&lines)?,
        OutputFormat::Text => lines
            .iter()
            .map(|l| format!("{:<12} {:<10} {}", l.kind, l.visibility, l.name))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(CommandOutput {
        text,
        failed: false,
        written: Vec::new(),
    })
}

#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod driver_tests;
