use clap::{Args, Parser, Subcommand, ValueEnum};
use hoist_common::RefactoringConfig;
use hoist_relocate::MoveOptions;
use hoist_visibility::Directions;
use std::path::PathBuf;

/// CLI arguments for the hoist binary.
#[derive(Parser, Debug)]
#[command(
    name = "hoist",
    version,
    about = "Move member types to top level without breaking access"
)]
pub struct CliArgs {
    /// JSON file with refactoring settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How results are printed.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move a member type to a top-level type of its own.
    Move(MoveArgs),
    /// Widen a declaration for the code that refers to it.
    Visibility(VisibilityArgs),
    /// List the types and members declared under a root.
    Symbols(SourceArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory searched recursively for `.java` sources.
    #[arg(long)]
    pub root: PathBuf,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Qualified name of the member type, e.g. `p.Outer.Inner`.
    #[arg(value_name = "TYPE")]
    pub ty: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Package of the new unit; defaults to the enclosing type's package.
    #[arg(long)]
    pub package: Option<String>,

    /// Name of the field holding the enclosing instance.
    #[arg(long)]
    pub field: Option<String>,

    /// Skip the enclosing-instance field unless the moved code uses it.
    #[arg(long = "no-field")]
    pub no_field: bool,

    /// Do not mark the enclosing-instance field `final`.
    #[arg(long = "not-final")]
    pub not_final: bool,

    /// Apply the changes to the files instead of only previewing them.
    #[arg(long)]
    pub write: bool,
}

impl MoveArgs {
    #[must_use]
    pub fn options(&self, config: &RefactoringConfig) -> MoveOptions {
        MoveOptions {
            create_enclosing_field: !self.no_field,
            mark_field_final: config.mark_field_final && !self.not_final,
            enclosing_field_name: self.field.clone(),
            destination_package: self.package.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct VisibilityArgs {
    /// Qualified name, e.g. `p.Outer#count` or `p.Outer.Inner`.
    pub symbol: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Widen for the sites that refer to the declaration.
    #[arg(long)]
    pub incoming: bool,

    /// Widen what the declaration's body refers to.
    #[arg(long)]
    pub outgoing: bool,
}

impl VisibilityArgs {
    /// Both directions unless one is asked for.
    #[must_use]
    pub fn directions(&self) -> Directions {
        let mut directions = Directions::empty();
        directions.set(Directions::INCOMING, self.incoming);
        directions.set(Directions::OUTGOING, self.outgoing);
        if directions.is_empty() {
            Directions::all()
        } else {
            directions
        }
    }
}

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
