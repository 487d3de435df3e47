#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use hoist_cli::args::CliArgs;
use hoist_cli::{driver, tracing_config};
use std::io::IsTerminal;

const EXIT_SUCCESS: i32 = 0;
const EXIT_REFACTORING_FAILED: i32 = 1;

fn main() -> Result<()> {
    // HOIST_LOG / RUST_LOG opt in; HOIST_LOG_FORMAT=text|tree|json.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let color = !args.no_color && std::io::stdout().is_terminal();
    let output = driver::run(&args, color)?;
    if !output.text.is_empty() {
        println!("{}", output.text);
    }
    std::process::exit(if output.failed {
        EXIT_REFACTORING_FAILED
    } else {
        EXIT_SUCCESS
    });
}
