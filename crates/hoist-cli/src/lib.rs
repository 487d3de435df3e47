//! Command-line driver for the hoist refactoring engine.
//!
//! - `args` - the `hoist` command line
//! - `driver` - source discovery, command execution and writing to disk
//! - `reporter` - status lines and change previews
//! - `tracing_config` - opt-in tracing subscriber

pub mod args;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
