//! CLI module for the obligation scrubber
//!
//! Provides command-line interface for:
//! - scan: Classify and quarantine, read-only
//! - repair: Scan, then delete that scan's corrupt keys and verify

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run_audit, run_command, Config};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse the process arguments and run the command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}
