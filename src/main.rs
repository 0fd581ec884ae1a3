//! obligation-scrub CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments (via cli::run)
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Logs fatal errors to stderr
//! 4. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use obligation_scrub::cli;
use obligation_scrub::observability::Logger;

fn main() {
    if let Err(e) = cli::run() {
        Logger::fatal(
            "SCRUB_ABORTED",
            &[("code", e.code_str()), ("error", e.to_string().as_str())],
        );
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
