//! CLI argument definitions using clap
//!
//! Commands:
//! - obligation-scrub scan <STORE>
//! - obligation-scrub repair <STORE> --confirm

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::ReportFormat;

/// Finds, quarantines and optionally removes undecodable storage obligations
#[derive(Parser, Debug)]
#[command(name = "obligation-scrub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bucket holding storage obligations
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Directory receiving quarantined payloads
    #[arg(long, global = true)]
    pub quarantine_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Only log warnings and worse
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a store, quarantine corrupt obligations and report. Never writes the store.
    Scan {
        /// Store data file
        store: PathBuf,
    },

    /// Scan, then delete the corrupt obligations found and verify the bucket
    Repair {
        /// Store data file
        store: PathBuf,

        /// Required: acknowledge that corrupt records will be deleted
        #[arg(long)]
        confirm: bool,
    },
}

impl Command {
    /// Store path named by the command
    pub fn store(&self) -> &PathBuf {
        match self {
            Command::Scan { store } | Command::Repair { store, .. } => store,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_with_defaults() {
        let cli = Cli::try_parse_from(["obligation-scrub", "scan", "host.db"]).unwrap();
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(!cli.quiet);
        assert!(cli.bucket.is_none());
        assert!(matches!(cli.command, Command::Scan { .. }));
        assert_eq!(cli.command.store(), &PathBuf::from("host.db"));
    }

    #[test]
    fn test_repair_confirm_flag() {
        let cli =
            Cli::try_parse_from(["obligation-scrub", "repair", "host.db", "--confirm"]).unwrap();
        assert!(matches!(cli.command, Command::Repair { confirm: true, .. }));

        let cli = Cli::try_parse_from(["obligation-scrub", "repair", "host.db"]).unwrap();
        assert!(matches!(cli.command, Command::Repair { confirm: false, .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "obligation-scrub",
            "scan",
            "host.db",
            "--bucket",
            "Other",
            "--quarantine-dir",
            "/tmp/q",
            "--format",
            "json",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.bucket.as_deref(), Some("Other"));
        assert_eq!(cli.quarantine_dir, Some(PathBuf::from("/tmp/q")));
        assert_eq!(cli.format, ReportFormat::Json);
        assert!(cli.quiet);
    }

    #[test]
    fn test_store_path_required() {
        assert!(Cli::try_parse_from(["obligation-scrub", "scan"]).is_err());
    }
}
