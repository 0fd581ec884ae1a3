//! CLI command implementations
//!
//! Resolves configuration (file, then flags), opens the store and the
//! quarantine directory, and hands both to an [`Auditor`]. Reports go to
//! stdout; logs go to stderr.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audit::{AuditConfig, AuditError, AuditMode, AuditSummary, Auditor, DEFAULT_BUCKET};
use crate::observability::{log_event_with_fields, AuditEvent, Logger, Severity};
use crate::quarantine::DirectorySink;
use crate::report::{ReportEmitter, ReportFormat};
use crate::store::{ObligationStore, StoreOptions};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bucket holding storage obligations
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Directory receiving quarantined payloads (optional, default ".")
    #[serde(default = "default_quarantine_dir")]
    pub quarantine_dir: PathBuf,

    /// Store memory map size in bytes (optional, default 1GB)
    #[serde(default = "default_map_size")]
    pub map_size_bytes: u64,

    /// Maximum named buckets in the store (optional, default 16)
    #[serde(default = "default_max_buckets")]
    pub max_buckets: u32,

    /// Read each quarantine file back and compare its CRC32 (default true)
    #[serde(default = "default_verify_quarantine")]
    pub verify_quarantine: bool,
}

fn default_bucket_name() -> String {
    DEFAULT_BUCKET.to_string()
}
fn default_quarantine_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_map_size() -> u64 {
    1073741824
} // 1GB
fn default_max_buckets() -> u32 {
    16
}
fn default_verify_quarantine() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_name: default_bucket_name(),
            quarantine_dir: default_quarantine_dir(),
            map_size_bytes: default_map_size(),
            max_buckets: default_max_buckets(),
            verify_quarantine: default_verify_quarantine(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Config file (if any) with command-line overrides applied
    pub fn resolve(cli: &Cli) -> CliResult<Self> {
        let mut config = match cli.config {
            Some(ref path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(ref bucket) = cli.bucket {
            config.bucket_name = bucket.clone();
        }
        if let Some(ref dir) = cli.quarantine_dir {
            config.quarantine_dir = dir.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.bucket_name.is_empty() {
            return Err(CliError::config_error("bucket_name must not be empty"));
        }

        if self.quarantine_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("quarantine_dir must not be empty"));
        }

        if self.map_size_bytes == 0 {
            return Err(CliError::config_error("map_size_bytes must be > 0"));
        }

        if self.max_buckets == 0 {
            return Err(CliError::config_error("max_buckets must be > 0"));
        }

        Ok(())
    }

    /// Store open options
    pub fn store_options(&self) -> CliResult<StoreOptions> {
        let map_size = usize::try_from(self.map_size_bytes).map_err(|_| {
            CliError::config_error(format!(
                "map_size_bytes {} does not fit this platform",
                self.map_size_bytes
            ))
        })?;
        Ok(StoreOptions {
            map_size,
            max_buckets: self.max_buckets,
        })
    }

    /// Settings handed to the auditor
    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            bucket: self.bucket_name.clone(),
        }
    }
}

/// Run a parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    if cli.quiet {
        Logger::set_min_severity(Severity::Warn);
    }

    let mode = audit_mode(&cli.command)?;
    let config = Config::resolve(&cli)?;
    log_event_with_fields(
        AuditEvent::ConfigLoaded,
        &[
            ("bucket", config.bucket_name.as_str()),
            ("quarantine_dir", config.quarantine_dir.display().to_string().as_str()),
            ("verify_quarantine", if config.verify_quarantine { "true" } else { "false" }),
        ],
    );

    let stdout = io::stdout();
    run_audit(cli.command.store(), &config, mode, cli.format, stdout.lock())?;
    Ok(())
}

/// Repair only runs when explicitly confirmed.
fn audit_mode(command: &Command) -> CliResult<AuditMode> {
    match command {
        Command::Scan { .. } => Ok(AuditMode::ScanOnly),
        Command::Repair { confirm: true, .. } => Ok(AuditMode::Repair),
        Command::Repair { confirm: false, .. } => Err(CliError::config_error(
            "repair deletes corrupt records from the store; rerun with --confirm",
        )),
    }
}

/// Open `store_path`, audit it in `mode` and write reports to `out`.
pub fn run_audit<W: Write>(
    store_path: &Path,
    config: &Config,
    mode: AuditMode,
    format: ReportFormat,
    out: W,
) -> CliResult<AuditSummary> {
    let store = ObligationStore::open(store_path, &config.store_options()?)
        .map_err(AuditError::store_open_failed)?;
    log_event_with_fields(
        AuditEvent::StoreOpened,
        &[("path", store_path.display().to_string().as_str())],
    );

    let sink = DirectorySink::open(&config.quarantine_dir, config.verify_quarantine)
        .map_err(|e| CliError::io_error(format!("cannot prepare quarantine directory: {}", e)))?;

    let mut auditor = Auditor::new(store, sink, config.audit_config());
    let mut emitter = ReportEmitter::new(format, out);
    Ok(auditor.run(mode, &mut emitter)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditErrorCode;
    use crate::cli::CliErrorCode;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bucket_name, "BucketStorageObligations");
        assert_eq!(config.quarantine_dir, PathBuf::from("."));
        assert!(config.verify_quarantine);
    }

    #[test]
    fn test_config_load_and_validate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scrub.json");
        fs::write(&path, r#"{"bucket_name": "", "max_buckets": 4}"#).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("bucket_name"));
    }

    #[test]
    fn test_config_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scrub.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).unwrap_err().message().contains("Invalid config JSON"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scrub.json");
        fs::write(
            &path,
            r#"{"bucket_name": "FromFile", "quarantine_dir": "/from/file", "verify_quarantine": false}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "obligation-scrub",
            "--config",
            path.to_str().unwrap(),
            "--bucket",
            "FromFlag",
            "scan",
            "host.db",
        ])
        .unwrap();
        let config = Config::resolve(&cli).unwrap();
        assert_eq!(config.bucket_name, "FromFlag");
        assert_eq!(config.quarantine_dir, PathBuf::from("/from/file"));
        assert!(!config.verify_quarantine);
    }

    #[test]
    fn test_repair_requires_confirm() {
        let cli = Cli::try_parse_from(["obligation-scrub", "repair", "host.db"]).unwrap();
        let err = run_command(cli).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("--confirm"));
    }

    #[test]
    fn test_missing_store_is_open_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            quarantine_dir: temp_dir.path().join("q"),
            ..Config::default()
        };

        let err = run_audit(
            &temp_dir.path().join("absent.db"),
            &config,
            AuditMode::ScanOnly,
            ReportFormat::Text,
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::AuditFailed);
        assert_eq!(
            err.audit_error().map(|e| e.code()),
            Some(AuditErrorCode::AuditStoreOpenFailed)
        );
        assert!(!temp_dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_store_options_from_config() {
        let options = Config::default().store_options().unwrap();
        assert_eq!(options.map_size, 1 << 30);
        assert_eq!(options.max_buckets, 16);
    }
}
