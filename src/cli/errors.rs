//! CLI-specific error types
//!
//! All CLI errors are FATAL and end the process with a non-zero exit.

use std::fmt;
use std::io;

use crate::audit::AuditError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or flag error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// The audit halted
    AuditFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::AuditFailed => "CLI_AUDIT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    source: Option<AuditError>,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Audit failure
    pub fn audit_failed(err: AuditError) -> Self {
        Self {
            code: CliErrorCode::AuditFailed,
            message: err.code().code().to_string(),
            source: Some(err),
        }
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Underlying audit error, if any
    pub fn audit_error(&self) -> Option<&AuditError> {
        self.source.as_ref()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(ref err) => write!(f, "{}: {}", self.code.code(), err),
            None => write!(f, "{}: {}", self.code.code(), self.message),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<AuditError> for CliError {
    fn from(e: AuditError) -> Self {
        Self::audit_failed(e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
