//! Quarantine error types
//!
//! Error codes:
//! - QUARANTINE_IO_FAILED (FATAL) - payload could not be made durable
//! - QUARANTINE_VERIFY_FAILED (FATAL) - read-back did not match the payload
//!
//! Losing a corrupt payload is data loss, so every quarantine failure is fatal.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Quarantine error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineErrorCode {
    /// Create, write, fsync or rename failed
    QuarantineIoFailed,
    /// File on disk differs from the payload after writing
    QuarantineVerifyFailed,
}

impl QuarantineErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QuarantineErrorCode::QuarantineIoFailed => "QUARANTINE_IO_FAILED",
            QuarantineErrorCode::QuarantineVerifyFailed => "QUARANTINE_VERIFY_FAILED",
        }
    }
}

impl fmt::Display for QuarantineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Quarantine error with the file it concerns
#[derive(Debug)]
pub struct QuarantineError {
    code: QuarantineErrorCode,
    message: String,
    path: PathBuf,
    source: Option<io::Error>,
}

impl QuarantineError {
    /// I/O failure while persisting a payload
    pub fn io_failed(message: impl Into<String>, path: &Path, source: io::Error) -> Self {
        Self {
            code: QuarantineErrorCode::QuarantineIoFailed,
            message: message.into(),
            path: path.to_path_buf(),
            source: Some(source),
        }
    }

    /// Read-back mismatch
    pub fn verify_failed(message: impl Into<String>, path: &Path) -> Self {
        Self {
            code: QuarantineErrorCode::QuarantineVerifyFailed,
            message: message.into(),
            path: path.to_path_buf(),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QuarantineErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the quarantine file path involved
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All quarantine errors are fatal
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for QuarantineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[FATAL] {}: {} (path: {})",
            self.code.code(),
            self.message,
            self.path.display()
        )?;
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for QuarantineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for quarantine operations
pub type QuarantineResult<T> = Result<T, QuarantineError>;
