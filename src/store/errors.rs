//! Store error types
//!
//! Error codes:
//! - STORE_OPEN_FAILED (FATAL) - store file missing, locked or not a store
//! - STORE_BUCKET_MISSING (FATAL) - named bucket does not exist
//! - STORE_READ_FAILED (ERROR)
//! - STORE_WRITE_FAILED (ERROR) - write transaction aborted

use std::fmt;
use std::io;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, caller decides
    Error,
    /// Process must terminate
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Store could not be opened
    StoreOpenFailed,
    /// Named bucket is absent
    StoreBucketMissing,
    /// Read transaction or cursor failure
    StoreReadFailed,
    /// Write transaction failure
    StoreWriteFailed,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::StoreOpenFailed => "STORE_OPEN_FAILED",
            StoreErrorCode::StoreBucketMissing => "STORE_BUCKET_MISSING",
            StoreErrorCode::StoreReadFailed => "STORE_READ_FAILED",
            StoreErrorCode::StoreWriteFailed => "STORE_WRITE_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::StoreOpenFailed => Severity::Fatal,
            StoreErrorCode::StoreBucketMissing => Severity::Fatal,
            StoreErrorCode::StoreReadFailed => Severity::Error,
            StoreErrorCode::StoreWriteFailed => Severity::Error,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    details: Option<String>,
    source: Option<heed::Error>,
}

impl StoreError {
    /// Store could not be opened
    pub fn open_failed(message: impl Into<String>, source: heed::Error) -> Self {
        Self {
            code: StoreErrorCode::StoreOpenFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Store path rejected before touching the engine
    pub fn open_rejected(message: impl Into<String>, source: io::Error) -> Self {
        Self::open_failed(message, heed::Error::Io(source))
    }

    /// Bucket does not exist in the store
    pub fn bucket_missing(bucket: &str) -> Self {
        Self {
            code: StoreErrorCode::StoreBucketMissing,
            message: "bucket not found".to_string(),
            details: Some(format!("bucket: {}", bucket)),
            source: None,
        }
    }

    /// Read transaction, bucket open or cursor step failed
    pub fn read_failed(message: impl Into<String>, source: heed::Error) -> Self {
        Self {
            code: StoreErrorCode::StoreReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Write transaction failed; nothing from it was applied
    pub fn write_failed(message: impl Into<String>, source: heed::Error) -> Self {
        Self {
            code: StoreErrorCode::StoreWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Write transaction failed without an engine error
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::StoreWriteFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach a key (hex encoded) to the error context
    pub fn with_key(mut self, key: &[u8]) -> Self {
        self.details = Some(format!("key: {}", hex::encode(key)));
        self
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
