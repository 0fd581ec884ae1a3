//! Audit error types
//!
//! Error codes:
//! - AUDIT_STORE_OPEN_FAILED (FATAL)
//! - AUDIT_SCAN_FAILED (FATAL)
//! - AUDIT_QUARANTINE_FAILED (FATAL)
//! - AUDIT_REPAIR_WRITE_FAILED (FATAL)
//! - AUDIT_RESIDUAL_CORRUPTION (FATAL)
//! - AUDIT_STALE_SCAN (FATAL)
//! - AUDIT_INVALID_TRANSITION (FATAL)
//! - AUDIT_REPORT_FAILED (FATAL)
//!
//! Decode failures are not audit errors: they are handled per record by
//! routing the payload to quarantine.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::obligation::DecodeError;
use crate::quarantine::QuarantineError;
use crate::store::StoreError;

use super::phase::AuditPhase;

/// Audit error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditErrorCode {
    /// Store could not be opened
    AuditStoreOpenFailed,
    /// Read transaction or cursor failed mid-scan
    AuditScanFailed,
    /// A corrupt payload could not be made durable
    AuditQuarantineFailed,
    /// The deletion transaction failed and was aborted
    AuditRepairWriteFailed,
    /// A record still fails to decode after repair
    AuditResidualCorruption,
    /// Repair was handed a scan that is not the latest one
    AuditStaleScan,
    /// Operation not allowed in the current phase
    AuditInvalidTransition,
    /// The report could not be written
    AuditReportFailed,
}

impl AuditErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            AuditErrorCode::AuditStoreOpenFailed => "AUDIT_STORE_OPEN_FAILED",
            AuditErrorCode::AuditScanFailed => "AUDIT_SCAN_FAILED",
            AuditErrorCode::AuditQuarantineFailed => "AUDIT_QUARANTINE_FAILED",
            AuditErrorCode::AuditRepairWriteFailed => "AUDIT_REPAIR_WRITE_FAILED",
            AuditErrorCode::AuditResidualCorruption => "AUDIT_RESIDUAL_CORRUPTION",
            AuditErrorCode::AuditStaleScan => "AUDIT_STALE_SCAN",
            AuditErrorCode::AuditInvalidTransition => "AUDIT_INVALID_TRANSITION",
            AuditErrorCode::AuditReportFailed => "AUDIT_REPORT_FAILED",
        }
    }
}

impl fmt::Display for AuditErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Audit error with the offending key (hex) where one applies
#[derive(Debug)]
pub struct AuditError {
    code: AuditErrorCode,
    message: String,
    key: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl AuditError {
    fn new(code: AuditErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            key: None,
            source: None,
        }
    }

    fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    fn with_key(mut self, key: &[u8]) -> Self {
        self.key = Some(hex::encode(key));
        self
    }

    /// Store file could not be opened
    pub fn store_open_failed(source: StoreError) -> Self {
        Self::new(AuditErrorCode::AuditStoreOpenFailed, "cannot open store").with_source(source)
    }

    /// Store failed during a read pass
    pub fn scan_failed(source: StoreError) -> Self {
        Self::new(AuditErrorCode::AuditScanFailed, "store read failed during scan")
            .with_source(source)
    }

    /// Scan bookkeeping disagrees with the store walk
    pub fn scan_inconsistent(message: impl Into<String>) -> Self {
        Self::new(AuditErrorCode::AuditScanFailed, message)
    }

    /// Quarantine writer failed for `key`
    pub fn quarantine_failed(key: &[u8], source: QuarantineError) -> Self {
        Self::new(
            AuditErrorCode::AuditQuarantineFailed,
            "failed to quarantine corrupt obligation",
        )
        .with_key(key)
        .with_source(source)
    }

    /// Deletion transaction failed
    pub fn repair_write_failed(source: StoreError) -> Self {
        Self::new(
            AuditErrorCode::AuditRepairWriteFailed,
            "repair transaction aborted; no records were removed",
        )
        .with_source(source)
    }

    /// Record at `key` is still undecodable after repair
    pub fn residual_corruption(key: &[u8], source: DecodeError) -> Self {
        Self::new(
            AuditErrorCode::AuditResidualCorruption,
            "obligation still corrupt after repair",
        )
        .with_key(key)
        .with_source(source)
    }

    /// Repair was given a scan other than the latest one
    pub fn stale_scan(message: impl Into<String>) -> Self {
        Self::new(AuditErrorCode::AuditStaleScan, message)
    }

    /// Phase machine rejected a transition
    pub fn invalid_transition(from: AuditPhase, to: AuditPhase) -> Self {
        Self::new(
            AuditErrorCode::AuditInvalidTransition,
            format!("cannot move from {} to {}", from, to),
        )
    }

    /// Report output failed
    pub fn report_failed(source: io::Error) -> Self {
        Self::new(AuditErrorCode::AuditReportFailed, "failed to write report").with_source(source)
    }

    /// Returns the error code
    pub fn code(&self) -> AuditErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the hex key involved, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Every audit error halts the process
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code.code(), self.message)?;
        if let Some(ref key) = self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for AuditError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<StoreError> for AuditError {
    fn from(e: StoreError) -> Self {
        AuditError::scan_failed(e)
    }
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
