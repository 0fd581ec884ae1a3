//! Observable scrubber events
//!
//! Point events of an audit. Pass boundaries (`AUDIT_SCAN_*`, `REPAIR_*`,
//! `VERIFICATION_*`) are logged by [`super::ObservationScope`].

use std::fmt;

/// Scope name for the read-only scan pass
pub const SCAN_SCOPE: &str = "AUDIT_SCAN";
/// Scope name for the deletion transaction
pub const REPAIR_SCOPE: &str = "REPAIR";
/// Scope name for the post-repair verification pass
pub const VERIFY_SCOPE: &str = "VERIFICATION";

/// Observable events during an audit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    // Setup
    /// Configuration resolved
    ConfigLoaded,
    /// Store file opened
    StoreOpened,

    // Scan pass
    /// A record failed to decode
    RecordCorrupt,
    /// A corrupt payload is durable in quarantine
    QuarantineWritten,

    // Repair pass
    /// Deletion transaction committed
    DeletionsCommitted,

    /// Audit halted (FATAL)
    AuditFailed,
}

impl AuditEvent {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::ConfigLoaded => "CONFIG_LOADED",
            AuditEvent::StoreOpened => "STORE_OPENED",

            AuditEvent::RecordCorrupt => "RECORD_CORRUPT",
            AuditEvent::QuarantineWritten => "QUARANTINE_WRITTEN",

            AuditEvent::DeletionsCommitted => "DELETIONS_COMMITTED",

            AuditEvent::AuditFailed => "AUDIT_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditEvent::AuditFailed)
    }

    /// Returns true if this event flags a record needing operator attention
    pub fn is_warning(&self) -> bool {
        matches!(self, AuditEvent::RecordCorrupt)
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
