//! Observability for the obligation scrubber
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed audit events
//! - Pass-level begin/complete scopes
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on the audit
//! 3. No background threads
//! 4. Deterministic field ordering
//!
//! # Usage
//!
//! ```ignore
//! use obligation_scrub::observability::{log_event_with_fields, AuditEvent};
//!
//! log_event_with_fields(AuditEvent::RecordCorrupt, &[("key", "ab01")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::{AuditEvent, REPAIR_SCOPE, SCAN_SCOPE, VERIFY_SCOPE};
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

fn severity_for(event: AuditEvent) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log an audit event with fields
pub fn log_event_with_fields(event: AuditEvent, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}
