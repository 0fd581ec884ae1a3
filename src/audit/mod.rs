//! Scan orchestration and gated repair
//!
//! An [`Auditor`] walks one obligation bucket, classifies every record as
//! healthy or corrupt, and quarantines corrupt payloads. Repair is a second,
//! separate pass that only deletes the keys of the auditor's latest scan and
//! is followed by a verification pass.
//!
//! # Invariants
//!
//! - Scanning never writes the store
//! - healthy + corrupt equals the number of records visited
//! - A corrupt key is quarantined before the scan moves on
//! - Repair deletes all of its keys in one transaction or none of them
//! - Repair never runs without a completed scan in the same auditor

mod auditor;
mod errors;
mod phase;

pub use auditor::{
    AuditConfig, AuditMode, AuditSummary, Auditor, RepairOutcome, ScanOutcome, DEFAULT_BUCKET,
};
pub use errors::{AuditError, AuditErrorCode, AuditResult};
pub use phase::AuditPhase;
