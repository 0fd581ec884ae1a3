//! Audit reports
//!
//! Turns scan and repair outcomes into operator-facing output. Reports go to
//! any `io::Write` (stdout in the CLI); logs stay on stderr.
//!
//! Formats:
//! - `text`: short human-readable blocks
//! - `json`: one JSON object per line, tagged with `"kind"`

mod emitter;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::{RepairOutcome, ScanOutcome};
use crate::quarantine::QuarantinedRecord;

pub use emitter::ReportEmitter;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Counts and quarantine locations from one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub store: String,
    pub bucket: String,
    pub scan_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub healthy_count: u64,
    pub corrupt_count: u64,
    pub total_count: u64,
    pub quarantined: Vec<QuarantinedRecord>,
}

impl ScanReport {
    pub fn new(store: &str, scan: &ScanOutcome) -> Self {
        Self {
            store: store.to_string(),
            bucket: scan.bucket().to_string(),
            scan_id: scan.scan_id(),
            generated_at: Utc::now(),
            healthy_count: scan.healthy_count(),
            corrupt_count: scan.corrupt_count(),
            total_count: scan.total(),
            quarantined: scan.quarantined().to_vec(),
        }
    }
}

/// Deletion counts and verification result of one repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub store: String,
    pub bucket: String,
    pub scan_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub deleted: usize,
    pub already_absent: usize,
    pub remaining_healthy: u64,
}

impl RepairReport {
    pub fn new(store: &str, bucket: &str, repair: &RepairOutcome) -> Self {
        Self {
            store: store.to_string(),
            bucket: bucket.to_string(),
            scan_id: repair.scan_id,
            generated_at: Utc::now(),
            deleted: repair.deleted,
            already_absent: repair.already_absent,
            remaining_healthy: repair.remaining_healthy,
        }
    }
}
