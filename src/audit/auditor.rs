//! The auditor: scan, report, repair, verify.

use std::io::Write;

use uuid::Uuid;

use crate::obligation;
use crate::observability::{
    log_event_with_fields, AuditEvent, ObservationScope, REPAIR_SCOPE, SCAN_SCOPE, VERIFY_SCOPE,
};
use crate::quarantine::{QuarantineSink, QuarantinedRecord};
use crate::report::{RepairReport, ReportEmitter, ScanReport};
use crate::store::RecordStore;

use super::errors::{AuditError, AuditResult};
use super::phase::AuditPhase;

/// Bucket holding storage obligations unless configured otherwise.
pub const DEFAULT_BUCKET: &str = "BucketStorageObligations";

/// Auditor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Bucket to scan
    pub bucket: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

/// What a run should do after the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMode {
    /// Scan and report; the store is never written
    ScanOnly,
    /// Scan, report, delete corrupt keys, verify
    Repair,
}

/// Result of one read-only scan.
///
/// Only the auditor creates these. A repair accepts an outcome only while it
/// is the auditor's most recent scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    scan_id: Uuid,
    bucket: String,
    healthy_count: u64,
    corrupt_count: u64,
    corrupt_keys: Vec<Vec<u8>>,
    quarantined: Vec<QuarantinedRecord>,
}

impl ScanOutcome {
    pub fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn healthy_count(&self) -> u64 {
        self.healthy_count
    }

    pub fn corrupt_count(&self) -> u64 {
        self.corrupt_count
    }

    /// Records visited: healthy plus corrupt.
    pub fn total(&self) -> u64 {
        self.healthy_count + self.corrupt_count
    }

    /// Corrupt keys in ascending store order.
    pub fn corrupt_keys(&self) -> &[Vec<u8>] {
        &self.corrupt_keys
    }

    /// Quarantine locations, one per corrupt key, in the same order.
    pub fn quarantined(&self) -> &[QuarantinedRecord] {
        &self.quarantined
    }

    pub fn is_clean(&self) -> bool {
        self.corrupt_count == 0
    }
}

/// Result of a repair plus its verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Scan whose keys were deleted
    pub scan_id: Uuid,
    /// Keys removed by the repair transaction
    pub deleted: usize,
    /// Keys already gone when the transaction ran
    pub already_absent: usize,
    /// Records decoded cleanly by verification
    pub remaining_healthy: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSummary {
    pub scan: ScanOutcome,
    pub repair: Option<RepairOutcome>,
}

/// Drives scans and repairs of one bucket.
pub struct Auditor<S, Q> {
    store: S,
    sink: Q,
    config: AuditConfig,
    phase: AuditPhase,
    latest_scan: Option<Uuid>,
}

impl<S: RecordStore, Q: QuarantineSink> Auditor<S, Q> {
    pub fn new(store: S, sink: Q, config: AuditConfig) -> Self {
        Self {
            store,
            sink,
            config,
            phase: AuditPhase::Idle,
            latest_scan: None,
        }
    }

    pub fn phase(&self) -> AuditPhase {
        self.phase
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &Q {
        &self.sink
    }

    /// Runs a full audit in `mode`, emitting reports as the phases finish.
    ///
    /// The scan report is written on entering Reporting, before any repair
    /// starts. The repair report is written after verification succeeds.
    pub fn run<W: Write>(
        &mut self,
        mode: AuditMode,
        emitter: &mut ReportEmitter<W>,
    ) -> AuditResult<AuditSummary> {
        let scan = self.scan()?;

        let report = ScanReport::new(&self.store.location(), &scan);
        if let Err(e) = emitter.emit_scan(&report) {
            return Err(self.fail(AuditError::report_failed(e)));
        }

        let repair = match mode {
            AuditMode::ScanOnly => {
                self.finish()?;
                None
            }
            AuditMode::Repair => {
                let outcome = self.repair(&scan)?;
                let report = RepairReport::new(&self.store.location(), &self.config.bucket, &outcome);
                if let Err(e) = emitter.emit_repair(&report) {
                    return Err(self.fail(AuditError::report_failed(e)));
                }
                Some(outcome)
            }
        };

        Ok(AuditSummary { scan, repair })
    }

    /// Read-only pass over the bucket.
    ///
    /// Each record is decoded. Failures are counted and their raw bytes
    /// quarantined before the walk continues. Any store or quarantine
    /// failure fails the whole scan.
    pub fn scan(&mut self) -> AuditResult<ScanOutcome> {
        self.transition(AuditPhase::Scanning)?;

        let scan_id = Uuid::new_v4();
        let scan_id_text = scan_id.to_string();
        let scope = ObservationScope::with_fields(
            SCAN_SCOPE,
            &[
                ("bucket", self.config.bucket.as_str()),
                ("scan_id", scan_id_text.as_str()),
            ],
        );

        let mut healthy_count = 0u64;
        let mut corrupt_keys = Vec::new();
        let mut quarantined = Vec::new();
        let sink = &mut self.sink;

        let walked = self
            .store
            .scan_bucket(&self.config.bucket, |key, value| -> AuditResult<()> {
                let decode_err = match obligation::decode(value) {
                    Ok(_) => {
                        healthy_count += 1;
                        return Ok(());
                    }
                    Err(e) => e,
                };

                let key_hex = hex::encode(key);
                log_event_with_fields(
                    AuditEvent::RecordCorrupt,
                    &[
                        ("key", key_hex.as_str()),
                        ("byte_len", value.len().to_string().as_str()),
                        ("category", decode_err.category.as_str()),
                        ("error", decode_err.to_string().as_str()),
                    ],
                );

                let record = sink
                    .quarantine(key, value)
                    .map_err(|e| AuditError::quarantine_failed(key, e))?;
                log_event_with_fields(
                    AuditEvent::QuarantineWritten,
                    &[
                        ("key", key_hex.as_str()),
                        ("path", record.path.display().to_string().as_str()),
                    ],
                );

                corrupt_keys.push(key.to_vec());
                quarantined.push(record);
                Ok(())
            });

        let walked = match walked {
            Ok(n) => n,
            Err(e) => {
                scope.fail_fatal(&e.to_string());
                return Err(self.fail(e));
            }
        };

        let corrupt_count = corrupt_keys.len() as u64;
        if walked != healthy_count + corrupt_count {
            let err = AuditError::scan_inconsistent(format!(
                "visited {} records but classified {}",
                walked,
                healthy_count + corrupt_count
            ));
            scope.fail_fatal(&err.to_string());
            return Err(self.fail(err));
        }

        self.transition(AuditPhase::Reporting)?;
        self.latest_scan = Some(scan_id);
        scope.complete_with_fields(&[
            ("healthy", healthy_count.to_string().as_str()),
            ("corrupt", corrupt_count.to_string().as_str()),
        ]);

        Ok(ScanOutcome {
            scan_id,
            bucket: self.config.bucket.clone(),
            healthy_count,
            corrupt_count,
            corrupt_keys,
            quarantined,
        })
    }

    /// Ends a scan-only run.
    pub fn finish(&mut self) -> AuditResult<()> {
        self.transition(AuditPhase::Done)?;
        self.latest_scan = None;
        Ok(())
    }

    /// Deletes the corrupt keys of `scan` in one write transaction, then
    /// re-reads the whole bucket.
    ///
    /// `scan` must be the auditor's latest scan and the auditor must still
    /// be reporting it. Keys deleted between scan and repair are counted as
    /// already absent. If verification finds any undecodable record the
    /// audit fails.
    pub fn repair(&mut self, scan: &ScanOutcome) -> AuditResult<RepairOutcome> {
        if self.latest_scan != Some(scan.scan_id) || scan.bucket != self.config.bucket {
            let err = AuditError::stale_scan(format!(
                "scan {} is not the latest scan of bucket {}",
                scan.scan_id, self.config.bucket
            ));
            return Err(self.fail(err));
        }
        self.transition(AuditPhase::Repairing)?;
        self.latest_scan = None;

        let scan_id_text = scan.scan_id.to_string();
        let scope = ObservationScope::with_fields(
            REPAIR_SCOPE,
            &[
                ("bucket", self.config.bucket.as_str()),
                ("scan_id", scan_id_text.as_str()),
                ("keys", scan.corrupt_keys.len().to_string().as_str()),
            ],
        );

        let summary = match self
            .store
            .delete_keys(&self.config.bucket, &scan.corrupt_keys)
        {
            Ok(summary) => summary,
            Err(e) => {
                let err = AuditError::repair_write_failed(e);
                scope.fail_fatal(&err.to_string());
                return Err(self.fail(err));
            }
        };

        log_event_with_fields(
            AuditEvent::DeletionsCommitted,
            &[
                ("deleted", summary.deleted.to_string().as_str()),
                ("already_absent", summary.already_absent.to_string().as_str()),
            ],
        );
        scope.complete();

        self.transition(AuditPhase::Verifying)?;
        let remaining_healthy = self.verify()?;
        self.transition(AuditPhase::Done)?;

        Ok(RepairOutcome {
            scan_id: scan.scan_id,
            deleted: summary.deleted,
            already_absent: summary.already_absent,
            remaining_healthy,
        })
    }

    /// Fresh read pass after repair. Stops at the first undecodable record.
    fn verify(&mut self) -> AuditResult<u64> {
        let scope =
            ObservationScope::with_fields(VERIFY_SCOPE, &[("bucket", self.config.bucket.as_str())]);

        let mut healthy = 0u64;
        let walked = self
            .store
            .scan_bucket(&self.config.bucket, |key, value| -> AuditResult<()> {
                obligation::decode(value).map_err(|e| AuditError::residual_corruption(key, e))?;
                healthy += 1;
                Ok(())
            });

        match walked {
            Ok(_) => {
                scope.complete_with_fields(&[("healthy", healthy.to_string().as_str())]);
                Ok(healthy)
            }
            Err(e) => {
                scope.fail_fatal(&e.to_string());
                Err(self.fail(e))
            }
        }
    }

    fn transition(&mut self, next: AuditPhase) -> AuditResult<()> {
        if !self.phase.can_transition_to(next) {
            let err = AuditError::invalid_transition(self.phase, next);
            return Err(self.fail(err));
        }
        self.phase = next;
        Ok(())
    }

    /// Moves to Failed (when legal) and logs the error.
    fn fail(&mut self, err: AuditError) -> AuditError {
        if self.phase.can_transition_to(AuditPhase::Failed) {
            self.phase = AuditPhase::Failed;
        }
        self.latest_scan = None;
        log_event_with_fields(
            AuditEvent::AuditFailed,
            &[
                ("code", err.code().code()),
                ("reason", err.to_string().as_str()),
            ],
        );
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditErrorCode;
    use crate::obligation::{encode, ObligationStatus, StorageObligation};
    use crate::quarantine::{QuarantineError, QuarantineResult};
    use crate::report::ReportFormat;
    use crate::store::MemoryStore;
    use std::path::PathBuf;

    const BUCKET: &str = "BucketStorageObligations";

    /// Keeps payloads in memory; can be told to fail.
    #[derive(Default)]
    struct VecSink {
        written: Vec<(Vec<u8>, Vec<u8>)>,
        fail: bool,
    }

    impl QuarantineSink for VecSink {
        fn quarantine(&mut self, key: &[u8], raw: &[u8]) -> QuarantineResult<QuarantinedRecord> {
            let path = PathBuf::from(crate::quarantine::quarantine_file_name(key));
            if self.fail {
                return Err(QuarantineError::verify_failed("sink refused payload", &path));
            }
            self.written.push((key.to_vec(), raw.to_vec()));
            Ok(QuarantinedRecord {
                key_hex: hex::encode(key),
                path,
                byte_len: raw.len(),
                crc32: crate::quarantine::compute_checksum(raw),
            })
        }
    }

    fn healthy(height: u64) -> Vec<u8> {
        let mut ob = StorageObligation::empty(height);
        ob.obligation_status = ObligationStatus::Unresolved;
        encode(&ob).unwrap()
    }

    fn scenario() -> MemoryStore {
        let store = MemoryStore::new().with_bucket(BUCKET);
        store.put(BUCKET, b"k1", &healthy(10));
        store.put(BUCKET, b"k2", b"{\"SectorRoots\": [");
        store.put(BUCKET, b"k3", &healthy(30));
        store
    }

    fn auditor(store: MemoryStore) -> Auditor<MemoryStore, VecSink> {
        Auditor::new(store, VecSink::default(), AuditConfig::default())
    }

    #[test]
    fn test_scan_classifies_and_quarantines() {
        let mut auditor = auditor(scenario());
        let outcome = auditor.scan().unwrap();

        assert_eq!(outcome.healthy_count(), 2);
        assert_eq!(outcome.corrupt_count(), 1);
        assert_eq!(outcome.total(), 3);
        assert_eq!(outcome.corrupt_keys(), &[b"k2".to_vec()]);
        assert_eq!(outcome.quarantined()[0].key_hex, "6b32");
        assert_eq!(auditor.sink().written, vec![(b"k2".to_vec(), b"{\"SectorRoots\": [".to_vec())]);
        assert_eq!(auditor.phase(), AuditPhase::Reporting);
    }

    #[test]
    fn test_scan_never_writes_the_store() {
        let store = scenario();
        let before = store.snapshot(BUCKET);
        let mut auditor = auditor(store);
        auditor.scan().unwrap();
        assert_eq!(auditor.store().snapshot(BUCKET), before);
    }

    #[test]
    fn test_empty_bucket_scans_clean() {
        let mut auditor = auditor(MemoryStore::new().with_bucket(BUCKET));
        let outcome = auditor.scan().unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.total(), 0);
    }

    #[test]
    fn test_missing_bucket_fails_scan() {
        let mut auditor = auditor(MemoryStore::new());
        let err = auditor.scan().unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditScanFailed);
        assert_eq!(auditor.phase(), AuditPhase::Failed);
    }

    #[test]
    fn test_quarantine_failure_is_fatal() {
        let mut auditor = Auditor::new(
            scenario(),
            VecSink {
                fail: true,
                ..VecSink::default()
            },
            AuditConfig::default(),
        );
        let err = auditor.scan().unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditQuarantineFailed);
        assert_eq!(err.key(), Some("6b32"));
        assert_eq!(auditor.phase(), AuditPhase::Failed);
    }

    #[test]
    fn test_repair_removes_exactly_the_corrupt_keys() {
        let mut auditor = auditor(scenario());
        let outcome = auditor.scan().unwrap();
        let repaired = auditor.repair(&outcome).unwrap();

        assert_eq!(repaired.deleted, 1);
        assert_eq!(repaired.already_absent, 0);
        assert_eq!(repaired.remaining_healthy, 2);
        assert_eq!(repaired.scan_id, outcome.scan_id());

        let left: Vec<_> = auditor.store().snapshot(BUCKET).into_keys().collect();
        assert_eq!(left, vec![b"k1".to_vec(), b"k3".to_vec()]);
        assert_eq!(auditor.phase(), AuditPhase::Done);
    }

    #[test]
    fn test_repair_counts_keys_removed_since_scan() {
        let mut auditor = auditor(scenario());
        let outcome = auditor.scan().unwrap();
        auditor
            .store()
            .delete_keys(BUCKET, &[b"k2".to_vec()])
            .unwrap();

        let repaired = auditor.repair(&outcome).unwrap();
        assert_eq!(repaired.deleted, 0);
        assert_eq!(repaired.already_absent, 1);
        assert_eq!(repaired.remaining_healthy, 2);
    }

    #[test]
    fn test_rescan_after_repair_is_clean() {
        let mut auditor = auditor(scenario());
        let first = auditor.scan().unwrap();
        auditor.repair(&first).unwrap();

        let second = auditor.scan().unwrap();
        assert!(second.is_clean());
        assert_eq!(second.healthy_count(), 2);
        assert_ne!(second.scan_id(), first.scan_id());
    }

    #[test]
    fn test_stale_scan_is_rejected() {
        let mut auditor = auditor(scenario());
        let first = auditor.scan().unwrap();
        let _second = auditor.scan().unwrap();

        let err = auditor.repair(&first).unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditStaleScan);
        assert_eq!(auditor.store().snapshot(BUCKET).len(), 3);
    }

    #[test]
    fn test_outcome_cannot_be_repaired_twice() {
        let mut auditor = auditor(scenario());
        let outcome = auditor.scan().unwrap();
        auditor.repair(&outcome).unwrap();

        let err = auditor.repair(&outcome).unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditStaleScan);
    }

    #[test]
    fn test_repair_before_scan_is_stale() {
        let mut other = auditor(scenario());
        let outcome = other.scan().unwrap();

        let mut fresh = auditor(scenario());
        let err = fresh.repair(&outcome).unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditStaleScan);
    }

    #[test]
    fn test_failed_delete_leaves_store_untouched() {
        let store = scenario();
        store.put(BUCKET, b"k4", b"not json");
        store.fail_deletes();
        let before = store.snapshot(BUCKET);

        let mut auditor = auditor(store);
        let outcome = auditor.scan().unwrap();
        assert_eq!(outcome.corrupt_count(), 2);

        let err = auditor.repair(&outcome).unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditRepairWriteFailed);
        assert_eq!(auditor.store().snapshot(BUCKET), before);
        assert_eq!(auditor.phase(), AuditPhase::Failed);
    }

    #[test]
    fn test_corruption_written_after_scan_fails_verification() {
        let mut auditor = auditor(scenario());
        let outcome = auditor.scan().unwrap();
        auditor.store().put(BUCKET, b"k5", b"{\"ObligationStatus\": \"x\"}");

        let err = auditor.repair(&outcome).unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditResidualCorruption);
        assert_eq!(err.key(), Some(hex::encode(b"k5").as_str()));
        assert_eq!(auditor.phase(), AuditPhase::Failed);
    }

    #[test]
    fn test_failed_auditor_refuses_to_scan() {
        let mut auditor = auditor(MemoryStore::new());
        auditor.scan().unwrap_err();
        let err = auditor.scan().unwrap_err();
        assert_eq!(err.code(), AuditErrorCode::AuditInvalidTransition);
    }

    #[test]
    fn test_run_scan_only_reports_and_finishes() {
        let mut auditor = auditor(scenario());
        let mut emitter = ReportEmitter::new(ReportFormat::Json, Vec::new());

        let summary = auditor.run(AuditMode::ScanOnly, &mut emitter).unwrap();
        assert!(summary.repair.is_none());
        assert_eq!(auditor.phase(), AuditPhase::Done);
        assert_eq!(auditor.store().snapshot(BUCKET).len(), 3);

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("\"corrupt_count\":1"));
    }

    #[test]
    fn test_run_repair_emits_both_reports() {
        let mut auditor = auditor(scenario());
        let mut emitter = ReportEmitter::new(ReportFormat::Json, Vec::new());

        let summary = auditor.run(AuditMode::Repair, &mut emitter).unwrap();
        assert_eq!(summary.repair.map(|r| r.deleted), Some(1));

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"kind\":\"scan\""));
        assert!(lines[1].contains("\"kind\":\"repair\""));
    }

    #[test]
    fn test_run_reports_scan_even_when_repair_fails() {
        let store = scenario();
        store.fail_deletes();
        store.put(BUCKET, b"k4", b"[]");
        let mut auditor = auditor(store);
        let mut emitter = ReportEmitter::new(ReportFormat::Text, Vec::new());

        auditor.run(AuditMode::Repair, &mut emitter).unwrap_err();
        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert!(out.contains("corrupt: 2"));
        assert!(!out.contains("deleted:"));
    }
}
