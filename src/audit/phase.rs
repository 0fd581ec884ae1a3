//! Audit phase machine
//!
//! ```text
//! Idle -> Scanning -> Reporting -> Done
//!                         |
//!                         +-> Repairing -> Verifying -> Done
//!
//! Reporting and Done may start a new scan.
//! Any phase except Idle may move to Failed. Failed is terminal.
//! ```

use std::fmt;

/// Phase of an auditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    /// Nothing has run yet
    Idle,
    /// Read-only scan in progress
    Scanning,
    /// Scan finished; counts are available
    Reporting,
    /// Deleting the latest scan's corrupt keys
    Repairing,
    /// Re-reading the bucket after repair
    Verifying,
    /// Finished successfully
    Done,
    /// Halted by a fatal error
    Failed,
}

impl AuditPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditPhase::Idle => "idle",
            AuditPhase::Scanning => "scanning",
            AuditPhase::Reporting => "reporting",
            AuditPhase::Repairing => "repairing",
            AuditPhase::Verifying => "verifying",
            AuditPhase::Done => "done",
            AuditPhase::Failed => "failed",
        }
    }

    /// Returns whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: AuditPhase) -> bool {
        use AuditPhase::*;
        match (self, next) {
            (Failed, _) => false,
            (Idle, Failed) => false,
            (_, Failed) => true,
            (Idle, Scanning) => true,
            (Scanning, Reporting) => true,
            (Reporting, Done) | (Reporting, Repairing) | (Reporting, Scanning) => true,
            (Repairing, Verifying) => true,
            (Verifying, Done) => true,
            (Done, Scanning) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::AuditPhase::*;
    use super::*;

    const ALL: [AuditPhase; 7] = [Idle, Scanning, Reporting, Repairing, Verifying, Done, Failed];

    #[test]
    fn test_happy_paths() {
        assert!(Idle.can_transition_to(Scanning));
        assert!(Scanning.can_transition_to(Reporting));
        assert!(Reporting.can_transition_to(Done));
        assert!(Reporting.can_transition_to(Repairing));
        assert!(Repairing.can_transition_to(Verifying));
        assert!(Verifying.can_transition_to(Done));
    }

    #[test]
    fn test_repair_requires_a_report() {
        assert!(!Idle.can_transition_to(Repairing));
        assert!(!Scanning.can_transition_to(Repairing));
        assert!(!Done.can_transition_to(Repairing));
    }

    #[test]
    fn test_verification_only_after_repair() {
        for phase in ALL {
            assert_eq!(phase.can_transition_to(Verifying), phase == Repairing);
        }
    }

    #[test]
    fn test_failed_reachable_from_every_active_phase() {
        for phase in [Scanning, Reporting, Repairing, Verifying, Done] {
            assert!(phase.can_transition_to(Failed));
        }
        assert!(!Idle.can_transition_to(Failed));
    }

    #[test]
    fn test_failed_is_terminal() {
        for phase in ALL {
            assert!(!Failed.can_transition_to(phase));
        }
    }
}
