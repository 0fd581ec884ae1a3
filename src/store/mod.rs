//! Store access for the obligation scrubber
//!
//! Wraps the embedded ordered key-value store. The scrubber only ever needs
//! three things from it: an ascending read-only walk over one bucket, a
//! single-transaction batch delete, and a name for reports.
//!
//! # Invariants
//!
//! - A scan never mutates the store
//! - One transaction per pass; transactions are never nested
//! - A batch delete commits entirely or not at all

mod cursor;
mod errors;
mod lmdb;
#[cfg(test)]
mod memory;

pub use cursor::{BucketCursor, RawRecord};
pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use lmdb::{ObligationStore, StoreOptions};
#[cfg(test)]
pub use memory::MemoryStore;

/// Outcome of a batch delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Keys that existed and were removed
    pub deleted: usize,
    /// Keys that were already gone
    pub already_absent: usize,
}

/// Ordered bucketed record storage as seen by the scrubber.
pub trait RecordStore {
    /// Visits every record of `bucket` in ascending key order inside one
    /// read-only transaction. Returns the number of records visited.
    ///
    /// The first error, from the store or from `visit`, ends the walk.
    fn scan_bucket<E, F>(&self, bucket: &str, visit: F) -> Result<u64, E>
    where
        E: From<StoreError>,
        F: FnMut(&[u8], &[u8]) -> Result<(), E>;

    /// Deletes `keys` from `bucket` in one write transaction.
    ///
    /// Absent keys are counted, not errors. Any other failure aborts the
    /// transaction so no deletion is applied.
    fn delete_keys(&self, bucket: &str, keys: &[Vec<u8>]) -> StoreResult<DeleteSummary>;

    /// Human-readable location of the store.
    fn location(&self) -> String;
}
