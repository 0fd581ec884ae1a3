//! In-memory record store used by orchestrator unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::errors::{StoreError, StoreResult};
use super::{DeleteSummary, RecordStore};

type Bucket = BTreeMap<Vec<u8>, Vec<u8>>;

pub struct MemoryStore {
    buckets: RefCell<BTreeMap<String, Bucket>>,
    fail_deletes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            buckets: RefCell::new(BTreeMap::new()),
            fail_deletes: Cell::new(false),
        }
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.buckets
            .borrow_mut()
            .entry(name.to_string())
            .or_default();
        self
    }

    pub fn put(&self, bucket: &str, key: &[u8], value: &[u8]) {
        self.buckets
            .borrow_mut()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
    }

    /// Copy of one bucket's contents.
    pub fn snapshot(&self, bucket: &str) -> Bucket {
        self.buckets
            .borrow()
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes the next batch deletes fail after touching the first key.
    pub fn fail_deletes(&self) {
        self.fail_deletes.set(true);
    }
}

impl RecordStore for MemoryStore {
    fn scan_bucket<E, F>(&self, bucket: &str, mut visit: F) -> Result<u64, E>
    where
        E: From<StoreError>,
        F: FnMut(&[u8], &[u8]) -> Result<(), E>,
    {
        let buckets = self.buckets.borrow();
        let records = buckets
            .get(bucket)
            .ok_or_else(|| E::from(StoreError::bucket_missing(bucket)))?;
        let mut visited = 0;
        for (key, value) in records {
            visit(key, value)?;
            visited += 1;
        }
        Ok(visited)
    }

    fn delete_keys(&self, bucket: &str, keys: &[Vec<u8>]) -> StoreResult<DeleteSummary> {
        let mut buckets = self.buckets.borrow_mut();
        let records = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::bucket_missing(bucket))?;

        // Work on a copy so a failure leaves the bucket untouched.
        let mut staged = records.clone();
        let mut summary = DeleteSummary::default();
        for (i, key) in keys.iter().enumerate() {
            if self.fail_deletes.get() && i > 0 {
                return Err(StoreError::write_failed_no_source("injected delete failure")
                    .with_key(key));
            }
            if staged.remove(key).is_some() {
                summary.deleted += 1;
            } else {
                summary.already_absent += 1;
            }
        }
        *records = staged;
        Ok(summary)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
