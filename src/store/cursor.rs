//! Forward cursor over one bucket
//!
//! Yields raw key/value pairs in ascending key order. The cursor lives inside
//! the read transaction that created it and cannot be rewound.

use heed::types::Bytes;
use heed::RoIter;

use super::errors::{StoreError, StoreResult};

/// One raw record borrowed from the read transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'txn> {
    pub key: &'txn [u8],
    pub value: &'txn [u8],
}

/// Lazy, finite, non-restartable sequence over a bucket.
pub struct BucketCursor<'txn> {
    bucket: String,
    inner: RoIter<'txn, Bytes, Bytes>,
    position: u64,
    exhausted: bool,
}

impl<'txn> BucketCursor<'txn> {
    pub(crate) fn new(bucket: &str, inner: RoIter<'txn, Bytes, Bytes>) -> Self {
        Self {
            bucket: bucket.to_string(),
            inner,
            position: 0,
            exhausted: false,
        }
    }

    /// Number of records yielded so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns whether the end of the bucket was reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<'txn> Iterator for BucketCursor<'txn> {
    type Item = StoreResult<RawRecord<'txn>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.inner.next() {
            Some(Ok((key, value))) => {
                self.position += 1;
                Some(Ok(RawRecord { key, value }))
            }
            Some(Err(e)) => {
                // A failed step leaves the cursor unusable.
                self.exhausted = true;
                Some(Err(StoreError::read_failed(
                    format!(
                        "cursor step {} failed in bucket {}",
                        self.position, self.bucket
                    ),
                    e,
                )))
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}
