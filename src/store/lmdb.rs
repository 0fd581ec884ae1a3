//! LMDB-backed obligation store
//!
//! The store is a single LMDB data file (no sub-directory mode). Buckets are
//! named LMDB databases with raw byte keys and values. Every scan runs inside
//! exactly one read transaction and every deletion batch inside exactly one
//! write transaction.

use std::io;
use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, RoTxn};

use super::cursor::BucketCursor;
use super::errors::{StoreError, StoreResult};
use super::{DeleteSummary, RecordStore};

/// Engine settings used when opening the store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum size of the memory map in bytes
    pub map_size: usize,
    /// Maximum number of named buckets
    pub max_buckets: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            map_size: 1 << 30,
            max_buckets: 16,
        }
    }
}

/// Handle to an opened store file.
pub struct ObligationStore {
    path: PathBuf,
    env: Env,
}

impl ObligationStore {
    /// Opens an existing store file.
    ///
    /// A missing path or a directory is rejected; the file is never created.
    pub fn open(path: &Path, options: &StoreOptions) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::open_rejected(
                format!("store file not found: {}", path.display()),
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            ));
        }
        if !path.is_file() {
            return Err(StoreError::open_rejected(
                format!("store path is not a file: {}", path.display()),
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        Self::open_env(path, options)
    }

    /// Opens a store file, creating an empty one if missing.
    pub fn create(path: &Path, options: &StoreOptions) -> StoreResult<Self> {
        Self::open_env(path, options)
    }

    fn open_env(path: &Path, options: &StoreOptions) -> StoreResult<Self> {
        let mut open_options = EnvOpenOptions::new();
        open_options
            .map_size(options.map_size)
            .max_dbs(options.max_buckets);

        // SAFETY: the store is opened once per process and the tool assumes
        // exclusive access to the file for its whole run.
        let env = unsafe {
            open_options.flags(EnvFlags::NO_SUB_DIR);
            open_options.open(path)
        }
        .map_err(|e| {
            StoreError::open_failed(format!("failed to open store: {}", path.display()), e)
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            env,
        })
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bucket(&self, txn: &RoTxn<'_>, name: &str) -> StoreResult<Database<Bytes, Bytes>> {
        self.env
            .open_database::<Bytes, Bytes>(txn, Some(name))
            .map_err(|e| StoreError::read_failed(format!("failed to open bucket {}", name), e))?
            .ok_or_else(|| StoreError::bucket_missing(name))
    }

    /// Creates a bucket if it does not exist yet.
    pub fn create_bucket(&self, name: &str) -> StoreResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| StoreError::write_failed("failed to begin write transaction", e))?;
        self.env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some(name))
            .map_err(|e| StoreError::write_failed(format!("failed to create bucket {}", name), e))?;
        wtxn.commit()
            .map_err(|e| StoreError::write_failed("failed to commit bucket creation", e))
    }

    /// Writes one record in its own write transaction.
    pub fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| StoreError::write_failed("failed to begin write transaction", e))?;
        let db = self.bucket(&wtxn, bucket)?;
        db.put(&mut wtxn, key, value)
            .map_err(|e| StoreError::write_failed("failed to put record", e).with_key(key))?;
        wtxn.commit()
            .map_err(|e| StoreError::write_failed("failed to commit put", e).with_key(key))
    }

    /// Reads one record.
    pub fn get(&self, bucket: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| StoreError::read_failed("failed to begin read transaction", e))?;
        let db = self.bucket(&rtxn, bucket)?;
        let value = db
            .get(&rtxn, key)
            .map_err(|e| StoreError::read_failed("failed to get record", e).with_key(key))?
            .map(<[u8]>::to_vec);
        rtxn.commit()
            .map_err(|e| StoreError::read_failed("failed to close read transaction", e))?;
        Ok(value)
    }

    /// Number of records in a bucket.
    pub fn len(&self, bucket: &str) -> StoreResult<u64> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| StoreError::read_failed("failed to begin read transaction", e))?;
        let db = self.bucket(&rtxn, bucket)?;
        let len = db
            .len(&rtxn)
            .map_err(|e| StoreError::read_failed(format!("failed to count bucket {}", bucket), e))?;
        rtxn.commit()
            .map_err(|e| StoreError::read_failed("failed to close read transaction", e))?;
        Ok(len)
    }

    /// Runs `visit` over a fresh forward cursor inside one read-only transaction.
    ///
    /// The cursor starts at the first key. The transaction is closed once
    /// `visit` returns.
    pub fn with_cursor<R>(
        &self,
        bucket: &str,
        visit: impl FnOnce(BucketCursor<'_>) -> R,
    ) -> StoreResult<R> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| StoreError::read_failed("failed to begin read transaction", e))?;
        let db = self.bucket(&rtxn, bucket)?;
        let result = {
            let iter = db.iter(&rtxn).map_err(|e| {
                StoreError::read_failed(format!("failed to position cursor in {}", bucket), e)
            })?;
            visit(BucketCursor::new(bucket, iter))
        };
        rtxn.commit()
            .map_err(|e| StoreError::read_failed("failed to close read transaction", e))?;
        Ok(result)
    }
}

impl RecordStore for ObligationStore {
    fn scan_bucket<E, F>(&self, bucket: &str, mut visit: F) -> Result<u64, E>
    where
        E: From<StoreError>,
        F: FnMut(&[u8], &[u8]) -> Result<(), E>,
    {
        self.with_cursor(bucket, |mut cursor| {
            for record in cursor.by_ref() {
                let record = record.map_err(E::from)?;
                visit(record.key, record.value)?;
            }
            debug_assert!(cursor.is_exhausted());
            Ok(cursor.position())
        })
        .map_err(E::from)?
    }

    fn delete_keys(&self, bucket: &str, keys: &[Vec<u8>]) -> StoreResult<DeleteSummary> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| StoreError::write_failed("failed to begin write transaction", e))?;
        let db = self.bucket(&wtxn, bucket)?;

        let mut summary = DeleteSummary::default();
        for key in keys {
            match db.delete(&mut wtxn, key.as_slice()) {
                Ok(true) => summary.deleted += 1,
                Ok(false) => summary.already_absent += 1,
                Err(e) => {
                    wtxn.abort();
                    return Err(
                        StoreError::write_failed("failed to delete record", e).with_key(key)
                    );
                }
            }
        }

        wtxn.commit()
            .map_err(|e| StoreError::write_failed("failed to commit deletions", e))?;
        Ok(summary)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BUCKET: &str = "TestBucket";

    fn create_store(dir: &TempDir) -> ObligationStore {
        let store = ObligationStore::create(&dir.path().join("host.db"), &StoreOptions::default())
            .unwrap();
        store.create_bucket(BUCKET).unwrap();
        store
    }

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ObligationStore::open(&temp_dir.path().join("absent.db"), &StoreOptions::default());
        let err = result.err().unwrap();
        assert!(err.is_fatal());
        assert_eq!(err.code().code(), "STORE_OPEN_FAILED");
        assert!(!temp_dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_open_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = ObligationStore::open(temp_dir.path(), &StoreOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.code().code(), "STORE_OPEN_FAILED");
    }

    #[test]
    fn test_cursor_yields_ascending_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        store.put(BUCKET, b"k3", b"three").unwrap();
        store.put(BUCKET, b"k1", b"one").unwrap();
        store.put(BUCKET, b"k2", b"two").unwrap();

        let keys = store
            .with_cursor(BUCKET, |cursor| {
                cursor
                    .map(|r| r.map(|rec| rec.key.to_vec()))
                    .collect::<StoreResult<Vec<_>>>()
            })
            .unwrap()
            .unwrap();
        assert_eq!(keys, vec![b"k1".to_vec(), b"k2".to_vec(), b"k3".to_vec()]);
    }

    #[test]
    fn test_cursor_is_not_restartable() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        store.put(BUCKET, b"a", b"1").unwrap();

        store
            .with_cursor(BUCKET, |mut cursor| {
                assert!(cursor.next().is_some());
                assert!(cursor.next().is_none());
                assert!(cursor.is_exhausted());
                assert!(cursor.next().is_none());
                assert_eq!(cursor.position(), 1);
            })
            .unwrap();
    }

    #[test]
    fn test_missing_bucket_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        let err = store.with_cursor("Nope", |_| ()).err().unwrap();
        assert_eq!(err.code().code(), "STORE_BUCKET_MISSING");
    }

    #[test]
    fn test_delete_keys_tolerates_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        store.put(BUCKET, b"a", b"1").unwrap();
        store.put(BUCKET, b"b", b"2").unwrap();

        let summary = store
            .delete_keys(BUCKET, &[b"a".to_vec(), b"zz".to_vec()])
            .unwrap();
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.already_absent, 1);
        assert_eq!(store.get(BUCKET, b"a").unwrap(), None);
        assert_eq!(store.get(BUCKET, b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.len(BUCKET).unwrap(), 1);
    }

    #[test]
    fn test_scan_bucket_counts_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        store.put(BUCKET, b"a", b"1").unwrap();
        store.put(BUCKET, b"b", b"2").unwrap();

        let mut seen = Vec::new();
        let visited = store
            .scan_bucket::<StoreError, _>(BUCKET, |key, value| {
                seen.push((key.to_vec(), value.to_vec()));
                Ok(())
            })
            .unwrap();
        assert_eq!(visited, 2);
        assert_eq!(seen[0], (b"a".to_vec(), b"1".to_vec()));
    }
}
