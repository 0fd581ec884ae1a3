//! Quarantine sinks
//!
//! A sink takes the raw bytes of a record that failed to decode and makes
//! them durable outside the store, under a name derived only from the key.
//! Payloads are never reinterpreted.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::errors::{QuarantineError, QuarantineResult};
use super::checksum::{compute_checksum, verify_checksum};

/// Where one corrupt payload was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarantinedRecord {
    /// Lowercase hex of the record key
    pub key_hex: String,
    /// Quarantine file location
    pub path: PathBuf,
    /// Payload length in bytes
    pub byte_len: usize,
    /// CRC32 of the payload
    pub crc32: u32,
}

/// Destination for corrupt payloads.
pub trait QuarantineSink {
    /// Durably persists `raw` under a name derived from `key`.
    fn quarantine(&mut self, key: &[u8], raw: &[u8]) -> QuarantineResult<QuarantinedRecord>;
}

/// File name for a quarantined key: `contract-<hex>-corrupted.json`.
pub fn quarantine_file_name(key: &[u8]) -> String {
    format!("contract-{}-corrupted.json", hex::encode(key))
}

/// Reads a quarantined payload back using only its key.
pub fn read_quarantined(dir: &Path, key: &[u8]) -> std::io::Result<Vec<u8>> {
    fs::read(dir.join(quarantine_file_name(key)))
}

/// fsync a directory so renames inside it survive a crash.
fn fsync_dir(path: &Path) -> QuarantineResult<()> {
    let dir = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| QuarantineError::io_failed("failed to open quarantine directory", path, e))?;

    dir.sync_all()
        .map_err(|e| QuarantineError::io_failed("fsync quarantine directory failed", path, e))
}

/// Writes one file per corrupt key into a directory.
///
/// Each payload goes to a temporary file which is fsynced and then renamed
/// into place, so a final-named file always holds a complete payload.
/// Re-quarantining a key replaces its file.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    verify: bool,
}

impl DirectorySink {
    /// Opens a sink, creating the directory if needed.
    ///
    /// With `verify` set, each file is read back and compared after writing.
    pub fn open(dir: &Path, verify: bool) -> QuarantineResult<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                QuarantineError::io_failed("failed to create quarantine directory", dir, e)
            })?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            verify,
        })
    }

    /// Returns the quarantine directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a key's payload is (or would be) stored at.
    pub fn locate(&self, key: &[u8]) -> PathBuf {
        self.dir.join(quarantine_file_name(key))
    }

    fn write_temp(&self, temp_path: &Path, raw: &[u8]) -> QuarantineResult<()> {
        let mut file = File::create(temp_path).map_err(|e| {
            QuarantineError::io_failed("failed to create quarantine file", temp_path, e)
        })?;
        file.write_all(raw)
            .map_err(|e| QuarantineError::io_failed("failed to write payload", temp_path, e))?;
        file.sync_all()
            .map_err(|e| QuarantineError::io_failed("fsync quarantine file failed", temp_path, e))
    }

    fn verify_written(&self, path: &Path, raw: &[u8], crc32: u32) -> QuarantineResult<()> {
        let on_disk = fs::read(path)
            .map_err(|e| QuarantineError::io_failed("failed to read back payload", path, e))?;
        if on_disk.len() != raw.len() {
            return Err(QuarantineError::verify_failed(
                format!(
                    "length mismatch: wrote {} bytes, read {}",
                    raw.len(),
                    on_disk.len()
                ),
                path,
            ));
        }
        if !verify_checksum(&on_disk, crc32) {
            return Err(QuarantineError::verify_failed(
                format!(
                    "checksum mismatch: wrote {:08x}, read {:08x}",
                    crc32,
                    compute_checksum(&on_disk)
                ),
                path,
            ));
        }
        Ok(())
    }
}

impl QuarantineSink for DirectorySink {
    fn quarantine(&mut self, key: &[u8], raw: &[u8]) -> QuarantineResult<QuarantinedRecord> {
        let final_path = self.locate(key);
        let temp_path = self
            .dir
            .join(format!("{}.tmp", quarantine_file_name(key)));

        if let Err(e) = self.write_temp(&temp_path, raw) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(QuarantineError::io_failed(
                "failed to move payload into place",
                &final_path,
                e,
            ));
        }
        fsync_dir(&self.dir)?;

        let crc32 = compute_checksum(raw);
        if self.verify {
            self.verify_written(&final_path, raw, crc32)?;
        }

        Ok(QuarantinedRecord {
            key_hex: hex::encode(key),
            path: final_path,
            byte_len: raw.len(),
            crc32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_is_hex_of_key() {
        assert_eq!(
            quarantine_file_name(&[0x00, 0xab, 0xff]),
            "contract-00abff-corrupted.json"
        );
    }

    #[test]
    fn test_payload_is_written_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::open(temp_dir.path(), true).unwrap();
        let raw = b"{\"SectorRoots\": [\"trunc";

        let record = sink.quarantine(&[1, 2, 3], raw).unwrap();

        assert_eq!(record.key_hex, "010203");
        assert_eq!(record.byte_len, raw.len());
        assert_eq!(record.crc32, compute_checksum(raw));
        assert_eq!(record.path, temp_dir.path().join("contract-010203-corrupted.json"));
        assert_eq!(read_quarantined(temp_dir.path(), &[1, 2, 3]).unwrap(), raw);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::open(temp_dir.path(), false).unwrap();
        sink.quarantine(b"k", b"junk").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["contract-6b-corrupted.json".to_string()]);
    }

    #[test]
    fn test_requarantine_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::open(temp_dir.path(), true).unwrap();
        sink.quarantine(b"k", b"first").unwrap();
        sink.quarantine(b"k", b"second").unwrap();
        assert_eq!(read_quarantined(temp_dir.path(), b"k").unwrap(), b"second");
    }

    #[test]
    fn test_empty_payload_is_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::open(temp_dir.path(), true).unwrap();
        let record = sink.quarantine(b"k", b"").unwrap();
        assert_eq!(record.byte_len, 0);
        assert!(sink.locate(b"k").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let sink = DirectorySink::open(&nested, true).unwrap();
        assert!(nested.is_dir());
        assert_eq!(sink.dir(), nested.as_path());
    }

    #[test]
    fn test_unwritable_target_fails_loudly() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::open(temp_dir.path(), true).unwrap();
        // A directory squatting on the final name makes the rename fail.
        fs::create_dir(sink.locate(b"k")).unwrap();
        fs::write(sink.locate(b"k").join("occupant"), b"x").unwrap();

        let err = sink.quarantine(b"k", b"payload").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code().code(), "QUARANTINE_IO_FAILED");
        assert!(!temp_dir
            .path()
            .join("contract-6b-corrupted.json.tmp")
            .exists());
    }
}
