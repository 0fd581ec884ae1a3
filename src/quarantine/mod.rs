//! Quarantine of corrupt obligation payloads
//!
//! Every record that fails to decode is copied, byte for byte, to side
//! storage named from its key before anything else happens to it.
//!
//! # Invariants
//!
//! - The payload is written verbatim and never re-decoded
//! - The file name depends only on the key
//! - A payload that cannot be made durable is a fatal error, never skipped

mod checksum;
mod errors;
mod sink;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{QuarantineError, QuarantineErrorCode, QuarantineResult};
pub use sink::{
    quarantine_file_name, read_quarantined, DirectorySink, QuarantineSink, QuarantinedRecord,
};
