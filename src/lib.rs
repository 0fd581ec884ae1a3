//! obligation-scrub - integrity scan and quarantine for storage obligations
//!
//! Walks the storage-obligation bucket of a host's embedded store, copies
//! every record that no longer decodes to quarantine, and, only when asked,
//! removes those records in a single verified transaction.

pub mod audit;
pub mod cli;
pub mod obligation;
pub mod observability;
pub mod quarantine;
pub mod report;
pub mod store;
