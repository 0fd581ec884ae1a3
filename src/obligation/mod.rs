//! Storage obligation codec
//!
//! Defines the expected decoded shape of a record in the obligation bucket
//! and the deterministic decode used to classify it.
//!
//! # Design Principles
//!
//! - Structural checks only (presence, type, encoding)
//! - No business validation: zero amounts, empty sets and unknown statuses decode
//! - Anything the record's writer reads back must decode here too
//! - Decode never has side effects
//! - One error type for every field-level failure

#[macro_use]
mod schema;

mod codec;
mod currency;
mod encoding;
mod errors;
mod record;
mod status;
mod transaction;

pub use codec::{decode, encode};
pub use currency::Currency;
pub use encoding::{Bytes, Hash256, SectorRoot, Segment, SiaPublicKey, Specifier, UnlockHash};
pub use errors::{DecodeCategory, DecodeError, DecodeResult};
pub use record::StorageObligation;
pub use status::ObligationStatus;
pub use transaction::{
    BlockHeight, CoveredFields, FileContract, FileContractRevision, SiacoinInput, SiacoinOutput,
    SiafundInput, SiafundOutput, StorageProof, Transaction, TransactionSignature,
    UnlockConditions,
};
