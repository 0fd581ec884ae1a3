//! Obligation codec
//!
//! `decode` is a pure function of the input bytes. It never inspects amounts,
//! heights or statuses beyond their encoding.

use super::errors::{DecodeError, DecodeResult};
use super::record::StorageObligation;

/// Decodes a raw bucket value into a storage obligation.
pub fn decode(raw: &[u8]) -> DecodeResult<StorageObligation> {
    serde_json::from_slice(raw).map_err(|e| DecodeError::from_json(raw.len(), e))
}

/// Encodes an obligation in the on-disk form.
pub fn encode(obligation: &StorageObligation) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(obligation)
}
