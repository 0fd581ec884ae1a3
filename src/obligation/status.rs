//! Obligation status codes
//!
//! The status is stored as an open-ended unsigned integer. Only four values
//! have a name; anything else is carried through as `Unknown` so a record with
//! an unexpected status still decodes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::schema::NullValue;

/// Resolution state of a storage obligation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObligationStatus {
    /// Contract has not reached a final state
    #[default]
    Unresolved,
    /// Contract was never accepted onto the chain
    Rejected,
    /// Storage proof was accepted
    Succeeded,
    /// Storage proof window passed without a proof
    Failed,
    /// Any value outside the named range
    Unknown(u64),
}

impl ObligationStatus {
    /// Returns the raw integer stored on disk.
    pub fn code(&self) -> u64 {
        match self {
            ObligationStatus::Unresolved => 0,
            ObligationStatus::Rejected => 1,
            ObligationStatus::Succeeded => 2,
            ObligationStatus::Failed => 3,
            ObligationStatus::Unknown(code) => *code,
        }
    }
}

impl From<u64> for ObligationStatus {
    fn from(code: u64) -> Self {
        match code {
            0 => ObligationStatus::Unresolved,
            1 => ObligationStatus::Rejected,
            2 => ObligationStatus::Succeeded,
            3 => ObligationStatus::Failed,
            other => ObligationStatus::Unknown(other),
        }
    }
}

impl NullValue for ObligationStatus {
    fn null_value() -> Option<Self> {
        Some(ObligationStatus::Unresolved)
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObligationStatus::Unresolved => write!(f, "unresolved"),
            ObligationStatus::Rejected => write!(f, "rejected"),
            ObligationStatus::Succeeded => write!(f, "succeeded"),
            ObligationStatus::Failed => write!(f, "failed"),
            ObligationStatus::Unknown(code) => write!(f, "storageObligationStatus({})", code),
        }
    }
}

impl Serialize for ObligationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.code())
    }
}

impl<'de> Deserialize<'de> for ObligationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(ObligationStatus::from)
    }
}
