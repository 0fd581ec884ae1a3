//! Fixed-form values inside obligation records
//!
//! Hashes and unlock hashes are lowercase hex strings. Byte strings are
//! standard base64. Names such as a key algorithm are plain strings.

use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::schema::NullValue;

/// Standard alphabet, padded, tolerant of non-zero trailing bits.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

type Blake2b256 = Blake2b<U32>;

/// 32-byte hash: sector roots, Merkle roots and object ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hash256(pub [u8; 32]);

/// Merkle root of one stored sector.
pub type SectorRoot = Hash256;

impl Hash256 {
    /// Returns the lowercase hex form used on disk.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl NullValue for Hash256 {
    fn null_value() -> Option<Self> {
        None
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.len() != 64 {
            return Err(de::Error::invalid_length(
                text.len(),
                &"64 hex characters for a hash",
            ));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&text, &mut bytes)
            .map_err(|e| de::Error::custom(format!("invalid hash: {}", e)))?;
        Ok(Hash256(bytes))
    }
}

/// Address an output pays to: 32-byte hash followed by a 6-byte checksum.
///
/// The checksum is the first six bytes of the BLAKE2b-256 digest of the hash
/// and is checked on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnlockHash(pub [u8; 32]);

impl UnlockHash {
    /// Hex length of an unlock hash including its checksum.
    pub const HEX_LEN: usize = 76;

    const CHECKSUM_LEN: usize = 6;

    fn checksum(&self) -> [u8; Self::CHECKSUM_LEN] {
        let digest = Blake2b256::digest(self.0);
        let mut checksum = [0u8; Self::CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[..Self::CHECKSUM_LEN]);
        checksum
    }

    /// Parses the on-disk hex form and verifies its checksum.
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.len() != Self::HEX_LEN {
            return Err(format!(
                "unlock hash must be {} hex characters, got {}",
                Self::HEX_LEN,
                text.len()
            ));
        }
        let mut bytes = [0u8; 38];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|e| format!("invalid unlock hash: {}", e))?;

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[..32]);
        let unlock_hash = UnlockHash(hash);
        if unlock_hash.checksum()[..] != bytes[32..] {
            return Err(format!("unlock hash checksum mismatch in {}", text));
        }
        Ok(unlock_hash)
    }

    /// Returns the hex form with its checksum appended.
    pub fn to_hex(&self) -> String {
        let mut text = hex::encode(self.0);
        text.push_str(&hex::encode(self.checksum()));
        text
    }
}

impl NullValue for UnlockHash {
    fn null_value() -> Option<Self> {
        None
    }
}

impl fmt::Display for UnlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for UnlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for UnlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        UnlockHash::parse(&text).map_err(de::Error::custom)
    }
}

/// Short algorithm or object-type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Specifier(pub String);

impl NullValue for Specifier {
    fn null_value() -> Option<Self> {
        Some(Self::default())
    }
}

impl Serialize for Specifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Specifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Specifier)
    }
}

/// Variable-length byte string, base64 on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl NullValue for Bytes {
    fn null_value() -> Option<Self> {
        Some(Self::default())
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&self.0))
    }
}

struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Bytes;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a base64 string or an array of bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Bytes, E> {
        BASE64
            .decode(v)
            .map(Bytes)
            .map_err(|e| E::custom(format!("invalid base64: {}", e)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Bytes, E> {
        Ok(Bytes::default())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Bytes, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(Bytes(bytes))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BytesVisitor)
    }
}

/// Bytes in one storage proof segment.
pub const SEGMENT_SIZE: usize = 64;

/// Leaf segment carried by a storage proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment(pub [u8; SEGMENT_SIZE]);

impl Default for Segment {
    fn default() -> Self {
        Segment([0; SEGMENT_SIZE])
    }
}

impl NullValue for Segment {
    fn null_value() -> Option<Self> {
        Some(Self::default())
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

struct SegmentVisitor;

impl<'de> Visitor<'de> for SegmentVisitor {
    type Value = Segment;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of byte values")
    }

    /// Short arrays are zero-filled; elements past the end are skipped.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Segment, A::Error> {
        let mut segment = Segment::default();
        let mut filled = 0;
        while filled < SEGMENT_SIZE {
            match seq.next_element::<Option<u8>>()? {
                Some(byte) => segment.0[filled] = byte.unwrap_or(0),
                None => return Ok(segment),
            }
            filled += 1;
        }
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(segment)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SegmentVisitor)
    }
}

schema_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct StructuredKey (defaulted) {
        "Algorithm" => pub algorithm: Specifier,
        "Key" => pub key: Bytes,
    }
}

/// Public key named by its signature algorithm.
///
/// Written as `"<algorithm>:<hex key>"`. Older records hold an object with
/// `Algorithm` and a base64 `Key`, which is still read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SiaPublicKey {
    pub algorithm: Specifier,
    pub key: Vec<u8>,
}

impl SiaPublicKey {
    fn from_text(text: &str) -> Option<Self> {
        let (algorithm, key) = text.split_once(':')?;
        if key.contains(':') {
            return None;
        }
        let key = hex::decode(key).ok()?;
        Some(SiaPublicKey {
            algorithm: Specifier(algorithm.to_string()),
            key,
        })
    }
}

impl NullValue for SiaPublicKey {
    fn null_value() -> Option<Self> {
        Some(Self::default())
    }
}

impl fmt::Display for SiaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.0, hex::encode(&self.key))
    }
}

impl Serialize for SiaPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PublicKeyVisitor;

impl<'de> Visitor<'de> for PublicKeyVisitor {
    type Value = SiaPublicKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an \"algorithm:hexkey\" string or an Algorithm/Key object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SiaPublicKey, E> {
        SiaPublicKey::from_text(v)
            .ok_or_else(|| E::custom(format!("malformed public key {:?}", v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<SiaPublicKey, E> {
        Ok(SiaPublicKey::default())
    }

    fn visit_map<A: de::MapAccess<'de>>(self, map: A) -> Result<SiaPublicKey, A::Error> {
        let structured = StructuredKey::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(SiaPublicKey {
            algorithm: structured.algorithm,
            key: structured.key.0,
        })
    }
}

impl<'de> Deserialize<'de> for SiaPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PublicKeyVisitor)
    }
}
