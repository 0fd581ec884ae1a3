//! Obligation decode errors
//!
//! Error code:
//! - OBLIGATION_DECODE_FAILED (ERROR severity, recoverable per record)

use thiserror::Error;

/// Category of the low-level parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeCategory {
    /// Bytes are not valid JSON
    Syntax,
    /// Valid JSON with the wrong shape (type mismatch, missing field, bad encoding)
    Data,
    /// Input ended before the value was complete
    Eof,
    /// Reader failure while parsing
    Io,
}

impl DecodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeCategory::Syntax => "syntax",
            DecodeCategory::Data => "data",
            DecodeCategory::Eof => "eof",
            DecodeCategory::Io => "io",
        }
    }
}

impl From<serde_json::error::Category> for DecodeCategory {
    fn from(category: serde_json::error::Category) -> Self {
        match category {
            serde_json::error::Category::Syntax => DecodeCategory::Syntax,
            serde_json::error::Category::Data => DecodeCategory::Data,
            serde_json::error::Category::Eof => DecodeCategory::Eof,
            serde_json::error::Category::Io => DecodeCategory::Io,
        }
    }
}

/// A record value that does not decode as a storage obligation.
#[derive(Debug, Error)]
#[error("OBLIGATION_DECODE_FAILED: {raw_len}-byte value failed {} check at line {line} column {column}: {source}", .category.as_str())]
pub struct DecodeError {
    /// Length of the raw value that failed
    pub raw_len: usize,
    /// Kind of failure
    pub category: DecodeCategory,
    /// Line of the failure (1-based, 0 if unknown)
    pub line: usize,
    /// Column of the failure (1-based, 0 if unknown)
    pub column: usize,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    pub(crate) fn from_json(raw_len: usize, source: serde_json::Error) -> Self {
        Self {
            raw_len,
            category: source.classify().into(),
            line: source.line(),
            column: source.column(),
            source,
        }
    }

    /// Returns the error code string.
    pub fn code(&self) -> &'static str {
        "OBLIGATION_DECODE_FAILED"
    }

    /// Decode failures route the record to quarantine; they never halt a scan.
    pub fn is_fatal(&self) -> bool {
        false
    }

    /// Returns the underlying parse error message.
    pub fn parse_message(&self) -> String {
        self.source.to_string()
    }
}

/// Result type for obligation decoding
pub type DecodeResult<T> = Result<T, DecodeError>;
