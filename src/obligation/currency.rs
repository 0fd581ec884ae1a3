//! Currency amounts
//!
//! Amounts are arbitrary-precision non-negative integers. The writer stores
//! them as decimal strings, but its reader is looser and this decoder has to
//! be at least as loose:
//!
//! - the value may be a JSON string or a bare JSON number of any size
//! - `null` is zero
//! - a leading `+` is allowed, and `-0` is zero
//! - `0x`, `0o`, `0b` and a bare leading `0` select base 16, 8, 2 and 8
//! - `_` may separate digits, or follow a base prefix
//!
//! Negative amounts, fractions and exponents are corrupt.

use std::fmt;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use super::schema::NullValue;

/// Decimal limb size used while converting between bases.
const LIMB: u32 = 1_000_000_000;

/// Non-negative currency amount of arbitrary precision.
///
/// Held as canonical decimal digits (no sign, no leading zeros).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    /// The zero amount.
    pub fn zero() -> Self {
        Currency("0".to_string())
    }

    /// Parses an integer literal with an optional sign and base prefix.
    pub fn parse(text: &str) -> Result<Self, String> {
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'+') => (false, &text[1..]),
            Some(b'-') => (true, &text[1..]),
            _ => (false, text),
        };
        let (base, digits, after_prefix) = split_base_prefix(unsigned);
        let digits = strip_separators(digits, after_prefix)
            .ok_or_else(|| format!("misplaced '_' in currency amount {:?}", text))?;
        if digits.is_empty() {
            return Err(format!("no digits in currency amount {:?}", text));
        }

        let amount = Currency(to_decimal(&digits, base).ok_or_else(|| {
            format!("invalid base-{} digit in currency amount {:?}", base, text)
        })?);
        if negative && amount != Currency::zero() {
            return Err(format!("negative currency amount {}", text));
        }
        Ok(amount)
    }

    /// Returns the canonical decimal digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Splits off a base prefix. The flag reports whether one was present.
fn split_base_prefix(text: &str) -> (u32, &str, bool) {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &text[2..], true),
            b'o' | b'O' => return (8, &text[2..], true),
            b'b' | b'B' => return (2, &text[2..], true),
            _ => return (8, &text[1..], true),
        }
    }
    (10, text, false)
}

/// Removes `_` separators, or returns `None` if one is misplaced.
fn strip_separators(digits: &str, after_prefix: bool) -> Option<String> {
    let mut out = String::with_capacity(digits.len());
    // A separator may follow a prefix or a digit, and must precede a digit.
    let mut separator_ok = after_prefix;
    let mut last_was_separator = false;
    for c in digits.chars() {
        if c == '_' {
            if !separator_ok {
                return None;
            }
            separator_ok = false;
            last_was_separator = true;
        } else {
            out.push(c);
            separator_ok = true;
            last_was_separator = false;
        }
    }
    if last_was_separator {
        return None;
    }
    Some(out)
}

/// Converts digits in `base` to canonical decimal.
fn to_decimal(digits: &str, base: u32) -> Option<String> {
    // Little-endian base 10^9 limbs.
    let mut limbs: Vec<u32> = vec![0];
    for c in digits.chars() {
        let mut carry = u64::from(c.to_digit(base)?);
        for limb in limbs.iter_mut() {
            let wide = u64::from(*limb) * u64::from(base) + carry;
            *limb = (wide % u64::from(LIMB)) as u32;
            carry = wide / u64::from(LIMB);
        }
        while carry > 0 {
            limbs.push((carry % u64::from(LIMB)) as u32);
            carry /= u64::from(LIMB);
        }
    }

    while limbs.len() > 1 && limbs.last() == Some(&0) {
        limbs.pop();
    }
    let mut out = String::new();
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{:09}", limb));
    }
    Some(out)
}

impl Default for Currency {
    fn default() -> Self {
        Self::zero()
    }
}

impl NullValue for Currency {
    fn null_value() -> Option<Self> {
        Some(Self::zero())
    }
}

impl From<u128> for Currency {
    fn from(value: u128) -> Self {
        Currency(value.to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Currency {
    /// Reads the raw JSON text so bare numbers keep every digit.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get().trim_matches('"');
        if text == "null" {
            return Ok(Self::zero());
        }
        Currency::parse(text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<Currency, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_decimal_canonical_form() {
        assert_eq!(Currency::parse("0").unwrap(), Currency::zero());
        assert_eq!(Currency::parse("120").unwrap().as_str(), "120");
        assert_eq!(Currency::parse("+5").unwrap(), Currency::from(5));
        assert_eq!(Currency::parse("-0").unwrap(), Currency::zero());
        assert_eq!(Currency::parse("1_000").unwrap(), Currency::from(1000));
    }

    #[test]
    fn test_base_prefixes() {
        assert_eq!(Currency::parse("0x10").unwrap(), Currency::from(16));
        assert_eq!(Currency::parse("0XfF").unwrap(), Currency::from(255));
        assert_eq!(Currency::parse("0o17").unwrap(), Currency::from(15));
        assert_eq!(Currency::parse("0b101").unwrap(), Currency::from(5));
        assert_eq!(Currency::parse("0120").unwrap(), Currency::from(80));
        assert_eq!(Currency::parse("0x_1f").unwrap(), Currency::from(31));
    }

    #[test]
    fn test_rejected_literals() {
        for text in [
            "", "+", "-5", "1.5", "1e3", "0x", "08", "_1", "1_", "1__0", "12a", " 1", "0xg",
        ] {
            assert!(Currency::parse(text).is_err(), "{:?} should be rejected", text);
        }
    }

    #[test]
    fn test_hex_beyond_u128() {
        let amount = Currency::parse(&format!("0x1{}", "0".repeat(32))).unwrap();
        assert_eq!(amount.as_str(), "340282366920938463463374607431768211456");
    }

    #[test]
    fn test_json_forms() {
        assert_eq!(decode("\"42\"").unwrap(), Currency::from(42));
        assert_eq!(decode("42").unwrap(), Currency::from(42));
        assert_eq!(decode("null").unwrap(), Currency::zero());
        assert_eq!(decode("\"0x10\"").unwrap(), Currency::from(16));
        assert_eq!(decode("\"+5\"").unwrap(), Currency::from(5));
        assert!(decode("-1").is_err());
        assert!(decode("\"\"").is_err());
        assert!(decode("1.0").is_err());
        assert!(decode("true").is_err());
    }

    #[test]
    fn test_bare_number_keeps_every_digit() {
        let big = "340282366920938463463374607431768211456000";
        assert_eq!(decode(big).unwrap().as_str(), big);
        assert_eq!(decode(&format!("\"{}\"", big)).unwrap().as_str(), big);
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let amount = Currency::parse("0x10").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"16\"");
    }
}
