//! CAS Registry Number parsing and canonicalization.
//!
//! A canonical CAS RN is three hyphen-separated digit groups, `D{2,7}-D{2}-D`,
//! where the final digit is a checksum over the others: the rightmost body
//! digit is weighted 1, the next one 2, and so on, and the weighted sum is
//! taken mod 10.
//!
//! ```
//! use casquery_model::normalize;
//!
//! let cas = normalize(" 7440 66 6 ").unwrap();
//! assert_eq!(cas.as_str(), "7440-66-6");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NormalizationError, Result};

/// Fewest digits a CAS RN can have (`NN-NN-N`).
pub const MIN_DIGITS: usize = 5;

/// Most digits a CAS RN can have (`NNNNNNN-NN-N`).
pub const MAX_DIGITS: usize = 10;

/// A CAS Registry Number in canonical hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Casrn(String);

impl Casrn {
    /// Canonicalize a value without verifying its check digit.
    ///
    /// Used for numbers the registry reports about itself, where the registry
    /// is the authority and a local checksum disagreement is not actionable.
    pub fn structural(raw: &str) -> Result<Self> {
        Normalizer::structural().normalize(raw)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The three digit groups.
    #[must_use]
    pub fn parts(&self) -> (&str, &str, &str) {
        let len = self.0.len();
        (&self.0[..len - 5], &self.0[len - 4..len - 2], &self.0[len - 1..])
    }

    /// The final digit as written.
    #[must_use]
    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[self.0.len() - 1] - b'0'
    }

    /// Every digit except the check digit, hyphens removed.
    #[must_use]
    pub fn body_digits(&self) -> String {
        let (first, second, _) = self.parts();
        format!("{first}{second}")
    }
}

impl fmt::Display for Casrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Casrn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Casrn {
    type Err = NormalizationError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl Serialize for Casrn {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Casrn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::structural(&raw).map_err(serde::de::Error::custom)
    }
}

/// Whether the normalizer verifies the trailing check digit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckDigitPolicy {
    /// Reject values whose check digit does not match.
    #[default]
    Verify,
    /// Only apply the hyphenation rules.
    Skip,
}

/// Turns free-form text into a [`Casrn`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    pub check_digit: CheckDigitPolicy,
}

impl Normalizer {
    /// Normalizer that verifies check digits.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            check_digit: CheckDigitPolicy::Verify,
        }
    }

    /// Normalizer that only regroups digits.
    #[must_use]
    pub const fn structural() -> Self {
        Self {
            check_digit: CheckDigitPolicy::Skip,
        }
    }

    /// Normalize `raw` into canonical `abcde-fg-h` form.
    ///
    /// All non-digit characters are discarded first, so `"CAS 7440 66 6"`,
    /// `"7440666"` and `"7440-66-6"` all produce the same number.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizationError`] naming `raw` when the digit count is
    /// out of range, the first group is all zeros, or (under
    /// [`CheckDigitPolicy::Verify`]) the check digit does not match.
    pub fn normalize(&self, raw: &str) -> Result<Casrn> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        let len = digits.len();
        if len < MIN_DIGITS {
            return Err(NormalizationError::TooShort {
                raw: raw.to_string(),
                digits: len,
            });
        }
        if len > MAX_DIGITS {
            return Err(NormalizationError::TooLong {
                raw: raw.to_string(),
                digits: len,
            });
        }

        let first = &digits[..len - 3];
        let second = &digits[len - 3..len - 1];
        let check = &digits[len - 1..];
        if first.bytes().all(|b| b == b'0') {
            return Err(NormalizationError::ZeroPrefix {
                raw: raw.to_string(),
            });
        }

        if self.check_digit == CheckDigitPolicy::Verify {
            let found = check.as_bytes()[0] - b'0';
            // `digits` is ASCII-only, so the body always yields a value.
            let expected = compute_check_digit(&digits[..len - 1]).unwrap_or(u8::MAX);
            if expected != found {
                return Err(NormalizationError::InvalidCheckDigit {
                    raw: raw.to_string(),
                    expected,
                    found,
                });
            }
        }

        Ok(Casrn(format!("{first}-{second}-{check}")))
    }
}

/// Normalize with check-digit verification.
///
/// # Errors
///
/// See [`Normalizer::normalize`].
pub fn normalize(raw: &str) -> Result<Casrn> {
    Normalizer::strict().normalize(raw)
}

/// Compute the CAS check digit for the body digits (everything but the
/// check digit, without hyphens).
///
/// Returns `None` if `body` is empty or contains a non-digit.
#[must_use]
pub fn compute_check_digit(body: &str) -> Option<u8> {
    if body.is_empty() {
        return None;
    }
    let mut sum: u32 = 0;
    for (position, byte) in body.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return None;
        }
        let weight = u32::try_from(position + 1).ok()?;
        sum += u32::from(byte - b'0') * weight;
    }
    u8::try_from(sum % 10).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_numbers() {
        assert_eq!(normalize("7440-66-6").unwrap().as_str(), "7440-66-6");
        assert_eq!(normalize("7440097").unwrap().as_str(), "7440-09-7");
        assert_eq!(normalize("  375-73-5  ").unwrap().as_str(), "375-73-5");
        assert_eq!(normalize("375735").unwrap().as_str(), "375-73-5");
        assert_eq!(normalize("12 34 56 6").unwrap().as_str(), "1234-56-6");
        assert_eq!(normalize("CAS 50-00-0").unwrap().as_str(), "50-00-0");
    }

    #[test]
    fn keeps_leading_zeros_in_first_group() {
        assert_eq!(normalize("0050-00-0").unwrap().as_str(), "0050-00-0");
    }

    #[test]
    fn rejects_short_and_long_inputs() {
        assert_eq!(
            normalize("123"),
            Err(NormalizationError::TooShort {
                raw: "123".to_string(),
                digits: 3
            })
        );
        assert_eq!(
            normalize("").unwrap_err(),
            NormalizationError::TooShort {
                raw: String::new(),
                digits: 0
            }
        );
        assert!(matches!(
            normalize("12345678901"),
            Err(NormalizationError::TooLong { digits: 11, .. })
        ));
    }

    #[test]
    fn rejects_all_zero_first_group() {
        assert_eq!(normalize("00-00-0").unwrap_err().kind(), "zero-prefix");
    }

    #[test]
    fn rejects_wrong_check_digit() {
        let err = normalize("1234567").unwrap_err();
        assert_eq!(
            err,
            NormalizationError::InvalidCheckDigit {
                raw: "1234567".to_string(),
                expected: 6,
                found: 7
            }
        );
        assert!(err.to_string().contains("1234567"));
    }

    #[test]
    fn structural_mode_skips_check_digit() {
        let cas = Normalizer::structural().normalize("1234567").unwrap();
        assert_eq!(cas.as_str(), "1234-56-7");
    }

    #[test]
    fn check_digit_matches_published_numbers() {
        assert_eq!(compute_check_digit("744066"), Some(6));
        assert_eq!(compute_check_digit("744009"), Some(7));
        assert_eq!(compute_check_digit("2942049"), Some(3));
        assert_eq!(compute_check_digit("773218"), Some(5));
        assert_eq!(compute_check_digit(""), None);
        assert_eq!(compute_check_digit("12a"), None);
    }

    #[test]
    fn parts_split_canonical_form() {
        let cas = normalize("29420-49-3").unwrap();
        assert_eq!(cas.parts(), ("29420", "49", "3"));
        assert_eq!(cas.check_digit(), 3);
        assert_eq!(cas.body_digits(), "2942049");
    }

    #[test]
    fn from_str_verifies() {
        assert!("7732-18-5".parse::<Casrn>().is_ok());
        assert!("7732-18-4".parse::<Casrn>().is_err());
    }

    #[test]
    fn serde_uses_plain_string() {
        let cas = normalize("7732185").unwrap();
        let json = serde_json::to_string(&cas).unwrap();
        assert_eq!(json, "\"7732-18-5\"");
        let back: Casrn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cas);
        assert!(serde_json::from_str::<Casrn>("\"12\"").is_err());
    }
}
