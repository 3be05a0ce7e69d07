use thiserror::Error;

/// Why a piece of text could not be turned into a CAS Registry Number.
///
/// Every variant carries the raw input so a failure can be traced back to the
/// offending cell or argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("'{raw}' has {digits} digit(s); a CAS RN needs at least 5")]
    TooShort { raw: String, digits: usize },

    #[error("'{raw}' has {digits} digits; a CAS RN has at most 10")]
    TooLong { raw: String, digits: usize },

    #[error("'{raw}' has an all-zero first group")]
    ZeroPrefix { raw: String },

    #[error("'{raw}' fails the CAS check digit (expected {expected}, found {found})")]
    InvalidCheckDigit {
        raw: String,
        expected: u8,
        found: u8,
    },
}

impl NormalizationError {
    /// The input that failed to normalize.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::TooShort { raw, .. }
            | Self::TooLong { raw, .. }
            | Self::ZeroPrefix { raw }
            | Self::InvalidCheckDigit { raw, .. } => raw,
        }
    }

    /// Short machine-friendly name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too-short",
            Self::TooLong { .. } => "too-long",
            Self::ZeroPrefix { .. } => "zero-prefix",
            Self::InvalidCheckDigit { .. } => "invalid-check-digit",
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizationError>;
