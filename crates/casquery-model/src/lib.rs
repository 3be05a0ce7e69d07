//! Core types for querying the EPA Substance Registry Service by CAS RN.
//!
//! - [`Casrn`]: a canonical CAS Registry Number, produced by [`normalize`]
//!   or a configured [`Normalizer`]
//! - [`SearchResult`]: one registry record as returned to callers

pub mod casrn;
pub mod error;
pub mod substance;

pub use casrn::{
    Casrn, CheckDigitPolicy, MAX_DIGITS, MIN_DIGITS, Normalizer, compute_check_digit, normalize,
};
pub use error::{NormalizationError, Result};
pub use substance::SearchResult;
