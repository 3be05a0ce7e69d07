//! Response shapes of the SRS REST API.
//!
//! Only the fields this crate reads are declared; everything else the
//! registry sends is ignored.

use std::fmt;

use serde::Deserialize;

/// A substance record from `substance/cas/{casrn}` or `substance/itn/{itn}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsSubstance {
    #[serde(default)]
    pub internal_tracking_number: Option<TrackingNumber>,
    #[serde(default)]
    pub systematic_name: Option<String>,
    #[serde(default)]
    pub epa_name: Option<String>,
    #[serde(default)]
    pub current_cas_number: Option<String>,
    #[serde(default)]
    pub synonyms: Option<Vec<SrsSynonym>>,
}

impl SrsSubstance {
    /// Synonym names in registry order, blanks dropped.
    pub fn synonym_names(&self) -> Option<Vec<String>> {
        self.synonyms.as_ref().map(|synonyms| {
            synonyms
                .iter()
                .filter_map(|s| s.synonym_name.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsSynonym {
    #[serde(default)]
    pub synonym_name: Option<String>,
}

/// Registry substance id; sent as a number by some endpoints and a string by
/// others.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TrackingNumber {
    Number(u64),
    Text(String),
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// The `itn` endpoint answers with either a single record or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<SrsSubstance>),
    One(Box<SrsSubstance>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<SrsSubstance> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![*item],
        }
    }
}
