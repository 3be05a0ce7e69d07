use serde::{Deserialize, Serialize};

use crate::casrn::Casrn;

/// One registry record for a queried CAS RN.
///
/// Field names on the wire follow the registry's own naming so that JSON
/// output can be fed back into other SRS tooling unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The CAS RN that was queried.
    pub cas_rn: Casrn,
    #[serde(rename = "systematicName")]
    pub systematic_name: Option<String>,
    #[serde(rename = "epaName")]
    pub epa_name: Option<String>,
    /// Equal to `cas_rn` unless the queried number has been superseded.
    #[serde(rename = "currentCasNumber")]
    pub current_cas_number: String,
    /// Present only when synonym expansion was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
}

impl SearchResult {
    /// True when the registry points the queried number at a different one.
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        self.current_cas_number != self.cas_rn.as_str()
    }

    /// Synonyms joined the way flat output formats carry them.
    #[must_use]
    pub fn joined_synonyms(&self) -> Option<String> {
        self.synonyms.as_ref().map(|names| names.join(";"))
    }
}
