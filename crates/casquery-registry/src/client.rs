//! Substance Registry Service client.

use casquery_model::{Casrn, SearchResult};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::transport::{HttpTransport, Transport};
use crate::wire::{OneOrMany, SrsSubstance};

/// Source of registry records, keyed by CAS RN.
///
/// Implemented by [`RegistryClient`]; the resolution engine and the batch
/// pipeline only depend on this trait.
pub trait Registry {
    /// All records the registry holds for `casrn`, in registry order.
    fn lookup(&self, casrn: &Casrn, include_synonyms: bool) -> Result<Vec<SearchResult>>;

    /// Look up each number in turn and concatenate the records.
    ///
    /// Output follows registry response order; numbers without a record
    /// contribute nothing. The first error aborts the search.
    fn search(&self, casrns: &[Casrn], include_synonyms: bool) -> Result<Vec<SearchResult>> {
        let mut results = Vec::with_capacity(casrns.len());
        for casrn in casrns {
            let records = self.lookup(casrn, include_synonyms)?;
            if records.is_empty() {
                warn!(casrn = %casrn, "no registry record");
            }
            results.extend(records);
        }
        Ok(results)
    }
}

impl<R: Registry + ?Sized> Registry for &R {
    fn lookup(&self, casrn: &Casrn, include_synonyms: bool) -> Result<Vec<SearchResult>> {
        (**self).lookup(casrn, include_synonyms)
    }
}

/// Client for the EPA SRS REST API.
#[derive(Debug, Clone)]
pub struct RegistryClient<T = HttpTransport> {
    transport: T,
    base_url: String,
}

impl RegistryClient<HttpTransport> {
    /// Create a client backed by a real HTTP transport.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(transport, &config.base_url))
    }
}

impl<T: Transport> RegistryClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cas_url(&self, casrn: &Casrn) -> String {
        format!("{}/substance/cas/{casrn}?qualifier=exact", self.base_url)
    }

    fn itn_url(&self, tracking_number: &str) -> String {
        format!("{}/substance/itn/{tracking_number}", self.base_url)
    }

    /// GET `url` and decode the body as `D`.
    fn fetch<D: DeserializeOwned>(&self, url: &str) -> Result<D> {
        let response = self.transport.get(url)?;
        if !response.is_success() {
            warn!(url, status = response.status, "registry request failed");
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        let value: serde_json::Value =
            serde_json::from_str(&response.body).map_err(|source| RegistryError::Malformed {
                url: url.to_string(),
                source,
            })?;
        serde_json::from_value(value).map_err(|e| RegistryError::UnexpectedShape {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    fn fetch_substances(&self, casrn: &Casrn) -> Result<Vec<SrsSubstance>> {
        let url = self.cas_url(casrn);
        debug!(casrn = %casrn, url = %url, "querying registry");
        let substances: Vec<SrsSubstance> = self.fetch(&url)?;
        reject_empty_records(&url, &substances)?;
        Ok(substances)
    }

    /// Synonyms for one record, fetching them by tracking number when the CAS
    /// response did not embed them.
    fn synonyms_for(&self, substance: &SrsSubstance) -> Result<Vec<String>> {
        if let Some(names) = substance.synonym_names() {
            return Ok(names);
        }
        let Some(tracking_number) = &substance.internal_tracking_number else {
            return Ok(Vec::new());
        };
        let url = self.itn_url(&tracking_number.to_string());
        debug!(url = %url, "fetching synonyms");
        let details = self.fetch::<OneOrMany>(&url)?.into_vec();
        reject_empty_records(&url, &details)?;
        Ok(details
            .iter()
            .filter_map(SrsSubstance::synonym_names)
            .flatten()
            .collect())
    }
}

impl<T: Transport> Registry for RegistryClient<T> {
    fn lookup(&self, casrn: &Casrn, include_synonyms: bool) -> Result<Vec<SearchResult>> {
        let substances = self.fetch_substances(casrn)?;
        debug!(casrn = %casrn, records = substances.len(), "registry lookup complete");
        substances
            .into_iter()
            .map(|substance| -> Result<SearchResult> {
                let synonyms = if include_synonyms {
                    Some(self.synonyms_for(&substance)?)
                } else {
                    None
                };
                Ok(into_search_result(casrn, substance, synonyms))
            })
            .collect()
    }
}

fn is_empty_record(substance: &SrsSubstance) -> bool {
    substance.internal_tracking_number.is_none()
        && substance.systematic_name.is_none()
        && substance.epa_name.is_none()
        && substance.current_cas_number.is_none()
        && substance.synonyms.is_none()
}

/// A JSON object with none of the substance fields is an error payload, not
/// a record.
fn reject_empty_records(url: &str, substances: &[SrsSubstance]) -> Result<()> {
    match substances.iter().position(is_empty_record) {
        Some(position) => Err(RegistryError::UnexpectedShape {
            url: url.to_string(),
            detail: format!("record {position} has no substance fields"),
        }),
        None => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn into_search_result(
    query: &Casrn,
    substance: SrsSubstance,
    synonyms: Option<Vec<String>>,
) -> SearchResult {
    let current_cas_number =
        non_blank(substance.current_cas_number).unwrap_or_else(|| query.to_string());
    SearchResult {
        cas_rn: query.clone(),
        systematic_name: non_blank(substance.systematic_name),
        epa_name: non_blank(substance.epa_name),
        current_cas_number,
        synonyms,
    }
}
