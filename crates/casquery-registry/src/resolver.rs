//! Superseded CAS RN resolution.
//!
//! A number is superseded when its registry record names a different
//! `currentCasNumber`. Resolution follows exactly one hop: if the registry
//! itself chains replacements, the chain is not walked further.

use casquery_model::{Casrn, SearchResult};
use tracing::debug;

use crate::client::Registry;
use crate::error::ResolutionError;

/// Outcome of resolving one CAS RN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub query: Casrn,
    pub current: Casrn,
    /// The registry record the decision was based on.
    pub record: SearchResult,
}

impl Resolution {
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        self.query != self.current
    }
}

/// Resolves CAS RNs to their currently valid numbers.
#[derive(Debug, Clone)]
pub struct Resolver<R> {
    registry: R,
}

impl<R: Registry> Resolver<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Look up `casrn` and return its current number.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::NotFound`] when the registry has no record,
    /// [`ResolutionError::Registry`] when the lookup itself fails.
    pub fn resolve(&self, casrn: &Casrn) -> Result<Resolution, ResolutionError> {
        let records = self.registry.lookup(casrn, false)?;
        resolve_from_records(casrn, records)
    }
}

/// Decide the current number for `query` from its registry records.
///
/// The first record in registry order wins.
pub fn resolve_from_records(
    query: &Casrn,
    records: Vec<SearchResult>,
) -> Result<Resolution, ResolutionError> {
    let Some(record) = records.into_iter().next() else {
        return Err(ResolutionError::NotFound {
            casrn: query.clone(),
        });
    };
    let current = if record.is_superseded() {
        Casrn::structural(&record.current_cas_number).map_err(|source| {
            ResolutionError::InvalidCurrent {
                casrn: query.clone(),
                value: record.current_cas_number.clone(),
                source,
            }
        })?
    } else {
        query.clone()
    };
    debug!(casrn = %query, current = %current, "resolved");
    Ok(Resolution {
        query: query.clone(),
        current,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cas(raw: &str) -> Casrn {
        casquery_model::normalize(raw).unwrap()
    }

    fn record(query: &str, current: &str) -> SearchResult {
        SearchResult {
            cas_rn: cas(query),
            systematic_name: None,
            epa_name: None,
            current_cas_number: current.to_string(),
            synonyms: None,
        }
    }

    #[test]
    fn current_number_is_returned_unchanged() {
        let resolution =
            resolve_from_records(&cas("375-73-5"), vec![record("375-73-5", "375-73-5")]).unwrap();
        assert_eq!(resolution.current, cas("375-73-5"));
        assert!(!resolution.is_superseded());
    }

    #[test]
    fn superseded_number_resolves_one_hop() {
        let resolution = resolve_from_records(
            &cas("29420-49-3"),
            vec![record("29420-49-3", "375735"), record("29420-49-3", "1-11-1")],
        )
        .unwrap();
        assert_eq!(resolution.current.as_str(), "375-73-5");
        assert!(resolution.is_superseded());
    }

    #[test]
    fn no_records_is_not_found() {
        let err = resolve_from_records(&cas("7440-66-6"), Vec::new()).unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { casrn } if casrn == cas("7440-66-6")));
    }

    #[test]
    fn garbage_current_number_is_reported() {
        let err =
            resolve_from_records(&cas("7440-66-6"), vec![record("7440-66-6", "n/a")]).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidCurrent { value, .. } if value == "n/a"));
    }
}
