use casquery_batch::BatchRow;
use casquery_model::SearchResult;
use serde::Serialize;

/// Something the formatter can lay out as a row of named text fields.
pub trait Record: Serialize {
    /// `(name, value)` pairs in output order. Missing values are empty.
    fn columns(&self) -> Vec<(String, String)>;

    /// Key for ordering table output; `None` keeps input order.
    fn sort_key(&self) -> Option<&str>;
}

impl Record for SearchResult {
    fn columns(&self) -> Vec<(String, String)> {
        let mut columns = vec![
            ("cas_rn".to_string(), self.cas_rn.to_string()),
            (
                "systematicName".to_string(),
                self.systematic_name.clone().unwrap_or_default(),
            ),
            ("epaName".to_string(), self.epa_name.clone().unwrap_or_default()),
            (
                "currentCasNumber".to_string(),
                self.current_cas_number.clone(),
            ),
        ];
        if let Some(synonyms) = self.joined_synonyms() {
            columns.push(("synonyms".to_string(), synonyms));
        }
        columns
    }

    fn sort_key(&self) -> Option<&str> {
        Some(self.cas_rn.as_str())
    }
}

/// Batch rows keep file order; their position is meaningful.
impl Record for BatchRow {
    fn columns(&self) -> Vec<(String, String)> {
        BatchRow::columns(self)
    }

    fn sort_key(&self) -> Option<&str> {
        None
    }
}
