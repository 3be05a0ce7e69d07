//! Annotated batch rows and the output column layout.

use std::fmt;
use std::sync::Arc;

use casquery_model::Casrn;
use csv::StringRecord;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const NORMALIZED_COLUMN: &str = "casquery_normalized";
pub const RESOLVED_COLUMN: &str = "casquery_resolved";
pub const SYSTEMATIC_NAME_COLUMN: &str = "casquery_systematicName";
pub const EPA_NAME_COLUMN: &str = "casquery_epaName";
pub const STATUS_COLUMN: &str = "casquery_status";
pub const ERROR_COLUMN: &str = "casquery_error";

/// Columns appended to every input row, in output order.
pub const ANNOTATION_COLUMNS: [&str; 6] = [
    NORMALIZED_COLUMN,
    RESOLVED_COLUMN,
    SYSTEMATIC_NAME_COLUMN,
    EPA_NAME_COLUMN,
    STATUS_COLUMN,
    ERROR_COLUMN,
];

/// Outcome of processing one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowStatus {
    Success,
    NormalizationFailed,
    LookupFailed,
    NotFound,
}

impl RowStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NormalizationFailed => "normalization-failed",
            Self::LookupFailed => "lookup-failed",
            Self::NotFound => "not-found",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output header plus where each annotation column sits in it.
///
/// Annotation columns already present in the input (for example when a
/// previous output file is processed again) are overwritten in place rather
/// than appended a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    headers: StringRecord,
    input_width: usize,
    positions: [usize; 6],
}

impl OutputLayout {
    #[must_use]
    pub fn new(input_headers: &StringRecord) -> Self {
        let mut headers = input_headers.clone();
        let mut positions = [0; 6];
        for (slot, name) in positions.iter_mut().zip(ANNOTATION_COLUMNS) {
            *slot = match input_headers.iter().position(|h| h == name) {
                Some(index) => index,
                None => {
                    headers.push_field(name);
                    headers.len() - 1
                }
            };
        }
        Self {
            headers,
            input_width: input_headers.len(),
            positions,
        }
    }

    #[must_use]
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.input_width
    }
}

/// One input record annotated with its normalization and resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// 1-based data row number (header excluded).
    pub row: u64,
    /// The input record, unchanged.
    pub record: StringRecord,
    /// Raw value of the CAS RN column.
    pub raw: String,
    pub normalized: Option<Casrn>,
    pub resolved: Option<Casrn>,
    pub systematic_name: Option<String>,
    pub epa_name: Option<String>,
    pub status: RowStatus,
    pub error: Option<String>,
    pub(crate) layout: Arc<OutputLayout>,
}

impl BatchRow {
    /// The six annotation values in [`ANNOTATION_COLUMNS`] order.
    #[must_use]
    pub fn annotations(&self) -> [String; 6] {
        [
            display_or_empty(self.normalized.as_ref()),
            display_or_empty(self.resolved.as_ref()),
            self.systematic_name.clone().unwrap_or_default(),
            self.epa_name.clone().unwrap_or_default(),
            self.status.to_string(),
            self.error.clone().unwrap_or_default(),
        ]
    }

    #[must_use]
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Column names of [`Self::output_record`].
    #[must_use]
    pub fn headers(&self) -> &StringRecord {
        self.layout.headers()
    }

    /// The record as written to the output file: input fields followed by the
    /// annotation columns. Short input rows are padded with empty fields;
    /// fields beyond the header are carried in the error column by the
    /// pipeline instead.
    #[must_use]
    pub fn output_record(&self) -> StringRecord {
        let width = self.layout.headers.len();
        let mut fields: Vec<String> = self.record.iter().map(String::from).collect();
        fields.truncate(width);
        fields.resize(width, String::new());
        for (position, value) in self.layout.positions.iter().zip(self.annotations()) {
            fields[*position] = value;
        }
        StringRecord::from(fields)
    }

    /// Ordered `(column, value)` pairs of the output record.
    #[must_use]
    pub fn columns(&self) -> Vec<(String, String)> {
        self.headers()
            .iter()
            .map(String::from)
            .zip(self.output_record().iter().map(String::from))
            .collect()
    }
}

impl Serialize for BatchRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.output_record();
        let mut map = serializer.serialize_map(Some(record.len()))?;
        for (name, value) in self.headers().iter().zip(record.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn display_or_empty(value: Option<&Casrn>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(layout: OutputLayout, record: &[&str]) -> BatchRow {
        BatchRow {
            row: 1,
            record: StringRecord::from(record.to_vec()),
            raw: "7440666".to_string(),
            normalized: Some(casquery_model::normalize("7440666").unwrap()),
            resolved: Some(casquery_model::normalize("7440666").unwrap()),
            systematic_name: Some("Zinc".to_string()),
            epa_name: None,
            status: RowStatus::Success,
            error: None,
            layout: Arc::new(layout),
        }
    }

    #[test]
    fn layout_appends_annotation_columns() {
        let layout = OutputLayout::new(&StringRecord::from(vec!["sample_id", "cas_rn"]));
        let headers: Vec<&str> = layout.headers().iter().collect();
        assert_eq!(
            headers,
            vec![
                "sample_id",
                "cas_rn",
                "casquery_normalized",
                "casquery_resolved",
                "casquery_systematicName",
                "casquery_epaName",
                "casquery_status",
                "casquery_error",
            ]
        );
        assert_eq!(layout.input_width(), 2);
    }

    #[test]
    fn layout_reuses_existing_annotation_columns() {
        let input = StringRecord::from(vec!["cas_rn", "casquery_status", "note"]);
        let layout = OutputLayout::new(&input);
        assert_eq!(layout.headers().len(), 8);
        assert_eq!(layout.headers().get(1), Some("casquery_status"));

        let annotated = row(layout, &["7440666", "stale", "keep"]);
        let record = annotated.output_record();
        assert_eq!(record.get(1), Some("success"));
        assert_eq!(record.get(2), Some("keep"));
    }

    #[test]
    fn short_rows_are_padded() {
        let layout = OutputLayout::new(&StringRecord::from(vec!["id", "cas_rn", "note"]));
        let annotated = row(layout, &["S1"]);
        let record = annotated.output_record();
        assert_eq!(record.len(), 9);
        assert_eq!(record.get(1), Some(""));
        assert_eq!(record.get(3), Some("7440-66-6"));
        assert_eq!(record.get(7), Some("success"));
    }

    #[test]
    fn columns_follow_output_order() {
        let layout = OutputLayout::new(&StringRecord::from(vec!["cas_rn"]));
        let annotated = row(layout, &["7440666"]);
        let columns = annotated.columns();
        assert_eq!(columns.len(), 7);
        assert_eq!(columns[0], ("cas_rn".to_string(), "7440666".to_string()));
        assert_eq!(
            columns[3],
            ("casquery_systematicName".to_string(), "Zinc".to_string())
        );
        assert_eq!(columns[6], ("casquery_error".to_string(), String::new()));
    }

    #[test]
    fn status_names_are_kebab_case() {
        assert_eq!(RowStatus::NormalizationFailed.to_string(), "normalization-failed");
        assert_eq!(RowStatus::LookupFailed.as_str(), "lookup-failed");
        assert_eq!(RowStatus::NotFound.as_str(), "not-found");
        assert!(RowStatus::Success.is_success());
    }
}
