//! Row-by-row normalization and resolution of a CAS RN column.
//!
//! The pipeline never materializes the input: [`BatchPipeline::process`]
//! returns a forward-only iterator that reads, normalizes, and resolves one
//! record per call. A failure for one row is recorded in that row's status
//! and the next row is processed as usual.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use casquery_model::{Casrn, Normalizer};
use casquery_registry::{Registry, Resolution, ResolutionError, Resolver};
use csv::{Reader, StringRecord, StringRecordsIntoIter};
use tracing::{debug, trace, warn};

use crate::error::{BatchError, Result};
use crate::row::{BatchRow, OutputLayout, RowStatus};

/// Default name of the CAS RN column.
pub const DEFAULT_COLUMN: &str = "cas_rn";

/// Knobs for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub normalizer: Normalizer,
    /// Query each distinct normalized CAS RN once per run.
    pub dedupe: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            normalizer: Normalizer::strict(),
            dedupe: true,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }
}

/// Why a normalized CAS RN could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    status: RowStatus,
    message: String,
}

type Outcome = std::result::Result<Resolution, Failure>;

/// Normalizes, resolves, and annotates CSV rows.
pub struct BatchPipeline<R> {
    resolver: Resolver<R>,
    options: PipelineOptions,
    /// Outcome per normalized CAS RN; each key is written once.
    memo: RefCell<HashMap<Casrn, Outcome>>,
    lookups: Cell<usize>,
}

impl<R: Registry> BatchPipeline<R> {
    pub fn new(registry: R, options: PipelineOptions) -> Self {
        Self {
            resolver: Resolver::new(registry),
            options,
            memo: RefCell::new(HashMap::new()),
            lookups: Cell::new(0),
        }
    }

    #[must_use]
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Number of registry round-trips issued so far.
    #[must_use]
    pub fn registry_lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Start processing `reader`, taking CAS RN text from `column`.
    ///
    /// # Errors
    ///
    /// Fails before yielding any row if the header cannot be read or does not
    /// contain `column`.
    pub fn process<Rd: Read>(
        &self,
        mut reader: Reader<Rd>,
        column: &str,
    ) -> Result<BatchRows<'_, R, Rd>> {
        let headers = reader.headers().map_err(BatchError::Read)?.clone();
        let column_index =
            find_column(&headers, column).ok_or_else(|| BatchError::MissingColumn {
                column: column.to_string(),
                available: headers.iter().collect::<Vec<_>>().join(", "),
            })?;
        debug!(column, column_index, "batch column located");
        Ok(BatchRows {
            pipeline: self,
            records: reader.into_records(),
            layout: Arc::new(OutputLayout::new(&headers)),
            column_index,
            row: 0,
        })
    }

    /// Annotate a single input record.
    fn annotate(
        &self,
        row: u64,
        record: StringRecord,
        column_index: usize,
        layout: &Arc<OutputLayout>,
    ) -> BatchRow {
        let raw = record.get(column_index).unwrap_or_default().to_string();
        trace!(row, raw = %raw, "processing row");
        let mut annotated = BatchRow {
            row,
            record,
            raw,
            normalized: None,
            resolved: None,
            systematic_name: None,
            epa_name: None,
            status: RowStatus::Success,
            error: None,
            layout: Arc::clone(layout),
        };

        let casrn = match self.options.normalizer.normalize(&annotated.raw) {
            Ok(casrn) => casrn,
            Err(error) => {
                warn!(row, kind = error.kind(), %error, "normalization failed");
                annotated.status = RowStatus::NormalizationFailed;
                annotated.error = Some(error.to_string());
                return annotated;
            }
        };

        if let Some(message) = extra_fields_message(&annotated.record, layout.input_width()) {
            warn!(row, casrn = %casrn, error = %message, "row wider than header");
            annotated.normalized = Some(casrn);
            annotated.status = RowStatus::LookupFailed;
            annotated.error = Some(message);
            return annotated;
        }

        match self.outcome_for(&casrn) {
            Ok(resolution) => {
                annotated.resolved = Some(resolution.current);
                annotated.systematic_name = resolution.record.systematic_name;
                annotated.epa_name = resolution.record.epa_name;
            }
            Err(failure) => {
                warn!(
                    row,
                    casrn = %casrn,
                    status = %failure.status,
                    error = %failure.message,
                    "resolution failed"
                );
                annotated.status = failure.status;
                annotated.error = Some(failure.message);
            }
        }
        annotated.normalized = Some(casrn);
        annotated
    }

    fn outcome_for(&self, casrn: &Casrn) -> Outcome {
        if self.options.dedupe {
            if let Some(outcome) = self.memo.borrow().get(casrn) {
                trace!(casrn = %casrn, "memo hit");
                return outcome.clone();
            }
        }
        let outcome = self.resolve(casrn);
        if self.options.dedupe {
            self.memo.borrow_mut().insert(casrn.clone(), outcome.clone());
        }
        outcome
    }

    fn resolve(&self, casrn: &Casrn) -> Outcome {
        self.lookups.set(self.lookups.get() + 1);
        self.resolver.resolve(casrn).map_err(|error| {
            let status = match error {
                ResolutionError::NotFound { .. } => RowStatus::NotFound,
                ResolutionError::InvalidCurrent { .. } | ResolutionError::Registry(_) => {
                    RowStatus::LookupFailed
                }
            };
            Failure {
                status,
                message: error.to_string(),
            }
        })
    }
}

/// Lazily annotated rows of one batch run, in input order.
///
/// Single pass: once a row has been yielded it is not produced again.
pub struct BatchRows<'a, R, Rd> {
    pipeline: &'a BatchPipeline<R>,
    records: StringRecordsIntoIter<Rd>,
    layout: Arc<OutputLayout>,
    column_index: usize,
    row: u64,
}

impl<R, Rd> BatchRows<'_, R, Rd> {
    /// Header of the annotated output.
    #[must_use]
    pub fn headers(&self) -> &StringRecord {
        self.layout.headers()
    }
}

impl<R: Registry, Rd: Read> Iterator for BatchRows<'_, R, Rd> {
    type Item = Result<BatchRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(error) => return Some(Err(BatchError::Read(error))),
        };
        self.row += 1;
        Some(Ok(self
            .pipeline
            .annotate(self.row, record, self.column_index, &self.layout)))
    }
}

/// Describe the fields of `record` beyond the header, keeping their values so
/// that nothing from the input is lost when the annotation columns take
/// their place in the output.
fn extra_fields_message(record: &StringRecord, input_width: usize) -> Option<String> {
    let extra: Vec<&str> = record.iter().skip(input_width).collect();
    if extra.is_empty() {
        return None;
    }
    Some(format!(
        "row has {} extra field(s) beyond the {input_width}-column header, not looked up: {}",
        extra.len(),
        extra.join(" | ")
    ))
}

/// Position of `column` in `headers`, ignoring a UTF-8 BOM and surrounding
/// whitespace on header names.
fn find_column(headers: &StringRecord, column: &str) -> Option<usize> {
    let wanted = column.trim();
    headers
        .iter()
        .position(|header| header.trim().trim_matches('\u{feff}').trim() == wanted)
}
