//! Streaming the annotated rows to an output CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use casquery_registry::Registry;
use csv::{ReaderBuilder, StringRecord, Writer};
use serde::Serialize;
use tracing::info;

use crate::error::{BatchError, Result};
use crate::pipeline::BatchPipeline;
use crate::row::{BatchRow, RowStatus};

/// Row counts of a finished (or interrupted) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub normalization_failed: usize,
    pub lookup_failed: usize,
    pub not_found: usize,
    /// Registry round-trips issued during the run.
    pub registry_lookups: usize,
}

impl BatchSummary {
    pub fn record(&mut self, status: RowStatus) {
        self.total += 1;
        match status {
            RowStatus::Success => self.success += 1,
            RowStatus::NormalizationFailed => self.normalization_failed += 1,
            RowStatus::LookupFailed => self.lookup_failed += 1,
            RowStatus::NotFound => self.not_found += 1,
        }
    }

    /// Count for one status.
    #[must_use]
    pub fn count(&self, status: RowStatus) -> usize {
        match status {
            RowStatus::Success => self.success,
            RowStatus::NormalizationFailed => self.normalization_failed,
            RowStatus::LookupFailed => self.lookup_failed,
            RowStatus::NotFound => self.not_found,
        }
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.success
    }
}

/// Write `headers` and then every row, flushing after each one so that an
/// interrupted run leaves only complete rows behind.
///
/// `on_row` sees each row after it has been written.
pub fn write_batch<W, I, F>(
    headers: &StringRecord,
    rows: I,
    writer: &mut Writer<W>,
    mut on_row: F,
) -> Result<BatchSummary>
where
    W: Write,
    I: IntoIterator<Item = Result<BatchRow>>,
    F: FnMut(&BatchRow),
{
    writer.write_record(headers).map_err(BatchError::Write)?;
    writer.flush()?;
    let mut summary = BatchSummary::default();
    for row in rows {
        let row = row?;
        writer
            .write_record(&row.output_record())
            .map_err(BatchError::Write)?;
        writer.flush()?;
        summary.record(row.status);
        on_row(&row);
    }
    Ok(summary)
}

/// Process `input` into `output` with `pipeline`.
///
/// Input rows may have differing field counts; missing CAS RN cells count as
/// normalization failures rather than aborting the run.
pub fn run_batch<R, F>(
    pipeline: &BatchPipeline<R>,
    input: &Path,
    column: &str,
    output: &Path,
    on_row: F,
) -> Result<BatchSummary>
where
    R: Registry,
    F: FnMut(&BatchRow),
{
    let reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(input)
        .map_err(|source| BatchError::Open {
            path: input.to_path_buf(),
            source,
        })?;
    let rows = pipeline.process(reader, column)?;
    let headers = rows.headers().clone();

    let file = File::create(output)?;
    let mut writer = Writer::from_writer(file);
    let mut summary = write_batch(&headers, rows, &mut writer, on_row)?;
    summary.registry_lookups = pipeline.registry_lookups();

    info!(
        input = %input.display(),
        output = %output.display(),
        total = summary.total,
        success = summary.success,
        failed = summary.failed(),
        registry_lookups = summary.registry_lookups,
        "batch complete"
    );
    Ok(summary)
}
