//! Batch normalization and resolution of CAS RN columns in CSV files.
//!
//! Each input row is read, its CAS RN cell normalized, resolved against the
//! registry, and written back out with six `casquery_*` columns appended.
//! Rows that fail at any stage are still written, flagged with a status and
//! an error message, so one bad cell never blocks the rest of the file.
//!
//! # Usage
//!
//! ```ignore
//! use casquery_batch::{BatchPipeline, PipelineOptions, run_batch};
//!
//! let pipeline = BatchPipeline::new(&client, PipelineOptions::default());
//! let summary = run_batch(&pipeline, "in.csv".as_ref(), "cas_rn", "out.csv".as_ref(), |_| {})?;
//! println!("{} of {} rows resolved", summary.success, summary.total);
//! ```

pub mod error;
pub mod pipeline;
pub mod row;
pub mod writer;

pub use error::{BatchError, Result};
pub use pipeline::{BatchPipeline, BatchRows, DEFAULT_COLUMN, PipelineOptions};
pub use row::{ANNOTATION_COLUMNS, BatchRow, OutputLayout, RowStatus};
pub use writer::{BatchSummary, run_batch, write_batch};
