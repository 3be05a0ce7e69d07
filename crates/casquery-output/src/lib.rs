//! Output formatting for registry results and annotated batch rows.
//!
//! ```
//! use casquery_model::{SearchResult, normalize};
//! use casquery_output::{OutputFormat, render};
//!
//! let zinc = SearchResult {
//!     cas_rn: normalize("7440-66-6").unwrap(),
//!     systematic_name: Some("Zinc".to_string()),
//!     epa_name: Some("Zinc".to_string()),
//!     current_cas_number: "7440-66-6".to_string(),
//!     synonyms: None,
//! };
//! let csv = render(&[zinc], OutputFormat::Csv).unwrap();
//! assert!(csv.starts_with("cas_rn,systematicName,epaName,currentCasNumber\n"));
//! ```

pub mod error;
pub mod format;
pub mod record;
pub mod render;

pub use error::{OutputError, Result};
pub use format::OutputFormat;
pub use record::Record;
pub use render::{
    EMPTY_TABLE_MESSAGE, render, render_csv, render_json, render_table, render_xml,
};
