use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to render XML: {0}")]
    Xml(String),

    #[error("rendered output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unknown output format '{0}' (expected table, json, xml, or csv)")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, OutputError>;
