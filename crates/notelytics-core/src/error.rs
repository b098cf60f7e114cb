use notelytics_parser::ParserError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Per-file analysis failures. Every variant is fatal for the file it came
/// from and none of them aborts the batch.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("export could not be parsed: {0}")]
    Parse(#[from] ParserError),

    #[error("required columns missing after normalization: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("two source columns normalize to '{label}'")]
    DuplicateColumn { label: String },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("workbook serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}
