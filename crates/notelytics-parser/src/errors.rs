use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("workbook could not be decoded: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook does not contain any worksheets")]
    MissingWorksheet,

    #[error("header row {row_index} invalid: {message}")]
    InvalidHeader { row_index: usize, message: String },

    #[error("failed to assemble raw dataframe: {0}")]
    Dataframe(#[from] PolarsError),
}
