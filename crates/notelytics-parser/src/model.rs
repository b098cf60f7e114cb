use polars::prelude::*;

/// A decoded creator-backoffice export: the first worksheet of the workbook
/// with every cell rendered to text. Column names are the header labels as
/// they appeared in the file (trimmed); no normalization has happened yet.
#[derive(Debug, Clone)]
pub struct RawExport {
    pub df: DataFrame,
}

impl RawExport {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_labels(&self) -> Vec<&str> {
        self.df.get_column_names_str()
    }
}
