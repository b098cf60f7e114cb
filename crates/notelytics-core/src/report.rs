use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::analysis::Analysis;
use crate::columns::DISPLAY_COLUMNS;
use crate::error::ReportError;
use crate::sanitizer::naive_from_micros;

pub const REPORT_FILENAME: &str = "小红书分析汇总报告.xlsx";
pub const REPORT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Hard cap on xlsx sheet names, counted in characters.
pub const SHEET_NAME_LIMIT: usize = 31;

/// Per-file analyses in upload order, keyed by sanitized sheet name.
#[derive(Debug, Default)]
pub struct AggregateReport {
    entries: Vec<ReportEntry>,
}

#[derive(Debug)]
pub struct ReportEntry {
    pub sheet_name: String,
    pub source_file: String,
    pub analysis: Analysis,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Returns the sheet name assigned; collisions get a numeric suffix
    /// instead of replacing the earlier entry.
    pub fn insert(&mut self, source_file: &str, analysis: Analysis) -> String {
        let sheet_name = self.unique_sheet_name(source_file);
        self.entries.push(ReportEntry {
            sheet_name: sheet_name.clone(),
            source_file: source_file.to_string(),
            analysis,
        });
        sheet_name
    }

    fn unique_sheet_name(&self, source_file: &str) -> String {
        let base = sanitize_sheet_name(source_file);
        if !self.contains_sheet(&base) {
            return base;
        }
        let mut counter = 2usize;
        loop {
            let suffix = format!("_{counter}");
            let room = SHEET_NAME_LIMIT.saturating_sub(suffix.chars().count());
            let mut candidate: String = base.chars().take(room).collect();
            candidate.push_str(&suffix);
            if !self.contains_sheet(&candidate) {
                tracing::warn!(
                    "sheet name collision for '{source_file}': using '{candidate}' instead of '{base}'"
                );
                return candidate;
            }
            counter += 1;
        }
    }

    // The xlsx sheet namespace is case-insensitive.
    fn contains_sheet(&self, name: &str) -> bool {
        let folded = name.to_lowercase();
        self.entries
            .iter()
            .any(|entry| entry.sheet_name.to_lowercase() == folded)
    }

    pub fn to_workbook_bytes(&self) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for entry in &self.entries {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&entry.sheet_name)?;
            write_analysis(sheet, &entry.analysis, &header_format, &datetime_format)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// Keeps only the alphanumeric characters of a filename, truncated to the cap.
pub fn sanitize_sheet_name(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(SHEET_NAME_LIMIT)
        .collect();
    if sanitized.is_empty() {
        "sheet".to_string()
    } else {
        sanitized
    }
}

fn write_analysis(
    sheet: &mut Worksheet,
    analysis: &Analysis,
    header_format: &Format,
    datetime_format: &Format,
) -> Result<(), ReportError> {
    let df = &analysis.df;
    let height = df.height();

    for (col, label) in DISPLAY_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *label, header_format)?;
    }

    for (col_idx, label) in DISPLAY_COLUMNS.iter().enumerate() {
        let column = df.column(label)?;
        let col = col_idx as u16;
        match column.dtype() {
            DataType::UInt32 => {
                let values = column.u32()?;
                for row in 0..height {
                    if let Some(value) = values.get(row) {
                        sheet.write_number(row as u32 + 1, col, value as f64)?;
                    }
                }
            }
            DataType::Float64 => {
                let values = column.f64()?;
                for row in 0..height {
                    if let Some(value) = values.get(row) {
                        sheet.write_number(row as u32 + 1, col, value)?;
                    }
                }
            }
            DataType::Datetime(_, _) => {
                let values = column.datetime()?;
                for row in 0..height {
                    if let Some(micros) = values.get(row) {
                        if let Some(stamp) = naive_from_micros(micros) {
                            sheet.write_datetime_with_format(
                                row as u32 + 1,
                                col,
                                &stamp,
                                datetime_format,
                            )?;
                        }
                    }
                }
            }
            _ => {
                let values = column.str()?;
                for row in 0..height {
                    if let Some(value) = values.get(row) {
                        sheet.write_string(row as u32 + 1, col, value)?;
                    }
                }
            }
        }
    }

    Ok(())
}
