use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::RawExport;

/// Zero-based worksheet row holding the column labels. The back office puts a
/// title banner in row 0, so the real header always sits one row below it.
const HEADER_ROW: u32 = 1;

/// Decodes an `.xls`/`.xlsx` export (format auto-detected from the bytes) into
/// an all-string dataframe. Row 0 is skipped as the banner, row 1 supplies the
/// column labels, and every later row becomes a data row. No rows are filtered
/// here; empty and error cells become nulls.
pub fn parse_export(bytes: &[u8]) -> Result<RawExport, ParserError> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = sheets
        .worksheet_range_at(0)
        .ok_or(ParserError::MissingWorksheet)??;
    let df = decode_range(&range)?;
    Ok(RawExport { df })
}

fn decode_range(range: &Range<Data>) -> Result<DataFrame, ParserError> {
    let ((_, start_col), (end_row, end_col)) = match (range.start(), range.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(ParserError::InvalidHeader {
                row_index: HEADER_ROW as usize,
                message: "worksheet is empty".to_string(),
            })
        }
    };

    if end_row < HEADER_ROW {
        return Err(ParserError::InvalidHeader {
            row_index: HEADER_ROW as usize,
            message: "worksheet has no header row below the banner".to_string(),
        });
    }

    let width = (end_col - start_col + 1) as usize;
    let mut labels: Vec<String> = Vec::with_capacity(width);
    let mut seen: HashSet<String> = HashSet::with_capacity(width);
    for (idx, col) in (start_col..=end_col).enumerate() {
        let raw = range
            .get_value((HEADER_ROW, col))
            .and_then(cell_text)
            .unwrap_or_default();
        let trimmed = raw.trim();
        let label = if trimmed.is_empty() {
            format!("unnamed_{idx}")
        } else {
            trimmed.to_string()
        };
        if !seen.insert(label.clone()) {
            return Err(ParserError::InvalidHeader {
                row_index: HEADER_ROW as usize,
                message: format!("duplicate column label '{label}'"),
            });
        }
        labels.push(label);
    }

    let row_count = (end_row - HEADER_ROW) as usize;
    let mut columns: Vec<Column> = Vec::with_capacity(labels.len());
    for (offset, label) in labels.iter().enumerate() {
        let col = start_col + offset as u32;
        let mut values: Vec<Option<String>> = Vec::with_capacity(row_count);
        for row in (HEADER_ROW + 1)..=end_row {
            values.push(range.get_value((row, col)).and_then(cell_text));
        }
        let utf8: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
        columns.push(Series::new(label.as_str().into(), utf8).into());
    }

    Ok(DataFrame::new(columns)?)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(iso_datetime),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

fn iso_datetime(naive: NaiveDateTime) -> String {
    naive.format("%Y-%m-%d %H:%M:%S").to_string()
}
