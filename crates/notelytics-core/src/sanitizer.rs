use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use crate::columns::{PUBLISH_TIME, REQUIRED_COLUMNS, SEQUENCE};
use crate::error::AnalyzeError;

/// Publish-time format the back office emits, e.g. `2024年03月05日21时30分00秒`.
pub const PUBLISH_FORMAT: &str = "%Y年%m月%d日%H时%M分%S秒";

#[derive(Debug, Clone)]
pub struct SanitizedTable {
    pub df: DataFrame,
    pub dropped_rows: usize,
    /// Min and max retained publish time; `None` when nothing survived.
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// Drops rows whose publish time fails to parse, sorts the survivors
/// ascending (stable, ties keep input order), and numbers them 1..N.
pub fn sanitize_rows(df: &DataFrame) -> Result<SanitizedTable, AnalyzeError> {
    let publish = df.column(PUBLISH_TIME)?.str()?;

    let mut keep: Vec<(usize, i64)> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        if let Some(raw) = publish.get(idx) {
            if let Some(micros) = parse_publish_micros(raw) {
                keep.push((idx, micros));
            }
        }
    }
    let dropped_rows = df.height() - keep.len();
    keep.sort_by_key(|(_, micros)| *micros);

    let order: Vec<usize> = keep.iter().map(|(idx, _)| *idx).collect();
    let micros: Vec<i64> = keep.iter().map(|(_, micros)| *micros).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(REQUIRED_COLUMNS.len() + 1);
    let sequence: Vec<u32> = (1..=order.len() as u32).collect();
    columns.push(Series::new(SEQUENCE.into(), sequence).into());

    for label in REQUIRED_COLUMNS {
        if label == PUBLISH_TIME {
            let stamped = Series::new(PUBLISH_TIME.into(), micros.clone())
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
            columns.push(stamped.into());
            continue;
        }
        let source = df.column(label)?.str()?;
        let values: Vec<Option<&str>> = order.iter().map(|&idx| source.get(idx)).collect();
        columns.push(Series::new(label.into(), values).into());
    }

    let date_range = micros
        .first()
        .copied()
        .zip(micros.last().copied())
        .and_then(|(min, max)| naive_from_micros(min).zip(naive_from_micros(max)));

    Ok(SanitizedTable {
        df: DataFrame::new(columns)?,
        dropped_rows,
        date_range,
    })
}

fn parse_publish_micros(raw: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(raw.trim(), PUBLISH_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp_micros())
}

pub fn naive_from_micros(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}
