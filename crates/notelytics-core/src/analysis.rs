use std::collections::HashMap;

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;

use crate::columns::{
    CONTENT_TYPE, COVER_CLICK_RATE, EFFECTIVE_ACTIVITY, ENGAGEMENT_RATE, EXPOSURE, FAVORITES,
    FAVORITE_RATE, FOLLOWER_GAIN, FOLLOW_CONVERSION_RATE, LIKES, LIKE_RATE, SEQUENCE, SHARES,
    VIEWS,
};

pub const CORE_TREND_TITLE: &str = "核心互动指标趋势";
pub const CONVERSION_TREND_TITLE: &str = "转化与活跃度趋势";
pub const BASELINE_TREND_TITLE: &str = "基础数据表现";

/// Fully processed table for one export file, plus the display artifacts a
/// rendering layer needs: the retained date range, the metric means block,
/// the content-type distribution, and chart-ready trend series.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub df: DataFrame,
    pub dropped_rows: usize,
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
    pub means: MetricMeans,
    pub content_type_counts: Vec<(String, u32)>,
    pub trend_groups: Vec<TrendGroup>,
}

/// Per-file means over the retained rows, ignoring null entries. A mean over
/// an all-null column is null.
#[derive(Debug, Clone, Serialize)]
pub struct MetricMeans {
    pub cover_click_rate: Option<f64>,
    pub like_rate: Option<f64>,
    pub favorite_rate: Option<f64>,
    pub engagement_rate: Option<f64>,
    pub follow_conversion_rate: Option<f64>,
}

/// One chart panel: a titled bundle of series over the 序号 axis.
#[derive(Debug, Clone)]
pub struct TrendGroup {
    pub title: &'static str,
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone)]
pub struct TrendSeries {
    pub label: &'static str,
    pub points: Vec<(u32, Option<f64>)>,
}

impl Analysis {
    pub fn new(
        df: DataFrame,
        dropped_rows: usize,
        date_range: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<Self, PolarsError> {
        let means = metric_means(&df)?;
        let content_type_counts = content_type_counts(&df)?;
        let trend_groups = trend_groups(&df)?;
        Ok(Self {
            df,
            dropped_rows,
            date_range,
            means,
            content_type_counts,
            trend_groups,
        })
    }

    /// Number of retained rows (notes) in the processed table.
    pub fn note_count(&self) -> usize {
        self.df.height()
    }
}

fn metric_means(df: &DataFrame) -> Result<MetricMeans, PolarsError> {
    Ok(MetricMeans {
        cover_click_rate: column_mean(df, COVER_CLICK_RATE)?,
        like_rate: column_mean(df, LIKE_RATE)?,
        favorite_rate: column_mean(df, FAVORITE_RATE)?,
        engagement_rate: column_mean(df, ENGAGEMENT_RATE)?,
        follow_conversion_rate: column_mean(df, FOLLOW_CONVERSION_RATE)?,
    })
}

fn column_mean(df: &DataFrame, label: &str) -> Result<Option<f64>, PolarsError> {
    Ok(df.column(label)?.f64()?.mean())
}

/// Value counts of 体裁, most frequent first. Ties keep first-seen order;
/// null cells are skipped.
fn content_type_counts(df: &DataFrame) -> Result<Vec<(String, u32)>, PolarsError> {
    let values = df.column(CONTENT_TYPE)?.str()?;
    let mut counts: Vec<(String, u32)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for idx in 0..values.len() {
        if let Some(value) = values.get(idx) {
            match positions.get(value) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    positions.insert(value.to_string(), counts.len());
                    counts.push((value.to_string(), 1));
                }
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

fn trend_groups(df: &DataFrame) -> Result<Vec<TrendGroup>, PolarsError> {
    let sequence = df.column(SEQUENCE)?.u32()?;
    let seq: Vec<u32> = (0..sequence.len())
        .map(|idx| sequence.get(idx).unwrap_or(0))
        .collect();

    let panels: [(&'static str, &[&'static str]); 3] = [
        (
            CORE_TREND_TITLE,
            &[LIKE_RATE, FAVORITE_RATE, ENGAGEMENT_RATE],
        ),
        (
            CONVERSION_TREND_TITLE,
            &[FOLLOW_CONVERSION_RATE, EFFECTIVE_ACTIVITY],
        ),
        (
            BASELINE_TREND_TITLE,
            &[EXPOSURE, VIEWS, LIKES, FAVORITES, FOLLOWER_GAIN, SHARES],
        ),
    ];

    let mut groups = Vec::with_capacity(panels.len());
    for (title, labels) in panels {
        let mut series = Vec::with_capacity(labels.len());
        for &label in labels {
            let values = df.column(label)?.f64()?;
            let points = seq
                .iter()
                .copied()
                .zip((0..values.len()).map(|idx| values.get(idx)))
                .collect();
            series.push(TrendSeries { label, points });
        }
        groups.push(TrendGroup { title, series });
    }
    Ok(groups)
}
