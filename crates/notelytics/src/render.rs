use anyhow::Result;
use chrono::NaiveDateTime;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use polars::prelude::*;

use notelytics_core::analysis::Analysis;
use notelytics_core::columns::{
    COVER_CLICK_RATE, DISPLAY_COLUMNS, EFFECTIVE_ACTIVITY, ENGAGEMENT_RATE, FAVORITE_RATE,
    FOLLOW_CONVERSION_RATE, LIKE_FAVORITE_RATIO, LIKE_RATE,
};
use notelytics_core::pipeline::{BatchOutcome, FileStatus};
use notelytics_core::sanitizer::naive_from_micros;

/// Metric columns rendered as percentages in the terminal tables.
const PERCENT_COLUMNS: [&str; 5] = [
    COVER_CLICK_RATE,
    LIKE_RATE,
    FAVORITE_RATE,
    ENGAGEMENT_RATE,
    FOLLOW_CONVERSION_RATE,
];

/// Metric columns rendered as plain decimals.
const DECIMAL_COLUMNS: [&str; 2] = [LIKE_FAVORITE_RATIO, EFFECTIVE_ACTIVITY];

pub fn print_analysis(source_file: &str, analysis: &Analysis, max_rows: usize) -> Result<()> {
    println!("== {source_file} ==");

    match analysis.date_range {
        Some((min, max)) => println!(
            "数据时间范围: {} ~ {} ({} 篇笔记, 丢弃 {} 行)",
            format_stamp(&min),
            format_stamp(&max),
            analysis.note_count(),
            analysis.dropped_rows,
        ),
        None => println!(
            "数据时间范围: 无 ({} 篇笔记, 丢弃 {} 行)",
            analysis.note_count(),
            analysis.dropped_rows,
        ),
    }

    if !analysis.content_type_counts.is_empty() {
        let parts: Vec<String> = analysis
            .content_type_counts
            .iter()
            .map(|(kind, count)| format!("{kind} {count}"))
            .collect();
        println!("内容形式分布: {}", parts.join(", "));
    }

    print_means(analysis);
    print_table(&analysis.df, max_rows)?;
    Ok(())
}

fn print_means(analysis: &Analysis) {
    let means = &analysis.means;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["指标", "平均值"]);
    for (label, value) in [
        ("平均点赞率", means.like_rate),
        ("平均收藏率", means.favorite_rate),
        ("平均互动率", means.engagement_rate),
        ("平均转粉率", means.follow_conversion_rate),
        ("平均封面点击率", means.cover_click_rate),
    ] {
        table.add_row(vec![label.to_string(), format_percent(value)]);
    }
    println!("{table}");
}

fn print_table(df: &DataFrame, max_rows: usize) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(DISPLAY_COLUMNS.to_vec());

    let shown = df.height().min(max_rows);
    for row in 0..shown {
        let mut cells = Vec::with_capacity(DISPLAY_COLUMNS.len());
        for label in DISPLAY_COLUMNS {
            cells.push(format_cell(df, label, row)?);
        }
        table.add_row(cells);
    }
    println!("{table}");

    if df.height() > shown {
        println!("... {} 行未显示", df.height() - shown);
    }
    Ok(())
}

fn format_cell(df: &DataFrame, label: &str, row: usize) -> Result<String, PolarsError> {
    let column = df.column(label)?;
    let text = match column.dtype() {
        DataType::UInt32 => column
            .u32()?
            .get(row)
            .map(|value| value.to_string()),
        DataType::Float64 => column.f64()?.get(row).map(|value| {
            if PERCENT_COLUMNS.contains(&label) {
                format_percent(Some(value))
            } else if DECIMAL_COLUMNS.contains(&label) {
                format!("{value:.2}")
            } else {
                format!("{value:.0}")
            }
        }),
        DataType::Datetime(_, _) => column
            .datetime()?
            .get(row)
            .and_then(naive_from_micros)
            .map(|stamp| format_stamp(&stamp)),
        _ => column.str()?.get(row).map(|value| value.to_string()),
    };
    Ok(text.unwrap_or_else(|| "-".to_string()))
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.2}%", value * 100.0),
        None => "-".to_string(),
    }
}

fn format_stamp(stamp: &NaiveDateTime) -> String {
    stamp.format("%Y-%m-%d %H:%M").to_string()
}

pub fn print_batch_summary(outcome: &BatchOutcome) {
    let summary = outcome.summary();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["文件", "状态", "表名", "笔记数", "丢弃行", "原因"]);
    for report in &summary.files {
        let status = match report.status {
            FileStatus::Analyzed => "已分析",
            FileStatus::Skipped => "已跳过",
        };
        table.add_row(vec![
            report.filename.clone(),
            status.to_string(),
            report.sheet_name.clone().unwrap_or_default(),
            report
                .note_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
            report
                .dropped_rows
                .map(|count| count.to_string())
                .unwrap_or_default(),
            report.error.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    println!(
        "{} 个文件: {} 已分析, {} 已跳过",
        summary.total_files, summary.analyzed, summary.skipped
    );
}
