use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use polars::prelude::*;

use notelytics_core::analysis::Analysis;
use notelytics_core::columns::DISPLAY_COLUMNS;
use notelytics_core::pipeline::analyze_export;
use notelytics_core::report::{
    sanitize_sheet_name, AggregateReport, REPORT_FILENAME, REPORT_MIME, SHEET_NAME_LIMIT,
};
use notelytics_parser::RawExport;

fn sample_analysis(titles: &[&str], publish: &[&str], views: &[&str]) -> Analysis {
    let ones: Vec<&str> = vec!["1"; titles.len()];
    let df = df!(
        "笔记标题" => titles,
        "曝光" => ones.as_slice(),
        "点赞" => ones.as_slice(),
        "观看量" => views,
        "收藏" => ones.as_slice(),
        "评论" => ones.as_slice(),
        "涨粉" => ones.as_slice(),
        "分享" => ones.as_slice(),
        "封面点击率" => ones.as_slice(),
        "首次发布时间" => publish,
        "体裁" => ones.as_slice(),
    )
    .unwrap();
    analyze_export(&RawExport { df }).expect("analysis failed")
}

fn header_row(range: &Range<Data>) -> Vec<String> {
    (0..DISPLAY_COLUMNS.len() as u32)
        .map(|col| match range.get_value((0, col)) {
            Some(Data::String(s)) => s.clone(),
            other => panic!("expected string header, got {other:?}"),
        })
        .collect()
}

#[test]
fn report_constants_match_the_download_contract() {
    assert_eq!(REPORT_FILENAME, "小红书分析汇总报告.xlsx");
    assert_eq!(
        REPORT_MIME,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn sheet_names_keep_alphanumerics_and_truncate() {
    assert_eq!(sanitize_sheet_name("周报-03.xlsx"), "周报03xlsx");
    assert_eq!(sanitize_sheet_name("data (final).xls"), "datafinalxls");

    let long = "笔记导出".repeat(20);
    let sanitized = sanitize_sheet_name(&long);
    assert_eq!(sanitized.chars().count(), SHEET_NAME_LIMIT);

    assert_eq!(sanitize_sheet_name("——！！。。"), "sheet");
    assert_eq!(sanitize_sheet_name(""), "sheet");
}

#[test]
fn colliding_sheet_names_get_a_suffix() {
    let mut report = AggregateReport::new();
    let first = report.insert(
        "周报.xlsx",
        sample_analysis(&["一"], &["2024年03月01日08时00分00秒"], &["10"]),
    );
    let second = report.insert(
        "周报!.xlsx",
        sample_analysis(&["二"], &["2024年03月02日08时00分00秒"], &["10"]),
    );

    assert_eq!(first, "周报xlsx");
    assert_eq!(second, "周报xlsx_2");
    assert_eq!(report.len(), 2);

    let names: Vec<&str> = report
        .entries()
        .iter()
        .map(|entry| entry.sheet_name.as_str())
        .collect();
    assert_eq!(names, vec!["周报xlsx", "周报xlsx_2"]);
}

#[test]
fn case_variant_names_collide_in_the_sheet_namespace() {
    let mut report = AggregateReport::new();
    let first = report.insert(
        "Data.xlsx",
        sample_analysis(&["一"], &["2024年03月01日08时00分00秒"], &["10"]),
    );
    let second = report.insert(
        "DATA.xlsx",
        sample_analysis(&["二"], &["2024年03月02日08时00分00秒"], &["10"]),
    );

    assert_eq!(first, "Dataxlsx");
    assert_eq!(second, "DATAxlsx_2");

    // xlsx treats sheet names case-insensitively, so the save must not fail
    let bytes = report.to_workbook_bytes().expect("workbook export failed");
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).expect("workbook unreadable");
    assert_eq!(sheets.sheet_names(), vec!["Dataxlsx", "DATAxlsx_2"]);
}

#[test]
fn suffixed_names_stay_within_the_limit() {
    let long_a = format!("{}A.xlsx", "导出".repeat(40));
    let long_b = format!("{}B.xlsx", "导出".repeat(40));

    let mut report = AggregateReport::new();
    let first = report.insert(
        &long_a,
        sample_analysis(&["一"], &["2024年03月01日08时00分00秒"], &["10"]),
    );
    let second = report.insert(
        &long_b,
        sample_analysis(&["二"], &["2024年03月02日08时00分00秒"], &["10"]),
    );

    assert_eq!(first.chars().count(), SHEET_NAME_LIMIT);
    assert_eq!(second.chars().count(), SHEET_NAME_LIMIT);
    assert!(second.ends_with("_2"));
    assert_ne!(first, second);
}

#[test]
fn workbook_round_trips_through_calamine() {
    let mut report = AggregateReport::new();
    report.insert(
        "三月笔记.xlsx",
        sample_analysis(
            &["早", "晚"],
            &[
                "2024年03月01日08时00分00秒",
                "2024年03月05日21时30分00秒",
            ],
            &["100", "0"],
        ),
    );
    report.insert(
        "四月笔记.xlsx",
        sample_analysis(&["唯一"], &["2024年04月02日10时00分00秒"], &["50"]),
    );

    let bytes = report.to_workbook_bytes().expect("workbook export failed");
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).expect("workbook unreadable");

    assert_eq!(sheets.sheet_names(), vec!["三月笔记xlsx", "四月笔记xlsx"]);

    let range = sheets
        .worksheet_range_at(0)
        .expect("first sheet missing")
        .expect("first sheet unreadable");

    // header row in the documented order
    assert_eq!(header_row(&range), DISPLAY_COLUMNS);

    // one row per retained note, 1-based sequence in the first column
    assert_eq!(range.height(), 3);
    assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(range.get_value((2, 0)), Some(&Data::Float(2.0)));
    assert_eq!(
        range.get_value((1, 1)),
        Some(&Data::String("早".to_string()))
    );

    // publish time survives as a real datetime cell
    match range.get_value((1, 2)) {
        Some(Data::DateTime(stamp)) => {
            let naive = stamp.as_datetime().expect("datetime cell unreadable");
            assert_eq!(
                naive.format("%Y-%m-%d %H:%M:%S").to_string(),
                "2024-03-01 08:00:00"
            );
        }
        other => panic!("expected datetime cell, got {other:?}"),
    }

    // the zero-view row leaves its 点赞率 cell blank
    let like_rate_col = DISPLAY_COLUMNS
        .iter()
        .position(|label| *label == "点赞率")
        .expect("点赞率 missing from display order") as u32;
    match range.get_value((2, like_rate_col)) {
        None | Some(Data::Empty) => {}
        other => panic!("expected blank cell, got {other:?}"),
    }

    // every sheet carries the same header and its own retained rows
    let second = sheets
        .worksheet_range_at(1)
        .expect("second sheet missing")
        .expect("second sheet unreadable");
    assert_eq!(header_row(&second), DISPLAY_COLUMNS);
    assert_eq!(second.height(), 2);
    assert_eq!(second.get_value((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(
        second.get_value((1, 1)),
        Some(&Data::String("唯一".to_string()))
    );
}

#[test]
fn all_dropped_file_exports_a_header_only_sheet() {
    let mut report = AggregateReport::new();
    report.insert(
        "空表.xlsx",
        sample_analysis(&["坏行"], &["不是时间"], &["10"]),
    );

    let bytes = report.to_workbook_bytes().expect("workbook export failed");
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).expect("workbook unreadable");
    let range = sheets
        .worksheet_range_at(0)
        .expect("sheet missing")
        .expect("sheet unreadable");

    assert_eq!(header_row(&range), DISPLAY_COLUMNS);
    assert_eq!(range.height(), 1);
}
