use polars::prelude::*;

use notelytics_core::calculator::apply_engagement_metrics;
use notelytics_core::columns::{METRIC_COLUMNS, NUMERIC_COLUMNS};

fn approx(actual: Option<f64>, expected: f64) {
    let value = actual.expect("metric should be present");
    assert!(
        (value - expected).abs() < 1e-12,
        "expected {expected}, got {value}"
    );
}

fn counters_table() -> DataFrame {
    df!(
        "笔记标题" => &["正常", "零观看"],
        "曝光" => &["12500", "9800"],
        "点赞" => &["400", "50"],
        "观看量" => &["2000", "0"],
        "收藏" => &["100", "0"],
        "评论" => &["40", "10"],
        "涨粉" => &["20", "5"],
        "分享" => &["16", "2"],
        "封面点击率" => &["0.27", "0.19"],
        "体裁" => &["图文", "视频"],
    )
    .unwrap()
}

#[test]
fn derives_all_seven_ratios() {
    let df = apply_engagement_metrics(&counters_table()).expect("calculator failed");

    approx(df.column("点赞率").unwrap().f64().unwrap().get(0), 0.2);
    approx(df.column("收藏率").unwrap().f64().unwrap().get(0), 0.05);
    approx(df.column("赞藏比").unwrap().f64().unwrap().get(0), 4.0);
    approx(df.column("评论率").unwrap().f64().unwrap().get(0), 0.02);
    approx(df.column("互动率").unwrap().f64().unwrap().get(0), 0.27);
    approx(df.column("有效活跃度").unwrap().f64().unwrap().get(0), 0.08);
    approx(df.column("转粉率").unwrap().f64().unwrap().get(0), 0.01);
}

#[test]
fn zero_denominators_yield_null_not_infinity() {
    let df = apply_engagement_metrics(&counters_table()).expect("calculator failed");

    // 观看量 is 0 on row 1, so every view-based rate is null
    assert_eq!(df.column("点赞率").unwrap().f64().unwrap().get(1), None);
    assert_eq!(df.column("收藏率").unwrap().f64().unwrap().get(1), None);
    assert_eq!(df.column("评论率").unwrap().f64().unwrap().get(1), None);
    assert_eq!(df.column("互动率").unwrap().f64().unwrap().get(1), None);
    assert_eq!(df.column("转粉率").unwrap().f64().unwrap().get(1), None);

    // 收藏 is 0, so 赞藏比 is null; 点赞 + 收藏 is 50, so 有效活跃度 still computes
    assert_eq!(df.column("赞藏比").unwrap().f64().unwrap().get(1), None);
    approx(df.column("有效活跃度").unwrap().f64().unwrap().get(1), 0.2);
}

#[test]
fn junk_numeric_cells_coerce_to_zero() {
    let df = df!(
        "曝光" => &[Some("约一万"), None, Some("12500")],
        "点赞" => &[Some("400"), Some(""), Some("4,00")],
        "观看量" => &[Some("2000"), Some("2000"), Some("2000")],
        "收藏" => &[Some("100"), Some("100"), Some("100")],
        "评论" => &[Some("40"), Some("40"), Some("40")],
        "涨粉" => &[Some("NaN"), Some("20"), Some("20")],
        "分享" => &[Some("16"), Some("16"), Some("16")],
        "封面点击率" => &[Some("0.27"), Some("0.27"), Some("0.27")],
    )
    .unwrap();

    let df = apply_engagement_metrics(&df).expect("calculator failed");

    let exposure = df.column("曝光").unwrap().f64().unwrap();
    assert_eq!(exposure.get(0), Some(0.0));
    assert_eq!(exposure.get(1), Some(0.0));
    assert_eq!(exposure.get(2), Some(12500.0));

    // coerced zeros flow into the ratios as real zeros, not nulls
    approx(df.column("点赞率").unwrap().f64().unwrap().get(1), 0.0);
    approx(df.column("点赞率").unwrap().f64().unwrap().get(2), 0.0);
    approx(df.column("转粉率").unwrap().f64().unwrap().get(0), 0.0);
}

#[test]
fn every_counter_and_metric_column_is_float() {
    let df = apply_engagement_metrics(&counters_table()).expect("calculator failed");

    for label in NUMERIC_COLUMNS {
        assert_eq!(
            df.column(label).unwrap().dtype(),
            &DataType::Float64,
            "{label} should be coerced"
        );
    }
    for label in METRIC_COLUMNS {
        assert_eq!(
            df.column(label).unwrap().dtype(),
            &DataType::Float64,
            "{label} should be appended"
        );
    }
}

#[test]
fn untouched_columns_survive_with_their_values() {
    let df = apply_engagement_metrics(&counters_table()).expect("calculator failed");

    let titles = df.column("笔记标题").unwrap();
    assert_eq!(titles.str().unwrap().get(0), Some("正常"));
    let content_type = df.column("体裁").unwrap();
    assert_eq!(content_type.str().unwrap().get(1), Some("视频"));

    // counters are now floats
    assert_eq!(
        df.column("观看量").unwrap().dtype(),
        &DataType::Float64
    );
}
