use std::collections::HashMap;

use once_cell::sync::Lazy;
use polars::prelude::*;

use crate::error::AnalyzeError;

// Canonical labels as the back office spells them.
pub const TITLE: &str = "笔记标题";
pub const EXPOSURE: &str = "曝光";
pub const LIKES: &str = "点赞";
pub const VIEWS: &str = "观看量";
pub const FAVORITES: &str = "收藏";
pub const COMMENTS: &str = "评论";
pub const FOLLOWER_GAIN: &str = "涨粉";
pub const SHARES: &str = "分享";
pub const COVER_CLICK_RATE: &str = "封面点击率";
pub const PUBLISH_TIME: &str = "首次发布时间";
pub const CONTENT_TYPE: &str = "体裁";

pub const SEQUENCE: &str = "序号";

// Derived metric labels.
pub const LIKE_RATE: &str = "点赞率";
pub const FAVORITE_RATE: &str = "收藏率";
pub const LIKE_FAVORITE_RATIO: &str = "赞藏比";
pub const COMMENT_RATE: &str = "评论率";
pub const ENGAGEMENT_RATE: &str = "互动率";
pub const EFFECTIVE_ACTIVITY: &str = "有效活跃度";
pub const FOLLOW_CONVERSION_RATE: &str = "转粉率";

pub const REQUIRED_COLUMNS: [&str; 11] = [
    TITLE,
    EXPOSURE,
    LIKES,
    VIEWS,
    FAVORITES,
    COMMENTS,
    FOLLOWER_GAIN,
    SHARES,
    COVER_CLICK_RATE,
    PUBLISH_TIME,
    CONTENT_TYPE,
];

pub const NUMERIC_COLUMNS: [&str; 8] = [
    EXPOSURE,
    COVER_CLICK_RATE,
    LIKES,
    VIEWS,
    FAVORITES,
    COMMENTS,
    FOLLOWER_GAIN,
    SHARES,
];

pub const METRIC_COLUMNS: [&str; 7] = [
    LIKE_RATE,
    FAVORITE_RATE,
    LIKE_FAVORITE_RATIO,
    COMMENT_RATE,
    ENGAGEMENT_RATE,
    EFFECTIVE_ACTIVITY,
    FOLLOW_CONVERSION_RATE,
];

// Report column order; 评论率 is computed but not displayed.
pub const DISPLAY_COLUMNS: [&str; 18] = [
    SEQUENCE,
    TITLE,
    PUBLISH_TIME,
    CONTENT_TYPE,
    EXPOSURE,
    VIEWS,
    COVER_CLICK_RATE,
    LIKES,
    COMMENTS,
    FAVORITES,
    FOLLOWER_GAIN,
    SHARES,
    LIKE_RATE,
    FAVORITE_RATE,
    ENGAGEMENT_RATE,
    FOLLOW_CONVERSION_RATE,
    LIKE_FAVORITE_RATIO,
    EFFECTIVE_ACTIVITY,
];

// Alternate spellings seen across export versions.
static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("曝光量", EXPOSURE),
        ("阅读量", VIEWS),
        ("播放量", VIEWS),
        ("观看数", VIEWS),
        ("点赞数", LIKES),
        ("获赞", LIKES),
        ("获赞数", LIKES),
        ("点赞次数", LIKES),
        ("收藏数", FAVORITES),
        ("评论数", COMMENTS),
        ("涨粉数", FOLLOWER_GAIN),
        ("净涨粉", FOLLOWER_GAIN),
        ("发布形式", CONTENT_TYPE),
    ])
});

pub fn canonical_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    SYNONYMS.get(trimmed).copied().unwrap_or(trimmed)
}

/// Renames headers to their canonical labels and keeps exactly the required
/// eleven; a missing column rejects the whole file.
pub fn normalize_columns(df: &DataFrame) -> Result<DataFrame, AnalyzeError> {
    let mut by_canonical: HashMap<String, Column> = HashMap::with_capacity(df.width());
    for column in df.get_columns() {
        let canonical = canonical_label(column.name().as_str());
        if !REQUIRED_COLUMNS.contains(&canonical) {
            continue;
        }
        let mut renamed = column.clone();
        renamed.rename(canonical.into());
        if by_canonical.insert(canonical.to_string(), renamed).is_some() {
            return Err(AnalyzeError::DuplicateColumn {
                label: canonical.to_string(),
            });
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|label| !by_canonical.contains_key(**label))
        .map(|label| label.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalyzeError::MissingColumns { missing });
    }

    let mut columns: Vec<Column> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for label in REQUIRED_COLUMNS {
        if let Some(column) = by_canonical.remove(label) {
            columns.push(column);
        }
    }
    Ok(DataFrame::new(columns)?)
}
