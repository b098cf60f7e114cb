use polars::prelude::*;

use crate::columns::{
    COMMENTS, COMMENT_RATE, COVER_CLICK_RATE, EFFECTIVE_ACTIVITY, ENGAGEMENT_RATE, EXPOSURE,
    FAVORITES, FAVORITE_RATE, FOLLOWER_GAIN, FOLLOW_CONVERSION_RATE, LIKES, LIKE_FAVORITE_RATIO,
    LIKE_RATE, SHARES, VIEWS,
};

/// Coerces the eight raw counter columns to floats (unparseable or empty cells
/// become 0, never dropped) and appends the seven derived engagement ratios.
/// A ratio with a zero denominator is null rather than an error or infinity.
pub fn apply_engagement_metrics(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    let len = df.height();

    let exposure = coerce_numeric(df.column(EXPOSURE)?)?;
    let cover_click = coerce_numeric(df.column(COVER_CLICK_RATE)?)?;
    let likes = coerce_numeric(df.column(LIKES)?)?;
    let views = coerce_numeric(df.column(VIEWS)?)?;
    let favorites = coerce_numeric(df.column(FAVORITES)?)?;
    let comments = coerce_numeric(df.column(COMMENTS)?)?;
    let follower_gain = coerce_numeric(df.column(FOLLOWER_GAIN)?)?;
    let shares = coerce_numeric(df.column(SHARES)?)?;

    let mut like_rate = Vec::with_capacity(len);
    let mut favorite_rate = Vec::with_capacity(len);
    let mut like_favorite_ratio = Vec::with_capacity(len);
    let mut comment_rate = Vec::with_capacity(len);
    let mut engagement_rate = Vec::with_capacity(len);
    let mut effective_activity = Vec::with_capacity(len);
    let mut follow_conversion = Vec::with_capacity(len);

    for idx in 0..len {
        like_rate.push(ratio(likes[idx], views[idx]));
        favorite_rate.push(ratio(favorites[idx], views[idx]));
        like_favorite_ratio.push(ratio(likes[idx], favorites[idx]));
        comment_rate.push(ratio(comments[idx], views[idx]));
        engagement_rate.push(ratio(likes[idx] + comments[idx] + favorites[idx], views[idx]));
        effective_activity.push(ratio(comments[idx], likes[idx] + favorites[idx]));
        follow_conversion.push(ratio(follower_gain[idx], views[idx]));
    }

    let mut columns: Vec<Column> = Vec::with_capacity(df.width() + 7);
    for column in df.get_columns() {
        let coerced = match column.name().as_str() {
            EXPOSURE => Some(&exposure),
            COVER_CLICK_RATE => Some(&cover_click),
            LIKES => Some(&likes),
            VIEWS => Some(&views),
            FAVORITES => Some(&favorites),
            COMMENTS => Some(&comments),
            FOLLOWER_GAIN => Some(&follower_gain),
            SHARES => Some(&shares),
            _ => None,
        };
        match coerced {
            Some(values) => {
                columns.push(Series::new(column.name().clone(), values.clone()).into())
            }
            None => columns.push(column.clone()),
        }
    }
    columns.push(Series::new(LIKE_RATE.into(), like_rate).into());
    columns.push(Series::new(FAVORITE_RATE.into(), favorite_rate).into());
    columns.push(Series::new(LIKE_FAVORITE_RATIO.into(), like_favorite_ratio).into());
    columns.push(Series::new(COMMENT_RATE.into(), comment_rate).into());
    columns.push(Series::new(ENGAGEMENT_RATE.into(), engagement_rate).into());
    columns.push(Series::new(EFFECTIVE_ACTIVITY.into(), effective_activity).into());
    columns.push(Series::new(FOLLOW_CONVERSION_RATE.into(), follow_conversion).into());

    DataFrame::new(columns)
}

fn coerce_numeric(column: &Column) -> Result<Vec<f64>, PolarsError> {
    let values = column.str()?;
    Ok((0..values.len())
        .map(|idx| values.get(idx).map_or(0.0, coerce_cell))
        .collect())
}

fn coerce_cell(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}
