use crate::error::ComputationFailure;
use crate::models::DataPoint;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Lag used for year-over-year growth, in calendar days.
pub const YOY_LAG_DAYS: usize = 365;

/// Carry the last known value forward over missing values.
/// Leading missing values stay missing.
pub fn forward_fill(series: &mut [DataPoint]) {
    let mut last: Option<f64> = None;
    for dp in series.iter_mut() {
        if dp.value.is_nan() {
            if let Some(v) = last {
                dp.value = v;
            }
        } else {
            last = Some(dp.value);
        }
    }
}

/// Combine two series on the union of their timestamps.
/// A timestamp missing from either side yields a missing value; the caller
/// decides whether to forward-fill afterwards.
pub fn combine<F>(series_a: &[DataPoint], series_b: &[DataPoint], op: F) -> Vec<DataPoint>
where
    F: Fn(f64, f64) -> f64,
{
    let map_a: BTreeMap<DateTime<Utc>, f64> =
        series_a.iter().map(|dp| (dp.timestamp, dp.value)).collect();
    let map_b: BTreeMap<DateTime<Utc>, f64> =
        series_b.iter().map(|dp| (dp.timestamp, dp.value)).collect();

    let all_timestamps: BTreeSet<DateTime<Utc>> =
        map_a.keys().chain(map_b.keys()).copied().collect();

    all_timestamps
        .into_iter()
        .map(|ts| {
            let value = match (map_a.get(&ts), map_b.get(&ts)) {
                (Some(a), Some(b)) => op(*a, *b),
                _ => f64::NAN,
            };
            DataPoint { timestamp: ts, value }
        })
        .collect()
}

fn ensure_ordered(series: &[DataPoint]) -> Result<(), ComputationFailure> {
    match series.windows(2).position(|w| w[0].timestamp >= w[1].timestamp) {
        Some(index) => Err(ComputationFailure::Unordered { index: index + 1 }),
        None => Ok(()),
    }
}

/// Put the series on a continuous daily grid from its first to its last
/// timestamp. Each grid day takes the latest observation at or before it.
pub fn resample_daily(series: &[DataPoint]) -> Result<Vec<DataPoint>, ComputationFailure> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(f), Some(l)) => (f.timestamp, l.timestamp),
        _ => return Err(ComputationFailure::EmptyInput { operation: "daily resample" }),
    };
    ensure_ordered(series)?;

    let days = (last - first).num_days().max(0) as usize + 1;
    let mut grid = Vec::with_capacity(days);
    let mut source = series.iter().peekable();
    let mut current = f64::NAN;

    for offset in 0..days {
        let ts = first + Duration::days(offset as i64);
        while let Some(dp) = source.peek() {
            if dp.timestamp <= ts {
                current = dp.value;
                source.next();
            } else {
                break;
            }
        }
        grid.push(DataPoint { timestamp: ts, value: current });
    }

    Ok(grid)
}

/// Trailing 365-day percentage change on the forward-filled daily grid.
/// Only defined points are returned; the first year of the grid never is.
pub fn yoy_growth(series: &[DataPoint]) -> Result<Vec<DataPoint>, ComputationFailure> {
    let grid = resample_daily(series)?;

    let growth: Vec<DataPoint> = grid
        .iter()
        .enumerate()
        .skip(YOY_LAG_DAYS)
        .filter_map(|(i, dp)| {
            let prior = grid[i - YOY_LAG_DAYS].value;
            let change = (dp.value / prior - 1.0) * 100.0;
            change.is_finite().then(|| DataPoint { timestamp: dp.timestamp, value: change })
        })
        .collect();

    if growth.is_empty() {
        return Err(ComputationFailure::NoDefinedValues { operation: "yoy growth" });
    }
    Ok(growth)
}

/// Keep at most the last `n` points.
pub fn tail(mut series: Vec<DataPoint>, n: usize) -> Vec<DataPoint> {
    if series.len() > n {
        series.drain(..series.len() - n);
    }
    series
}

/// Percent change from the first to the last value.
/// `None` for an empty series, a missing endpoint or a zero first value.
pub fn percent_change(series: &[DataPoint]) -> Option<f64> {
    let first = series.first()?.value;
    let last = series.last()?.value;
    if !first.is_finite() || !last.is_finite() || first == 0.0 {
        return None;
    }
    let change = (last - first) / first * 100.0;
    change.is_finite().then_some(change)
}
