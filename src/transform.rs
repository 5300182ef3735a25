//! # Series Transformation
//!
//! Turns a validated prediction list into [`ChartData`]: every value parsed and
//! sign-adjusted, and a sparse day/night overlay at the quartile indices.
//!
//! ## Tick Selection
//! For `n` samples the candidate indices are `floor(k * (n - 1) / 4)` for
//! `k = 0..=4`. Short series collapse duplicates, so `n = 3` yields `[0, 1, 2]`
//! and `n = 1` yields `[0]`.
//!
//! ## Day/Night Classification
//! The local hour of each selected timestamp decides the glyph: `[6, 18)` is
//! day, everything else night. This is a fixed-hour approximation, not a solar
//! calculation.

use crate::config::SignConvention;
use crate::tide_data::TideError;
use crate::{ChartData, RawPrediction, Series, TickMarker};
use chrono::{NaiveDateTime, Timelike};
use std::collections::BTreeSet;

/// Timestamp layout used by CO-OPS for `t`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// First hour counted as daytime
pub const DAY_START_HOUR: u32 = 6;
/// First hour counted as night again
pub const DAY_END_HOUR: u32 = 18;

/// Number of evenly spaced tick candidates
const TICK_CANDIDATES: usize = 5;

/// Indices of the ticks to label, ascending and de-duplicated.
///
/// Returns an empty list for `n == 0`.
pub fn select_tick_indices(n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let last = n - 1;
    let segments = TICK_CANDIDATES - 1;
    (0..TICK_CANDIDATES)
        .map(|k| k * last / segments)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Classify a local hour as a day or night marker.
pub fn classify_hour(hour: u32) -> TickMarker {
    if (DAY_START_HOUR..DAY_END_HOUR).contains(&hour) {
        TickMarker::Day
    } else {
        TickMarker::Night
    }
}

/// Local hour of a CO-OPS timestamp.
fn hour_of(index: usize, timestamp: &str) -> Result<u32, TideError> {
    NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT)
        .map(|dt| dt.hour())
        .map_err(|_| TideError::InvalidTimestamp {
            index,
            value: timestamp.to_string(),
        })
}

/// Parse every value and apply the sign convention.
pub fn to_series(predictions: &[RawPrediction], sign: SignConvention) -> Result<Series, TideError> {
    let values = predictions
        .iter()
        .enumerate()
        .map(|(index, p)| {
            p.v.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| sign.apply(v))
                .ok_or_else(|| TideError::InvalidValue {
                    index,
                    value: p.v.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Series { values })
}

/// Build the per-index marker overlay.
pub fn to_ticks(predictions: &[RawPrediction]) -> Result<Vec<TickMarker>, TideError> {
    let mut ticks = vec![TickMarker::Blank; predictions.len()];
    for index in select_tick_indices(predictions.len()) {
        let hour = hour_of(index, &predictions[index].t)?;
        ticks[index] = classify_hour(hour);
    }
    Ok(ticks)
}

/// Full transformation from raw predictions to chart data.
///
/// An empty input is rejected with [`TideError::NoPredictions`]; the fetcher
/// should never hand one over, but an empty chart is never produced either.
///
/// # Example
/// ```
/// use tide_widget_lib::{config::SignConvention, transform::transform, RawPrediction, TickMarker};
///
/// let raw = vec![
///     RawPrediction { t: "2025-07-24 03:00".into(), v: "1.5".into() },
///     RawPrediction { t: "2025-07-24 12:00".into(), v: "8.25".into() },
/// ];
/// let chart = transform(&raw, SignConvention::Inverted).unwrap();
/// assert_eq!(chart.series.values, vec![-1.5, -8.25]);
/// assert_eq!(chart.ticks, vec![TickMarker::Night, TickMarker::Day]);
/// ```
pub fn transform(predictions: &[RawPrediction], sign: SignConvention) -> Result<ChartData, TideError> {
    if predictions.is_empty() {
        return Err(TideError::NoPredictions);
    }
    let series = to_series(predictions, sign)?;
    let ticks = to_ticks(predictions)?;
    Ok(ChartData { series, ticks })
}
