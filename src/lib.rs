//! # Tide Widget Core Library
//!
//! This library provides the data structures and pipeline stages behind the tide
//! widget: a small client that asks NOAA CO-OPS for five days of water-level
//! predictions at one station and draws them as a smoothed area chart with
//! day/night glyphs under a handful of ticks.
//!
//! ## Data Flow
//! 1. **Query**: derive `begin_date` from the local wall clock ([`query`])
//! 2. **Fetch**: one GET, optionally through a CORS relay ([`tide_data`])
//! 3. **Transform**: parse values, apply the sign convention, pick tick indices
//!    and classify them by local hour ([`transform`])
//! 4. **Present**: `Loading → Ready | Error`, manual refresh only ([`widget`])
//! 5. **Render**: ASCII for terminals, any `embedded-graphics` target otherwise
//!    ([`renderer`], [`canvas`])
//!
//! ## Core Types
//! - [`RawPrediction`]: one upstream `{t, v}` record, untrusted
//! - [`Series`]: chart-ready water levels in arrival order
//! - [`TickMarker`]: per-index glyph overlay (blank, day or night)
//! - [`ChartData`]: a series plus its markers, the payload of a ready widget

use embedded_graphics::pixelcolor::Rgb888;
use serde::{Deserialize, Serialize};

pub mod canvas;
pub mod config;
pub mod logging;
pub mod query;
pub mod renderer;
pub mod tide_data;
pub mod transform;
pub mod widget;

/// A single prediction exactly as NOAA returns it.
///
/// Both fields are strings on the wire. The value is validated by the
/// transformer before it ever reaches a chart.
///
/// # Example
/// ```
/// use tide_widget_lib::RawPrediction;
///
/// let raw: RawPrediction = serde_json::from_str(r#"{"t":"2025-07-24 06:00","v":"3.412"}"#).unwrap();
/// assert_eq!(raw.t, "2025-07-24 06:00");
/// assert_eq!(raw.v, "3.412");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrediction {
    /// Local station time, `YYYY-MM-DD HH:MM`
    pub t: String,
    /// Water level in feet above MLLW, string encoded
    pub v: String,
}

/// Water-level samples in chronological order, one per prediction.
///
/// Values already carry the configured sign convention, so an inverted chart
/// stores negated heights here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Lowest and highest sample, or `None` for an empty series.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        Some(
            self.values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                    (min.min(v), max.max(v))
                }),
        )
    }
}

/// Warm marker color used for daytime ticks.
pub const DAY_COLOR: Rgb888 = Rgb888::new(0xF5, 0xA6, 0x23);
/// Cool marker color used for night ticks.
pub const NIGHT_COLOR: Rgb888 = Rgb888::new(0x5B, 0x7F, 0xD6);

/// Glyph overlay for one sample index.
///
/// Only the handful of quartile indices get `Day` or `Night`; everything else
/// is `Blank` and renders nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickMarker {
    Blank,
    Day,
    Night,
}

impl TickMarker {
    /// Text label for the tick, empty for blanks.
    pub fn label(self) -> &'static str {
        match self {
            TickMarker::Blank => "",
            TickMarker::Day => "☀",
            TickMarker::Night => "☾",
        }
    }

    /// Marker color; `None` means transparent.
    pub fn color(self) -> Option<Rgb888> {
        match self {
            TickMarker::Blank => None,
            TickMarker::Day => Some(DAY_COLOR),
            TickMarker::Night => Some(NIGHT_COLOR),
        }
    }

    pub fn is_visible(self) -> bool {
        self != TickMarker::Blank
    }
}

/// Everything a ready widget needs to draw: the series and one marker per sample.
///
/// # Example
/// ```
/// use tide_widget_lib::{ChartData, Series, TickMarker};
///
/// let chart = ChartData {
///     series: Series { values: vec![1.0, 2.0] },
///     ticks: vec![TickMarker::Night, TickMarker::Day],
/// };
/// assert_eq!(chart.visible_ticks().count(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub series: Series,
    /// Same length as `series.values`
    pub ticks: Vec<TickMarker>,
}

impl ChartData {
    /// Indices and markers of the ticks that actually draw something.
    pub fn visible_ticks(&self) -> impl Iterator<Item = (usize, TickMarker)> + '_ {
        self.ticks
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, tick)| tick.is_visible())
    }
}
