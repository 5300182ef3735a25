//! # Tide Chart Rendering
//!
//! Renders the widget view either as text for a terminal or onto any
//! `embedded-graphics` draw target with `Rgb888` color (see [`crate::canvas`]).
//!
//! Both surfaces draw the same picture: a smoothed area chart filled toward the
//! zero line, a thick stroke on top, no axes, and sun/moon glyphs under the
//! selected ticks when the chart mode asks for them. Loading and error states
//! draw a single indicator instead of the chart.

use crate::config::{ChartMode, Config};
use crate::widget::{Indicator, View};
use crate::{ChartData, TickMarker, DAY_COLOR, NIGHT_COLOR};
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
};

/// Area fill under (or over, when inverted) the curve
pub const FILL_COLOR: Rgb888 = Rgb888::new(0xB8, 0xD8, 0xF0);
/// Curve stroke
pub const STROKE_COLOR: Rgb888 = Rgb888::new(0x1F, 0x4E, 0x8C);
/// Error indicator
pub const ERROR_COLOR: Rgb888 = Rgb888::new(0xD0, 0x31, 0x2D);
/// Loading spinner and disabled controls
pub const MUTED_COLOR: Rgb888 = Rgb888::new(0xA0, 0xA0, 0xA0);

/// Curve stroke width in pixels
pub const STROKE_WIDTH: u32 = 3;
/// Height reserved under the plot for tick glyphs
pub const GLYPH_STRIP: u32 = 24;
/// Glyph diameter
const GLYPH_SIZE: u32 = 16;
/// Height of the bar holding the refresh control
const TOP_BAR: u32 = 20;
const MARGIN: u32 = 4;

/// Catmull–Rom value at fractional sample position `x`.
///
/// The result is clamped to the two neighbouring samples so the curve never
/// overshoots between points.
pub fn smooth_at(values: &[f64], x: f64) -> f64 {
    let n = values.len();
    match n {
        0 => return 0.0,
        1 => return values[0],
        _ => {}
    }
    let x = x.clamp(0.0, (n - 1) as f64);
    let i = (x.floor() as usize).min(n - 2);
    let t = x - i as f64;

    let p0 = values[i.saturating_sub(1)];
    let p1 = values[i];
    let p2 = values[i + 1];
    let p3 = values[(i + 2).min(n - 1)];

    let t2 = t * t;
    let t3 = t2 * t;
    let v = 0.5
        * (2.0 * p1
            + (p2 - p0) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3);
    v.clamp(p1.min(p2), p1.max(p2))
}

/// Value range of the chart, always including the zero line the fill runs to.
fn value_range(chart: &ChartData) -> (f64, f64) {
    let (lo, hi) = chart.series.bounds().unwrap_or((0.0, 0.0));
    let (lo, hi) = (lo.min(0.0), hi.max(0.0));
    if hi - lo < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Fractional sample position for column `col` of `columns`.
fn sample_position(col: usize, columns: usize, samples: usize) -> f64 {
    if columns <= 1 || samples <= 1 {
        return 0.0;
    }
    col as f64 * (samples - 1) as f64 / (columns - 1) as f64
}

/// Column of sample `index` when `samples` are spread over `columns`.
fn tick_column(index: usize, samples: usize, columns: usize) -> usize {
    if samples <= 1 {
        return columns / 2;
    }
    (index as f64 * (columns - 1) as f64 / (samples - 1) as f64).round() as usize
}

// -- Raster surface --

/// Draw the chart into `area` of `target`.
pub fn draw_chart<D>(
    chart: &ChartData,
    mode: ChartMode,
    area: Rectangle,
    target: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let n = chart.series.len();
    if n == 0 || area.size.width == 0 || area.size.height == 0 {
        return Ok(());
    }

    let strip = match mode {
        ChartMode::GlyphTicks => GLYPH_STRIP.min(area.size.height / 2),
        ChartMode::Plain => 0,
    };
    let left = area.top_left.x;
    let top = area.top_left.y;
    let width = area.size.width as usize;
    let plot_h = (area.size.height - strip) as i32;

    let (lo, hi) = value_range(chart);
    let to_y = |v: f64| top + ((hi - v) / (hi - lo) * (plot_h - 1) as f64).round() as i32;
    let zero_y = to_y(0.0);

    let fill = PrimitiveStyle::with_stroke(FILL_COLOR, 1);
    let mut curve = Vec::with_capacity(width);
    for col in 0..width {
        let v = smooth_at(&chart.series.values, sample_position(col, width, n));
        let x = left + col as i32;
        let y = to_y(v);
        Line::new(Point::new(x, y.min(zero_y)), Point::new(x, y.max(zero_y)))
            .into_styled(fill)
            .draw(target)?;
        curve.push(Point::new(x, y));
    }

    let stroke = PrimitiveStyle::with_stroke(STROKE_COLOR, STROKE_WIDTH);
    if curve.len() == 1 {
        Circle::with_center(curve[0], STROKE_WIDTH)
            .into_styled(PrimitiveStyle::with_fill(STROKE_COLOR))
            .draw(target)?;
    }
    for pair in curve.windows(2) {
        Line::new(pair[0], pair[1]).into_styled(stroke).draw(target)?;
    }

    if mode == ChartMode::GlyphTicks && strip > 0 {
        let glyph_y = top + plot_h + strip as i32 / 2;
        for (index, tick) in chart.visible_ticks() {
            let x = left + tick_column(index, n, width) as i32;
            draw_glyph(tick, Point::new(x, glyph_y), target)?;
        }
    }
    Ok(())
}

/// Sun: a filled warm disc. Moon: a cool disc with a background bite taken out.
fn draw_glyph<D>(tick: TickMarker, center: Point, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    match tick {
        TickMarker::Blank => Ok(()),
        TickMarker::Day => Circle::with_center(center, GLYPH_SIZE)
            .into_styled(PrimitiveStyle::with_fill(DAY_COLOR))
            .draw(target),
        TickMarker::Night => {
            Circle::with_center(center, GLYPH_SIZE)
                .into_styled(PrimitiveStyle::with_fill(NIGHT_COLOR))
                .draw(target)?;
            let bite = center + Point::new(GLYPH_SIZE as i32 / 3, -(GLYPH_SIZE as i32) / 4);
            Circle::with_center(bite, GLYPH_SIZE * 3 / 4)
                .into_styled(PrimitiveStyle::with_fill(crate::canvas::BACKGROUND))
                .draw(target)
        }
    }
}

/// Draw the complete widget: refresh control, then one indicator or the chart.
pub fn draw_view<D>(view: &View<'_>, mode: ChartMode, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let bounds = target.bounding_box();
    let Size { width, height } = bounds.size;
    if width <= 2 * MARGIN + 14 || height <= TOP_BAR + MARGIN {
        return Ok(());
    }

    // Refresh control, greyed out while loading
    let control_color = if view.refresh_enabled {
        STROKE_COLOR
    } else {
        MUTED_COLOR
    };
    let control = Rectangle::new(
        bounds.top_left + Point::new((width - MARGIN - 14) as i32, 3),
        Size::new(14, 14),
    );
    control
        .into_styled(PrimitiveStyle::with_stroke(control_color, 1))
        .draw(target)?;
    Circle::with_center(control.center(), 8)
        .into_styled(PrimitiveStyle::with_stroke(control_color, 2))
        .draw(target)?;

    let body = Rectangle::new(
        bounds.top_left + Point::new(MARGIN as i32, TOP_BAR as i32),
        Size::new(width - 2 * MARGIN, height - TOP_BAR - MARGIN),
    );
    let center = body.center();

    match view.indicator {
        Indicator::Loading => Circle::with_center(center, 24)
            .into_styled(PrimitiveStyle::with_stroke(MUTED_COLOR, 3))
            .draw(target),
        Indicator::Error => {
            let style = PrimitiveStyle::with_stroke(ERROR_COLOR, 3);
            Line::new(center + Point::new(-10, -10), center + Point::new(10, 10))
                .into_styled(style)
                .draw(target)?;
            Line::new(center + Point::new(-10, 10), center + Point::new(10, -10))
                .into_styled(style)
                .draw(target)
        }
        Indicator::Chart(chart) => draw_chart(chart, mode, body, target),
    }
}

// -- Terminal surface --

/// Render the view as terminal text.
pub fn render_ascii(view: &View<'_>, config: &Config) -> String {
    let control = if view.refresh_enabled {
        "[r] refresh  [q] quit"
    } else {
        "[r] refresh (disabled while loading)  [q] quit"
    };
    let title = format!("{} ({})", config.station.name, config.station.id);

    match view.indicator {
        Indicator::Loading => format!("{title}\n⏳ Loading tide predictions...\n{control}\n"),
        Indicator::Error => {
            format!("{title}\n⚠ Could not load tide predictions\n{control}\n")
        }
        Indicator::Chart(chart) => {
            let mut out = String::new();
            let (lo, hi) = chart.series.bounds().unwrap_or((0.0, 0.0));
            out.push_str(&format!("{title}  low {lo:.1} ft  high {hi:.1} ft\n"));
            for line in ascii_rows(chart, config) {
                out.push_str(&line);
                out.push('\n');
            }
            out.push_str(control);
            out.push('\n');
            out
        }
    }
}

/// Print the view to stdout.
pub fn draw_ascii(view: &View<'_>, config: &Config) {
    print!("{}", render_ascii(view, config));
}

/// Chart body rows, plus a glyph row in glyph mode.
fn ascii_rows(chart: &ChartData, config: &Config) -> Vec<String> {
    let rows = config.chart.ascii_rows.max(2);
    let columns = config.chart.ascii_columns.max(2);
    let n = chart.series.len();

    let (lo, hi) = value_range(chart);
    let to_row = |v: f64| ((hi - v) / (hi - lo) * (rows - 1) as f64).round() as usize;
    let zero_row = to_row(0.0);

    let mut grid = vec![vec![' '; columns]; rows];
    for col in 0..columns {
        let v = smooth_at(&chart.series.values, sample_position(col, columns, n));
        let row = to_row(v);
        for cell in grid.iter_mut().take(row.max(zero_row) + 1).skip(row.min(zero_row)) {
            cell[col] = '░';
        }
        grid[row][col] = '•';
    }

    let mut lines: Vec<String> = grid.into_iter().map(|r| r.into_iter().collect()).collect();

    if config.chart.mode == ChartMode::GlyphTicks {
        let mut glyphs = vec![' '; columns];
        for (index, tick) in chart.visible_ticks() {
            let col = tick_column(index, n, columns).min(columns - 1);
            if let Some(c) = tick.label().chars().next() {
                glyphs[col] = c;
            }
        }
        lines.push(glyphs.into_iter().collect());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::Series;

    fn test_chart(values: Vec<f64>) -> ChartData {
        let ticks = match values.len() {
            5 => vec![
                TickMarker::Night,
                TickMarker::Day,
                TickMarker::Day,
                TickMarker::Day,
                TickMarker::Night,
            ],
            n => vec![TickMarker::Blank; n],
        };
        ChartData {
            series: Series { values },
            ticks,
        }
    }

    fn ready(chart: &ChartData) -> View<'_> {
        View {
            indicator: Indicator::Chart(chart),
            refresh_enabled: true,
        }
    }

    #[test]
    fn smoothing_passes_through_samples() {
        let values = [1.0, 4.0, 2.0, 3.0];
        for (i, v) in values.iter().enumerate() {
            assert_eq!(smooth_at(&values, i as f64), *v);
        }
    }

    #[test]
    fn smoothing_never_overshoots_neighbours() {
        let values = [0.0, 5.0, 5.0, 0.0, 0.0, 9.0];
        for step in 0..=50 {
            let x = step as f64 / 10.0;
            let v = smooth_at(&values, x);
            let i = (x.floor() as usize).min(values.len() - 2);
            assert!(v >= values[i].min(values[i + 1]) - 1e-9);
            assert!(v <= values[i].max(values[i + 1]) + 1e-9);
        }
    }

    #[test]
    fn smoothing_degenerate_inputs() {
        assert_eq!(smooth_at(&[], 3.0), 0.0);
        assert_eq!(smooth_at(&[2.5], 7.0), 2.5);
        assert_eq!(smooth_at(&[1.0, 2.0], -4.0), 1.0);
        assert_eq!(smooth_at(&[1.0, 2.0], 9.0), 2.0);
    }

    #[test]
    fn ascii_chart_has_glyph_row() {
        let chart = test_chart(vec![1.0, 2.0, 3.0, 2.0, 1.0]);
        let config = Config::default();
        let text = render_ascii(&ready(&chart), &config);
        let lines: Vec<&str> = text.lines().collect();

        // title + rows + glyph row + control
        assert_eq!(lines.len(), 1 + config.chart.ascii_rows + 1 + 1);
        let glyph_row = lines[1 + config.chart.ascii_rows];
        assert_eq!(glyph_row.matches('☀').count(), 3);
        assert_eq!(glyph_row.matches('☾').count(), 2);
        assert!(glyph_row.starts_with('☾'));
        assert!(glyph_row.ends_with('☾'));
        assert!(lines[0].contains("high 3.0 ft"));
    }

    #[test]
    fn ascii_plain_mode_has_no_glyphs() {
        let chart = test_chart(vec![1.0, 2.0, 3.0, 2.0, 1.0]);
        let mut config = Config::default();
        config.chart.mode = ChartMode::Plain;
        let text = render_ascii(&ready(&chart), &config);
        assert!(!text.contains('☀'));
        assert!(!text.contains('☾'));
        assert_eq!(text.lines().count(), 1 + config.chart.ascii_rows + 1);
    }

    #[test]
    fn ascii_indicators_are_exclusive() {
        let config = Config::default();
        let loading = render_ascii(
            &View {
                indicator: Indicator::Loading,
                refresh_enabled: false,
            },
            &config,
        );
        assert!(loading.contains("Loading"));
        assert!(loading.contains("disabled"));
        assert!(!loading.contains('•'));

        let error = render_ascii(
            &View {
                indicator: Indicator::Error,
                refresh_enabled: true,
            },
            &config,
        );
        assert!(error.contains("Could not load"));
        assert!(!error.contains("Loading"));
        assert!(!error.contains("disabled"));
    }

    #[test]
    fn raster_chart_draws_fill_stroke_and_glyphs() {
        let chart = test_chart(vec![1.0, 2.0, 3.0, 2.0, 1.0]);
        let mut canvas = Canvas::new(200, 120);
        draw_view(&ready(&chart), ChartMode::GlyphTicks, &mut canvas).unwrap();

        assert!(canvas.count(FILL_COLOR) > 0);
        assert!(canvas.count(STROKE_COLOR) > 0);
        assert!(canvas.count(DAY_COLOR) > 0);
        assert!(canvas.count(NIGHT_COLOR) > 0);
    }

    #[test]
    fn raster_plain_mode_skips_glyphs() {
        let chart = test_chart(vec![1.0, 2.0, 3.0, 2.0, 1.0]);
        let mut canvas = Canvas::new(200, 120);
        draw_view(&ready(&chart), ChartMode::Plain, &mut canvas).unwrap();

        assert!(canvas.count(STROKE_COLOR) > 0);
        assert_eq!(canvas.count(DAY_COLOR), 0);
        assert_eq!(canvas.count(NIGHT_COLOR), 0);
    }

    #[test]
    fn inverted_series_fills_from_the_top() {
        let area = Rectangle::new(Point::zero(), Size::new(101, 60));
        let mid = 50;

        let upright = test_chart(vec![1.0, 2.0, 3.0, 2.0, 1.0]);
        let mut canvas = Canvas::new(101, 60);
        draw_chart(&upright, ChartMode::Plain, area, &mut canvas).unwrap();
        assert_eq!(canvas.pixel(mid, 58), Some(FILL_COLOR));
        assert_ne!(canvas.pixel(mid, 0), Some(FILL_COLOR));

        let inverted = test_chart(vec![-1.0, -2.0, -3.0, -2.0, -1.0]);
        let mut canvas = Canvas::new(101, 60);
        draw_chart(&inverted, ChartMode::Plain, area, &mut canvas).unwrap();
        assert_eq!(canvas.pixel(mid, 1), Some(FILL_COLOR));
        assert_ne!(canvas.pixel(mid, 59), Some(FILL_COLOR));
    }

    #[test]
    fn raster_indicators() {
        let mut canvas = Canvas::new(120, 80);
        let loading = View {
            indicator: Indicator::Loading,
            refresh_enabled: false,
        };
        draw_view(&loading, ChartMode::GlyphTicks, &mut canvas).unwrap();
        assert!(canvas.count(MUTED_COLOR) > 0);
        assert_eq!(canvas.count(ERROR_COLOR), 0);
        assert_eq!(canvas.count(STROKE_COLOR), 0);

        let mut canvas = Canvas::new(120, 80);
        let error = View {
            indicator: Indicator::Error,
            refresh_enabled: true,
        };
        draw_view(&error, ChartMode::GlyphTicks, &mut canvas).unwrap();
        assert!(canvas.count(ERROR_COLOR) > 0);
        assert_eq!(canvas.count(FILL_COLOR), 0);
    }

    #[test]
    fn single_sample_chart_renders() {
        let chart = test_chart(vec![2.0]);
        let mut canvas = Canvas::new(50, 50);
        draw_view(&ready(&chart), ChartMode::GlyphTicks, &mut canvas).unwrap();
        assert!(canvas.count(STROKE_COLOR) > 0);
        let text = render_ascii(&ready(&chart), &Config::default());
        assert!(text.contains('•'));
    }
}
