//! Figure descriptions and their rasterisation.
//!
//! A figure is plain data built by the catalog. `render` lays out title,
//! axes, grid, data and legend on a fresh [`Canvas`].

use chrono::{Duration, NaiveDateTime};

use super::canvas::{Canvas, Color, Marker, Stroke, BLACK, DARK_GREY, GRID_GREY, LIGHT_GREY, WHITE};
use super::font;
use crate::error::JournalError;
use crate::metrics::CorrelationMatrix;

// ═══════════════════════════════════════════════════════════
// Figure model
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend entry; unlabelled series stay out of the legend.
    pub label: Option<String>,
    pub values: Vec<Option<f64>>,
    pub stroke: Stroke,
    pub marker: Marker,
    pub marker_radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub value: f64,
    pub label: String,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryAxis {
    pub label: String,
    pub series: Vec<Series>,
}

/// Shading between one primary series and zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaFill {
    pub series: usize,
    pub color: Color,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub heading: String,
    pub x_label: String,
    pub y_label: String,
    pub dates: Vec<NaiveDateTime>,
    pub series: Vec<Series>,
    pub secondary: Option<SecondaryAxis>,
    pub reference_lines: Vec<ReferenceLine>,
    pub area_fill: Option<AreaFill>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub heading: String,
    pub x_label: String,
    pub y_label: String,
    pub dates: Vec<NaiveDateTime>,
    pub values: Vec<Option<f64>>,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub heading: String,
    pub matrix: CorrelationMatrix,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Trend(TrendChart),
    Bars(BarChart),
    Heatmap(Heatmap),
}

impl Figure {
    pub fn heading(&self) -> &str {
        match self {
            Figure::Trend(c) => &c.heading,
            Figure::Bars(c) => &c.heading,
            Figure::Heatmap(c) => &c.heading,
        }
    }

    pub fn render(&self, width: u32, height: u32) -> Result<Canvas, JournalError> {
        if width < 200 || height < 150 {
            return Err(JournalError::Rendering(format!(
                "canvas {width}x{height} is too small for a chart"
            )));
        }
        let mut canvas = Canvas::new(width, height);
        match self {
            Figure::Trend(c) => c.draw(&mut canvas)?,
            Figure::Bars(c) => c.draw(&mut canvas)?,
            Figure::Heatmap(c) => c.draw(&mut canvas)?,
        }
        Ok(canvas)
    }
}

// ═══════════════════════════════════════════════════════════
// Layout helpers
// ═══════════════════════════════════════════════════════════

/// Text scales derived from the canvas width.
#[derive(Debug, Clone, Copy)]
struct Style {
    label: u32,
    title: u32,
}

impl Style {
    fn for_width(width: u32) -> Self {
        let label = if width >= 640 { 2 } else { 1 };
        Self { label, title: label + 1 }
    }

    /// Layout unit in pixels.
    fn unit(&self) -> f64 {
        self.label as f64
    }

    fn line_height(&self) -> f64 {
        font::text_height(self.label) as f64
    }

    fn width_of(&self, text: &str) -> f64 {
        font::text_width(text, self.label) as f64
    }
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A linear value range with tick positions.
#[derive(Debug, Clone)]
struct Axis {
    lo: f64,
    hi: f64,
    ticks: Vec<f64>,
    step: f64,
}

impl Axis {
    fn fit(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }
        if include_zero {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        if (hi - lo).abs() < 1e-9 {
            lo -= 1.0;
            hi += 1.0;
        }
        let pad = (hi - lo) * 0.05;
        let lo = if include_zero && lo >= 0.0 { lo } else { lo - pad };
        let hi = hi + pad;
        Self::with_range(lo, hi)
    }

    fn with_range(lo: f64, hi: f64) -> Self {
        let step = nice_step((hi - lo) / 5.0);
        let mut ticks = Vec::new();
        let mut v = (lo / step).ceil() * step;
        while v <= hi + step * 1e-9 && ticks.len() < 50 {
            ticks.push(if v.abs() < step * 1e-6 { 0.0 } else { v });
            v += step;
        }
        Self { lo, hi, ticks, step }
    }

    /// Fraction of the range covered by `v`.
    fn fraction(&self, v: f64) -> f64 {
        (v - self.lo) / (self.hi - self.lo)
    }

    fn tick_label(&self, v: f64) -> String {
        format_tick(v, self.step)
    }
}

fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let f = raw / base;
    let nice = if f <= 1.0 {
        1.0
    } else if f <= 2.0 {
        2.0
    } else if f <= 2.5 {
        2.5
    } else if f <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

fn format_tick(v: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{v:.0}")
    } else if step >= 0.1 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

/// Draws the title and returns the y coordinate below it.
fn draw_title(canvas: &mut Canvas, style: Style, heading: &str) -> f64 {
    let u = style.unit();
    let y = 6.0 * u;
    let w = font::text_width(heading, style.title) as f64;
    canvas.text_bold(canvas.width() as f64 / 2.0 - w / 2.0, y, heading, style.title, BLACK);
    y + font::text_height(style.title) as f64 + 10.0 * u
}

/// Time axis in fractional days from the first date.
struct TimeAxis {
    origin: NaiveDateTime,
    axis: Axis,
}

impl TimeAxis {
    fn fit(dates: &[NaiveDateTime]) -> Option<Self> {
        let origin = *dates.first()?;
        let last = *dates.last()?;
        let span = days_between(origin, last);
        let (lo, hi) = if span < 1e-9 {
            (-1.0, 1.0)
        } else {
            let pad = span * 0.03;
            (-pad, span + pad)
        };
        Some(Self {
            origin,
            axis: Axis {
                lo,
                hi,
                ticks: Vec::new(),
                step: 1.0,
            },
        })
    }

    fn offset(&self, date: NaiveDateTime) -> f64 {
        days_between(self.origin, date)
    }

    /// Up to `max` evenly spaced tick positions across the data span.
    fn ticks(&self, dates: &[NaiveDateTime], max: usize) -> Vec<(f64, String)> {
        let mut distinct: Vec<NaiveDateTime> = dates.to_vec();
        distinct.dedup();
        let count = distinct.len().min(max).max(1);
        let first = self.offset(distinct[0]);
        let last = self.offset(distinct[distinct.len() - 1]);
        (0..count)
            .map(|i| {
                let x = if count == 1 {
                    first
                } else {
                    first + (last - first) * i as f64 / (count - 1) as f64
                };
                let when = self.origin + Duration::seconds((x * 86_400.0).round() as i64);
                (x, when.format("%Y-%m-%d").to_string())
            })
            .collect()
    }
}

fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 86_400.0
}

fn validate_len(what: &str, got: usize, expected: usize) -> Result<(), JournalError> {
    if got != expected {
        return Err(JournalError::Rendering(format!(
            "{what} has {got} values for {expected} dates"
        )));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Trend
// ═══════════════════════════════════════════════════════════

impl TrendChart {
    fn secondary_series(&self) -> &[Series] {
        self.secondary.as_ref().map(|s| s.series.as_slice()).unwrap_or(&[])
    }

    fn draw(&self, canvas: &mut Canvas) -> Result<(), JournalError> {
        if self.dates.is_empty() {
            return Err(JournalError::Rendering(format!("'{}' has no data points", self.heading)));
        }
        for s in self.series.iter().chain(self.secondary_series()) {
            validate_len(s.label.as_deref().unwrap_or(&self.heading), s.values.len(), self.dates.len())?;
        }
        if let Some(fill) = &self.area_fill {
            if fill.series >= self.series.len() {
                return Err(JournalError::Rendering("area fill refers to a missing series".into()));
            }
        }

        let style = Style::for_width(canvas.width());
        let u = style.unit();
        let lh = style.line_height();

        let primary = Axis::fit(
            self.series
                .iter()
                .flat_map(|s| s.values.iter().flatten().copied())
                .chain(self.reference_lines.iter().map(|r| r.value))
                .chain(self.area_fill.map(|_| 0.0)),
            false,
        );
        let secondary = self.secondary.as_ref().map(|axis| {
            Axis::fit(axis.series.iter().flat_map(|s| s.values.iter().flatten().copied()), false)
        });
        let time = TimeAxis::fit(&self.dates)
            .ok_or_else(|| JournalError::Rendering("no dates to plot".into()))?;

        // ─── Layout ───
        let top = draw_title(canvas, style, &self.heading);
        let tick_w = primary
            .ticks
            .iter()
            .map(|t| style.width_of(&primary.tick_label(*t)))
            .fold(0.0, f64::max);
        let left = 4.0 * u + lh + 6.0 * u + tick_w + 4.0 * u;
        let right = match &secondary {
            Some(axis) => {
                let w = axis
                    .ticks
                    .iter()
                    .map(|t| style.width_of(&axis.tick_label(*t)))
                    .fold(0.0, f64::max);
                canvas.width() as f64 - (4.0 * u + w + 6.0 * u + lh + 4.0 * u)
            }
            None => canvas.width() as f64 - 12.0 * u,
        };
        let bottom = canvas.height() as f64 - (4.0 * u + lh + 8.0 * u + lh + 6.0 * u);
        let plot = PlotArea { left, top, right, bottom };
        if plot.width() < 20.0 || plot.height() < 20.0 {
            return Err(JournalError::Rendering(format!("'{}' does not fit its canvas", self.heading)));
        }

        let x_of = |date: NaiveDateTime| plot.left + time.axis.fraction(time.offset(date)) * plot.width();
        let y_of = |axis: &Axis, v: f64| plot.bottom - axis.fraction(v) * plot.height();

        // ─── Grid and ticks ───
        let label_w = style.width_of("0000-00-00") + 16.0 * u;
        let max_ticks = ((plot.width() / label_w).floor() as usize).clamp(1, 6);
        for (x, label) in time.ticks(&self.dates, max_ticks) {
            let px = plot.left + time.axis.fraction(x) * plot.width();
            canvas.fill_rect(px, plot.top, px + 1.0, plot.bottom, GRID_GREY);
            canvas.text_centered(px, plot.bottom + 4.0 * u, &label, style.label, DARK_GREY);
        }
        for tick in &primary.ticks {
            let py = y_of(&primary, *tick);
            canvas.fill_rect(plot.left, py, plot.right, py + 1.0, GRID_GREY);
            canvas.text_right(plot.left - 4.0 * u, py - lh / 2.0, &primary.tick_label(*tick), style.label, DARK_GREY);
        }
        if let Some(axis) = &secondary {
            for tick in &axis.ticks {
                let py = y_of(axis, *tick);
                canvas.text(plot.right + 4.0 * u, py - lh / 2.0, &axis.tick_label(*tick), style.label, DARK_GREY);
            }
        }

        // ─── Axis labels ───
        canvas.text_centered(
            (plot.left + plot.right) / 2.0,
            plot.bottom + 4.0 * u + lh + 8.0 * u,
            &self.x_label,
            style.label,
            BLACK,
        );
        canvas.text_vertical(4.0 * u, (plot.top + plot.bottom) / 2.0, &self.y_label, style.label, BLACK);
        if let Some(axis) = &self.secondary {
            let x = canvas.width() as f64 - 4.0 * u - lh;
            canvas.text_vertical(x, (plot.top + plot.bottom) / 2.0, &axis.label, style.label, BLACK);
        }

        // ─── Data ───
        if let Some(fill) = &self.area_fill {
            let baseline = y_of(&primary, 0.0).clamp(plot.top, plot.bottom);
            for run in runs(&self.series[fill.series].values) {
                let points: Vec<(f64, f64)> = run
                    .iter()
                    .map(|(i, v)| (x_of(self.dates[*i]), y_of(&primary, *v)))
                    .collect();
                canvas.fill_between(&points, baseline, fill.color, fill.alpha);
            }
        }
        for line in &self.reference_lines {
            let py = y_of(&primary, line.value);
            canvas.line(plot.left, py, plot.right, py, &line.stroke);
        }
        for s in &self.series {
            draw_series(canvas, s, |i, v| (x_of(self.dates[i]), y_of(&primary, v)));
        }
        if let Some(axis) = &secondary {
            for s in self.secondary_series() {
                draw_series(canvas, s, |i, v| (x_of(self.dates[i]), y_of(axis, v)));
            }
        }

        canvas.stroke_rect(plot.left, plot.top, plot.right, plot.bottom, DARK_GREY, u.max(1.0));

        // ─── Legend ───
        let mut entries: Vec<LegendEntry<'_>> = self
            .series
            .iter()
            .chain(self.secondary_series())
            .filter_map(|s| {
                s.label.as_deref().map(|label| LegendEntry {
                    label,
                    stroke: s.stroke,
                    marker: s.marker,
                    marker_radius: s.marker_radius,
                })
            })
            .collect();
        entries.extend(self.reference_lines.iter().map(|r| LegendEntry {
            label: &r.label,
            stroke: r.stroke,
            marker: Marker::None,
            marker_radius: 0.0,
        }));
        draw_legend(canvas, style, &plot, &entries);
        Ok(())
    }
}

/// Consecutive non-missing points of a series, with their row indices.
fn runs(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn draw_series(canvas: &mut Canvas, series: &Series, project: impl Fn(usize, f64) -> (f64, f64)) {
    for run in runs(&series.values) {
        let points: Vec<(f64, f64)> = run.iter().map(|(i, v)| project(*i, *v)).collect();
        canvas.polyline(&points, &series.stroke);
        for (x, y) in points {
            canvas.marker(x, y, series.marker, series.marker_radius, series.stroke.color);
        }
    }
}

struct LegendEntry<'a> {
    label: &'a str,
    stroke: Stroke,
    marker: Marker,
    marker_radius: f64,
}

fn draw_legend(canvas: &mut Canvas, style: Style, plot: &PlotArea, entries: &[LegendEntry<'_>]) {
    if entries.is_empty() {
        return;
    }
    let u = style.unit();
    let lh = style.line_height();
    let sample = 24.0 * u;
    let row = lh + 6.0 * u;
    let text_w = entries.iter().map(|e| style.width_of(e.label)).fold(0.0, f64::max);
    let width = 6.0 * u + sample + 6.0 * u + text_w + 6.0 * u;
    let height = 4.0 * u + row * entries.len() as f64 + 2.0 * u;
    let x0 = plot.right - width - 6.0 * u;
    let y0 = plot.top + 6.0 * u;

    canvas.fill_rect(x0, y0, x0 + width, y0 + height, WHITE);
    canvas.stroke_rect(x0, y0, x0 + width, y0 + height, LIGHT_GREY, 1.0);
    for (i, entry) in entries.iter().enumerate() {
        let cy = y0 + 4.0 * u + row * i as f64 + lh / 2.0;
        let sx = x0 + 6.0 * u;
        canvas.line(sx, cy, sx + sample, cy, &entry.stroke);
        canvas.marker(sx + sample / 2.0, cy, entry.marker, entry.marker_radius, entry.stroke.color);
        canvas.text(sx + sample + 6.0 * u, cy - lh / 2.0, entry.label, style.label, BLACK);
    }
}

// ═══════════════════════════════════════════════════════════
// Bars
// ═══════════════════════════════════════════════════════════

impl BarChart {
    fn draw(&self, canvas: &mut Canvas) -> Result<(), JournalError> {
        if self.dates.is_empty() {
            return Err(JournalError::Rendering(format!("'{}' has no data points", self.heading)));
        }
        validate_len(&self.heading, self.values.len(), self.dates.len())?;

        let style = Style::for_width(canvas.width());
        let u = style.unit();
        let lh = style.line_height();
        let axis = Axis::fit(self.values.iter().flatten().copied(), true);

        let top = draw_title(canvas, style, &self.heading);
        let tick_w = axis
            .ticks
            .iter()
            .map(|t| style.width_of(&axis.tick_label(*t)))
            .fold(0.0, f64::max);
        let plot = PlotArea {
            left: 4.0 * u + lh + 6.0 * u + tick_w + 4.0 * u,
            top,
            right: canvas.width() as f64 - 12.0 * u,
            bottom: canvas.height() as f64 - (4.0 * u + lh + 8.0 * u + lh + 6.0 * u),
        };
        if plot.width() < 20.0 || plot.height() < 20.0 {
            return Err(JournalError::Rendering(format!("'{}' does not fit its canvas", self.heading)));
        }
        let y_of = |v: f64| plot.bottom - axis.fraction(v) * plot.height();

        for tick in &axis.ticks {
            let py = y_of(*tick);
            canvas.fill_rect(plot.left, py, plot.right, py + 1.0, GRID_GREY);
            canvas.text_right(plot.left - 4.0 * u, py - lh / 2.0, &axis.tick_label(*tick), style.label, DARK_GREY);
        }

        let n = self.dates.len();
        let slot = plot.width() / n as f64;
        let label_w = style.width_of("0000-00-00") + 12.0 * u;
        let every = ((label_w / slot).ceil() as usize).max(1);
        let zero = y_of(0.0);
        for (i, (date, value)) in self.dates.iter().zip(&self.values).enumerate() {
            let cx = plot.left + slot * (i as f64 + 0.5);
            if let Some(v) = value.filter(|v| v.is_finite()) {
                let half = (slot * 0.4).max(0.5);
                canvas.fill_rect(cx - half, y_of(v), cx + half, zero, self.color);
            }
            if i % every == 0 {
                let label = date.format("%Y-%m-%d").to_string();
                canvas.text_centered(cx, plot.bottom + 4.0 * u, &label, style.label, DARK_GREY);
            }
        }

        canvas.text_centered(
            (plot.left + plot.right) / 2.0,
            plot.bottom + 4.0 * u + lh + 8.0 * u,
            &self.x_label,
            style.label,
            BLACK,
        );
        canvas.text_vertical(4.0 * u, (plot.top + plot.bottom) / 2.0, &self.y_label, style.label, BLACK);
        canvas.stroke_rect(plot.left, plot.top, plot.right, plot.bottom, DARK_GREY, u.max(1.0));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Heatmap
// ═══════════════════════════════════════════════════════════

/// Grey level for a correlation: -1 is white, +1 is black.
fn correlation_shade(v: f64) -> Color {
    let t = ((v + 1.0) / 2.0).clamp(0.0, 1.0);
    let g = (255.0 * (1.0 - t)).round() as u8;
    [g, g, g]
}

/// Longest axis label the heatmap prints; longer names are cut with "..".
const HEATMAP_LABEL_CHARS: usize = 16;

fn heatmap_label(name: &str) -> String {
    if name.chars().count() <= HEATMAP_LABEL_CHARS {
        return name.to_string();
    }
    let mut short: String = name.chars().take(HEATMAP_LABEL_CHARS - 2).collect();
    short.push_str("..");
    short
}

impl Heatmap {
    fn draw(&self, canvas: &mut Canvas) -> Result<(), JournalError> {
        let n = self.matrix.labels.len();
        if n == 0 {
            return Err(JournalError::Rendering("correlation matrix is empty".into()));
        }
        if self.matrix.values.len() != n || self.matrix.values.iter().any(|row| row.len() != n) {
            return Err(JournalError::Rendering("correlation matrix is not square".into()));
        }

        let style = Style::for_width(canvas.width());
        let u = style.unit();
        let lh = style.line_height();
        let top = draw_title(canvas, style, &self.heading);

        let labels: Vec<String> = self.matrix.labels.iter().map(|l| heatmap_label(l)).collect();
        let bar_w = 16.0 * u;
        let bar_label_w = style.width_of("-1.0");
        let right_reserve = 12.0 * u + bar_w + 4.0 * u + bar_label_w + 6.0 * u;
        let (canvas_w, canvas_h) = (canvas.width() as f64, canvas.height() as f64);

        // Fall back to the smallest glyphs before giving up on the grid.
        let fit = |scale: u32| {
            let label_w = labels
                .iter()
                .map(|l| font::text_width(l, scale) as f64)
                .fold(0.0, f64::max);
            let avail_w = canvas_w - (12.0 * u + label_w) - right_reserve;
            let avail_h = canvas_h - top - (12.0 * u + label_w);
            (scale, label_w, (avail_w.min(avail_h) / n as f64).floor())
        };
        let (label_scale, label_w, cell) = [style.label, 1]
            .into_iter()
            .map(fit)
            .find(|(_, _, cell)| *cell >= 4.0)
            .ok_or_else(|| {
                JournalError::Rendering(format!("{n} columns do not fit a {canvas_w}x{canvas_h} heatmap"))
            })?;
        let label_lh = font::text_height(label_scale) as f64;
        let left = 6.0 * u + label_w + 6.0 * u;
        let grid = cell * n as f64;
        let gx = left;
        let gy = top;

        let annotate_scale = [style.label, 1]
            .into_iter()
            .find(|s| font::text_width("-0.00", *s) as f64 + 6.0 <= cell);

        for (r, row) in self.matrix.values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let x0 = gx + cell * c as f64;
                let y0 = gy + cell * r as f64;
                match value {
                    Some(v) => {
                        let shade = correlation_shade(*v);
                        canvas.fill_rect(x0, y0, x0 + cell, y0 + cell, shade);
                        if let Some(scale) = annotate_scale {
                            let ink = if shade[0] < 128 { WHITE } else { BLACK };
                            let text_y = y0 + (cell - font::text_height(scale) as f64) / 2.0;
                            canvas.text_centered(x0 + cell / 2.0, text_y, &format!("{v:.2}"), scale, ink);
                        }
                    }
                    None => canvas.fill_rect(x0, y0, x0 + cell, y0 + cell, WHITE),
                }
                canvas.stroke_rect(x0, y0, x0 + cell, y0 + cell, BLACK, 1.0);
            }
        }
        canvas.stroke_rect(gx, gy, gx + grid, gy + grid, BLACK, 2.0);

        for (i, label) in labels.iter().enumerate() {
            let cy = gy + cell * (i as f64 + 0.5);
            canvas.text_right(gx - 6.0 * u, cy - label_lh / 2.0, label, label_scale, BLACK);
            let cx = gx + cell * (i as f64 + 0.5);
            let w = font::text_width(label, label_scale) as f64;
            canvas.text_vertical(cx - label_lh / 2.0, gy + grid + 6.0 * u + w / 2.0, label, label_scale, BLACK);
        }

        // ─── Colour bar ───
        let bx = gx + grid + 12.0 * u;
        let steps = grid.max(1.0) as usize;
        for i in 0..steps {
            let v = 1.0 - 2.0 * i as f64 / steps as f64;
            let y = gy + i as f64;
            canvas.fill_rect(bx, y, bx + bar_w, y + 1.0, correlation_shade(v));
        }
        canvas.stroke_rect(bx, gy, bx + bar_w, gy + grid, DARK_GREY, 1.0);
        for tick in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            let y = gy + (1.0 - tick) / 2.0 * grid;
            canvas.fill_rect(bx + bar_w, y, bx + bar_w + 3.0 * u, y + 1.0, DARK_GREY);
            canvas.text(bx + bar_w + 4.0 * u, y - lh / 2.0, &format!("{tick:.1}"), style.label, DARK_GREY);
        }
        Ok(())
    }
}
