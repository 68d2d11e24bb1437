//! # Chart Rendering
//!
//! Draws a [`ChartSeries`] as a standalone SVG document: the series as a line
//! with point markers, the threshold as a dashed horizontal line, and the
//! selected section as a highlighted marker.
//!
//! The x axis (section) is logarithmic since standard sections span more than
//! two decades; the y axis is linear from zero.
//!
//! Rendering fails with [`CalcError::RenderFailed`] for series that cannot be
//! drawn (no points, non-finite values, non-positive sections). Callers
//! building a document treat that as a per-chart failure.

use crate::errors::{CalcError, CalcResult};
use crate::report::{ChartKind, ChartSeries};

pub const CHART_WIDTH: f64 = 720.0;
pub const CHART_HEIGHT: f64 = 400.0;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;

/// Upper bound on horizontal grid lines per chart
const MAX_Y_TICKS: usize = 20;

const FONT: &str = "DejaVu Sans Mono, monospace";
const SOLUTION_COLOR: &str = "#00a6cc";
const THRESHOLD_COLOR: &str = "#555555";
const GRID_COLOR: &str = "#d0d0d0";

/// Line colour per chart
fn series_color(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::VoltageDrop => "#ff4b4b",
        ChartKind::Ampacity => "#238636",
    }
}

/// Maps data coordinates into the plot area.
struct Frame {
    log_x_min: f64,
    log_x_span: f64,
    y_max: f64,
}

impl Frame {
    fn plot_width() -> f64 {
        CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn px(&self, x: f64) -> f64 {
        let t = if self.log_x_span > 0.0 {
            (x.log10() - self.log_x_min) / self.log_x_span
        } else {
            0.5
        };
        MARGIN_LEFT + t * Self::plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        MARGIN_TOP + Self::plot_height() * (1.0 - y / self.y_max)
    }
}

/// Render a chart series to an SVG document.
///
/// # Example
///
/// ```rust
/// use cable_core::charts::render_svg;
/// use cable_core::report::{ChartKind, ChartPoint, ChartSeries};
///
/// let series = ChartSeries {
///     kind: ChartKind::VoltageDrop,
///     title: "Voltage drop vs section".to_string(),
///     x_label: "Section (mm²)".to_string(),
///     y_label: "dU (%)".to_string(),
///     series_label: "Voltage drop (%)".to_string(),
///     points: vec![ChartPoint { x: 2.5, y: 3.6 }, ChartPoint { x: 4.0, y: 2.25 }],
///     threshold: 3.0,
///     threshold_label: "Limit 3 %".to_string(),
///     solution: Some(ChartPoint { x: 4.0, y: 2.25 }),
/// };
///
/// let svg = render_svg(&series).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
pub fn render_svg(series: &ChartSeries) -> CalcResult<String> {
    let artifact = series.kind.file_name();
    check_series(series, artifact)?;

    let (x_min, x_max) = series
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let y_data_max = series.points.iter().map(|p| p.y).fold(series.threshold, f64::max);
    let step = nice_step(y_data_max / 5.0);
    let y_max = (((y_data_max * 1.1) / step).ceil() * step).max(step);
    if !(y_max.is_finite() && step.is_finite()) {
        return Err(CalcError::render_failed(artifact, "axis range is not finite"));
    }

    let frame = Frame {
        log_x_min: x_min.log10(),
        log_x_span: x_max.log10() - x_min.log10(),
        y_max,
    };

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">
<rect x="0" y="0" width="{w}" height="{h}" fill="#ffffff"/>
<text x="{cx:.1}" y="26" font-size="16" font-weight="bold" text-anchor="middle">{title}</text>
"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        font = FONT,
        cx = CHART_WIDTH / 2.0,
        title = escape_xml(&series.title),
    );

    // Horizontal grid and y labels
    let mut tick = 0.0;
    let mut ticks = 0;
    while tick <= y_max + step * 1e-9 && ticks < MAX_Y_TICKS {
        let y = frame.py(tick);
        svg.push_str(&format!(
            r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="{grid}" stroke-dasharray="2,3"/>
<text x="{tx:.1}" y="{ty:.1}" font-size="10" text-anchor="end">{label}</text>
"##,
            x1 = MARGIN_LEFT,
            x2 = CHART_WIDTH - MARGIN_RIGHT,
            grid = GRID_COLOR,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 3.5,
            label = format_tick(tick),
        ));
        tick += step;
        ticks += 1;
    }

    // One x label per standard section
    for point in &series.points {
        let x = frame.px(point.x);
        svg.push_str(&format!(
            r##"<line x1="{x:.1}" y1="{y1:.1}" x2="{x:.1}" y2="{y2:.1}" stroke="#000000"/>
<text x="{x:.1}" y="{ty:.1}" font-size="9" text-anchor="middle">{label}</text>
"##,
            y1 = CHART_HEIGHT - MARGIN_BOTTOM,
            y2 = CHART_HEIGHT - MARGIN_BOTTOM + 4.0,
            ty = CHART_HEIGHT - MARGIN_BOTTOM + 15.0,
            label = point.x,
        ));
    }

    // Axes and axis titles
    svg.push_str(&format!(
        r##"<line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="#000000"/>
<line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="#000000"/>
<text x="{cx:.1}" y="{xt:.1}" font-size="12" text-anchor="middle">{x_label}</text>
<text x="16" y="{cy:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 16 {cy:.1})">{y_label}</text>
"##,
        l = MARGIN_LEFT,
        r = CHART_WIDTH - MARGIN_RIGHT,
        t = MARGIN_TOP,
        b = CHART_HEIGHT - MARGIN_BOTTOM,
        cx = MARGIN_LEFT + Frame::plot_width() / 2.0,
        xt = CHART_HEIGHT - 14.0,
        cy = MARGIN_TOP + Frame::plot_height() / 2.0,
        x_label = escape_xml(&series.x_label),
        y_label = escape_xml(&series.y_label),
    ));

    // Threshold
    let threshold_y = frame.py(series.threshold);
    svg.push_str(&format!(
        r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="{color}" stroke-width="1.5" stroke-dasharray="6,4"/>
"##,
        x1 = MARGIN_LEFT,
        x2 = CHART_WIDTH - MARGIN_RIGHT,
        y = threshold_y,
        color = THRESHOLD_COLOR,
    ));

    // Series
    let color = series_color(series.kind);
    let path: Vec<String> = series
        .points
        .iter()
        .map(|p| format!("{:.1},{:.1}", frame.px(p.x), frame.py(p.y)))
        .collect();
    svg.push_str(&format!(
        r##"<polyline points="{points}" fill="none" stroke="{color}" stroke-width="2"/>
"##,
        points = path.join(" "),
    ));
    for p in &series.points {
        svg.push_str(&format!(
            r##"<circle cx="{:.1}" cy="{:.1}" r="2.5" fill="{color}"/>
"##,
            frame.px(p.x),
            frame.py(p.y),
        ));
    }

    if let Some(solution) = series.solution {
        svg.push_str(&format!(
            r##"<circle cx="{:.1}" cy="{:.1}" r="7" fill="{SOLUTION_COLOR}" stroke="#000000" stroke-width="1"/>
"##,
            frame.px(solution.x),
            frame.py(solution.y),
        ));
    }

    svg.push_str(&legend(series, color));
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn legend(series: &ChartSeries, color: &str) -> String {
    let x = CHART_WIDTH - MARGIN_RIGHT - 190.0;
    let mut entries = vec![
        format!(r##"<line x1="0" y1="0" x2="20" y2="0" stroke="{color}" stroke-width="2"/>"##),
        format!(
            r##"<line x1="0" y1="0" x2="20" y2="0" stroke="{THRESHOLD_COLOR}" stroke-width="1.5" stroke-dasharray="6,4"/>"##
        ),
    ];
    let mut labels = vec![escape_xml(&series.series_label), escape_xml(&series.threshold_label)];
    if series.solution.is_some() {
        entries.push(format!(r##"<circle cx="10" cy="0" r="5" fill="{SOLUTION_COLOR}" stroke="#000000"/>"##));
        labels.push("Solution".to_string());
    }

    let height = 14.0 * entries.len() as f64 + 8.0;
    let mut out = format!(
        r##"<rect x="{x:.1}" y="{y:.1}" width="190" height="{height:.1}" fill="#ffffff" fill-opacity="0.85" stroke="{GRID_COLOR}"/>
"##,
        y = MARGIN_TOP + 4.0,
    );
    for (i, (entry, label)) in entries.iter().zip(&labels).enumerate() {
        let y = MARGIN_TOP + 15.0 + 14.0 * i as f64;
        out.push_str(&format!(
            r##"<g transform="translate({gx:.1} {y:.1})">{entry}</g>
<text x="{tx:.1}" y="{ty:.1}" font-size="10">{label}</text>
"##,
            gx = x + 8.0,
            tx = x + 34.0,
            ty = y + 3.5,
        ));
    }
    out
}

fn check_series(series: &ChartSeries, artifact: &str) -> CalcResult<()> {
    if series.points.is_empty() {
        return Err(CalcError::render_failed(artifact, "series has no points"));
    }
    if series
        .points
        .iter()
        .any(|p| !(p.x.is_finite() && p.y.is_finite()) || p.x <= 0.0)
    {
        return Err(CalcError::render_failed(
            artifact,
            "series contains a non-finite value or non-positive section",
        ));
    }
    if !(series.threshold.is_finite() && series.threshold >= 0.0) {
        return Err(CalcError::render_failed(artifact, "threshold is not a finite non-negative value"));
    }
    Ok(())
}

/// Round a raw tick step up to 1, 2 or 5 × 10^n.
fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape_xml(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
