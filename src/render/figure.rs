//! Filled-contour figure composition as an SVG document
//!
//! All lengths are in points (1/72 inch). The plot area keeps equal x/y
//! scaling, a vertical colorbar sits to its right, and the document is sized
//! to its content plus a thin margin.

use super::colormap::{to_hex, Colormap};
use super::isobands::superlevel_rings;
use super::levels::{format_level, nice_levels, DEFAULT_BINS};
use crate::dataset::{Axes, RasterField};
use crate::errors::{GlacierVisError, Result};
use chrono::Utc;
use std::fmt::Write;

const POINTS_PER_INCH: f64 = 72.0;
const FONT_SIZE: f64 = 11.0;
const TICK_LENGTH: f64 = 4.0;
const LEFT_GUTTER: f64 = 70.0;
const BOTTOM_GUTTER: f64 = 42.0;
const TOP_GUTTER: f64 = 8.0;
const COLORBAR_TEXT: f64 = 62.0;

/// Figure geometry
#[derive(Debug, Clone, PartialEq)]
pub struct FigureLayout {
    pub width_in: f64,
    pub height_in: f64,
    /// Colorbar length divided by its thickness
    pub colorbar_aspect: f64,
    /// Gap between plot and colorbar as a fraction of the plot width
    pub colorbar_pad: f64,
    /// Whitespace kept around the content, in points
    pub margin: f64,
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self {
            width_in: 15.0,
            height_in: 7.5,
            colorbar_aspect: 50.0,
            colorbar_pad: 0.02,
            margin: 7.2,
        }
    }
}

/// Everything needed to draw one field
#[derive(Debug, Clone)]
pub struct PlotSpec {
    pub colormap: Colormap,
    pub colorbar_label: String,
    pub x_label: String,
    pub y_label: String,
    pub layout: FigureLayout,
    /// Explicit contour levels; chosen automatically when `None`
    pub levels: Option<Vec<f64>>,
}

impl PlotSpec {
    pub fn new(colormap: Colormap, colorbar_label: impl Into<String>) -> Self {
        Self {
            colormap,
            colorbar_label: colorbar_label.into(),
            x_label: "x (m)".to_string(),
            y_label: "y (m)".to_string(),
            layout: FigureLayout::default(),
            levels: None,
        }
    }
}

/// Maps a coordinate linearly onto one plot edge.
#[derive(Debug, Clone, Copy)]
struct AxisMap {
    lo: f64,
    hi: f64,
    start: f64,
    length: f64,
}

impl AxisMap {
    fn new(values: &[f64], start: f64, length: f64) -> Self {
        let (lo, hi) = finite_bounds(values).unwrap_or((0.0, 0.0));
        Self {
            lo,
            hi,
            start,
            length,
        }
    }

    /// Distance of `value` from `start`, scaled into `[0, length]`
    fn offset(&self, value: f64) -> f64 {
        if self.hi > self.lo {
            (value - self.lo) / (self.hi - self.lo) * self.length
        } else {
            self.length / 2.0
        }
    }

    fn position(&self, value: f64) -> f64 {
        self.start + self.offset(value)
    }
}

fn finite_bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Width of the data range, 1 for a degenerate axis
fn data_span(values: &[f64]) -> f64 {
    match finite_bounds(values) {
        Some((lo, hi)) if hi > lo => hi - lo,
        _ => 1.0,
    }
}

/// Screen position of a fractional grid index, interpolated between node positions
fn along(positions: &[f64], index: f64) -> f64 {
    match positions.len() {
        0 => 0.0,
        1 => positions[0],
        n => {
            let i = (index.floor().max(0.0) as usize).min(n - 2);
            let frac = index - i as f64;
            positions[i] + frac * (positions[i + 1] - positions[i])
        }
    }
}

fn finite_range(field: &RasterField) -> Option<(f64, f64)> {
    field
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| f64::from(v))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Composes the filled-contour figure of `field` over `axes`.
///
/// # Errors
///
/// [`GlacierVisError::ShapeMismatch`] when the field is not `(len(y), len(x))`,
/// [`GlacierVisError::AllMissing`] when it has no finite sample.
pub fn compose_svg(axes: &Axes, field: &RasterField, spec: &PlotSpec) -> Result<String> {
    let expected = (axes.y.len(), axes.x.len());
    if field.dim() != expected {
        return Err(GlacierVisError::ShapeMismatch {
            field: spec.colorbar_label.clone(),
            expected,
            found: field.dim(),
        });
    }

    let (data_min, data_max) =
        finite_range(field).ok_or_else(|| GlacierVisError::AllMissing {
            field: spec.colorbar_label.clone(),
        })?;
    let levels = match &spec.levels {
        Some(levels) if levels.len() >= 2 => levels.clone(),
        _ => nice_levels(data_min, data_max, DEFAULT_BINS),
    };
    if levels.len() < 2 {
        return Err(GlacierVisError::RenderError(format!(
            "cannot derive contour levels for range [{data_min}, {data_max}]"
        )));
    }

    let mut svg = String::new();
    write_document(&mut svg, axes, field, spec, &levels)
        .map_err(|e| GlacierVisError::RenderError(e.to_string()))?;
    Ok(svg)
}

fn write_document(
    svg: &mut String,
    axes: &Axes,
    field: &RasterField,
    spec: &PlotSpec,
    levels: &[f64],
) -> std::fmt::Result {
    let layout = &spec.layout;
    let x_values = axes.x.to_vec();
    let y_values = axes.y.to_vec();

    // Equal scaling: fit the data aspect ratio into the room left for the axes.
    let figure_w = layout.width_in * POINTS_PER_INCH;
    let figure_h = layout.height_in * POINTS_PER_INCH;
    let avail_h = (figure_h - TOP_GUTTER - BOTTOM_GUTTER).max(1.0);
    let colorbar_room = avail_h / layout.colorbar_aspect + COLORBAR_TEXT;
    let avail_w = (figure_w - LEFT_GUTTER - colorbar_room) / (1.0 + layout.colorbar_pad.max(0.0));
    let (span_x, span_y) = (data_span(&x_values), data_span(&y_values));
    let scale = (avail_w.max(1.0) / span_x).min(avail_h / span_y);
    let (plot_w, plot_h) = (span_x * scale, span_y * scale);

    let plot_left = layout.margin + LEFT_GUTTER;
    let plot_top = layout.margin + TOP_GUTTER;
    let bar_left = plot_left + plot_w + layout.colorbar_pad.max(0.0) * plot_w;
    let bar_w = plot_h / layout.colorbar_aspect;
    let doc_w = bar_left + bar_w + COLORBAR_TEXT + layout.margin;
    let doc_h = plot_top + plot_h + BOTTOM_GUTTER + layout.margin;

    let x_map = AxisMap::new(&x_values, plot_left, plot_w);
    // Screen y grows downward, so the top edge maps from the largest coordinate.
    let y_map = AxisMap::new(&y_values, plot_top, plot_h);
    let screen_y = |value: f64| plot_top + plot_h - y_map.offset(value);
    let column_x: Vec<f64> = x_values.iter().map(|&v| x_map.position(v)).collect();
    let row_y: Vec<f64> = y_values.iter().map(|&v| screen_y(v)).collect();

    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{doc_w:.2}" height="{doc_h:.2}" viewBox="0 0 {doc_w:.2} {doc_h:.2}">"#
    )?;
    writeln!(
        svg,
        "<desc>Created by glaciervis on {}</desc>",
        Utc::now().to_rfc3339()
    )?;
    writeln!(
        svg,
        r#"<rect x="0" y="0" width="{doc_w:.2}" height="{doc_h:.2}" fill="white"/>"#
    )?;

    // Filled bands, lowest first; each covers {f >= lower level}.
    let bands = levels.len() - 1;
    for (band, &level) in levels[..bands].iter().enumerate() {
        let rings = superlevel_rings(field, level);
        if rings.is_empty() {
            continue;
        }
        let color = spec.colormap.color_at((band as f64 + 0.5) / bands as f64);
        write!(svg, r#"<path fill="{}" fill-rule="evenodd" d=""#, to_hex(color))?;
        for ring in &rings {
            for (k, p) in ring.iter().enumerate() {
                let cmd = if k == 0 { 'M' } else { 'L' };
                write!(
                    svg,
                    "{cmd}{:.2} {:.2} ",
                    along(&column_x, p.x),
                    along(&row_y, p.y)
                )?;
            }
            svg.push('Z');
        }
        writeln!(svg, r#""/>"#)?;
    }

    // Axes frame, ticks and labels.
    writeln!(
        svg,
        r#"<rect x="{plot_left:.3}" y="{plot_top:.3}" width="{plot_w:.3}" height="{plot_h:.3}" fill="none" stroke="black" stroke-width="0.8"/>"#
    )?;
    let font = format!(r#"font-family="sans-serif" font-size="{FONT_SIZE}""#);
    let plot_bottom = plot_top + plot_h;

    for tick in axis_ticks(&x_map) {
        let x = x_map.position(tick);
        writeln!(
            svg,
            r#"<line x1="{x:.3}" y1="{plot_bottom:.3}" x2="{x:.3}" y2="{:.3}" stroke="black" stroke-width="0.8"/>"#,
            plot_bottom + TICK_LENGTH
        )?;
        writeln!(
            svg,
            r#"<text x="{x:.3}" y="{:.3}" text-anchor="middle" {font}>{}</text>"#,
            plot_bottom + TICK_LENGTH + FONT_SIZE + 2.0,
            format_level(tick)
        )?;
    }
    for tick in axis_ticks(&y_map) {
        let y = screen_y(tick);
        writeln!(
            svg,
            r#"<line x1="{:.3}" y1="{y:.3}" x2="{plot_left:.3}" y2="{y:.3}" stroke="black" stroke-width="0.8"/>"#,
            plot_left - TICK_LENGTH
        )?;
        writeln!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" text-anchor="end" {font}>{}</text>"#,
            plot_left - TICK_LENGTH - 2.0,
            y + FONT_SIZE / 3.0,
            format_level(tick)
        )?;
    }
    writeln!(
        svg,
        r#"<text x="{:.3}" y="{:.3}" text-anchor="middle" {font}>{}</text>"#,
        plot_left + plot_w / 2.0,
        plot_bottom + BOTTOM_GUTTER - 6.0,
        escape(&spec.x_label)
    )?;
    let y_label_x = plot_left - LEFT_GUTTER + FONT_SIZE;
    let y_label_y = plot_top + plot_h / 2.0;
    writeln!(
        svg,
        r#"<text x="{y_label_x:.3}" y="{y_label_y:.3}" text-anchor="middle" transform="rotate(-90 {y_label_x:.3} {y_label_y:.3})" {font}>{}</text>"#,
        escape(&spec.y_label)
    )?;

    // Colorbar, first band at the bottom.
    let band_h = plot_h / bands as f64;
    for band in 0..bands {
        let color = spec.colormap.color_at((band as f64 + 0.5) / bands as f64);
        writeln!(
            svg,
            r#"<rect x="{bar_left:.3}" y="{:.3}" width="{bar_w:.3}" height="{band_h:.3}" fill="{}" shape-rendering="crispEdges"/>"#,
            plot_bottom - (band as f64 + 1.0) * band_h,
            to_hex(color)
        )?;
    }
    writeln!(
        svg,
        r#"<rect x="{bar_left:.3}" y="{plot_top:.3}" width="{bar_w:.3}" height="{plot_h:.3}" fill="none" stroke="black" stroke-width="0.8"/>"#
    )?;
    let bar_right = bar_left + bar_w;
    for (k, level) in levels.iter().enumerate() {
        let y = plot_bottom - k as f64 * band_h;
        writeln!(
            svg,
            r#"<line x1="{bar_right:.3}" y1="{y:.3}" x2="{:.3}" y2="{y:.3}" stroke="black" stroke-width="0.8"/>"#,
            bar_right + TICK_LENGTH
        )?;
        writeln!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" {font}>{}</text>"#,
            bar_right + TICK_LENGTH + 2.0,
            y + FONT_SIZE / 3.0,
            format_level(*level)
        )?;
    }
    let cb_label_x = bar_right + COLORBAR_TEXT - FONT_SIZE / 2.0;
    writeln!(
        svg,
        r#"<text x="{cb_label_x:.3}" y="{y_label_y:.3}" text-anchor="middle" transform="rotate(90 {cb_label_x:.3} {y_label_y:.3})" {font}>{}</text>"#,
        escape(&spec.colorbar_label)
    )?;

    writeln!(svg, "</svg>")
}

/// Round tick positions that fall inside the mapped data range
fn axis_ticks(map: &AxisMap) -> Vec<f64> {
    if map.hi <= map.lo {
        return vec![map.lo];
    }
    nice_levels(map.lo, map.hi, 6)
        .into_iter()
        .filter(|t| *t >= map.lo && *t <= map.hi)
        .collect()
}
