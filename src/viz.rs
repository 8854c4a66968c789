//! Line chart rendering: one colored series per country, markers at each
//! observation. Output goes to **SVG**, **PNG**, or an in-memory RGB buffer
//! that the dashboard shows as a texture.
//!
//! Missing values break the line. A table without any numeric value still
//! renders axes and legend.

use crate::models::Observation;
use anyhow::{Result, anyhow};
use num_format::{Locale, ToFormattedString};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;
use std::sync::Once;

/// One country's series, split into runs of consecutive numeric values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub iso3: String,
    pub segments: Vec<Vec<(i32, f64)>>,
}

impl Series {
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.segments.iter().flatten().copied()
    }
}

/// Group rows by `iso3`, in order of first appearance.
pub fn series_by_country(points: &[Observation]) -> Vec<Series> {
    // (series, whether its last segment is still open)
    let mut acc: Vec<(Series, bool)> = Vec::new();
    for p in points {
        let idx = match acc.iter().position(|(s, _)| s.iso3 == p.iso3) {
            Some(i) => i,
            None => {
                acc.push((
                    Series {
                        iso3: p.iso3.clone(),
                        segments: Vec::new(),
                    },
                    false,
                ));
                acc.len() - 1
            }
        };
        let (series, open) = &mut acc[idx];
        match p.value {
            Some(v) if v.is_finite() => {
                if *open
                    && let Some(seg) = series.segments.last_mut()
                {
                    seg.push((p.year, v));
                } else {
                    series.segments.push(vec![(p.year, v)]);
                }
                *open = true;
            }
            _ => *open = false,
        }
    }
    acc.into_iter().map(|(s, _)| s).collect()
}

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../assets/DejaVuSans.ttf"),
        );
    });
}

/// Render the chart to `out_path`; `.svg` selects SVG, anything else PNG.
pub fn plot_lines<P: AsRef<Path>>(
    points: &[Observation],
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
) -> Result<()> {
    if points.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let out_path = out_path.as_ref();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(out_path, (width, height)).into_drawing_area();
        draw_chart(root, points, title)
    } else {
        let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
        draw_chart(root, points, title)
    }
}

/// Render the chart into a packed RGB buffer of `width * height * 3` bytes.
pub fn render_rgb(points: &[Observation], width: u32, height: u32, title: &str) -> Result<Vec<u8>> {
    if points.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_chart(root, points, title)?;
    }
    Ok(buf)
}

/// Axis bounds `(min_year, max_year, min_val, max_val)`, padded so that no
/// range is degenerate.
pub fn axis_bounds(points: &[Observation]) -> Option<(i32, i32, f64, f64)> {
    let min_year = points.iter().map(|p| p.year).min()?;
    let max_year = points.iter().map(|p| p.year).max()?;
    let (min_year, max_year) = if min_year == max_year {
        (min_year - 1, max_year + 1)
    } else {
        (min_year, max_year)
    };

    let values: Vec<f64> = points
        .iter()
        .filter_map(|p| p.value)
        .filter(|v| v.is_finite())
        .collect();
    let (min_val, max_val) = if values.is_empty() {
        (0.0, 1.0)
    } else {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
    };
    Some((min_year, max_year, min_val, max_val))
}

/// Tick label: thousands separators for wide ranges, two decimals otherwise.
fn fmt_tick(v: f64, span: f64) -> String {
    if span >= 100.0 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Helper that draws to any Plotters backend.
fn draw_chart<DB>(root: DrawingArea<DB, Shift>, points: &[Observation], title: &str) -> Result<()>
where
    DB: DrawingBackend,
{
    let (min_year, max_year, min_val, max_val) =
        axis_bounds(points).ok_or_else(|| anyhow!("no data to plot"))?;
    let span = max_val - min_val;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    // Widest tick label decides the left label area.
    let widest = [min_val, max_val]
        .iter()
        .map(|v| fmt_tick(*v, span).len())
        .max()
        .unwrap_or(1) as u32;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 22))
        .set_label_area_size(LabelAreaPosition::Left, 30 + widest * 8)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(min_year..max_year, min_val..max_val)
        .map_err(|e| anyhow!("{:?}", e))?;

    let y_label_fmt = |v: &f64| fmt_tick(*v, span);
    let x_label_fmt = |y: &i32| y.to_string();
    let x_label_count = ((max_year - min_year + 1) as usize).min(12);

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Value")
        .x_labels(x_label_count)
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (idx, series) in series_by_country(points).iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();

        for seg in series.segments.iter().filter(|s| s.len() > 1) {
            chart
                .draw_series(LineSeries::new(seg.iter().copied(), color.stroke_width(2)))
                .map_err(|e| anyhow!("{:?}", e))?;
        }

        // Markers carry the legend entry so it exists even for empty series.
        chart
            .draw_series(
                series
                    .points()
                    .map(|(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?
            .label(series.iso3.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.85))
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
