//! Altitude profile rendering.
//!
//! Draws distance (km) against elevation (m) into a PNG, the chart used on
//! the published tour pages.

use std::path::Path;

use plotters::prelude::*;

use crate::stats::distance;
use crate::track::TrackPoint;
use crate::{Error, Result};

const FILL: RGBColor = RGBColor(0x99, 0x99, 0xC0);

/// Renders the altitude profile of the track to `path`.
pub fn render_altitude_profile(
    points: &[TrackPoint],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let series = distance_elevation_series(points);
    if series.len() < 2 {
        return Err(Error::NoElevationData);
    }

    let (y_min, y_max) = elevation_axis_range(&series);
    // a degenerate single-spot track still gets a drawable x axis
    let x_max = series.last().map(|(d, _)| *d).unwrap_or(0.0).max(0.1);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Entfernung in km")
        .y_desc("H\u{f6}he in m")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(AreaSeries::new(series.iter().copied(), y_min, FILL.mix(0.8)))
        .map_err(render_error)?;
    chart
        .draw_series(LineSeries::new(series.iter().copied(), &BLUE))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

/// Cumulative distance from start (km) and elevation (m) per point.
///
/// Distance accumulates over every point; points without elevation
/// contribute distance but no sample.
pub fn distance_elevation_series(points: &[TrackPoint]) -> Vec<(f64, f64)> {
    let mut series = Vec::with_capacity(points.len());
    let mut from_start = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            from_start += distance(&points[i - 1], point);
        }
        if let Some(elevation) = point.elevation {
            series.push((from_start / 1000.0, elevation));
        }
    }

    series
}

/// Elevation axis limits: extremes snapped outward to 50 m steps, with a
/// minimum span of 200 m so flat tracks do not become noise.
fn elevation_axis_range(series: &[(f64, f64)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(_, elevation) in series {
        min = min.min(elevation);
        max = max.max(elevation);
    }

    let y_min = (min / 50.0).floor() * 50.0;
    let mut y_max = (max / 50.0).ceil() * 50.0;
    if y_max - y_min < 200.0 {
        y_max = y_min + 200.0;
    }

    (y_min, y_max)
}

fn render_error<E: std::fmt::Display>(error: E) -> Error {
    Error::Render(error.to_string())
}
