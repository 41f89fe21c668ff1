//! Trip statistics derived from a track-point sequence.
//!
//! Segment classification follows the usual GPS-track convention: the time
//! between two consecutive timestamped points counts as stopped when the
//! segment speed falls below a threshold, otherwise as moving.

use std::io::Write;

use geo::{Distance, Haversine, Point};

use crate::track::TrackPoint;
use crate::{Error, Result};

/// Default speed below which a segment counts as stopped, in m/s.
pub const DEFAULT_STOPPED_SPEED_THRESHOLD: f64 = 0.15;

/// Aggregate figures for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStats {
    /// Time spent moving, in seconds.
    pub moving_time: f64,
    /// Time spent stopped, in seconds.
    pub stopped_time: f64,
    /// Distance covered while moving, in meters.
    pub moving_distance: f64,
    /// Largest segment speed, in m/s.
    pub max_speed: f64,
    /// Number of points in the track, timestamped or not.
    pub point_count: usize,
    /// Elevation extremes; absent when no point carries elevation.
    pub elevation: Option<ElevationExtremes>,
}

/// Minimum and maximum elevation of a track, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationExtremes {
    pub min: f64,
    pub max: f64,
}

impl TrackStats {
    /// Average moving speed in m/s.
    pub fn average_speed(&self) -> f64 {
        if self.moving_time > 0.0 {
            self.moving_distance / self.moving_time
        } else {
            0.0
        }
    }
}

/// Geodesic distance between two track points in meters.
pub fn distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    Haversine.distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    )
}

/// Total geodesic length of the track in meters.
pub fn track_length(points: &[TrackPoint]) -> f64 {
    points.windows(2).map(|pair| distance(&pair[0], &pair[1])).sum()
}

/// Computes the trip totals, classifying segments against
/// `stopped_speed_threshold` (m/s).
///
/// Only consecutive pairs where both points are timestamped contribute to
/// the time and distance figures; segments with a non-positive time delta
/// are skipped. Fewer than two timestamped points is an input error.
pub fn compute(points: &[TrackPoint], stopped_speed_threshold: f64) -> Result<TrackStats> {
    let timed: Vec<&TrackPoint> = points.iter().filter(|p| p.time.is_some()).collect();
    if timed.len() < 2 {
        return Err(Error::TrackTooShort);
    }

    let mut stats = TrackStats {
        moving_time: 0.0,
        stopped_time: 0.0,
        moving_distance: 0.0,
        max_speed: 0.0,
        point_count: points.len(),
        elevation: elevation_extremes(points),
    };

    for pair in timed.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (Some(start), Some(end)) = (a.time, b.time) else {
            continue;
        };

        let seconds = (end - start).num_milliseconds() as f64 / 1000.0;
        if seconds <= 0.0 {
            continue;
        }

        let meters = distance(a, b);
        let speed = meters / seconds;

        if speed < stopped_speed_threshold {
            stats.stopped_time += seconds;
        } else {
            stats.moving_time += seconds;
            stats.moving_distance += meters;
        }
        stats.max_speed = stats.max_speed.max(speed);
    }

    Ok(stats)
}

fn elevation_extremes(points: &[TrackPoint]) -> Option<ElevationExtremes> {
    let mut extremes: Option<ElevationExtremes> = None;

    for elevation in points.iter().filter_map(|p| p.elevation) {
        extremes = Some(match extremes {
            None => ElevationExtremes {
                min: elevation,
                max: elevation,
            },
            Some(e) => ElevationExtremes {
                min: e.min.min(elevation),
                max: e.max.max(elevation),
            },
        });
    }

    extremes
}

/// Splits a span in seconds into whole hours, minutes and seconds.
pub fn split_timespan(seconds: f64) -> (u64, u64, u64) {
    let total = seconds as u64;
    (total / 3600, total % 3600 / 60, total % 60)
}

/// Writes the statistics as the HTML table fragment used for web publishing.
///
/// Requires elevation data; a track without any is an input error.
pub fn write_html_report<W: Write>(mut out: W, stats: &TrackStats) -> Result<()> {
    let elevation = stats.elevation.ok_or(Error::NoElevationData)?;
    let write_error = Error::ReportWrite;

    let (hours, minutes, _) = split_timespan(stats.moving_time);

    writeln!(out, "<table>").map_err(write_error)?;
    writeln!(out, "<tr>").map_err(write_error)?;
    writeln!(
        out,
        "<td>Dauer:</td><td>{hours} Stunden {minutes:02} Minuten</td>"
    )
    .map_err(write_error)?;
    writeln!(
        out,
        "<td>L\u{e4}nge:</td><td>{:.1} km</td>",
        stats.moving_distance / 1000.0
    )
    .map_err(write_error)?;
    writeln!(
        out,
        "<td>Geschwindigkeit:</td><td>{:.1} km/h</td>",
        stats.average_speed() * 3.6
    )
    .map_err(write_error)?;
    writeln!(
        out,
        "<td>H\u{f6}henunterschied:</td><td>{:.1} m</td>",
        elevation.max - elevation.min
    )
    .map_err(write_error)?;
    writeln!(out, "</tr>").map_err(write_error)?;
    writeln!(out, "<tr>").map_err(write_error)?;
    writeln!(out, "<td>Schwierigkeitsgrad:</td><td></td>").map_err(write_error)?;
    writeln!(out, "<td>Kondition:</td><td></td>").map_err(write_error)?;
    writeln!(out, "<td>Ausr\u{fc}stung:</td><td></td>").map_err(write_error)?;
    writeln!(out, "<td></td><td></td>").map_err(write_error)?;
    writeln!(out, "</tr>").map_err(write_error)?;
    writeln!(out, "</table>").map_err(write_error)?;

    Ok(())
}
