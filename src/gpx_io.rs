//! GPX input and output, delegated to the `gpx` crate.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use geo::Point;
use gpx::{Gpx, GpxVersion, Time, Track, TrackSegment, Waypoint};
use time::OffsetDateTime;

use crate::track::TrackPoint;
use crate::{Error, Result};

const CREATOR: &str = "fittrack";

/// Builds a single-track, single-segment GPX 1.1 document.
pub fn build_gpx(name: &str, sport: Option<&str>, points: &[TrackPoint]) -> Gpx {
    let mut segment = TrackSegment::default();
    segment.points = points.iter().map(waypoint).collect();

    let mut track = Track::default();
    track.name = Some(name.to_string());
    track.type_ = sport.map(str::to_string);
    track.segments.push(segment);

    let mut gpx = Gpx::default();
    gpx.version = GpxVersion::Gpx11;
    gpx.creator = Some(CREATOR.to_string());
    gpx.tracks.push(track);
    gpx
}

/// Writes the track to a GPX file.
pub fn write_track(
    path: &Path,
    name: &str,
    sport: Option<&str>,
    points: &[TrackPoint],
) -> Result<()> {
    let gpx = build_gpx(name, sport, points);
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    gpx::write(&gpx, BufWriter::new(file)).map_err(|e| Error::GpxWrite(e.to_string()))
}

/// Reads a GPX file and flattens all tracks and segments into one point
/// sequence in document order.
pub fn read_track_points(path: &Path) -> Result<Vec<TrackPoint>> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let gpx = gpx::read(BufReader::new(file)).map_err(|e| Error::GpxRead(e.to_string()))?;
    Ok(flatten(gpx))
}

/// Track points of a parsed GPX document, in document order.
pub fn flatten(gpx: Gpx) -> Vec<TrackPoint> {
    let mut points = Vec::new();

    for track in gpx.tracks {
        for segment in track.segments {
            for wp in segment.points {
                points.push(TrackPoint {
                    latitude: wp.point().y(),
                    longitude: wp.point().x(),
                    elevation: wp.elevation,
                    time: wp.time.and_then(to_chrono),
                });
            }
        }
    }

    points
}

fn waypoint(point: &TrackPoint) -> Waypoint {
    let mut wp = Waypoint::new(Point::new(point.longitude, point.latitude));
    wp.elevation = point.elevation;
    wp.time = point.time.and_then(|t| {
        OffsetDateTime::from_unix_timestamp(t.timestamp())
            .ok()
            .map(Time::from)
    });
    wp
}

// gpx::Time wraps time::OffsetDateTime; go through its RFC 3339 rendering
// to reach chrono.
fn to_chrono(time: Time) -> Option<DateTime<Utc>> {
    let formatted = time.format().ok()?;
    DateTime::parse_from_rfc3339(&formatted)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
