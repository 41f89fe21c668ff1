//! Track points and the transformations between decoded FIT messages and an
//! ordered point sequence.

use chrono::{DateTime, Utc};
use log::debug;

use crate::units::semicircles_to_degrees;
use crate::{Error, Result};

/// One decoded entry of the FIT "record" message category.
///
/// Every field the decoder may or may not have seen is an explicit `Option`;
/// a record is a position fix only when both coordinates are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMessage {
    /// Latitude in semicircles.
    pub position_lat: Option<i32>,
    /// Longitude in semicircles.
    pub position_long: Option<i32>,
    /// Altitude in meters.
    pub enhanced_altitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RecordMessage {
    /// The validity gate for extraction: records without both coordinates
    /// are dropped, whatever else they carry.
    pub fn has_position(&self) -> bool {
        self.position_lat.is_some() && self.position_long.is_some()
    }
}

/// The typed decode result of one FIT activity file.
#[derive(Debug, Clone, Default)]
pub struct FitMessages {
    /// Record messages in recording order.
    pub records: Vec<RecordMessage>,
    /// Sport of the activity, from the first sport message.
    pub sport: Option<String>,
}

/// One resolved geographic sample of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Elevation in meters.
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

/// Extracts the track points from decoded FIT messages, in recording order.
///
/// Records without a full position fix are dropped silently. No
/// deduplication, no interpolation, no ordering or plausibility checks:
/// whatever the device recorded passes through. A file without any record
/// messages is a decoder/schema mismatch and fails instead of yielding an
/// empty track.
pub fn points_from_messages(messages: &FitMessages) -> Result<Vec<TrackPoint>> {
    if messages.records.is_empty() {
        return Err(Error::NoRecordMessages);
    }

    let mut points = Vec::with_capacity(messages.records.len());
    let mut dropped = 0usize;

    for record in &messages.records {
        let (Some(lat), Some(lon)) = (record.position_lat, record.position_long) else {
            dropped += 1;
            continue;
        };

        points.push(TrackPoint {
            latitude: semicircles_to_degrees(lat as i64),
            longitude: semicircles_to_degrees(lon as i64),
            elevation: record.enhanced_altitude,
            time: record.timestamp,
        });
    }

    if dropped > 0 {
        debug!("dropped {dropped} records without a position fix");
    }

    Ok(points)
}

/// Removes `remove_begin` points from the start and `remove_end` points from
/// the end of the track. Both trims apply to the original sequence, order is
/// preserved, and over-trimming yields an empty track rather than an error.
pub fn trim_points(
    points: &[TrackPoint],
    remove_begin: usize,
    remove_end: usize,
) -> Vec<TrackPoint> {
    let mut trimmed = points;

    if remove_begin > 0 {
        trimmed = trimmed.get(remove_begin..).unwrap_or(&[]);
    }

    if remove_end > 0 {
        trimmed = &trimmed[..trimmed.len().saturating_sub(remove_end)];
    }

    trimmed.to_vec()
}

/// Bounding box of a track in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl TrackBounds {
    /// Center of the bounding box as `(latitude, longitude)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }
}

/// Bounding box over all points, or `None` for an empty track.
pub fn bounds(points: &[TrackPoint]) -> Option<TrackBounds> {
    let first = points.first()?;
    let mut bounds = TrackBounds {
        min_latitude: first.latitude,
        max_latitude: first.latitude,
        min_longitude: first.longitude,
        max_longitude: first.longitude,
    };

    for point in &points[1..] {
        bounds.min_latitude = bounds.min_latitude.min(point.latitude);
        bounds.max_latitude = bounds.max_latitude.max(point.latitude);
        bounds.min_longitude = bounds.min_longitude.min(point.longitude);
        bounds.max_longitude = bounds.max_longitude.max(point.longitude);
    }

    Some(bounds)
}
