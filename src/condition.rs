//! Track conditioning before publishing: point reduction and smoothing.
//!
//! Both passes preserve order and never invent points; endpoints always
//! survive.

use crate::stats::{distance, track_length};
use crate::track::TrackPoint;

/// Default minimum spacing between kept points, in meters.
pub const DEFAULT_MIN_SPACING: f64 = 10.0;

/// Thins the track to at most `max_points`, dropping interior points closer
/// than `min_spacing` meters to the last kept one. When the cap demands a
/// wider spacing than requested, the spacing widens accordingly.
pub fn reduce_points(
    points: &[TrackPoint],
    max_points: usize,
    min_spacing: f64,
) -> Vec<TrackPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut spacing = min_spacing;
    if max_points >= 2 {
        let cap_spacing = track_length(points) / max_points as f64;
        if cap_spacing > spacing {
            spacing = cap_spacing;
        }
    }

    let last_index = points.len() - 1;
    let mut reduced = vec![points[0].clone()];

    for point in &points[1..last_index] {
        if distance(reduced.last().unwrap(), point) >= spacing {
            reduced.push(point.clone());
        }
    }

    reduced.push(points[last_index].clone());
    reduced
}

/// Smooths interior elevations with a 0.3/0.4/0.3 neighbor average.
///
/// Points whose neighborhood is missing an elevation are left untouched, as
/// are the endpoints.
pub fn smooth_elevations(points: &mut [TrackPoint]) {
    if points.len() < 3 {
        return;
    }

    let original: Vec<Option<f64>> = points.iter().map(|p| p.elevation).collect();

    for i in 1..points.len() - 1 {
        if let (Some(prev), Some(current), Some(next)) =
            (original[i - 1], original[i], original[i + 1])
        {
            points[i].elevation = Some(0.3 * prev + 0.4 * current + 0.3 * next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    fn point(lat: f64, elevation: Option<f64>) -> TrackPoint {
        TrackPoint {
            latitude: lat,
            longitude: 14.0,
            elevation,
            time: None,
        }
    }

    // 0.0001 degrees of latitude is roughly 11 m.
    fn dense_track(n: usize) -> Vec<TrackPoint> {
        (0..n)
            .map(|i| point(50.0 + i as f64 * 0.0001, Some(100.0 + i as f64)))
            .collect()
    }

    #[test]
    fn test_reduce_keeps_endpoints() {
        let points = dense_track(50);
        let reduced = reduce_points(&points, 10, DEFAULT_MIN_SPACING);

        assert_eq!(reduced.first(), points.first());
        assert_eq!(reduced.last(), points.last());
    }

    #[test]
    fn test_reduce_respects_point_cap() {
        let points = dense_track(200);
        let reduced = reduce_points(&points, 10, DEFAULT_MIN_SPACING);
        // the cap widens the spacing; endpoints may add one extra
        assert!(reduced.len() <= 11, "got {}", reduced.len());
        assert!(reduced.len() >= 3);
    }

    #[test]
    fn test_reduce_enforces_minimum_spacing() {
        let points = dense_track(50);
        let reduced = reduce_points(&points, 1000, 30.0);

        for pair in reduced.windows(2) {
            // the closing segment to the last point may be arbitrarily short
            if pair[1] != *reduced.last().unwrap() {
                assert!(distance(&pair[0], &pair[1]) >= 30.0);
            }
        }
    }

    #[test]
    fn test_reduce_preserves_order() {
        let points = dense_track(50);
        let reduced = reduce_points(&points, 10, DEFAULT_MIN_SPACING);

        let latitudes: Vec<f64> = reduced.iter().map(|p| p.latitude).collect();
        let mut sorted = latitudes.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(latitudes, sorted);
    }

    #[test]
    fn test_reduce_of_tiny_track_is_identity() {
        let points = dense_track(2);
        assert_eq!(reduce_points(&points, 1, 1000.0), points);
    }

    #[test]
    fn test_smooth_averages_interior_elevations() {
        let mut points = vec![
            point(50.0, Some(100.0)),
            point(50.1, Some(200.0)),
            point(50.2, Some(100.0)),
        ];
        smooth_elevations(&mut points);

        assert_eq!(points[0].elevation, Some(100.0));
        assert_float_absolute_eq!(points[1].elevation.unwrap(), 140.0, 1e-9);
        assert_eq!(points[2].elevation, Some(100.0));
    }

    #[test]
    fn test_smooth_skips_points_with_incomplete_neighborhood() {
        let mut points = vec![
            point(50.0, None),
            point(50.1, Some(200.0)),
            point(50.2, Some(100.0)),
        ];
        smooth_elevations(&mut points);
        assert_eq!(points[1].elevation, Some(200.0));
    }

    #[test]
    fn test_smooth_keeps_point_count() {
        let mut points = dense_track(20);
        smooth_elevations(&mut points);
        assert_eq!(points.len(), 20);
    }
}
