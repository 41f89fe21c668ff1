//! Garmin semicircle angle conversions.
//!
//! FIT position fields store angles as signed fixed-point "semicircles":
//! 2^31 semicircles equal a half circle of 180 degrees.

const SEMICIRCLES_PER_HALF_CIRCLE: f64 = 2_147_483_648.0;

/// Converts semicircles to degrees.
pub fn semicircles_to_degrees(semicircles: i64) -> f64 {
    semicircles as f64 * 180.0 / SEMICIRCLES_PER_HALF_CIRCLE
}

/// Converts degrees to semicircles, truncating toward zero.
pub fn degrees_to_semicircles(degrees: f64) -> i64 {
    (degrees * SEMICIRCLES_PER_HALF_CIRCLE / 180.0) as i64
}
