//! Spherical Mercator projection onto the unit square.
//!
//! Longitude maps linearly onto `x` in `[0, 1]`; latitude maps onto `y` in
//! `[0, 1]` with north at `0`. Latitudes beyond roughly ±85.05° clamp to the
//! square's edges. Clustering distances are measured in this space so that a
//! pixel radius means the same thing everywhere on screen.

use std::f64::consts::PI;

/// Project a longitude in degrees to `x`.
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Project a latitude in degrees to `y`, clamped to `[0, 1]`.
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Inverse of [`lng_x`].
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Inverse of [`lat_y`].
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_round_trip() {
        for &(lng, lat) in &[(0.0, 0.0), (-74.006, 40.7128), (139.69, 35.68), (179.9, -60.0)] {
            assert!((x_lng(lng_x(lng)) - lng).abs() < EPSILON);
            assert!((y_lat(lat_y(lat)) - lat).abs() < EPSILON);
        }
    }

    #[test]
    fn test_poles_clamp() {
        assert_eq!(lat_y(90.0), 0.0);
        assert_eq!(lat_y(-90.0), 1.0);
        assert_eq!(lng_x(-180.0), 0.0);
        assert_eq!(lng_x(180.0), 1.0);
        assert!((lat_y(0.0) - 0.5).abs() < EPSILON);
    }
}
