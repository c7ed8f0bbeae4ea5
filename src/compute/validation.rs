//! Validation for geographic coordinates and viewports.

use crate::error::{ClusterError, Result};
use geo::Point;
use geocluster_types::bbox::ViewBox;

/// Validates a 2D point has valid longitude and latitude.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geocluster::compute::validation::validate_geographic_point;
/// use geo::Point;
///
/// let nyc = Point::new(-74.0060, 40.7128);
/// assert!(validate_geographic_point(&nyc).is_ok());
///
/// let invalid = Point::new(200.0, 40.0);
/// assert!(validate_geographic_point(&invalid).is_err());
/// ```
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(ClusterError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(ClusterError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a viewport before it is handed to the index.
///
/// Longitudes may lie outside [-180, 180] (they are normalised at query time)
/// but every edge must be finite and south must not exceed north.
///
/// ```
/// use geocluster::compute::validation::validate_viewbox;
/// use geocluster::ViewBox;
///
/// assert!(validate_viewbox(&ViewBox::new(170.0, -10.0, -170.0, 10.0)).is_ok());
/// assert!(validate_viewbox(&ViewBox::new(0.0, 10.0, 1.0, -10.0)).is_err());
/// ```
pub fn validate_viewbox(bbox: &ViewBox) -> Result<()> {
    if !bbox.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Viewport edges must be finite, got: {:?}",
            bbox
        )));
    }

    if bbox.south > bbox.north {
        return Err(ClusterError::InvalidInput(format!(
            "Viewport south edge {} is above north edge {}",
            bbox.south, bbox.north
        )));
    }

    Ok(())
}

/// Validates a floating zoom level.
pub fn validate_zoom(zoom: f64) -> Result<()> {
    if !zoom.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Zoom must be finite, got: {}",
            zoom
        )));
    }
    if zoom < 0.0 {
        return Err(ClusterError::InvalidInput(format!(
            "Zoom must not be negative, got: {}",
            zoom
        )));
    }
    Ok(())
}
