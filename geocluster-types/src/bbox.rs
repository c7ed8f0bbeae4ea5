use serde::{Deserialize, Serialize};

/// A geographic viewport in degrees: west, south, east, north.
///
/// `west` may be greater than `east` when the viewport crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl ViewBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole globe, poles included.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// The Web Mercator world, clipped at ±85° latitude.
    pub fn mercator_world() -> Self {
        Self::new(-180.0, -85.0, 180.0, 85.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Longitudinal span in degrees, ignoring wrap-around.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::mercator_world()
    }
}

impl From<[f64; 4]> for ViewBox {
    fn from([west, south, east, north]: [f64; 4]) -> Self {
        Self::new(west, south, east, north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_array() {
        let bbox = ViewBox::from([-10.0, -5.0, 10.0, 5.0]);
        assert_eq!(bbox.width(), 20.0);
        assert!(bbox.is_finite());
        assert!(!ViewBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    }
}
