//! Clustering configuration.
//!
//! `ClusterConfig` is designed to be easily serializable and loadable from
//! JSON or TOML, so a rendering layer can ship its clustering parameters next
//! to the rest of its style configuration.
use crate::error::{ClusterError, Result};
use geocluster_types::bbox::ViewBox;
use serde::{Deserialize, Serialize};

/// Highest zoom level the index can be built for.
pub const MAX_SUPPORTED_ZOOM: u8 = 24;

/// Clustering configuration.
///
/// # Example
///
/// ```rust
/// use geocluster::ClusterConfig;
///
/// let config = ClusterConfig::default();
/// assert_eq!(config.max_zoom, 16);
///
/// let json = r#"{ "radius": 60, "max_zoom": 14 }"#;
/// let config = ClusterConfig::from_json(json).unwrap();
/// assert_eq!(config.radius, 60.0);
/// assert_eq!(config.pick_limit, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Clustering radius in screen pixels
    #[serde(default = "ClusterConfig::default_radius")]
    pub radius: f64,

    /// Tile extent the radius is measured against
    #[serde(default = "ClusterConfig::default_extent")]
    pub extent: u32,

    /// Coarsest zoom level that gets its own clustering pass
    #[serde(default)]
    pub min_zoom: u8,

    /// Finest zoom level that still clusters; above it every point is a leaf
    #[serde(default = "ClusterConfig::default_max_zoom")]
    pub max_zoom: u8,

    /// Minimum number of points needed to form a cluster
    #[serde(default = "ClusterConfig::default_min_points")]
    pub min_points: usize,

    /// Clusters smaller than this are not colour-classified
    #[serde(default = "ClusterConfig::default_min_classify_count")]
    pub min_classify_count: usize,

    /// Default number of member points returned when a cluster is picked
    #[serde(default = "ClusterConfig::default_pick_limit")]
    pub pick_limit: usize,

    /// Viewport used when the caller does not supply one
    #[serde(default)]
    pub world_bounds: ViewBox,
}

impl ClusterConfig {
    const fn default_radius() -> f64 {
        40.0
    }

    const fn default_extent() -> u32 {
        512
    }

    const fn default_max_zoom() -> u8 {
        16
    }

    const fn default_min_points() -> usize {
        2
    }

    const fn default_min_classify_count() -> usize {
        crate::compute::aggregate::MIN_COUNT_TO_CLASSIFY
    }

    const fn default_pick_limit() -> usize {
        25
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_extent(mut self, extent: u32) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_min_classify_count(mut self, count: usize) -> Self {
        self.min_classify_count = count;
        self
    }

    pub fn with_pick_limit(mut self, limit: usize) -> Self {
        self.pick_limit = limit;
        self
    }

    pub fn with_world_bounds(mut self, bounds: ViewBox) -> Self {
        self.world_bounds = bounds;
        self
    }

    /// Options that shape the index itself.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            radius: self.radius,
            extent: self.extent,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            min_points: self.min_points,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.index_options().validate()?;

        if self.pick_limit == 0 {
            return Err(ClusterError::InvalidConfig(
                "Pick limit must be greater than zero".to_string(),
            ));
        }

        if !self.world_bounds.is_finite() || self.world_bounds.south > self.world_bounds.north {
            return Err(ClusterError::InvalidConfig(format!(
                "World bounds are not a valid viewport: {:?}",
                self.world_bounds
            )));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClusterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: ClusterConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ClusterError::Serialization(e.to_string()))
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius: Self::default_radius(),
            extent: Self::default_extent(),
            min_zoom: 0,
            max_zoom: Self::default_max_zoom(),
            min_points: Self::default_min_points(),
            min_classify_count: Self::default_min_classify_count(),
            pick_limit: Self::default_pick_limit(),
            world_bounds: ViewBox::default(),
        }
    }
}

/// Build parameters of one index snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    pub radius: f64,
    pub extent: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub min_points: usize,
}

impl IndexOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "Radius must be finite and positive, got: {}",
                self.radius
            )));
        }

        if self.extent == 0 {
            return Err(ClusterError::InvalidConfig(
                "Extent must be greater than zero".to_string(),
            ));
        }

        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(ClusterError::InvalidConfig(format!(
                "Max zoom must be at most {}, got: {}",
                MAX_SUPPORTED_ZOOM, self.max_zoom
            )));
        }

        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidConfig(format!(
                "Min zoom {} is greater than max zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.min_points < 2 {
            return Err(ClusterError::InvalidConfig(
                "A cluster needs at least two points".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        ClusterConfig::default().index_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClusterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_classify_count, 10);
        assert_eq!(config.world_bounds, ViewBox::new(-180.0, -85.0, 180.0, 85.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClusterConfig::default().with_radius(0.0).validate().is_err());
        assert!(ClusterConfig::default().with_radius(f64::NAN).validate().is_err());
        assert!(ClusterConfig::default().with_zoom_range(5, 4).validate().is_err());
        assert!(ClusterConfig::default().with_zoom_range(0, 30).validate().is_err());
        assert!(ClusterConfig::default().with_min_points(1).validate().is_err());
        assert!(ClusterConfig::default().with_extent(0).validate().is_err());
        assert!(ClusterConfig::default().with_pick_limit(0).validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = ClusterConfig::default().with_radius(75.0).with_pick_limit(10);
        let json = config.to_json().unwrap();
        let loaded = ClusterConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_validation_error() {
        let err = ClusterConfig::from_json(r#"{ "radius": -1 }"#).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidConfig(_)));

        let err = ClusterConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ClusterError::Serialization(_)));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_config() {
        let config = ClusterConfig::from_toml("radius = 80.0\nmax_zoom = 12\n").unwrap();
        assert_eq!(config.radius, 80.0);
        assert_eq!(config.max_zoom, 12);
        assert_eq!(config.extent, 512);
    }
}
