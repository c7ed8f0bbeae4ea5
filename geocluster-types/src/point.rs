use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single property value attached to a point record.
///
/// Source datasets are loosely typed: the same column can hold numbers in one
/// row, numeric strings in another and nothing at all in a third. Consumers
/// are expected to parse on read rather than reject on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl PropertyValue {
    /// Returns the number if this value is stored as one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text if this value is stored as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

/// Property mapping of a point record, ordered by key so serialized output is stable.
pub type Properties = BTreeMap<String, PropertyValue>;

/// One geo-tagged input record: a longitude/latitude position plus its properties.
///
/// # Examples
///
/// ```
/// use geocluster_types::point::{PointRecord, PropertyValue};
///
/// let record = PointRecord::new(2.3522, 48.8566).with_property("city", "Paris");
/// assert_eq!(record.lon(), 2.3522);
/// assert_eq!(record.get("city"), Some(&PropertyValue::Text("Paris".into())));
/// assert_eq!(record.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Longitude (x) and latitude (y) in degrees
    pub position: Point<f64>,
    #[serde(default)]
    pub properties: Properties,
}

impl PointRecord {
    /// Create a record with no properties.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            position: Point::new(lon, lat),
            properties: Properties::new(),
        }
    }

    /// Create a record from a position and an existing property map.
    pub fn from_parts(position: Point<f64>, properties: Properties) -> Self {
        Self {
            position,
            properties,
        }
    }

    /// Attach a property, replacing any previous value under the same key.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a property by name.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn lon(&self) -> f64 {
        self.position.x()
    }

    pub fn lat(&self) -> f64 {
        self.position.y()
    }
}
