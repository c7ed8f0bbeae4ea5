//! Pure computation used by the index and the presentation layer.
//!
//! - Filtered percentage aggregation and marker classification
//! - Web Mercator projection helpers
//! - Coordinate and viewport validation
//!
//! Nothing in here holds state; every function is a pure function of its inputs.

pub mod aggregate;
pub mod spatial;
pub mod validation;

pub use aggregate::{FilterSums, MarkerCode, classify, classify_point, classify_with_min};
