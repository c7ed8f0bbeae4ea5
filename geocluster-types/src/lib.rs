//! # geocluster-types
//!
//! Plain data types shared by the geocluster engine and its callers:
//!
//! - **Point types**: `PointRecord`, `PropertyValue`, `Properties`
//! - **Filter types**: `FilterSpec`
//! - **Viewport types**: `ViewBox`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geocluster_types::point::PointRecord;
//! use geocluster_types::filter::FilterSpec;
//!
//! let record = PointRecord::new(-0.1276, 51.5072)
//!     .with_property("masks_always", 12.0)
//!     .with_property("masks_total_responses", "40");
//!
//! let filter = FilterSpec::new("masks", "always");
//! assert_eq!(filter.numerator_key(), "masks_always");
//! assert!(record.get(&filter.denominator_key()).is_some());
//! ```

pub mod bbox;
pub mod filter;
pub mod point;
