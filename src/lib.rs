//! Zoom-aware clustering of geo-tagged point records, with per-cluster
//! filtered percentages for marker selection.
//!
//! ## Overview
//! - **Index**: an immutable [`Snapshot`] holding a greedy hierarchical clustering for
//!   every integer zoom level, built eagerly and queried read-only
//! - **View control**: [`ViewController`] decides between rebuilding and re-querying,
//!   and caches the last frontier per zoom
//! - **Presentation**: [`ClusterPresenter`] turns nodes into marker codes and icon sizes
//! - **Picking**: [`PickingResolver`] turns a picked node into a point or a member preview
//!
//! ```rust
//! use geocluster::prelude::*;
//! use std::sync::Arc;
//!
//! let points: Arc<[PointRecord]> = (0..40)
//!     .map(|i| {
//!         PointRecord::new(-0.12 + i as f64 * 1e-4, 51.5)
//!             .with_property("masks_always", 3)
//!             .with_property("masks_total_responses", 4)
//!     })
//!     .collect();
//!
//! let config = ClusterConfig::default();
//! let mut view = ViewController::new(config.clone());
//! view.update(LayerParams::from_config(points, &config), ChangeFlags::data_changed())?;
//!
//! let snapshot = view.snapshot().unwrap();
//! let nodes = view.view_clusters(4.0)?;
//! let filter = FilterSpec::new("masks", "always");
//! let marker = ClusterPresenter::from_config(&config).present(&nodes[0], &filter, snapshot.as_ref())?;
//! assert_eq!(marker.icon_name(), "marker-75");
//!
//! let picked = PickingResolver::from_config(&config).resolve(snapshot.as_ref(), &nodes[0], PickMode::Click)?;
//! assert_eq!(picked.properties().len(), 25);
//! # Ok::<(), geocluster::ClusterError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
#[cfg(feature = "geojson")]
pub mod export;
pub mod index;
pub mod picking;
pub mod present;
pub mod sync;
pub mod view;

pub use config::{ClusterConfig, IndexOptions};
pub use error::{ClusterError, Result};

pub use compute::aggregate::{FilterSums, MarkerCode, classify, classify_point};
pub use index::{ClusterIndex, ClusterNode, NodeKind, Snapshot};
pub use picking::{PickMode, PickResult, PickingResolver};
pub use present::{ClusterPresenter, Presentation};
pub use sync::SnapshotCell;
pub use view::{ChangeFlags, ControllerStats, LayerParams, ViewController, ViewState, should_rebuild};

pub use geo::Point;
pub use geocluster_types::bbox::ViewBox;
pub use geocluster_types::filter::FilterSpec;
pub use geocluster_types::point::{PointRecord, Properties, PropertyValue};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterConfig, ClusterError, IndexOptions, Result};

    pub use crate::{FilterSpec, PointRecord, PropertyValue, ViewBox};

    pub use crate::{ChangeFlags, LayerParams, ViewController};

    pub use crate::{ClusterIndex, ClusterNode, NodeKind, Snapshot};

    pub use crate::{ClusterPresenter, MarkerCode, PickMode, PickResult, PickingResolver};

    pub use crate::SnapshotCell;
}
