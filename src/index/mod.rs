//! Zoom-aware hierarchical cluster index.
//!
//! [`Snapshot`] is the concrete index: built once, eagerly, over every zoom
//! level, then queried read-only. [`ClusterIndex`] is the seam the
//! presentation and picking layers depend on, so a different clustering
//! strategy can be dropped in behind the same contract.

pub mod node;
mod query;
pub mod snapshot;

pub use node::{ClusterNode, NodeKind, abbreviate_count};
pub use snapshot::Snapshot;

use crate::error::Result;
use geocluster_types::bbox::ViewBox;
use geocluster_types::point::PointRecord;

/// Read-only contract of a built cluster index.
pub trait ClusterIndex {
    /// Id of the build this index represents.
    fn snapshot_id(&self) -> u64;

    /// Flattened frontier of nodes in `bbox` at `floor(zoom)`.
    fn query(&self, bbox: &ViewBox, zoom: f64) -> Result<Vec<ClusterNode>>;

    /// Up to `limit` input points under `cluster_id`, after skipping `offset`.
    fn leaves(&self, cluster_id: u64, limit: usize, offset: usize) -> Result<Vec<&PointRecord>>;

    /// Input point at `index` of the indexed point set.
    fn point(&self, index: usize) -> Option<&PointRecord>;
}

impl ClusterIndex for Snapshot {
    fn snapshot_id(&self) -> u64 {
        self.id()
    }

    fn query(&self, bbox: &ViewBox, zoom: f64) -> Result<Vec<ClusterNode>> {
        Snapshot::query(self, bbox, zoom)
    }

    fn leaves(&self, cluster_id: u64, limit: usize, offset: usize) -> Result<Vec<&PointRecord>> {
        Snapshot::leaves(self, cluster_id, limit, offset)
    }

    fn point(&self, index: usize) -> Option<&PointRecord> {
        Snapshot::point(self, index)
    }
}
