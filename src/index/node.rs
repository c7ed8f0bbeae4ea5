//! Nodes returned by index queries.

use geo::Point;
use serde::{Deserialize, Serialize};

/// What a [`ClusterNode`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Exactly one input point, by its position in the snapshot's point slice.
    Leaf { point_index: usize },
    /// Two or more input points merged at some zoom level.
    Cluster { id: u64, point_count: usize },
}

/// One entry of the flattened frontier returned for a viewport and zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    /// Id of the snapshot that produced this node.
    pub snapshot_id: u64,
    /// Original position for leaves, weighted centroid for clusters.
    pub coordinate: Point<f64>,
    pub kind: NodeKind,
}

impl ClusterNode {
    pub fn is_cluster(&self) -> bool {
        matches!(self.kind, NodeKind::Cluster { .. })
    }

    /// Cluster id, or the point index for a leaf.
    pub fn id(&self) -> u64 {
        match self.kind {
            NodeKind::Leaf { point_index } => point_index as u64,
            NodeKind::Cluster { id, .. } => id,
        }
    }

    pub fn cluster_id(&self) -> Option<u64> {
        match self.kind {
            NodeKind::Cluster { id, .. } => Some(id),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn point_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { point_index } => Some(point_index),
            NodeKind::Cluster { .. } => None,
        }
    }

    /// Number of input points represented; `1` for a leaf.
    pub fn point_count(&self) -> usize {
        match self.kind {
            NodeKind::Leaf { .. } => 1,
            NodeKind::Cluster { point_count, .. } => point_count,
        }
    }

    pub fn point_count_abbreviated(&self) -> String {
        abbreviate_count(self.point_count())
    }
}

/// Short label for a member count: `"950"`, `"1.2k"`, `"12k"`.
///
/// ```
/// use geocluster::index::abbreviate_count;
///
/// assert_eq!(abbreviate_count(999), "999");
/// assert_eq!(abbreviate_count(1_250), "1.3k");
/// assert_eq!(abbreviate_count(12_400), "12k");
/// ```
pub fn abbreviate_count(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", (count as f64 / 1000.0).round())
    } else if count >= 1000 {
        format!("{}k", (count as f64 / 100.0).round() / 10.0)
    } else {
        count.to_string()
    }
}
