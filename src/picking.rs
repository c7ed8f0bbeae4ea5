//! Resolves pointer interactions on rendered nodes.

use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::index::{ClusterIndex, ClusterNode, NodeKind};
use geocluster_types::point::{PointRecord, Properties};
use serde::{Deserialize, Serialize};

/// Default cap on member points returned for a picked cluster.
pub const DEFAULT_PICK_LIMIT: usize = 25;

/// Kind of pointer interaction that produced a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    /// Passive pointer movement over a node.
    #[default]
    Hover,
    Click,
    /// Programmatic lookup, e.g. a rectangle selection.
    Query,
}

impl PickMode {
    pub fn is_passive(&self) -> bool {
        matches!(self, PickMode::Hover)
    }
}

/// Outcome of resolving a pick.
#[derive(Debug, Clone, PartialEq)]
pub enum PickResult<'a> {
    /// A leaf: the underlying point.
    Point(&'a PointRecord),
    /// A cluster under passive hover: summary only, no member lookup.
    Cluster { id: u64, point_count: usize },
    /// A cluster under an active pick: a bounded preview of its members.
    Members {
        id: u64,
        point_count: usize,
        points: Vec<&'a PointRecord>,
    },
}

impl<'a> PickResult<'a> {
    /// Property maps of every point carried by this result.
    pub fn properties(&self) -> Vec<&'a Properties> {
        match self {
            PickResult::Point(point) => vec![&point.properties],
            PickResult::Cluster { .. } => Vec::new(),
            PickResult::Members { points, .. } => points.iter().map(|p| &p.properties).collect(),
        }
    }

    pub fn is_cluster(&self) -> bool {
        !matches!(self, PickResult::Point(_))
    }
}

/// Turns a picked node into a point or a bounded member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickingResolver {
    limit: usize,
}

impl Default for PickingResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PICK_LIMIT)
    }
}

impl PickingResolver {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(config.pick_limit)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Resolve with the resolver's default member cap.
    pub fn resolve<'a, I>(&self, index: &'a I, node: &ClusterNode, mode: PickMode) -> Result<PickResult<'a>>
    where
        I: ClusterIndex + ?Sized,
    {
        self.resolve_with_limit(index, node, mode, self.limit)
    }

    /// Resolve a pick, returning at most `limit` members for an active cluster pick.
    pub fn resolve_with_limit<'a, I>(
        &self,
        index: &'a I,
        node: &ClusterNode,
        mode: PickMode,
        limit: usize,
    ) -> Result<PickResult<'a>>
    where
        I: ClusterIndex + ?Sized,
    {
        if node.snapshot_id != index.snapshot_id() {
            return Err(ClusterError::StaleSnapshot {
                expected: index.snapshot_id(),
                found: node.snapshot_id,
            });
        }

        match node.kind {
            NodeKind::Leaf { point_index } => index
                .point(point_index)
                .map(PickResult::Point)
                .ok_or_else(|| ClusterError::InvalidInput(format!("No point at index {}", point_index))),
            NodeKind::Cluster { id, point_count } if mode.is_passive() => {
                Ok(PickResult::Cluster { id, point_count })
            }
            NodeKind::Cluster { id, point_count } => Ok(PickResult::Members {
                id,
                point_count,
                points: index.leaves(id, limit, 0)?,
            }),
        }
    }
}
