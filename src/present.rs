//! Marker code and icon scale for each queried node.

use crate::compute::aggregate::{MIN_COUNT_TO_CLASSIFY, MarkerCode, classify_point, classify_with_min};
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::index::{ClusterIndex, ClusterNode, NodeKind};
use geocluster_types::filter::FilterSpec;
use serde::{Deserialize, Serialize};

/// Member count at which the icon scale stops growing.
pub const SIZE_SATURATION_COUNT: usize = 100;

/// Icon scale for a node representing `point_count` points: `1.01..=2.0`.
///
/// ```
/// use geocluster::present::icon_size;
///
/// assert_eq!(icon_size(1), 1.01);
/// assert_eq!(icon_size(50), 1.5);
/// assert_eq!(icon_size(5_000), 2.0);
/// ```
pub fn icon_size(point_count: usize) -> f64 {
    point_count.min(SIZE_SATURATION_COUNT) as f64 / SIZE_SATURATION_COUNT as f64 + 1.0
}

/// What the renderer needs to draw one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub code: MarkerCode,
    pub size: f64,
}

impl Presentation {
    pub fn icon_name(&self) -> String {
        self.code.icon_name()
    }
}

/// Maps nodes to [`Presentation`]s for a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPresenter {
    min_classify_count: usize,
}

impl Default for ClusterPresenter {
    fn default() -> Self {
        Self::new(MIN_COUNT_TO_CLASSIFY)
    }
}

impl ClusterPresenter {
    pub fn new(min_classify_count: usize) -> Self {
        Self { min_classify_count }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(config.min_classify_count)
    }

    /// Classify `node` under `filter`.
    ///
    /// Clusters are classified over every member point, gated by the minimum
    /// count. Leaves are classified from their own properties with no gate.
    pub fn present<I>(&self, node: &ClusterNode, filter: &FilterSpec, index: &I) -> Result<Presentation>
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
            NodeKind::Cluster { id, point_count } => {
                let members = index.leaves(id, usize::MAX, 0)?;
                Ok(Presentation {
                    code: classify_with_min(&members, filter, self.min_classify_count),
                    size: icon_size(point_count),
                })
            }
            NodeKind::Leaf { point_index } => {
                let point = index.point(point_index).ok_or_else(|| {
                    ClusterError::InvalidInput(format!("No point at index {}", point_index))
                })?;
                Ok(Presentation {
                    code: classify_point(point, filter),
                    size: icon_size(1),
                })
            }
        }
    }

    /// Present every node, in order.
    pub fn present_all<I>(
        &self,
        nodes: &[ClusterNode],
        filter: &FilterSpec,
        index: &I,
    ) -> Result<Vec<Presentation>>
    where
        I: ClusterIndex + ?Sized,
    {
        if filter.is_empty() {
            log::debug!("Presenting {} nodes with an empty filter", nodes.len());
        }
        nodes
            .iter()
            .map(|node| self.present(node, filter, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexOptions;
    use crate::index::Snapshot;
    use geocluster_types::bbox::ViewBox;
    use geocluster_types::point::PointRecord;
    use std::sync::Arc;

    fn survey_point(lon: f64, yes: i64, total: i64) -> PointRecord {
        PointRecord::new(lon, 10.0)
            .with_property("masks_yes", yes)
            .with_property("masks_total_responses", total)
    }

    fn filter() -> FilterSpec {
        FilterSpec::new("masks", "yes")
    }

    #[test]
    fn test_icon_size_bounds() {
        assert_eq!(icon_size(0), 1.0);
        assert_eq!(icon_size(100), 2.0);
        assert_eq!(icon_size(101), 2.0);
    }

    #[test]
    fn test_cluster_presentation_uses_all_members() {
        // 30 members; only the last ones carry "yes" answers, so a capped
        // member list would miss them.
        let points: Arc<[PointRecord]> = (0..30)
            .map(|i| survey_point(i as f64 * 1e-5, if i >= 25 { 6 } else { 0 }, 4))
            .collect();
        let snapshot = Snapshot::build(points, IndexOptions::default()).unwrap();
        let node = &snapshot.query(&ViewBox::world(), 0.0).unwrap()[0];

        let presentation = ClusterPresenter::default()
            .present(node, &filter(), &snapshot)
            .unwrap();
        // 30 / 120
        assert_eq!(presentation.code, MarkerCode::Value(25));
        assert_eq!(presentation.size, 1.3);
        assert_eq!(presentation.icon_name(), "marker-25");
    }

    #[test]
    fn test_small_cluster_is_unclassified() {
        let points: Arc<[PointRecord]> = (0..5).map(|i| survey_point(i as f64 * 1e-5, 1, 1)).collect();
        let snapshot = Snapshot::build(points, IndexOptions::default()).unwrap();
        let node = &snapshot.query(&ViewBox::world(), 0.0).unwrap()[0];

        let presentation = ClusterPresenter::default()
            .present(node, &filter(), &snapshot)
            .unwrap();
        assert_eq!(presentation.code, MarkerCode::None);
        assert_eq!(presentation.size, 1.05);

        let relaxed = ClusterPresenter::new(2).present(node, &filter(), &snapshot).unwrap();
        assert_eq!(relaxed.code, MarkerCode::Value(100));
    }

    #[test]
    fn test_leaf_presentation() {
        let points: Arc<[PointRecord]> = Arc::from(vec![survey_point(0.0, 1, 3)]);
        let snapshot = Snapshot::build(points, IndexOptions::default()).unwrap();
        let nodes = snapshot.query(&ViewBox::world(), 0.0).unwrap();

        let all = ClusterPresenter::default()
            .present_all(&nodes, &filter(), &snapshot)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].code, MarkerCode::Value(33));
        assert_eq!(all[0].size, 1.01);
    }

    #[test]
    fn test_stale_node_rejected() {
        let points: Arc<[PointRecord]> = Arc::from(vec![survey_point(0.0, 1, 3)]);
        let a = Snapshot::build(points.clone(), IndexOptions::default()).unwrap();
        let b = Snapshot::build(points, IndexOptions::default()).unwrap();
        let node = &a.query(&ViewBox::world(), 0.0).unwrap()[0];

        let err = ClusterPresenter::default()
            .present(node, &filter(), &b)
            .unwrap_err();
        assert!(matches!(err, ClusterError::StaleSnapshot { .. }));
    }
}
