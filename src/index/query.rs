//! Read-only queries against a built [`Snapshot`].

use crate::compute::spatial::{lat_y, lng_x};
use crate::compute::validation::{validate_viewbox, validate_zoom};
use crate::error::Result;
use crate::index::node::{ClusterNode, NodeKind};
use crate::index::snapshot::{ClusterRecord, EntryKind, Level, Snapshot};
use geocluster_types::bbox::ViewBox;
use geocluster_types::point::PointRecord;
use rstar::AABB;

impl Snapshot {
    /// Nodes of the frontier at `floor(zoom)` whose position lies in `bbox`.
    ///
    /// Longitudes are normalised to [-180, 180). A box whose west edge ends
    /// up east of its east edge is treated as crossing the antimeridian and
    /// queried as two halves. A box at least 360° wide covers every longitude.
    /// Results are ordered by their position in the level, which is stable
    /// for a given input order.
    pub fn query(&self, bbox: &ViewBox, zoom: f64) -> Result<Vec<ClusterNode>> {
        validate_viewbox(bbox)?;
        validate_zoom(zoom)?;

        let level = self.level(self.level_zoom(zoom));
        let min_lat = bbox.south.clamp(-90.0, 90.0);
        let max_lat = bbox.north.clamp(-90.0, 90.0);

        let (min_lng, max_lng) = if bbox.width() >= 360.0 {
            (-180.0, 180.0)
        } else {
            (normalize_lng(bbox.west), normalize_lng(bbox.east))
        };

        let mut hits = if min_lng > max_lng {
            let mut eastern = locate(level, min_lng, min_lat, 180.0, max_lat);
            eastern.extend(locate(level, -180.0, min_lat, max_lng, max_lat));
            eastern
        } else {
            locate(level, min_lng, min_lat, max_lng, max_lat)
        };
        hits.sort_unstable();
        hits.dedup();

        Ok(hits
            .into_iter()
            .map(|i| self.node(&level.entries[i]))
            .collect())
    }

    /// Up to `limit` input points under a cluster, skipping the first `offset`.
    ///
    /// The walk descends through nested clusters all the way to leaf points
    /// before applying the limit. Sub-clusters that fall entirely within the
    /// offset are skipped by count without being visited.
    pub fn leaves(&self, cluster_id: u64, limit: usize, offset: usize) -> Result<Vec<&PointRecord>> {
        Ok(self
            .leaf_indices(cluster_id, limit, offset)?
            .into_iter()
            .map(|i| &self.points()[i])
            .collect())
    }

    /// Like [`Snapshot::leaves`], but yields positions in the point slice.
    pub fn leaf_indices(&self, cluster_id: u64, limit: usize, offset: usize) -> Result<Vec<usize>> {
        let record = self.cluster(cluster_id)?;
        let mut out = Vec::with_capacity(limit.min(record.num_points));
        let mut skipped = 0;
        self.append_leaves(record, limit, offset, &mut skipped, &mut out);
        Ok(out)
    }

    /// Every input point under a cluster.
    pub fn all_leaves(&self, cluster_id: u64) -> Result<Vec<&PointRecord>> {
        self.leaves(cluster_id, usize::MAX, 0)
    }

    /// Input points represented by `node`: itself for a leaf, up to `limit`
    /// members for a cluster.
    pub fn leaves_of(&self, node: &ClusterNode, limit: usize) -> Result<Vec<&PointRecord>> {
        self.check_node(node)?;
        match node.kind {
            NodeKind::Leaf { point_index } => Ok(self
                .point(point_index)
                .into_iter()
                .take(limit)
                .collect()),
            NodeKind::Cluster { id, .. } => self.leaves(id, limit, 0),
        }
    }

    fn append_leaves(
        &self,
        record: &ClusterRecord,
        limit: usize,
        offset: usize,
        skipped: &mut usize,
        out: &mut Vec<usize>,
    ) {
        let level = self.level(record.zoom + 1);

        for &child in &record.children {
            if out.len() >= limit {
                break;
            }
            let entry = &level.entries[child];
            match entry.kind {
                EntryKind::Cluster(id) => {
                    if *skipped + entry.num_points <= offset {
                        *skipped += entry.num_points;
                    } else if let Some(nested) = self.clusters.get(&id) {
                        self.append_leaves(nested, limit, offset, skipped, out);
                    }
                }
                EntryKind::Leaf(point_index) => {
                    if *skipped < offset {
                        *skipped += 1;
                    } else {
                        out.push(point_index);
                    }
                }
            }
        }
    }

    /// Nodes merged into a cluster, one zoom level finer than where it formed.
    pub fn children(&self, cluster_id: u64) -> Result<Vec<ClusterNode>> {
        let record = self.cluster(cluster_id)?;
        let level = self.level(record.zoom + 1);
        Ok(record
            .children
            .iter()
            .map(|&child| self.node(&level.entries[child]))
            .collect())
    }

    /// Zoom at which a cluster breaks apart into its children.
    ///
    /// A cluster always merges at least two entries, so it splits one level
    /// above the zoom it formed at.
    pub fn expansion_zoom(&self, cluster_id: u64) -> Result<u8> {
        let record = self.cluster(cluster_id)?;
        Ok((record.zoom + 1).min(self.options().max_zoom + 1))
    }
}

/// Wrap a longitude into [-180, 180], keeping an edge of exactly 180 on the
/// antimeridian rather than wrapping it to -180.
fn normalize_lng(lng: f64) -> f64 {
    if lng == 180.0 {
        180.0
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

fn locate(level: &Level, min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Vec<usize> {
    let envelope = AABB::from_corners(
        [lng_x(min_lng), lat_y(max_lat)],
        [lng_x(max_lng), lat_y(min_lat)],
    );
    level
        .tree
        .locate_in_envelope(&envelope)
        .map(|hit| hit.data)
        .collect()
}
