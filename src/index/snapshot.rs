//! Immutable, eagerly built cluster hierarchy.
//!
//! A snapshot holds one R-tree per integer zoom level in
//! `min_zoom..=max_zoom + 1`. The finest level contains every valid input
//! point as a leaf. Each coarser level is produced by a greedy pass over the
//! level below it: entries are visited in order and each unclaimed entry
//! absorbs every unclaimed neighbour within `radius` pixels (projected at that
//! zoom), yielding a cluster at their weighted centroid. Neighbour candidates
//! are sorted by position before merging, so the result depends only on the
//! input order, never on R-tree traversal order.
//!
//! All clustering happens in [`Snapshot::build`]. Queries only walk the
//! prebuilt trees.

use crate::compute::spatial::{lat_y, lng_x, x_lng, y_lat};
use crate::compute::validation::validate_geographic_point;
use crate::config::IndexOptions;
use crate::error::{ClusterError, Result};
use crate::index::node::{ClusterNode, NodeKind};
use geo::Point;
use geocluster_types::point::PointRecord;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Low bits of a cluster id reserved for the zoom it was created at.
pub(crate) const ZOOM_BITS: u32 = 5;

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) type TreeEntry = GeomWithData<[f64; 2], usize>;

/// Member of one zoom level: a leaf point or a cluster, in projected space.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub x: f64,
    pub y: f64,
    pub num_points: usize,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Leaf(usize),
    Cluster(u64),
}

/// Everything known about a cluster at the zoom it was formed.
#[derive(Debug, Clone)]
pub(crate) struct ClusterRecord {
    /// Zoom level the cluster was formed at.
    pub zoom: u8,
    pub num_points: usize,
    /// Positions of the merged entries in the level at `zoom + 1`.
    pub children: SmallVec<[usize; 8]>,
}

pub(crate) struct Level {
    pub entries: Vec<Entry>,
    pub tree: RTree<TreeEntry>,
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Level {
    fn new(entries: Vec<Entry>) -> Self {
        let tree = RTree::bulk_load(
            entries
                .iter()
                .enumerate()
                .map(|(i, entry)| GeomWithData::new([entry.x, entry.y], i))
                .collect(),
        );
        Self { entries, tree }
    }
}

/// One immutable build of the cluster hierarchy over a point set.
///
/// Snapshots are never mutated. Changing the point set or any build parameter
/// means building a new snapshot; share them behind an `Arc` and swap the
/// reference to publish a replacement.
///
/// # Examples
///
/// ```
/// use geocluster::{IndexOptions, PointRecord, Snapshot, ViewBox};
/// use std::sync::Arc;
///
/// let points: Arc<[PointRecord]> = (0..50)
///     .map(|i| PointRecord::new(10.0 + i as f64 * 1e-4, 50.0))
///     .collect();
///
/// let snapshot = Snapshot::build(points, IndexOptions::default())?;
/// let nodes = snapshot.query(&ViewBox::world(), 3.0)?;
/// assert_eq!(nodes.len(), 1);
/// assert_eq!(nodes[0].point_count(), 50);
/// # Ok::<(), geocluster::ClusterError>(())
/// ```
#[derive(Debug)]
pub struct Snapshot {
    id: u64,
    points: Arc<[PointRecord]>,
    options: IndexOptions,
    /// `levels[i]` holds zoom `min_zoom + i`; the last level is `max_zoom + 1`.
    pub(crate) levels: Vec<Level>,
    pub(crate) clusters: FxHashMap<u64, ClusterRecord>,
    indexed: usize,
}

impl Snapshot {
    /// Build the full hierarchy for `points`.
    ///
    /// Points with non-finite or out-of-range coordinates are skipped and
    /// logged; they never appear in query results. An empty point set yields
    /// a valid, empty snapshot.
    pub fn build(points: Arc<[PointRecord]>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        let started = Instant::now();

        let mut leaves = Vec::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            if let Err(e) = validate_geographic_point(&point.position) {
                log::warn!("Skipping point {} during index build: {}", i, e);
                continue;
            }
            leaves.push(Entry {
                x: lng_x(point.lon()),
                y: lat_y(point.lat()),
                num_points: 1,
                kind: EntryKind::Leaf(i),
            });
        }
        let indexed = leaves.len();

        let mut clusters = FxHashMap::default();
        let mut levels = Vec::with_capacity((options.max_zoom - options.min_zoom) as usize + 2);
        let mut current = Level::new(leaves);

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let coarser = Level::new(cluster_level(&current, zoom, &options, &mut clusters));
            levels.push(current);
            current = coarser;
        }
        levels.push(current);
        levels.reverse();

        let snapshot = Self {
            id: NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed),
            points,
            options,
            levels,
            clusters,
            indexed,
        };

        log::debug!(
            "Built snapshot {}: {} points indexed, {} skipped, {} clusters over zooms {}..={} in {:?}",
            snapshot.id,
            indexed,
            snapshot.points.len() - indexed,
            snapshot.clusters.len(),
            options.min_zoom,
            options.max_zoom + 1,
            started.elapsed()
        );

        Ok(snapshot)
    }

    /// Process-unique id of this snapshot.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// The full point set this snapshot was built from, skipped points included.
    pub fn points(&self) -> &Arc<[PointRecord]> {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&PointRecord> {
        self.points.get(index)
    }

    /// Number of points that made it into the index.
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Number of input points rejected for invalid coordinates.
    pub fn skipped(&self) -> usize {
        self.points.len() - self.indexed
    }

    /// Total number of clusters formed across all zoom levels.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Integer zoom level a floating zoom resolves to.
    pub fn level_zoom(&self, zoom: f64) -> u8 {
        let floor = zoom.floor();
        let max = (self.options.max_zoom + 1) as f64;
        floor.clamp(self.options.min_zoom as f64, max) as u8
    }

    pub(crate) fn level(&self, zoom: u8) -> &Level {
        &self.levels[(zoom - self.options.min_zoom) as usize]
    }

    pub(crate) fn cluster(&self, cluster_id: u64) -> Result<&ClusterRecord> {
        self.clusters
            .get(&cluster_id)
            .ok_or(ClusterError::UnknownCluster(cluster_id))
    }

    /// Fail unless `node` was produced by this snapshot.
    pub fn check_node(&self, node: &ClusterNode) -> Result<()> {
        if node.snapshot_id != self.id {
            return Err(ClusterError::StaleSnapshot {
                expected: self.id,
                found: node.snapshot_id,
            });
        }
        Ok(())
    }

    pub(crate) fn node(&self, entry: &Entry) -> ClusterNode {
        match entry.kind {
            EntryKind::Leaf(point_index) => ClusterNode {
                snapshot_id: self.id,
                coordinate: self.points[point_index].position,
                kind: NodeKind::Leaf { point_index },
            },
            EntryKind::Cluster(id) => ClusterNode {
                snapshot_id: self.id,
                coordinate: Point::new(x_lng(entry.x), y_lat(entry.y)),
                kind: NodeKind::Cluster {
                    id,
                    point_count: entry.num_points,
                },
            },
        }
    }
}

/// Merge the entries of `finer` (zoom `zoom + 1`) into the entries of `zoom`.
fn cluster_level(
    finer: &Level,
    zoom: u8,
    options: &IndexOptions,
    clusters: &mut FxHashMap<u64, ClusterRecord>,
) -> Vec<Entry> {
    let radius = options.radius / (options.extent as f64 * 2f64.powi(zoom as i32));
    let radius_sq = radius * radius;

    let mut claimed = vec![false; finer.entries.len()];
    let mut out = Vec::with_capacity(finer.entries.len());

    for i in 0..finer.entries.len() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        let origin = &finer.entries[i];

        let mut neighbors: SmallVec<[usize; 16]> = finer
            .tree
            .locate_within_distance([origin.x, origin.y], radius_sq)
            .map(|candidate| candidate.data)
            .filter(|&n| !claimed[n])
            .collect();
        neighbors.sort_unstable();

        let total = origin.num_points
            + neighbors
                .iter()
                .map(|&n| finer.entries[n].num_points)
                .sum::<usize>();

        if total > origin.num_points && total >= options.min_points {
            let mut wx = origin.x * origin.num_points as f64;
            let mut wy = origin.y * origin.num_points as f64;
            let mut children: SmallVec<[usize; 8]> = SmallVec::with_capacity(neighbors.len() + 1);
            children.push(i);

            for &n in &neighbors {
                claimed[n] = true;
                let neighbor = &finer.entries[n];
                wx += neighbor.x * neighbor.num_points as f64;
                wy += neighbor.y * neighbor.num_points as f64;
                children.push(n);
            }

            let id = ((i as u64) << ZOOM_BITS) + zoom as u64 + 1;
            clusters.insert(
                id,
                ClusterRecord {
                    zoom,
                    num_points: total,
                    children,
                },
            );
            out.push(Entry {
                x: wx / total as f64,
                y: wy / total as f64,
                num_points: total,
                kind: EntryKind::Cluster(id),
            });
        } else {
            out.push(origin.clone());
            if total > 1 {
                // Too few to merge; carry the neighbours over unchanged.
                for &n in &neighbors {
                    claimed[n] = true;
                    out.push(finer.entries[n].clone());
                }
            }
        }
    }

    out
}
