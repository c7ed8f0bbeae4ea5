//! Rebuild-versus-requery decisions and the per-zoom view cache.
//!
//! Building a [`Snapshot`] costs time proportional to the point count;
//! querying one for another zoom costs time proportional to the visible
//! nodes. [`ViewController`] keeps the two apart: it rebuilds only when the
//! upstream layer reports a change that actually affects clustering, and it
//! re-queries only when the integer zoom (or viewport) moves.
//!
//! State moves `Empty -> Built -> Queried`. A zoom change reported through
//! [`ViewController::set_zoom`] drops back to `Built` until the next query; a
//! rebuild replaces the snapshot and clears the cache.

use crate::compute::validation::validate_zoom;
use crate::config::{ClusterConfig, IndexOptions};
use crate::error::{ClusterError, Result};
use crate::index::{ClusterNode, Snapshot};
use crate::sync::SnapshotCell;
use geocluster_types::bbox::ViewBox;
use geocluster_types::point::PointRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters supplied by the rendering layer on every update.
#[derive(Debug, Clone)]
pub struct LayerParams {
    /// The full point set. Identity (not content) is what counts for rebuilds.
    pub points: Arc<[PointRecord]>,
    /// Clustering radius in pixels.
    pub radius: f64,
    pub max_zoom: u8,
}

impl LayerParams {
    pub fn new(points: Arc<[PointRecord]>, radius: f64, max_zoom: u8) -> Self {
        Self {
            points,
            radius,
            max_zoom,
        }
    }

    /// Parameters taking radius and max zoom from a config.
    pub fn from_config(points: Arc<[PointRecord]>, config: &ClusterConfig) -> Self {
        Self::new(points, config.radius, config.max_zoom)
    }

    fn clusters_differently_from(&self, other: &LayerParams) -> bool {
        !Arc::ptr_eq(&self.points, &other.points)
            || self.radius != other.radius
            || self.max_zoom != other.max_zoom
    }
}

/// Change signal from the rendering layer for one update tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeFlags {
    /// Anything upstream changed this tick.
    pub something_changed: bool,
    /// The point data changed even if the same allocation was reused.
    pub data_changed: bool,
}

impl ChangeFlags {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            something_changed: true,
            data_changed: false,
        }
    }

    pub fn data_changed() -> Self {
        Self {
            something_changed: true,
            data_changed: true,
        }
    }
}

/// Whether `next` requires a new snapshot given the one built from `prev`.
///
/// With no previous build the answer is always yes. Otherwise a rebuild
/// needs a change signal and a clustering-relevant difference: another point
/// set, radius or max zoom, or data flagged as changed in place. A zoom or
/// viewport change alone never rebuilds.
///
/// ```
/// use geocluster::{ChangeFlags, LayerParams, PointRecord, should_rebuild};
/// use std::sync::Arc;
///
/// let points: Arc<[PointRecord]> = Arc::from(vec![PointRecord::new(0.0, 0.0)]);
/// let prev = LayerParams::new(points.clone(), 40.0, 16);
/// let wider = LayerParams::new(points, 80.0, 16);
///
/// assert!(should_rebuild(None, &prev, ChangeFlags::unchanged()));
/// assert!(should_rebuild(Some(&prev), &wider, ChangeFlags::changed()));
/// assert!(!should_rebuild(Some(&prev), &wider, ChangeFlags::unchanged()));
/// assert!(!should_rebuild(Some(&prev), &prev.clone(), ChangeFlags::changed()));
/// ```
pub fn should_rebuild(prev: Option<&LayerParams>, next: &LayerParams, flags: ChangeFlags) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    if !flags.something_changed {
        return false;
    }
    flags.data_changed || next.clusters_differently_from(prev)
}

/// Lifecycle state of a [`ViewController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Empty,
    Built,
    Queried,
}

/// Counters for rebuilds and cache behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControllerStats {
    pub rebuilds: u64,
    pub queries: u64,
    pub cache_hits: u64,
}

#[derive(Debug)]
struct ViewCache {
    snapshot_id: u64,
    zoom: u8,
    bbox: ViewBox,
    nodes: Arc<[ClusterNode]>,
}

/// Owns the current snapshot and the last queried frontier.
///
/// # Examples
///
/// ```
/// use geocluster::{ChangeFlags, ClusterConfig, LayerParams, PointRecord, ViewController};
/// use std::sync::Arc;
///
/// let points: Arc<[PointRecord]> = (0..100)
///     .map(|i| PointRecord::new(i as f64, 0.0))
///     .collect();
///
/// let mut view = ViewController::new(ClusterConfig::default());
/// let params = LayerParams::new(points, 40.0, 16);
///
/// assert!(view.update(params.clone(), ChangeFlags::data_changed())?);
/// let first = view.view_clusters(3.2)?;
/// let again = view.view_clusters(3.9)?;
/// assert!(Arc::ptr_eq(&first, &again));
///
/// // Panning or zooming never rebuilds.
/// assert!(!view.update(params, ChangeFlags::changed())?);
/// assert_eq!(view.stats().rebuilds, 1);
/// # Ok::<(), geocluster::ClusterError>(())
/// ```
#[derive(Debug)]
pub struct ViewController {
    config: ClusterConfig,
    params: Option<LayerParams>,
    snapshot: Option<Arc<Snapshot>>,
    cache: Option<ViewCache>,
    zoom: Option<u8>,
    stats: ControllerStats,
    published: Option<SnapshotCell>,
}

impl ViewController {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            params: None,
            snapshot: None,
            cache: None,
            zoom: None,
            stats: ControllerStats::default(),
            published: None,
        }
    }

    /// Publish every new snapshot into `cell` for readers on other threads.
    pub fn publish_to(mut self, cell: SnapshotCell) -> Self {
        if let Some(snapshot) = &self.snapshot {
            cell.publish(Arc::clone(snapshot));
        }
        self.published = Some(cell);
        self
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Parameters the current snapshot was built from.
    pub fn params(&self) -> Option<&LayerParams> {
        self.params.as_ref()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    /// `Queried` only while the cached frontier matches the current
    /// snapshot and the last requested integer zoom.
    pub fn state(&self) -> ViewState {
        match (&self.snapshot, &self.cache) {
            (None, _) => ViewState::Empty,
            (Some(snapshot), Some(cache))
                if cache.snapshot_id == snapshot.id() && self.zoom == Some(cache.zoom) =>
            {
                ViewState::Queried
            }
            (Some(_), _) => ViewState::Built,
        }
    }

    /// Record the zoom the view has moved to without querying yet.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        validate_zoom(zoom)?;
        let level = match &self.snapshot {
            Some(snapshot) => snapshot.level_zoom(zoom),
            None => zoom.floor().min(u8::MAX as f64) as u8,
        };
        if self.zoom != Some(level) {
            log::trace!("View zoom moved to {}", level);
        }
        self.zoom = Some(level);
        Ok(())
    }

    /// Integer zoom most recently requested, through a query or [`ViewController::set_zoom`].
    pub fn requested_zoom(&self) -> Option<u8> {
        self.zoom
    }

    /// Apply one update tick. Returns whether the snapshot was rebuilt.
    ///
    /// `next` is compared with the parameters of the current snapshot, not
    /// with whatever the previous tick passed in, so a change that arrived
    /// without a change signal is still picked up on the next signalled tick.
    /// A failed build leaves the current snapshot in place.
    pub fn update(&mut self, next: LayerParams, flags: ChangeFlags) -> Result<bool> {
        if !should_rebuild(self.params.as_ref(), &next, flags) {
            log::trace!("Update tick without rebuild ({:?})", flags);
            return Ok(false);
        }

        let options = IndexOptions {
            radius: next.radius,
            max_zoom: next.max_zoom,
            ..self.config.index_options()
        };
        let snapshot = Arc::new(Snapshot::build(Arc::clone(&next.points), options)?);

        log::debug!(
            "Rebuilt index as snapshot {} ({} points, radius {}, max zoom {})",
            snapshot.id(),
            snapshot.len(),
            next.radius,
            next.max_zoom
        );

        if let Some(cell) = &self.published {
            cell.publish(Arc::clone(&snapshot));
        }
        self.snapshot = Some(snapshot);
        self.params = Some(next);
        self.cache = None;
        self.stats.rebuilds += 1;
        Ok(true)
    }

    /// Frontier for `bbox` at `floor(zoom)`, served from cache when the
    /// snapshot, integer zoom and viewport all match the last query.
    pub fn current_clusters(&mut self, bbox: &ViewBox, zoom: f64) -> Result<Arc<[ClusterNode]>> {
        let snapshot = Arc::clone(self.snapshot.as_ref().ok_or(ClusterError::NotBuilt)?);
        validate_zoom(zoom)?;
        let level = snapshot.level_zoom(zoom);
        self.zoom = Some(level);

        if let Some(cache) = &self.cache
            && cache.snapshot_id == snapshot.id()
            && cache.zoom == level
            && cache.bbox == *bbox
        {
            self.stats.cache_hits += 1;
            return Ok(Arc::clone(&cache.nodes));
        }

        let nodes: Arc<[ClusterNode]> = snapshot.query(bbox, zoom)?.into();
        self.stats.queries += 1;
        log::debug!(
            "Queried snapshot {} at zoom {}: {} nodes",
            snapshot.id(),
            level,
            nodes.len()
        );

        self.cache = Some(ViewCache {
            snapshot_id: snapshot.id(),
            zoom: level,
            bbox: *bbox,
            nodes: Arc::clone(&nodes),
        });
        Ok(nodes)
    }

    /// [`ViewController::current_clusters`] over the configured world bounds.
    pub fn view_clusters(&mut self, zoom: f64) -> Result<Arc<[ClusterNode]>> {
        let bounds = self.config.world_bounds;
        self.current_clusters(&bounds, zoom)
    }

    /// Zoom level of the cached frontier, if any.
    pub fn cached_zoom(&self) -> Option<u8> {
        self.cache.as_ref().map(|cache| cache.zoom)
    }
}
