//! Publishing snapshots to concurrent readers.
//!
//! A [`Snapshot`] is immutable once built, so readers on any thread can share
//! it through an `Arc`. [`SnapshotCell`] is the single slot a writer swaps a
//! freshly built snapshot into. Readers take a clone of the `Arc` and keep
//! querying that complete snapshot even if a newer one is published
//! meanwhile.
//!
//! # Examples
//!
//! ```rust
//! use geocluster::{IndexOptions, PointRecord, SnapshotCell, ViewBox};
//! use std::sync::Arc;
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cell = SnapshotCell::new();
//! let points: Arc<[PointRecord]> = Arc::from(vec![PointRecord::new(1.0, 1.0)]);
//! cell.build_and_publish(points, IndexOptions::default())?;
//!
//! let reader = cell.clone();
//! let handle = thread::spawn(move || {
//!     let snapshot = reader.load().unwrap();
//!     snapshot.query(&ViewBox::world(), 5.0).unwrap().len()
//! });
//!
//! assert_eq!(handle.join().unwrap(), 1);
//! # Ok(())
//! # }
//! ```

use crate::config::IndexOptions;
use crate::error::Result;
use crate::index::Snapshot;
use geocluster_types::point::PointRecord;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared slot holding the most recently published snapshot.
///
/// Cloning the cell clones the handle, not the slot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot, returning the previous one.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> Option<Arc<Snapshot>> {
        log::debug!("Publishing snapshot {}", snapshot.id());
        self.inner.write().replace(snapshot)
    }

    /// The currently published snapshot, if any.
    pub fn load(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().clone()
    }

    pub fn current_id(&self) -> Option<u64> {
        self.inner.read().as_ref().map(|snapshot| snapshot.id())
    }

    /// Build outside the lock, then publish.
    pub fn build_and_publish(
        &self,
        points: Arc<[PointRecord]>,
        options: IndexOptions,
    ) -> Result<Arc<Snapshot>> {
        let snapshot = Arc::new(Snapshot::build(points, options)?);
        self.publish(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drop the published snapshot.
    pub fn clear(&self) -> Option<Arc<Snapshot>> {
        self.inner.write().take()
    }
}
