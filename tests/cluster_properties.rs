use geocluster::prelude::*;
use geocluster::compute::aggregate::classify;
use std::collections::BTreeSet;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic scatter of `n` points: a few dense city-like blobs plus noise.
fn scatter(n: usize, seed: u64) -> Arc<[PointRecord]> {
    let centers = [(-74.0, 40.7), (2.35, 48.85), (139.7, 35.7), (-46.6, -23.5)];
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..n)
        .map(|i| {
            let (lon, lat) = if i % 5 == 0 {
                (next() * 360.0 - 180.0, next() * 160.0 - 80.0)
            } else {
                let (cx, cy) = centers[i % centers.len()];
                (cx + (next() - 0.5) * 2.0, cy + (next() - 0.5) * 2.0)
            };
            PointRecord::new(lon, lat)
                .with_property("q_yes", (i % 3) as i64)
                .with_property("q_total_responses", 4)
        })
        .collect()
}

fn expand(snapshot: &Snapshot, nodes: &[ClusterNode]) -> Vec<usize> {
    let mut members = Vec::new();
    for node in nodes {
        match node.kind {
            NodeKind::Leaf { point_index } => members.push(point_index),
            NodeKind::Cluster { id, .. } => {
                members.extend(snapshot.leaf_indices(id, usize::MAX, 0).unwrap())
            }
        }
    }
    members
}

#[test]
fn test_points_are_conserved_at_every_zoom() {
    init_logging();
    let points = scatter(2_000, 7);
    let snapshot = Snapshot::build(points.clone(), IndexOptions::default()).unwrap();

    for zoom in 0..=17 {
        let nodes = snapshot.query(&ViewBox::world(), zoom as f64).unwrap();
        let total: usize = nodes.iter().map(|n| n.point_count()).sum();
        assert_eq!(total, points.len(), "point count mismatch at zoom {}", zoom);

        let mut members = expand(&snapshot, &nodes);
        members.sort_unstable();
        assert_eq!(members, (0..points.len()).collect::<Vec<_>>(), "zoom {}", zoom);
    }
}

#[test]
fn test_frontier_has_no_nested_clusters() {
    let snapshot = Snapshot::build(scatter(1_000, 3), IndexOptions::default()).unwrap();
    let nodes = snapshot.query(&ViewBox::world(), 6.0).unwrap();

    let ids: BTreeSet<u64> = nodes.iter().filter_map(|n| n.cluster_id()).collect();
    for node in &nodes {
        if let Some(id) = node.cluster_id() {
            for child in snapshot.children(id).unwrap() {
                if let Some(child_id) = child.cluster_id() {
                    assert!(!ids.contains(&child_id));
                }
            }
        }
    }
}

#[test]
fn test_leaves_capped_at_twenty_five_for_large_cluster() {
    let points: Arc<[PointRecord]> = (0..1_000)
        .map(|i| PointRecord::new(10.0 + (i % 40) as f64 * 1e-4, 20.0 + (i / 40) as f64 * 1e-4))
        .collect();
    let snapshot = Snapshot::build(points, IndexOptions::default()).unwrap();

    let nodes = snapshot.query(&ViewBox::world(), 0.0).unwrap();
    assert_eq!(nodes.len(), 1);
    let id = nodes[0].cluster_id().unwrap();
    assert_eq!(nodes[0].point_count(), 1_000);

    let members: BTreeSet<usize> = snapshot.leaf_indices(id, usize::MAX, 0).unwrap().into_iter().collect();
    assert_eq!(members.len(), 1_000);

    let preview = snapshot.leaf_indices(id, 25, 0).unwrap();
    assert_eq!(preview.len(), 25);
    assert!(preview.iter().all(|i| members.contains(i)));
}

#[test]
fn test_rebuild_is_deterministic() {
    let points = scatter(1_500, 11);
    let a = Snapshot::build(points.clone(), IndexOptions::default()).unwrap();
    let b = Snapshot::build(points, IndexOptions::default()).unwrap();

    for zoom in [0.0, 3.0, 7.0, 12.0] {
        let left = a.query(&ViewBox::world(), zoom).unwrap();
        let right = b.query(&ViewBox::world(), zoom).unwrap();
        assert_eq!(left.len(), right.len());

        for (l, r) in left.iter().zip(&right) {
            assert_eq!(l.kind, r.kind);
            assert_eq!(l.coordinate, r.coordinate);
            if let Some(id) = l.cluster_id() {
                assert_eq!(
                    a.leaf_indices(id, usize::MAX, 0).unwrap(),
                    b.leaf_indices(id, usize::MAX, 0).unwrap()
                );
            }
        }
    }
}

#[test]
fn test_cluster_centroid_is_member_mean_in_projected_space() {
    let points: Arc<[PointRecord]> = Arc::from(vec![
        PointRecord::new(10.0, 0.0),
        PointRecord::new(10.002, 0.0),
    ]);
    let snapshot = Snapshot::build(points, IndexOptions::default()).unwrap();
    let node = &snapshot.query(&ViewBox::world(), 0.0).unwrap()[0];

    assert!(node.is_cluster());
    assert!((node.coordinate.x() - 10.001).abs() < 1e-9);
    assert!(node.coordinate.y().abs() < 1e-9);
}

#[test]
fn test_classify_properties() {
    let filter = FilterSpec::new("q", "yes");
    let make = |num: i64, den: i64| {
        PointRecord::new(0.0, 0.0)
            .with_property("q_yes", num)
            .with_property("q_total_responses", den)
    };

    let nine: Vec<_> = (0..9).map(|_| make(1, 1)).collect();
    assert_eq!(classify(&nine, &filter), MarkerCode::None);

    let mut sparse: Vec<_> = (0..20).map(|_| make(0, 10)).collect();
    sparse[7] = make(1, 10);
    assert_eq!(classify(&sparse, &filter), MarkerCode::BelowOne);

    let mut exact: Vec<_> = (0..20).map(|_| make(2, 5)).collect();
    exact[0] = make(4, 5);
    assert_eq!(classify(&exact, &filter), MarkerCode::Value(42));

    let mut permuted = exact.clone();
    permuted.rotate_left(7);
    permuted.swap(2, 11);
    assert_eq!(classify(&permuted, &filter), MarkerCode::Value(42));
}

#[test]
fn test_points_beyond_mercator_limits_are_still_indexed() {
    let points: Arc<[PointRecord]> = Arc::from(vec![
        PointRecord::new(0.0, 89.9),
        PointRecord::new(0.0, -89.9),
        PointRecord::new(180.0, 0.0),
        PointRecord::new(-180.0, 0.0),
    ]);
    let snapshot = Snapshot::build(points, IndexOptions::default()).unwrap();
    let nodes = snapshot.query(&ViewBox::world(), 17.0).unwrap();
    assert_eq!(nodes.len(), 4);
}
