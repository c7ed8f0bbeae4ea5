#![cfg(feature = "geojson")]

use geocluster::export::{nodes_to_feature_collection, nodes_to_geojson};
use geocluster::prelude::*;
use geojson::Value;
use std::sync::Arc;

fn points() -> Arc<[PointRecord]> {
    let mut points: Vec<PointRecord> = (0..30)
        .map(|i| {
            PointRecord::new(-0.1 + i as f64 * 1e-5, 51.5)
                .with_property("q_yes", 1)
                .with_property("q_total_responses", 2)
        })
        .collect();
    points.push(PointRecord::new(100.0, -30.0).with_property("q_yes", 1));
    Arc::from(points)
}

#[test]
fn test_feature_collection_matches_frontier() {
    let snapshot = Snapshot::build(points(), IndexOptions::default()).unwrap();
    let nodes = snapshot.query(&ViewBox::world(), 1.0).unwrap();
    let presentations = ClusterPresenter::default()
        .present_all(&nodes, &FilterSpec::new("q", "yes"), &snapshot)
        .unwrap();

    let collection = nodes_to_feature_collection(&nodes, &snapshot, Some(presentations.as_slice())).unwrap();
    assert_eq!(collection.features.len(), 2);

    let cluster = &collection.features[0];
    match &cluster.geometry.as_ref().unwrap().value {
        Value::Point(coords) => assert!((coords[0] + 0.1).abs() < 0.01),
        other => panic!("unexpected geometry: {:?}", other),
    }
    let props = cluster.properties.as_ref().unwrap();
    assert_eq!(props["point_count"], 30);
    assert_eq!(props["icon"], "marker-50");

    let leaf = collection.features[1].properties.as_ref().unwrap();
    assert_eq!(leaf["q_yes"], 1.0);
    assert_eq!(leaf["icon"], "");
}

#[test]
fn test_stale_nodes_rejected() {
    let a = Snapshot::build(points(), IndexOptions::default()).unwrap();
    let b = Snapshot::build(points(), IndexOptions::default()).unwrap();
    let nodes = a.query(&ViewBox::world(), 1.0).unwrap();

    assert!(matches!(
        nodes_to_geojson(&nodes, &b),
        Err(ClusterError::StaleSnapshot { .. })
    ));
}
