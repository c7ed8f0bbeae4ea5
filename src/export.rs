//! GeoJSON output for query results.
//!
//! Clusters become point features carrying `cluster`, `cluster_id`,
//! `point_count` and `point_count_abbreviated`. Leaves carry their point's own
//! properties. When a [`Presentation`] is supplied, `icon` and `size` are
//! added so a renderer can draw straight from the feature collection.

use crate::error::Result;
use crate::index::{ClusterNode, NodeKind, Snapshot};
use crate::present::Presentation;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// Convert one node to a GeoJSON point feature.
pub fn node_to_feature(
    node: &ClusterNode,
    snapshot: &Snapshot,
    presentation: Option<&Presentation>,
) -> Result<Feature> {
    snapshot.check_node(node)?;

    let mut properties = JsonObject::new();
    match node.kind {
        NodeKind::Cluster { id, point_count } => {
            properties.insert("cluster".to_string(), JsonValue::Bool(true));
            properties.insert("cluster_id".to_string(), JsonValue::from(id));
            properties.insert("point_count".to_string(), JsonValue::from(point_count));
            properties.insert(
                "point_count_abbreviated".to_string(),
                JsonValue::from(node.point_count_abbreviated()),
            );
        }
        NodeKind::Leaf { point_index } => {
            if let Some(point) = snapshot.point(point_index) {
                for (key, value) in &point.properties {
                    properties.insert(key.clone(), serde_json::to_value(value)?);
                }
            }
        }
    }

    if let Some(presentation) = presentation {
        properties.insert("icon".to_string(), JsonValue::from(presentation.icon_name()));
        properties.insert("size".to_string(), JsonValue::from(presentation.size));
    }

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            node.coordinate.x(),
            node.coordinate.y(),
        ]))),
        id: Some(Id::Number(node.id().into())),
        properties: Some(properties),
        foreign_members: None,
    })
}

impl ClusterNode {
    /// This node as a GeoJSON point feature, without presentation fields.
    pub fn to_feature(&self, snapshot: &Snapshot) -> Result<Feature> {
        node_to_feature(self, snapshot, None)
    }
}

/// Convert a frontier to a feature collection, optionally zipped with presentations.
pub fn nodes_to_feature_collection(
    nodes: &[ClusterNode],
    snapshot: &Snapshot,
    presentations: Option<&[Presentation]>,
) -> Result<FeatureCollection> {
    let features = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let presentation = presentations.and_then(|p| p.get(i));
            node_to_feature(node, snapshot, presentation)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Serialize a frontier as a GeoJSON string.
pub fn nodes_to_geojson(nodes: &[ClusterNode], snapshot: &Snapshot) -> Result<String> {
    let collection = nodes_to_feature_collection(nodes, snapshot, None)?;
    Ok(serde_json::to_string(&collection)?)
}
