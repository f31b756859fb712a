//! Path result types and reconstruction

use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use crate::snapshot::{GraphSnapshot, Traversal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node along a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub node_id: NodeId,
    pub node_code: String,
    pub name: String,
    pub building: String,
    pub floor_level: i32,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_y: Option<f64>,

    /// Meters from the previous step (0 for the first step)
    pub distance_from_prev: f64,

    /// Heading from the previous step (None for the first step)
    pub compass_angle: Option<f64>,

    /// Whether the hop into this step used stairs
    pub is_staircase: bool,
}

impl PathStep {
    /// First step of a route
    pub fn origin(node: &Node) -> Self {
        Self::from_node(node, 0.0, None, false)
    }

    /// Step reached over the given traversal
    pub fn arrived(node: &Node, via: &Traversal) -> Self {
        Self::from_node(node, via.distance, Some(via.compass_angle), via.is_staircase)
    }

    fn from_node(node: &Node, distance: f64, compass_angle: Option<f64>, is_staircase: bool) -> Self {
        Self {
            node_id: node.node_id,
            node_code: node.node_code.clone(),
            name: node.name.clone(),
            building: node.building.clone(),
            floor_level: node.floor_level,
            node_type: node.node_type.0.clone(),
            image_url: node.image_url.clone(),
            qr_code_url: node.qr_code_url.clone(),
            map_x: node.map_x,
            map_y: node.map_y,
            distance_from_prev: distance,
            compass_angle,
            is_staircase,
        }
    }
}

/// A computed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Steps in traversal order
    pub steps: Vec<PathStep>,

    /// Accumulated cost rounded to two decimals
    pub total_distance: f64,

    /// Number of steps
    pub num_nodes: usize,
}

impl PathResult {
    /// Codes of the nodes along the route
    pub fn codes(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node_code.as_str()).collect()
    }

    /// True if any hop uses stairs
    pub fn uses_stairs(&self) -> bool {
        self.steps.iter().any(|s| s.is_staircase)
    }

    /// Number of floors changed along the route
    pub fn floor_changes(&self) -> usize {
        self.steps
            .windows(2)
            .filter(|w| w[0].floor_level != w[1].floor_level)
            .count()
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Predecessor links recorded during a search: node -> (previous node, incoming traversal)
pub type Predecessors = HashMap<NodeId, (NodeId, Traversal)>;

/// Walk predecessor links from goal back to start and emit steps in traversal order
///
/// `start` is passed explicitly since it may have been resolved outside the
/// snapshot.
pub fn reconstruct(
    predecessors: &Predecessors,
    snapshot: &GraphSnapshot,
    start: &Node,
    goal: &NodeId,
    total_cost: f64,
) -> Result<PathResult> {
    let mut steps = Vec::new();
    let mut current = *goal;

    while current != start.node_id {
        let (prev, via) = predecessors.get(&current).ok_or_else(|| {
            Error::Internal(format!("Broken predecessor chain at node {}", current))
        })?;
        let node = snapshot
            .node(&current)
            .ok_or_else(|| Error::Internal(format!("Node {} missing from snapshot", current)))?;
        steps.push(PathStep::arrived(node, via));
        current = *prev;
    }

    steps.push(PathStep::origin(start));
    steps.reverse();

    Ok(PathResult {
        num_nodes: steps.len(),
        steps,
        total_distance: round2(total_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    #[test]
    fn test_round2() {
        assert_eq!(round2(15.0), 15.0);
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(2.344), 2.34);
    }

    #[test]
    fn test_reconstruct_orders_from_start() {
        let a = Node::new("A", "Atrium", "Main", 0, "room");
        let b = Node::new("B", "Bridge", "Main", 0, "corridor");
        let edge = Edge::new(a.node_id, b.node_id, 10.0, 90.0);
        let (a_id, b_id) = (a.node_id, b.node_id);
        let snapshot = GraphSnapshot::build(vec![a.clone(), b], &[edge]);

        let via = snapshot.neighbors(&a_id)[0].clone();
        let mut predecessors = Predecessors::new();
        predecessors.insert(b_id, (a_id, via));

        let path = reconstruct(&predecessors, &snapshot, &a, &b_id, 10.0).unwrap();

        assert_eq!(path.codes(), vec!["A", "B"]);
        assert_eq!(path.num_nodes, 2);
        assert_eq!(path.steps[0].distance_from_prev, 0.0);
        assert!(path.steps[0].compass_angle.is_none());
        assert_eq!(path.steps[1].compass_angle, Some(90.0));
        assert_eq!(path.total_distance, 10.0);
    }

    #[test]
    fn test_step_carries_node_attributes() {
        let mut node = Node::new("LIB-1", "Library", "Main", 2, "room");
        node.image_url = Some("https://img.example/lib.jpg".into());
        node.qr_code_url = Some("https://qr.example/lib.png".into());

        let step = PathStep::origin(&node);
        assert_eq!(step.image_url.as_deref(), Some("https://img.example/lib.jpg"));
        assert_eq!(step.qr_code_url.as_deref(), Some("https://qr.example/lib.png"));

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["qr_code_url"], "https://qr.example/lib.png");
        assert_eq!(json["type"], "room");

        let bare = serde_json::to_value(PathStep::origin(&Node::new("A", "A", "Main", 0, "room"))).unwrap();
        assert!(bare.get("qr_code_url").is_none());
        assert!(bare.get("image_url").is_none());
    }

    #[test]
    fn test_reconstruct_broken_chain_is_internal_error() {
        let a = Node::new("A", "A", "Main", 0, "room");
        let b = Node::new("B", "B", "Main", 0, "room");
        let b_id = b.node_id;
        let snapshot = GraphSnapshot::build(vec![a.clone(), b], &[]);

        let err = reconstruct(&Predecessors::new(), &snapshot, &a, &b_id, 0.0).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_floor_changes() {
        let a = Node::new("A", "A", "Main", 0, "room");
        let mut path = PathResult {
            steps: vec![PathStep::origin(&a), PathStep::origin(&a)],
            total_distance: 0.0,
            num_nodes: 2,
        };
        assert_eq!(path.floor_changes(), 0);
        path.steps[1].floor_level = 2;
        assert_eq!(path.floor_changes(), 1);
    }
}
