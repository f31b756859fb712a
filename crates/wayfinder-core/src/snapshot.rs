//! Immutable adjacency snapshot of the building graph

use crate::edge::{normalize_angle, reverse_angle, Edge};
use crate::graph::BuildingGraph;
use crate::node::{Node, NodeId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One way to leave a node
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub to: NodeId,
    pub distance: f64,
    /// Heading walking towards `to`
    pub compass_angle: f64,
    pub is_staircase: bool,
}

/// Fully built in-memory graph a search runs against
///
/// Constructed once and never mutated; a rebuild produces a new value.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    nodes: HashMap<NodeId, Node>,
    codes: HashMap<String, NodeId>,
    adjacency: HashMap<NodeId, Vec<Traversal>>,
    edge_count: usize,
    built_at: DateTime<Utc>,
}

impl GraphSnapshot {
    /// Build from nodes and edges
    ///
    /// Every active edge contributes a forward and a reverse traversal.
    /// Inactive edges, edges with an unknown endpoint and edges whose
    /// distance is negative or not finite are skipped.
    pub fn build(nodes: Vec<Node>, edges: &[Edge]) -> Self {
        let mut codes = HashMap::with_capacity(nodes.len());
        let mut by_id = HashMap::with_capacity(nodes.len());
        for node in nodes {
            codes.insert(node.node_code.clone(), node.node_id);
            by_id.insert(node.node_id, node);
        }

        let mut adjacency: HashMap<NodeId, Vec<Traversal>> = HashMap::new();
        let mut edge_count = 0;

        for edge in edges.iter().filter(|e| e.is_active) {
            if !by_id.contains_key(&edge.from_node_id) || !by_id.contains_key(&edge.to_node_id) {
                tracing::warn!(
                    "Skipping edge {} with unknown endpoint ({} -> {})",
                    edge.edge_id,
                    edge.from_node_id,
                    edge.to_node_id
                );
                continue;
            }
            if !edge.distance.is_finite() || edge.distance < 0.0 || !edge.compass_angle.is_finite()
            {
                tracing::warn!(
                    "Skipping edge {} with invalid distance {} or angle {}",
                    edge.edge_id,
                    edge.distance,
                    edge.compass_angle
                );
                continue;
            }
            let angle = normalize_angle(edge.compass_angle);

            adjacency.entry(edge.from_node_id).or_default().push(Traversal {
                to: edge.to_node_id,
                distance: edge.distance,
                compass_angle: angle,
                is_staircase: edge.is_staircase,
            });
            adjacency.entry(edge.to_node_id).or_default().push(Traversal {
                to: edge.from_node_id,
                distance: edge.distance,
                compass_angle: reverse_angle(angle),
                is_staircase: edge.is_staircase,
            });
            edge_count += 1;
        }

        Self {
            nodes: by_id,
            codes,
            adjacency,
            edge_count,
            built_at: Utc::now(),
        }
    }

    pub fn from_graph(graph: BuildingGraph) -> Self {
        Self::build(graph.nodes, &graph.edges)
    }

    pub fn empty() -> Self {
        Self::build(Vec::new(), &[])
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_by_code(&self, code: &str) -> Option<&Node> {
        self.codes.get(code).and_then(|id| self.nodes.get(id))
    }

    /// Outgoing traversal options, both stored and synthesized
    pub fn neighbors(&self, id: &NodeId) -> &[Traversal] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored edges materialized (each yields two traversals)
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}
