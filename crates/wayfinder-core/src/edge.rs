//! Edge (walkable connection) types

use crate::node::{Node, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Ulid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a heading into `[0, 360)`
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Heading of the same link walked the other way
pub fn reverse_angle(angle: f64) -> f64 {
    normalize_angle(angle + 180.0)
}

/// A stored, directed connection between two nodes
///
/// Routing always treats the link as walkable both ways; only this
/// direction is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub edge_id: EdgeId,

    pub from_node_id: NodeId,

    pub to_node_id: NodeId,

    /// Travel cost in meters
    pub distance: f64,

    /// Heading in degrees clockwise from North, walking from -> to
    pub compass_angle: f64,

    #[serde(default)]
    pub is_staircase: bool,

    /// Only active edges participate in routing
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Edge {
    /// Create a new active, level edge
    pub fn new(from_node_id: NodeId, to_node_id: NodeId, distance: f64, compass_angle: f64) -> Self {
        Self {
            edge_id: EdgeId::new(),
            from_node_id,
            to_node_id,
            distance,
            compass_angle: normalize_angle(compass_angle),
            is_staircase: false,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Mark this edge as a staircase
    pub fn staircase(mut self) -> Self {
        self.is_staircase = true;
        self
    }

    /// Mark this edge as inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// True if the edge touches the given node at either end
    pub fn touches(&self, node_id: &NodeId) -> bool {
        self.from_node_id == *node_id || self.to_node_id == *node_id
    }
}

/// An active edge as returned by the data layer, optionally joined with its endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(flatten)]
    pub edge: Edge,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_node: Option<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_node: Option<Node>,
}

impl EdgeRecord {
    pub fn bare(edge: Edge) -> Self {
        Self {
            edge,
            from_node: None,
            to_node: None,
        }
    }

    pub fn with_endpoints(edge: Edge, from_node: Option<Node>, to_node: Option<Node>) -> Self {
        Self {
            edge,
            from_node,
            to_node,
        }
    }
}

/// Data for creating a new edge, with endpoints given by node code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEdge {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub compass_angle: f64,
    #[serde(default)]
    pub is_staircase: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance: f64, compass_angle: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            compass_angle,
            is_staircase: false,
            is_active: true,
        }
    }

    pub fn staircase(mut self) -> Self {
        self.is_staircase = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_angle_wraps() {
        assert_eq!(reverse_angle(0.0), 180.0);
        assert_eq!(reverse_angle(90.0), 270.0);
        assert_eq!(reverse_angle(270.0), 90.0);
        assert!((reverse_angle(359.5) - 179.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_negative_angle() {
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(720.5), 0.5);
    }

    #[test]
    fn test_edge_builder() {
        let a = NodeId::new();
        let b = NodeId::new();
        let edge = Edge::new(a, b, 5.0, -10.0).staircase();

        assert!(edge.is_staircase);
        assert!(edge.is_active);
        assert_eq!(edge.compass_angle, 350.0);
        assert!(edge.touches(&a));
        assert!(edge.touches(&b));
        assert!(!edge.touches(&NodeId::new()));
    }

    #[test]
    fn test_new_edge_defaults() {
        let json = r#"{"from":"A","to":"B","distance":10,"compass_angle":90}"#;
        let edge: NewEdge = serde_json::from_str(json).unwrap();
        assert!(edge.is_active);
        assert!(!edge.is_staircase);
    }
}
