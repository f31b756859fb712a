//! Node (location) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node classification (room, corridor, entrance, stairwell, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType(pub String);

impl NodeType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for NodeType {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

/// A named, floor-located point in the building graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub node_id: NodeId,

    /// Human-readable code (unique across the graph)
    pub node_code: String,

    /// Display name
    pub name: String,

    /// Building the node belongs to
    pub building: String,

    /// Floor number (0 = ground)
    pub floor_level: i32,

    /// Node classification
    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,

    /// Planar map coordinates, when the node has been placed on a floor plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_y: Option<f64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node
    pub fn new(
        node_code: impl Into<String>,
        name: impl Into<String>,
        building: impl Into<String>,
        floor_level: i32,
        node_type: impl Into<NodeType>,
    ) -> Self {
        let now = Utc::now();
        Self {
            node_id: NodeId::new(),
            node_code: node_code.into(),
            name: name.into(),
            building: building.into(),
            floor_level,
            node_type: node_type.into(),
            image_url: None,
            qr_code_url: None,
            map_x: None,
            map_y: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Place the node on the floor plan
    pub fn with_map_position(mut self, x: f64, y: f64) -> Self {
        self.map_x = Some(x);
        self.map_y = Some(y);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_qr_code(mut self, url: impl Into<String>) -> Self {
        self.qr_code_url = Some(url.into());
        self
    }

    /// Rename the node and bump its update timestamp
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Map position if both coordinates are known
    pub fn map_position(&self) -> Option<(f64, f64)> {
        match (self.map_x, self.map_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}

/// Data for creating a new node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNode {
    pub code: String,
    pub name: String,
    pub building: String,
    pub floor_level: i32,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_y: Option<f64>,
}

fn default_node_type() -> String {
    "room".to_string()
}

impl NewNode {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        building: impl Into<String>,
        floor_level: i32,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            building: building.into(),
            floor_level,
            node_type: default_node_type(),
            image_url: None,
            qr_code_url: None,
            map_x: None,
            map_y: None,
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Materialize into a node with a fresh identifier
    pub fn into_node(self) -> Node {
        let mut node = Node::new(
            self.code,
            self.name,
            self.building,
            self.floor_level,
            self.node_type,
        );
        node.image_url = self.image_url;
        node.qr_code_url = self.qr_code_url;
        node.map_x = self.map_x;
        node.map_y = self.map_y;
        node
    }
}

impl From<&Node> for NewNode {
    fn from(node: &Node) -> Self {
        Self {
            code: node.node_code.clone(),
            name: node.name.clone(),
            building: node.building.clone(),
            floor_level: node.floor_level,
            node_type: node.node_type.0.clone(),
            image_url: node.image_url.clone(),
            qr_code_url: node.qr_code_url.clone(),
            map_x: node.map_x,
            map_y: node.map_y,
        }
    }
}
