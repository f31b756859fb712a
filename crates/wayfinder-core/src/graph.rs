//! Building graph container and data provider trait

use crate::edge::{Edge, EdgeRecord};
use crate::error::Result;
use crate::node::Node;
use async_trait::async_trait;
use std::sync::Arc;

/// Graph containing nodes and the edges between them
#[derive(Debug, Clone, Default)]
pub struct BuildingGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl BuildingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_edges(mut self, edges: Vec<Edge>) -> Self {
        self.edges = edges;
        self
    }

    /// Look up a node by its code
    pub fn node_by_code(&self, code: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_code == code)
    }
}

/// Read-only view of the data layer that the router polls at build time
///
/// Implemented by every storage backend through an adapter.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// All nodes
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// Edges with `is_active = true`, optionally joined with their endpoint nodes
    async fn list_active_edges(&self, with_endpoints: bool) -> Result<Vec<EdgeRecord>>;

    /// Resolve a node by its code
    async fn find_node_by_code(&self, code: &str) -> Result<Option<Node>>;
}

#[async_trait]
impl<T: GraphProvider + ?Sized> GraphProvider for Arc<T> {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        (**self).list_nodes().await
    }

    async fn list_active_edges(&self, with_endpoints: bool) -> Result<Vec<EdgeRecord>> {
        (**self).list_active_edges(with_endpoints).await
    }

    async fn find_node_by_code(&self, code: &str) -> Result<Option<Node>> {
        (**self).find_node_by_code(code).await
    }
}

/// A fixed in-memory graph served as a provider
///
/// Handy for wiring a router to data that is already loaded.
#[async_trait]
impl GraphProvider for BuildingGraph {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.nodes.clone())
    }

    async fn list_active_edges(&self, with_endpoints: bool) -> Result<Vec<EdgeRecord>> {
        Ok(self
            .edges
            .iter()
            .filter(|e| e.is_active)
            .map(|e| {
                if with_endpoints {
                    let from = self.nodes.iter().find(|n| n.node_id == e.from_node_id).cloned();
                    let to = self.nodes.iter().find(|n| n.node_id == e.to_node_id).cloned();
                    EdgeRecord::with_endpoints(e.clone(), from, to)
                } else {
                    EdgeRecord::bare(e.clone())
                }
            })
            .collect())
    }

    async fn find_node_by_code(&self, code: &str) -> Result<Option<Node>> {
        Ok(self.node_by_code(code).cloned())
    }
}
