//! Storage backend trait definitions

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use wayfinder_core::{BuildingGraph, Edge, EdgeId, Node, NodeId};

/// Trait for storage backend implementations
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace a node; fails if its code belongs to another node
    async fn save_node(&self, node: &Node) -> StorageResult<()>;

    /// Get a node by id
    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>>;

    /// Get a node by code
    async fn get_node_by_code(&self, code: &str) -> StorageResult<Option<Node>>;

    /// Get all nodes
    async fn list_nodes(&self) -> StorageResult<Vec<Node>>;

    /// Delete a node together with every edge touching it
    async fn delete_node(&self, id: &NodeId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Edge Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace an edge
    async fn save_edge(&self, edge: &Edge) -> StorageResult<()>;

    /// Get an edge by id
    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>>;

    /// Get all edges, active or not
    async fn list_edges(&self) -> StorageResult<Vec<Edge>>;

    /// Delete an edge
    async fn delete_edge(&self, id: &EdgeId) -> StorageResult<()>;

    /// Delete all edges touching a node
    async fn delete_edges_for_node(&self, id: &NodeId) -> StorageResult<()>;

    /// Get edges with `is_active = true`
    async fn list_active_edges(&self) -> StorageResult<Vec<Edge>> {
        Ok(self
            .list_edges()
            .await?
            .into_iter()
            .filter(|e| e.is_active)
            .collect())
    }

    /// Edges touching a node
    async fn edges_for_node(&self, id: &NodeId) -> StorageResult<Vec<Edge>> {
        Ok(self
            .list_edges()
            .await?
            .into_iter()
            .filter(|e| e.touches(id))
            .collect())
    }

    /// Toggle whether an edge participates in routing
    async fn set_edge_active(&self, id: &EdgeId, active: bool) -> StorageResult<Edge> {
        let mut edge = self
            .get_edge(id)
            .await?
            .ok_or_else(|| StorageError::EdgeNotFound(id.to_string()))?;
        edge.is_active = active;
        self.save_edge(&edge).await?;
        Ok(edge)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Load the entire building graph
    async fn load_graph(&self) -> StorageResult<BuildingGraph> {
        let nodes = self.list_nodes().await?;
        let edges = self.list_edges().await?;
        Ok(BuildingGraph { nodes, edges })
    }

    /// Save an entire graph (merges with existing data)
    async fn save_graph(&self, graph: &BuildingGraph) -> StorageResult<()> {
        for node in &graph.nodes {
            self.save_node(node).await?;
        }
        for edge in &graph.edges {
            self.save_edge(edge).await?;
        }
        Ok(())
    }
}
