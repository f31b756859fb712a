//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use wayfinder_core::{Edge, EdgeId, Node, NodeId};

/// In-memory storage backend
///
/// Useful for testing and temporary storage.
pub struct MemoryStorage {
    nodes: RwLock<HashMap<NodeId, Node>>,
    edges: RwLock<HashMap<EdgeId, Edge>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            edges: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(format!("Lock error: {}", e))
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    // Node operations

    async fn save_node(&self, node: &Node) -> StorageResult<()> {
        let mut nodes = self.nodes.write().map_err(lock_error)?;

        let taken = nodes
            .values()
            .any(|n| n.node_code == node.node_code && n.node_id != node.node_id);
        if taken {
            return Err(StorageError::DuplicateNode(node.node_code.clone()));
        }

        nodes.insert(node.node_id, node.clone());
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let nodes = self.nodes.read().map_err(lock_error)?;
        Ok(nodes.get(id).cloned())
    }

    async fn get_node_by_code(&self, code: &str) -> StorageResult<Option<Node>> {
        let nodes = self.nodes.read().map_err(lock_error)?;
        Ok(nodes.values().find(|n| n.node_code == code).cloned())
    }

    async fn list_nodes(&self) -> StorageResult<Vec<Node>> {
        let nodes = self.nodes.read().map_err(lock_error)?;
        let mut all: Vec<Node> = nodes.values().cloned().collect();
        all.sort_by(|a, b| a.node_code.cmp(&b.node_code));
        Ok(all)
    }

    async fn delete_node(&self, id: &NodeId) -> StorageResult<()> {
        {
            let mut edges = self.edges.write().map_err(lock_error)?;
            edges.retain(|_, e| !e.touches(id));
        }
        let mut nodes = self.nodes.write().map_err(lock_error)?;
        nodes.remove(id);
        Ok(())
    }

    // Edge operations

    async fn save_edge(&self, edge: &Edge) -> StorageResult<()> {
        let mut edges = self.edges.write().map_err(lock_error)?;
        edges.insert(edge.edge_id, edge.clone());
        Ok(())
    }

    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>> {
        let edges = self.edges.read().map_err(lock_error)?;
        Ok(edges.get(id).cloned())
    }

    async fn list_edges(&self) -> StorageResult<Vec<Edge>> {
        let edges = self.edges.read().map_err(lock_error)?;
        let mut all: Vec<Edge> = edges.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn delete_edge(&self, id: &EdgeId) -> StorageResult<()> {
        let mut edges = self.edges.write().map_err(lock_error)?;
        edges.remove(id);
        Ok(())
    }

    async fn delete_edges_for_node(&self, id: &NodeId) -> StorageResult<()> {
        let mut edges = self.edges.write().map_err(lock_error)?;
        edges.retain(|_, e| !e.touches(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.initialize().await.unwrap();

        let node = Node::new("LIB-1", "Lobby", "Library", 0, "entrance");
        storage.save_node(&node).await.unwrap();

        let retrieved = storage.get_node_by_code("LIB-1").await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name, "Lobby");

        storage.delete_node(&node.node_id).await.unwrap();
        assert!(storage.get_node(&node.node_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let storage = MemoryStorage::new();
        storage
            .save_node(&Node::new("A", "First", "Main", 0, "room"))
            .await
            .unwrap();

        let err = storage
            .save_node(&Node::new("A", "Second", "Main", 0, "room"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateNode(code) if code == "A"));
    }

    #[tokio::test]
    async fn test_delete_node_cascades_edges() {
        let storage = MemoryStorage::new();
        let a = Node::new("A", "A", "Main", 0, "room");
        let b = Node::new("B", "B", "Main", 0, "room");
        let c = Node::new("C", "C", "Main", 0, "room");
        for n in [&a, &b, &c] {
            storage.save_node(n).await.unwrap();
        }
        storage
            .save_edge(&Edge::new(a.node_id, b.node_id, 1.0, 0.0))
            .await
            .unwrap();
        storage
            .save_edge(&Edge::new(b.node_id, c.node_id, 1.0, 0.0))
            .await
            .unwrap();
        storage
            .save_edge(&Edge::new(a.node_id, c.node_id, 1.0, 0.0))
            .await
            .unwrap();

        storage.delete_node(&b.node_id).await.unwrap();

        let edges = storage.list_edges().await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_node_id, c.node_id);
    }

    #[tokio::test]
    async fn test_set_edge_active() {
        let storage = MemoryStorage::new();
        let edge = Edge::new(NodeId::new(), NodeId::new(), 2.0, 90.0);
        storage.save_edge(&edge).await.unwrap();

        storage.set_edge_active(&edge.edge_id, false).await.unwrap();
        assert!(storage.list_active_edges().await.unwrap().is_empty());
        assert_eq!(storage.list_edges().await.unwrap().len(), 1);

        let missing = storage.set_edge_active(&EdgeId::new(), true).await;
        assert!(matches!(missing, Err(StorageError::EdgeNotFound(_))));
    }
}
