//! ReDB storage backend

use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use ::redb::{Database, ReadableTable, Table, TableDefinition};
use std::path::Path;
use std::sync::Mutex;
use wayfinder_core::{BuildingGraph, Edge, EdgeId, Node, NodeId};

// Table definitions
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
const NODE_CODES: TableDefinition<&str, &str> = TableDefinition::new("node_codes");
const EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");

type NodesTable<'txn> = Table<'txn, &'static str, &'static [u8]>;
type CodesTable<'txn> = Table<'txn, &'static str, &'static str>;
type EdgesTable<'txn> = Table<'txn, &'static str, &'static [u8]>;

/// ReDB storage backend
pub struct RedbStorage {
    db: Mutex<Database>,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

        // Initialize tables
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| StorageError::Database(e.to_string()))?;
            {
                write_txn.open_table(NODES)?;
                write_txn.open_table(NODE_CODES)?;
                write_txn.open_table(EDGES)?;
            }
            write_txn
                .commit()
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        Ok(Self { db: Mutex::new(db) })
    }

    /// Insert a node, keeping the code index in step
    fn put_node(nodes: &mut NodesTable<'_>, codes: &mut CodesTable<'_>, node: &Node) -> StorageResult<()> {
        let id = node.node_id.to_string();

        let owner = codes
            .get(node.node_code.as_str())?
            .map(|v| v.value().to_string());
        if let Some(owner) = owner {
            if owner != id {
                return Err(StorageError::DuplicateNode(node.node_code.clone()));
            }
        }

        // Drop the old code if this node was renamed
        let previous: Option<Node> = match nodes.get(id.as_str())? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        if let Some(previous) = previous {
            if previous.node_code != node.node_code {
                codes.remove(previous.node_code.as_str())?;
            }
        }

        let value = serde_json::to_vec(node)?;
        nodes.insert(id.as_str(), value.as_slice())?;
        codes.insert(node.node_code.as_str(), id.as_str())?;
        Ok(())
    }

    fn put_edge(edges: &mut EdgesTable<'_>, edge: &Edge) -> StorageResult<()> {
        let key = edge.edge_id.to_string();
        let value = serde_json::to_vec(edge)?;
        edges.insert(key.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Remove every edge touching a node inside an open transaction
    fn remove_edges_touching(edges: &mut EdgesTable<'_>, id: &NodeId) -> StorageResult<usize> {
        let mut doomed = Vec::new();
        for entry in edges.iter()? {
            let (key, value) = entry?;
            let edge: Edge = serde_json::from_slice(value.value())?;
            if edge.touches(id) {
                doomed.push(key.value().to_string());
            }
        }
        for key in &doomed {
            edges.remove(key.as_str())?;
        }
        Ok(doomed.len())
    }
}

#[async_trait]
impl StorageBackend for RedbStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        read_txn.open_table(NODES)?;
        Ok(true)
    }

    async fn save_node(&self, node: &Node) -> StorageResult<()> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut nodes = write_txn.open_table(NODES)?;
            let mut codes = write_txn.open_table(NODE_CODES)?;
            Self::put_node(&mut nodes, &mut codes, node)?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let key = id.to_string();

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let table = read_txn.open_table(NODES)?;

        if let Some(value) = table.get(key.as_str())? {
            let node: Node = serde_json::from_slice(value.value())?;
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }

    async fn get_node_by_code(&self, code: &str) -> StorageResult<Option<Node>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let codes = read_txn.open_table(NODE_CODES)?;

        let id = match codes.get(code)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };

        let nodes = read_txn.open_table(NODES)?;
        if let Some(value) = nodes.get(id.as_str())? {
            let node: Node = serde_json::from_slice(value.value())?;
            Ok(Some(node))
        } else {
            tracing::warn!("Code index points at missing node: {} -> {}", code, id);
            Ok(None)
        }
    }

    async fn list_nodes(&self) -> StorageResult<Vec<Node>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let table = read_txn.open_table(NODES)?;

        let mut nodes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let node: Node = serde_json::from_slice(value.value())?;
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn delete_node(&self, id: &NodeId) -> StorageResult<()> {
        let key = id.to_string();

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut nodes = write_txn.open_table(NODES)?;
            let mut codes = write_txn.open_table(NODE_CODES)?;
            let mut edges = write_txn.open_table(EDGES)?;

            let removed: Option<Node> = match nodes.remove(key.as_str())? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            if let Some(node) = removed {
                codes.remove(node.node_code.as_str())?;
            }
            let count = Self::remove_edges_touching(&mut edges, id)?;
            tracing::debug!("Deleted node {} and {} edges", id, count);
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn save_edge(&self, edge: &Edge) -> StorageResult<()> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut table = write_txn.open_table(EDGES)?;
            Self::put_edge(&mut table, edge)?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>> {
        let key = id.to_string();

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let table = read_txn.open_table(EDGES)?;

        if let Some(value) = table.get(key.as_str())? {
            let edge: Edge = serde_json::from_slice(value.value())?;
            Ok(Some(edge))
        } else {
            Ok(None)
        }
    }

    async fn list_edges(&self) -> StorageResult<Vec<Edge>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let table = read_txn.open_table(EDGES)?;

        let mut edges = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let edge: Edge = serde_json::from_slice(value.value())?;
            edges.push(edge);
        }

        Ok(edges)
    }

    async fn delete_edge(&self, id: &EdgeId) -> StorageResult<()> {
        let key = id.to_string();

        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut table = write_txn.open_table(EDGES)?;
            table.remove(key.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn delete_edges_for_node(&self, id: &NodeId) -> StorageResult<()> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut table = write_txn.open_table(EDGES)?;
            Self::remove_edges_touching(&mut table, id)?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Batch save in a single transaction
    async fn save_graph(&self, graph: &BuildingGraph) -> StorageResult<()> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let mut nodes = write_txn.open_table(NODES)?;
            let mut codes = write_txn.open_table(NODE_CODES)?;
            let mut edges = write_txn.open_table(EDGES)?;

            for node in &graph.nodes {
                Self::put_node(&mut nodes, &mut codes, node)?;
            }
            for edge in &graph.edges {
                Self::put_edge(&mut edges, edge)?;
            }
        }
        write_txn.commit()?;
        tracing::debug!(
            "Batch saved {} nodes and {} edges in single transaction",
            graph.nodes.len(),
            graph.edges.len()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_storage() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        let storage = RedbStorage::open(&db_path).unwrap();
        storage.initialize().await.unwrap();

        let node = Node::new("ENG-2", "Lab", "Engineering", 2, "room");
        storage.save_node(&node).await.unwrap();

        let retrieved = storage.get_node_by_code("ENG-2").await.unwrap();
        assert_eq!(retrieved.unwrap().name, "Lab");

        storage.delete_node(&node.node_id).await.unwrap();
        assert!(storage.get_node_by_code("ENG-2").await.unwrap().is_none());
        assert!(storage.get_node(&node.node_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redb_code_index_follows_rename() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("codes.redb")).unwrap();

        let mut node = Node::new("OLD", "Office", "Main", 1, "room");
        storage.save_node(&node).await.unwrap();
        node.node_code = "NEW".to_string();
        storage.save_node(&node).await.unwrap();

        assert!(storage.get_node_by_code("OLD").await.unwrap().is_none());
        assert!(storage.get_node_by_code("NEW").await.unwrap().is_some());

        let other = Node::new("NEW", "Clash", "Main", 1, "room");
        assert!(matches!(
            storage.save_node(&other).await,
            Err(StorageError::DuplicateNode(_))
        ));
    }

    #[tokio::test]
    async fn test_redb_graph_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("graph.redb");

        let a = Node::new("A", "A", "Main", 0, "room");
        let b = Node::new("B", "B", "Main", 1, "room");
        let edge = Edge::new(a.node_id, b.node_id, 6.5, 0.0).staircase();
        let graph = BuildingGraph::new()
            .with_edges(vec![edge.clone()])
            .with_nodes(vec![a, b]);

        {
            let storage = RedbStorage::open(&db_path).unwrap();
            storage.save_graph(&graph).await.unwrap();
        }

        let storage = RedbStorage::open(&db_path).unwrap();
        let loaded = storage.load_graph().await.unwrap();
        assert_eq!(loaded.nodes.len(), 2);
        assert_eq!(loaded.edges, vec![edge]);
    }
}
