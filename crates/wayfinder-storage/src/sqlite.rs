//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::{Migratable, SchemaVersion};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use wayfinder_core::{BuildingGraph, Edge, EdgeId, Node, NodeId};

fn db_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(e.to_string())
}

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(db_err)?;

        let storage = Self { conn: Mutex::new(conn) };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;

        let storage = Self { conn: Mutex::new(conn) };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    fn put_node(conn: &Connection, node: &Node) -> StorageResult<()> {
        let id = node.node_id.to_string();

        let owner: Option<String> = conn
            .query_row(
                "SELECT node_id FROM nodes WHERE node_code = ?1 AND node_id != ?2",
                params![node.node_code, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        if owner.is_some() {
            return Err(StorageError::DuplicateNode(node.node_code.clone()));
        }

        let data = serde_json::to_string(node)?;
        conn.execute(
            "INSERT OR REPLACE INTO nodes (node_id, node_code, data) VALUES (?1, ?2, ?3)",
            params![id, node.node_code, data],
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn put_edge(conn: &Connection, edge: &Edge) -> StorageResult<()> {
        let data = serde_json::to_string(edge)?;

        conn.execute(
            "INSERT OR REPLACE INTO edges (edge_id, from_node_id, to_node_id, is_active, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                edge.edge_id.to_string(),
                edge.from_node_id.to_string(),
                edge.to_node_id.to_string(),
                edge.is_active,
                data
            ],
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn query_edges(&self, sql: &str) -> StorageResult<Vec<Edge>> {
        let conn = self.conn.lock().map_err(db_err)?;

        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut edges = Vec::new();
        for row in rows {
            let data = row.map_err(db_err)?;
            let edge: Edge = serde_json::from_str(&data)?;
            edges.push(edge);
        }

        Ok(edges)
    }
}

impl Migratable for SqliteStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self.conn.lock().map_err(db_err)?;
        let version: u32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", version))
            .map_err(db_err)?;
        Ok(())
    }

    fn apply(&self, migration: &SchemaVersion) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute_batch(migration.sql)
            .map_err(|e| StorageError::Migration(format!("v{}: {}", migration.version, e)))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(db_err)?;
        Ok(true)
    }

    async fn save_node(&self, node: &Node) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        Self::put_node(&conn, node)
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let conn = self.conn.lock().map_err(db_err)?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM nodes WHERE node_id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn get_node_by_code(&self, code: &str) -> StorageResult<Option<Node>> {
        let conn = self.conn.lock().map_err(db_err)?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM nodes WHERE node_code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_nodes(&self) -> StorageResult<Vec<Node>> {
        let conn = self.conn.lock().map_err(db_err)?;

        let mut stmt = conn
            .prepare("SELECT data FROM nodes ORDER BY node_code")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut nodes = Vec::new();
        for row in rows {
            let data = row.map_err(db_err)?;
            let node: Node = serde_json::from_str(&data)?;
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn delete_node(&self, id: &NodeId) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(db_err)?;
        let id = id.to_string();

        let tx = conn.transaction().map_err(db_err)?;
        tx.execute(
            "DELETE FROM edges WHERE from_node_id = ?1 OR to_node_id = ?1",
            params![id],
        )
        .map_err(db_err)?;
        tx.execute("DELETE FROM nodes WHERE node_id = ?1", params![id])
            .map_err(db_err)?;
        tx.commit().map_err(db_err)?;

        Ok(())
    }

    async fn save_edge(&self, edge: &Edge) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        Self::put_edge(&conn, edge)
    }

    async fn get_edge(&self, id: &EdgeId) -> StorageResult<Option<Edge>> {
        let conn = self.conn.lock().map_err(db_err)?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM edges WHERE edge_id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_edges(&self) -> StorageResult<Vec<Edge>> {
        self.query_edges("SELECT data FROM edges")
    }

    async fn list_active_edges(&self) -> StorageResult<Vec<Edge>> {
        self.query_edges("SELECT data FROM edges WHERE is_active = 1")
    }

    async fn delete_edge(&self, id: &EdgeId) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(db_err)?;

        conn.execute(
            "DELETE FROM edges WHERE edge_id = ?1",
            params![id.to_string()],
        )
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete_edges_for_node(&self, id: &NodeId) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(db_err)?;

        conn.execute(
            "DELETE FROM edges WHERE from_node_id = ?1 OR to_node_id = ?1",
            params![id.to_string()],
        )
        .map_err(db_err)?;

        Ok(())
    }

    async fn save_graph(&self, graph: &BuildingGraph) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(db_err)?;

        // Dropping the transaction on error rolls every write back
        let tx = conn.transaction().map_err(db_err)?;
        for node in &graph.nodes {
            Self::put_node(&tx, node)?;
        }
        for edge in &graph.edges {
            Self::put_edge(&tx, edge)?;
        }
        tx.commit().map_err(db_err)?;

        tracing::debug!(
            "Batch saved {} nodes and {} edges in single transaction",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(())
    }
}
