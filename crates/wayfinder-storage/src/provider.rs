//! Adapter exposing any storage backend as a routing data provider

use crate::traits::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use wayfinder_core::{EdgeRecord, GraphProvider, Node, NodeId, Result};

/// Read-only [`GraphProvider`] view over a [`StorageBackend`]
pub struct StorageProvider<S: StorageBackend + ?Sized> {
    storage: Arc<S>,
}

impl<S: StorageBackend + ?Sized> StorageProvider<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

impl<S: StorageBackend + ?Sized> Clone for StorageProvider<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

#[async_trait]
impl<S: StorageBackend + ?Sized + 'static> GraphProvider for StorageProvider<S> {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.storage.list_nodes().await?)
    }

    async fn list_active_edges(&self, with_endpoints: bool) -> Result<Vec<EdgeRecord>> {
        let edges = self.storage.list_active_edges().await?;
        if !with_endpoints {
            return Ok(edges.into_iter().map(EdgeRecord::bare).collect());
        }

        let nodes: HashMap<NodeId, Node> = self
            .storage
            .list_nodes()
            .await?
            .into_iter()
            .map(|n| (n.node_id, n))
            .collect();

        Ok(edges
            .into_iter()
            .map(|e| {
                let from = nodes.get(&e.from_node_id).cloned();
                let to = nodes.get(&e.to_node_id).cloned();
                EdgeRecord::with_endpoints(e, from, to)
            })
            .collect())
    }

    async fn find_node_by_code(&self, code: &str) -> Result<Option<Node>> {
        Ok(self.storage.get_node_by_code(code).await?)
    }
}
