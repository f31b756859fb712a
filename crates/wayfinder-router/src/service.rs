//! Route queries over a cached building graph

use crate::config::RouteConfig;
use crate::store::GraphStore;
use std::sync::Arc;
use wayfinder_core::{
    AStar, Directions, Error, GraphProvider, GraphSnapshot, Node, PathResult, Result,
    SearchOutcome,
};

/// Answers shortest-path and directions queries between node codes
///
/// Safe to share across tasks. Queries run against an immutable snapshot,
/// so a rebuild or invalidation never disturbs a search already underway.
pub struct RouteService<P: GraphProvider> {
    store: GraphStore<P>,
    engine: AStar,
}

impl<P: GraphProvider> RouteService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            store: GraphStore::new(provider),
            engine: AStar::default(),
        }
    }

    pub fn with_config(provider: P, config: RouteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: GraphStore::new(provider).with_build_timeout(config.build_timeout()),
            engine: AStar::new(config.meters_per_floor),
        })
    }

    pub fn provider(&self) -> &P {
        self.store.provider()
    }

    pub fn store(&self) -> &GraphStore<P> {
        &self.store
    }

    /// Load the graph now instead of on the first query
    pub async fn build(&self) -> Result<Arc<GraphSnapshot>> {
        self.store.build().await
    }

    pub fn is_built(&self) -> bool {
        self.store.is_built()
    }

    /// Mark the cached graph stale after the underlying data changed
    pub fn invalidate(&self) {
        self.store.invalidate();
    }

    /// Drop cached state; equivalent to [`invalidate`](Self::invalidate)
    pub fn reset(&self) {
        self.store.invalidate();
    }

    /// Shortest path between two node codes
    pub async fn find_path(
        &self,
        start_code: &str,
        goal_code: &str,
        avoid_stairs: bool,
    ) -> Result<PathResult> {
        Ok(self.search(start_code, goal_code, avoid_stairs).await?.path)
    }

    /// Shortest path plus search counters
    pub async fn search(
        &self,
        start_code: &str,
        goal_code: &str,
        avoid_stairs: bool,
    ) -> Result<SearchOutcome> {
        let snapshot = self.store.snapshot().await?;

        let start = self.resolve(&snapshot, start_code).await?;
        let goal = self.resolve(&snapshot, goal_code).await?;

        let outcome = self.engine.search(&snapshot, &start, &goal, avoid_stairs)?;
        tracing::info!(
            "Route {} -> {}: {}m over {} nodes",
            start_code,
            goal_code,
            outcome.path.total_distance,
            outcome.path.num_nodes
        );
        Ok(outcome)
    }

    /// Shortest path with turn-by-turn instructions
    pub async fn get_directions(
        &self,
        start_code: &str,
        goal_code: &str,
        avoid_stairs: bool,
    ) -> Result<Directions> {
        let path = self.find_path(start_code, goal_code, avoid_stairs).await?;
        Ok(Directions::new(path))
    }

    /// Node for a code, preferring the snapshot and falling back to the provider
    async fn resolve(&self, snapshot: &GraphSnapshot, code: &str) -> Result<Node> {
        if let Some(node) = snapshot.node_by_code(code) {
            return Ok(node.clone());
        }

        tracing::debug!("Node {} not in snapshot, asking provider", code);
        self.store
            .provider()
            .find_node_by_code(code)
            .await?
            .ok_or_else(|| Error::NodeNotFound(code.to_string()))
    }
}
