//! Shared, swappable graph snapshot
//!
//! Queries read whichever snapshot is installed at the moment they start and
//! keep it alive for their duration. A build produces a fresh snapshot off to
//! the side and installs it with a single pointer swap. Invalidation bumps a
//! generation counter so a build that started before it never installs.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use wayfinder_core::{Error, GraphProvider, GraphSnapshot, Result};

#[derive(Default)]
struct Slot {
    snapshot: Option<Arc<GraphSnapshot>>,
    generation: u64,
}

/// Lazily built snapshot cache over a [`GraphProvider`]
pub struct GraphStore<P: GraphProvider> {
    provider: P,
    slot: RwLock<Slot>,
    build_gate: Mutex<()>,
    build_timeout: Option<Duration>,
}

impl<P: GraphProvider> GraphStore<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slot: RwLock::new(Slot::default()),
            build_gate: Mutex::new(()),
            build_timeout: None,
        }
    }

    pub fn with_build_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // Slot holds no invariants a panicking writer could break.
    fn read_slot(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Installed snapshot, if any
    pub fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.read_slot().snapshot.clone()
    }

    pub fn is_built(&self) -> bool {
        self.read_slot().snapshot.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.read_slot().generation
    }

    /// Drop the installed snapshot; the next query rebuilds
    pub fn invalidate(&self) {
        let mut slot = self.write_slot();
        slot.generation += 1;
        slot.snapshot = None;
        tracing::debug!("Graph snapshot invalidated (generation {})", slot.generation);
    }

    /// Fetch everything from the provider and install a fresh snapshot
    ///
    /// On failure the previous state is left untouched. If the store was
    /// invalidated while the fetch was running, the result is returned to
    /// the caller but not installed.
    pub async fn build(&self) -> Result<Arc<GraphSnapshot>> {
        let _gate = self.build_gate.lock().await;
        self.build_locked().await
    }

    /// Installed snapshot, building one first if needed
    ///
    /// Concurrent callers that find the store empty wait on a single build.
    pub async fn snapshot(&self) -> Result<Arc<GraphSnapshot>> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }

        let _gate = self.build_gate.lock().await;
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }
        self.build_locked().await
    }

    async fn build_locked(&self) -> Result<Arc<GraphSnapshot>> {
        let generation = self.generation();
        let started = Instant::now();

        let snapshot = match self.build_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch())
                .await
                .map_err(|_| {
                    Error::DataProvider(format!("graph build timed out after {:?}", limit))
                })??,
            None => self.fetch().await?,
        };
        let snapshot = Arc::new(snapshot);

        let mut slot = self.write_slot();
        if slot.generation == generation {
            slot.snapshot = Some(Arc::clone(&snapshot));
            tracing::info!(
                "Graph snapshot built: {} nodes, {} edges in {:?}",
                snapshot.node_count(),
                snapshot.edge_count(),
                started.elapsed()
            );
        } else {
            tracing::debug!(
                "Discarding snapshot from generation {} (now {})",
                generation,
                slot.generation
            );
        }

        Ok(snapshot)
    }

    async fn fetch(&self) -> Result<GraphSnapshot> {
        let nodes = self.provider.list_nodes().await?;
        let edges: Vec<_> = self
            .provider
            .list_active_edges(false)
            .await?
            .into_iter()
            .map(|record| record.edge)
            .collect();
        Ok(GraphSnapshot::build(nodes, &edges))
    }
}
