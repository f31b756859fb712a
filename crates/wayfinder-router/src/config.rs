//! Router configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wayfinder_core::limits::validate_meters_per_floor;
use wayfinder_core::{Result, DEFAULT_METERS_PER_FLOOR};

/// Tunables for a [`RouteService`](crate::RouteService)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Vertical cost of one floor used by the A* heuristic
    #[serde(default = "default_meters_per_floor")]
    pub meters_per_floor: f64,

    /// Upper bound on a snapshot build (provider fetch), in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timeout_secs: Option<u64>,
}

fn default_meters_per_floor() -> f64 {
    DEFAULT_METERS_PER_FLOOR
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            meters_per_floor: default_meters_per_floor(),
            build_timeout_secs: None,
        }
    }
}

impl RouteConfig {
    pub fn with_meters_per_floor(mut self, meters: f64) -> Self {
        self.meters_per_floor = meters;
        self
    }

    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    pub fn build_timeout(&self) -> Option<Duration> {
        self.build_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        validate_meters_per_floor(self.meters_per_floor)?;
        Ok(())
    }
}
