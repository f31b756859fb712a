//! Wayfinder Router - shortest paths and directions between node codes
//!
//! Wraps a [`GraphProvider`](wayfinder_core::GraphProvider) with a lazily
//! built, atomically swapped graph snapshot and runs A* against it.

pub mod config;
pub mod service;
pub mod store;

pub use config::RouteConfig;
pub use service::RouteService;
pub use store::GraphStore;
