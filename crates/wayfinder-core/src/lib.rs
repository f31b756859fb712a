//! Wayfinder Core - Routing engine for indoor navigation
//!
//! This crate provides the data types, the immutable graph snapshot and the
//! A* search used to route between named locations inside a building.

pub mod astar;
pub mod compass;
pub mod directions;
pub mod edge;
pub mod error;
pub mod graph;
pub mod limits;
pub mod node;
pub mod path;
pub mod queue;
pub mod snapshot;

pub use astar::{AStar, SearchOutcome, SearchStats, DEFAULT_METERS_PER_FLOOR};
pub use compass::{compass_abbreviation, compass_word};
pub use directions::{narrate, Directions};
pub use edge::{Edge, EdgeId, EdgeRecord, NewEdge};
pub use error::{Error, Result};
pub use graph::{BuildingGraph, GraphProvider};
pub use node::{NewNode, Node, NodeId, NodeType};
pub use path::{PathResult, PathStep};
pub use queue::PriorityQueue;
pub use snapshot::{GraphSnapshot, Traversal};
