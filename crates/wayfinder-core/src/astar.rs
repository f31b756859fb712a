//! A* search over a graph snapshot
//!
//! The heuristic only looks at floors: `|floor(a) - floor(b)| * meters_per_floor`.
//! Horizontal distance is ignored, so on a single floor the estimate is
//! always zero and the search behaves like Dijkstra. The estimate stays
//! admissible only while every floor change really costs at least
//! `meters_per_floor`; a shorter staircase edge can make the search return a
//! route that is not globally shortest.

use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use crate::path::{reconstruct, PathResult, Predecessors};
use crate::queue::PriorityQueue;
use crate::snapshot::GraphSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default vertical cost of one floor, in meters
pub const DEFAULT_METERS_PER_FLOOR: f64 = 4.0;

/// Per-query search counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes_expanded: usize,
    pub edges_relaxed: usize,
    /// Heap entries discarded because their node was already finalized
    pub stale_skipped: usize,
    /// Largest open-set size, stale copies included
    pub peak_open: usize,
    pub path_found: bool,
}

/// A found route and how the search got there
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub path: PathResult,
    pub stats: SearchStats,
}

/// A* engine
#[derive(Debug, Clone, Copy)]
pub struct AStar {
    meters_per_floor: f64,
}

impl Default for AStar {
    fn default() -> Self {
        Self::new(DEFAULT_METERS_PER_FLOOR)
    }
}

impl AStar {
    pub fn new(meters_per_floor: f64) -> Self {
        Self { meters_per_floor }
    }

    pub fn meters_per_floor(&self) -> f64 {
        self.meters_per_floor
    }

    /// Floor-only lower bound on remaining cost
    pub fn heuristic(&self, from_floor: i32, to_floor: i32) -> f64 {
        f64::from((from_floor - to_floor).abs()) * self.meters_per_floor
    }

    /// Shortest path from `start` to `goal`
    ///
    /// With `avoid_stairs`, staircase traversals are ignored for this call.
    /// Returns `NoPathFound` when the open set runs dry.
    pub fn search(
        &self,
        snapshot: &GraphSnapshot,
        start: &Node,
        goal: &Node,
        avoid_stairs: bool,
    ) -> Result<SearchOutcome> {
        tracing::debug!(
            "A* search: start={}, goal={}, avoid_stairs={}",
            start.node_code,
            goal.node_code,
            avoid_stairs
        );

        let goal_id = goal.node_id;
        let mut g_score: HashMap<NodeId, f64> = HashMap::new();
        let mut predecessors = Predecessors::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut open = PriorityQueue::new();
        let mut stats = SearchStats::default();

        g_score.insert(start.node_id, 0.0);
        open.push(self.heuristic(start.floor_level, goal.floor_level), start.node_id);

        while let Some((_, current)) = open.pop_min() {
            if !visited.insert(current) {
                stats.stale_skipped += 1;
                continue;
            }
            stats.nodes_expanded += 1;

            let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

            if current == goal_id {
                stats.path_found = true;
                stats.peak_open = open.peak_len();
                tracing::debug!(
                    "A* found path with cost {:.2} ({} expanded, {} stale skipped)",
                    current_g,
                    stats.nodes_expanded,
                    stats.stale_skipped
                );
                let path = reconstruct(&predecessors, snapshot, start, &goal_id, current_g)?;
                return Ok(SearchOutcome { path, stats });
            }

            for option in snapshot.neighbors(&current) {
                if avoid_stairs && option.is_staircase {
                    continue;
                }
                // Finalized nodes keep their predecessor so the chain stays consistent
                if visited.contains(&option.to) {
                    continue;
                }
                stats.edges_relaxed += 1;

                let tentative = current_g + option.distance;
                let improves = g_score
                    .get(&option.to)
                    .map_or(true, |&known| tentative < known);

                if improves {
                    predecessors.insert(option.to, (current, option.clone()));
                    g_score.insert(option.to, tentative);
                    let h = snapshot
                        .node(&option.to)
                        .map(|n| self.heuristic(n.floor_level, goal.floor_level))
                        .unwrap_or(0.0);
                    open.push(tentative + h, option.to);
                }
            }
        }

        stats.peak_open = open.peak_len();
        tracing::debug!(
            "A* exhausted open set after {} expansions: {} -> {}",
            stats.nodes_expanded,
            start.node_code,
            goal.node_code
        );

        Err(Error::NoPathFound {
            start: start.node_code.clone(),
            goal: goal.node_code.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    struct Fixture {
        snapshot: GraphSnapshot,
    }

    impl Fixture {
        fn node(&self, code: &str) -> Node {
            self.snapshot.node_by_code(code).cloned().unwrap()
        }

        fn run(&self, from: &str, to: &str, avoid_stairs: bool) -> Result<SearchOutcome> {
            AStar::default().search(&self.snapshot, &self.node(from), &self.node(to), avoid_stairs)
        }
    }

    /// A(f0) --10 @90--> B(f0) --5 @0 stairs--> C(f1), plus an isolated D
    fn stairs_fixture() -> Fixture {
        let a = Node::new("A", "Atrium", "Main", 0, "room");
        let b = Node::new("B", "Bridge", "Main", 0, "corridor");
        let c = Node::new("C", "Chapel", "Main", 1, "room");
        let d = Node::new("D", "Depot", "Annex", 0, "room");
        let edges = vec![
            Edge::new(a.node_id, b.node_id, 10.0, 90.0),
            Edge::new(b.node_id, c.node_id, 5.0, 0.0).staircase(),
        ];
        Fixture {
            snapshot: GraphSnapshot::build(vec![a, b, c, d], &edges),
        }
    }

    /// Weighted grid where the cheap route is not the fewest-hop route
    ///
    /// A --1--> B --2--> C --1--> D
    ///          |        |
    ///          1        1
    ///          v        v
    ///          E --3--> F
    fn weighted_fixture() -> Fixture {
        let nodes: Vec<Node> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|c| Node::new(*c, *c, "Main", 0, "room"))
            .collect();
        let id = |code: &str| nodes.iter().find(|n| n.node_code == code).unwrap().node_id;
        let edges = vec![
            Edge::new(id("A"), id("B"), 1.0, 90.0),
            Edge::new(id("B"), id("C"), 2.0, 90.0),
            Edge::new(id("C"), id("D"), 1.0, 90.0),
            Edge::new(id("B"), id("E"), 1.0, 180.0),
            Edge::new(id("C"), id("F"), 1.0, 180.0),
            Edge::new(id("E"), id("F"), 3.0, 90.0),
        ];
        Fixture {
            snapshot: GraphSnapshot::build(nodes, &edges),
        }
    }

    #[test]
    fn test_path_over_stairs() {
        let fixture = stairs_fixture();
        let outcome = fixture.run("A", "C", false).unwrap();

        assert_eq!(outcome.path.codes(), vec!["A", "B", "C"]);
        assert_eq!(outcome.path.total_distance, 15.0);
        assert_eq!(outcome.path.num_nodes, 3);
        assert!(outcome.path.steps[2].is_staircase);
        assert!(outcome.stats.path_found);
    }

    #[test]
    fn test_avoid_stairs_blocks_only_route() {
        let fixture = stairs_fixture();
        let err = fixture.run("A", "C", true).unwrap_err();
        assert!(matches!(err, Error::NoPathFound { .. }));
    }

    #[test]
    fn test_disconnected_node() {
        let fixture = stairs_fixture();
        let err = fixture.run("A", "D", false).unwrap_err();
        match err {
            Error::NoPathFound { start, goal } => {
                assert_eq!(start, "A");
                assert_eq!(goal, "D");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_start_and_goal() {
        let fixture = stairs_fixture();
        let outcome = fixture.run("B", "B", false).unwrap();

        assert_eq!(outcome.path.num_nodes, 1);
        assert_eq!(outcome.path.total_distance, 0.0);
        assert!(outcome.path.steps[0].compass_angle.is_none());
    }

    #[test]
    fn test_reverse_direction_uses_inverted_heading() {
        let fixture = stairs_fixture();
        let outcome = fixture.run("C", "A", false).unwrap();

        assert_eq!(outcome.path.codes(), vec!["C", "B", "A"]);
        assert_eq!(outcome.path.steps[1].compass_angle, Some(180.0));
        assert_eq!(outcome.path.steps[2].compass_angle, Some(270.0));
    }

    #[test]
    fn test_prefers_cheaper_route() {
        let fixture = weighted_fixture();
        let outcome = fixture.run("A", "F", false).unwrap();

        // via C: 1+2+1 = 4, via E: 1+1+3 = 5
        assert_eq!(outcome.path.codes(), vec!["A", "B", "C", "F"]);
        assert_eq!(outcome.path.total_distance, 4.0);
    }

    #[test]
    fn test_step_distances_sum_to_total() {
        let fixture = weighted_fixture();
        for (from, to) in [("A", "F"), ("D", "E"), ("F", "A"), ("E", "D")] {
            let path = fixture.run(from, to, false).unwrap().path;
            let summed: f64 = path.steps.iter().map(|s| s.distance_from_prev).sum();
            assert!(
                (summed - path.total_distance).abs() <= 0.005,
                "{from}->{to}: summed {summed} vs total {}",
                path.total_distance
            );
        }
    }

    #[test]
    fn test_lazy_deletion_skips_stale_entries() {
        // S reaches T directly at cost 10 and via M at cost 2; T is pushed twice
        let s = Node::new("S", "S", "Main", 0, "room");
        let m = Node::new("M", "M", "Main", 0, "room");
        let t = Node::new("T", "T", "Main", 0, "room");
        let g = Node::new("G", "G", "Main", 0, "room");
        let edges = vec![
            Edge::new(s.node_id, t.node_id, 10.0, 0.0),
            Edge::new(s.node_id, m.node_id, 1.0, 0.0),
            Edge::new(m.node_id, t.node_id, 1.0, 0.0),
            Edge::new(t.node_id, g.node_id, 20.0, 0.0),
        ];
        let fixture = Fixture {
            snapshot: GraphSnapshot::build(vec![s, m, t, g], &edges),
        };

        let outcome = fixture.run("S", "G", false).unwrap();
        assert_eq!(outcome.path.codes(), vec!["S", "M", "T", "G"]);
        assert_eq!(outcome.path.total_distance, 22.0);
        assert_eq!(outcome.stats.stale_skipped, 1);
    }

    #[test]
    fn test_invalid_distances_never_routed() {
        let a = Node::new("A", "A", "Main", 0, "room");
        let b = Node::new("B", "B", "Main", 0, "room");
        let c = Node::new("C", "C", "Main", 0, "room");
        let edges = vec![
            Edge::new(a.node_id, b.node_id, -5.0, 90.0),
            Edge::new(a.node_id, c.node_id, f64::NAN, 0.0),
        ];
        let fixture = Fixture {
            snapshot: GraphSnapshot::build(vec![a, b, c], &edges),
        };

        for goal in ["B", "C"] {
            let err = fixture.run("A", goal, false).unwrap_err();
            assert!(matches!(err, Error::NoPathFound { .. }), "A->{goal}: {err}");
        }
    }

    #[test]
    fn test_heuristic_counts_floors() {
        let engine = AStar::new(4.0);
        assert_eq!(engine.heuristic(0, 0), 0.0);
        assert_eq!(engine.heuristic(0, 3), 12.0);
        assert_eq!(engine.heuristic(2, -1), 12.0);
    }

    #[test]
    fn test_avoid_stairs_takes_level_detour() {
        // Stairs A->C cost 5; level detour via lift L costs 30
        let a = Node::new("A", "A", "Main", 0, "room");
        let l = Node::new("L", "Lift", "Main", 0, "elevator");
        let c = Node::new("C", "C", "Main", 1, "room");
        let edges = vec![
            Edge::new(a.node_id, c.node_id, 5.0, 0.0).staircase(),
            Edge::new(a.node_id, l.node_id, 10.0, 90.0),
            Edge::new(l.node_id, c.node_id, 20.0, 0.0),
        ];
        let fixture = Fixture {
            snapshot: GraphSnapshot::build(vec![a, l, c], &edges),
        };

        let with_stairs = fixture.run("A", "C", false).unwrap().path;
        assert_eq!(with_stairs.codes(), vec!["A", "C"]);

        let without = fixture.run("A", "C", true).unwrap().path;
        assert_eq!(without.codes(), vec!["A", "L", "C"]);
        assert!(!without.uses_stairs());
        assert_eq!(without.total_distance, 30.0);
    }
}
