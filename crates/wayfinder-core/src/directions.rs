//! Turn-by-turn narration of a route

use crate::compass::compass_word;
use crate::path::PathResult;
use serde::{Deserialize, Serialize};

/// A route together with its human-readable instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directions {
    #[serde(flatten)]
    pub path: PathResult,

    /// One instruction per step, in traversal order
    pub instructions: Vec<String>,
}

impl Directions {
    pub fn new(path: PathResult) -> Self {
        let instructions = narrate(&path);
        Self { path, instructions }
    }
}

/// Render a number with at most two decimals and no trailing zeros
pub fn format_number(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Instructions for every step of a path
pub fn narrate(path: &PathResult) -> Vec<String> {
    path.steps
        .iter()
        .enumerate()
        .map(|(i, step)| match (i, step.compass_angle) {
            (0, _) | (_, None) => format!(
                "Start at {} ({}, Floor {})",
                step.name, step.building, step.floor_level
            ),
            (_, Some(angle)) => format!(
                "Go {} ({}°) for {}m{} to {}",
                compass_word(angle),
                format_number(angle),
                format_number(step.distance_from_prev),
                if step.is_staircase { " via stairs" } else { "" },
                step.name
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::AStar;
    use crate::edge::Edge;
    use crate::node::Node;
    use crate::snapshot::GraphSnapshot;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(90.0), "90");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.004), "1");
    }

    #[test]
    fn test_narrate_route_with_stairs() {
        let a = Node::new("A", "Atrium", "Main Hall", 0, "room");
        let b = Node::new("B", "Bridge", "Main Hall", 0, "corridor");
        let c = Node::new("C", "Chapel", "Main Hall", 1, "room");
        let edges = vec![
            Edge::new(a.node_id, b.node_id, 10.0, 90.0),
            Edge::new(b.node_id, c.node_id, 5.0, 0.0).staircase(),
        ];
        let snapshot = GraphSnapshot::build(vec![a.clone(), b, c.clone()], &edges);

        let path = AStar::default().search(&snapshot, &a, &c, false).unwrap().path;
        let directions = Directions::new(path);

        assert_eq!(
            directions.instructions,
            vec![
                "Start at Atrium (Main Hall, Floor 0)".to_string(),
                "Go East (90°) for 10m to Bridge".to_string(),
                "Go North (0°) for 5m via stairs to Chapel".to_string(),
            ]
        );
        assert_eq!(directions.instructions.len(), directions.path.num_nodes);
    }

    #[test]
    fn test_directions_serialize_flat() {
        let a = Node::new("A", "Atrium", "Main", 0, "room");
        let snapshot = GraphSnapshot::build(vec![a.clone()], &[]);
        let path = AStar::default().search(&snapshot, &a, &a, false).unwrap().path;

        let value = serde_json::to_value(Directions::new(path)).unwrap();
        assert_eq!(value["num_nodes"], 1);
        assert_eq!(value["total_distance"], 0.0);
        assert_eq!(value["instructions"][0], "Start at Atrium (Main, Floor 0)");
        assert!(value["steps"][0]["compass_angle"].is_null());
    }
}
