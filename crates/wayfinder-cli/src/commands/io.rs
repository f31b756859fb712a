//! Import/Export commands

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{AppContext, Cli};
use wayfinder_core::limits::{
    validate_compass_angle, validate_distance, validate_endpoints, validate_import,
    validate_node_code, validate_node_name,
};
use wayfinder_core::{BuildingGraph, Edge, NewEdge, NewNode, Node, NodeId};

pub const EXPORT_VERSION: &str = "1";

#[derive(Args)]
pub struct ImportArgs {
    /// Input file (JSON format)
    pub file: PathBuf,

    /// Merge with existing data (default: error if the graph is not empty)
    #[arg(long)]
    pub merge: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Building graph with edges keyed by node code
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub version: String,
    pub nodes: Vec<NewNode>,
    pub edges: Vec<NewEdge>,
}

fn validate_data(data: &ExportData) -> anyhow::Result<()> {
    validate_import(data.nodes.len(), data.edges.len())?;

    let mut seen = HashSet::new();
    for node in &data.nodes {
        validate_node_code(&node.code)?;
        validate_node_name(&node.name)?;
        validate_node_name(&node.building)?;
        if !seen.insert(node.code.as_str()) {
            anyhow::bail!("Duplicate node code in import: {}", node.code);
        }
    }

    for edge in &data.edges {
        validate_endpoints(&edge.from, &edge.to)?;
        validate_distance(edge.distance)?;
        validate_compass_angle(edge.compass_angle)?;
    }

    Ok(())
}

/// Resolve an import against what is already stored
///
/// Nodes whose code already exists keep their identity and are overwritten.
fn plan_import(data: ExportData, existing: Vec<Node>) -> anyhow::Result<BuildingGraph> {
    let mut by_code: HashMap<String, Node> = existing
        .into_iter()
        .map(|n| (n.node_code.clone(), n))
        .collect();

    let mut nodes = Vec::with_capacity(data.nodes.len());
    for new_node in data.nodes {
        let mut node = new_node.into_node();
        if let Some(previous) = by_code.get(&node.node_code) {
            node.node_id = previous.node_id;
            node.created_at = previous.created_at;
        }
        by_code.insert(node.node_code.clone(), node.clone());
        nodes.push(node);
    }

    let resolve = |code: &str| -> anyhow::Result<NodeId> {
        by_code
            .get(code)
            .map(|n| n.node_id)
            .ok_or_else(|| anyhow::anyhow!("Edge references unknown node '{}'", code))
    };

    let mut edges = Vec::with_capacity(data.edges.len());
    for new_edge in &data.edges {
        let mut edge = Edge::new(
            resolve(&new_edge.from)?,
            resolve(&new_edge.to)?,
            new_edge.distance,
            new_edge.compass_angle,
        );
        edge.is_staircase = new_edge.is_staircase;
        edge.is_active = new_edge.is_active;
        edges.push(edge);
    }

    Ok(BuildingGraph::new().with_nodes(nodes).with_edges(edges))
}

pub async fn run_import(args: &ImportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let content = std::fs::read_to_string(&args.file)?;
    let data: ExportData = serde_json::from_str(&content)?;

    tracing::debug!("Import format version: {}", data.version);
    if data.version != EXPORT_VERSION {
        tracing::warn!(
            "Import file version {} differs from {}",
            data.version,
            EXPORT_VERSION
        );
    }

    validate_data(&data)?;

    let existing = ctx.storage.list_nodes().await?;
    if !args.merge && !existing.is_empty() {
        anyhow::bail!(
            "Graph already has {} nodes. Use --merge to add to existing data.",
            existing.len()
        );
    }

    let graph = plan_import(data, existing)?;
    ctx.storage.save_graph(&graph).await?;

    tracing::info!(
        "Imported {} nodes and {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    println!(
        "Imported {} nodes and {} edges from {:?}",
        graph.nodes.len(),
        graph.edges.len(),
        args.file
    );

    Ok(())
}

pub async fn run_export(args: &ExportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Exporting data");

    let graph = ctx.storage.load_graph().await?;
    let data = export_data(&graph);

    tracing::debug!(
        "Exporting {} nodes and {} edges",
        data.nodes.len(),
        data.edges.len()
    );

    let content = serde_json::to_string_pretty(&data)?;

    if let Some(ref path) = args.output {
        // Write with secure permissions (0o600 = owner read/write only)
        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(path, &content)?;
        }
        println!("Exported to {:?}", path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn export_data(graph: &BuildingGraph) -> ExportData {
    let codes: HashMap<NodeId, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.node_id, n.node_code.as_str()))
        .collect();

    let edges = graph
        .edges
        .iter()
        .filter_map(|e| {
            let (Some(from), Some(to)) = (codes.get(&e.from_node_id), codes.get(&e.to_node_id))
            else {
                tracing::warn!("Skipping edge {} with a missing endpoint", e.edge_id);
                return None;
            };
            let mut edge = NewEdge::new(*from, *to, e.distance, e.compass_angle);
            edge.is_staircase = e.is_staircase;
            edge.is_active = e.is_active;
            Some(edge)
        })
        .collect();

    ExportData {
        version: EXPORT_VERSION.to_string(),
        nodes: graph.nodes.iter().map(NewNode::from).collect(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExportData {
        serde_json::from_str(
            r#"{
                "version": "1",
                "nodes": [
                    {"code": "A", "name": "Atrium", "building": "Main", "floor_level": 0},
                    {"code": "B", "name": "Bridge", "building": "Main", "floor_level": 1, "type": "stairwell"}
                ],
                "edges": [
                    {"from": "A", "to": "B", "distance": 5, "compass_angle": 0, "is_staircase": true}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_rejects_duplicate_codes() {
        let mut data = sample();
        data.nodes.push(NewNode::new("A", "Again", "Main", 0));
        assert!(validate_data(&data).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_angle() {
        let mut data = sample();
        data.edges[0].compass_angle = 360.0;
        assert!(validate_data(&data).is_err());
    }

    #[test]
    fn test_plan_keeps_existing_identity() {
        let existing = Node::new("A", "Old Atrium", "Main", 0, "room");
        let existing_id = existing.node_id;

        let graph = plan_import(sample(), vec![existing]).unwrap();
        let a = graph.node_by_code("A").unwrap();
        assert_eq!(a.node_id, existing_id);
        assert_eq!(a.name, "Atrium");
        assert_eq!(graph.edges[0].from_node_id, existing_id);
        assert!(graph.edges[0].is_staircase);
    }

    #[test]
    fn test_plan_rejects_unknown_endpoint() {
        let mut data = sample();
        data.edges[0].to = "Z".to_string();
        assert!(plan_import(data, Vec::new()).is_err());
    }

    #[test]
    fn test_export_uses_codes() {
        let graph = plan_import(sample(), Vec::new()).unwrap();
        let data = export_data(&graph);
        assert_eq!(data.version, EXPORT_VERSION);
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.edges[0].from, "A");
        assert_eq!(data.edges[0].to, "B");
        assert_eq!(data.nodes[1].node_type, "stairwell");
    }
}
