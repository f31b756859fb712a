//! Edge commands

use std::collections::HashMap;

use clap::{Args, Subcommand};

use crate::commands::node::require_node;
use crate::output::{to_json, OutputFormat, Table};
use crate::{AppContext, Cli};
use wayfinder_core::directions::format_number;
use wayfinder_core::limits::{validate_compass_angle, validate_distance, validate_endpoints};
use wayfinder_core::{Edge, EdgeId, EdgeRecord, NodeId};

#[derive(Args)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommands,
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Connect two nodes (routable in both directions)
    Add {
        /// Source node code
        from: String,
        /// Target node code
        to: String,
        /// Walking distance in meters
        #[arg(long)]
        distance: f64,
        /// Heading from source to target, degrees clockwise from North
        #[arg(short, long)]
        angle: f64,
        /// Edge is a staircase
        #[arg(long)]
        stairs: bool,
        /// Create the edge disabled
        #[arg(long)]
        inactive: bool,
    },
    /// List edges
    List {
        /// Only edges touching this node code
        #[arg(short, long)]
        node: Option<String>,
        /// Only active edges
        #[arg(long)]
        active: bool,
    },
    /// Delete an edge
    Delete {
        /// Edge id
        id: String,
    },
    /// Re-enable a disabled edge
    Enable {
        /// Edge id
        id: String,
    },
    /// Temporarily close an edge to routing
    Disable {
        /// Edge id
        id: String,
    },
}

fn parse_edge_id(id: &str) -> anyhow::Result<EdgeId> {
    EdgeId::from_string(id).map_err(|e| anyhow::anyhow!("Invalid edge id '{}': {}", id, e))
}

async fn node_codes(ctx: &AppContext) -> anyhow::Result<HashMap<NodeId, String>> {
    Ok(ctx
        .storage
        .list_nodes()
        .await?
        .into_iter()
        .map(|n| (n.node_id, n.node_code))
        .collect())
}

fn edge_table(edges: &[Edge], codes: &HashMap<NodeId, String>) -> Table {
    let code = |id: &NodeId| codes.get(id).cloned().unwrap_or_else(|| id.to_string());

    let mut table = Table::new(&["ID", "FROM", "TO", "DISTANCE", "ANGLE", "STAIRS", "ACTIVE"]);
    for edge in edges {
        table.row(vec![
            edge.edge_id.to_string(),
            code(&edge.from_node_id),
            code(&edge.to_node_id),
            format_number(edge.distance),
            format_number(edge.compass_angle),
            if edge.is_staircase { "yes" } else { "no" }.to_string(),
            if edge.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

pub async fn run(args: &EdgeArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        EdgeCommands::Add {
            from,
            to,
            distance,
            angle,
            stairs,
            inactive,
        } => {
            validate_endpoints(from, to)?;
            validate_distance(*distance)?;
            validate_compass_angle(*angle)?;

            let from_node = require_node(ctx, from).await?;
            let to_node = require_node(ctx, to).await?;

            let mut edge = Edge::new(from_node.node_id, to_node.node_id, *distance, *angle);
            if *stairs {
                edge = edge.staircase();
            }
            if *inactive {
                edge = edge.inactive();
            }

            ctx.storage.save_edge(&edge).await?;
            tracing::info!("Created edge {}: {} -> {}", edge.edge_id, from, to);

            match ctx.format {
                OutputFormat::Json => {
                    let record = EdgeRecord::with_endpoints(edge, Some(from_node), Some(to_node));
                    println!("{}", to_json(&record)?);
                }
                OutputFormat::Table => println!(
                    "Created edge {}: {} -> {} ({}m at {}°)",
                    edge.edge_id,
                    from,
                    to,
                    format_number(*distance),
                    format_number(edge.compass_angle)
                ),
            }
        }
        EdgeCommands::List { node, active } => {
            let mut edges = match node {
                Some(code) => {
                    let node = require_node(ctx, code).await?;
                    ctx.storage.edges_for_node(&node.node_id).await?
                }
                None => ctx.storage.list_edges().await?,
            };
            if *active {
                edges.retain(|e| e.is_active);
            }

            tracing::info!("Found {} edges", edges.len());

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&edges)?),
                OutputFormat::Table if edges.is_empty() => println!("No edges found"),
                OutputFormat::Table => {
                    let codes = node_codes(ctx).await?;
                    println!("{}", edge_table(&edges, &codes).render());
                }
            }
        }
        EdgeCommands::Delete { id } => {
            let edge_id = parse_edge_id(id)?;
            if ctx.storage.get_edge(&edge_id).await?.is_none() {
                anyhow::bail!("Edge '{}' not found", id);
            }
            ctx.storage.delete_edge(&edge_id).await?;
            tracing::info!("Deleted edge: {}", id);
            println!("Deleted edge: {}", id);
        }
        EdgeCommands::Enable { id } => {
            let edge = ctx.storage.set_edge_active(&parse_edge_id(id)?, true).await?;
            println!("Enabled edge: {}", edge.edge_id);
        }
        EdgeCommands::Disable { id } => {
            let edge = ctx.storage.set_edge_active(&parse_edge_id(id)?, false).await?;
            println!("Disabled edge: {}", edge.edge_id);
        }
    }

    Ok(())
}
