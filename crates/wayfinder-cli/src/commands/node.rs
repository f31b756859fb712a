//! Node commands

use clap::{Args, Subcommand};

use crate::lookup;
use crate::output::{to_json, OutputFormat, Table};
use crate::{AppContext, Cli};
use wayfinder_core::limits::{validate_node_code, validate_node_name};
use wayfinder_core::{NewNode, Node};

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Add a new node
    Add {
        /// Unique node code
        code: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Building the node belongs to
        #[arg(short, long)]
        building: String,
        /// Floor level (negative for basements)
        #[arg(long, allow_hyphen_values = true)]
        floor: i32,
        /// Node type
        #[arg(short = 't', long, default_value = "room")]
        r#type: String,
        /// Photo of the location
        #[arg(long)]
        image_url: Option<String>,
        /// QR code placed at the location
        #[arg(long)]
        qr_code_url: Option<String>,
        /// Floor-plan x coordinate
        #[arg(long, requires = "map_y", allow_hyphen_values = true)]
        map_x: Option<f64>,
        /// Floor-plan y coordinate
        #[arg(long, requires = "map_x", allow_hyphen_values = true)]
        map_y: Option<f64>,
    },
    /// List nodes
    List {
        /// Filter by building
        #[arg(short, long)]
        building: Option<String>,
        /// Filter by floor
        #[arg(long, allow_hyphen_values = true)]
        floor: Option<i32>,
        /// Filter by type
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Get node details
    Get {
        /// Node code
        code: String,
    },
    /// Delete a node and every edge touching it
    Delete {
        /// Node code
        code: String,
        /// Confirm deletion
        #[arg(long)]
        force: bool,
    },
    /// Fuzzy search nodes by code, name or building
    Search {
        /// Search text
        query: String,
        /// Limit results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

/// Look up a node by code, suggesting near matches when it is missing
pub async fn require_node(ctx: &AppContext, code: &str) -> anyhow::Result<Node> {
    if let Some(node) = ctx.storage.get_node_by_code(code).await? {
        return Ok(node);
    }
    let nodes = ctx.storage.list_nodes().await?;
    anyhow::bail!("{}", not_found_message(&nodes, code))
}

pub fn not_found_message(nodes: &[Node], code: &str) -> String {
    let suggestions = lookup::suggestions(nodes, code);
    if suggestions.is_empty() {
        format!("Node '{}' not found", code)
    } else {
        format!(
            "Node '{}' not found. Did you mean: {}?",
            code,
            suggestions.join(", ")
        )
    }
}

fn node_table<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Table {
    let mut table = Table::new(&["CODE", "NAME", "BUILDING", "FLOOR", "TYPE"]);
    for node in nodes {
        table.row(vec![
            node.node_code.clone(),
            node.name.clone(),
            node.building.clone(),
            node.floor_level.to_string(),
            node.node_type.0.clone(),
        ]);
    }
    table
}

pub async fn run(args: &NodeArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        NodeCommands::Add {
            code,
            name,
            building,
            floor,
            r#type,
            image_url,
            qr_code_url,
            map_x,
            map_y,
        } => {
            validate_node_code(code)?;
            validate_node_name(name)?;
            validate_node_name(building)?;

            let mut new_node = NewNode::new(code, name, building, *floor).with_type(r#type);
            new_node.image_url = image_url.clone();
            new_node.qr_code_url = qr_code_url.clone();
            new_node.map_x = *map_x;
            new_node.map_y = *map_y;
            let node = new_node.into_node();

            ctx.storage.save_node(&node).await?;
            tracing::info!("Created node: {} ({})", code, node.node_id);

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&node)?),
                OutputFormat::Table => println!(
                    "Created node: {} ({}, {} floor {})",
                    code, name, building, floor
                ),
            }
        }
        NodeCommands::List {
            building,
            floor,
            r#type,
            limit,
        } => {
            let nodes = ctx.storage.list_nodes().await?;
            let filtered: Vec<Node> = nodes
                .into_iter()
                .filter(|n| {
                    building
                        .as_ref()
                        .map_or(true, |b| n.building.eq_ignore_ascii_case(b))
                })
                .filter(|n| floor.map_or(true, |f| n.floor_level == f))
                .filter(|n| {
                    r#type
                        .as_ref()
                        .map_or(true, |t| n.node_type.0.eq_ignore_ascii_case(t))
                })
                .take(*limit)
                .collect();

            tracing::info!("Found {} nodes", filtered.len());

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&filtered)?),
                OutputFormat::Table if filtered.is_empty() => println!("No nodes found"),
                OutputFormat::Table => println!("{}", node_table(&filtered).render()),
            }
        }
        NodeCommands::Get { code } => {
            let node = require_node(ctx, code).await?;
            let edges = ctx.storage.edges_for_node(&node.node_id).await?;

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&node)?),
                OutputFormat::Table => {
                    println!("Node: {}", node.node_code);
                    println!("  Name: {}", node.name);
                    println!("  Building: {}", node.building);
                    println!("  Floor: {}", node.floor_level);
                    println!("  Type: {}", node.node_type.as_str());
                    if let Some((x, y)) = node.map_position() {
                        println!("  Map: ({}, {})", x, y);
                    }
                    if let Some(url) = &node.image_url {
                        println!("  Image: {}", url);
                    }
                    if let Some(url) = &node.qr_code_url {
                        println!("  QR code: {}", url);
                    }
                    println!("  Created: {}", node.created_at);
                    println!("  Updated: {}", node.updated_at);
                    println!("  Edges: {}", edges.len());
                }
            }
        }
        NodeCommands::Delete { code, force } => {
            let node = require_node(ctx, code).await?;

            if !force {
                println!("Use --force to confirm deletion of node '{}'", code);
                return Ok(());
            }

            let edges = ctx.storage.edges_for_node(&node.node_id).await?.len();
            ctx.storage.delete_node(&node.node_id).await?;
            tracing::info!("Deleted node: {} with {} edges", code, edges);
            println!("Deleted node: {} ({} edges removed)", code, edges);
        }
        NodeCommands::Search { query, limit } => {
            let nodes = ctx.storage.list_nodes().await?;
            let hits = lookup::rank(&nodes, query, *limit);

            match ctx.format {
                OutputFormat::Json => {
                    let found: Vec<&Node> = hits.iter().map(|(n, _)| *n).collect();
                    println!("{}", to_json(&found)?);
                }
                OutputFormat::Table if hits.is_empty() => {
                    println!("No nodes matching '{}'", query)
                }
                OutputFormat::Table => {
                    println!("{}", node_table(hits.iter().map(|(n, _)| *n)).render())
                }
            }
        }
    }

    Ok(())
}
