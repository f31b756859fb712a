//! Route command

use clap::Args;

use crate::commands::node::not_found_message;
use crate::output::{to_json, OutputFormat, Table};
use crate::{AppContext, Cli};
use wayfinder_core::compass::compass_abbreviation;
use wayfinder_core::directions::format_number;
use wayfinder_core::{Directions, Error, PathResult};

#[derive(Args)]
pub struct RouteArgs {
    /// Start node code
    pub from: String,

    /// Destination node code
    pub to: String,

    /// Never use staircase edges
    #[arg(long)]
    pub avoid_stairs: bool,

    /// Print turn-by-turn instructions
    #[arg(long)]
    pub directions: bool,

    /// Print search statistics
    #[arg(long)]
    pub stats: bool,
}

fn step_table(path: &PathResult) -> Table {
    let mut table = Table::new(&["#", "CODE", "NAME", "FLOOR", "HEADING", "DISTANCE"]);
    for (i, step) in path.steps.iter().enumerate() {
        let heading = step
            .compass_angle
            .map(|a| format!("{} ({}°)", compass_abbreviation(a), format_number(a)))
            .unwrap_or_else(|| "-".to_string());
        let stairs = if step.is_staircase { " stairs" } else { "" };
        table.row(vec![
            (i + 1).to_string(),
            step.node_code.clone(),
            step.name.clone(),
            step.floor_level.to_string(),
            heading,
            format!("{}m{}", format_number(step.distance_from_prev), stairs),
        ]);
    }
    table
}

pub async fn run(args: &RouteArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let avoid_stairs = args.avoid_stairs || ctx.config.avoid_stairs;
    let router = ctx.router()?;

    let outcome = match router.search(&args.from, &args.to, avoid_stairs).await {
        Ok(outcome) => outcome,
        Err(Error::NodeNotFound(code)) => {
            let nodes = ctx.storage.list_nodes().await?;
            anyhow::bail!("{}", not_found_message(&nodes, &code));
        }
        Err(Error::NoPathFound { start, goal }) => {
            if avoid_stairs {
                anyhow::bail!("No route from {} to {} without stairs", start, goal);
            }
            anyhow::bail!("No route from {} to {}", start, goal);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!("Search stats: {:?}", outcome.stats);
    let path = outcome.path;

    match ctx.format {
        OutputFormat::Json if args.directions => println!("{}", to_json(&Directions::new(path))?),
        OutputFormat::Json => println!("{}", to_json(&path)?),
        OutputFormat::Table => {
            if args.directions {
                let directions = Directions::new(path);
                for (i, line) in directions.instructions.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, line);
                }
                println!();
                println!(
                    "Total: {}m over {} nodes",
                    format_number(directions.path.total_distance),
                    directions.path.num_nodes
                );
            } else {
                println!("{}", step_table(&path).render());
                println!();
                println!(
                    "Total: {}m over {} nodes",
                    format_number(path.total_distance),
                    path.num_nodes
                );
            }
        }
    }

    if args.stats {
        let stats = &outcome.stats;
        eprintln!(
            "expanded={} relaxed={} stale={} peak_open={}",
            stats.nodes_expanded, stats.edges_relaxed, stats.stale_skipped, stats.peak_open
        );
    }

    Ok(())
}
