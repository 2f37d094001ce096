use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use pathworld_common::{NodeId, Point, Terrain, TerrainType};
use pathworld_kernel::{Agent, Navigation, QueryError, WeightMode, World, WorldBuilder};
use pathworld_tools::WorldInspector;
use tracing_subscriber::EnvFilter;

/// Speeds used when no agent profile is given (ocean first).
const DEFAULT_SPEEDS: [f32; TerrainType::COUNT] = [80.0, 60.0, 50.0, 30.0, 20.0, 40.0, 40.0];

#[derive(Parser)]
#[command(name = "pathworld-cli", about = "CLI tool for pathworld maps")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a map and print a summary
    Info {
        /// World file
        map: PathBuf,
    },
    /// Find the region containing a point
    Locate {
        map: PathBuf,
        x: f32,
        y: f32,
    },
    /// Compute a route between two regions
    Path {
        map: PathBuf,
        /// Start region id
        from: u32,
        /// Goal region id
        to: u32,
        /// Weight edges by raw distance instead of travel time
        #[arg(long)]
        speed_mode: bool,
        /// Agent profile as JSON: {"speed": [ocean, swamp, forest, clay, limestone, sand, rock]}
        #[arg(long)]
        agent: Option<PathBuf>,
        /// Print waypoints start first
        #[arg(long)]
        forward: bool,
    },
    /// Write a grid world for experimentation
    Demo {
        /// Output file
        out: PathBuf,
        #[arg(long, default_value = "16")]
        cols: u32,
        #[arg(long, default_value = "16")]
        rows: u32,
        /// Cell side length
        #[arg(long, default_value = "10.0")]
        cell: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { map } => {
            let world = open_world(&map)?;
            println!("{}", WorldInspector::summary(&world));
        }
        Commands::Locate { map, x, y } => {
            let world = open_world(&map)?;
            match world.find_region(Point::new(x, y)) {
                Ok(id) => {
                    let info = WorldInspector::inspect_node(&world, id)
                        .context("located region missing from graph")?;
                    println!("{info}");
                }
                Err(QueryError::NotFound { .. }) => println!("({x}, {y}): not found"),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Path {
            map,
            from,
            to,
            speed_mode,
            agent,
            forward,
        } => {
            let world = open_world(&map)?;
            let agent = load_agent(agent.as_deref())?;
            let (from, to) = (NodeId(from), NodeId(to));
            for id in [from, to] {
                check_queryable(&world, id)?;
            }

            let mode = WeightMode::from_speed_mode(speed_mode);
            match world.compute_route(&agent, from, to, mode) {
                Ok(route) => {
                    let mut waypoints = route.waypoints(world.graph());
                    if forward {
                        waypoints.reverse();
                    }
                    println!(
                        "Route {from} -> {to}: {} regions, cost {:.4}, {} expanded",
                        route.nodes.len(),
                        route.cost,
                        route.expanded
                    );
                    for p in waypoints {
                        println!("  ({:.2}, {:.2})", p.x, p.y);
                    }
                }
                Err(QueryError::NoPath { .. }) => println!("No path from {from} to {to}"),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Demo {
            out,
            cols,
            rows,
            cell,
        } => {
            check_grid(cols, rows, cell)?;

            let land = &TerrainType::ALL[1..];
            let builder = WorldBuilder::grid(cols, rows, cell, |col, row| {
                let kind = land[((col + row) as usize) % land.len()];
                Terrain::new(kind, ((col * 37 + row * 11) % 400) as f32)
            });

            let file = File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let mut sink = BufWriter::new(file);
            let written = builder.write_to(&mut sink)?;
            sink.flush()?;
            println!(
                "Wrote {} ({} regions, {} bytes)",
                out.display(),
                builder.nodes().len(),
                written
            );
        }
    }

    Ok(())
}

fn open_world(path: &Path) -> anyhow::Result<World> {
    World::open(path).with_context(|| format!("failed to load world {}", path.display()))
}

fn load_agent(path: Option<&Path>) -> anyhow::Result<Agent> {
    let navigation = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read agent {}", path.display()))?;
            let navigation: Navigation = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse agent {}", path.display()))?;
            navigation.validate()?;
            navigation
        }
        None => Navigation::new(DEFAULT_SPEEDS),
    };
    tracing::debug!(speeds = ?navigation.speed, "agent profile");
    Ok(Agent::new(navigation))
}

/// Validate `demo` grid dimensions before anything is allocated.
fn check_grid(cols: u32, rows: u32, cell: f32) -> anyhow::Result<()> {
    if cols == 0 || rows == 0 {
        bail!("grid needs at least one column and one row");
    }
    if WorldBuilder::grid_vertex_count(cols, rows).is_none() {
        bail!("grid of {cols} x {rows} cells is too large");
    }
    // Cannot overflow: cells are fewer than lattice vertices.
    if cols * rows < 2 {
        bail!("grid needs at least two cells to have a connection");
    }
    if !(cell.is_finite() && cell > 0.0) {
        bail!("cell size must be positive, got {cell}");
    }
    Ok(())
}

/// Reject ids the path search would treat as caller bugs.
fn check_queryable(world: &World, id: NodeId) -> anyhow::Result<()> {
    if !world.graph().contains(id) {
        bail!("region {id} out of range (world has {} regions)", world.node_count());
    }
    if world.walk_terrain(id).subgraph_id == 0 {
        bail!("region {id} has subgraph id 0 and cannot be routed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions() {
        assert!(check_grid(16, 16, 10.0).is_ok());
        assert!(check_grid(0, 4, 1.0).is_err());
        assert!(check_grid(1, 1, 1.0).is_err());
        assert!(check_grid(4, 4, 0.0).is_err());
        assert!(check_grid(4, 4, f32::NAN).is_err());
    }

    #[test]
    fn oversized_grid_is_an_error_not_a_panic() {
        let err = check_grid(70_000, 70_000, 1.0).unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(check_grid(u32::MAX, 1, 1.0).is_err());
    }
}
