//! Navigation kernel: terrain graph, world loading, region lookup and
//! agent-aware path search.
//!
//! # Invariants
//! - A loaded world has at least one region and one connection.
//! - Every edge has a finite distance > 0 and never joins ocean to land.
//! - Regions in different subgraphs are never connected; a path query across
//!   subgraphs fails without searching.
//! - A failed load leaves the world null; no partial world is observable.

pub mod agent;
pub mod error;
pub mod format;
pub mod graph;
pub mod loader;
pub mod search;
pub mod weight;
pub mod world;

pub use agent::{Agent, Navigation};
pub use error::{AgentError, LoadError, QueryError};
pub use format::{FORMAT_VERSION, FormatVersion, WorldBuilder};
pub use graph::{EdgeInfo, TerrainGraph, WalkTerrain};
pub use loader::{LoadConfig, LoadedWorld};
pub use search::{Route, SearchTree};
pub use weight::WeightMode;
pub use world::World;
