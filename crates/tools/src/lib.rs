//! Developer tooling: read-only reports over a loaded world.
//!
//! # Invariants
//! - Tools never mutate the world they inspect.

mod inspector;

pub use inspector::{NodeInfo, WorldInspector, WorldSummary};
