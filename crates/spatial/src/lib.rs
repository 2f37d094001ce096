//! Spatial index: which regions' bounding boxes contain a point.
//!
//! # Invariants
//! - Entries are bulk loaded once, after every region is registered.
//! - Payloads are dense `NodeId`s of the owning terrain graph.

mod index;

pub use index::{AreaBox, RegionIndex};
