//! Shared types for the pathworld navigation engine: terrain model, node ids
//! and the 2D geometry the world is built from.

pub mod geometry;
pub mod types;

pub use geometry::{BoundingBox, Point, PolygonError, SimplePolygon, dot};
pub use types::{NodeId, Terrain, TerrainType, UnknownTerrainType};
