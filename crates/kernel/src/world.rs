use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use pathworld_common::{NodeId, Point};
use pathworld_spatial::{AreaBox, RegionIndex};

use crate::agent::Agent;
use crate::error::{LoadError, QueryError};
use crate::graph::{TerrainGraph, WalkTerrain};
use crate::loader::{LoadConfig, LoadedWorld, load};
use crate::search::{self, Route};
use crate::weight::WeightMode;

/// A loaded navigation world: terrain graph, region index and vertex pool.
///
/// Starts null (no regions). `initialize` fills it once; `release` empties
/// it again and invalidates every `NodeId` handed out before. Once loaded,
/// all queries take `&self` and may run from several threads at once.
#[derive(Debug, Default)]
pub struct World {
    graph: TerrainGraph,
    index: RegionIndex,
    vertices: Vec<Point>,
}

impl World {
    /// Create a null world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a world from `source` with the default configuration.
    pub fn load<R: Read + Seek>(source: &mut R) -> Result<Self, LoadError> {
        let mut world = Self::new();
        world.initialize(source)?;
        Ok(world)
    }

    /// Load a world from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening world file");
        let mut reader = BufReader::new(File::open(path)?);
        Self::load(&mut reader)
    }

    /// True until a load succeeds, and again after `release`.
    pub fn is_null(&self) -> bool {
        self.graph.is_empty()
    }

    /// Populate a null world from `source`.
    ///
    /// On error the world stays null.
    ///
    /// # Panics
    /// Panics if the world is already loaded.
    pub fn initialize<R: Read + Seek>(&mut self, source: &mut R) -> Result<(), LoadError> {
        self.initialize_with(source, &LoadConfig::default())
    }

    /// `initialize` with explicit load options.
    pub fn initialize_with<R: Read + Seek>(
        &mut self,
        source: &mut R,
        config: &LoadConfig,
    ) -> Result<(), LoadError> {
        assert!(self.is_null(), "world is already loaded; release it first");
        let LoadedWorld {
            graph,
            index,
            vertices,
        } = load(source, config)?;
        self.graph = graph;
        self.index = index;
        self.vertices = vertices;
        Ok(())
    }

    /// Return to the null state.
    ///
    /// # Panics
    /// Panics on a null world.
    pub fn release(&mut self) {
        assert!(!self.is_null(), "release called on a null world");
        self.graph.clear();
        self.index.clear();
        self.vertices.clear();
        tracing::debug!("world released");
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Directed edge count (two per stored connection).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Region data for a node.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn walk_terrain(&self, id: NodeId) -> &WalkTerrain {
        self.graph.node(id)
    }

    /// Region data for an index entry returned by `find_nearest`.
    pub fn walk_terrain_for(&self, area: &AreaBox) -> &WalkTerrain {
        self.graph.node(area.node)
    }

    /// Index entry of the region containing `point`.
    ///
    /// Candidates come from the bounding-box index; the first, in index
    /// order, whose polygon strictly contains the point wins. Overlapping
    /// regions are not disambiguated by distance.
    pub fn find_nearest(&self, point: Point) -> Result<AreaBox, QueryError> {
        self.index
            .query_point(point)
            .find(|area| self.graph.node(area.node).polygon.contains(point))
            .copied()
            .ok_or(QueryError::NotFound {
                x: point.x,
                y: point.y,
            })
    }

    /// Node id of the region containing `point`.
    pub fn find_region(&self, point: Point) -> Result<NodeId, QueryError> {
        self.find_nearest(point).map(|area| area.node)
    }

    /// Best route between two regions, goal first.
    ///
    /// # Panics
    /// Panics if either id is out of range or lies in subgraph 0.
    pub fn compute_route(
        &self,
        agent: &Agent,
        from: NodeId,
        to: NodeId,
        mode: WeightMode,
    ) -> Result<Route, QueryError> {
        search::compute_route(&self.graph, agent, from, to, mode)
    }

    /// Waypoints (region centroids) of the best route, in goal-to-start
    /// order. `speed_mode` selects raw distance over agent travel time.
    pub fn compute_path(
        &self,
        agent: &Agent,
        from: NodeId,
        to: NodeId,
        speed_mode: bool,
    ) -> Result<Vec<Point>, QueryError> {
        let route = self.compute_route(agent, from, to, WeightMode::from_speed_mode(speed_mode))?;
        Ok(route.waypoints(&self.graph))
    }

    pub fn graph(&self) -> &TerrainGraph {
        &self.graph
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }
}
