use pathworld_common::{NodeId, Point, SimplePolygon, Terrain};

/// One walkable region: a node of the terrain graph.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkTerrain {
    pub terrain: Terrain,
    /// Center of the polygon in world coordinates, used as the waypoint.
    pub centroid: Point,
    pub polygon: SimplePolygon,
    /// Connectivity island. 0 is reserved and never valid for path queries.
    pub subgraph_id: u16,
}

/// Directed edge between two regions of the same graph.
///
/// Endpoints are arena indices into the owning `TerrainGraph`, valid for as
/// long as the graph holds its nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    pub from: NodeId,
    pub to: NodeId,
    /// Distance between the two centroids, always > 0 once loaded.
    pub distance: f32,
}

/// Directed graph of walkable regions.
///
/// Nodes and edges live in `Vec`s indexed by dense ids; ids stay stable
/// because nodes are never removed individually.
#[derive(Debug, Clone, Default)]
pub struct TerrainGraph {
    nodes: Vec<WalkTerrain>,
    edges: Vec<EdgeInfo>,
    /// Indices into `edges` of the edges leaving each node.
    out_edges: Vec<Vec<usize>>,
}

impl TerrainGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Returns its id (the next dense index).
    pub fn add_node(&mut self, node: WalkTerrain) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.out_edges.push(Vec::new());
        id
    }

    /// Add the two directed edges `a -> b` and `b -> a` sharing one distance.
    /// Returns the indices of the forward and reverse edges.
    pub fn add_edge_pair(&mut self, a: NodeId, b: NodeId, distance: f32) -> (usize, usize) {
        assert!(
            a.index() < self.nodes.len() && b.index() < self.nodes.len(),
            "edge {a} -> {b} references a node outside the graph"
        );
        let forward = self.push_edge(a, b, distance);
        let reverse = self.push_edge(b, a, distance);
        (forward, reverse)
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId, distance: f32) -> usize {
        let idx = self.edges.len();
        self.edges.push(EdgeInfo { from, to, distance });
        self.out_edges[from.index()].push(idx);
        idx
    }

    /// Get a node by id.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn node(&self, id: NodeId) -> &WalkTerrain {
        assert!(
            id.index() < self.nodes.len(),
            "node {id} out of range (node count {})",
            self.nodes.len()
        );
        &self.nodes[id.index()]
    }

    /// Get an edge by index.
    pub fn edge(&self, idx: usize) -> &EdgeInfo {
        &self.edges[idx]
    }

    /// Edges leaving `id`.
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &EdgeInfo> + '_ {
        self.out_edges[id.index()].iter().map(|&i| &self.edges[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges (twice the number of connections).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[WalkTerrain] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeInfo] {
        &self.edges
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.out_edges.clear();
    }
}
