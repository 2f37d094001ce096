use std::collections::BTreeSet;

use pathworld_common::{BoundingBox, NodeId, Point, TerrainType};
use pathworld_kernel::World;

/// World inspector for developer tooling.
///
/// Read-only queries against a loaded world for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world.
    pub fn summary(world: &World) -> WorldSummary {
        let graph = world.graph();
        let mut terrain_counts = [0usize; TerrainType::COUNT];
        let mut subgraphs = BTreeSet::new();
        let mut unlabeled = 0;
        for node in graph.nodes() {
            terrain_counts[node.terrain.kind.index()] += 1;
            if node.subgraph_id == 0 {
                unlabeled += 1;
            } else {
                subgraphs.insert(node.subgraph_id);
            }
        }

        let bounds = world
            .index()
            .iter()
            .map(|area| area.bbox)
            .reduce(|a, b| a.union(&b));

        tracing::debug!(nodes = graph.node_count(), "world summary computed");
        WorldSummary {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            subgraph_count: subgraphs.len(),
            unlabeled_count: unlabeled,
            bounds,
            terrain_counts,
        }
    }

    /// Details of one region and its neighbours.
    ///
    /// Returns `None` for an id outside the world.
    pub fn inspect_node(world: &World, id: NodeId) -> Option<NodeInfo> {
        if !world.graph().contains(id) {
            return None;
        }
        let node = world.walk_terrain(id);
        Some(NodeInfo {
            id,
            terrain: node.terrain.kind,
            height: node.terrain.height,
            centroid: node.centroid,
            subgraph_id: node.subgraph_id,
            vertex_count: node.polygon.len(),
            neighbours: world.graph().out_edges(id).map(|e| e.to).collect(),
        })
    }
}

/// Summary of a world for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSummary {
    pub node_count: usize,
    /// Directed edges.
    pub edge_count: usize,
    /// Distinct non-zero subgraph ids.
    pub subgraph_count: usize,
    /// Regions with subgraph id 0.
    pub unlabeled_count: usize,
    /// Union of all region boxes; `None` for a null world.
    pub bounds: Option<BoundingBox>,
    /// Regions per terrain type, indexed by `TerrainType::index()`.
    pub terrain_counts: [usize; TerrainType::COUNT],
}

impl WorldSummary {
    pub fn terrain_count(&self, kind: TerrainType) -> usize {
        self.terrain_counts[kind.index()]
    }
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: regions={} edges={} subgraphs={} unlabeled={}",
            self.node_count, self.edge_count, self.subgraph_count, self.unlabeled_count
        )?;
        if let Some(b) = self.bounds {
            write!(
                f,
                "\n  bounds: ({:.2}, {:.2}) .. ({:.2}, {:.2})",
                b.min.x, b.min.y, b.max.x, b.max.y
            )?;
        }
        for kind in TerrainType::ALL {
            let count = self.terrain_count(kind);
            if count > 0 {
                write!(f, "\n  {kind}: {count}")?;
            }
        }
        Ok(())
    }
}

/// Detailed info about a single region.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub terrain: TerrainType,
    pub height: f32,
    pub centroid: Point,
    pub subgraph_id: u16,
    pub vertex_count: usize,
    pub neighbours: Vec<NodeId>,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Region {} {} h={:.2} centroid=({:.2}, {:.2}) subgraph={} vertices={} neighbours=[",
            self.id,
            self.terrain,
            self.height,
            self.centroid.x,
            self.centroid.y,
            self.subgraph_id,
            self.vertex_count,
        )?;
        for (i, n) in self.neighbours.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{n}")?;
        }
        f.write_str("]")
    }
}
