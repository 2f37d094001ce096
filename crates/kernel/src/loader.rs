use std::io::{Read, Seek};

use pathworld_common::{BoundingBox, NodeId, Point, SimplePolygon, Terrain, TerrainType};
use pathworld_spatial::{AreaBox, RegionIndex};
use pathworld_stream::{ByteReader, read_block};

use crate::error::LoadError;
use crate::format::{FORMAT_VERSION, FormatVersion};
use crate::graph::{TerrainGraph, WalkTerrain};

/// Smallest encoded node: centroid, subgraph, empty index list, terrain, height.
const MIN_NODE_BYTES: u64 = 4 + 4 + 8 + 8 + 4 + 4;
const EDGE_BYTES: u64 = 4 + 4 + 4;
const VERTEX_BYTES: u64 = 4 + 4;

/// Options for reading a world stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadConfig {
    /// Version the host says the stream was written with. Checked against
    /// `FORMAT_VERSION` before reading; `None` skips the check.
    pub declared_version: Option<FormatVersion>,
    /// Reject regions whose polygon is not simple.
    pub validate_polygons: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            declared_version: None,
            validate_polygons: true,
        }
    }
}

/// Everything a successful load produces.
#[derive(Debug, Default)]
pub struct LoadedWorld {
    pub graph: TerrainGraph,
    pub index: RegionIndex,
    /// Shared vertex pool the polygons were resolved from.
    pub vertices: Vec<Point>,
}

/// Read a complete world from `source`.
///
/// Either the whole world is returned or nothing is: every structural
/// problem aborts with a `LoadError`.
pub fn load<R: Read + Seek>(source: &mut R, config: &LoadConfig) -> Result<LoadedWorld, LoadError> {
    let _span = tracing::info_span!("load_world").entered();

    if let Some(found) = config.declared_version {
        if !found.is_compatible_with(FORMAT_VERSION) {
            return Err(LoadError::VersionMismatch {
                found,
                expected: FORMAT_VERSION,
            });
        }
    }

    let mut r = read_block(source)?;
    tracing::debug!(bytes = r.len(), "world block read");

    let vertices = read_vertices(&mut r)?;
    let mut graph = TerrainGraph::new();
    read_nodes(&mut r, &vertices, config, &mut graph)?;

    let entries = graph
        .nodes()
        .iter()
        .zip(graph.node_ids())
        .map(|(node, id)| {
            let bbox = node
                .polygon
                .envelope()
                .unwrap_or_else(|| BoundingBox::from_point(node.centroid));
            AreaBox::new(bbox, id)
        })
        .collect();
    let index = RegionIndex::bulk_load(entries);

    read_edges(&mut r, &mut graph)?;

    if r.remaining() > 0 {
        tracing::warn!(bytes = r.remaining(), "ignoring trailing bytes after edge list");
    }

    tracing::info!(
        vertices = vertices.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "world loaded"
    );
    Ok(LoadedWorld {
        graph,
        index,
        vertices,
    })
}

/// Read a `u64` record count and check `count * record_size` bytes are left.
fn read_count(r: &mut ByteReader, record_size: u64) -> Result<u64, LoadError> {
    let count = r.read::<u64>()?;
    let needed = count.saturating_mul(record_size);
    let available = r.remaining() as u64;
    if needed > available {
        return Err(LoadError::TruncatedStream { needed, available });
    }
    Ok(count)
}

fn read_vertices(r: &mut ByteReader) -> Result<Vec<Point>, LoadError> {
    let count = read_count(r, VERTEX_BYTES)?;
    let mut vertices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let x = r.read::<f32>()?;
        let y = r.read::<f32>()?;
        vertices.push(Point::new(x, y));
    }
    Ok(vertices)
}

fn read_nodes(
    r: &mut ByteReader,
    vertices: &[Point],
    config: &LoadConfig,
    graph: &mut TerrainGraph,
) -> Result<(), LoadError> {
    let count = read_count(r, MIN_NODE_BYTES)?;
    if count == 0 {
        return Err(LoadError::EmptyGraph("nodes"));
    }
    if count > u32::MAX as u64 {
        return Err(LoadError::CorruptIndex {
            what: "node count",
            index: count,
            limit: u32::MAX as u64,
        });
    }

    let mut unlabeled = 0usize;
    for node in 0..count as usize {
        let x = r.read::<f32>()?;
        let y = r.read::<f32>()?;
        let subgraph_raw = r.read::<u64>()?;
        let indices = r.read_vec::<u32>()?;
        let terrain_raw = r.read::<i32>()?;
        let height = r.read::<f32>()?;

        for (what, value) in [("centroid x", x), ("centroid y", y), ("height", height)] {
            if !value.is_finite() {
                return Err(LoadError::InvalidNode { node, what, value });
            }
        }
        let subgraph_id = u16::try_from(subgraph_raw).map_err(|_| LoadError::CorruptIndex {
            what: "subgraph id",
            index: subgraph_raw,
            limit: u16::MAX as u64,
        })?;
        if subgraph_id == 0 {
            unlabeled += 1;
        }
        let kind = TerrainType::try_from(terrain_raw).map_err(|_| LoadError::UnknownTerrain {
            node,
            raw: terrain_raw,
        })?;

        let mut polygon = SimplePolygon::new();
        for &i in &indices {
            let p = vertices.get(i as usize).ok_or(LoadError::CorruptIndex {
                what: "vertex",
                index: i as u64,
                limit: vertices.len() as u64,
            })?;
            polygon.push(*p);
        }
        if config.validate_polygons {
            polygon
                .validate()
                .map_err(|reason| LoadError::InvalidPolygon { node, reason })?;
        }

        graph.add_node(WalkTerrain {
            terrain: Terrain::new(kind, height),
            centroid: Point::new(x, y),
            polygon,
            subgraph_id,
        });
    }

    if unlabeled > 0 {
        tracing::warn!(
            nodes = unlabeled,
            "regions with subgraph id 0 cannot be used in path queries"
        );
    }
    tracing::debug!(nodes = graph.node_count(), "nodes read");
    Ok(())
}

fn read_edges(r: &mut ByteReader, graph: &mut TerrainGraph) -> Result<(), LoadError> {
    let count = read_count(r, EDGE_BYTES)?;
    if count == 0 {
        return Err(LoadError::EmptyGraph("edges"));
    }

    let limit = graph.node_count() as u64;
    for edge in 0..count as usize {
        let from = r.read::<u32>()?;
        let to = r.read::<u32>()?;
        let distance = r.read::<f32>()?;

        for id in [from, to] {
            if id as u64 >= limit {
                return Err(LoadError::CorruptIndex {
                    what: "node",
                    index: id as u64,
                    limit,
                });
            }
        }
        if !(distance.is_finite() && distance > 0.0) {
            return Err(LoadError::InvalidEdgeWeight { edge, distance });
        }

        let (from, to) = (NodeId(from), NodeId(to));
        let from_kind = graph.node(from).terrain.kind;
        let to_kind = graph.node(to).terrain.kind;
        if from_kind.is_ocean() != to_kind.is_ocean() {
            return Err(LoadError::InconsistentTerrain {
                edge,
                from,
                to,
                from_kind,
                to_kind,
            });
        }

        graph.add_edge_pair(from, to, distance);
    }
    tracing::debug!(edges = graph.edge_count(), "edges read");
    Ok(())
}
