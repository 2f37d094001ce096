//! Binary world format: version constant and an encoder.
//!
//! Layout (little-endian, counts are `u64`), wrapped in one length-prefixed
//! block:
//!
//! ```text
//! vertex_count, vertex_count x (x: f32, y: f32)
//! node_count,   node_count x (x: f32, y: f32, subgraph: u64,
//!                             index_count, index_count x u32,
//!                             terrain: i32, height: f32)
//! edge_count,   edge_count x (from: u32, to: u32, distance: f32)
//! ```
//!
//! The version is not stored in the stream; hosts pass it alongside
//! (see `LoadConfig::declared_version`).

use std::collections::VecDeque;
use std::io::Write;

use pathworld_common::{Point, Terrain};
use pathworld_stream::{ByteWriter, StreamError, write_block};
use serde::{Deserialize, Serialize};

/// Format version as `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
}

/// Version this crate reads and writes.
pub const FORMAT_VERSION: FormatVersion = FormatVersion { major: 1, minor: 1 };

impl FormatVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Decode a packed decimal tag: two digits major, four digits minor
    /// (`10001` is 1.1).
    pub fn from_tag(tag: u32) -> Option<Self> {
        let major = u16::try_from(tag / 10_000).ok()?;
        if major > 99 {
            return None;
        }
        Some(Self {
            major,
            minor: (tag % 10_000) as u16,
        })
    }

    /// Packed decimal tag, the inverse of `from_tag`.
    pub fn tag(self) -> u32 {
        self.major as u32 * 10_000 + self.minor as u32
    }

    /// A file at `self` can be read by a reader supporting `supported` when
    /// the majors agree and the file's minor is not newer.
    pub fn is_compatible_with(self, supported: FormatVersion) -> bool {
        self.major == supported.major && self.minor <= supported.minor
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// One node as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub centroid: Point,
    /// Stored wide; the loader narrows it to `u16`.
    pub subgraph_id: u64,
    /// Polygon ring as indices into the vertex pool, in winding order.
    pub indices: Vec<u32>,
    /// Raw `TerrainType` ordinal.
    pub terrain_type: i32,
    pub height: f32,
}

/// One undirected connection as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from: u32,
    pub to: u32,
    pub distance: f32,
}

/// Assembles a world file in memory.
///
/// No validation happens here, so tests can produce malformed worlds on
/// purpose.
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    vertices: Vec<Point>,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex to the pool. Returns its index.
    pub fn add_vertex(&mut self, p: Point) -> u32 {
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    /// Append a raw node record. Returns its node index.
    pub fn add_node(&mut self, node: NodeRecord) -> u32 {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    /// Append a region with its own vertices; the centroid is the vertex mean.
    pub fn add_region(&mut self, ring: &[Point], terrain: Terrain, subgraph_id: u16) -> u32 {
        let indices = ring.iter().map(|&p| self.add_vertex(p)).collect();
        let centroid = if ring.is_empty() {
            Point::ZERO
        } else {
            ring.iter().copied().sum::<Point>() / ring.len() as f32
        };
        self.add_node(NodeRecord {
            centroid,
            subgraph_id: subgraph_id as u64,
            indices,
            terrain_type: terrain.kind as i32,
            height: terrain.height,
        })
    }

    /// Append one undirected connection between two node indices.
    pub fn add_edge(&mut self, from: u32, to: u32, distance: f32) {
        self.edges.push(EdgeRecord { from, to, distance });
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [NodeRecord] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Serialize the block payload (without the length header).
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write(self.vertices.len() as u64);
        for v in &self.vertices {
            w.write(v.x).write(v.y);
        }

        w.write(self.nodes.len() as u64);
        for n in &self.nodes {
            w.write(n.centroid.x)
                .write(n.centroid.y)
                .write(n.subgraph_id)
                .write_slice(&n.indices)
                .write(n.terrain_type)
                .write(n.height);
        }

        w.write(self.edges.len() as u64);
        for e in &self.edges {
            w.write(e.from).write(e.to).write(e.distance);
        }
        w.into_inner()
    }

    /// Serialize the full file: length header plus payload.
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.encode_payload();
        let mut header = ByteWriter::new();
        header.write(payload.len() as u64);
        let mut out = header.into_inner();
        out.extend_from_slice(&payload);
        out
    }

    /// Write the full file to `sink`. Returns the bytes written.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<u64, StreamError> {
        let payload = self.encode_payload();
        let written = write_block(sink, &payload)?;
        tracing::debug!(
            vertices = self.vertices.len(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            bytes = written,
            "wrote world"
        );
        Ok(written)
    }

    /// Grid world of `cols x rows` square cells of side `cell`, sharing
    /// lattice vertices. `terrain(col, row)` picks each cell's terrain.
    ///
    /// Neighbouring cells are connected when they agree on being ocean;
    /// subgraph ids are assigned per connected component, starting at 1.
    ///
    /// # Panics
    /// Panics if the lattice has more vertices than a `u32` index can name
    /// (see `grid_vertex_count`).
    pub fn grid<F>(cols: u32, rows: u32, cell: f32, mut terrain: F) -> Self
    where
        F: FnMut(u32, u32) -> Terrain,
    {
        assert!(
            Self::grid_vertex_count(cols, rows).is_some(),
            "grid of {cols} x {rows} cells exceeds u32 vertex indices"
        );
        let mut b = Self::new();
        for y in 0..=rows {
            for x in 0..=cols {
                b.add_vertex(Point::new(x as f32 * cell, y as f32 * cell));
            }
        }
        let vertex = |x: u32, y: u32| y * (cols + 1) + x;

        for row in 0..rows {
            for col in 0..cols {
                let t = terrain(col, row);
                b.add_node(NodeRecord {
                    centroid: Point::new((col as f32 + 0.5) * cell, (row as f32 + 0.5) * cell),
                    subgraph_id: 0,
                    // Counter-clockwise.
                    indices: vec![
                        vertex(col, row),
                        vertex(col + 1, row),
                        vertex(col + 1, row + 1),
                        vertex(col, row + 1),
                    ],
                    terrain_type: t.kind as i32,
                    height: t.height,
                });
            }
        }

        let node = |col: u32, row: u32| row * cols + col;
        let is_ocean = |b: &Self, n: u32| b.nodes[n as usize].terrain_type == 0;
        for row in 0..rows {
            for col in 0..cols {
                let here = node(col, row);
                let link = |b: &mut Self, there: u32| {
                    if is_ocean(b, here) == is_ocean(b, there) {
                        b.add_edge(here, there, cell);
                    }
                };
                if col + 1 < cols {
                    link(&mut b, node(col + 1, row));
                }
                if row + 1 < rows {
                    link(&mut b, node(col, row + 1));
                }
            }
        }

        b.label_subgraphs();
        b
    }

    /// Lattice vertices of a `cols x rows` grid, or `None` when they do not
    /// fit in `u32` indices.
    pub fn grid_vertex_count(cols: u32, rows: u32) -> Option<u32> {
        cols.checked_add(1)?.checked_mul(rows.checked_add(1)?)
    }

    /// Overwrite every node's subgraph id with its connected-component
    /// number (1-based, in order of the lowest node index).
    pub fn label_subgraphs(&mut self) {
        let n = self.nodes.len();
        let mut adjacency = vec![Vec::new(); n];
        for e in &self.edges {
            let (a, b) = (e.from as usize, e.to as usize);
            if a < n && b < n {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }

        let mut label = vec![0u64; n];
        let mut next = 0u64;
        let mut queue = VecDeque::new();
        for seed in 0..n {
            if label[seed] != 0 {
                continue;
            }
            next += 1;
            label[seed] = next;
            queue.push_back(seed);
            while let Some(u) = queue.pop_front() {
                for &v in &adjacency[u] {
                    if label[v] == 0 {
                        label[v] = next;
                        queue.push_back(v);
                    }
                }
            }
        }

        for (node, id) in self.nodes.iter_mut().zip(label) {
            node.subgraph_id = id;
        }
    }
}
