use serde::{Deserialize, Serialize};

/// Kind of terrain covering a walkable region.
///
/// The ordinal of every real variant doubles as an index into per-type tables
/// (agent speeds, histograms), so the order is part of the file format and
/// must not change. `Unset` is the "uninitialized" sentinel and never indexes
/// a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i32)]
pub enum TerrainType {
    Ocean = 0,
    Swamp = 1,
    Forest = 2,
    Clay = 3,
    Limestone = 4,
    Sand = 5,
    Rock = 6,
    Unset = 7,
}

/// Raw terrain ordinal outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown terrain type ordinal {0}")]
pub struct UnknownTerrainType(pub i32);

impl TerrainType {
    /// Number of real terrain types (table size).
    pub const COUNT: usize = 7;

    /// All real terrain types in ordinal order.
    pub const ALL: [TerrainType; Self::COUNT] = [
        TerrainType::Ocean,
        TerrainType::Swamp,
        TerrainType::Forest,
        TerrainType::Clay,
        TerrainType::Limestone,
        TerrainType::Sand,
        TerrainType::Rock,
    ];

    /// Table index for this terrain type.
    ///
    /// # Panics
    /// Panics on `Unset`: the sentinel has no slot in per-type tables.
    pub fn index(self) -> usize {
        assert!(
            self != TerrainType::Unset,
            "terrain type is unset and cannot index a per-type table"
        );
        self as usize
    }

    pub fn is_ocean(self) -> bool {
        self == TerrainType::Ocean
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainType::Ocean => "ocean",
            TerrainType::Swamp => "swamp",
            TerrainType::Forest => "forest",
            TerrainType::Clay => "clay",
            TerrainType::Limestone => "limestone",
            TerrainType::Sand => "sand",
            TerrainType::Rock => "rock",
            TerrainType::Unset => "unset",
        }
    }
}

impl TryFrom<i32> for TerrainType {
    type Error = UnknownTerrainType;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(UnknownTerrainType(raw))
    }
}

impl std::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Terrain covering one region: its type and its height in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub kind: TerrainType,
    pub height: f32,
}

impl Terrain {
    pub fn new(kind: TerrainType, height: f32) -> Self {
        Self { kind, height }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            kind: TerrainType::Unset,
            height: 0.0,
        }
    }
}

/// Dense index of a region in the terrain graph.
///
/// Valid in `[0, node_count)` for the lifetime of a loaded world; releasing
/// the world invalidates every id handed out before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
