use glam::Vec2;
use pathworld_common::{BoundingBox, NodeId, Point};
use rstar::{AABB, Envelope, RTree, RTreeObject, SelectionFunction};

/// One index entry: the bounding box of a region and the region's node id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaBox {
    pub bbox: BoundingBox,
    pub node: NodeId,
}

impl AreaBox {
    pub fn new(bbox: BoundingBox, node: NodeId) -> Self {
        Self { bbox, node }
    }
}

impl RTreeObject for AreaBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min.to_array(), self.bbox.max.to_array())
    }
}

/// Selects entries whose box contains a point, border included.
struct ContainsPoint([f32; 2]);

impl SelectionFunction<AreaBox> for ContainsPoint {
    fn should_unpack_parent(&self, envelope: &AABB<[f32; 2]>) -> bool {
        envelope.contains_point(&self.0)
    }

    fn should_unpack_leaf(&self, leaf: &AreaBox) -> bool {
        leaf.bbox.contains_point(Vec2::from(self.0))
    }
}

/// Read-only spatial index over region bounding boxes.
///
/// Built once from the full set of regions with a bulk load (better packed
/// than one-by-one insertion) and only queried afterwards.
pub struct RegionIndex {
    tree: RTree<AreaBox>,
}

impl Default for RegionIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl std::fmt::Debug for RegionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionIndex")
            .field("entries", &self.tree.size())
            .finish()
    }
}

impl RegionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from every entry at once.
    pub fn bulk_load(entries: Vec<AreaBox>) -> Self {
        let count = entries.len();
        let tree = RTree::bulk_load(entries);
        tracing::debug!(entries = count, "region index bulk loaded");
        Self { tree }
    }

    /// All entries whose bounding box contains `point`, in tree order.
    pub fn query_point(&self, point: Point) -> impl Iterator<Item = &AreaBox> + '_ {
        self.tree
            .locate_with_selection_function(ContainsPoint(point.to_array()))
    }

    /// Iterate over every entry.
    pub fn iter(&self) -> impl Iterator<Item = &AreaBox> + '_ {
        self.tree.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}
