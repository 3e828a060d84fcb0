//! R-tree based spatial index using the rstar crate.
//!
//! Lets a rendering driver resolve pointer interactions against the swarm in
//! O(log n): nearest entity, nearest within a pick radius, and rectangle
//! selection over both node kinds.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::swarm::{FileId, PersonId};

/// What a spatial query resolves to: a file node or a person node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickTarget {
    /// A file node.
    File(FileId),
    /// A person node.
    Person(PersonId),
}

/// A point in the spatial index with its pick target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmPoint {
    /// The entity this point belongs to.
    pub target: PickTarget,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl SwarmPoint {
    /// Create a new SwarmPoint.
    pub fn new(target: PickTarget, x: f32, y: f32) -> Self {
        Self { target, x, y }
    }
}

impl RTreeObject for SwarmPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for SwarmPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        (self.x - point[0]).abs() < f32::EPSILON && (self.y - point[1]).abs() < f32::EPSILON
    }
}

/// Spatial index over the swarm's live entities.
pub struct SpatialIndex {
    tree: RTree<SwarmPoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Find the nearest entity to a point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<PickTarget> {
        self.tree.nearest_neighbor(&[x, y]).map(|point| point.target)
    }

    /// Find the nearest entity within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<PickTarget> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.target)
    }

    /// Find all entities within a rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<PickTarget> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.target)
            .collect()
    }

    /// Find all entities within a radius of a point.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<PickTarget> {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance([x, y], radius_sq)
            .map(|point| point.target)
            .collect()
    }

    /// Rebuild the index from scratch.
    ///
    /// Positions move every frame, so the swarm bulk-loads the index on
    /// demand instead of updating it incrementally.
    pub fn rebuild(&mut self, points: Vec<SwarmPoint>) {
        self.tree = RTree::bulk_load(points);
    }

    /// Clear all entities from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of entities in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
