//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index for efficient
//! nearest-neighbor and range queries over the swarm's entities.

mod rtree;

pub use rtree::{PickTarget, SpatialIndex, SwarmPoint};
