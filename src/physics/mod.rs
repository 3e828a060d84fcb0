//! The chaotic physics engine and its supporting pieces.
//!
//! This module computes forces and integrates motion for the swarm: spring
//! attraction along contacts, finite-range repulsion between files, discrete
//! quadrant-table collisions between persons, drag, life decay, and boundary
//! containment. Entity ownership stays with the store; the engine only
//! mutates what it is handed each frame.

mod bounds;
pub mod collision;
mod engine;

pub use bounds::Bounds;
pub use engine::{
    CORRECTION_STEP_LIMIT, ChaoticEngine, DEFAULT_DRAG, JITTER_SCALE, REPULSION_CUTOFF_SQ,
    SwarmConfig,
};
