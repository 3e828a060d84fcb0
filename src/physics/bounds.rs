//! Drawing-area bounds.
//!
//! The simulation runs inside a fixed rectangle `[0, width] x [0, height]`
//! matching the drawing surface. Positions are constrained axis by axis,
//! never reflected; wall rebound is a separate person-only behavior in the
//! engine.

use glam::Vec2;

/// The rectangular drawing area the swarm lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Width of the drawing area.
    pub width: f32,
    /// Height of the drawing area.
    pub height: f32,
}

impl Bounds {
    /// Create bounds for a drawing area of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0);
        Self { width, height }
    }

    /// Constrain a position into the drawing area, axis-independently.
    #[inline]
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(0.0, self.width),
            position.y.clamp(0.0, self.height),
        )
    }

    /// Check whether a position lies inside the drawing area.
    #[inline]
    pub fn contains(&self, position: Vec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}
