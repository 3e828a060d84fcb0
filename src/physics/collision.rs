//! Person-person bounce rules.
//!
//! Colliding persons do not exchange a continuous force. Instead, each
//! collision picks a discrete velocity reflection from a fixed lookup table
//! keyed by the coarse direction quadrant of both velocities. The table is a
//! tuned heuristic with no closed-form physical derivation; it is kept
//! verbatim because the visual behavior of the swarm depends on it.
//!
//! Screen coordinates: y grows downward, so "down-right" means both velocity
//! components are positive.

use glam::Vec2;

/// Coarse velocity direction, classified by component signs.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// vx > 0, vy > 0.
    DownRight = 0,
    /// vx > 0, vy < 0.
    UpRight = 1,
    /// vx < 0, vy > 0.
    DownLeft = 2,
    /// vx < 0, vy < 0.
    UpLeft = 3,
}

/// Velocity adjustment applied to one side of a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflection {
    /// Negate the x component.
    FlipX,
    /// Negate the y component.
    FlipY,
    /// Negate both components.
    Reverse,
    /// Double the x component, keeping its sign.
    DoubleX,
}

/// Classify the first collider's velocity.
///
/// Zero components fall through to `UpLeft`; the second collider classifies
/// zeros differently (see [`quadrant_of_second`]). The asymmetry is part of
/// the tuned behavior.
pub fn quadrant_of_first(v: Vec2) -> Quadrant {
    if v.x > 0.0 && v.y > 0.0 {
        Quadrant::DownRight
    } else if v.x > 0.0 && v.y < 0.0 {
        Quadrant::UpRight
    } else if v.x < 0.0 && v.y > 0.0 {
        Quadrant::DownLeft
    } else {
        Quadrant::UpLeft
    }
}

/// Classify the second collider's velocity.
///
/// Zero components fall through to `DownRight`.
pub fn quadrant_of_second(v: Vec2) -> Quadrant {
    if v.x < 0.0 && v.y > 0.0 {
        Quadrant::DownLeft
    } else if v.x > 0.0 && v.y < 0.0 {
        Quadrant::UpRight
    } else if v.x < 0.0 && v.y < 0.0 {
        Quadrant::UpLeft
    } else {
        Quadrant::DownRight
    }
}

/// Reflection pairs `(first, second)` indexed by
/// `[quadrant_of_first][quadrant_of_second]`.
///
/// Rows and columns are ordered `DownRight, UpRight, DownLeft, UpLeft`.
const BOUNCE: [[(Reflection, Reflection); 4]; 4] = {
    use Reflection::{DoubleX, FlipX, FlipY, Reverse};
    [
        // First collider heading down-right.
        [
            (DoubleX, FlipX),
            (FlipY, FlipY),
            (FlipX, FlipX),
            (Reverse, Reverse),
        ],
        // First collider heading up-right.
        [
            (FlipY, FlipY),
            (FlipX, DoubleX),
            (Reverse, Reverse),
            (FlipX, FlipX),
        ],
        // First collider heading down-left.
        [
            (FlipX, FlipX),
            (Reverse, Reverse),
            (DoubleX, FlipX),
            (FlipY, FlipY),
        ],
        // First collider heading up-left.
        [
            (Reverse, Reverse),
            (FlipX, FlipX),
            (FlipY, FlipY),
            (FlipX, DoubleX),
        ],
    ]
};

/// Look up the reflection pair for two colliding velocities.
pub fn bounce_rules(first: Vec2, second: Vec2) -> (Reflection, Reflection) {
    BOUNCE[quadrant_of_first(first) as usize][quadrant_of_second(second) as usize]
}

/// Apply a reflection to a velocity in place.
pub fn apply(rule: Reflection, v: &mut Vec2) {
    match rule {
        Reflection::FlipX => v.x = -v.x,
        Reflection::FlipY => v.y = -v.y,
        Reflection::Reverse => *v = -*v,
        Reflection::DoubleX => v.x *= 2.0,
    }
}

/// Mutably borrow two distinct slice elements at once.
///
/// # Panics
///
/// Panics if `a == b` or either index is out of bounds.
pub fn pair_mut<T>(slice: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut requires distinct indices");
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_classification() {
        assert_eq!(quadrant_of_first(Vec2::new(1.0, 1.0)), Quadrant::DownRight);
        assert_eq!(quadrant_of_first(Vec2::new(1.0, -1.0)), Quadrant::UpRight);
        assert_eq!(quadrant_of_first(Vec2::new(-1.0, 1.0)), Quadrant::DownLeft);
        assert_eq!(quadrant_of_first(Vec2::new(-1.0, -1.0)), Quadrant::UpLeft);

        assert_eq!(quadrant_of_second(Vec2::new(1.0, 1.0)), Quadrant::DownRight);
        assert_eq!(quadrant_of_second(Vec2::new(1.0, -1.0)), Quadrant::UpRight);
        assert_eq!(quadrant_of_second(Vec2::new(-1.0, 1.0)), Quadrant::DownLeft);
        assert_eq!(quadrant_of_second(Vec2::new(-1.0, -1.0)), Quadrant::UpLeft);
    }

    #[test]
    fn test_zero_components_fall_through_asymmetrically() {
        // A motionless first collider classifies up-left, a motionless
        // second collider classifies down-right.
        assert_eq!(quadrant_of_first(Vec2::ZERO), Quadrant::UpLeft);
        assert_eq!(quadrant_of_second(Vec2::ZERO), Quadrant::DownRight);

        // Axis-aligned velocities fall through the same way.
        assert_eq!(quadrant_of_first(Vec2::new(1.0, 0.0)), Quadrant::UpLeft);
        assert_eq!(quadrant_of_second(Vec2::new(0.0, 1.0)), Quadrant::DownRight);
    }

    #[test]
    fn test_head_on_opposite_diagonals_reverse_both() {
        let (a, b) = bounce_rules(Vec2::new(1.0, 1.0), Vec2::new(-1.0, -1.0));
        assert_eq!(a, Reflection::Reverse);
        assert_eq!(b, Reflection::Reverse);

        let (a, b) = bounce_rules(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert_eq!(a, Reflection::Reverse);
        assert_eq!(b, Reflection::Reverse);
    }

    #[test]
    fn test_same_heading_doubles_the_chaser() {
        // Both heading down-right: the first speeds up, the second turns.
        let (a, b) = bounce_rules(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0));
        assert_eq!(a, Reflection::DoubleX);
        assert_eq!(b, Reflection::FlipX);

        // Both heading up-right: the first turns, the second speeds up.
        let (a, b) = bounce_rules(Vec2::new(1.0, -1.0), Vec2::new(1.0, -1.0));
        assert_eq!(a, Reflection::FlipX);
        assert_eq!(b, Reflection::DoubleX);
    }

    #[test]
    fn test_converging_on_x_flips_x() {
        let (a, b) = bounce_rules(Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0));
        assert_eq!(a, Reflection::FlipX);
        assert_eq!(b, Reflection::FlipX);
    }

    #[test]
    fn test_converging_on_y_flips_y() {
        let (a, b) = bounce_rules(Vec2::new(1.0, 1.0), Vec2::new(1.0, -1.0));
        assert_eq!(a, Reflection::FlipY);
        assert_eq!(b, Reflection::FlipY);
    }

    #[test]
    fn test_apply_reflections() {
        let mut v = Vec2::new(3.0, -4.0);
        apply(Reflection::FlipX, &mut v);
        assert_eq!(v, Vec2::new(-3.0, -4.0));
        apply(Reflection::FlipY, &mut v);
        assert_eq!(v, Vec2::new(-3.0, 4.0));
        apply(Reflection::Reverse, &mut v);
        assert_eq!(v, Vec2::new(3.0, -4.0));
        apply(Reflection::DoubleX, &mut v);
        assert_eq!(v, Vec2::new(6.0, -4.0));
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut values = [10, 20, 30];
        let (a, b) = pair_mut(&mut values, 0, 2);
        *a += 1;
        *b += 1;
        assert_eq!(values, [11, 20, 31]);

        let (a, b) = pair_mut(&mut values, 2, 0);
        *a += 1;
        *b += 1;
        assert_eq!(values, [12, 20, 32]);
    }

    #[test]
    #[should_panic]
    fn test_pair_mut_rejects_equal_indices() {
        let mut values = [1, 2];
        let _ = pair_mut(&mut values, 1, 1);
    }
}
