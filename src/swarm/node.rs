//! Node types for the swarm.
//!
//! Two kinds of nodes share one physical body: file nodes, which repel each
//! other, and person nodes, which bounce off each other and off the walls.
//! Each body carries a life counter that decrements once per frame; once life
//! reaches zero the node is inert and the engine skips it entirely. Removal
//! of dead nodes is the store's job, not the engine's.

use std::fmt;

use glam::Vec2;

/// Stable file-node identifier.
///
/// Ids index a never-reused slot, so they remain valid after other nodes are
/// swept from the swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl FileId {
    /// Get the slot index for this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Stable person-node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonId(pub u32);

impl PersonId {
    /// Get the slot index for this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person({})", self.0)
    }
}

impl From<u32> for PersonId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Tagged node reference stored as the topology graph's node weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A file node.
    File(FileId),
    /// A person node.
    Person(PersonId),
}

/// The physical state shared by both node kinds.
///
/// `mass` doubles as the collision radius for persons and as the force
/// multiplier for everyone. `life` counts down from `life_init` to zero.
#[derive(Debug, Clone, Copy)]
pub struct NodeBody {
    /// Position in drawing-area coordinates.
    pub position: Vec2,
    /// Velocity in drawing-area units per frame.
    pub velocity: Vec2,
    /// Mass; also the effective collision radius. Always positive.
    pub mass: f32,
    /// Remaining life in frames.
    pub life: i32,
    /// Initial life, used to normalize `life` into a decay ratio.
    pub life_init: i32,
    /// Cap on velocity magnitude.
    pub max_speed: f32,
}

impl NodeBody {
    /// Create a body with full life.
    pub fn new(position: Vec2, velocity: Vec2, mass: f32, life: i32, max_speed: f32) -> Self {
        debug_assert!(mass > 0.0, "node mass must be positive");
        debug_assert!(life > 0, "initial life must be positive");
        Self {
            position,
            velocity,
            mass,
            life,
            life_init: life,
            max_speed,
        }
    }

    /// Whether the node still participates in the simulation.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Shorten life by one frame, saturating at zero.
    #[inline]
    pub fn decay(&mut self) {
        if self.life > 0 {
            self.life -= 1;
        }
    }

    /// Reset life to its initial value, reviving a dead node.
    #[inline]
    pub fn refresh(&mut self) {
        self.life = self.life_init;
    }

    /// Remaining life as a ratio in `[0, 1]`.
    #[inline]
    pub fn life_ratio(&self) -> f32 {
        self.life as f32 / self.life_init as f32
    }
}

/// A file node: a body plus a cumulative edge-contact counter.
#[derive(Debug, Clone, Copy)]
pub struct FileNode {
    /// Physical state.
    pub body: NodeBody,
    /// How many times this file has been touched by a contact. Never
    /// decremented, even when contacts expire.
    pub touches: u32,
}

impl FileNode {
    /// Create a file node with no touches yet.
    pub fn new(body: NodeBody) -> Self {
        Self { body, touches: 0 }
    }

    /// Record one more contact touching this file.
    #[inline]
    pub fn touch(&mut self) {
        self.touches += 1;
    }

    /// Whether the node still participates in the simulation.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }
}

/// A person node.
#[derive(Debug, Clone, Copy)]
pub struct PersonNode {
    /// Physical state.
    pub body: NodeBody,
}

impl PersonNode {
    /// Create a person node.
    pub fn new(body: NodeBody) -> Self {
        Self { body }
    }

    /// Whether the node still participates in the simulation.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(life: i32) -> NodeBody {
        NodeBody::new(Vec2::ZERO, Vec2::ZERO, 1.0, life, 7.0)
    }

    #[test]
    fn test_ids_display_and_index() {
        assert_eq!(format!("{}", FileId(7)), "File(7)");
        assert_eq!(format!("{}", PersonId(3)), "Person(3)");
        assert_eq!(FileId::from(9u32).index(), 9);
        assert_eq!(PersonId::from(4u32).index(), 4);
    }

    #[test]
    fn test_decay_saturates_at_zero() {
        let mut b = body(2);
        b.decay();
        assert_eq!(b.life, 1);
        assert!(b.is_alive());
        b.decay();
        assert_eq!(b.life, 0);
        assert!(!b.is_alive());
        b.decay();
        assert_eq!(b.life, 0);
    }

    #[test]
    fn test_life_ratio_spans_unit_interval() {
        let mut b = body(4);
        assert_eq!(b.life_ratio(), 1.0);
        b.decay();
        b.decay();
        assert_eq!(b.life_ratio(), 0.5);
        b.decay();
        b.decay();
        assert_eq!(b.life_ratio(), 0.0);
    }

    #[test]
    fn test_refresh_restores_initial_life() {
        let mut b = body(3);
        b.decay();
        b.decay();
        b.decay();
        assert!(!b.is_alive());
        b.refresh();
        assert_eq!(b.life, 3);
        assert!(b.is_alive());
    }

    #[test]
    fn test_touch_counter_is_cumulative() {
        let mut file = FileNode::new(body(10));
        assert_eq!(file.touches, 0);
        file.touch();
        file.touch();
        assert_eq!(file.touches, 2);
    }
}
