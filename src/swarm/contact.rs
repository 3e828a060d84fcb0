//! Contact edges between persons and files.
//!
//! A contact is a decaying directed link from the person who touched a file
//! to that file, with a target rest length. While alive it acts as a spring
//! whose strength fades linearly with remaining life; once life reaches zero
//! it exerts no force and waits for the store to sweep it.

use super::node::{FileId, PersonId};

/// A person-to-file contact edge.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// The person end of the link.
    pub from: PersonId,
    /// The file end of the link.
    pub to: FileId,
    /// Target rest length of the spring.
    pub rest_length: f32,
    /// Remaining life in frames.
    pub life: i32,
    /// Initial life, used to normalize `life` into a decay ratio.
    pub life_init: i32,
}

impl Contact {
    /// Create a contact with full life.
    pub fn new(from: PersonId, to: FileId, rest_length: f32, life: i32) -> Self {
        debug_assert!(life > 0, "initial life must be positive");
        Self {
            from,
            to,
            rest_length,
            life,
            life_init: life,
        }
    }

    /// Whether the contact still exerts force.
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

    /// Remaining life as a ratio in `[0, 1]`.
    #[inline]
    pub fn life_ratio(&self) -> f32 {
        self.life as f32 / self.life_init as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_saturates_at_zero() {
        let mut contact = Contact::new(PersonId(0), FileId(0), 25.0, 2);
        assert!(contact.is_alive());
        contact.decay();
        contact.decay();
        assert!(!contact.is_alive());
        contact.decay();
        assert_eq!(contact.life, 0);
    }

    #[test]
    fn test_life_ratio_fades_linearly() {
        let mut contact = Contact::new(PersonId(1), FileId(2), 25.0, 10);
        assert_eq!(contact.life_ratio(), 1.0);
        for _ in 0..5 {
            contact.decay();
        }
        assert_eq!(contact.life_ratio(), 0.5);
    }
}
