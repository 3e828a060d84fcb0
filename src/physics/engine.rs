//! The chaotic physics engine.
//!
//! In essence, persons bounce around while contact springs drag them toward
//! the files they touched. The engine is deliberately ad-hoc: forces are
//! visually tuned heuristics, not rigorous mechanics, and several oddities
//! (mass-scaled acceleration, the non-uniform speed cap, the quadrant bounce
//! table) are load-bearing for the look of the animation.
//!
//! Each frame the driver runs two fixed-order passes over the store:
//! relax (contacts, files, persons), then update (contacts, files, persons).
//! Relax accumulates forces and partially integrates; update applies decay,
//! drag, and boundary containment. Later calls intentionally read positions
//! mutated by earlier calls within the same frame.
//!
//! The engine owns no entities. It holds only the drag coefficient, a
//! seedable random source, and a stall counter for correction loops that hit
//! their iteration cap.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::physics::bounds::Bounds;
use crate::physics::collision;
use crate::swarm::{Contact, FileNode, NodeBody, PersonNode};

/// Default multiplicative velocity damping applied once per update.
pub const DEFAULT_DRAG: f32 = 0.00001;

/// Squared cutoff radius beyond which file-file repulsion vanishes.
pub const REPULSION_CUTOFF_SQ: f32 = 10_000.0;

/// Half-width of the jitter force emitted on a degenerate file overlap.
pub const JITTER_SCALE: f32 = 0.01;

/// Iteration cap for the collision separation and wall rebound loops.
///
/// The loops terminate on their own whenever the corrected velocity actually
/// moves the node the right way; the cap only catches the degenerate cases
/// (zero velocity after reflection, walls closer together than a diameter).
pub const CORRECTION_STEP_LIMIT: usize = 1_000;

fn default_drag() -> f32 {
    DEFAULT_DRAG
}

fn default_seed() -> u64 {
    0
}

fn default_life() -> i32 {
    255
}

fn default_file_mass() -> f32 {
    1.0
}

fn default_person_mass() -> f32 {
    10.0
}

fn default_file_max_speed() -> f32 {
    7.0
}

fn default_person_max_speed() -> f32 {
    2.0
}

/// Engine and spawn configuration.
///
/// Every field has a default, so a partial (or empty) config object from the
/// host is fine. Only `drag` and `seed` are read by the engine itself; the
/// remaining fields are defaults consumed by the store's spawn helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwarmConfig {
    /// Velocity damping applied to every live node once per update.
    pub drag: f32,
    /// Seed for the engine's random source.
    pub seed: u64,
    /// Initial life for spawned file nodes.
    pub file_life: i32,
    /// Initial life for spawned person nodes.
    pub person_life: i32,
    /// Initial life for new contacts.
    pub contact_life: i32,
    /// Mass for spawned file nodes.
    pub file_mass: f32,
    /// Mass for spawned person nodes.
    pub person_mass: f32,
    /// Velocity cap for spawned file nodes.
    pub file_max_speed: f32,
    /// Velocity cap for spawned person nodes.
    pub person_max_speed: f32,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            drag: default_drag(),
            seed: default_seed(),
            file_life: default_life(),
            person_life: default_life(),
            contact_life: default_life(),
            file_mass: default_file_mass(),
            person_mass: default_person_mass(),
            file_max_speed: default_file_max_speed(),
            person_max_speed: default_person_max_speed(),
        }
    }
}

/// The physics engine.
///
/// Stateless across frames apart from configuration, the random source, and
/// the cumulative stall counter.
pub struct ChaoticEngine {
    drag: f32,
    rng: SmallRng,
    stall_count: u64,
}

impl ChaoticEngine {
    /// Create an engine from a config, seeding the random source from it.
    pub fn new(config: &SwarmConfig) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(config.seed))
    }

    /// Create an engine with an explicit random source.
    pub fn with_rng(config: &SwarmConfig, rng: SmallRng) -> Self {
        Self {
            drag: config.drag,
            rng,
            stall_count: 0,
        }
    }

    /// Re-read configuration, resetting the random source to the new seed.
    pub fn setup(&mut self, config: &SwarmConfig) {
        self.drag = config.drag;
        self.rng = SmallRng::seed_from_u64(config.seed);
    }

    /// Drag coefficient currently in effect.
    #[inline]
    pub fn drag(&self) -> f32 {
        self.drag
    }

    /// How many correction loops have hit their iteration cap so far.
    #[inline]
    pub fn stall_count(&self) -> u64 {
        self.stall_count
    }

    /// Hook invoked before the relax pass of each frame. Currently empty.
    pub fn initialize_frame(&mut self) {}

    /// Hook invoked after the update pass of each frame. Currently empty.
    pub fn finalize_frame(&mut self) {}

    // =========================================================================
    // Force Model
    // =========================================================================

    /// Spring force along a contact, evaluated at the file end.
    ///
    /// Pulls the endpoints toward the contact's rest length, fading linearly
    /// as the contact's life decays so the pair drifts apart with age.
    /// Coincident endpoints produce zero force.
    pub fn force_along_contact(&self, contact: &Contact, from: &NodeBody, to: &NodeBody) -> Vec2 {
        let delta = to.position - from.position;
        let distance = delta.length();
        if distance > 0.0 {
            let mut magnitude = (contact.rest_length - distance) / (distance * 3.0);
            magnitude *= contact.life_ratio();
            delta * magnitude
        } else {
            Vec2::ZERO
        }
    }

    /// Repulsive force pushing file `a` away from file `b`.
    ///
    /// Inverse-square repulsion with a finite range. The overlap check
    /// compares the squared distance against the summed touch counters — a
    /// crude stand-in for radii that almost never fires — and substitutes a
    /// small random jitter for the undefined direction when it does.
    pub fn force_between_files(&mut self, a: &FileNode, b: &FileNode) -> Vec2 {
        let delta = a.body.position - b.body.position;
        let distance_sq = delta.length_squared();
        if distance_sq == (a.touches + b.touches) as f32 {
            Vec2::new(
                JITTER_SCALE * (self.rng.random::<f32>() * 2.0 - 1.0),
                JITTER_SCALE * (self.rng.random::<f32>() * 2.0 - 1.0),
            )
        } else if distance_sq > 0.0 && distance_sq < REPULSION_CUTOFF_SQ {
            delta * (1.0 / distance_sq)
        } else {
            Vec2::ZERO
        }
    }

    // =========================================================================
    // Integrator
    // =========================================================================

    /// Convert a force into velocity, scaled by the node's mass.
    ///
    /// Mass multiplies rather than divides here; heavier nodes react more,
    /// not less. Kept as-is because the tuning depends on it.
    pub fn apply_force(&self, body: &mut NodeBody, force: Vec2) {
        if force.length() > 0.0 {
            body.velocity += force * body.mass;
        }
    }

    /// Convert velocity into position, capping the speed first.
    ///
    /// The cap rescales by the squared normalized magnitude instead of
    /// clamping, so overshoot is damped non-uniformly: the faster the node,
    /// the harder it is braked (final speed is `max_speed^2 / speed`).
    pub fn apply_speed(&self, body: &mut NodeBody) {
        if body.velocity.length() > body.max_speed {
            let magnitude = body.velocity / body.max_speed;
            body.velocity /= magnitude.length_squared();
        }
        body.position += body.velocity;
    }

    // =========================================================================
    // Relax Hooks
    // =========================================================================

    /// Relax a contact: pull the person end toward its file.
    ///
    /// The force is evaluated at the file end, negated, and both applied and
    /// integrated immediately on the person end. The file end is left for
    /// the repulsion pass.
    pub fn on_relax_contact(&mut self, contact: &Contact, from: &mut PersonNode, to: &FileNode) {
        if !contact.is_alive() {
            return;
        }
        let force = -self.force_along_contact(contact, &from.body, &to.body);
        self.apply_force(&mut from.body, force);
        self.apply_speed(&mut from.body);
    }

    /// Relax a file node: sum repulsion from every other live file and turn
    /// it into velocity. Position is settled later, in the update pass.
    pub fn on_relax_file(&mut self, index: usize, files: &mut [FileNode]) {
        if !files[index].is_alive() {
            return;
        }
        let mut summation = Vec2::ZERO;
        for j in 0..files.len() {
            if j == index || !files[j].is_alive() {
                continue;
            }
            summation += self.force_between_files(&files[index], &files[j]);
        }
        self.apply_force(&mut files[index].body, summation);
    }

    /// Relax a person node.
    ///
    /// Motionless persons get a random kick so they never deadlock. The
    /// velocity is then renormalized to a fixed magnitude and pulled toward
    /// a cruising speed equal to the person's mass, fading with life, before
    /// one integration step.
    pub fn on_relax_person(&mut self, person: &mut PersonNode) {
        if !person.is_alive() {
            return;
        }
        if person.body.velocity.length() == 0.0 {
            let mass = person.body.mass;
            person.body.velocity = Vec2::new(
                mass * (self.rng.random::<f32>() - mass),
                mass * (self.rng.random::<f32>() - mass),
            );
        }

        person.body.velocity *= person.body.mass;
        person.body.velocity = person.body.velocity.normalize_or_zero() * 4.0;

        let speed = person.body.velocity.length();
        if speed > 0.0 {
            let mut delta = (person.body.mass - speed) / (speed * 2.0);
            delta *= person.body.life_ratio();
            person.body.velocity *= delta;
        }

        self.apply_speed(&mut person.body);
    }

    // =========================================================================
    // Update Hooks
    // =========================================================================

    /// Update a contact: shorten its life by one frame.
    pub fn on_update_contact(&mut self, contact: &mut Contact) {
        if !contact.is_alive() {
            return;
        }
        contact.decay();
    }

    /// Update a file node: integrate, constrain into bounds, decay, drag.
    ///
    /// Files never rebound off walls; they are simply clamped.
    pub fn on_update_file(&mut self, file: &mut FileNode, bounds: Bounds) {
        if !file.is_alive() {
            return;
        }
        self.apply_speed(&mut file.body);
        file.body.position = bounds.clamp(file.body.position);
        file.body.decay();
        file.body.velocity *= self.drag;
    }

    /// Update a person node: resolve collisions against every other live
    /// person, constrain into bounds, rebound off walls, decay, drag.
    pub fn on_update_person(&mut self, index: usize, persons: &mut [PersonNode], bounds: Bounds) {
        if !persons[index].is_alive() {
            return;
        }

        for j in 0..persons.len() {
            if j == index {
                continue;
            }
            let (node, other) = collision::pair_mut(persons, index, j);
            let force = self.resolve_person_collision(&mut node.body, &mut other.body);
            node.body.position += force;
        }

        persons[index].body.position = bounds.clamp(persons[index].body.position);
        self.rebound_off_walls(&mut persons[index].body, bounds);
        persons[index].body.decay();
        persons[index].body.velocity *= self.drag;
    }

    // =========================================================================
    // Collision & Boundary
    // =========================================================================

    /// Resolve a potential collision between two persons.
    ///
    /// Persons collide when their distance drops below the sum of their
    /// masses. The response is a discrete velocity reflection picked from
    /// the quadrant bounce table, followed by stepping both nodes along
    /// their reflected velocities until they no longer interpenetrate.
    ///
    /// The continuous force contribution is always zero; the return value
    /// exists so the update hook can fold it into the position like any
    /// other force.
    pub fn resolve_person_collision(&mut self, a: &mut NodeBody, b: &mut NodeBody) -> Vec2 {
        if !a.is_alive() || !b.is_alive() {
            return Vec2::ZERO;
        }

        let mut distance = (a.position - b.position).length();
        if distance <= a.mass + b.mass {
            let (rule_a, rule_b) = collision::bounce_rules(a.velocity, b.velocity);
            collision::apply(rule_a, &mut a.velocity);
            collision::apply(rule_b, &mut b.velocity);

            let mut steps = 0;
            while distance <= a.mass + b.mass {
                if steps >= CORRECTION_STEP_LIMIT {
                    // Reflected velocities failed to separate the pair
                    // (both at rest, most likely). Give up for this frame.
                    self.stall_count += 1;
                    break;
                }
                self.apply_speed(a);
                self.apply_speed(b);
                distance = (a.position - b.position).length();
                steps += 1;
            }
        }

        Vec2::ZERO
    }

    /// Bounce a person off the four walls of the drawing area.
    ///
    /// A wall is hit when the node is within `mass` of it and still moving
    /// toward it. The velocity component is reflected and the position is
    /// stepped back inside the margin band; both axes are handled
    /// independently in the same frame.
    fn rebound_off_walls(&mut self, body: &mut NodeBody, bounds: Bounds) {
        let mass = body.mass;

        if (body.position.x < mass && body.velocity.x < 0.0)
            || (body.position.x > bounds.width - mass && body.velocity.x > 0.0)
        {
            body.velocity.x = -body.velocity.x;
            let mut steps = 0;
            while body.position.x < mass || body.position.x > bounds.width - mass {
                if steps >= CORRECTION_STEP_LIMIT {
                    body.position.x = body.position.x.clamp(0.0, bounds.width);
                    self.stall_count += 1;
                    break;
                }
                body.position.x += body.velocity.x;
                steps += 1;
            }
        }

        if (body.position.y < mass && body.velocity.y < 0.0)
            || (body.position.y > bounds.height - mass && body.velocity.y > 0.0)
        {
            body.velocity.y = -body.velocity.y;
            let mut steps = 0;
            while body.position.y < mass || body.position.y > bounds.height - mass {
                if steps >= CORRECTION_STEP_LIMIT {
                    body.position.y = body.position.y.clamp(0.0, bounds.height);
                    self.stall_count += 1;
                    break;
                }
                body.position.y += body.velocity.y;
                steps += 1;
            }
        }
    }

    // =========================================================================
    // Start Position & Velocity Generators
    // =========================================================================

    /// Uniform-random starting location for a person node.
    pub fn person_start_location(&mut self, bounds: Bounds) -> Vec2 {
        Vec2::new(
            bounds.width * self.rng.random::<f32>(),
            bounds.height * self.rng.random::<f32>(),
        )
    }

    /// Uniform-random starting location for a file node.
    pub fn file_start_location(&mut self, bounds: Bounds) -> Vec2 {
        Vec2::new(
            bounds.width * self.rng.random::<f32>(),
            bounds.height * self.rng.random::<f32>(),
        )
    }

    /// Mass-scaled random starting velocity for a person node, each
    /// component in `[-mass, mass]`.
    pub fn person_start_velocity(&mut self, mass: f32) -> Vec2 {
        Vec2::new(
            mass * (self.rng.random::<f32>() * 2.0 - 1.0),
            mass * (self.rng.random::<f32>() * 2.0 - 1.0),
        )
    }

    /// Mass-scaled random starting velocity for a file node, each component
    /// in `[-mass, mass]`.
    pub fn file_start_velocity(&mut self, mass: f32) -> Vec2 {
        Vec2::new(
            mass * (self.rng.random::<f32>() * 2.0 - 1.0),
            mass * (self.rng.random::<f32>() * 2.0 - 1.0),
        )
    }
}
