//! Swarm Physics - WASM Module
//!
//! A discrete-time 2D particle engine for animated commit-swarm graphs:
//! person nodes orbit the file nodes they touch, linked by decaying
//! contacts. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `swarm`: Entity store (files, persons, contacts) and the frame driver
//! - `physics`: The chaotic force model and integrator
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod physics;
pub mod spatial;
pub mod swarm;

use physics::{Bounds, ChaoticEngine, SwarmConfig};
use spatial::PickTarget;
use swarm::{FileId, PersonId, Swarm};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn encode_target(target: PickTarget) -> [u32; 2] {
    match target {
        PickTarget::File(id) => [0, id.0],
        PickTarget::Person(id) => [1, id.0],
    }
}

/// Main entry point for the swarm engine.
///
/// This struct wraps the internal store and engine and provides the public
/// API exposed to JavaScript.
#[wasm_bindgen]
pub struct SwarmPhysicsWasm {
    config: SwarmConfig,
    engine: ChaoticEngine,
    swarm: Swarm,
}

#[wasm_bindgen]
impl SwarmPhysicsWasm {
    /// Create a new empty swarm for a drawing area of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        let config = SwarmConfig::default();
        let engine = ChaoticEngine::new(&config);
        Self {
            config,
            engine,
            swarm: Swarm::new(Bounds::new(width, height)),
        }
    }

    /// Create a swarm with pre-allocated capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(
        width: f32,
        height: f32,
        file_capacity: usize,
        person_capacity: usize,
    ) -> Self {
        let config = SwarmConfig::default();
        let engine = ChaoticEngine::new(&config);
        Self {
            config,
            engine,
            swarm: Swarm::with_capacity(Bounds::new(width, height), file_capacity, person_capacity),
        }
    }

    /// Replace the configuration from a plain JS object.
    ///
    /// Unspecified fields keep their defaults. Re-seeds the engine's RNG,
    /// so reconfiguring with the same seed replays the same simulation.
    /// Existing entities keep the parameters they were spawned with.
    pub fn configure(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: SwarmConfig = serde_wasm_bindgen::from_value(config).map_err(JsValue::from)?;
        self.engine.setup(&config);
        self.config = config;
        Ok(())
    }

    /// Resize the drawing area.
    #[wasm_bindgen(js_name = setBounds)]
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.swarm.set_bounds(Bounds::new(width, height));
    }

    /// Drawing area width.
    pub fn width(&self) -> f32 {
        self.swarm.bounds().width
    }

    /// Drawing area height.
    pub fn height(&self) -> f32 {
        self.swarm.bounds().height
    }

    // =========================================================================
    // Entity Operations
    // =========================================================================

    /// Spawn a file node at a random start location.
    ///
    /// Returns the stable file ID.
    #[wasm_bindgen(js_name = spawnFile)]
    pub fn spawn_file(&mut self) -> u32 {
        self.swarm.spawn_file(&mut self.engine, &self.config).0
    }

    /// Spawn a person node at a random start location.
    ///
    /// Returns the stable person ID.
    #[wasm_bindgen(js_name = spawnPerson)]
    pub fn spawn_person(&mut self) -> u32 {
        self.swarm.spawn_person(&mut self.engine, &self.config).0
    }

    /// Link a person to a file with a fresh contact at the given rest
    /// length, bumping the file's touch counter.
    ///
    /// Returns true if both endpoints exist.
    #[wasm_bindgen(js_name = addContact)]
    pub fn add_contact(&mut self, person_id: u32, file_id: u32, rest_length: f32) -> bool {
        self.swarm
            .add_contact(
                PersonId(person_id),
                FileId(file_id),
                rest_length,
                self.config.contact_life,
            )
            .is_some()
    }

    /// Record another touch on an existing file without creating a contact.
    ///
    /// Returns true if the file exists.
    #[wasm_bindgen(js_name = touchFile)]
    pub fn touch_file(&mut self, file_id: u32) -> bool {
        self.swarm.touch_file(FileId(file_id))
    }

    /// Refresh a file node's life back to its initial value.
    ///
    /// Returns true if the file exists.
    #[wasm_bindgen(js_name = refreshFile)]
    pub fn refresh_file(&mut self, file_id: u32) -> bool {
        match self.swarm.file_mut(FileId(file_id)) {
            Some(file) => {
                file.body.refresh();
                true
            }
            None => false,
        }
    }

    /// Refresh a person node's life back to its initial value.
    ///
    /// Returns true if the person exists.
    #[wasm_bindgen(js_name = refreshPerson)]
    pub fn refresh_person(&mut self, person_id: u32) -> bool {
        match self.swarm.person_mut(PersonId(person_id)) {
            Some(person) => {
                person.body.refresh();
                true
            }
            None => false,
        }
    }

    /// Get the number of live file nodes.
    #[wasm_bindgen(js_name = fileCount)]
    pub fn file_count(&self) -> u32 {
        self.swarm.file_count() as u32
    }

    /// Get the number of live person nodes.
    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> u32 {
        self.swarm.person_count() as u32
    }

    /// Get the number of contacts still in the topology.
    #[wasm_bindgen(js_name = contactCount)]
    pub fn contact_count(&self) -> u32 {
        self.swarm.contact_count() as u32
    }

    /// Upper bound on file IDs (max ID + 1). May be larger than fileCount
    /// after sweeps, since slots are never reused.
    #[wasm_bindgen(js_name = fileBound)]
    pub fn file_bound(&self) -> u32 {
        self.swarm.files().len() as u32
    }

    /// Upper bound on person IDs (max ID + 1).
    #[wasm_bindgen(js_name = personBound)]
    pub fn person_bound(&self) -> u32 {
        self.swarm.persons().len() as u32
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by one frame.
    pub fn step(&mut self) {
        let stalls_before = self.engine.stall_count();
        self.swarm.step(&mut self.engine);
        let stalls = self.engine.stall_count() - stalls_before;
        if stalls > 0 {
            web_sys::console::warn_1(
                &format!("swarm-physics: {stalls} correction loop(s) hit the step limit").into(),
            );
        }
    }

    /// Advance the simulation by several frames.
    #[wasm_bindgen(js_name = stepMany)]
    pub fn step_many(&mut self, frames: u32) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Remove every dead entity.
    ///
    /// Returns [files, persons, contacts] removed.
    pub fn sweep(&mut self) -> Vec<u32> {
        let stats = self.swarm.sweep();
        vec![
            stats.files as u32,
            stats.persons as u32,
            stats.contacts as u32,
        ]
    }

    /// Cumulative count of correction loops that hit their step limit.
    ///
    /// A monotonically rising value means the swarm is too crowded for its
    /// drawing area.
    #[wasm_bindgen(js_name = stallCount)]
    pub fn stall_count(&self) -> f64 {
        self.engine.stall_count() as f64
    }

    /// Clear all entities.
    pub fn clear(&mut self) {
        self.swarm.clear();
    }

    // =========================================================================
    // State Readback
    // =========================================================================

    /// Get file positions as [x0, y0, x1, y1, ...], one pair per file slot.
    #[wasm_bindgen(js_name = filePositions)]
    pub fn file_positions(&self) -> Float32Array {
        let files = self.swarm.files();
        let mut positions = Vec::with_capacity(files.len() * 2);
        for file in files {
            positions.push(file.body.position.x);
            positions.push(file.body.position.y);
        }
        Float32Array::from(&positions[..])
    }

    /// Get person positions as [x0, y0, x1, y1, ...], one pair per slot.
    #[wasm_bindgen(js_name = personPositions)]
    pub fn person_positions(&self) -> Float32Array {
        let persons = self.swarm.persons();
        let mut positions = Vec::with_capacity(persons.len() * 2);
        for person in persons {
            positions.push(person.body.position.x);
            positions.push(person.body.position.y);
        }
        Float32Array::from(&positions[..])
    }

    /// Get file life values, one per slot. Zero means dead.
    #[wasm_bindgen(js_name = fileLives)]
    pub fn file_lives(&self) -> Vec<i32> {
        self.swarm.files().iter().map(|f| f.body.life).collect()
    }

    /// Get person life values, one per slot.
    #[wasm_bindgen(js_name = personLives)]
    pub fn person_lives(&self) -> Vec<i32> {
        self.swarm.persons().iter().map(|p| p.body.life).collect()
    }

    /// Get file masses, one per slot. Mass doubles as render radius.
    #[wasm_bindgen(js_name = fileMasses)]
    pub fn file_masses(&self) -> Vec<f32> {
        self.swarm.files().iter().map(|f| f.body.mass).collect()
    }

    /// Get person masses, one per slot.
    #[wasm_bindgen(js_name = personMasses)]
    pub fn person_masses(&self) -> Vec<f32> {
        self.swarm.persons().iter().map(|p| p.body.mass).collect()
    }

    /// Get file touch counters, one per slot.
    #[wasm_bindgen(js_name = fileTouches)]
    pub fn file_touches(&self) -> Vec<u32> {
        self.swarm.files().iter().map(|f| f.touches).collect()
    }

    /// Get contact endpoints as [person0, file0, person1, file1, ...].
    #[wasm_bindgen(js_name = contactEndpoints)]
    pub fn contact_endpoints(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.swarm.contact_count() * 2);
        for contact in self.swarm.contacts() {
            out.push(contact.from.0);
            out.push(contact.to.0);
        }
        out
    }

    /// Get contact life values, in the same order as contactEndpoints.
    #[wasm_bindgen(js_name = contactLives)]
    pub fn contact_lives(&self) -> Vec<i32> {
        self.swarm.contacts().map(|c| c.life).collect()
    }

    /// Files currently linked from a person.
    ///
    /// Returns a Uint32Array of file IDs.
    #[wasm_bindgen(js_name = filesOfPerson)]
    pub fn files_of_person(&self, person_id: u32) -> Vec<u32> {
        self.swarm
            .files_of_person(PersonId(person_id))
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Rebuild the spatial index after position changes.
    ///
    /// Call this before spatial queries whenever the simulation stepped.
    #[wasm_bindgen(js_name = rebuildSpatialIndex)]
    pub fn rebuild_spatial_index(&mut self) {
        self.swarm.rebuild_spatial_index();
    }

    /// Find the nearest entity to a point.
    ///
    /// Returns [kind, id] where kind is 0 for a file and 1 for a person,
    /// or None if the swarm is empty.
    #[wasm_bindgen(js_name = findNearest)]
    pub fn find_nearest(&self, x: f32, y: f32) -> Option<Vec<u32>> {
        self.swarm
            .find_nearest(x, y)
            .map(|target| encode_target(target).to_vec())
    }

    /// Find the nearest entity within a maximum distance.
    ///
    /// Returns [kind, id], or None if nothing is in range.
    #[wasm_bindgen(js_name = findNearestWithin)]
    pub fn find_nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<Vec<u32>> {
        self.swarm
            .find_nearest_within(x, y, max_distance)
            .map(|target| encode_target(target).to_vec())
    }

    /// Find all entities within a rectangular region.
    ///
    /// Returns a flat Uint32Array of [kind, id] pairs.
    #[wasm_bindgen(js_name = findInRect)]
    pub fn find_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<u32> {
        self.swarm
            .find_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .flat_map(encode_target)
            .collect()
    }

    /// Find all entities within a radius of a point.
    ///
    /// Returns a flat Uint32Array of [kind, id] pairs.
    #[wasm_bindgen(js_name = findInRadius)]
    pub fn find_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<u32> {
        self.swarm
            .find_in_radius(x, y, radius)
            .into_iter()
            .flat_map(encode_target)
            .collect()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn seeded(seed: u64) -> (Swarm, ChaoticEngine, SwarmConfig) {
        let config = SwarmConfig {
            seed,
            ..SwarmConfig::default()
        };
        let engine = ChaoticEngine::new(&config);
        let swarm = Swarm::new(Bounds::new(800.0, 600.0));
        (swarm, engine, config)
    }

    fn populate(swarm: &mut Swarm, engine: &mut ChaoticEngine, config: &SwarmConfig) {
        let mut files = Vec::new();
        for _ in 0..12 {
            files.push(swarm.spawn_file(engine, config));
        }
        for p in 0..4 {
            let person = swarm.spawn_person(engine, config);
            for f in 0..3 {
                swarm.add_contact(person, files[p * 3 + f], 25.0, config.contact_life);
            }
        }
    }

    /// Run the full pipeline for many frames and verify the simulation
    /// stays inside its drawing area and every coordinate stays finite.
    #[test]
    fn test_long_run_stays_bounded_and_finite() {
        let (mut swarm, mut engine, config) = seeded(42);
        populate(&mut swarm, &mut engine, &config);

        for _ in 0..200 {
            swarm.step(&mut engine);
        }

        for file in swarm.files() {
            assert!(file.body.position.is_finite());
            assert!(file.body.velocity.is_finite());
            assert!(swarm.bounds().contains(file.body.position));
        }
        for person in swarm.persons() {
            assert!(person.body.position.is_finite());
            assert!(person.body.velocity.is_finite());
            assert!(swarm.bounds().contains(person.body.position));
        }
    }

    /// Two simulations built from the same seed must replay identically.
    #[test]
    fn test_same_seed_replays_identically() {
        let (mut swarm_a, mut engine_a, config_a) = seeded(1234);
        let (mut swarm_b, mut engine_b, config_b) = seeded(1234);
        populate(&mut swarm_a, &mut engine_a, &config_a);
        populate(&mut swarm_b, &mut engine_b, &config_b);

        for _ in 0..50 {
            swarm_a.step(&mut engine_a);
            swarm_b.step(&mut engine_b);
        }

        for (a, b) in swarm_a.files().iter().zip(swarm_b.files()) {
            assert_eq!(a.body.position, b.body.position);
            assert_eq!(a.body.velocity, b.body.velocity);
        }
        for (a, b) in swarm_a.persons().iter().zip(swarm_b.persons()) {
            assert_eq!(a.body.position, b.body.position);
            assert_eq!(a.body.velocity, b.body.velocity);
        }
        assert_eq!(engine_a.stall_count(), engine_b.stall_count());
    }

    /// Different seeds must diverge.
    #[test]
    fn test_different_seeds_diverge() {
        let (mut swarm_a, mut engine_a, config_a) = seeded(1);
        let (mut swarm_b, mut engine_b, config_b) = seeded(2);
        populate(&mut swarm_a, &mut engine_a, &config_a);
        populate(&mut swarm_b, &mut engine_b, &config_b);

        for _ in 0..5 {
            swarm_a.step(&mut engine_a);
            swarm_b.step(&mut engine_b);
        }

        let identical = swarm_a
            .files()
            .iter()
            .zip(swarm_b.files())
            .all(|(a, b)| a.body.position == b.body.position);
        assert!(!identical);
    }

    /// Contacts expire after contact_life frames and sweeps drop them
    /// while the endpoints live on.
    #[test]
    fn test_contact_lifecycle() {
        let (mut swarm, mut engine, mut config) = seeded(9);
        config.contact_life = 10;
        let file = swarm.spawn_file(&mut engine, &config);
        let person = swarm.spawn_person(&mut engine, &config);
        swarm.add_contact(person, file, 25.0, config.contact_life);

        for _ in 0..9 {
            swarm.step(&mut engine);
        }
        assert_eq!(swarm.sweep().contacts, 0);

        swarm.step(&mut engine);
        let stats = swarm.sweep();
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.files, 0);
        assert_eq!(stats.persons, 0);
        assert!(swarm.file(file).unwrap().is_alive());
        assert!(swarm.person(person).unwrap().is_alive());
    }

    /// Everything eventually dies without refreshes, and a final sweep
    /// empties the topology.
    #[test]
    fn test_swarm_winds_down() {
        let (mut swarm, mut engine, mut config) = seeded(3);
        config.file_life = 30;
        config.person_life = 30;
        config.contact_life = 30;
        populate(&mut swarm, &mut engine, &config);

        for _ in 0..30 {
            swarm.step(&mut engine);
        }
        swarm.sweep();

        assert_eq!(swarm.file_count(), 0);
        assert_eq!(swarm.person_count(), 0);
        assert_eq!(swarm.contact_count(), 0);
    }

    /// Refreshing a node's life mid-run keeps it alive past its original
    /// span.
    #[test]
    fn test_refresh_extends_life() {
        let (mut swarm, mut engine, mut config) = seeded(5);
        config.file_life = 20;
        let file = swarm.spawn_file(&mut engine, &config);

        for _ in 0..15 {
            swarm.step(&mut engine);
        }
        swarm.file_mut(file).unwrap().body.refresh();

        for _ in 0..15 {
            swarm.step(&mut engine);
        }
        assert!(swarm.file(file).unwrap().is_alive());
        assert_eq!(swarm.file(file).unwrap().body.life, 5);
    }

    /// Spatial picking works end to end after a simulated run.
    #[test]
    fn test_pick_after_run() {
        let (mut swarm, mut engine, config) = seeded(11);
        populate(&mut swarm, &mut engine, &config);

        for _ in 0..20 {
            swarm.step(&mut engine);
        }
        swarm.rebuild_spatial_index();

        let first = swarm.files()[0].body.position;
        let picked = swarm.find_nearest(first.x, first.y);
        assert!(picked.is_some());
        let everything = swarm.find_in_rect(0.0, 0.0, 800.0, 600.0);
        assert_eq!(everything.len(), 16);
    }
}
