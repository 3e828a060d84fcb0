//! The swarm store and frame driver.
//!
//! The store owns every entity: file nodes, person nodes, and the contact
//! topology between them, kept in petgraph's StableGraph so indices survive
//! removals and dead nodes take their contacts with them. Bodies live in
//! per-kind vectors with never-reused slots, so a `FileId`/`PersonId` is
//! both a stable handle and a direct slot index.
//!
//! The store also runs the per-frame protocol: a relax pass over contacts,
//! then files, then persons, followed by an update pass in the same order.
//! The order is a contract — later hooks intentionally read positions
//! mutated by earlier hooks within the same frame — so `step` is the only
//! place it is spelled out.

use std::cell::Cell;
use std::collections::HashMap;

use petgraph::Directed;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};

use crate::physics::{Bounds, ChaoticEngine, SwarmConfig};
use crate::spatial::{PickTarget, SpatialIndex, SwarmPoint};

use super::contact::Contact;
use super::node::{Entity, FileId, FileNode, NodeBody, PersonId, PersonNode};

/// What a [`Swarm::sweep`] call removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Dead file nodes removed.
    pub files: usize,
    /// Dead person nodes removed.
    pub persons: usize,
    /// Contacts removed, whether expired or orphaned by a node removal.
    pub contacts: usize,
}

impl SweepStats {
    /// Total entities removed.
    pub fn total(&self) -> usize {
        self.files + self.persons + self.contacts
    }
}

/// The driver-side store for one animated swarm.
pub struct Swarm {
    /// Contact topology. Node weights are stable entity ids, edge weights
    /// are the contacts themselves.
    graph: StableGraph<Entity, Contact, Directed>,

    /// Map from stable FileId to petgraph NodeIndex.
    file_index: HashMap<FileId, NodeIndex>,

    /// Map from stable PersonId to petgraph NodeIndex.
    person_index: HashMap<PersonId, NodeIndex>,

    /// File bodies, one slot per FileId. Slots are never reused; swept
    /// files leave a dead slot behind.
    files: Vec<FileNode>,

    /// Person bodies, one slot per PersonId.
    persons: Vec<PersonNode>,

    /// The drawing area.
    bounds: Bounds,

    /// Spatial index for hit testing.
    spatial: SpatialIndex,

    /// Whether the spatial index needs rebuilding.
    spatial_dirty: Cell<bool>,
}

impl Swarm {
    /// Create an empty swarm for the given drawing area.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            graph: StableGraph::new(),
            file_index: HashMap::new(),
            person_index: HashMap::new(),
            files: Vec::new(),
            persons: Vec::new(),
            bounds,
            spatial: SpatialIndex::new(),
            spatial_dirty: Cell::new(false),
        }
    }

    /// Create a swarm with pre-allocated capacity.
    pub fn with_capacity(bounds: Bounds, file_capacity: usize, person_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(
                file_capacity + person_capacity,
                file_capacity * 2,
            ),
            file_index: HashMap::with_capacity(file_capacity),
            person_index: HashMap::with_capacity(person_capacity),
            files: Vec::with_capacity(file_capacity),
            persons: Vec::with_capacity(person_capacity),
            bounds,
            spatial: SpatialIndex::new(),
            spatial_dirty: Cell::new(false),
        }
    }

    /// The drawing area the swarm is simulated in.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Resize the drawing area, e.g. when the host surface resizes.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.spatial_dirty.set(true);
    }

    // =========================================================================
    // Entity Creation
    // =========================================================================

    /// Add a file node with an explicit body.
    pub fn add_file(&mut self, body: NodeBody) -> FileId {
        let id = FileId(self.files.len() as u32);
        let index = self.graph.add_node(Entity::File(id));
        self.file_index.insert(id, index);
        self.files.push(FileNode::new(body));
        self.spatial_dirty.set(true);
        id
    }

    /// Add a person node with an explicit body.
    pub fn add_person(&mut self, body: NodeBody) -> PersonId {
        let id = PersonId(self.persons.len() as u32);
        let index = self.graph.add_node(Entity::Person(id));
        self.person_index.insert(id, index);
        self.persons.push(PersonNode::new(body));
        self.spatial_dirty.set(true);
        id
    }

    /// Spawn a file node using the engine's start generators and the
    /// configured defaults.
    pub fn spawn_file(&mut self, engine: &mut ChaoticEngine, config: &SwarmConfig) -> FileId {
        let position = engine.file_start_location(self.bounds);
        let velocity = engine.file_start_velocity(config.file_mass);
        self.add_file(NodeBody::new(
            position,
            velocity,
            config.file_mass,
            config.file_life,
            config.file_max_speed,
        ))
    }

    /// Spawn a person node using the engine's start generators and the
    /// configured defaults.
    pub fn spawn_person(&mut self, engine: &mut ChaoticEngine, config: &SwarmConfig) -> PersonId {
        let position = engine.person_start_location(self.bounds);
        let velocity = engine.person_start_velocity(config.person_mass);
        self.add_person(NodeBody::new(
            position,
            velocity,
            config.person_mass,
            config.person_life,
            config.person_max_speed,
        ))
    }

    /// Link a person to a file with a fresh contact, bumping the file's
    /// touch counter. Returns `None` if either endpoint is unknown.
    pub fn add_contact(
        &mut self,
        from: PersonId,
        to: FileId,
        rest_length: f32,
        life: i32,
    ) -> Option<EdgeIndex> {
        let &person_index = self.person_index.get(&from)?;
        let &file_index = self.file_index.get(&to)?;
        self.files[to.index()].touch();
        Some(self.graph.add_edge(
            person_index,
            file_index,
            Contact::new(from, to, rest_length, life),
        ))
    }

    /// Record another touch on an existing file without creating a contact.
    pub fn touch_file(&mut self, id: FileId) -> bool {
        match self.files.get_mut(id.index()) {
            Some(file) => {
                file.touch();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get a file node by id.
    pub fn file(&self, id: FileId) -> Option<&FileNode> {
        self.files.get(id.index())
    }

    /// Get a mutable file node by id.
    pub fn file_mut(&mut self, id: FileId) -> Option<&mut FileNode> {
        self.files.get_mut(id.index())
    }

    /// Get a person node by id.
    pub fn person(&self, id: PersonId) -> Option<&PersonNode> {
        self.persons.get(id.index())
    }

    /// Get a mutable person node by id.
    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut PersonNode> {
        self.persons.get_mut(id.index())
    }

    /// All file slots, dead ones included, in id order.
    #[inline]
    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    /// All person slots, dead ones included, in id order.
    #[inline]
    pub fn persons(&self) -> &[PersonNode] {
        &self.persons
    }

    /// Number of live file nodes.
    pub fn file_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_alive()).count()
    }

    /// Number of live person nodes.
    pub fn person_count(&self) -> usize {
        self.persons.iter().filter(|p| p.is_alive()).count()
    }

    /// Number of contacts still in the topology, dead or alive.
    pub fn contact_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over every contact still in the topology.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_weight(edge))
    }

    /// Files currently linked from a person, in topology order.
    pub fn files_of_person(&self, id: PersonId) -> Vec<FileId> {
        let Some(&index) = self.person_index.get(&id) else {
            return Vec::new();
        };
        self.graph
            .neighbors(index)
            .filter_map(|neighbor| match self.graph.node_weight(neighbor) {
                Some(Entity::File(file)) => Some(*file),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Frame Protocol
    // =========================================================================

    /// Advance the simulation by one frame.
    ///
    /// Relax passes run first (contacts, files, persons), then update
    /// passes in the same order. Entities whose life already reached zero
    /// are skipped inside each hook.
    pub fn step(&mut self, engine: &mut ChaoticEngine) {
        engine.initialize_frame();

        let contact_edges: Vec<EdgeIndex> = self.graph.edge_indices().collect();

        for &edge in &contact_edges {
            let Some(&contact) = self.graph.edge_weight(edge) else {
                continue;
            };
            engine.on_relax_contact(
                &contact,
                &mut self.persons[contact.from.index()],
                &self.files[contact.to.index()],
            );
        }
        for index in 0..self.files.len() {
            engine.on_relax_file(index, &mut self.files);
        }
        for person in &mut self.persons {
            engine.on_relax_person(person);
        }

        for &edge in &contact_edges {
            if let Some(contact) = self.graph.edge_weight_mut(edge) {
                engine.on_update_contact(contact);
            }
        }
        for file in &mut self.files {
            engine.on_update_file(file, self.bounds);
        }
        for index in 0..self.persons.len() {
            engine.on_update_person(index, &mut self.persons, self.bounds);
        }

        engine.finalize_frame();
        self.spatial_dirty.set(true);
    }

    /// Remove every dead entity from the topology.
    ///
    /// Expired contacts are dropped first; dead nodes follow, taking any
    /// remaining incident contacts with them. Slots of removed nodes stay
    /// allocated (and inert) so ids keep their meaning.
    pub fn sweep(&mut self) -> SweepStats {
        let mut stats = SweepStats::default();

        let expired: Vec<EdgeIndex> = self
            .graph
            .edge_indices()
            .filter(|&edge| {
                self.graph
                    .edge_weight(edge)
                    .is_some_and(|contact| !contact.is_alive())
            })
            .collect();
        for edge in expired {
            self.graph.remove_edge(edge);
            stats.contacts += 1;
        }

        let dead_files: Vec<FileId> = self
            .file_index
            .keys()
            .copied()
            .filter(|id| !self.files[id.index()].is_alive())
            .collect();
        for id in dead_files {
            if let Some(index) = self.file_index.remove(&id) {
                let edges_before = self.graph.edge_count();
                self.graph.remove_node(index);
                stats.contacts += edges_before - self.graph.edge_count();
                stats.files += 1;
            }
        }

        let dead_persons: Vec<PersonId> = self
            .person_index
            .keys()
            .copied()
            .filter(|id| !self.persons[id.index()].is_alive())
            .collect();
        for id in dead_persons {
            if let Some(index) = self.person_index.remove(&id) {
                let edges_before = self.graph.edge_count();
                self.graph.remove_node(index);
                stats.contacts += edges_before - self.graph.edge_count();
                stats.persons += 1;
            }
        }

        if stats.total() > 0 {
            self.spatial_dirty.set(true);
        }
        stats
    }

    /// Clear all entities, resetting the swarm to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.file_index.clear();
        self.person_index.clear();
        self.files.clear();
        self.persons.clear();
        self.spatial.clear();
        self.spatial_dirty.set(false);
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Whether positions changed since the last spatial rebuild.
    pub fn is_spatial_dirty(&self) -> bool {
        self.spatial_dirty.get()
    }

    /// Rebuild the spatial index from the current live entities.
    pub fn rebuild_spatial_index(&mut self) {
        let mut points = Vec::with_capacity(self.files.len() + self.persons.len());
        for (index, file) in self.files.iter().enumerate() {
            if file.is_alive() {
                points.push(SwarmPoint::new(
                    PickTarget::File(FileId(index as u32)),
                    file.body.position.x,
                    file.body.position.y,
                ));
            }
        }
        for (index, person) in self.persons.iter().enumerate() {
            if person.is_alive() {
                points.push(SwarmPoint::new(
                    PickTarget::Person(PersonId(index as u32)),
                    person.body.position.x,
                    person.body.position.y,
                ));
            }
        }
        self.spatial.rebuild(points);
        self.spatial_dirty.set(false);
    }

    /// Find the nearest live entity to a point.
    pub fn find_nearest(&self, x: f32, y: f32) -> Option<PickTarget> {
        self.spatial.nearest(x, y)
    }

    /// Find the nearest live entity within a maximum distance.
    pub fn find_nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<PickTarget> {
        self.spatial.nearest_within(x, y, max_distance)
    }

    /// Find all live entities in a rectangle.
    pub fn find_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<PickTarget> {
        self.spatial.in_rect(min_x, min_y, max_x, max_y)
    }

    /// Find all live entities within a radius of a point.
    pub fn find_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<PickTarget> {
        self.spatial.in_radius(x, y, radius)
    }
}
