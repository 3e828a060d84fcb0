//! Swarm entities and their store.
//!
//! A swarm is made of file nodes, person nodes, and decaying contacts
//! linking persons to the files they touched. The [`Swarm`] store owns all
//! of them and drives the per-frame relax/update protocol.

mod contact;
mod node;
mod store;

pub use contact::Contact;
pub use node::{Entity, FileId, FileNode, NodeBody, PersonId, PersonNode};
pub use store::{Swarm, SweepStats};
