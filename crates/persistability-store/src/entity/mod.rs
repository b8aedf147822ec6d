//! Entity management
//!
//! The persistence boundary the harness talks to: persist an object, find
//! an object by identity, and unwrap the underlying connection. Each
//! persistable type supplies an explicit row mapping through [`Entity`].

pub mod company;
pub mod context;
pub mod employee;
pub mod manager;
pub mod persisted;

use crate::errors::Result;
use persistability_core::model::EntityId;
use serde::Serialize;

pub use context::PersistenceContext;
pub use manager::{EntityManager, EntityManagerFactory};
pub use persisted::{persisted, Persisted};

/// A type with an identity attribute and a table mapping
pub trait Entity: Serialize + PartialEq + Sized + 'static {
    /// Entity name, used in the persistence context and in errors
    const NAME: &'static str;

    /// Identity, if assigned
    fn id(&self) -> Option<EntityId>;

    /// Insert this object and the children it owns, assigning identities in
    /// place; returns the object's identity
    fn insert(&mut self, em: &EntityManager) -> Result<EntityId>;

    /// Load a fresh instance from storage
    fn load(em: &EntityManager, id: EntityId) -> Result<Option<Self>>;
}
