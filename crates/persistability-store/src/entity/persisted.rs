//! Pre-persisting builder decorator
//!
//! Wraps a builder so the object it builds is persisted before it is
//! handed on, typically to a parent builder:
//!
//! ```ignore
//! a_company().having_employee(persisted(&em, an_employee().with_name("Joe Six Pack")))
//! ```
//!
//! Building must happen inside a unit of work on `em`.

use crate::entity::{Entity, EntityManager};
use persistability_core::builder::Builder;
use persistability_core::errors::ExError;

/// Builder whose output is already persistent
pub struct Persisted<'em, B> {
    em: &'em EntityManager,
    inner: B,
}

/// Decorate `inner` so every built object is persisted through `em`
pub fn persisted<B>(em: &EntityManager, inner: B) -> Persisted<'_, B> {
    Persisted { em, inner }
}

impl<'em, T, B> Builder<T> for Persisted<'em, B>
where
    T: Entity + Clone,
    B: Builder<T>,
{
    /// Build, persist, and return a copy of the managed instance carrying
    /// its assigned identity
    fn build(&self) -> Result<T, ExError> {
        let built = self.inner.build()?;
        let managed = self.em.persist(built)?;
        Ok(T::clone(&managed))
    }

    /// The decorated builder's label
    fn label(&self) -> String {
        self.inner.label()
    }
}
