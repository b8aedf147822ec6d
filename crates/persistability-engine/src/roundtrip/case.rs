//! Round-trip cases
//!
//! A case pairs a type label with a builder. Verifying it persists the built
//! object in one unit of work, finds it by identity in a second, and compares
//! the two property by property.

use persistability_core::builder::Builder;
use persistability_core::compare::PropertyComparator;
use persistability_core::errors::{ExError, ExErrorKind, PersistabilityError};
use persistability_store::{
    Entity, EntityManager, Result as StoreResult, SqliteTransactor, Transactor,
};
use std::rc::Rc;

/// A verification the verifier can run without knowing the entity type
pub trait RoundTrip {
    /// Type label used in reports and errors
    fn label(&self) -> &str;

    /// Run one round trip through `transactor`
    fn verify(&self, transactor: &SqliteTransactor<'_>) -> Result<(), ExError>;
}

/// Round trip of the objects produced by one builder
pub struct RoundTripCase<'a, E> {
    label: String,
    builder: Box<dyn Builder<E> + 'a>,
    comparator: PropertyComparator,
}

impl<'a, E: Entity + Clone> RoundTripCase<'a, E> {
    /// Case labelled after its builder (`CompanyBuilder` -> `Company`)
    pub fn new(builder: impl Builder<E> + 'a) -> Self {
        let label = builder.label();
        Self::labelled(label, builder)
    }

    pub fn labelled(label: impl Into<String>, builder: impl Builder<E> + 'a) -> Self {
        Self {
            label: label.into(),
            builder: Box::new(builder),
            comparator: PropertyComparator::new(),
        }
    }

    /// Allow the property at `path` to differ after the round trip
    pub fn ignoring(mut self, path: impl Into<String>) -> Self {
        self.comparator = self.comparator.ignoring(path);
        self
    }

    fn could_not_round_trip(&self, err: ExError) -> ExError {
        ExError::new(ExErrorKind::RoundTripFailed)
            .with_op("round_trip")
            .with_entity(self.label.clone())
            .with_message(format!("could not round-trip {}", self.label))
            .with_source(err)
    }

    /// Build and persist inside the first unit of work
    fn persist(&self, transactor: &SqliteTransactor<'_>) -> Result<Rc<E>, ExError> {
        transactor
            .perform_query(|em: &EntityManager| -> StoreResult<Rc<E>> {
                em.persist(self.builder.build()?)
            })
            .map_err(|e| self.could_not_round_trip(e))
    }

    /// Find by identity inside the second unit of work
    fn fetch(&self, transactor: &SqliteTransactor<'_>, id: i64) -> Result<Rc<E>, ExError> {
        transactor
            .perform_query(|em: &EntityManager| em.get::<E>(id))
            .map_err(|e| self.could_not_round_trip(e.with_entity(self.label.clone())))
    }
}

impl<E: Entity + Clone> RoundTrip for RoundTripCase<'_, E> {
    fn label(&self) -> &str {
        &self.label
    }

    fn verify(&self, transactor: &SqliteTransactor<'_>) -> Result<(), ExError> {
        let persisted = self.persist(transactor)?;
        let id = persisted.id().ok_or_else(|| {
            ExError::from(PersistabilityError::IdentityMissing {
                entity: self.label.clone(),
            })
        })?;

        let fetched = self.fetch(transactor, id)?;

        if fetched.id() != Some(id) {
            return Err(PersistabilityError::IdentityUnstable {
                label: self.label.clone(),
                persisted: id,
                fetched: fetched.id().unwrap_or_default(),
            }
            .into());
        }
        if Rc::ptr_eq(&persisted, &fetched) {
            return Err(PersistabilityError::AliasedInstance {
                label: self.label.clone(),
            }
            .into());
        }

        self.comparator
            .assert_same(&self.label, persisted.as_ref(), fetched.as_ref())
            .map_err(ExError::from)
    }
}
