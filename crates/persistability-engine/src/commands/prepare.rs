//! Schema preparation
//!
//! The preparer runs inside a unit of work on the manager that the
//! verifications will use, so a failed preparation leaves the database as
//! it was.

use persistability_core::errors::ExError;
use persistability_store::changelog::ChangeLogStatus;
use persistability_store::{
    Contexts, EntityManager, PersistenceUnitConfig, SqliteTransactor, Transactor, UpdateSummary,
};

/// Apply the unit's changelog with the unit's contexts
pub fn prepare_schema(
    em: &EntityManager,
    config: &PersistenceUnitConfig,
) -> Result<UpdateSummary, ExError> {
    prepare_schema_with(em, config, &config.contexts())
}

/// Apply the unit's changelog with explicit contexts
pub fn prepare_schema_with(
    em: &EntityManager,
    config: &PersistenceUnitConfig,
    contexts: &Contexts,
) -> Result<UpdateSummary, ExError> {
    let preparer = config.schema_preparer();
    SqliteTransactor::new(em).perform_query(|em: &EntityManager| {
        preparer.update(em.connection(), contexts)
    })
}

/// Applied and pending changesets of the unit's changelog
pub fn schema_status(
    em: &EntityManager,
    config: &PersistenceUnitConfig,
) -> Result<ChangeLogStatus, ExError> {
    config.schema_preparer().status(em.connection())
}
