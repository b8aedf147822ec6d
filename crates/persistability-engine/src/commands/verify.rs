//! Verification run
//!
//! One run opens an entity manager for the unit, prepares its schema once,
//! then verifies every case of the default suite.

use crate::commands::prepare::prepare_schema;
use crate::roundtrip::{FailurePolicy, RoundTripReport, RoundTripVerifier};
use crate::suite::register_default_suite;
use persistability_core::errors::ExError;
use persistability_core_types::RunContext;
use persistability_store::{EntityManagerFactory, PersistenceUnitConfig};

/// Prepare the unit's schema and run the default suite
///
/// Returns the report whether or not cases failed; only setup failures
/// (opening the database, preparing the schema) are errors.
pub fn run_verification(
    config: &PersistenceUnitConfig,
    policy: FailurePolicy,
) -> Result<RoundTripReport, ExError> {
    let run = RunContext::new(config.name.clone());
    let em = EntityManagerFactory::new(config.clone())
        .create_entity_manager()
        .map_err(|e| e.with_run_id(run.run_id.clone()))?;

    let summary =
        prepare_schema(&em, config).map_err(|e| e.with_run_id(run.run_id.clone()))?;
    tracing::info!(
        run_id = %run.run_id,
        applied_count = summary.applied.len(),
        "schema prepared"
    );

    let mut verifier = RoundTripVerifier::new(&em)
        .with_policy(policy)
        .with_run_context(run);
    register_default_suite(&mut verifier);

    Ok(verifier.run())
}
