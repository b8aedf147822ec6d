// Round-trip every registered persistent type
//
// Prepares the schema once, then persists each registered builder's output,
// reloads it by identity and compares it property by property.

use persistability_core::errors::ExErrorKind;
use persistability_engine::commands::{prepare_schema, run_verification};
use persistability_engine::suite::register_default_suite;
use persistability_engine::{FailurePolicy, RoundTripVerifier};
use persistability_store::{EntityManagerFactory, PersistenceUnitConfig};

#[test]
fn round_trip_persistent_objects() {
    // Given: A prepared in-memory persistence unit
    let config = PersistenceUnitConfig::default();
    let em = EntityManagerFactory::new(config.clone())
        .create_entity_manager()
        .unwrap();
    prepare_schema(&em, &config).unwrap();

    // When: Every registered builder is round-tripped
    let mut verifier = RoundTripVerifier::new(&em);
    register_default_suite(&mut verifier);
    let report = verifier.verify_all();

    // Then: All of them reload with the same state
    let report = report.unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(report.passed_count(), verifier.len());
}

#[test]
fn round_trip_persistent_objects_twice_in_one_session() {
    // Given: A prepared persistence unit
    let config = PersistenceUnitConfig::default();
    let em = EntityManagerFactory::new(config.clone())
        .create_entity_manager()
        .unwrap();
    prepare_schema(&em, &config).unwrap();

    // When: The suite runs twice against the same database
    for _ in 0..2 {
        let mut verifier = RoundTripVerifier::new(&em);
        register_default_suite(&mut verifier);

        // Then: Each pass succeeds on its own fresh rows
        assert!(verifier.verify_all().is_ok());
    }
}

#[test]
fn round_trip_against_a_file_database() {
    // Given: A persistence unit on disk
    let dir = tempfile::tempdir().unwrap();
    let config = PersistenceUnitConfig {
        database: dir.path().join("it.db").display().to_string(),
        ..PersistenceUnitConfig::default()
    };

    // When: A full verification run executes
    let report = run_verification(&config, FailurePolicy::CollectAll).unwrap();

    // Then: Every case passes
    assert!(report.is_success(), "{}", report);

    // And: A second run reuses the prepared schema
    let again = run_verification(&config, FailurePolicy::FailFast).unwrap();
    assert!(again.is_success(), "{}", again);
}

#[test]
fn schema_preparation_failure_stops_the_run() {
    // Given: A unit whose changelog cannot be found
    let config = PersistenceUnitConfig {
        changelog: "nope.yaml".to_string(),
        ..PersistenceUnitConfig::default()
    };

    // When: A verification run starts
    let err = run_verification(&config, FailurePolicy::FailFast).unwrap_err();

    // Then: No case runs and the setup error carries the run
    assert_eq!(err.kind(), ExErrorKind::ResourceNotFound);
    assert!(err.run_id().is_some());
}
