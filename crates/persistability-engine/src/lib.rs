//! Persistability Engine - round-trip verification
//!
//! Coordinates builders, the entity manager and the property comparator:
//! every registered case is persisted in one unit of work, found by identity
//! in a second, and compared property by property.

pub mod commands;
pub mod roundtrip;
pub mod suite;

pub use roundtrip::{
    CaseOutcome, FailurePolicy, RoundTrip, RoundTripCase, RoundTripReport, RoundTripVerifier,
};
