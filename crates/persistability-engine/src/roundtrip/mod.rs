//! Object-relational round-trip verification

pub mod case;
pub mod report;
pub mod verifier;

pub use case::{RoundTrip, RoundTripCase};
pub use report::{CaseOutcome, CaseResult, RoundTripReport};
pub use verifier::{FailurePolicy, RoundTripVerifier};
