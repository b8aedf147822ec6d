//! The registered round-trip suite
//!
//! Every persistent type gets at least one case. Cases embedding
//! pre-persisted children exercise the link path of the mapping as well as
//! the cascade path.

use crate::roundtrip::RoundTripVerifier;
use persistability_core::builder::{CompanyBuilder, EmployeeBuilder};
use persistability_store::persisted;

/// Register the default cases on `verifier`
pub fn register_default_suite(verifier: &mut RoundTripVerifier<'_>) {
    let em = verifier.entity_manager();

    verifier
        .register(CompanyBuilder::a_company().having_employee(persisted(
            em,
            EmployeeBuilder::an_employee().with_name("Joe Six Pack"),
        )))
        .register(EmployeeBuilder::an_employee());
}
