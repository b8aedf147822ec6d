//! Engine commands
//!
//! Entry points shared by the CLI and the integration tests: prepare a
//! persistence unit's schema, report its status, run the round-trip suite.

pub mod prepare;
pub mod verify;

pub use prepare::{prepare_schema, schema_status};
pub use verify::run_verification;
