//! Persistability Core - domain objects, factories and comparison
//!
//! This crate provides the storage-independent half of round-trip
//! verification:
//! - Domain objects with an identity attribute (`Company`, `Employee`)
//! - Composable object factories (`Builder`, `CompanyBuilder`, `EmployeeBuilder`)
//! - Structural property comparison with per-path differences
//! - The error facility (`ExError`) and structured logging facility

pub mod builder;
pub mod compare;
pub mod errors;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use builder::{Builder, CompanyBuilder, EmployeeBuilder};
pub use compare::{PropertyComparator, PropertyDifference};
pub use errors::{ExError, ExErrorKind, PersistabilityError, Result};
pub use model::{Company, Employee, EntityId};
