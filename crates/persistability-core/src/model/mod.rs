//! Domain objects subject to round-trip verification

pub mod company;
pub mod employee;

pub use company::Company;
pub use employee::Employee;

/// Identity attribute type shared by every domain object
pub type EntityId = i64;
