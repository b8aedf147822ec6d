//! Persistability Store - SQLite persistence for round-trip verification
//!
//! Provides:
//! - Declarative YAML changelogs and the schema preparer that applies them
//! - Entity management (persist, find, persistence context) with explicit
//!   row mappings for the domain objects
//! - Units of work with commit-on-success and rollback-on-error
//! - Persistence unit configuration

pub mod changelog;
pub mod config;
pub mod db;
pub mod entity;
pub mod errors;
pub mod transactor;

// Re-export key types
pub use changelog::{Contexts, SchemaPreparer, UpdateSummary};
pub use config::PersistenceUnitConfig;
pub use entity::{persisted, Entity, EntityManager, EntityManagerFactory, Persisted};
pub use errors::Result;
pub use transactor::{QueryUnitOfWork, SqliteTransactor, Transactor, UnitOfWork};
