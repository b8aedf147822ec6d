//! Declarative schema changelogs
//!
//! YAML changelogs of uniquely identified changesets, loaded through a
//! resource accessor and applied by the [`SchemaPreparer`].

pub mod checksums;
pub mod contexts;
pub mod format;
pub mod history;
pub mod parser;
pub mod preparer;
pub mod resource;
pub mod sql;

pub use contexts::Contexts;
pub use history::AppliedChangeSet;
pub use parser::{load_changelog, ChangeSet, DatabaseChangeLog};
pub use preparer::{current_version, ChangeLogStatus, SchemaPreparer, UpdateSummary};
pub use resource::{EmbeddedResources, FileSystemResources, ResourceAccessor};

/// Changelog applied when none is configured
pub const DEFAULT_CHANGELOG: &str = "db-changelog.yaml";
