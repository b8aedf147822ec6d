//! Error handling for persistability-store
//!
//! Wraps persistability-core ExError with store-specific helpers

use persistability_core::errors::{ExError, ExErrorKind, PersistabilityError};
use persistability_core::model::EntityId;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a changeset failure error, keeping the database error as source
pub fn changeset_failed(id: &str, author: &str, err: rusqlite::Error) -> ExError {
    let cause = from_rusqlite(err);
    ExError::from(PersistabilityError::ChangeSetFailed {
        id: id.to_string(),
        author: author.to_string(),
        reason: cause.message().to_string(),
    })
    .with_source(cause)
}

/// Create a changelog validation error
pub fn changelog_invalid(resource: &str, reason: impl Into<String>) -> ExError {
    PersistabilityError::ChangelogInvalid {
        resource: resource.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Create a missing changelog resource error
pub fn changelog_not_found(resource: &str) -> ExError {
    PersistabilityError::ChangelogNotFound {
        resource: resource.to_string(),
    }
    .into()
}

/// Create an error for an entity operation attempted outside a unit of work
pub fn transaction_required(op: &str) -> ExError {
    PersistabilityError::TransactionRequired { op: op.to_string() }.into()
}

/// Map an insert failure, reporting primary-key collisions as `AlreadyExists`
pub fn insert_error(entity: &str, id: Option<EntityId>, err: rusqlite::Error) -> ExError {
    if let (Some(id), rusqlite::Error::SqliteFailure(e, _)) = (id, &err) {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY {
            return PersistabilityError::EntityExists {
                entity: entity.to_string(),
                id,
            }
            .into();
        }
    }
    from_rusqlite(err).with_op("persist").with_entity(entity)
}

/// Create a database error from rusqlite::Error
///
/// Column conversion failures are reported as `Mapping` so a type-conversion
/// bug is distinguishable from a storage failure.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => ExErrorKind::Mapping,
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a configuration error
pub fn config_error(err: config::ConfigError) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(err.to_string())
}
