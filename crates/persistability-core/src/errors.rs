use crate::compare::PropertyDifference;
use persistability_core_types::RunId;
use thiserror::Error;

/// Result type alias using PersistabilityError
pub type Result<T> = std::result::Result<T, PersistabilityError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that tests and the CLI can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    AlreadyExists,

    // Changelog / schema preparation
    ResourceNotFound,
    ChangelogInvalid,
    ChecksumMismatch,
    SchemaApplication,

    // Units of work
    TransactionRequired,
    TransactionActive,

    // Entity mapping / persistence
    Persistence,
    Mapping,

    // Round-trip verification
    RoundTripFailed,
    PropertyMismatch,
    IdentityViolation,

    // Integration/IO
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ResourceNotFound => "ERR_RESOURCE_NOT_FOUND",
            ExErrorKind::ChangelogInvalid => "ERR_CHANGELOG_INVALID",
            ExErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            ExErrorKind::SchemaApplication => "ERR_SCHEMA_APPLICATION",
            ExErrorKind::TransactionRequired => "ERR_TRANSACTION_REQUIRED",
            ExErrorKind::TransactionActive => "ERR_TRANSACTION_ACTIVE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Mapping => "ERR_MAPPING",
            ExErrorKind::RoundTripFailed => "ERR_ROUND_TRIP_FAILED",
            ExErrorKind::PropertyMismatch => "ERR_PROPERTY_MISMATCH",
            ExErrorKind::IdentityViolation => "ERR_IDENTITY_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and a source
/// chain so a wrapped persistence failure keeps its underlying cause.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    entity_id: Option<String>,
    changeset: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
    candidates: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            entity_id: None,
            changeset: None,
            run_id: None,
            message: String::new(),
            source: None,
            candidates: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context (a type label such as `Company`)
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add entity identity context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add changeset context (`id::author`)
    pub fn with_changeset(mut self, changeset: impl Into<String>) -> Self {
        self.changeset = Some(changeset.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add candidate labels (used by collect-all reports to name every failed case)
    pub fn with_candidates(mut self, labels: Vec<String>) -> Self {
        self.candidates = Some(labels);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity type context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the entity identity context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the changeset context, if any
    pub fn changeset(&self) -> Option<&str> {
        self.changeset.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Walk to the innermost error of the source chain
    pub fn root_cause(&self) -> &ExError {
        let mut current = self;
        while let Some(next) = current.source_error() {
            current = next;
        }
        current
    }

    /// Get candidate labels, if any
    pub fn candidates(&self) -> Option<&[String]> {
        self.candidates.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(changeset) = &self.changeset {
            write!(f, " (changeset: {})", changeset)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for schema preparation and round-trip verification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistabilityError {
    // ===== Changelog Errors =====
    /// Changelog resource could not be located
    #[error("Changelog resource not found: {resource}")]
    ChangelogNotFound { resource: String },

    /// Changelog could not be decoded or failed validation
    #[error("Invalid changelog {resource}: {reason}")]
    ChangelogInvalid { resource: String, reason: String },

    /// Two changesets share the same identity
    #[error("Duplicate changeset {id}::{author} in {changelog}")]
    DuplicateChangeSet {
        id: String,
        author: String,
        changelog: String,
    },

    /// Changelog includes itself, directly or transitively
    #[error("Changelog include cycle at {resource}")]
    IncludeCycle { resource: String },

    /// An applied changeset was edited after it ran
    #[error("Checksum mismatch for changeset {id}::{author} in {changelog}: recorded {recorded}, current {current}")]
    ChecksumMismatch {
        id: String,
        author: String,
        changelog: String,
        recorded: String,
        current: String,
    },

    /// Changeset DDL failed against the database
    #[error("Changeset {id}::{author} failed: {reason}")]
    ChangeSetFailed {
        id: String,
        author: String,
        reason: String,
    },

    // ===== Unit of Work Errors =====
    /// Operation needs an active unit of work
    #[error("Operation {op} requires an active unit of work")]
    TransactionRequired { op: String },

    /// A unit of work was started while another is active
    #[error("A unit of work is already active")]
    TransactionAlreadyActive,

    // ===== Entity Errors =====
    /// Entity with this identity is already stored
    #[error("{entity} with id {id} already exists")]
    EntityExists { entity: String, id: i64 },

    /// Stored child already belongs to a different parent
    #[error("{entity} with id {id} already belongs to {owner}")]
    AlreadyOwned {
        entity: String,
        id: i64,
        owner: String,
    },

    /// Entity with this identity is not stored
    #[error("{entity} with id {id} not found")]
    EntityNotFound { entity: String, id: i64 },

    /// Entity exposes no identity after persist
    #[error("{entity} has no identity after persist")]
    IdentityMissing { entity: String },

    /// Identity read after fetch differs from identity read after persist
    #[error("{label} reloaded with id {fetched}, persisted with id {persisted}")]
    IdentityUnstable {
        label: String,
        persisted: i64,
        fetched: i64,
    },

    /// Fetch returned the persisted instance itself instead of a stored copy
    #[error("{label} was served from the persistence context instead of storage")]
    AliasedInstance { label: String },

    /// Reloaded object differs from the persisted one
    #[error("{label} reloaded with different state: {}", describe_differences(.differences))]
    PropertyMismatch {
        label: String,
        differences: Vec<PropertyDifference>,
    },

    // ===== Generic Errors =====
    /// Serialization error (JSON/YAML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn describe_differences(differences: &[PropertyDifference]) -> String {
    differences
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Conversion from PersistabilityError to ExError
impl From<PersistabilityError> for ExError {
    fn from(err: PersistabilityError) -> Self {
        let message = err.to_string();
        match err {
            PersistabilityError::ChangelogNotFound { resource } => {
                ExError::new(ExErrorKind::ResourceNotFound)
                    .with_op("load_changelog")
                    .with_entity_id(resource)
                    .with_message(message)
            }

            PersistabilityError::ChangelogInvalid { resource, .. } => {
                ExError::new(ExErrorKind::ChangelogInvalid)
                    .with_op("load_changelog")
                    .with_entity_id(resource)
                    .with_message(message)
            }

            PersistabilityError::DuplicateChangeSet { id, author, .. } => {
                ExError::new(ExErrorKind::ChangelogInvalid)
                    .with_op("validate_changelog")
                    .with_changeset(format!("{}::{}", id, author))
                    .with_message(message)
            }

            PersistabilityError::IncludeCycle { resource } => {
                ExError::new(ExErrorKind::ChangelogInvalid)
                    .with_op("load_changelog")
                    .with_entity_id(resource)
                    .with_message(message)
            }

            PersistabilityError::ChecksumMismatch { id, author, .. } => {
                ExError::new(ExErrorKind::ChecksumMismatch)
                    .with_op("validate_changelog")
                    .with_changeset(format!("{}::{}", id, author))
                    .with_message(message)
            }

            PersistabilityError::ChangeSetFailed { id, author, .. } => {
                ExError::new(ExErrorKind::SchemaApplication)
                    .with_op("apply_changeset")
                    .with_changeset(format!("{}::{}", id, author))
                    .with_message(message)
            }

            PersistabilityError::TransactionRequired { ref op } => {
                ExError::new(ExErrorKind::TransactionRequired)
                    .with_op(op.clone())
                    .with_message(message)
            }

            PersistabilityError::TransactionAlreadyActive => {
                ExError::new(ExErrorKind::TransactionActive)
                    .with_op("begin_unit_of_work")
                    .with_message(message)
            }

            PersistabilityError::EntityExists { entity, id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_op("persist")
                    .with_entity(entity)
                    .with_entity_id(id.to_string())
                    .with_message(message)
            }

            PersistabilityError::AlreadyOwned { entity, id, .. } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_op("persist")
                    .with_entity(entity)
                    .with_entity_id(id.to_string())
                    .with_message(message)
            }

            PersistabilityError::EntityNotFound { entity, id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("find")
                    .with_entity(entity)
                    .with_entity_id(id.to_string())
                    .with_message(message)
            }

            PersistabilityError::IdentityMissing { entity } => {
                ExError::new(ExErrorKind::IdentityViolation)
                    .with_op("persist")
                    .with_entity(entity)
                    .with_message(message)
            }

            PersistabilityError::IdentityUnstable {
                label, persisted, ..
            } => ExError::new(ExErrorKind::IdentityViolation)
                .with_op("round_trip")
                .with_entity(label)
                .with_entity_id(persisted.to_string())
                .with_message(message),

            PersistabilityError::AliasedInstance { label } => {
                ExError::new(ExErrorKind::IdentityViolation)
                    .with_op("round_trip")
                    .with_entity(label)
                    .with_message(message)
            }

            PersistabilityError::PropertyMismatch { label, .. } => {
                ExError::new(ExErrorKind::PropertyMismatch)
                    .with_op("round_trip")
                    .with_entity(label)
                    .with_message(message)
            }

            PersistabilityError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            PersistabilityError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
