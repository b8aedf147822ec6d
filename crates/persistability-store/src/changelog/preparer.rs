//! Schema preparer
//!
//! Applies a changelog to a connection: every changeset not yet recorded in
//! the history table runs in declaration order and is recorded. Safe to run
//! repeatedly.
//!
//! Each changeset runs inside its own savepoint, so a failing changeset
//! leaves no partial DDL behind and a retry re-attempts exactly that
//! changeset. Savepoints nest inside an open transaction and start one
//! otherwise, so the preparer works on a bare connection and inside a unit
//! of work alike.

use crate::changelog::contexts::Contexts;
use crate::changelog::history::{
    applied_change_sets, ensure_history_table, record_applied, AppliedChangeSet,
};
use crate::changelog::parser::{load_changelog, ChangeSet, DatabaseChangeLog};
use crate::changelog::resource::ResourceAccessor;
use crate::errors::{changeset_failed, from_rusqlite, Result};
use persistability_core::errors::PersistabilityError;
use persistability_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::Connection;

const SAVEPOINT: &str = "persistability_changeset";

/// Outcome of an update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Keys (`id::author`) of the changesets applied by this run
    pub applied: Vec<String>,
    /// Changesets already recorded as applied
    pub skipped: usize,
    /// Changesets excluded by the active contexts
    pub filtered: usize,
}

impl UpdateSummary {
    /// Whether the run changed the schema
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applied and pending changesets of a changelog
#[derive(Debug, Clone, Default)]
pub struct ChangeLogStatus {
    pub applied: Vec<AppliedChangeSet>,
    pub pending: Vec<ChangeSet>,
    /// Applied changesets whose content changed since they ran
    pub modified: Vec<ChangeSet>,
}

impl ChangeLogStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty() && self.modified.is_empty()
    }
}

/// Brings a database schema up to date with a changelog
pub struct SchemaPreparer<A> {
    accessor: A,
    changelog: String,
}

impl<A: ResourceAccessor> SchemaPreparer<A> {
    /// Preparer for the changelog `changelog`, read through `accessor`
    pub fn new(accessor: A, changelog: impl Into<String>) -> Self {
        Self {
            accessor,
            changelog: changelog.into(),
        }
    }

    pub fn changelog(&self) -> &str {
        &self.changelog
    }

    /// Load and validate the changelog without touching the database
    pub fn load(&self) -> Result<DatabaseChangeLog> {
        load_changelog(&self.accessor, &self.changelog)
    }

    /// Apply every pending changeset matching `contexts`
    ///
    /// Checksums of already-applied changesets are validated before anything
    /// runs. A failing changeset aborts the run; changesets applied before it
    /// stay applied.
    pub fn update(&self, conn: &Connection, contexts: &Contexts) -> Result<UpdateSummary> {
        log_op_start!(
            "schema_update",
            changelog = %self.changelog,
            source = %self.accessor.describe(),
            contexts = %contexts
        );
        let start = std::time::Instant::now();

        let summary = self.update_impl(conn, contexts).map_err(|e| {
            log_op_error!(
                "schema_update",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "schema_update",
            duration_ms = start.elapsed().as_millis() as u64,
            applied_count = summary.applied.len(),
            skipped_count = summary.skipped
        );

        Ok(summary)
    }

    fn update_impl(&self, conn: &Connection, contexts: &Contexts) -> Result<UpdateSummary> {
        let changelog = self.load()?;

        ensure_history_table(conn)?;
        let applied = applied_change_sets(conn)?;
        validate_checksums(&changelog, &applied)?;

        let mut summary = UpdateSummary::default();
        for change_set in &changelog.change_sets {
            if applied.iter().any(|a| a.records(change_set)) {
                summary.skipped += 1;
                continue;
            }
            if !contexts.matches(change_set.context.as_deref()) {
                tracing::debug!(
                    changeset = %change_set.key(),
                    context = ?change_set.context,
                    "changeset filtered by context"
                );
                summary.filtered += 1;
                continue;
            }

            apply_change_set(conn, change_set)?;
            tracing::info!(
                changeset = %change_set.key(),
                changelog = %change_set.changelog,
                "changeset applied"
            );
            summary.applied.push(change_set.key());
        }

        Ok(summary)
    }

    /// List applied and pending changesets without modifying the schema
    pub fn status(&self, conn: &Connection) -> Result<ChangeLogStatus> {
        let changelog = self.load()?;
        let applied = applied_change_sets(conn)?;

        let mut status = ChangeLogStatus::default();
        for change_set in changelog.change_sets {
            match applied.iter().find(|a| a.records(&change_set)) {
                Some(record) if record.checksum != change_set.checksum => {
                    status.modified.push(change_set)
                }
                Some(_) => {}
                None => status.pending.push(change_set),
            }
        }
        status.applied = applied;
        Ok(status)
    }
}

/// The most recently applied changeset, if any
pub fn current_version(conn: &Connection) -> Result<Option<AppliedChangeSet>> {
    Ok(applied_change_sets(conn)?.pop())
}

fn validate_checksums(changelog: &DatabaseChangeLog, applied: &[AppliedChangeSet]) -> Result<()> {
    for change_set in &changelog.change_sets {
        if let Some(record) = applied.iter().find(|a| a.records(change_set)) {
            if record.checksum != change_set.checksum {
                return Err(PersistabilityError::ChecksumMismatch {
                    id: change_set.id.clone(),
                    author: change_set.author.clone(),
                    changelog: change_set.changelog.clone(),
                    recorded: record.checksum.clone(),
                    current: change_set.checksum.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn apply_change_set(conn: &Connection, change_set: &ChangeSet) -> Result<()> {
    conn.execute_batch(&format!("SAVEPOINT {}", SAVEPOINT))
        .map_err(from_rusqlite)?;

    let outcome = change_set
        .statements
        .iter()
        .try_for_each(|statement| conn.execute_batch(statement))
        .map_err(|e| changeset_failed(&change_set.id, &change_set.author, e))
        .and_then(|()| record_applied(conn, change_set));

    match outcome {
        Ok(()) => conn
            .execute_batch(&format!("RELEASE {}", SAVEPOINT))
            .map_err(from_rusqlite),
        Err(e) => {
            // Keep the original failure; a rollback error here adds nothing
            let _ = conn.execute_batch(&format!("ROLLBACK TO {0}; RELEASE {0}", SAVEPOINT));
            Err(e)
        }
    }
}
