//! Units of work
//!
//! A unit of work runs against an [`EntityManager`] inside one database
//! transaction. The transactor commits when the work returns `Ok` and rolls
//! back when it returns `Err` or panics. Whatever the outcome, the
//! persistence context is cleared when the unit of work ends, so the next
//! unit of work reads from storage.

use crate::entity::EntityManager;
use crate::errors::{from_rusqlite, Result};
use persistability_core::errors::ExError;

/// Work with side effects only
pub trait UnitOfWork {
    fn run(self, em: &EntityManager) -> Result<()>;
}

impl<F> UnitOfWork for F
where
    F: FnOnce(&EntityManager) -> Result<()>,
{
    fn run(self, em: &EntityManager) -> Result<()> {
        self(em)
    }
}

/// Work producing a value
pub trait QueryUnitOfWork<T> {
    fn run(self, em: &EntityManager) -> Result<T>;
}

impl<T, F> QueryUnitOfWork<T> for F
where
    F: FnOnce(&EntityManager) -> Result<T>,
{
    fn run(self, em: &EntityManager) -> Result<T> {
        self(em)
    }
}

/// Executes units of work with commit-on-success and rollback-on-error
pub trait Transactor {
    /// Run `work` in its own transaction
    fn perform<W: UnitOfWork>(&self, work: W) -> Result<()>;

    /// Run `query` in its own transaction and return its value
    fn perform_query<T, Q: QueryUnitOfWork<T>>(&self, query: Q) -> Result<T>;
}

/// Transactor over the connection of one entity manager
///
/// Not reentrant: starting a unit of work from inside another fails with
/// `TransactionActive`.
#[derive(Debug, Clone, Copy)]
pub struct SqliteTransactor<'em> {
    em: &'em EntityManager,
}

impl<'em> SqliteTransactor<'em> {
    pub fn new(em: &'em EntityManager) -> Self {
        Self { em }
    }

    pub fn entity_manager(&self) -> &'em EntityManager {
        self.em
    }

    fn execute<T>(&self, work: impl FnOnce(&EntityManager) -> Result<T>) -> Result<T> {
        self.em.begin_unit_of_work()?;
        let _scope = UnitOfWorkScope { em: self.em };

        // Dropping an uncommitted transaction rolls it back, on error and
        // on unwind alike
        let tx = self
            .em
            .connection()
            .unchecked_transaction()
            .map_err(|e| from_rusqlite(e).with_op("begin_unit_of_work"))?;

        match work(self.em) {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| from_rusqlite(e).with_op("commit_unit_of_work"))?;
                tracing::debug!("unit of work committed");
                Ok(value)
            }
            Err(err) => {
                rollback(tx, &err);
                Err(err)
            }
        }
    }
}

impl Transactor for SqliteTransactor<'_> {
    fn perform<W: UnitOfWork>(&self, work: W) -> Result<()> {
        self.execute(|em| work.run(em))
    }

    fn perform_query<T, Q: QueryUnitOfWork<T>>(&self, query: Q) -> Result<T> {
        self.execute(|em| query.run(em))
    }
}

fn rollback(tx: rusqlite::Transaction<'_>, cause: &ExError) {
    match tx.rollback() {
        Ok(()) => tracing::debug!(err.code = cause.code(), "unit of work rolled back"),
        Err(e) => tracing::warn!(
            err.code = cause.code(),
            rollback_error = %e,
            "unit of work rollback failed"
        ),
    }
}

/// Ends the unit of work on every exit path
struct UnitOfWorkScope<'em> {
    em: &'em EntityManager,
}

impl Drop for UnitOfWorkScope<'_> {
    fn drop(&mut self) {
        self.em.end_unit_of_work();
    }
}
