//! Entity manager and its factory

use crate::config::PersistenceUnitConfig;
use crate::db;
use crate::entity::{Entity, PersistenceContext};
use crate::errors::{transaction_required, Result};
use persistability_core::errors::PersistabilityError;
use persistability_core::model::EntityId;
use rusqlite::Connection;
use std::cell::Cell;
use std::rc::Rc;

/// Creates entity managers for one persistence unit
#[derive(Debug, Clone)]
pub struct EntityManagerFactory {
    config: PersistenceUnitConfig,
}

impl EntityManagerFactory {
    pub fn new(config: PersistenceUnitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PersistenceUnitConfig {
        &self.config
    }

    /// Open and configure a connection for the unit and wrap it
    ///
    /// With an in-memory unit every manager gets its own private database.
    pub fn create_entity_manager(&self) -> Result<EntityManager> {
        let conn = db::open_location(&self.config.database)?;
        db::configure(&conn, self.config.foreign_keys, !self.config.is_in_memory())?;

        tracing::debug!(
            unit = %self.config.name,
            database = %self.config.database,
            "entity manager created"
        );
        Ok(EntityManager::new(conn))
    }
}

/// Single-connection entity manager
///
/// Entity operations run inside a unit of work (see
/// [`SqliteTransactor`](crate::transactor::SqliteTransactor)). Managed
/// instances are shared as `Rc` and live in the persistence context until the
/// unit of work ends.
pub struct EntityManager {
    conn: Connection,
    context: PersistenceContext,
    unit_of_work_active: Cell<bool>,
}

impl EntityManager {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            context: PersistenceContext::new(),
            unit_of_work_active: Cell::new(false),
        }
    }

    /// The underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give up the manager and keep its connection
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Make `entity` persistent and return the managed instance
    ///
    /// Inserts the entity with everything it owns, assigning identities, and
    /// registers the result in the persistence context. Requires an open
    /// transaction. Persisting a copy of an instance this unit of work already
    /// manages returns the managed instance; a different state under the same
    /// identity is rejected.
    pub fn persist<E: Entity>(&self, mut entity: E) -> Result<Rc<E>> {
        self.require_transaction("persist")?;

        if let Some(id) = entity.id() {
            if let Some(managed) = self.context.get::<E>(id) {
                if *managed == entity {
                    return Ok(managed);
                }
                return Err(PersistabilityError::EntityExists {
                    entity: E::NAME.to_string(),
                    id,
                }
                .into());
            }
        }

        let id = entity.insert(self)?;
        let managed = Rc::new(entity);
        self.context.attach(id, managed.clone());

        tracing::debug!(entity = E::NAME, entity_id = id, "persisted");
        Ok(managed)
    }

    /// Find an entity by identity
    ///
    /// Returns the managed instance when the identity is already in the
    /// persistence context, otherwise loads a fresh instance from storage and
    /// manages it.
    pub fn find<E: Entity>(&self, id: EntityId) -> Result<Option<Rc<E>>> {
        if let Some(managed) = self.context.get::<E>(id) {
            return Ok(Some(managed));
        }

        let Some(loaded) = E::load(self, id)? else {
            return Ok(None);
        };
        let managed = Rc::new(loaded);
        self.context.attach(id, managed.clone());

        tracing::debug!(entity = E::NAME, entity_id = id, "loaded");
        Ok(Some(managed))
    }

    /// Find an entity that must exist
    pub fn get<E: Entity>(&self, id: EntityId) -> Result<Rc<E>> {
        self.find(id)?.ok_or_else(|| {
            PersistabilityError::EntityNotFound {
                entity: E::NAME.to_string(),
                id,
            }
            .into()
        })
    }

    /// Whether `entity` is a managed instance of this manager
    pub fn contains<E: Entity>(&self, entity: &E) -> bool {
        self.context.contains(entity)
    }

    /// Whether a row with this identity is stored
    pub fn exists<E: Entity>(&self, id: EntityId) -> Result<bool> {
        Ok(E::load(self, id)?.is_some())
    }

    /// Detach every managed instance
    pub fn clear(&self) {
        self.context.clear();
    }

    pub fn persistence_context(&self) -> &PersistenceContext {
        &self.context
    }

    /// Register an instance persisted as part of another entity
    pub(crate) fn attach<E: Entity>(&self, id: EntityId, entity: Rc<E>) {
        self.context.attach(id, entity);
    }

    pub fn is_unit_of_work_active(&self) -> bool {
        self.unit_of_work_active.get()
    }

    /// Mark a unit of work active; fails if one already is
    pub(crate) fn begin_unit_of_work(&self) -> Result<()> {
        if self.unit_of_work_active.replace(true) {
            return Err(PersistabilityError::TransactionAlreadyActive.into());
        }
        Ok(())
    }

    /// Mark the unit of work finished and detach its instances
    pub(crate) fn end_unit_of_work(&self) {
        self.context.clear();
        self.unit_of_work_active.set(false);
    }

    fn require_transaction(&self, op: &str) -> Result<()> {
        if self.conn.is_autocommit() {
            return Err(transaction_required(op));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("context", &self.context)
            .field("unit_of_work_active", &self.unit_of_work_active.get())
            .finish()
    }
}
