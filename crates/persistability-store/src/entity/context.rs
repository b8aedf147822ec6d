//! Persistence context
//!
//! Identity map of the managed instances of one entity manager. Within a
//! unit of work, finding an identity that is already managed returns the
//! managed instance itself. The context is emptied when the unit of work
//! ends, so later lookups go to storage.

use crate::entity::Entity;
use persistability_core::model::EntityId;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type Key = (&'static str, EntityId);

#[derive(Default)]
pub struct PersistenceContext {
    managed: RefCell<HashMap<Key, Rc<dyn Any>>>,
}

impl PersistenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a managed instance, replacing any previous one
    pub fn attach<E: Entity>(&self, id: EntityId, entity: Rc<E>) {
        self.managed.borrow_mut().insert((E::NAME, id), entity);
    }

    /// Managed instance for `id`, if any
    pub fn get<E: Entity>(&self, id: EntityId) -> Option<Rc<E>> {
        let managed = self.managed.borrow().get(&(E::NAME, id)).cloned()?;
        Rc::downcast::<E>(managed).ok()
    }

    /// Whether `entity` is the managed instance for its identity
    pub fn contains<E: Entity>(&self, entity: &E) -> bool {
        entity
            .id()
            .and_then(|id| self.get::<E>(id))
            .is_some_and(|managed| std::ptr::eq(managed.as_ref(), entity))
    }

    pub fn len(&self) -> usize {
        self.managed.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.managed.borrow().is_empty()
    }

    /// Detach every managed instance
    pub fn clear(&self) {
        self.managed.borrow_mut().clear();
    }
}

impl std::fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<Key> = self.managed.borrow().keys().copied().collect();
        keys.sort();
        f.debug_struct("PersistenceContext")
            .field("managed", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistability_core::model::{Company, Employee};

    fn identified(name: &str, id: EntityId) -> Employee {
        let mut employee = Employee::new(name);
        employee.id = Some(id);
        employee
    }

    #[test]
    fn test_attach_and_get_same_instance() {
        let context = PersistenceContext::new();
        let joe = Rc::new(identified("Joe", 1));
        context.attach(1, joe.clone());

        let managed = context.get::<Employee>(1).unwrap();
        assert!(Rc::ptr_eq(&managed, &joe));
        assert!(context.contains(joe.as_ref()));
    }

    #[test]
    fn test_identities_are_scoped_by_entity() {
        let context = PersistenceContext::new();
        context.attach(1, Rc::new(identified("Joe", 1)));

        assert!(context.get::<Company>(1).is_none());
    }

    #[test]
    fn test_equal_copy_is_not_contained() {
        let context = PersistenceContext::new();
        context.attach(1, Rc::new(identified("Joe", 1)));

        assert!(!context.contains(&identified("Joe", 1)));
    }

    #[test]
    fn test_clear() {
        let context = PersistenceContext::new();
        context.attach(1, Rc::new(identified("Joe", 1)));
        context.clear();
        assert!(context.is_empty());
    }
}
