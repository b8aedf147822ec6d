// Integration tests for entity management
// Covers persist, find, the persistence context and the company/employee mapping

use chrono::NaiveDate;
use persistability_core::builder::{Builder, CompanyBuilder, EmployeeBuilder};
use persistability_core::errors::{ExError, ExErrorKind};
use persistability_core::model::{Company, Employee, EntityId};
use persistability_store::{
    persisted, Contexts, EntityManager, EntityManagerFactory, PersistenceUnitConfig,
    SqliteTransactor, Transactor,
};
use std::rc::Rc;

fn setup_em() -> EntityManager {
    let factory = EntityManagerFactory::new(PersistenceUnitConfig::default());
    let em = factory.create_entity_manager().unwrap();
    factory
        .config()
        .schema_preparer()
        .update(em.connection(), &Contexts::all())
        .unwrap();
    em
}

#[test]
fn test_persist_assigns_identity() {
    // Given: A prepared database
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);

    // When: A new employee is persisted
    let managed = tx
        .perform_query(|em: &EntityManager| em.persist(Employee::new("Jane Doe")))
        .unwrap();

    // Then: It carries a storage-assigned identity
    assert!(managed.id.is_some());
}

#[test]
fn test_find_within_unit_of_work_returns_managed_instance() {
    // Given: A prepared database
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);

    // When: An employee is persisted and found in the same unit of work
    let same = tx
        .perform_query(|em: &EntityManager| {
            let managed = em.persist(Employee::new("Jane Doe"))?;
            let id = managed.id.unwrap_or_default();
            let found = em.get::<Employee>(id)?;
            Ok(Rc::ptr_eq(&managed, &found) && em.contains(managed.as_ref()))
        })
        .unwrap();

    // Then: The persistence context serves the managed instance
    assert!(same);
}

#[test]
fn test_find_in_later_unit_of_work_reads_storage() {
    // Given: An employee persisted in one unit of work
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);
    let persisted_joe = tx
        .perform_query(|em: &EntityManager| {
            em.persist(EmployeeBuilder::an_employee().with_name("Joe").build()?)
        })
        .unwrap();

    // When: It is found in a second unit of work
    let id = persisted_joe.id.unwrap();
    let found = tx
        .perform_query(|em: &EntityManager| em.get::<Employee>(id))
        .unwrap();

    // Then: A fresh, equal instance is returned
    assert!(!Rc::ptr_eq(&persisted_joe, &found));
    assert_eq!(*persisted_joe, *found);
    assert!(em.persistence_context().is_empty());
}

#[test]
fn test_find_unknown_identity() {
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);

    let found = tx
        .perform_query(|em: &EntityManager| em.find::<Company>(4242))
        .unwrap();
    assert!(found.is_none());

    let err = tx
        .perform_query(|em: &EntityManager| em.get::<Company>(4242))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_company_cascades_to_new_employees() {
    // Given: A company with two new employees
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);
    let company = CompanyBuilder::a_company()
        .having_employee(EmployeeBuilder::an_employee().with_name("Ann"))
        .having_employee(EmployeeBuilder::an_employee().with_name("Bob"))
        .build()
        .unwrap();

    // When: The company is persisted
    let managed = tx
        .perform_query(|em: &EntityManager| em.persist(company))
        .unwrap();

    // Then: Every employee got an identity and is linked to the company
    assert!(managed.employees.iter().all(|e| e.id.is_some()));
    let id = managed.id.unwrap();
    let linked: i64 = em
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM employee WHERE company_id = ?1",
            [id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(linked, 2);
}

#[test]
fn test_company_links_pre_persisted_employee() {
    // Given: A company embedding an employee persisted by the builder
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);

    // When: The company is built and persisted in one unit of work
    let (employee_id, company_id) = tx
        .perform_query(|em: &EntityManager| {
            let company = CompanyBuilder::a_company()
                .having_employee(persisted(
                    em,
                    EmployeeBuilder::an_employee().with_name("Joe Six Pack"),
                ))
                .build()?;
            let employee_id: EntityId = company.employees[0].id.unwrap_or_default();
            let managed = em.persist(company)?;
            Ok((employee_id, managed.id.unwrap_or_default()))
        })
        .unwrap();

    // Then: The existing row is linked rather than duplicated
    let (rows, owner): (i64, EntityId) = em
        .connection()
        .query_row(
            "SELECT COUNT(*), MAX(company_id) FROM employee",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert!(employee_id > 0);
    assert_eq!(rows, 1);
    assert_eq!(owner, company_id);
}

#[test]
fn test_company_round_trip_keeps_dates_and_order() {
    // Given: A company with dated employees
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);
    let company = CompanyBuilder::a_company()
        .founded_on(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
        .having_employee(
            EmployeeBuilder::an_employee()
                .with_name("First")
                .hired_on(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
        )
        .having_employee(EmployeeBuilder::an_employee().with_name("Second").never_hired())
        .build()
        .unwrap();

    // When: It is persisted and reloaded
    let managed = tx
        .perform_query(|em: &EntityManager| em.persist(company))
        .unwrap();
    let id = managed.id.unwrap();
    let reloaded = tx
        .perform_query(|em: &EntityManager| em.get::<Company>(id))
        .unwrap();

    // Then: The reloaded company equals the persisted one
    assert_eq!(*managed, *reloaded);
    assert_eq!(reloaded.employees[1].hired_on, None);
}

#[test]
fn test_duplicate_identity_is_rejected() {
    // Given: A company stored with an explicit identity
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);
    let with_id = || CompanyBuilder::a_company().with_id(7).build();
    tx.perform_query(|em: &EntityManager| em.persist(with_id()?))
        .unwrap();

    // When: Another company with the same identity is persisted
    let err: ExError = tx
        .perform_query(|em: &EntityManager| em.persist(with_id()?))
        .unwrap_err();

    // Then: The insert fails as a duplicate
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    assert_eq!(err.entity_id(), Some("7"));
}

#[test]
fn test_persisting_managed_copy_returns_managed_instance() {
    // Given: An employee persisted in the current unit of work
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);

    // When: An equal copy is persisted again, then a changed copy
    let (same, conflict) = tx
        .perform_query(|em: &EntityManager| {
            let managed = em.persist(Employee::new("Ann"))?;
            let again = em.persist(Employee::clone(&managed))?;
            let mut renamed = Employee::clone(&managed);
            renamed.name = "Annie".to_string();
            let conflict = em.persist(renamed).map(|_| ()).unwrap_err();
            Ok((Rc::ptr_eq(&managed, &again), conflict))
        })
        .unwrap();

    // Then: The equal copy resolves to the managed instance, stored once
    assert!(same);
    assert_eq!(conflict.kind(), ExErrorKind::AlreadyExists);
    let rows: i64 = em
        .connection()
        .query_row("SELECT COUNT(*) FROM employee", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_employee_of_another_company_is_not_moved() {
    // Given: Company A stored with one employee
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);
    let a = tx
        .perform_query(|em: &EntityManager| {
            em.persist(
                CompanyBuilder::a_company()
                    .named("A")
                    .having_employee(EmployeeBuilder::an_employee().with_name("Joe"))
                    .build()?,
            )
        })
        .unwrap();
    let a_id = a.id.unwrap();

    // When: Company B embeds A's employee
    let mut b = CompanyBuilder::a_company().named("B").build().unwrap();
    b.employees.push(a.employees[0].clone());
    let err: ExError = tx
        .perform_query(|em: &EntityManager| em.persist(b))
        .unwrap_err();

    // Then: The persist fails and A keeps its employee
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    assert!(err
        .message()
        .contains(&format!("already belongs to Company {}", a_id)));
    let reloaded = tx
        .perform_query(|em: &EntityManager| em.get::<Company>(a_id))
        .unwrap();
    assert_eq!(reloaded.employees.len(), 1);
    assert_eq!(reloaded.employees[0].name, "Joe");
}

#[test]
fn test_foreign_keys_are_enforced() {
    // Given: A prepared database with foreign keys on
    let em = setup_em();
    let tx = SqliteTransactor::new(&em);

    // When: An employee points at a company that does not exist
    let result = tx.perform(|em: &EntityManager| {
        em.connection()
            .execute(
                "INSERT INTO employee (name, company_id) VALUES ('Ghost', 999)",
                [],
            )
            .map_err(persistability_store::errors::from_rusqlite)?;
        Ok(())
    });

    // Then: The constraint rejects it
    assert_eq!(result.unwrap_err().kind(), ExErrorKind::Persistence);
}
