//! `employee` table mapping
//!
//! Columns: `id`, `name`, `hired_on`, and the `company_id` join column owned
//! by the company side of the relation.

use crate::entity::{Entity, EntityManager};
use crate::errors::{from_rusqlite, insert_error, Result};
use persistability_core::model::{Employee, EntityId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, hired_on";

impl Entity for Employee {
    const NAME: &'static str = "Employee";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn insert(&mut self, em: &EntityManager) -> Result<EntityId> {
        insert_employee(em.connection(), self, None)
    }

    fn load(em: &EntityManager, id: EntityId) -> Result<Option<Self>> {
        em.connection()
            .query_row(
                &format!("SELECT {} FROM employee WHERE id = ?1", COLUMNS),
                [id],
                from_row,
            )
            .optional()
            .map_err(|e| from_rusqlite(e).with_entity(Self::NAME))
    }
}

/// Insert an employee, optionally owned by a company
pub(crate) fn insert_employee(
    conn: &Connection,
    employee: &mut Employee,
    company_id: Option<EntityId>,
) -> Result<EntityId> {
    conn.execute(
        "INSERT INTO employee (id, name, hired_on, company_id) VALUES (?1, ?2, ?3, ?4)",
        params![employee.id, employee.name, employee.hired_on, company_id],
    )
    .map_err(|e| insert_error(Employee::NAME, employee.id, e))?;

    let id = employee.id.unwrap_or_else(|| conn.last_insert_rowid());
    employee.id = Some(id);
    Ok(id)
}

/// Owner of a stored employee
///
/// `None` when no employee has this identity, `Some(None)` when it is stored
/// without a company.
pub(crate) fn stored_owner(
    conn: &Connection,
    employee_id: EntityId,
) -> Result<Option<Option<EntityId>>> {
    conn.query_row(
        "SELECT company_id FROM employee WHERE id = ?1",
        [employee_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| from_rusqlite(e).with_entity(Employee::NAME))
}

/// Point a stored employee at its company
///
/// Only unowned employees, or employees already owned by `company_id`, are
/// updated; returns false when nothing matched.
pub(crate) fn link_to_company(
    conn: &Connection,
    employee_id: EntityId,
    company_id: EntityId,
) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE employee SET company_id = ?1 \
             WHERE id = ?2 AND (company_id IS NULL OR company_id = ?1)",
            params![company_id, employee_id],
        )
        .map_err(|e| from_rusqlite(e).with_entity(Employee::NAME))?;
    Ok(updated == 1)
}

/// Employees of a company in identity order
pub(crate) fn employees_of(conn: &Connection, company_id: EntityId) -> Result<Vec<Employee>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM employee WHERE company_id = ?1 ORDER BY id",
            COLUMNS
        ))
        .map_err(from_rusqlite)?;

    let employees = stmt
        .query_map([company_id], from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| from_rusqlite(e).with_entity(Employee::NAME))?;

    Ok(employees)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        hired_on: row.get(2)?,
    })
}
