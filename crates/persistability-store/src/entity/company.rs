//! `company` table mapping
//!
//! A company owns its employees through the `employee.company_id` join
//! column. Persisting a company inserts its new employees and links the
//! ones already stored without an owner; an employee owned by another
//! company is rejected. Employees are kept in identity order, the order in
//! which loading reads them.

use crate::entity::employee::{employees_of, insert_employee, link_to_company, stored_owner};
use crate::entity::{Entity, EntityManager};
use crate::errors::{from_rusqlite, insert_error, Result};
use persistability_core::errors::{ExError, PersistabilityError};
use persistability_core::model::{Company, Employee, EntityId};
use rusqlite::{params, OptionalExtension};
use std::rc::Rc;

impl Entity for Company {
    const NAME: &'static str = "Company";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn insert(&mut self, em: &EntityManager) -> Result<EntityId> {
        let conn = em.connection();
        conn.execute(
            "INSERT INTO company (id, name, founded_on) VALUES (?1, ?2, ?3)",
            params![self.id, self.name, self.founded_on],
        )
        .map_err(|e| insert_error(Self::NAME, self.id, e))?;

        let company_id = self.id.unwrap_or_else(|| conn.last_insert_rowid());
        self.id = Some(company_id);

        for employee in &mut self.employees {
            if let Some(employee_id) = employee.id {
                if link_to_company(conn, employee_id, company_id)? {
                    continue;
                }
                if let Some(Some(owner)) = stored_owner(conn, employee_id)? {
                    return Err(owned_elsewhere(employee_id, owner));
                }
            }
            let employee_id = insert_employee(conn, employee, Some(company_id))?;
            em.attach(employee_id, Rc::new(employee.clone()));
        }

        // Loading reads employees in identity order
        self.employees.sort_by_key(|employee| employee.id);

        Ok(company_id)
    }

    fn load(em: &EntityManager, id: EntityId) -> Result<Option<Self>> {
        let conn = em.connection();
        let company = conn
            .query_row(
                "SELECT id, name, founded_on FROM company WHERE id = ?1",
                [id],
                |row| {
                    Ok(Company {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                        founded_on: row.get(2)?,
                        employees: Vec::new(),
                    })
                },
            )
            .optional()
            .map_err(|e| from_rusqlite(e).with_entity(Self::NAME))?;

        let Some(mut company) = company else {
            return Ok(None);
        };
        company.employees = employees_of(conn, id)?;
        Ok(Some(company))
    }
}

fn owned_elsewhere(employee_id: EntityId, owner: EntityId) -> ExError {
    PersistabilityError::AlreadyOwned {
        entity: Employee::NAME.to_string(),
        id: employee_id,
        owner: format!("{} {}", Company::NAME, owner),
    }
    .into()
}
