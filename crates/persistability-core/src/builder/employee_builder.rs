use chrono::NaiveDate;

use super::Builder;
use crate::errors::ExError;
use crate::model::{Employee, EntityId};

/// Builds [`Employee`] instances with sensible defaults
#[derive(Debug, Clone)]
pub struct EmployeeBuilder {
    id: Option<EntityId>,
    name: String,
    hired_on: Option<NaiveDate>,
}

impl EmployeeBuilder {
    /// Start from the default employee
    pub fn an_employee() -> Self {
        Self {
            id: None,
            name: "Jane Doe".to_string(),
            hired_on: NaiveDate::from_ymd_opt(2015, 3, 2),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn hired_on(mut self, date: NaiveDate) -> Self {
        self.hired_on = Some(date);
        self
    }

    pub fn never_hired(mut self) -> Self {
        self.hired_on = None;
        self
    }

    /// Pre-assign the identity instead of letting storage assign it
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }
}

impl Default for EmployeeBuilder {
    fn default() -> Self {
        Self::an_employee()
    }
}

impl Builder<Employee> for EmployeeBuilder {
    fn build(&self) -> Result<Employee, ExError> {
        Ok(Employee {
            id: self.id,
            name: self.name.clone(),
            hired_on: self.hired_on,
        })
    }
}
