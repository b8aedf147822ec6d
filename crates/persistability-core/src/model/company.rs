use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Employee, EntityId};

/// Company - owns an ordered list of employees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Identity, `None` until persisted unless assigned up front
    pub id: Option<EntityId>,

    /// Registered company name
    pub name: String,

    /// Founding date, if known
    pub founded_on: Option<NaiveDate>,

    /// Employees in identity order
    pub employees: Vec<Employee>,
}

impl Company {
    /// Create a transient company with no employees
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            founded_on: None,
            employees: Vec::new(),
        }
    }

    /// Find an employee by name
    pub fn employee_named(&self, name: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.name == name)
    }
}
