use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Employee - a person working for a [`Company`](super::Company)
///
/// The owning company is not a property of the employee; the relation is
/// mapped from the company side through a join column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Identity, `None` until persisted unless assigned up front
    pub id: Option<EntityId>,

    /// Full name
    pub name: String,

    /// Date the employee was hired, if known
    pub hired_on: Option<NaiveDate>,
}

impl Employee {
    /// Create a transient employee with no identity
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            hired_on: None,
        }
    }

    /// Check whether the employee has been given an identity
    pub fn is_identified(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_employee_is_transient() {
        let employee = Employee::new("Joe Six Pack");
        assert_eq!(employee.name, "Joe Six Pack");
        assert!(!employee.is_identified());
        assert!(employee.hired_on.is_none());
    }
}
